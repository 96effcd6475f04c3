//! State context setup and the run loop shared by every subcommand.

use std::path::{Path, PathBuf};

use anyhow::Result;
use roster_business::{BusinessConfig, Notifications, Session, build_state_ctx};
use roster_states::{Command, StateCtx};
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::output::Output;

/// Pick the backend origin: flag or `ROSTER_API_URL`, then the config file,
/// then `ROSTER_API_BASE_URL`, then the built-in default.
pub fn resolve_business_config(api_url: Option<&str>, saved: &Config) -> BusinessConfig {
    if let Some(url) = api_url.or(saved.api.url.as_deref()).filter(|u| !u.trim().is_empty()) {
        return BusinessConfig::new(url.trim());
    }
    BusinessConfig::from_env().unwrap_or_else(|err| {
        warn!("ignoring invalid environment config: {err}");
        BusinessConfig::default()
    })
}

/// A context seeded with the saved session, if any.
pub fn build_cli_ctx(config: BusinessConfig, saved: &Config) -> StateCtx {
    let mut ctx = build_state_ctx(config);
    if let Some(token) = saved.token() {
        ctx.add_state(Session::restore(token));
    }
    ctx
}

/// Everything a subcommand needs.
pub struct CliContext {
    pub ctx: StateCtx,
    pub config: Config,
    pub config_path: PathBuf,
    pub out: Output,
}

impl CliContext {
    pub fn load(api_url: Option<&str>, config_path: PathBuf) -> Result<Self> {
        let config = Config::load_from(&config_path)?;
        let ctx = build_cli_ctx(resolve_business_config(api_url, &config), &config);
        Ok(Self {
            ctx,
            config,
            config_path,
            out: Output::new(),
        })
    }

    /// Execute a command, run whatever it queued, then print notifications.
    #[instrument(skip_all, name = "run")]
    pub async fn run<C: Command>(&mut self, command: C) -> C::Output {
        let output = self.ctx.execute(command).await;
        self.ctx.settle().await;
        self.report_notifications();
        output
    }

    pub fn report_notifications(&mut self) {
        for notification in self.ctx.state_mut::<Notifications>().drain() {
            self.out.notification(&notification);
        }
    }

    /// Write the session token back to disk when it changed.
    pub fn persist_session(&mut self) -> Result<bool> {
        let token = self.ctx.state::<Session>().token().map(str::to_owned);
        if token.as_deref() == self.config.token() {
            return Ok(false);
        }

        match token {
            Some(token) => {
                let email = self.config.email().unwrap_or_default().to_owned();
                self.config.set_auth(&email, &token);
            }
            None => self.config.clear_token(),
        }
        debug!("saving session to {}", self.config_path.display());
        self.config.save_to(&self.config_path)?;
        Ok(true)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}
