use roster_states::State;
use serde::Deserialize;
use ustr::Ustr;

const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

/// Environment variables read by [`BusinessConfig::from_env`].
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    roster_api_base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessConfig {
    /// Origin of the backend, without the `/api` suffix.
    pub api_base_url: String,
}

impl BusinessConfig {
    /// Trailing slashes are dropped so routes never contain `//`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            api_base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Build from `ROSTER_API_BASE_URL`, falling back to the local default.
    pub fn from_env() -> Result<Self, serde_env::Error> {
        let raw: RawConfig = serde_env::from_env()?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawConfig) -> Self {
        match raw.roster_api_base_url {
            Some(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }

    /// Root of every REST route, e.g. `https://host/api`.
    ///
    /// An empty base yields the relative `/api`.
    pub fn api_url(&self) -> Ustr {
        if self.api_base_url.is_empty() {
            Ustr::from("/api")
        } else {
            Ustr::from(&format!("{}/api", self.api_base_url))
        }
    }

    pub fn login_route(&self) -> String {
        format!("{}/auth/login", self.api_url())
    }

    pub fn register_route(&self) -> String {
        format!("{}/auth/register", self.api_url())
    }

    pub fn profile_route(&self) -> String {
        format!("{}/auth/profile", self.api_url())
    }

    /// Root of the user collection resource.
    pub fn users_root(&self) -> String {
        format!("{}/users", self.api_url())
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl State for BusinessConfig {}
