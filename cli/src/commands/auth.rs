//! `login`, `register`, `logout` and `whoami`.

use anyhow::{Context as _, Result, bail};
use inquire::{Password, PasswordDisplayMode, Text};
use roster_business::{
    Credentials, FetchUserProfileCommand, LoginCommand, LoginInput, LogoutCommand,
    RegisterCommand, RegisterInput, Route, Session,
};
use tracing::{info, instrument};

use crate::cli::CredentialArgs;
use crate::context::CliContext;

/// Fill in whatever the flags left out by prompting.
fn read_credentials(args: CredentialArgs, saved_email: Option<&str>) -> Result<Credentials> {
    let email = match args.email {
        Some(email) => email,
        None => {
            let mut prompt = Text::new("Email:");
            if let Some(saved) = saved_email {
                prompt = prompt.with_default(saved);
            }
            prompt.prompt().context("Failed to read email")?
        }
    };
    let password = match args.password {
        Some(password) => password,
        None => Password::new("Password:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .context("Failed to read password")?,
    };

    let credentials = Credentials::new(email.trim(), password);
    if credentials.email.is_empty() || credentials.password.is_empty() {
        bail!("Email and password are both required");
    }
    Ok(credentials)
}

fn finish_sign_in(cli: &mut CliContext, email: &str) -> Result<()> {
    let token = cli
        .ctx
        .state::<Session>()
        .token()
        .context("Session has no token after signing in")?
        .to_owned();
    cli.config.set_auth(email, &token);
    cli.config.save_to(&cli.config_path)?;

    if let Some(profile) = cli.ctx.state::<Session>().current_user() {
        let name = profile.name.as_deref().unwrap_or(&profile.email);
        cli.out.info(format!("Signed in as {name}"));
    }
    cli.out
        .dim(format!("Token saved to {}", cli.config_path().display()));
    cli.out
        .dim(format!("→ {}", cli.ctx.state::<Route>().path()));
    Ok(())
}

#[instrument(skip_all, name = "login")]
pub async fn run_login(cli: &mut CliContext, args: CredentialArgs) -> Result<()> {
    let credentials = read_credentials(args, cli.config.email())?;
    let email = credentials.email.clone();
    info!("signing in as {email}");

    cli.ctx.add_state(LoginInput(credentials));
    cli.run(LoginCommand).await.context("Login failed")?;

    finish_sign_in(cli, &email)
}

#[instrument(skip_all, name = "register")]
pub async fn run_register(cli: &mut CliContext, args: CredentialArgs) -> Result<()> {
    let credentials = read_credentials(args, None)?;
    let email = credentials.email.clone();
    info!("registering {email}");

    cli.ctx.add_state(RegisterInput(credentials));
    cli.run(RegisterCommand).await.context("Registration failed")?;

    finish_sign_in(cli, &email)
}

#[instrument(skip_all, name = "logout")]
pub async fn run_logout(cli: &mut CliContext) -> Result<()> {
    if !cli.ctx.state::<Session>().is_authenticated() {
        cli.out.dim("Not signed in.");
        return Ok(());
    }

    cli.run(LogoutCommand).await;
    cli.persist_session()?;
    cli.out.success("Signed out");
    cli.out
        .dim(format!("→ {}", cli.ctx.state::<Route>().path()));
    Ok(())
}

#[instrument(skip_all, name = "whoami")]
pub async fn run_whoami(cli: &mut CliContext) -> Result<()> {
    if !cli.ctx.state::<Session>().is_authenticated() {
        bail!("Not signed in. Use `roster login` first.");
    }

    let result = cli.run(FetchUserProfileCommand).await;
    // A rejected token is dropped from the session; mirror that on disk.
    cli.persist_session()?;
    let profile = result.context("Saved session is no longer valid")?;

    cli.out.header(profile.name.as_deref().unwrap_or(&profile.email));
    cli.out.labeled("ID", profile.id);
    cli.out.labeled("Email", &profile.email);
    if let Some(role) = profile.role {
        cli.out.labeled("Role", role);
    }
    Ok(())
}
