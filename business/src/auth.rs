//! Auth actions: login, register, profile fetch and logout.
//!
//! All four share the [`Session`] resource key, so a response that arrives after
//! a newer auth action was dispatched is ignored.
//!
//! ## Login / register flow
//!
//! 1. Marks the session as authenticating
//! 2. POSTs the staged credentials to the login or register route
//! 3. On success: stores the token, clears the draft, notifies, queues
//!    [`FetchUserProfileCommand`] and navigates home without waiting for it
//! 4. On failure: notifies and returns the error
//!
//! The authenticating mark is released on both branches.

use std::any::TypeId;

use log::{error, info};
use roster_states::{Command, CommandFuture, LatestOnlyUpdater, StateCtx};
use serde::Deserialize;

use crate::config::BusinessConfig;
use crate::http::{RequestError, RequestOptions, RequestResult, Rest};
use crate::model::UserProfile;
use crate::notification::{
    LOGIN_NOTIFICATIONS, NotificationPair, Notifications, REGISTER_NOTIFICATIONS,
};
use crate::route::Route;
use crate::session::{Credentials, LoginInput, RegisterInput, Session};

/// Body returned by the login and register routes.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// Session token for authenticated API calls.
    #[serde(default)]
    pub token: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn require_token(response: AuthResponse) -> RequestResult<AuthResponse> {
    if response.token.trim().is_empty() {
        Err(RequestError::InvalidResponse(
            "server did not return a session token".to_owned(),
        ))
    } else {
        Ok(response)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Submission {
    Login,
    Register,
}

impl Submission {
    fn command_name(self) -> &'static str {
        match self {
            Self::Login => "LoginCommand",
            Self::Register => "RegisterCommand",
        }
    }

    fn notifications(self) -> NotificationPair {
        match self {
            Self::Login => LOGIN_NOTIFICATIONS,
            Self::Register => REGISTER_NOTIFICATIONS,
        }
    }
}

fn submit_credentials(
    submission: Submission,
    ctx: &StateCtx,
    updater: LatestOnlyUpdater,
) -> CommandFuture<RequestResult<AuthResponse>> {
    let config = ctx.state::<BusinessConfig>();
    let rest = ctx.state::<Rest>().clone();
    let (url, credentials): (String, Credentials) = match submission {
        Submission::Login => (config.login_route(), ctx.state::<LoginInput>().0.clone()),
        Submission::Register => (config.register_route(), ctx.state::<RegisterInput>().0.clone()),
    };
    let name = submission.command_name();
    let notifications = submission.notifications();

    updater.always().update::<Session>(Session::begin_login);

    Box::pin(async move {
        info!("{name}: submitting credentials for '{}'", credentials.email);

        let result = match RequestOptions::new().json(&credentials) {
            Ok(options) => rest
                .post::<AuthResponse>(&url, options)
                .await
                .and_then(require_token),
            Err(err) => Err(err),
        };

        updater.always().update::<Session>(Session::end_login);

        match result {
            Ok(response) => {
                info!("{name}: signed in as '{}'", credentials.email);
                let token = response.token.clone();
                updater.update::<Session>(move |session| session.set_token(token));
                match submission {
                    Submission::Login => updater.set(LoginInput::default()),
                    Submission::Register => updater.set(RegisterInput::default()),
                }
                updater.update::<Notifications>(move |bus| bus.push(notifications.success()));
                updater.enqueue(FetchUserProfileCommand);
                updater.set(Route::Home);
                Ok(response)
            }
            Err(err) => {
                error!("{name}: {err}");
                updater.update::<Notifications>(move |bus| bus.push(notifications.error()));
                Err(err)
            }
        }
    })
}

/// Signs in with the credentials staged in [`LoginInput`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LoginCommand;

impl Command for LoginCommand {
    type Output = RequestResult<AuthResponse>;

    fn resource(&self) -> TypeId {
        TypeId::of::<Session>()
    }

    fn run(&self, ctx: &StateCtx, updater: LatestOnlyUpdater) -> CommandFuture<Self::Output> {
        submit_credentials(Submission::Login, ctx, updater)
    }
}

/// Creates an account with the credentials staged in [`RegisterInput`].
#[derive(Debug, Default, Clone, Copy)]
pub struct RegisterCommand;

impl Command for RegisterCommand {
    type Output = RequestResult<AuthResponse>;

    fn resource(&self) -> TypeId {
        TypeId::of::<Session>()
    }

    fn run(&self, ctx: &StateCtx, updater: LatestOnlyUpdater) -> CommandFuture<Self::Output> {
        submit_credentials(Submission::Register, ctx, updater)
    }
}

/// Loads the profile of the session's token.
///
/// Any failure demotes the session: token and profile are both cleared.
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchUserProfileCommand;

impl Command for FetchUserProfileCommand {
    type Output = RequestResult<UserProfile>;

    fn resource(&self) -> TypeId {
        TypeId::of::<Session>()
    }

    fn run(&self, ctx: &StateCtx, updater: LatestOnlyUpdater) -> CommandFuture<Self::Output> {
        let url = ctx.state::<BusinessConfig>().profile_route();
        let rest = ctx.state::<Rest>().clone();
        let options = RequestOptions::new().maybe_bearer(ctx.state::<Session>().token());

        Box::pin(async move {
            match rest.get::<UserProfile>(&url, options).await {
                Ok(profile) => {
                    info!("FetchUserProfileCommand: loaded profile '{}'", profile.email);
                    let stored = profile.clone();
                    updater.update::<Session>(move |session| session.set_current_user(stored));
                    Ok(profile)
                }
                Err(err) => {
                    error!("FetchUserProfileCommand: {err}, clearing session");
                    updater.update::<Session>(Session::clear);
                    Err(err)
                }
            }
        })
    }
}

/// Clears the session and navigates to the login page. No network call.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogoutCommand;

impl Command for LogoutCommand {
    type Output = ();

    fn resource(&self) -> TypeId {
        TypeId::of::<Session>()
    }

    fn run(&self, _ctx: &StateCtx, updater: LatestOnlyUpdater) -> CommandFuture<()> {
        info!("LogoutCommand: user logged out");
        updater.update::<Session>(Session::clear);
        updater.set(Route::Login);
        Box::pin(async {})
    }
}
