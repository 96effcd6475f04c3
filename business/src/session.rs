//! Session and credential-draft states.

use roster_states::State;
use serde::Serialize;

use crate::model::UserProfile;

/// Where the session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Anonymous,
    /// A login or register request is in flight.
    Authenticating,
    Authenticated,
}

/// Authentication token plus the cached profile of the current user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    token: Option<String>,
    current_user: Option<UserProfile>,
    logins_in_flight: u32,
}

impl State for Session {}

impl Session {
    /// Seed a session from a persisted token; the profile is fetched separately.
    pub fn restore(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: (!token.is_empty()).then_some(token),
            ..Self::default()
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.current_user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_logging_in(&self) -> bool {
        self.logins_in_flight > 0
    }

    pub fn status(&self) -> AuthStatus {
        if self.is_logging_in() {
            AuthStatus::Authenticating
        } else if self.is_authenticated() {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Anonymous
        }
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn set_current_user(&mut self, profile: UserProfile) {
        self.current_user = Some(profile);
    }

    /// Drop token and profile.
    pub fn clear(&mut self) {
        self.token = None;
        self.current_user = None;
    }

    pub(crate) fn begin_login(&mut self) {
        self.logins_in_flight += 1;
    }

    pub(crate) fn end_login(&mut self) {
        self.logins_in_flight = self.logins_in_flight.saturating_sub(1);
    }
}

/// Email/password pair sent to the login and register routes.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_empty() && self.password.is_empty()
    }
}

/// Draft of the login form; cleared after a successful login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginInput(pub Credentials);

impl State for LoginInput {}

/// Draft of the registration form; cleared after a successful registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterInput(pub Credentials);

impl State for RegisterInput {}
