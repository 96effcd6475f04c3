//! Route state for navigation.
//!
//! Navigating means replacing this state; whatever renders pages reads it.

use roster_states::State;
use serde::{Deserialize, Serialize};

/// Represents the current page/route of the application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    /// Shown when no session exists.
    #[default]
    Login,
    Register,
    /// Landing page after a successful sign-in.
    Home,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/auth/login",
            Self::Register => "/auth/register",
            Self::Home => "/",
        }
    }
}

impl State for Route {}
