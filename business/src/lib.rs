//! Client-side actions for the roster backend.
//!
//! Every action is a [`Command`](roster_states::Command) run against a
//! [`StateCtx`]: mark loading, send one request through [`Rest`], then report
//! state changes, notifications and navigation back to the context.

mod auth;
mod config;
mod http;
mod model;
mod notification;
mod route;
mod session;
mod users;

use roster_states::StateCtx;

pub use auth::{
    AuthResponse, FetchUserProfileCommand, LoginCommand, LogoutCommand, RegisterCommand,
};
pub use config::BusinessConfig;
pub use http::{
    Method, PreparedRequest, RequestError, RequestOptions, RequestResult, Response, Rest,
    build_request,
};
pub use model::{Role, User, UserProfile};
pub use notification::{
    ACTIVATE_NOTIFICATIONS, DEACTIVATE_NOTIFICATIONS, LOGIN_NOTIFICATIONS, Notification,
    NotificationKind, NotificationPair, Notifications, REGISTER_NOTIFICATIONS,
    SET_ROLE_NOTIFICATIONS,
};
pub use route::Route;
pub use session::{AuthStatus, Credentials, LoginInput, RegisterInput, Session};
pub use users::{
    ActivateUserCommand, DEFAULT_PER_PAGE, DeactivateUserCommand, FetchAdminCollectionCommand,
    FetchCollectionCommand, FetchUserCommand, Pagination, SetUserRoleCommand, SortOrder,
    UsersState, filtered_collection,
};

/// A context holding every state the actions read or write.
pub fn build_state_ctx(config: BusinessConfig) -> StateCtx {
    let mut ctx = StateCtx::new();

    ctx.add_state(config);
    ctx.add_state(Rest::new());
    ctx.add_state(Session::default());
    ctx.add_state(LoginInput::default());
    ctx.add_state(RegisterInput::default());
    ctx.add_state(Route::default());
    ctx.add_state(Notifications::default());
    ctx.add_state(UsersState::default());

    ctx
}
