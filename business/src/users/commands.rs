//! User collection actions.
//!
//! Reads share the [`UsersState`] resource key, so only the latest collection or
//! admin fetch lands. Record mutations (role, activate, deactivate) write through
//! the unguarded updater: each call owns exactly one notification and its patch,
//! whatever else was dispatched meanwhile.

use std::any::TypeId;

use chrono::Utc;
use log::{debug, error, info};
use reqwest::Url;
use roster_states::{Command, CommandFuture, LatestOnlyUpdater, StateCtx, Updater};
use serde::Serialize;
use ustr::Ustr;

use crate::config::BusinessConfig;
use crate::http::{Method, RequestError, RequestOptions, RequestResult, Rest};
use crate::model::{Role, User};
use crate::notification::{
    ACTIVATE_NOTIFICATIONS, DEACTIVATE_NOTIFICATIONS, NotificationPair, Notifications,
    SET_ROLE_NOTIFICATIONS,
};
use crate::session::Session;
use crate::users::state::UsersState;

/// Everything a users request needs, captured in the prologue.
struct Endpoint {
    rest: Rest,
    root: String,
    options: RequestOptions,
}

impl Endpoint {
    fn capture(ctx: &StateCtx) -> Self {
        Self {
            rest: ctx.state::<Rest>().clone(),
            root: ctx.state::<BusinessConfig>().users_root(),
            options: RequestOptions::new().maybe_bearer(ctx.state::<Session>().token()),
        }
    }
}

/// `<root>/<id>[/<action>]`, with `id` percent-encoded as one path segment.
fn record_url(root: &str, id: &str, action: Option<&str>) -> RequestResult<String> {
    let mut url =
        Url::parse(root).map_err(|err| RequestError::InvalidUrl(format!("{root}: {err}")))?;
    url.path_segments_mut()
        .map_err(|()| RequestError::InvalidUrl(format!("{root} cannot have a path")))?
        .pop_if_empty()
        .push(id)
        .extend(action);
    Ok(url.into())
}

/// Loads the active users, or the inactive ones when
/// [`UsersState::showing_inactive`] is set.
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchCollectionCommand;

impl Command for FetchCollectionCommand {
    type Output = RequestResult<Vec<User>>;

    fn resource(&self) -> TypeId {
        TypeId::of::<UsersState>()
    }

    fn run(&self, ctx: &StateCtx, updater: LatestOnlyUpdater) -> CommandFuture<Self::Output> {
        let Endpoint {
            rest,
            root,
            options,
        } = Endpoint::capture(ctx);
        let url = if ctx.state::<UsersState>().showing_inactive() {
            format!("{root}/past")
        } else {
            root
        };

        updater.always().update::<UsersState>(UsersState::begin_fetch);

        Box::pin(async move {
            let result = rest.get::<Vec<User>>(&url, options).await;
            updater.always().update::<UsersState>(UsersState::end_fetch);

            match result {
                Ok(users) => {
                    info!("FetchCollectionCommand: loaded {} users", users.len());
                    let items = users.clone();
                    let now = Utc::now();
                    updater.update::<UsersState>(move |state| state.set_items(items, now));
                    Ok(users)
                }
                Err(err) => {
                    error!("FetchCollectionCommand: {err}");
                    Err(err)
                }
            }
        })
    }
}

/// Loads the admin statistics payload.
///
/// The raw payload is kept in [`UsersState::admin_stats`]; when it is a list of
/// users it also replaces the collection. The filtered view is left as is.
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchAdminCollectionCommand;

impl Command for FetchAdminCollectionCommand {
    type Output = RequestResult<serde_json::Value>;

    fn resource(&self) -> TypeId {
        TypeId::of::<UsersState>()
    }

    fn run(&self, ctx: &StateCtx, updater: LatestOnlyUpdater) -> CommandFuture<Self::Output> {
        let Endpoint {
            rest,
            root,
            options,
        } = Endpoint::capture(ctx);
        let url = format!("{root}/adminstats");

        updater.always().update::<UsersState>(UsersState::begin_fetch);

        Box::pin(async move {
            let result = match rest.get::<serde_json::Value>(&url, options).await {
                Ok(payload) if payload.is_array() => {
                    serde_json::from_value::<Vec<User>>(payload.clone())
                        .map(|users| (payload, Some(users)))
                        .map_err(RequestError::Parse)
                }
                Ok(payload) => Ok((payload, None)),
                Err(err) => Err(err),
            };
            updater.always().update::<UsersState>(UsersState::end_fetch);

            match result {
                Ok((payload, users)) => {
                    let stats = payload.clone();
                    let now = Utc::now();
                    updater.update::<UsersState>(move |state| {
                        if let Some(users) = users {
                            state.set_items_unfiltered(users, now);
                        }
                        state.set_admin_stats(stats);
                    });
                    info!("FetchAdminCollectionCommand: loaded admin stats");
                    Ok(payload)
                }
                Err(err) => {
                    error!("FetchAdminCollectionCommand: {err}");
                    Err(err)
                }
            }
        })
    }
}

/// Loads one user into [`UsersState::model`].
#[derive(Debug, Clone)]
pub struct FetchUserCommand {
    pub id: Ustr,
}

impl FetchUserCommand {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self {
            id: Ustr::from(id.as_ref()),
        }
    }
}

impl Command for FetchUserCommand {
    type Output = RequestResult<User>;

    fn run(&self, ctx: &StateCtx, updater: LatestOnlyUpdater) -> CommandFuture<Self::Output> {
        let Endpoint {
            rest,
            root,
            options,
        } = Endpoint::capture(ctx);
        let url = record_url(&root, &self.id, None);
        let id = self.id;

        updater.always().update::<UsersState>(UsersState::begin_fetch);

        Box::pin(async move {
            let result = match url {
                Ok(url) => rest.get::<User>(&url, options).await,
                Err(err) => Err(err),
            };
            updater.always().update::<UsersState>(UsersState::end_fetch);

            match result {
                Ok(user) => {
                    info!("FetchUserCommand: loaded '{id}'");
                    let model = user.clone();
                    updater.update::<UsersState>(move |state| state.set_model(model));
                    Ok(user)
                }
                Err(err) => {
                    error!("FetchUserCommand: '{id}': {err}");
                    Err(err)
                }
            }
        })
    }
}

#[derive(Debug, Serialize)]
struct RoleBody {
    role: Role,
}

/// Sends one record mutation and patches the local copies once it is acknowledged.
fn mutate_record(
    name: &'static str,
    request: RequestResult<(Method, String, RequestOptions)>,
    rest: Rest,
    id: Ustr,
    notifications: NotificationPair,
    updater: Updater,
    patch: impl Fn(&mut User) + Send + 'static,
) -> CommandFuture<RequestResult<serde_json::Value>> {
    updater.update::<UsersState>(UsersState::begin_fetch);

    Box::pin(async move {
        let result = match request {
            Ok((method, url, options)) => {
                rest.request::<serde_json::Value>(method, &url, options)
                    .await
            }
            Err(err) => Err(err),
        };
        updater.update::<UsersState>(UsersState::end_fetch);

        match result {
            Ok(ack) => {
                info!("{name}: '{id}' updated");
                updater.update::<UsersState>(move |state| {
                    if !state.update_record(&id, patch) {
                        debug!("{name}: '{id}' is not loaded locally");
                    }
                });
                updater.update::<Notifications>(move |bus| bus.push(notifications.success()));
                Ok(ack)
            }
            Err(err) => {
                error!("{name}: '{id}': {err}");
                updater.update::<Notifications>(move |bus| bus.push(notifications.error()));
                Err(err)
            }
        }
    })
}

/// Assigns a role to a user.
#[derive(Debug, Clone)]
pub struct SetUserRoleCommand {
    pub id: Ustr,
    pub role: Role,
}

impl SetUserRoleCommand {
    pub fn new(id: impl AsRef<str>, role: Role) -> Self {
        Self {
            id: Ustr::from(id.as_ref()),
            role,
        }
    }
}

impl Command for SetUserRoleCommand {
    type Output = RequestResult<serde_json::Value>;

    fn run(&self, ctx: &StateCtx, updater: LatestOnlyUpdater) -> CommandFuture<Self::Output> {
        let Endpoint {
            rest,
            root,
            options,
        } = Endpoint::capture(ctx);
        let role = self.role.clone();
        let request = record_url(&root, &self.id, Some("role")).and_then(|url| {
            let options = options.json(&RoleBody { role: role.clone() })?;
            Ok((Method::Post, url, options))
        });

        mutate_record(
            "SetUserRoleCommand",
            request,
            rest,
            self.id,
            SET_ROLE_NOTIFICATIONS,
            updater.always().clone(),
            move |user| user.role = role.clone(),
        )
    }
}

/// Marks a user active.
#[derive(Debug, Clone)]
pub struct ActivateUserCommand {
    pub id: Ustr,
}

impl ActivateUserCommand {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self {
            id: Ustr::from(id.as_ref()),
        }
    }
}

impl Command for ActivateUserCommand {
    type Output = RequestResult<serde_json::Value>;

    fn run(&self, ctx: &StateCtx, updater: LatestOnlyUpdater) -> CommandFuture<Self::Output> {
        let Endpoint {
            rest,
            root,
            options,
        } = Endpoint::capture(ctx);

        mutate_record(
            "ActivateUserCommand",
            record_url(&root, &self.id, Some("activate")).map(|url| (Method::Put, url, options)),
            rest,
            self.id,
            ACTIVATE_NOTIFICATIONS,
            updater.always().clone(),
            |user| user.active = true,
        )
    }
}

/// Marks a user inactive.
#[derive(Debug, Clone)]
pub struct DeactivateUserCommand {
    pub id: Ustr,
}

impl DeactivateUserCommand {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self {
            id: Ustr::from(id.as_ref()),
        }
    }
}

impl Command for DeactivateUserCommand {
    type Output = RequestResult<serde_json::Value>;

    fn run(&self, ctx: &StateCtx, updater: LatestOnlyUpdater) -> CommandFuture<Self::Output> {
        let Endpoint {
            rest,
            root,
            options,
        } = Endpoint::capture(ctx);

        mutate_record(
            "DeactivateUserCommand",
            record_url(&root, &self.id, Some("deactivate")).map(|url| (Method::Put, url, options)),
            rest,
            self.id,
            DEACTIVATE_NOTIFICATIONS,
            updater.always().clone(),
            |user| user.active = false,
        )
    }
}
