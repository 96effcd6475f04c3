//! Typed state container shared by the roster actions.
//!
//! - [`State`]: any value stored once per type in a [`StateCtx`].
//! - [`Command`]: an action; its synchronous half reads the context, its future does IO.
//! - [`Updater`] / [`LatestOnlyUpdater`]: how a command future reports state changes.
//! - [`TaskId`]: per-resource generation used to drop stale results.

mod command;
mod ctx;
mod error;
mod state;
mod task;
mod updater;

pub use command::{Command, CommandFuture};
pub use ctx::StateCtx;
pub use error::{Error, Result};
pub use state::State;
pub use task::TaskId;
pub use updater::{LatestOnlyUpdater, Updater};
