use std::any::TypeId;
use std::future::Future;
use std::pin::Pin;

use crate::{LatestOnlyUpdater, StateCtx};

/// Owned, sendable future returned by [`Command::run`].
pub type CommandFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// An action with side effects.
///
/// `run` is split in two halves:
/// - the synchronous body reads whatever it needs from the context and may queue
///   immediate effects (a loading flag, for instance) through the updater;
/// - the returned future performs the IO and reports every state change through
///   the updater. It must not borrow the context.
///
/// Dispatch with [`StateCtx::dispatch`] to await the output, or queue with
/// [`StateCtx::enqueue`] to run it in the background.
pub trait Command: Send + 'static {
    type Output: Send + 'static;

    /// Key whose generation is bumped on each dispatch.
    ///
    /// Commands writing the same state should share a key so the latest dispatch
    /// wins.
    fn resource(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    fn run(&self, ctx: &StateCtx, updater: LatestOnlyUpdater) -> CommandFuture<Self::Output>;
}
