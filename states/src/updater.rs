//! Channels that carry state changes from command futures back to the context.
//!
//! Futures returned by a [`Command`](crate::Command) never hold the context. They
//! describe their effects as closures sent through an [`Updater`], and the owner
//! of the context applies them in order with [`StateCtx::sync`](crate::StateCtx::sync).

use std::any::type_name;
use std::fmt;

use flume::Sender;
use log::{debug, warn};

use crate::{Command, State, StateCtx, TaskId};

pub(crate) type ApplyFn = Box<dyn FnOnce(&mut StateCtx) + Send>;

/// A queued state change, optionally tagged with the task that produced it.
pub(crate) struct Update {
    pub(crate) task: Option<TaskId>,
    pub(crate) apply: ApplyFn,
}

/// Sends state changes that are always applied.
#[derive(Clone)]
pub struct Updater {
    send: Sender<Update>,
}

impl fmt::Debug for Updater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updater")
            .field("queued", &self.send.len())
            .finish()
    }
}

impl Updater {
    pub(crate) fn new(send: Sender<Update>) -> Self {
        Self { send }
    }

    /// Replace a state wholesale.
    pub fn set<T: State>(&self, value: T) {
        self.push(None, Box::new(move |ctx: &mut StateCtx| ctx.add_state(value)));
    }

    /// Mutate a state in place.
    pub fn update<T: State>(&self, f: impl FnOnce(&mut T) + Send + 'static) {
        self.push(None, mutate::<T>(f));
    }

    /// Queue a command; it is dispatched on the next `flush_commands`.
    pub fn enqueue<C: Command>(&self, command: C) {
        self.push(None, Box::new(move |ctx: &mut StateCtx| ctx.enqueue(command)));
    }

    fn push(&self, task: Option<TaskId>, apply: ApplyFn) {
        if self.send.send(Update { task, apply }).is_err() {
            debug!("Updater: context dropped, discarding update");
        }
    }
}

/// Sends state changes that only apply while their task is the latest dispatch
/// for its resource.
///
/// Updates from a superseded task are dropped at `sync` time. Use
/// [`LatestOnlyUpdater::always`] for effects that must land regardless, such as
/// resetting a loading counter.
#[derive(Debug, Clone)]
pub struct LatestOnlyUpdater {
    inner: Updater,
    task: TaskId,
}

impl LatestOnlyUpdater {
    pub(crate) fn new(inner: Updater, task: TaskId) -> Self {
        Self { inner, task }
    }

    pub fn task(&self) -> TaskId {
        self.task
    }

    /// The unguarded updater sharing this channel.
    pub fn always(&self) -> &Updater {
        &self.inner
    }

    pub fn set<T: State>(&self, value: T) {
        self.inner
            .push(Some(self.task), Box::new(move |ctx: &mut StateCtx| ctx.add_state(value)));
    }

    pub fn update<T: State>(&self, f: impl FnOnce(&mut T) + Send + 'static) {
        self.inner.push(Some(self.task), mutate::<T>(f));
    }

    pub fn enqueue<C: Command>(&self, command: C) {
        self.inner
            .push(Some(self.task), Box::new(move |ctx: &mut StateCtx| ctx.enqueue(command)));
    }
}

fn mutate<T: State>(f: impl FnOnce(&mut T) + Send + 'static) -> ApplyFn {
    Box::new(move |ctx: &mut StateCtx| match ctx.try_state_mut::<T>() {
        Ok(state) => f(state),
        Err(err) => warn!("Updater: dropping update for {}: {err}", type_name::<T>()),
    })
}
