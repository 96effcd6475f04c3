use std::any::{Any, TypeId, type_name};
use std::collections::BTreeMap;
use std::fmt;

use flume::{Receiver, Sender};
use log::{debug, error};
use tokio::task::JoinSet;

use crate::updater::Update;
use crate::{Command, CommandFuture, Error, LatestOnlyUpdater, State, TaskId, Updater};

type PendingCommand = Box<dyn FnOnce(&mut StateCtx) -> CommandFuture<()> + Send>;

struct Slot {
    name: &'static str,
    value: Box<dyn Any + Send>,
}

/// Owner of all application state.
///
/// The context is single-owner: only the holder of `&mut StateCtx` mutates state,
/// either directly or by applying queued updates with [`StateCtx::sync`].
pub struct StateCtx {
    states: BTreeMap<TypeId, Slot>,
    generations: BTreeMap<TypeId, u64>,

    send: Sender<Update>,
    recv: Receiver<Update>,

    pending: Vec<PendingCommand>,
    tasks: JoinSet<()>,
}

impl fmt::Debug for StateCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.states.values().map(|slot| slot.name).collect();
        f.debug_struct("StateCtx")
            .field("states", &names)
            .field("queued_updates", &self.recv.len())
            .field("pending_commands", &self.pending.len())
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

impl Default for StateCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl StateCtx {
    pub fn new() -> Self {
        let (send, recv) = flume::unbounded();

        Self {
            states: BTreeMap::new(),
            generations: BTreeMap::new(),
            send,
            recv,
            pending: Vec::new(),
            tasks: JoinSet::new(),
        }
    }

    /// Insert a state, replacing any previous value of the same type.
    pub fn add_state<T: State>(&mut self, state: T) {
        self.states.insert(
            TypeId::of::<T>(),
            Slot {
                name: type_name::<T>(),
                value: Box::new(state),
            },
        );
    }

    pub fn has_state<T: State>(&self) -> bool {
        self.states.contains_key(&TypeId::of::<T>())
    }

    pub fn try_state<T: State>(&self) -> Result<&T, Error> {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.value.downcast_ref::<T>())
            .ok_or_else(|| Error::state_not_found(type_name::<T>(), "read"))
    }

    pub fn try_state_mut<T: State>(&mut self) -> Result<&mut T, Error> {
        self.states
            .get_mut(&TypeId::of::<T>())
            .and_then(|slot| slot.value.downcast_mut::<T>())
            .ok_or_else(|| Error::state_not_found(type_name::<T>(), "write"))
    }

    /// Read a registered state.
    ///
    /// # Panics
    /// Panics if `T` was never added; registration happens once at startup.
    pub fn state<T: State>(&self) -> &T {
        self.try_state::<T>()
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// Mutably borrow a registered state.
    ///
    /// # Panics
    /// Panics if `T` was never added.
    pub fn state_mut<T: State>(&mut self) -> &mut T {
        self.try_state_mut::<T>()
            .unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn updater(&self) -> Updater {
        Updater::new(self.send.clone())
    }

    /// Apply every queued update in order.
    ///
    /// Updates tagged with a superseded task are dropped. Returns how many
    /// updates were applied.
    pub fn sync(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.recv.try_recv() {
            if let Some(task) = update.task
                && !self.is_current(task)
            {
                debug!(
                    "StateCtx: dropping stale update (generation {}, latest {})",
                    task.generation(),
                    self.generation(task.resource())
                );
                continue;
            }
            (update.apply)(self);
            applied += 1;
        }
        applied
    }

    /// Latest generation dispatched for `resource`, `0` if none.
    pub fn generation(&self, resource: TypeId) -> u64 {
        self.generations.get(&resource).copied().unwrap_or(0)
    }

    /// `false` once a later dispatch for the same resource exists.
    pub fn is_current(&self, task: TaskId) -> bool {
        let latest = TaskId::new(task.resource(), self.generation(task.resource()));
        !task.is_superseded_by(&latest)
    }

    fn next_task(&mut self, resource: TypeId) -> TaskId {
        let generation = self.generations.entry(resource).or_insert(0);
        *generation += 1;
        TaskId::new(resource, *generation)
    }

    /// Start a command and return its future.
    ///
    /// The synchronous half of the command runs now and its immediate effects are
    /// applied before this returns. Call [`StateCtx::sync`] after awaiting the
    /// future to apply the rest.
    pub fn dispatch<C: Command>(&mut self, command: C) -> CommandFuture<C::Output> {
        let task = self.next_task(command.resource());
        let updater = LatestOnlyUpdater::new(self.updater(), task);
        let future = command.run(self, updater);
        self.sync();
        future
    }

    /// Dispatch, await and sync in one call.
    pub async fn execute<C: Command>(&mut self, command: C) -> C::Output {
        let future = self.dispatch(command);
        let output = future.await;
        self.sync();
        output
    }

    /// Queue a command to be dispatched by the next [`StateCtx::flush_commands`].
    pub fn enqueue<C: Command>(&mut self, command: C) {
        let job: PendingCommand = Box::new(move |ctx: &mut StateCtx| -> CommandFuture<()> {
            let future = ctx.dispatch(command);
            Box::pin(async move {
                drop(future.await);
            })
        });
        self.pending.push(job);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Dispatch every queued command onto the task set.
    ///
    /// Requires a running tokio runtime.
    pub fn flush_commands(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let count = pending.len();
        for job in pending {
            let future = job(self);
            self.tasks.spawn(future);
        }
        count
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Run queued commands until no task is left, syncing after each one.
    pub async fn settle(&mut self) {
        loop {
            self.sync();
            self.flush_commands();
            match self.tasks.join_next().await {
                Some(Ok(())) => {}
                Some(Err(err)) => error!("StateCtx: command task failed: {err}"),
                None => break,
            }
        }
        self.sync();
    }
}
