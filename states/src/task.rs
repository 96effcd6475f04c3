//! Generation-tagged task identifiers.
//!
//! Every dispatch of a command bumps the generation of its resource key. Updates
//! produced by a task carry its `TaskId`; the context drops them when a newer
//! generation for the same resource exists, so a slow response can never
//! overwrite state written by a request issued after it.

use std::any::TypeId;

/// Unique identifier for a dispatched command.
///
/// Combines the resource key (a `TypeId`) with a generation counter so results of
/// an older dispatch can be told apart from the latest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    resource: TypeId,
    generation: u64,
}

impl TaskId {
    pub fn new(resource: TypeId, generation: u64) -> Self {
        Self {
            resource,
            generation,
        }
    }

    /// The resource key this task writes to.
    pub fn resource(&self) -> TypeId {
        self.resource
    }

    /// Higher generations were dispatched later.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` when `other` targets the same resource and was dispatched later.
    pub fn is_superseded_by(&self, other: &Self) -> bool {
        self.resource == other.resource && other.generation > self.generation
    }
}
