use std::any::Any;

/// A value owned by a [`StateCtx`](crate::StateCtx).
///
/// Each state type is stored at most once and is addressed by its concrete type.
pub trait State: Any + Send {}
