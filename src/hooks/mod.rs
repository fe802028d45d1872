//! # Shutdown hooks.
//!
//! This module provides the callables the shutdown sequence runs once the
//! deadline becomes imminent:
//! - [`Hook`] - trait for named async hooks (cleanup, timeout response)
//! - [`HookFn`] - function-based hook implementation
//! - [`HookRef`] - shared reference to a hook (`Arc<dyn Hook>`)

mod hook;
mod hook_fn;

pub use hook::Hook;
pub use hook_fn::{HookFn, HookRef};
