//! # Function-backed hook (`HookFn`)
//!
//! [`HookFn`] wraps a closure `F: Fn() -> Fut`, producing a fresh future per
//! call. Shared state between the hook and the caller goes through an explicit
//! `Arc<...>` captured by the closure.
//!
//! ## Example
//! ```rust
//! use deadline_guard::{BoxError, Hook, HookFn, HookRef};
//!
//! let h: HookRef = HookFn::arc("close-db", || async {
//!     // release connections...
//!     Ok::<_, BoxError>(())
//! });
//!
//! assert_eq!(h.name(), "close-db");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BoxError;
use crate::hooks::hook::Hook;

/// Shared handle to a hook.
pub type HookRef = Arc<dyn Hook>;

/// Function-backed hook implementation.
pub struct HookFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F, Fut> HookFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    /// Creates a new function-backed hook.
    ///
    /// Prefer [`HookFn::arc`] when you immediately need a [`HookRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the hook and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Hook for HookFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self) -> Result<(), BoxError> {
        (self.f)().await
    }
}

impl<F> std::fmt::Debug for HookFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookFn").field("name", &self.name).finish()
    }
}
