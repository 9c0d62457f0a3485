//! The middleware shape: a function over handlers.
//!
//! A middleware is anything that takes the next stage and returns a new stage
//! wrapped around it. The wrapper may work before delegating, after
//! delegating, or decide not to delegate at all — the classic onion.
//! Any state a middleware needs lives in its own captures; the composition
//! machinery never sees it.

use std::sync::Arc;

use crate::handler::ArcHandler;

/// A wrapping transformation: given the inner handler, produce the outer one.
///
/// `Arc`'d so a [`Stack`](crate::Stack) can be cloned and snapshotted without
/// copying closures.
pub type Middleware = Arc<dyn Fn(ArcHandler) -> ArcHandler + Send + Sync>;

/// Wraps a closure into a [`Middleware`].
///
/// ```rust
/// use std::sync::Arc;
/// use tsumiki::{handler_fn, middleware, ArcHandler};
///
/// // Writes "<" on the way in and ">" on the way out.
/// let angle = middleware::from_fn(|next: ArcHandler| {
///     handler_fn(move |req, mut w| {
///         let next = Arc::clone(&next);
///         Box::pin(async move {
///             w.write("<");
///             let mut w = next.serve(req, w).await;
///             w.write(">");
///             w
///         })
///     })
/// });
/// ```
pub fn from_fn<F>(f: F) -> Middleware
where
    F: Fn(ArcHandler) -> ArcHandler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The pass-through middleware: returns the inner handler unchanged.
///
/// Useful for disabling a slot in place — replace a stack element with
/// `identity()` and recompile, instead of shifting every position after it.
/// Compiling around it costs nothing: no wrapper handler is allocated.
pub fn identity() -> Middleware {
    Arc::new(|next| next)
}
