//! The middleware stack and its compiler.
//!
//! A [`Stack`] is an ordered sequence of [`Middleware`]: position 0 is the
//! outermost wrapper (first in, last out), the last element sits closest to
//! the terminal handler. Build one at startup, derive variants with
//! [`clone`](Clone::clone) or [`with`](Stack::with), and compile each variant
//! into a single [`ArcHandler`] with [`handler`](Stack::handler).
//!
//! # Compilation is a snapshot
//!
//! [`handler`](Stack::handler) reads the stack exactly once, folding the
//! wrappers around the terminal right then. The handler it returns holds no
//! reference back into the stack — push to the stack afterwards, replace an
//! element, drop the stack entirely: pipelines already compiled keep
//! behaving exactly as they did. Compile, hand the handler off for repeated
//! concurrent use, keep mutating the stack for other purposes.
//!
//! # Two stacks never share storage
//!
//! `clone` and `with` give the derived stack its own backing buffer; only the
//! `Arc`'d wrappers themselves are shared, and those are immutable. Growing
//! either stack is invisible to the other.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tracing::trace;

use crate::controller::Controller;
use crate::handler::{ArcHandler, BoxFuture, Request, handler_fn};
use crate::middleware::Middleware;
use crate::response::ResponseWriter;

/// An ordered, growable sequence of [`Middleware`], outermost first.
///
/// Derefs to `[Middleware]`, so existing elements can be inspected and
/// replaced in place:
///
/// ```rust
/// use tsumiki::{Stack, middleware};
///
/// let mut stack = Stack::new();
/// stack.push(middleware::identity());
/// stack[0] = middleware::identity(); // swap a slot without reshuffling
/// ```
#[derive(Clone, Default)]
pub struct Stack {
    layers: Vec<Middleware>,
}

impl Stack {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Appends a wrapper at the innermost position.
    pub fn push(&mut self, wrap: Middleware) {
        self.layers.push(wrap);
    }

    /// [`push`](Stack::push) when `cond` holds; a no-op otherwise.
    ///
    /// Sugar for feature-flagged wrappers:
    ///
    /// ```rust,ignore
    /// stack.push_if(config.require_auth, auth_middleware());
    /// ```
    pub fn push_if(&mut self, cond: bool, wrap: Middleware) {
        if cond {
            self.push(wrap);
        }
    }

    /// Returns a new stack: this stack's wrappers followed by `extra`.
    ///
    /// The receiver is untouched, and the returned stack owns its own
    /// buffer — pushing to either afterwards never shows through the other.
    pub fn with(&self, extra: impl IntoIterator<Item = Middleware>) -> Self {
        let mut derived = self.clone();
        derived.layers.extend(extra);
        derived
    }

    /// Compiles the stack into a single handler around `terminal`.
    ///
    /// Wrappers are applied from the last element toward the first, so for a
    /// stack `[w0, w1, w2]` the result is `w0(w1(w2(terminal)))` — `w0` runs
    /// first on the way in and last on the way out. An empty stack returns
    /// `terminal` unchanged.
    ///
    /// The compiled handler is itself a plain [`ArcHandler`]: it can be the
    /// terminal of another stack, which makes `handler` a middleware in its
    /// own right.
    pub fn handler(&self, terminal: ArcHandler) -> ArcHandler {
        trace!(layers = self.layers.len(), "compiling middleware stack");
        self.layers
            .iter()
            .rev()
            .fold(terminal, |inner, wrap| wrap(inner))
    }

    /// Compiles the stack around a closure-shaped terminal handler.
    ///
    /// Convenience for [`handler`](Stack::handler) + [`handler_fn`].
    pub fn handler_fn<F>(&self, f: F) -> ArcHandler
    where
        F: Fn(Arc<Request>, ResponseWriter) -> BoxFuture + Send + Sync + 'static,
    {
        self.handler(handler_fn(f))
    }

    /// Compiles the stack around a [`Controller`] terminal.
    pub fn controller(&self, c: Controller) -> ArcHandler {
        self.handler(Arc::new(c))
    }
}

impl Deref for Stack {
    type Target = [Middleware];

    fn deref(&self) -> &Self::Target {
        &self.layers
    }
}

impl DerefMut for Stack {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.layers
    }
}

impl From<Vec<Middleware>> for Stack {
    fn from(layers: Vec<Middleware>) -> Self {
        Self { layers }
    }
}

impl FromIterator<Middleware> for Stack {
    fn from_iter<I: IntoIterator<Item = Middleware>>(iter: I) -> Self {
        Self { layers: iter.into_iter().collect() }
    }
}

impl Extend<Middleware> for Stack {
    fn extend<I: IntoIterator<Item = Middleware>>(&mut self, iter: I) {
        self.layers.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::middleware;

    fn request() -> Arc<Request> {
        Arc::new(http::Request::builder().uri("/").body(Bytes::new()).unwrap())
    }

    /// Writes `mark` before delegating and again after.
    fn tag(mark: &'static str) -> Middleware {
        middleware::from_fn(move |next: ArcHandler| {
            handler_fn(move |req, mut w| {
                let next = Arc::clone(&next);
                Box::pin(async move {
                    w.write(mark);
                    let mut w = next.serve(req, w).await;
                    w.write(mark);
                    w
                })
            })
        })
    }

    fn terminal(mark: &'static str) -> ArcHandler {
        handler_fn(move |_req, mut w| {
            Box::pin(async move {
                w.write(mark);
                w
            })
        })
    }

    async fn body_of(h: &ArcHandler) -> String {
        let w = h.serve(request(), ResponseWriter::new()).await;
        String::from_utf8_lossy(w.body()).into_owned()
    }

    #[tokio::test]
    async fn onion_ordering() {
        let stack = Stack::from(vec![tag("1"), tag("2"), tag("3")]);
        let h = stack.handler(terminal("h"));

        assert_eq!(body_of(&h).await, "123h321");
    }

    #[tokio::test]
    async fn compiled_handler_survives_stack_mutation() {
        let mut stack = Stack::from(vec![tag("1"), tag("2"), tag("3")]);
        let h = stack.handler(terminal("h"));

        // Disabling a slot after compilation must not reach into the
        // already-compiled pipeline.
        stack[0] = middleware::identity();

        assert_eq!(body_of(&h).await, "123h321");
        // Works repeatedly, too.
        assert_eq!(body_of(&h).await, "123h321");

        // Recompiling does see the identity slot.
        let h2 = stack.handler(terminal("h"));
        assert_eq!(body_of(&h2).await, "23h32");
    }

    #[tokio::test]
    async fn empty_stack_is_the_terminal() {
        let h = Stack::new().handler(terminal("h"));
        assert_eq!(body_of(&h).await, "h");
    }

    #[tokio::test]
    async fn clones_grow_independently() {
        let mut original = Stack::from(vec![tag("1")]);
        let h1 = original.handler(terminal("h"));

        let mut cloned = original.clone();
        cloned[0] = tag("2");

        original.push(tag("3"));
        cloned.push(tag("4"));

        // Neither stack saw the other's changes, and h1 predates all of them.
        assert_eq!(body_of(&h1).await, "1h1");
        assert_eq!(body_of(&original.handler(terminal("h"))).await, "13h31");
        assert_eq!(body_of(&cloned.handler(terminal("h"))).await, "24h42");
    }

    #[tokio::test]
    async fn with_derives_without_mutating() {
        let mut original = Stack::from(vec![tag("1"), tag("3")]);
        let derived = original.with([tag("5")]);

        let h_derived = derived.handler(terminal("h"));
        assert_eq!(body_of(&h_derived).await, "135h531");

        // Growing either side afterwards leaves the other alone.
        original.push(tag("7"));
        assert_eq!(body_of(&h_derived).await, "135h531");
        assert_eq!(body_of(&derived.handler(terminal("h"))).await, "135h531");
        assert_eq!(body_of(&original.handler(terminal("h"))).await, "137h731");
    }

    #[tokio::test]
    async fn push_if_respects_its_condition() {
        let mut stack = Stack::from(vec![tag("1")]);

        stack.push_if(true, tag("3"));
        stack.push_if(false, tag("4"));

        let h = stack.handler(terminal("h"));
        assert_eq!(body_of(&h).await, "13h31");
    }

    #[tokio::test]
    async fn compiled_pipeline_is_shareable_across_tasks() {
        let stack = Stack::from(vec![tag("1"), tag("2")]);
        let h = stack.handler(terminal("h"));

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let h = Arc::clone(&h);
            tasks.spawn(async move {
                let w = h.serve(request(), ResponseWriter::new()).await;
                String::from_utf8_lossy(w.body()).into_owned()
            });
        }
        while let Some(body) = tasks.join_next().await {
            assert_eq!(body.unwrap(), "12h21");
        }
    }
}
