//! Handler trait and type erasure.
//!
//! # How handlers are stored
//!
//! A middleware stack holds stages of *different* types — closures, nested
//! wrappers, controllers — in a single pipeline. Rust needs one concrete type
//! for that, so stages live behind **trait objects** (`dyn Handler`) shared
//! as `Arc`s.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! |req, w| Box::pin(async move { … })   ← user writes this
//!        ↓ handler_fn(f)
//! Arc::new(FnHandler(f))                ← heap-allocated wrapper
//!        ↓  stored as ArcHandler = Arc<dyn Handler>
//! handler.serve(req, w)  at request time  ← one vtable dispatch
//! ```
//!
//! The only runtime cost per stage is **one Arc clone** (atomic inc) +
//! **one virtual call** — negligible compared to network I/O.
//!
//! # Why the writer moves
//!
//! [`serve`](Handler::serve) takes the [`ResponseWriter`] **by value** and the
//! returned future resolves to it. Each stage owns the sink while it runs and
//! hands it to the next stage when it delegates. No sink is ever shared
//! between two invocations, so a compiled pipeline is safe to invoke from any
//! number of concurrent tasks — the only shared state is the immutable
//! handlers themselves.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::response::ResponseWriter;

/// An incoming HTTP request.
///
/// The host stack's type, used as-is: this crate neither parses nor
/// serializes wire data. Pipelines share it as `Arc<Request>` — every stage
/// sees the same request, no copies.
pub type Request = http::Request<bytes::Bytes>;

/// A heap-allocated, type-erased future that resolves to the
/// [`ResponseWriter`] the stage was given.
///
/// `Pin<Box<…>>` because the runtime must be able to poll the future in-place;
/// `Send + 'static` because the sink and request are owned, not borrowed —
/// tokio can move the future across threads freely.
pub type BoxFuture = Pin<Box<dyn Future<Output = ResponseWriter> + Send + 'static>>;

/// A stage in a request pipeline: accepts a request and a response sink,
/// writes whatever it writes, and yields the sink back.
///
/// Implemented by [`Controller`](crate::Controller), by everything
/// [`handler_fn`] wraps, and by the output of
/// [`Stack::handler`](crate::Stack::handler) — a compiled pipeline is itself
/// just a `Handler`.
pub trait Handler: Send + Sync {
    /// Processes one request against one response sink.
    fn serve(&self, req: Arc<Request>, w: ResponseWriter) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across pipeline stages and
/// concurrent requests.
pub type ArcHandler = Arc<dyn Handler + 'static>;

/// Wraps a closure-shaped handler into an [`ArcHandler`].
///
/// The closure receives the request and the sink and returns a boxed future
/// that yields the sink back:
///
/// ```rust
/// use tsumiki::handler_fn;
///
/// let hello = handler_fn(|_req, mut w| Box::pin(async move {
///     w.write("hello");
///     w
/// }));
/// ```
pub fn handler_fn<F>(f: F) -> ArcHandler
where
    F: Fn(Arc<Request>, ResponseWriter) -> BoxFuture + Send + Sync + 'static,
{
    Arc::new(FnHandler(f))
}

/// Newtype bridging a concrete closure to the trait-object world.
struct FnHandler<F>(F);

impl<F> Handler for FnHandler<F>
where
    F: Fn(Arc<Request>, ResponseWriter) -> BoxFuture + Send + Sync + 'static,
{
    fn serve(&self, req: Arc<Request>, w: ResponseWriter) -> BoxFuture {
        (self.0)(req, w)
    }
}
