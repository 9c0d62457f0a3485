//! Handlers that decide at request time whether anything else should run.
//!
//! A [`Controller`] wraps a *decision function*: given the request and the
//! sink, it either finishes the response itself and returns `None` — the
//! pipeline stops there, by design, not by error — or returns `Some(handler)`
//! to hand the same request and sink to. Classic use: an auth gate that
//! writes `401` and stops, or picks a handler per role.
//!
//! `Controller` implements [`Handler`], so it slots in anywhere a handler
//! does — most usefully as the terminal of a compiled
//! [`Stack`](crate::Stack).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::trace;

use crate::handler::{ArcHandler, BoxFuture, Handler, Request};
use crate::response::ResponseWriter;

/// The future a decision function returns: the sink it was given, plus the
/// handler to delegate to — or `None` when the response is already complete.
pub type Decision =
    Pin<Box<dyn Future<Output = (ResponseWriter, Option<ArcHandler>)> + Send + 'static>>;

/// A [`Handler`] built from a decision function.
///
/// ```rust
/// use http::StatusCode;
/// use tsumiki::{handler_fn, Controller};
///
/// let gate = Controller::new(|req, mut w| Box::pin(async move {
///     if req.headers().get("authorization").is_none() {
///         w.set_status(StatusCode::UNAUTHORIZED);
///         return (w, None); // response complete, nothing else runs
///     }
///     (w, Some(handler_fn(|_req, mut w| Box::pin(async move {
///         w.write("secret");
///         w
///     }))))
/// }));
/// ```
pub struct Controller {
    decide: Arc<dyn Fn(Arc<Request>, ResponseWriter) -> Decision + Send + Sync>,
}

impl Controller {
    pub fn new<F>(decide: F) -> Self
    where
        F: Fn(Arc<Request>, ResponseWriter) -> Decision + Send + Sync + 'static,
    {
        Self { decide: Arc::new(decide) }
    }
}

impl Handler for Controller {
    /// Runs the decision function, then the handler it produced, if any.
    ///
    /// Each invocation is independent; nothing carries across calls.
    fn serve(&self, req: Arc<Request>, w: ResponseWriter) -> BoxFuture {
        let decide = Arc::clone(&self.decide);
        Box::pin(async move {
            let (w, next) = decide(Arc::clone(&req), w).await;
            match next {
                Some(handler) => handler.serve(req, w).await,
                None => {
                    trace!("controller completed the response itself");
                    w
                }
            }
        })
    }
}
