//! # tsumiki
//!
//! Middleware composition for async HTTP handlers. Nothing more.
//! Nothing less.
//!
//! ## The contract
//!
//! Your HTTP server owns the wire: sockets, TLS, parsing, routing. tsumiki
//! does not — by design. It owns exactly one thing: turning an ordered pile
//! of wrappers and one terminal handler into a single handler, with ordering
//! and independence guarantees you can state precisely.
//!
//! What the host stack already owns — tsumiki intentionally ignores:
//!
//! - **Networking** — hyper, or whatever serves your bytes
//! - **Routing** — match the path before you pick a pipeline, not inside one
//! - **The middleware themselves** — logging, auth, CORS are yours to write
//!
//! What's left for tsumiki — the only part that is annoying to get right:
//!
//! - [`Stack`] — ordered wrappers; clone, extend, conditionally extend,
//!   compile into one [`ArcHandler`]. Compilation snapshots the stack, so
//!   mutating it later never disturbs a pipeline already handed out.
//! - [`Controller`] — a handler that decides per request whether anything
//!   else should run: finish the response and stop, or produce the handler
//!   that finishes it.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use tsumiki::{handler_fn, middleware, ArcHandler, Stack};
//!
//! # #[tokio::main(flavor = "current_thread")] async fn main() {
//! let mut stack = Stack::new();
//! stack.push(middleware::from_fn(|next: ArcHandler| {
//!     handler_fn(move |req, mut w| {
//!         let next = Arc::clone(&next);
//!         Box::pin(async move {
//!             w.write("> ");
//!             next.serve(req, w).await
//!         })
//!     })
//! }));
//!
//! let pipeline = stack.handler_fn(|_req, mut w| Box::pin(async move {
//!     w.write("hello");
//!     w
//! }));
//!
//! // One compiled handler, invoked per request by your server glue.
//! let req = Arc::new(http::Request::builder().uri("/").body(bytes::Bytes::new()).unwrap());
//! let w = pipeline.serve(req, tsumiki::ResponseWriter::new()).await;
//! assert_eq!(w.body(), b"> hello");
//! # }
//! ```
//!
//! See `demos/hello.rs` for the hyper wiring.

mod controller;
mod handler;
mod response;
mod stack;

pub mod middleware;

pub use controller::{Controller, Decision};
pub use handler::{ArcHandler, BoxFuture, Handler, Request, handler_fn};
pub use middleware::Middleware;
pub use response::ResponseWriter;
pub use stack::Stack;
