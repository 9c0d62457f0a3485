//! Minimal tsumiki example — one compiled pipeline mounted on a hyper server.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example hello
//!
//! Try:
//!   curl -i http://localhost:3000/            # 401, the controller stops
//!   curl -i http://localhost:3000/ -H 'authorization: Bearer x'
//!   POWERED_BY=1 cargo run --example hello    # push_if adds a header

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::header::{self, HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::BodyExt;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use tsumiki::{ArcHandler, Controller, Middleware, Request, ResponseWriter, Stack};
use tsumiki::{handler_fn, middleware};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // Build the stack once at startup; compile it once; serve it forever.
    let mut stack = Stack::new();
    stack.push(timing());
    stack.push_if(std::env::var_os("POWERED_BY").is_some(), powered_by());

    let pipeline = stack.controller(auth_gate());

    let listener = TcpListener::bind("0.0.0.0:3000").await.expect("bind failed");
    info!("listening on 0.0.0.0:3000");

    loop {
        let (stream, remote_addr) = match listener.accept().await {
            Ok(v) => v,
            Err(e) => {
                error!("accept error: {e}");
                continue;
            }
        };

        let pipeline = Arc::clone(&pipeline);
        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let svc = service_fn(move |req| {
                let pipeline = Arc::clone(&pipeline);
                async move { dispatch(pipeline, req).await }
            });

            if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                .serve_connection(io, svc)
                .await
            {
                error!(peer = %remote_addr, "connection error: {e}");
            }
        });
    }
}

/// Host glue: buffer the hyper request, run the pipeline, hand the finalized
/// response back. This is the only place the two worlds touch.
async fn dispatch(
    pipeline: ArcHandler,
    req: hyper::Request<hyper::body::Incoming>,
) -> Result<http::Response<http_body_util::Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => Bytes::new(),
    };
    let req: Arc<Request> = Arc::new(http::Request::from_parts(parts, bytes));

    let w = pipeline.serve(req, ResponseWriter::new()).await;
    Ok(w.into_response())
}

/// Logs method, path, status and latency for every request.
fn timing() -> Middleware {
    middleware::from_fn(|next: ArcHandler| {
        handler_fn(move |req, w| {
            let next = Arc::clone(&next);
            Box::pin(async move {
                let started = Instant::now();
                let method = req.method().clone();
                let path = req.uri().path().to_owned();

                let w = next.serve(req, w).await;

                info!(
                    %method,
                    %path,
                    status = %w.status(),
                    elapsed = ?started.elapsed(),
                    "request"
                );
                w
            })
        })
    })
}

/// Stamps an `x-powered-by` header on the way out.
fn powered_by() -> Middleware {
    middleware::from_fn(|next: ArcHandler| {
        handler_fn(move |req, w| {
            let next = Arc::clone(&next);
            Box::pin(async move {
                let mut w = next.serve(req, w).await;
                w.header(
                    HeaderName::from_static("x-powered-by"),
                    HeaderValue::from_static("tsumiki"),
                );
                w
            })
        })
    })
}

/// Rejects unauthenticated requests outright; hands the rest to the hello
/// handler. Swapping which handler runs per request is the whole point of a
/// controller.
fn auth_gate() -> Controller {
    Controller::new(|req, mut w| {
        Box::pin(async move {
            if req.headers().get(header::AUTHORIZATION).is_none() {
                w.set_status(StatusCode::UNAUTHORIZED);
                w.write("who are you?\n");
                return (w, None);
            }

            (
                w,
                Some(handler_fn(|_req, mut w| {
                    Box::pin(async move {
                        w.header(
                            header::CONTENT_TYPE,
                            HeaderValue::from_static("text/plain; charset=utf-8"),
                        );
                        w.write("hello\n");
                        w
                    })
                })),
            )
        })
    })
}
