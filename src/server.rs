use hyper::{
    service::{make_service_fn, service_fn},
    Body, Method, Request, Response, Server, StatusCode,
};
use std::net::SocketAddr;
use tracing::info;

use crate::util::{Error, HEALTH_PATH};

#[cfg(feature = "metrics")]
use hyper::header::CONTENT_TYPE;
#[cfg(feature = "metrics")]
use prometheus::{Encoder, TextEncoder};

/// Path the prometheus metrics are served on.
#[cfg(feature = "metrics")]
pub(crate) const METRICS_PATH: &str = "/metrics";

fn respond(status: StatusCode, body: impl Into<Body>) -> Response<Body> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response
}

/// Encodes every registered metric in the text exposition format.
#[cfg(feature = "metrics")]
fn serve_metrics() -> Response<Body> {
    let encoder = TextEncoder::new();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        return respond(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }
    let mut response = respond(StatusCode::OK, buffer);
    if let Ok(content_type) = encoder.format_type().parse() {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    response
}

/// Routes a request to the liveness or metrics handler.
pub(crate) async fn serve_req(req: Request<Body>) -> Result<Response<Body>, hyper::Error> {
    let response = match (req.method(), req.uri().path()) {
        (&Method::GET, HEALTH_PATH) => respond(StatusCode::OK, "ok"),
        #[cfg(feature = "metrics")]
        (&Method::GET, METRICS_PATH) => serve_metrics(),
        _ => respond(StatusCode::NOT_FOUND, Body::empty()),
    };
    Ok(response)
}

/// Serves the liveness endpoint on the given port until the server
/// fails. Being able to bind the port is what counts as alive.
pub async fn run_server(port: u16) -> Result<(), Error> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let server = Server::try_bind(&addr)?.serve(make_service_fn(|_| async {
        Ok::<_, hyper::Error>(service_fn(serve_req))
    }));
    info!(%addr, "listening for health checks");
    server.await?;
    Ok(())
}
