//! Request Tracer
//!
//! Envuelve el pipeline completo: reusa o genera el correlation id, lo
//! devuelve en la respuesta y emite exactamente una línea estructurada
//! al completarse cada request, sin importar cómo terminó. Los eventos
//! internos del pipeline corren dentro del span del request, así que
//! comparten el correlation id.

use std::time::Instant;

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::middleware::auth::CallerId;
use crate::middleware::rate_limit::client_key;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn request_logger(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client = client_key(&request);

    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!("request", request_id = %request_id);
    let mut response = next.run(request).instrument(span.clone()).await;

    let status = response.status();
    let duration_ms = start.elapsed().as_millis() as u64;
    let caller = response
        .extensions()
        .get::<CallerId>()
        .map(|c| c.0.to_string())
        .unwrap_or_else(|| "anonymous".to_string());

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let _guard = span.enter();
    if status.is_server_error() {
        tracing::error!(
            %method,
            %path,
            status = status.as_u16(),
            duration_ms,
            %caller,
            %client,
            "request completada"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            %method,
            %path,
            status = status.as_u16(),
            duration_ms,
            %caller,
            %client,
            "request completada"
        );
    } else {
        tracing::info!(
            %method,
            %path,
            status = status.as_u16(),
            duration_ms,
            %caller,
            %client,
            "request completada"
        );
    }

    response
}
