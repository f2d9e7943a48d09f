//! `MakeSpan` for the HTTP `TraceLayer` that keeps credentials out of logs.

use axum::http::{Request, Uri};
use tower_http::trace::MakeSpan;
use tracing::Span;

/// Query parameter names whose values are redacted
const SENSITIVE_PARAMS: &[&str] = &["token", "access_token", "password", "secret", "api_key"];

#[derive(Clone, Debug)]
pub struct SanitizedMakeSpan;

impl<B> MakeSpan<B> for SanitizedMakeSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "http",
            method = %request.method(),
            uri = %sanitize_uri(request.uri()),
            version = ?request.version(),
        )
    }
}

/// `/api/v1/jobs?token=abc&page=2` becomes `/api/v1/jobs?token=[REDACTED]&page=2`
fn sanitize_uri(uri: &Uri) -> String {
    let Some(query) = uri.query() else {
        return uri.path().to_string();
    };

    let pairs: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if SENSITIVE_PARAMS.contains(&key.to_ascii_lowercase().as_str()) => {
                format!("{key}=[REDACTED]")
            }
            _ => pair.to_string(),
        })
        .collect();

    format!("{}?{}", uri.path(), pairs.join("&"))
}
