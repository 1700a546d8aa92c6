use reqwest::StatusCode;

/// Failures reported by a remote endpoint, as opposed to transport or decode errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{endpoint} request failed with status {status}: {body}")]
    Status { endpoint: String, status: StatusCode, body: String },
}

impl ApiError {
    pub fn status(endpoint: impl Into<String>, status: StatusCode, body: &str) -> Self {
        Self::Status { endpoint: endpoint.into(), status, body: truncate_body(body) }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
