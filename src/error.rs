#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{operation} failed (status {status:?}): {detail}")]
    Api {
        operation: &'static str,
        status: Option<u16>,
        detail: String,
    },
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Checks HTTP response status; returns the response on success or an
/// [`Error::Api`] with the body as detail.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response, Error> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(Error::Api {
        operation,
        status: Some(status),
        detail: body,
    })
}
