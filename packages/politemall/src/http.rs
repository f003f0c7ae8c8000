use hyper::ext::ReasonPhrase;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::error::{PolitemallError, Result};

/// Send a request, mapping connection-level failures to [`PolitemallError::Transport`].
pub(crate) async fn send(url: &str, request: RequestBuilder) -> Result<Response> {
    request.send().await.map_err(|source| PolitemallError::Transport {
        url: url.to_string(),
        source,
    })
}

/// Check the status and decode a JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(url: &str, response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(PolitemallError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            reason: reason_phrase(&response),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|source| PolitemallError::Transport {
            url: url.to_string(),
            source,
        })?;

    serde_json::from_slice(&body).map_err(|source| PolitemallError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Reason phrase as sent by the upstream, or the canonical one for the status.
///
/// hyper only records the phrase when it differs from the canonical one.
fn reason_phrase(response: &Response) -> String {
    match response.extensions().get::<ReasonPhrase>() {
        Some(reason) => String::from_utf8_lossy(reason.as_bytes()).into_owned(),
        None => response
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string(),
    }
}
