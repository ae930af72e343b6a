//! Authenticated HTTP session against the hub.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::error::{HubError, HubErrorKind, HubResult};

/// Standard User-Agent header for hubctl requests.
pub const USER_AGENT: &str = concat!("hubctl/", env!("CARGO_PKG_VERSION"));

/// HTTP client bound to one bearer token.
///
/// Every request carries `Authorization: token <value>`. Certificate
/// verification is disabled unless `verify_tls` is set, which only makes
/// sense against a trusted or self-signed test deployment.
#[derive(Clone)]
pub struct Session {
    http: reqwest::Client,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    /// Builds a session for `token`.
    ///
    /// # Errors
    /// Fails if the token is not a valid header value or the TLS backend
    /// cannot be initialized.
    pub fn new(token: &str, verify_tls: bool) -> HubResult<Self> {
        let mut auth = HeaderValue::from_str(&format!("token {token}")).map_err(|_| {
            HubError::new(
                HubErrorKind::Transport,
                "token contains characters not allowed in a header",
            )
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(|e| HubError::transport(&e))?;

        Ok(Self { http })
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        tracing::debug!("GET {url}");
        self.http.get(url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        tracing::debug!("POST {url}");
        self.http.post(url)
    }

    pub fn put(&self, url: &str) -> RequestBuilder {
        tracing::debug!("PUT {url}");
        self.http.put(url)
    }

    pub fn delete(&self, url: &str) -> RequestBuilder {
        tracing::debug!("DELETE {url}");
        self.http.delete(url)
    }

    /// Sends a request without looking at the status.
    ///
    /// # Errors
    /// Returns a Transport error if the request cannot be sent.
    pub async fn send(&self, request: RequestBuilder) -> HubResult<Response> {
        request.send().await.map_err(|e| HubError::transport(&e))
    }

    /// Sends a request and turns a non-2xx status into an HTTP error.
    ///
    /// # Errors
    /// Transport or HTTP errors.
    pub async fn send_checked(&self, request: RequestBuilder) -> HubResult<Response> {
        let response = self.send(request).await?;
        ensure_success(response).await
    }

    /// GETs `url` and decodes the JSON body.
    ///
    /// # Errors
    /// Transport or HTTP errors, or a Parse error for a body that does not
    /// decode into `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> HubResult<T> {
        let response = self.send_checked(self.get(url)).await?;
        decode_json(response).await
    }
}

/// Returns the response unchanged if its status is 2xx, else an HTTP error
/// carrying status and body.
///
/// # Errors
/// Returns an HTTP error for any non-2xx status.
pub async fn ensure_success(response: Response) -> HubResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(HubError::http_status(status.as_u16(), &body))
}

pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> HubResult<T> {
    let url = response.url().clone();
    let text = response.text().await.map_err(|e| HubError::transport(&e))?;
    serde_json::from_str(&text)
        .map_err(|e| HubError::parse(format!("invalid JSON from {url}: {e}")))
}
