use std::future::Future;
use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;

pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Outbound calls to the remote API.
///
/// `Ok(None)` is the empty result of a `204 No Content` response.
pub trait Transport: Clone + 'static {
    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> impl Future<Output = Result<Option<Value>, ApiError>>;
}

/// reqwest-backed transport. Session cookies live in a shared jar, which is
/// also where the anti-forgery token is read from.
#[derive(Clone)]
pub struct HttpTransport {
    api_url: Url,
    csrf_cookie_name: String,
    jar: Arc<Jar>,
    http: Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let api_url = Url::parse(&config.api_url())
            .map_err(|e| ApiError::unreachable(format!("Invalid API URL: {}", e)))?;

        let jar = Arc::new(Jar::default());
        if let Some(cookie) = config.session_cookie.as_deref().filter(|c| !c.is_empty()) {
            jar.add_cookie_str(cookie, &api_url);
        }

        let http = Client::builder()
            .cookie_provider(jar.clone())
            .build()
            .map_err(|e| ApiError::unreachable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_url,
            csrf_cookie_name: config.csrf_cookie_name.clone(),
            jar,
            http,
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Current anti-forgery token, if the server has set one.
    pub fn csrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.api_url)?;
        let header = header.to_str().ok()?;
        cookie_value(header, &self.csrf_cookie_name)
    }
}

impl HttpTransport {
    /// Assemble one API call: JSON content type, plus the anti-forgery
    /// header when the jar holds a token. Session cookies are added by the
    /// client when the request is sent.
    pub fn build(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Request, ApiError> {
        let mut req = self
            .http
            .request(method, self.url_for(path))
            .header("Content-Type", "application/json");
        if let Some(token) = self.csrf_token() {
            req = req.header(CSRF_HEADER, token);
        }
        if let Some(body) = body {
            req = req.body(body.to_string());
        }
        req.build()
            .map_err(|e| ApiError::unreachable(format!("Invalid request: {}", e)))
    }
}

impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>, ApiError> {
        let req = self.build(method.clone(), path, body.as_ref())?;
        let url = req.url().to_string();
        log::debug!("{} {}", method, url);

        let resp = self.http.execute(req).await.map_err(|e| {
            log::warn!("{} {} failed: {}", method, url, e);
            ApiError::unreachable(format!("Request failed: {}", e))
        })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            ApiError::new(
                format!("Failed to read response: {}", e),
                Some(status.as_u16()),
            )
        })?;

        let result = decode_response(status, &text);
        if let Err(ref e) = result {
            log::warn!("{} {} returned {}: {}", method, url, status, e);
        }
        result
    }
}

/// Map a raw response to the transport result.
pub fn decode_response(status: StatusCode, body: &str) -> Result<Option<Value>, ApiError> {
    if !status.is_success() {
        return Err(error_from_body(status, body));
    }
    if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body).map(Some).map_err(|e| {
        ApiError::new(
            format!("Failed to parse response: {}", e),
            Some(status.as_u16()),
        )
    })
}

/// Build the error for a non-2xx response, preferring the server's `detail`.
pub fn error_from_body(status: StatusCode, body: &str) -> ApiError {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string))
        .filter(|d| !d.is_empty());

    let message = detail.unwrap_or_else(|| format!("Request failed: {}", status.as_u16()));
    ApiError::new(message, Some(status.as_u16()))
}

/// Pull one cookie's value out of a `Cookie` header string.
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
