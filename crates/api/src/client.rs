use std::time::Duration;

use reqwest::{
    Method, RequestBuilder,
    header::{ACCEPT, HeaderMap, HeaderName, HeaderValue},
};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// No timeout unless set; reqwest waits indefinitely by default.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: None,
        }
    }
}

/// Per-call overrides applied on top of the client defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    headers: HeaderMap,
    timeout: Option<Duration>,
}

impl RequestParams {
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Typed client for the document-query backend.
///
/// Cheap to clone; build it once at start-up and share it through state.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
}

impl Client {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("invalid base url '{}': {e}", config.base_url)))?;

        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "base url '{}' cannot carry a path",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("docrag/", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        tracing::info!(base_url = %base_url, "api client initialized");

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("base url '{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// Starts a request; `token` is sent as a bearer credential.
    pub(crate) fn request(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&str>,
        params: RequestParams,
    ) -> Result<RequestBuilder> {
        let mut request = self.http.request(method, self.endpoint(segments)?);

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        // Caller headers go last so they win over the defaults.
        request = request.headers(params.headers);

        if let Some(timeout) = params.timeout {
            request = request.timeout(timeout);
        }

        Ok(request)
    }

    pub(crate) async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let (url, body) = self.execute(request).await?;

        serde_json::from_slice(&body).map_err(|source| Error::Decode { url, source })
    }

    /// Sends the request and returns the raw body of a 2xx response.
    pub(crate) async fn execute(&self, request: RequestBuilder) -> Result<(String, Vec<u8>)> {
        let request = request.build().map_err(|source| Error::Request {
            url: source.url().map(|u| u.to_string()).unwrap_or_default(),
            source,
        })?;

        let method = request.method().clone();
        let url = request.url().to_string();

        tracing::debug!(%method, %url, "api request");

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(source) => {
                tracing::error!(%method, %url, error = %source, "api request failed");
                return Err(Error::Request { url, source });
            }
        };

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| Error::Request {
                url: url.to_owned(),
                source,
            })?
            .to_vec();

        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                %url,
                body = %String::from_utf8_lossy(&body),
                "api response error"
            );

            return Err(Error::from_response(status.as_u16(), &body));
        }

        tracing::debug!(status = status.as_u16(), %url, "api response success");

        Ok((url, body))
    }

    /// `GET /api`
    pub async fn health(&self, params: RequestParams) -> Result<String> {
        let request = self.request(Method::GET, &["api"], None, params)?;
        let (_, body) = self.execute(request).await?;

        // The backend may answer with a JSON string or with plain text.
        Ok(serde_json::from_slice::<String>(&body)
            .unwrap_or_else(|_| String::from_utf8_lossy(&body).trim().to_owned()))
    }
}
