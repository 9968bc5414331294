use std::sync::Arc;

use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::time::sleep;

use crate::common::config::RuntimeConfig;
use crate::common::error::{ApiError, Rejection};
use crate::common::session::SessionStore;

/// Thin JSON client for the backend REST API.
///
/// Every call goes through `handle_response`, so consumers only ever see
/// `ApiError` and never a raw transport or body error.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Arc<String>,
    client: Client,
    session: Arc<dyn SessionStore>,
    cfg: RuntimeConfig,
}

impl ApiClient {
    pub fn new(cfg: RuntimeConfig, session: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.request_timeout())
            .build()?;
        Ok(ApiClient {
            base_url: Arc::new(cfg.backend_url.clone()),
            client,
            session,
            cfg,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.cfg
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn request(&self, method: Method, endpoint: &str, public: bool) -> RequestBuilder {
        let mut req = self
            .client
            .request(method, self.url(endpoint))
            .header("ngrok-skip-browser-warning", "true");
        if !public {
            match self.session.get() {
                Some(token) => req = req.bearer_auth(token),
                None => log::debug!("No session token for {}", endpoint),
            }
        }
        req
    }

    /// GET with retry and exponential backoff on transport errors and 5xx.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str, public: bool) -> Result<T, ApiError> {
        let attempts = self.cfg.retry_attempts.max(1);
        let mut last_err = None;

        for attempt in 0..attempts {
            let res = self
                .request(Method::GET, endpoint, public)
                .header(header::CONTENT_TYPE, "application/json")
                .send()
                .await;

            let outcome = match res {
                Ok(resp) => handle_response(resp).await,
                Err(e) => Err(ApiError::from(e)),
            };

            match outcome {
                Ok(value) => return decode(value),
                Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                    log::warn!("GET {} failed on attempt {}: {}", endpoint, attempt, e);
                    sleep(self.cfg.backoff_delay(attempt)).await;
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or_else(|| ApiError::Transport("no attempts made".to_string())))
    }

    pub async fn post<B, T>(&self, endpoint: &str, body: &B, public: bool) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::POST, endpoint, Some(body), public).await
    }

    pub async fn put<B, T>(&self, endpoint: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::PUT, endpoint, body, false).await
    }

    pub async fn patch<B, T>(&self, endpoint: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::PATCH, endpoint, body, false).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let resp = self.request(Method::DELETE, endpoint, false).send().await?;
        decode(handle_response(resp).await?)
    }

    /// POST a multipart form (deposit screenshots). Non-2xx bodies are read as
    /// JSON when possible; otherwise the status alone is reported.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let resp = self
            .request(Method::POST, endpoint, false)
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.json::<Value>().await.unwrap_or(Value::Null);
            return Err(Rejection::from_body(status.as_u16(), &body).into());
        }
        let value = resp.json::<Value>().await.map_err(|e| ApiError::Decode(e.to_string()))?;
        decode(value)
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        public: bool,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        log::debug!("{} {}", method, endpoint);
        let mut req = self
            .request(method, endpoint, public)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        decode(handle_response(resp).await?)
    }
}

/// Enforce the JSON contract: non-JSON is an error regardless of status,
/// non-2xx JSON becomes a `Rejection`.
pub async fn handle_response(resp: Response) -> Result<Value, ApiError> {
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.contains("application/json") {
        let text = resp.text().await.unwrap_or_default();
        log::error!("API response was not JSON (status {}): {}", status, text);
        return Err(ApiError::UnexpectedContent {
            status: status.as_u16(),
            content_type: if content_type.is_empty() {
                "unknown".to_string()
            } else {
                content_type
            },
        });
    }

    let body = resp
        .json::<Value>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))?;

    if !status.is_success() {
        return Err(Rejection::from_body(status.as_u16(), &body).into());
    }
    Ok(body)
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}
