use crate::{JsdbgConfig, JsdbgError, Result};
use reqwest::{RequestBuilder, Url};
use serde_json::Value;
use std::sync::{atomic::{AtomicU64, Ordering}, Arc};
use std::time::Duration;

/// Root of the debug service on the admin app server.
pub const DEBUG_PREFIX: [&str; 2] = ["jsdbg", "v1"];

#[derive(Debug, Clone)]
pub struct JsdbgClient {
    config: JsdbgConfig,
    http_client: reqwest::Client,
    call_id: Arc<AtomicU64>,
}

impl JsdbgClient {
    /// Builds the shared HTTP client, loading the PEM root certificate at
    /// `ca_path` when one is configured.
    pub async fn new(config: JsdbgConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);

        if let Some(ca_path) = &config.ca_path {
            let pem = tokio::fs::read(ca_path).await?;
            builder = builder.add_root_certificate(reqwest::Certificate::from_pem(&pem)?);
        }

        Ok(Self {
            config,
            http_client: builder.build()?,
            call_id: Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn config(&self) -> &JsdbgConfig {
        &self.config
    }

    /// Builds `<base>/<segments...>`, percent-encoding each segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url())
            .map_err(|e| JsdbgError::Config(format!("bad debug server address: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| JsdbgError::Config("debug server address cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Builds `<base>/jsdbg/v1/<action>/<target>`.
    pub fn debug_endpoint(&self, action: &str, target: &str) -> Result<Url> {
        self.endpoint(&[DEBUG_PREFIX[0], DEBUG_PREFIX[1], action, target])
    }

    pub async fn get_json(
        &self,
        url: Url,
        query: &[(&str, String)],
        timeout: Option<Duration>,
    ) -> Result<Value> {
        let mut builder = self.http_client.get(url).query(query);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let text = self.send(builder, timeout).await?;
        parse_body(&text)
    }

    pub async fn post_form(&self, url: Url, form: &[(&str, String)]) -> Result<Value> {
        let builder = self.http_client.post(url).form(form);
        let text = self.send(builder, None).await?;
        parse_body(&text)
    }

    /// Form POST whose reply is not JSON (the `/v1/eval` endpoint answers `multipart/mixed`).
    pub async fn post_form_text(&self, url: Url, form: &[(&str, String)], accept: &str) -> Result<String> {
        let builder = self
            .http_client
            .post(url)
            .header(reqwest::header::ACCEPT, accept)
            .form(form);
        self.send(builder, None).await
    }

    async fn send(&self, builder: RequestBuilder, timeout: Option<Duration>) -> Result<String> {
        let id = self.call_id.fetch_add(1, Ordering::Relaxed);
        let request = builder
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header("X-Error-Accept", "application/json")
            .build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();

        tracing::debug!("Sending debug request: {} {}, id={}", method, path, id);

        let response = self.http_client.execute(request).await.map_err(|e| {
            if e.is_timeout() {
                JsdbgError::Timeout(timeout.unwrap_or(self.config.timeout))
            } else {
                JsdbgError::Connection(e)
            }
        })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = JsdbgError::from_http(status.as_u16(), text);
            tracing::warn!("Debug request failed: {} {}, id={}: {}", method, path, id, err);
            return Err(err);
        }

        tracing::debug!("Debug request successful: {} {}, id={}", method, path, id);
        Ok(text)
    }
}

/// Empty bodies become `Value::Null`; several endpoints acknowledge with no content.
pub fn parse_body(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(text)?)
}
