//! Blocking client for the REST and storage sub-APIs.
//!
//! # Design
//! `Client` holds a base URL, the key for one credential tier, and an owned
//! `HttpSend`. Each operation is split into a pure `build_*` method that
//! produces an `HttpRequest`, one `send`, and a pure `parse_*` method that
//! applies the operation's status rule. The client is immutable after
//! construction, so a single instance can be shared across threads.
//!
//! Status rules differ per operation and mirror the remote's conventions:
//! reads, updates and deletes accept any 2xx, creates accept only 201, and
//! uploads accept anything below 400.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use uuid::Uuid;

use crate::config::{Config, Tier, ANON_KEY_VAR, SERVICE_KEY_VAR, URL_VAR};
use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpSend};
use crate::transport::UreqSender;

/// Client for one backend project and one credential tier.
pub struct Client {
    base_url: String,
    api_key: String,
    tier: Tier,
    sender: Box<dyn HttpSend>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("tier", &self.tier)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Builds a client from explicit configuration, using the key that
    /// `tier` selects.
    pub fn new(config: &Config, tier: Tier) -> Result<Self> {
        let (base_url, api_key) = config.credentials(tier)?;
        let sender = UreqSender::new(api_key, config.timeout);
        Self::with_sender(base_url, api_key, tier, sender)
    }

    /// Builds a client from the process environment.
    ///
    /// A missing value is logged and returned as
    /// `Error::ConfigurationMissing`; the caller should treat it as fatal.
    pub fn from_env(tier: Tier) -> Result<Self> {
        Self::new(&Config::from_env(), tier).inspect_err(|err| {
            tracing::error!(
                error = %err,
                "backend environment variables not set: {URL_VAR} and {ANON_KEY_VAR} or {SERVICE_KEY_VAR} are required"
            );
        })
    }

    /// Builds a client around an arbitrary sender.
    pub fn with_sender(
        base_url: &str,
        api_key: &str,
        tier: Tier,
        sender: impl HttpSend + 'static,
    ) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(Error::InvalidConfiguration("base URL is empty".to_string()));
        }
        if api_key.trim().is_empty() {
            return Err(Error::InvalidConfiguration("API key is empty".to_string()));
        }
        Ok(Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            tier,
            sender: Box::new(sender),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub(crate) fn execute(&self, request: HttpRequest, context: &'static str) -> Result<HttpResponse> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "dispatching request");
        self.sender
            .send(request)
            .map_err(|source| Error::Transport { context, source })
    }

    // -- read ---------------------------------------------------------------

    pub fn build_get(&self, resource: &str, query: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url(&format!("/rest/v1/{resource}?{query}")),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<Vec<u8>> {
        require_success(response)
    }

    /// Reads rows from `resource`; `query` is an already-encoded filter
    /// string such as `select=*&id=eq.<uuid>`. Returns the raw body.
    pub fn get(&self, resource: &str, query: &str) -> Result<Vec<u8>> {
        let response = self.execute(self.build_get(resource, query), "GET request failed")?;
        self.parse_get(response)
    }

    // -- create -------------------------------------------------------------

    pub fn build_post<T: Serialize + ?Sized>(&self, resource: &str, payload: &T) -> Result<HttpRequest> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url(&format!("/rest/v1/{resource}?select=*")),
            headers: Vec::new(),
            body: Some(to_json(payload)?),
        })
    }

    pub fn parse_post(&self, response: HttpResponse) -> Result<Vec<u8>> {
        if response.status != 201 {
            return Err(Error::status_with_body(response.status, &response.body));
        }
        if response.body.is_empty() {
            return Ok(b"{}".to_vec());
        }
        Ok(response.body)
    }

    /// Inserts `payload` into `resource` and returns the created
    /// representation. Only `201 Created` counts as success.
    pub fn post<T: Serialize + ?Sized>(&self, resource: &str, payload: &T) -> Result<Vec<u8>> {
        let request = self.build_post(resource, payload)?;
        let response = self.execute(request, "POST request failed")?;
        self.parse_post(response)
    }

    // -- update -------------------------------------------------------------

    pub fn build_patch<T: Serialize + ?Sized>(
        &self,
        resource: &str,
        id: Uuid,
        payload: &T,
    ) -> Result<HttpRequest> {
        Ok(HttpRequest {
            method: HttpMethod::Patch,
            url: self.url(&format!("/rest/v1/{resource}?id=eq.{id}")),
            headers: Vec::new(),
            body: Some(to_json(payload)?),
        })
    }

    pub fn parse_patch(&self, response: HttpResponse) -> Result<Vec<u8>> {
        require_success(response)
    }

    /// Updates the single row of `resource` whose `id` equals `id`.
    pub fn patch<T: Serialize + ?Sized>(&self, resource: &str, id: Uuid, payload: &T) -> Result<Vec<u8>> {
        let request = self.build_patch(resource, id, payload)?;
        let response = self.execute(request, "PATCH request failed")?;
        self.parse_patch(response)
    }

    // -- delete -------------------------------------------------------------

    pub fn build_delete(&self, resource: &str, condition: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: self.url(&format!("/rest/v1/{resource}?{condition}")),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<Vec<u8>> {
        require_success(response)
    }

    /// Deletes the rows of `resource` matching `condition`, which is
    /// appended verbatim as the query string (e.g. `id=eq.<uuid>`).
    pub fn delete(&self, resource: &str, condition: &str) -> Result<Vec<u8>> {
        let response = self.execute(
            self.build_delete(resource, condition),
            "failed to execute DELETE request",
        )?;
        self.parse_delete(response)
    }

    // -- storage ------------------------------------------------------------

    pub fn build_upload(&self, filename: &str, bucket: &str, content: &[u8]) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url: self.url(&format!("/storage/v1/object/{bucket}/{filename}")),
            headers: vec![("Content-Type".to_string(), content_type_for(filename).to_string())],
            body: Some(content.to_vec()),
        }
    }

    pub fn parse_upload(&self, response: HttpResponse) -> Result<Vec<u8>> {
        tracing::debug!(status = response.status, "storage upload answered");
        if response.status >= 400 {
            tracing::warn!(status = response.status, body = %response.text(), "storage upload rejected");
            return Err(Error::status_with_body(response.status, &response.body));
        }
        Ok(response.body)
    }

    /// Uploads an image to `bucket` under `filename`. The content type is
    /// derived from the file extension.
    pub fn upload_image(&self, filename: &str, bucket: &str, content: &[u8]) -> Result<Vec<u8>> {
        let request = self.build_upload(filename, bucket, content);
        tracing::info!(
            url = %request.url,
            content_type = content_type_for(filename),
            bytes = content.len(),
            "uploading object"
        );
        let response = self
            .execute(request, "storage upload failed")
            .inspect_err(|err| tracing::warn!(error = %err, "storage upload could not be sent"))?;
        self.parse_upload(response)
    }
}

/// Image content type for `filename`: `.png` and `.webp` are recognized,
/// everything else is sent as JPEG.
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = Path::new(filename).extension().and_then(|ext| ext.to_str());
    match extension {
        Some(ext) if ext.eq_ignore_ascii_case("png") => "image/png",
        Some(ext) if ext.eq_ignore_ascii_case("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

fn require_success(response: HttpResponse) -> Result<Vec<u8>> {
    if !response.is_success() {
        return Err(Error::status_with_body(response.status, &response.body));
    }
    Ok(response.body)
}

pub(crate) fn to_json<T: Serialize + ?Sized>(payload: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(payload).map_err(|e| Error::Serialization(e.to_string()))
}
