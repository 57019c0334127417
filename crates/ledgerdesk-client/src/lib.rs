//! HTTP transport for the ledgerdesk resource store
//!
//! Speaks the backend's REST contract:
//!
//! ```text
//! GET    {base}/{resource}?page={p}&limit={l}
//! POST   {base}/{resource}
//! PUT    {base}/{resource}/{id}      (or PATCH, per entity)
//! DELETE {base}/{resource}/{id}
//! ```
//!
//! Every response is an [`ApiEnvelope`]; failures are mapped onto
//! `ResourceError` by status code and envelope.

pub mod envelope;
pub mod error;

pub use envelope::{ApiEnvelope, UNEXPECTED_FORMAT_MESSAGE};
pub use error::{ClientError, ClientResult};

use async_trait::async_trait;
use ledgerdesk_config::{ServerConfig, UpdateMethod};
use ledgerdesk_core::{
    Credential, EntityConfig, PageData, PageRequest, Record, RecordId, ResourceError, ResourceTransport,
    GENERIC_ERROR_MESSAGE,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use std::time::Duration;

/// Which kind of call a response belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Read,
    Write,
    Delete,
}

/// `ResourceTransport` backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let invalid = |reason: String| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Build { message: e.to_string() })?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn from_config(config: &ServerConfig) -> ClientResult<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/{endpoint}[/{id}]`, with the id percent-encoded as one segment
    pub fn resource_url(&self, entity: &EntityConfig, id: Option<&RecordId>) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(entity.endpoint.split('/').filter(|s| !s.is_empty()));
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        url
    }

    fn request(&self, method: Method, url: Url, credential: &Credential) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(AUTHORIZATION, credential.header_value())
            .header(CONTENT_TYPE, "application/json")
    }

    async fn send(&self, request: RequestBuilder, kind: CallKind) -> Result<ApiEnvelope, ResourceError> {
        let response = request.send().await.map_err(|e| {
            log::debug!("Request failed: {}", e);
            ResourceError::fetch(GENERIC_ERROR_MESSAGE)
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            log::debug!("Failed to read response body: {}", e);
            ResourceError::fetch(GENERIC_ERROR_MESSAGE)
        })?;
        let envelope = ApiEnvelope::parse(&body);
        log::debug!("Response status {} ({} bytes)", status, body.len());

        map_response(status, envelope, kind)
    }
}

/// Status/envelope to outcome:
/// 401/403 auth; 400/422 validation; other non-2xx fetch; an
/// undecodable 2xx body fetch; `success: false` validation for writes and
/// fetch otherwise.
fn map_response(
    status: StatusCode,
    envelope: Option<ApiEnvelope>,
    kind: CallKind,
) -> Result<ApiEnvelope, ResourceError> {
    let message = ApiEnvelope::message_or_generic(envelope.as_ref());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ResourceError::auth(message)),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Err(ResourceError::validation(message)),
        s if !s.is_success() => Err(ResourceError::fetch(message)),
        _ => {
            let envelope = envelope.ok_or_else(|| ResourceError::fetch(UNEXPECTED_FORMAT_MESSAGE))?;
            if envelope.success {
                Ok(envelope)
            } else if kind == CallKind::Write {
                Err(ResourceError::validation(message))
            } else {
                Err(ResourceError::fetch(message))
            }
        }
    }
}

#[async_trait]
impl ResourceTransport for HttpTransport {
    async fn list(
        &self,
        entity: &EntityConfig,
        credential: &Credential,
        request: PageRequest,
    ) -> Result<PageData, ResourceError> {
        let url = self.resource_url(entity, None);
        log::debug!("GET {} page={} limit={}", url, request.page, request.limit);

        let builder = self
            .request(Method::GET, url, credential)
            .query(&[("page", request.page), ("limit", request.limit)]);
        let (items, total) = self.send(builder, CallKind::Read).await?.into_page()?;
        Ok(PageData { items, total })
    }

    async fn create(
        &self,
        entity: &EntityConfig,
        credential: &Credential,
        draft: &Record,
    ) -> Result<Record, ResourceError> {
        let url = self.resource_url(entity, None);
        log::debug!("POST {}", url);

        let builder = self.request(Method::POST, url, credential).json(draft);
        self.send(builder, CallKind::Write).await?.into_record()
    }

    async fn update(
        &self,
        entity: &EntityConfig,
        credential: &Credential,
        id: &RecordId,
        draft: &Record,
    ) -> Result<Record, ResourceError> {
        let url = self.resource_url(entity, Some(id));
        let method = match entity.update_method {
            UpdateMethod::Put => Method::PUT,
            UpdateMethod::Patch => Method::PATCH,
        };
        log::debug!("{} {}", method, url);

        let builder = self.request(method, url, credential).json(draft);
        self.send(builder, CallKind::Write).await?.into_record()
    }

    async fn delete(
        &self,
        entity: &EntityConfig,
        credential: &Credential,
        id: &RecordId,
    ) -> Result<(), ResourceError> {
        let url = self.resource_url(entity, Some(id));
        log::debug!("DELETE {}", url);

        self.send(self.request(Method::DELETE, url, credential), CallKind::Delete)
            .await
            .map(|_| ())
    }
}
