//! Transport seam between the store and the remote service

use crate::auth::Credential;
use crate::entity::EntityConfig;
use crate::error::ResourceError;
use crate::record::{Record, RecordId};
use async_trait::async_trait;
use std::sync::Arc;

/// One page request: 1-indexed page and server-side limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    /// Both values are raised to at least 1
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

/// A page of records as returned by the server
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageData {
    pub items: Vec<Record>,
    /// Server-side total, when reported
    pub total: Option<u64>,
}

/// Remote operations for one entity type.
///
/// Implementations map every failure onto the `ResourceError` taxonomy:
/// rejected credentials are `Auth`, rejected payloads `Validation`, and
/// everything else `Fetch`.
#[async_trait]
pub trait ResourceTransport: Send + Sync {
    async fn list(
        &self,
        entity: &EntityConfig,
        credential: &Credential,
        request: PageRequest,
    ) -> Result<PageData, ResourceError>;

    async fn create(
        &self,
        entity: &EntityConfig,
        credential: &Credential,
        draft: &Record,
    ) -> Result<Record, ResourceError>;

    async fn update(
        &self,
        entity: &EntityConfig,
        credential: &Credential,
        id: &RecordId,
        draft: &Record,
    ) -> Result<Record, ResourceError>;

    async fn delete(
        &self,
        entity: &EntityConfig,
        credential: &Credential,
        id: &RecordId,
    ) -> Result<(), ResourceError>;
}

/// Transport reference type
pub type TransportRef = Arc<dyn ResourceTransport>;
