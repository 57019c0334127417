//! Server-backed collection for one entity type
//!
//! `ResourceStore` owns the collection and its request status. All
//! operations take `&self` and may overlap; a fetch is applied only if no
//! newer fetch was issued while it was in flight.

use crate::auth::{Credential, CredentialRef};
use crate::entity::EntityConfig;
use crate::error::{
    DefaultErrorLogger, ErrorContext, ErrorLogger, ResourceError, ResourceResult,
    MISSING_TOKEN_MESSAGE,
};
use crate::record::{Record, RecordId};
use crate::transport::{PageRequest, TransportRef};
use crate::types::RequestStatus;
use ledgerdesk_config::WriteSync;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct StoreState {
    records: Vec<Record>,
    total: Option<u64>,
    status: RequestStatus,
    last_request: PageRequest,
}

/// Consistent copy of the store's state
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    pub records: Vec<Record>,
    pub total: Option<u64>,
    pub status: RequestStatus,
    pub last_request: PageRequest,
}

/// Collection and request status for one entity
pub struct ResourceStore {
    entity: EntityConfig,
    transport: TransportRef,
    credentials: CredentialRef,
    logger: Arc<dyn ErrorLogger>,
    /// Ticket of the most recently issued fetch
    issued: AtomicU64,
    state: RwLock<StoreState>,
}

impl ResourceStore {
    pub fn new(entity: EntityConfig, transport: TransportRef, credentials: CredentialRef) -> Self {
        Self {
            entity,
            transport,
            credentials,
            logger: Arc::new(DefaultErrorLogger),
            issued: AtomicU64::new(0),
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Server-side `limit` used by `refresh` until another page is fetched
    pub fn with_fetch_limit(self, limit: usize) -> Self {
        self.write_state().last_request = PageRequest::new(1, limit);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn entity(&self) -> &EntityConfig {
        &self.entity
    }

    // ==================== Read Access ====================

    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.read_state();
        StoreSnapshot {
            records: state.records.clone(),
            total: state.total,
            status: state.status.clone(),
            last_request: state.last_request,
        }
    }

    pub fn records(&self) -> Vec<Record> {
        self.read_state().records.clone()
    }

    pub fn status(&self) -> RequestStatus {
        self.read_state().status.clone()
    }

    /// Server-reported total of the last page fetched
    pub fn total(&self) -> Option<u64> {
        self.read_state().total
    }

    pub fn last_request(&self) -> PageRequest {
        self.read_state().last_request
    }

    /// Record with `id` in the loaded collection
    pub fn find(&self, id: &RecordId) -> Option<Record> {
        self.read_state()
            .records
            .iter()
            .find(|r| r.has_id(&self.entity.id_field, id))
            .cloned()
    }

    // ==================== Remote Operations ====================

    /// Fetch one page and replace the collection with it.
    ///
    /// Returns `Superseded` without touching state when a newer fetch was
    /// issued before this one resolved.
    pub async fn fetch_page(&self, page: usize, page_size: usize) -> ResourceResult<Vec<Record>> {
        let ticket = self.issue_ticket();
        self.fetch_with_ticket(ticket, PageRequest::new(page, page_size)).await
    }

    async fn fetch_with_ticket(&self, ticket: u64, request: PageRequest) -> ResourceResult<Vec<Record>> {
        let context = self.context("fetch");

        let credential = match self.require_credential(&context) {
            Ok(credential) => credential,
            Err(error) => {
                self.apply_fetch_error(ticket, &error);
                return Err(error);
            }
        };

        {
            let mut state = self.write_state();
            state.status = RequestStatus::Loading;
            state.last_request = request;
        }
        log::debug!(
            "Fetching {} page={} limit={} (ticket {})",
            self.entity.name, request.page, request.limit, ticket
        );

        let result = self.transport.list(&self.entity, &credential, request).await;

        // Ticket check and apply happen under one lock
        let mut state = self.write_state();
        if !self.is_latest(ticket) {
            drop(state);
            self.logger.log_debug(
                &format!("Discarding stale response for ticket {}", ticket),
                &context,
            );
            return Err(ResourceError::Superseded);
        }

        match result {
            Ok(page_data) => {
                state.records = page_data.items.clone();
                state.total = page_data.total;
                state.status = RequestStatus::Success;
                drop(state);
                log::info!(
                    "Fetched {} {} record(s) (page {}, total {:?})",
                    page_data.items.len(),
                    self.entity.name,
                    request.page,
                    page_data.total
                );
                Ok(page_data.items)
            }
            Err(error) => {
                state.status = RequestStatus::from_error(&error);
                drop(state);
                self.logger.log_error(&error, &context);
                Err(error)
            }
        }
    }

    /// Re-issue the last page request
    pub async fn refresh(&self) -> ResourceResult<Vec<Record>> {
        let last = self.last_request();
        self.fetch_page(last.page, last.limit).await
    }

    /// Submit a new record; the server's representation is returned and
    /// present in the collection exactly once afterwards.
    pub async fn create(&self, draft: &Record) -> ResourceResult<Record> {
        let context = self.context("create");
        let credential = self.require_credential(&context)?;

        let created = self
            .transport
            .create(&self.entity, &credential, draft)
            .await
            .map_err(|error| {
                self.logger.log_error(&error, &context);
                error
            })?;
        log::info!("Created {} {:?}", self.entity.label, created.id(&self.entity.id_field));

        if !self.resync_after_write("create").await {
            let mut state = self.write_state();
            merge_created(&mut state, created.clone(), &self.entity.id_field);
        }
        Ok(created)
    }

    /// Submit a modification; the matching entry is replaced by the server's
    /// representation, never by the draft.
    pub async fn update(&self, id: &RecordId, draft: &Record) -> ResourceResult<Record> {
        let context = self.context("update").with_record_id(id.to_string());
        let credential = self.require_credential(&context)?;

        let updated = self
            .transport
            .update(&self.entity, &credential, id, draft)
            .await
            .map_err(|error| {
                self.logger.log_error(&error, &context);
                error
            })?;
        log::info!("Updated {} {}", self.entity.label, id);

        if !self.resync_after_write("update").await {
            let mut state = self.write_state();
            merge_updated(&mut state, id, updated.clone(), &self.entity.id_field);
        }
        Ok(updated)
    }

    /// Delete a record. Confirmation is the caller's job.
    ///
    /// On failure the status turns to error and the collection is left as is.
    pub async fn delete(&self, id: &RecordId) -> ResourceResult<()> {
        let context = self.context("delete").with_record_id(id.to_string());

        let result = match self.require_credential(&context) {
            Ok(credential) => self.transport.delete(&self.entity, &credential, id).await,
            Err(error) => Err(error),
        };

        if let Err(error) = result {
            self.logger.log_error(&error, &context);
            self.write_state().status = RequestStatus::from_error(&error);
            return Err(error);
        }
        log::info!("Deleted {} {}", self.entity.label, id);

        if !self.resync_after_write("delete").await {
            let mut state = self.write_state();
            remove_deleted(&mut state, id, &self.entity.id_field);
        }
        Ok(())
    }

    // ==================== Internals ====================

    /// Re-fetch under the refetch policy. Returns true when the collection
    /// now reflects the server; false means the caller merges locally.
    ///
    /// A failed re-fetch does not turn the status to error: the write
    /// itself succeeded.
    async fn resync_after_write(&self, operation: &str) -> bool {
        if self.entity.write_sync != WriteSync::Refetch {
            return false;
        }
        let ticket = self.issue_ticket();
        let request = self.last_request();
        match self.fetch_with_ticket(ticket, request).await {
            Ok(_) => true,
            Err(ResourceError::Superseded) => false,
            Err(error) => {
                log::warn!(
                    "Re-fetch after {} of {} failed, merging locally: {}",
                    operation, self.entity.name, error
                );
                let mut state = self.write_state();
                if self.is_latest(ticket) {
                    state.status = RequestStatus::Success;
                }
                false
            }
        }
    }

    fn issue_ticket(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn require_credential(&self, context: &ErrorContext) -> ResourceResult<Credential> {
        self.credentials.credential().ok_or_else(|| {
            let error = ResourceError::auth(MISSING_TOKEN_MESSAGE);
            self.logger.log_error(&error, context);
            error
        })
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket
    }

    fn apply_fetch_error(&self, ticket: u64, error: &ResourceError) {
        let mut state = self.write_state();
        if self.is_latest(ticket) {
            state.status = RequestStatus::from_error(error);
        }
    }

    fn context(&self, operation: &str) -> ErrorContext {
        ErrorContext::new(operation, &self.entity.name)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// ==================== Local Reconciliation ====================

/// Prepend a created record, replacing any entry already carrying its id
fn merge_created(state: &mut StoreState, record: Record, id_field: &str) {
    match record.id(id_field) {
        Some(id) => {
            let before = state.records.len();
            state.records.retain(|r| !r.has_id(id_field, &id));
            if state.records.len() == before {
                state.total = state.total.map(|t| t + 1);
            }
        }
        None => {
            log::warn!("Created record has no '{}' field; it cannot be edited until re-fetched", id_field);
            state.total = state.total.map(|t| t + 1);
        }
    }
    state.records.insert(0, record);
}

/// Replace the entry with `id`, dropping any duplicates of it. A record
/// no longer in the collection (the page changed under an open edit) is
/// prepended.
fn merge_updated(state: &mut StoreState, id: &RecordId, record: Record, id_field: &str) {
    let Some(position) = state.records.iter().position(|r| r.has_id(id_field, id)) else {
        state.records.insert(0, record);
        return;
    };
    state.records[position] = record;
    let mut index = 0;
    state.records.retain(|r| {
        let keep = index == position || !r.has_id(id_field, id);
        index += 1;
        keep
    });
}

fn remove_deleted(state: &mut StoreState, id: &RecordId, id_field: &str) {
    let before = state.records.len();
    state.records.retain(|r| !r.has_id(id_field, id));
    if state.records.len() < before {
        state.total = state.total.map(|t| t.saturating_sub(1));
    }
}
