//! List controller for one master-data screen
//!
//! Derives the rendered view (filtered, paginated rows) from a
//! `ResourceStore` and turns user intents into store calls:
//!
//! ```text
//! Browsing --open_create/open_edit--> Editing
//! Editing  --submit ok / cancel-----> Browsing
//! Editing  --submit failure---------> Editing (error shown inline)
//! ```

use crate::entity::EntityConfig;
use crate::error::{ResourceError, ResourceResult};
use crate::filter::FilterState;
use crate::pagination::{self, PaginationState};
use crate::record::{Record, RecordId};
use crate::store::ResourceStore;
use crate::types::RequestStatus;
use serde_json::Value;
use std::sync::Arc;

/// What the modal is editing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalMode {
    Create,
    Edit { id: RecordId },
}

/// An open modal: its mode, the draft, and the last submit error
#[derive(Debug, Clone, PartialEq)]
pub struct OpenModal {
    pub mode: ModalMode,
    pub draft: Record,
    pub error: Option<String>,
}

/// Add/edit dialog state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Open(OpenModal),
}

impl ModalState {
    pub fn is_open(&self) -> bool {
        matches!(self, ModalState::Open(_))
    }

    pub fn draft(&self) -> Option<&Record> {
        match self {
            ModalState::Open(open) => Some(&open.draft),
            ModalState::Closed => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ModalState::Open(open) => open.error.as_deref(),
            ModalState::Closed => None,
        }
    }
}

/// Asks the user to confirm a destructive action
pub trait Confirmation {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Everything a screen needs to render
#[derive(Debug, Clone, PartialEq)]
pub struct ListView {
    pub status: RequestStatus,
    /// Rows of the current page
    pub rows: Vec<Record>,
    pub filtered_count: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub page_size: usize,
    pub query: String,
    /// Server-reported total of the fetched collection
    pub server_total: Option<u64>,
    pub modal: ModalState,
    /// The last operation failed for lack of a valid credential
    pub login_required: bool,
}

/// Generic list-resource controller
pub struct ListController {
    store: Arc<ResourceStore>,
    filter: FilterState,
    pagination: PaginationState,
    modal: ModalState,
    login_required: bool,
}

impl ListController {
    pub fn new(store: Arc<ResourceStore>, page_size: usize) -> Self {
        Self {
            store,
            filter: FilterState::default(),
            pagination: PaginationState::new(page_size),
            modal: ModalState::Closed,
            login_required: false,
        }
    }

    pub fn store(&self) -> &Arc<ResourceStore> {
        &self.store
    }

    pub fn entity(&self) -> &EntityConfig {
        self.store.entity()
    }

    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    pub fn query(&self) -> &str {
        self.filter.query()
    }

    pub fn current_page(&self) -> usize {
        pagination::clamp_page(self.pagination.current_page(), self.total_pages())
    }

    pub fn page_size(&self) -> usize {
        self.pagination.page_size()
    }

    pub fn login_required(&self) -> bool {
        self.login_required
    }

    /// Loaded records matching the current query
    pub fn filtered(&self) -> Vec<Record> {
        self.filter.apply(&self.store.records())
    }

    pub fn total_pages(&self) -> usize {
        pagination::total_pages(self.filtered().len(), self.pagination.page_size())
    }

    /// Rows of the current page
    pub fn page_rows(&self) -> Vec<Record> {
        let filtered = self.filtered();
        filtered[self.pagination.window(filtered.len())].to_vec()
    }

    pub fn view(&self) -> ListView {
        let snapshot = self.store.snapshot();
        let filtered = self.filter.apply(&snapshot.records);
        let page_size = self.pagination.page_size();
        let total_pages = pagination::total_pages(filtered.len(), page_size);
        let rows = filtered[self.pagination.window(filtered.len())].to_vec();

        ListView {
            status: snapshot.status,
            rows,
            filtered_count: filtered.len(),
            total_pages,
            current_page: pagination::clamp_page(self.pagination.current_page(), total_pages),
            page_size,
            query: self.filter.query().to_string(),
            server_total: snapshot.total,
            modal: self.modal.clone(),
            login_required: self.login_required,
        }
    }

    // ==================== Loading ====================

    /// Re-issue the store's last page request
    pub async fn refresh(&mut self) -> ResourceResult<()> {
        let result = self.store.refresh().await;
        self.after_fetch(result)
    }

    /// Fetch a server page, keeping the current server-side limit
    pub async fn load_page(&mut self, page: usize) -> ResourceResult<()> {
        let limit = self.store.last_request().limit;
        let result = self.store.fetch_page(page, limit).await;
        self.after_fetch(result)
    }

    fn after_fetch(&mut self, result: ResourceResult<Vec<Record>>) -> ResourceResult<()> {
        match result {
            Ok(_) => {
                self.login_required = false;
                self.clamp_page();
                Ok(())
            }
            // A newer fetch owns the outcome
            Err(ResourceError::Superseded) => Ok(()),
            Err(error) => {
                self.note_error(&error);
                Err(error)
            }
        }
    }

    // ==================== Filtering & Pagination ====================

    pub fn set_filter_query(&mut self, text: &str) {
        self.filter.set(text);
        self.clamp_page();
    }

    /// Ignored when `n` is outside `[1, total_pages]`
    pub fn go_to_page(&mut self, n: usize) {
        let total = self.total_pages();
        self.pagination.go_to(n, total);
    }

    pub fn set_page_size(&mut self, n: usize) {
        self.pagination.set_page_size(n);
    }

    fn clamp_page(&mut self) {
        let total = self.total_pages();
        self.pagination.clamp(total);
    }

    // ==================== Modal Workflow ====================

    pub fn open_create(&mut self) {
        self.modal = ModalState::Open(OpenModal {
            mode: ModalMode::Create,
            draft: self.entity().default_draft(),
            error: None,
        });
    }

    /// Edit a snapshot of the loaded copy of `record`; later collection
    /// changes do not reach the draft. Records outside the collection are
    /// `NotFound`.
    pub fn open_edit(&mut self, record: &Record) -> ResourceResult<()> {
        let id_field = &self.entity().id_field;
        let id = record.id(id_field).ok_or_else(|| {
            ResourceError::validation(format!("Record has no '{}' value and cannot be edited", id_field))
        })?;
        let snapshot = self
            .store
            .find(&id)
            .ok_or_else(|| ResourceError::NotFound { id: id.to_string() })?;
        self.modal = ModalState::Open(OpenModal {
            mode: ModalMode::Edit { id },
            draft: snapshot,
            error: None,
        });
        Ok(())
    }

    /// Edit the loaded record with `id`
    pub fn open_edit_by_id(&mut self, id: &RecordId) -> ResourceResult<()> {
        let mut key = Record::new();
        key.set(self.entity().id_field.clone(), Value::String(id.to_string()));
        self.open_edit(&key)
    }

    /// Set one draft field; no-op while the modal is closed
    pub fn set_draft_field(&mut self, field: &str, value: Value) {
        if let ModalState::Open(open) = &mut self.modal {
            open.draft.set(field, value);
        }
    }

    pub fn cancel(&mut self) {
        self.modal = ModalState::Closed;
    }

    /// Validate the draft and send it to the store.
    ///
    /// On success the modal closes; on any failure it stays open with the
    /// error message attached.
    pub async fn submit(&mut self) -> ResourceResult<Record> {
        let (mode, draft) = match &mut self.modal {
            ModalState::Closed => return Err(ResourceError::validation("Nothing to submit")),
            ModalState::Open(open) => {
                let missing = self.store.entity().missing_required(&open.draft);
                if !missing.is_empty() {
                    let error = ResourceError::missing_fields(missing);
                    open.error = Some(error.user_message());
                    return Err(error);
                }
                (open.mode.clone(), open.draft.clone())
            }
        };

        let result = match &mode {
            ModalMode::Create => self.store.create(&draft).await,
            ModalMode::Edit { id } => self.store.update(id, &draft).await,
        };

        match result {
            Ok(saved) => {
                self.modal = ModalState::Closed;
                self.login_required = false;
                self.clamp_page();
                Ok(saved)
            }
            Err(error) => {
                self.note_error(&error);
                if let ModalState::Open(open) = &mut self.modal {
                    open.error = Some(error.user_message());
                }
                Err(error)
            }
        }
    }

    // ==================== Deletion ====================

    /// Delete after confirmation. Returns `Ok(false)` when declined.
    pub async fn request_delete(
        &mut self,
        id: &RecordId,
        confirmation: &dyn Confirmation,
    ) -> ResourceResult<bool> {
        let prompt = format!("Are you sure you want to delete this {}?", self.entity().label);
        if !confirmation.confirm(&prompt) {
            log::debug!("Delete of {} {} declined", self.entity().label, id);
            return Ok(false);
        }

        let id_field = self.entity().id_field.clone();
        let rows = self.page_rows();
        let last_on_page = rows.len() == 1 && rows[0].has_id(&id_field, id);

        if let Err(error) = self.store.delete(id).await {
            self.note_error(&error);
            return Err(error);
        }

        if last_on_page && self.pagination.current_page() > 1 {
            self.pagination.step_back();
        }
        self.clamp_page();

        if let ModalState::Open(OpenModal { mode: ModalMode::Edit { id: editing }, .. }) = &self.modal {
            if editing == id {
                self.modal = ModalState::Closed;
            }
        }
        Ok(true)
    }

    fn note_error(&mut self, error: &ResourceError) {
        if error.is_auth() {
            self.login_required = true;
        }
    }
}
