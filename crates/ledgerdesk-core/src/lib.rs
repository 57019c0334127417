//! Resource store and list controller for master-data screens
//!
//! Each managed entity (division, role, bank, ...) is described by an
//! [`EntityConfig`]. A [`ResourceStore`] holds the fetched collection and
//! request status for one entity and talks to the backend through a
//! [`ResourceTransport`]. A [`ListController`] layers search, pagination and
//! the add/edit modal on top of a store.

pub mod auth;
pub mod controller;
pub mod entity;
pub mod error;
pub mod filter;
pub mod pagination;
pub mod record;
pub mod store;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use auth::{Credential, CredentialRef, CredentialSource, SessionCredential, StaticCredential};
pub use controller::{Confirmation, ListController, ListView, ModalMode, ModalState, OpenModal};
pub use entity::{EntityCatalog, EntityConfig, EntityConfigBuilder};
pub use error::{
    DefaultErrorLogger, ErrorCode, ErrorContext, ErrorDetails, ErrorLogger, ErrorSeverity, ResourceError,
    ResourceResult, GENERIC_ERROR_MESSAGE, MISSING_TOKEN_MESSAGE,
};
pub use filter::FilterState;
pub use pagination::PaginationState;
pub use record::{Record, RecordId};
pub use store::{ResourceStore, StoreSnapshot};
pub use transport::{PageData, PageRequest, ResourceTransport, TransportRef};
pub use types::RequestStatus;

pub use ledgerdesk_config::{UpdateMethod, WriteSync};

#[doc(hidden)]
pub use serde_json as __serde_json;
