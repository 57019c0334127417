//! Response envelope shared by every resource endpoint

use ledgerdesk_core::{Record, ResourceError, GENERIC_ERROR_MESSAGE};
use serde::Deserialize;
use serde_json::Value;

/// Shown when a body does not match the envelope
pub const UNEXPECTED_FORMAT_MESSAGE: &str = "Unexpected response format.";

/// `{success, data?, message?}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiEnvelope {
    /// Decode a response body; `None` when it is not an envelope
    pub fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }

    /// Server message, or the generic fallback when absent or blank
    pub fn message_or_generic(envelope: Option<&Self>) -> String {
        envelope
            .and_then(|e| e.message.as_deref())
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(GENERIC_ERROR_MESSAGE)
            .to_string()
    }

    /// `data` of a list response: `{items, total?}`, or a bare array
    pub fn into_page(self) -> Result<(Vec<Record>, Option<u64>), ResourceError> {
        let data = self.data.ok_or_else(unexpected_format)?;
        let list: ListData = serde_json::from_value(data).map_err(|_| unexpected_format())?;
        let (items, total) = match list {
            ListData::Paged { items, total } => (items, total),
            ListData::Bare(items) => (items, None),
        };
        let records = items
            .into_iter()
            .map(Record::from_value)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(unexpected_format)?;
        Ok((records, total))
    }

    /// `data` of a create/update response
    pub fn into_record(self) -> Result<Record, ResourceError> {
        self.data.and_then(Record::from_value).ok_or_else(unexpected_format)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListData {
    Paged {
        items: Vec<Value>,
        #[serde(default)]
        total: Option<u64>,
    },
    Bare(Vec<Value>),
}

fn unexpected_format() -> ResourceError {
    ResourceError::fetch(UNEXPECTED_FORMAT_MESSAGE)
}
