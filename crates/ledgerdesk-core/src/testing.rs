//! In-memory transport used by the store and controller tests

use crate::auth::Credential;
use crate::entity::EntityConfig;
use crate::error::ResourceError;
use crate::record::{Record, RecordId};
use crate::transport::{PageData, PageRequest, ResourceTransport};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    List,
    Create,
    Update,
    Delete,
}

#[derive(Default)]
struct ServerState {
    records: Vec<Record>,
    next_id: i64,
    calls: Vec<String>,
    failures: VecDeque<(Op, ResourceError)>,
    list_gates: VecDeque<oneshot::Receiver<PageData>>,
}

/// Fake server keeping its rows in memory.
///
/// Writes stamp `updated_by: "server"` so tests can tell the server's
/// representation from the submitted draft.
#[derive(Default)]
pub struct ScriptedTransport {
    state: Mutex<ServerState>,
}

impl ScriptedTransport {
    pub fn with_records(records: Vec<Record>) -> Self {
        let transport = Self::default();
        {
            let mut state = transport.state.lock().unwrap();
            state.next_id = records.len() as i64 + 1;
            state.records = records;
        }
        transport
    }

    /// Fail the next call of `op` with `error`
    pub fn fail_next(&self, op: Op, error: ResourceError) {
        self.state.lock().unwrap().failures.push_back((op, error));
    }

    /// Hold the next list call until the returned sender fires
    pub fn gate_next_list(&self) -> oneshot::Sender<PageData> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().unwrap().list_gates.push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn server_records(&self) -> Vec<Record> {
        self.state.lock().unwrap().records.clone()
    }

    fn begin(&self, op: Op, call: String) -> Result<(), ResourceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if let Some(pos) = state.failures.iter().position(|(o, _)| *o == op) {
            if let Some((_, error)) = state.failures.remove(pos) {
                return Err(error);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceTransport for ScriptedTransport {
    async fn list(
        &self,
        _entity: &EntityConfig,
        _credential: &Credential,
        request: PageRequest,
    ) -> Result<PageData, ResourceError> {
        self.begin(Op::List, format!("list page={} limit={}", request.page, request.limit))?;

        let gate = self.state.lock().unwrap().list_gates.pop_front();
        if let Some(gate) = gate {
            return gate.await.map_err(|_| ResourceError::fetch("gate dropped"));
        }

        let state = self.state.lock().unwrap();
        let items = state
            .records
            .iter()
            .skip(request.page.saturating_sub(1) * request.limit)
            .take(request.limit)
            .cloned()
            .collect();
        Ok(PageData { items, total: Some(state.records.len() as u64) })
    }

    async fn create(
        &self,
        entity: &EntityConfig,
        _credential: &Credential,
        draft: &Record,
    ) -> Result<Record, ResourceError> {
        self.begin(Op::Create, "create".to_string())?;

        let mut state = self.state.lock().unwrap();
        let mut record = draft.clone();
        if record.id(&entity.id_field).is_none() {
            record.set(entity.id_field.clone(), Value::from(state.next_id));
            state.next_id += 1;
        }
        record.set("updated_by", Value::from("server"));
        state.records.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        entity: &EntityConfig,
        _credential: &Credential,
        id: &RecordId,
        draft: &Record,
    ) -> Result<Record, ResourceError> {
        self.begin(Op::Update, format!("update {}", id))?;

        let mut state = self.state.lock().unwrap();
        let existing = state
            .records
            .iter_mut()
            .find(|r| r.has_id(&entity.id_field, id))
            .ok_or_else(|| ResourceError::fetch("Record not found"))?;
        for (field, value) in draft.fields() {
            if field != &entity.id_field {
                existing.set(field.clone(), value.clone());
            }
        }
        existing.set("updated_by", Value::from("server"));
        Ok(existing.clone())
    }

    async fn delete(
        &self,
        entity: &EntityConfig,
        _credential: &Credential,
        id: &RecordId,
    ) -> Result<(), ResourceError> {
        self.begin(Op::Delete, format!("delete {}", id))?;

        let mut state = self.state.lock().unwrap();
        let before = state.records.len();
        state.records.retain(|r| !r.has_id(&entity.id_field, id));
        if state.records.len() == before {
            return Err(ResourceError::fetch("Record not found"));
        }
        Ok(())
    }
}
