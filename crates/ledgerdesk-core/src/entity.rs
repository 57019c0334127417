//! Entity configuration and the master-data catalog
//!
//! Each master-data screen differs only in its endpoint, identifier field,
//! required fields, draft defaults and displayed columns. `EntityConfig`
//! carries exactly that, and `EntityCatalog` holds the built-in set merged
//! with any definitions from the config file.

use crate::error::ResourceError;
use crate::record::Record;
use ledgerdesk_config::{Config, ResourceDefinition, UpdateMethod, WriteSync};
use serde_json::Value;

/// Per-entity parameters of the generic list controller
#[derive(Debug, Clone, PartialEq)]
pub struct EntityConfig {
    /// Catalog key, e.g. "divisions"
    pub name: String,
    /// Singular display label, e.g. "division"
    pub label: String,
    /// Endpoint path relative to the base URL
    pub endpoint: String,
    pub id_field: String,
    pub required_fields: Vec<String>,
    /// Initial values of a create draft
    pub defaults: Record,
    /// Columns rendered in the list view
    pub columns: Vec<String>,
    pub update_method: UpdateMethod,
    pub write_sync: WriteSync,
}

impl EntityConfig {
    pub fn builder(name: &str) -> EntityConfigBuilder {
        EntityConfigBuilder::new(name)
    }

    /// Fresh draft for a create modal
    pub fn default_draft(&self) -> Record {
        self.defaults.clone()
    }

    /// Required fields that are blank in `draft`, in declaration order
    pub fn missing_required(&self, draft: &Record) -> Vec<String> {
        self.required_fields
            .iter()
            .filter(|field| draft.is_blank(field))
            .cloned()
            .collect()
    }

    /// Columns to render; falls back to the fields of the first record
    pub fn display_columns(&self, sample: Option<&Record>) -> Vec<String> {
        if !self.columns.is_empty() {
            return self.columns.clone();
        }
        match sample {
            Some(record) => record.fields().keys().cloned().collect(),
            None => vec![self.id_field.clone()],
        }
    }
}

impl From<&ResourceDefinition> for EntityConfig {
    fn from(def: &ResourceDefinition) -> Self {
        let mut builder = EntityConfig::builder(&def.name)
            .endpoint(def.endpoint_path())
            .id_field(&def.id_field)
            .required(&def.required_fields.iter().map(String::as_str).collect::<Vec<_>>())
            .columns(&def.columns.iter().map(String::as_str).collect::<Vec<_>>())
            .update_method(def.update_method)
            .write_sync(def.write_sync);
        if let Some(label) = &def.label {
            builder = builder.label(label);
        }
        for (field, value) in &def.defaults {
            builder = builder.default_value(field, value.clone());
        }
        builder.build()
    }
}

/// Builder for `EntityConfig`
#[derive(Debug, Clone)]
pub struct EntityConfigBuilder {
    config: EntityConfig,
}

impl EntityConfigBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            config: EntityConfig {
                name: name.to_string(),
                label: default_label(name),
                endpoint: name.to_string(),
                id_field: "id".to_string(),
                required_fields: vec![],
                defaults: Record::new(),
                columns: vec![],
                update_method: UpdateMethod::Put,
                write_sync: WriteSync::Merge,
            },
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.config.label = label.to_string();
        self
    }

    pub fn endpoint(mut self, endpoint: &str) -> Self {
        self.config.endpoint = endpoint.trim_matches('/').to_string();
        self
    }

    pub fn id_field(mut self, field: &str) -> Self {
        self.config.id_field = field.to_string();
        self
    }

    pub fn required(mut self, fields: &[&str]) -> Self {
        self.config.required_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.config.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn default_value(mut self, field: &str, value: Value) -> Self {
        self.config.defaults.set(field, value);
        self
    }

    pub fn update_method(mut self, method: UpdateMethod) -> Self {
        self.config.update_method = method;
        self
    }

    pub fn write_sync(mut self, sync: WriteSync) -> Self {
        self.config.write_sync = sync;
        self
    }

    pub fn build(self) -> EntityConfig {
        self.config
    }
}

/// "transaction-types" -> "transaction type"
fn default_label(name: &str) -> String {
    let words = name.replace(['-', '_'], " ");
    if let Some(stem) = words.strip_suffix("ies") {
        format!("{}y", stem)
    } else if let Some(stem) = words.strip_suffix("es").filter(|s| s.ends_with('x')) {
        stem.to_string()
    } else if let Some(stem) = words.strip_suffix('s') {
        stem.to_string()
    } else {
        words
    }
}

/// The set of resources the console knows how to manage
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    entries: Vec<EntityConfig>,
}

impl EntityCatalog {
    pub fn new(entries: Vec<EntityConfig>) -> Self {
        Self { entries }
    }

    /// The built-in master-data resources
    pub fn builtin() -> Self {
        Self::new(builtin_entities())
    }

    /// Built-in resources with config-file definitions applied on top
    pub fn from_config(config: &Config) -> Self {
        let mut catalog = Self::builtin();
        for def in &config.resources {
            catalog.insert(EntityConfig::from(def));
        }
        catalog
    }

    /// Add an entity, replacing any entry with the same name
    pub fn insert(&mut self, entity: EntityConfig) {
        match self.entries.iter_mut().find(|e| e.name == entity.name) {
            Some(existing) => *existing = entity,
            None => self.entries.push(entity),
        }
    }

    pub fn get(&self, name: &str) -> Option<&EntityConfig> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Look up an entity or fail with `UnknownResource`
    pub fn require(&self, name: &str) -> Result<&EntityConfig, ResourceError> {
        self.get(name).ok_or_else(|| ResourceError::UnknownResource { name: name.to_string() })
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityConfig> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn active() -> Value {
    Value::String("Active".to_string())
}

fn builtin_entities() -> Vec<EntityConfig> {
    vec![
        // User master data
        EntityConfig::builder("users")
            .label("user")
            .required(&["username", "email", "role_id", "status"])
            .columns(&["username", "email", "role_id", "division_id", "status"])
            .default_value("status", active())
            .build(),
        EntityConfig::builder("roles")
            .label("user role")
            .required(&["role_name", "division_id", "status"])
            .columns(&["role_id", "role_name", "division_id", "status"])
            .build(),
        EntityConfig::builder("divisions")
            .required(&["division_name", "status"])
            .columns(&["division_id", "division_name", "description", "status"])
            .write_sync(WriteSync::Refetch)
            .build(),
        EntityConfig::builder("departments")
            .required(&["department_name", "division_id", "status"])
            .columns(&["department_id", "department_name", "division_id", "status"])
            .default_value("status", active())
            .build(),
        EntityConfig::builder("projects")
            .required(&["name", "status"])
            .columns(&["project_id", "name", "created_by", "updated_at", "status"])
            .default_value("status", active())
            .build(),
        // Finance master data
        EntityConfig::builder("banks")
            .label("bank")
            .required(&["bank_code", "bank_name"])
            .columns(&["bank_code", "bank_name", "account_number", "currency", "status"])
            .build(),
        EntityConfig::builder("class-finances")
            .label("finance class")
            .required(&["class_code", "class_name"])
            .columns(&["class_code", "class_name", "description", "status"])
            .build(),
        EntityConfig::builder("chart-of-accounts")
            .label("account")
            .required(&["account_code", "account_name", "account_type"])
            .columns(&["account_code", "account_name", "account_type", "parent_code", "status"])
            .build(),
        EntityConfig::builder("currencies")
            .required(&["currency_code", "currency_name"])
            .columns(&["currency_code", "currency_name", "symbol", "status"])
            .build(),
        EntityConfig::builder("taxes")
            .label("tax")
            .required(&["tax_code", "tax_name", "rate"])
            .columns(&["tax_code", "tax_name", "rate", "status"])
            .build(),
        // General ledger setup
        EntityConfig::builder("transaction-types")
            .required(&["transaction_type", "description", "prefix"])
            .columns(&["transaction_type", "description", "prefix", "created_by", "updated_at", "status"])
            .default_value("status", active())
            .build(),
        EntityConfig::builder("budget-groups")
            .required(&["budget_group_name", "status"])
            .columns(&["budget_group_code", "budget_group_name", "description", "status"])
            .default_value("status", active())
            .build(),
        EntityConfig::builder("account-periods")
            .required(&["period_name", "start_date", "end_date", "status"])
            .columns(&["period_name", "start_date", "end_date", "status"])
            .build(),
        EntityConfig::builder("coa-mappings")
            .label("COA mapping")
            .required(&["coa_code", "division_id"])
            .columns(&["coa_code", "coa_name", "division_id", "status"])
            .build(),
        // Cash book
        EntityConfig::builder("cashbook-formats")
            .label("cash book format")
            .required(&["format_name", "prefix"])
            .columns(&["format_name", "prefix", "description", "status"])
            .build(),
    ]
}
