//! Introspection scope and engine-quirk overrides.

use serde::{Deserialize, Serialize};

use crate::source::SourceCapabilities;

/// What to introspect and how to treat the engine's catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionConfig {
    /// Schema to snapshot.
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Tables to leave out of the snapshot entirely.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_tables: Vec<String>,

    /// Overrides for what the adapter reports about its engine. Unset
    /// values keep the adapter's own answer.
    #[serde(default)]
    pub capabilities: CapabilityOverrides,
}

impl Default for IntrospectionConfig {
    fn default() -> Self {
        Self {
            schema: default_schema(),
            excluded_tables: Vec::new(),
            capabilities: CapabilityOverrides::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_index_query: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_ordinal_bug: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blank_prefixed_generated_names: Option<bool>,
}

impl CapabilityOverrides {
    pub fn apply(&self, base: SourceCapabilities) -> SourceCapabilities {
        SourceCapabilities {
            direct_index_query: self.direct_index_query.unwrap_or(base.direct_index_query),
            zero_ordinal_bug: self.zero_ordinal_bug.unwrap_or(base.zero_ordinal_bug),
            blank_prefixed_generated_names: self
                .blank_prefixed_generated_names
                .unwrap_or(base.blank_prefixed_generated_names),
        }
    }
}

impl IntrospectionConfig {
    pub fn is_table_excluded(&self, table: &str) -> bool {
        self.excluded_tables
            .iter()
            .any(|t| t.eq_ignore_ascii_case(table))
    }
}

fn default_schema() -> String {
    "public".to_string()
}
