//! The metadata source seam: what a database adapter must answer so a
//! snapshot can be captured.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::schema::{ForeignKey, PrimaryKey, Table, UniqueConstraint};

/// Errors surfaced by adapters. Kept open-ended since each driver has its own.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Catalog classification of an index row (the standard index-info codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    /// Table statistics, not an index definition.
    Statistic,
    Clustered,
    Hashed,
    Other,
}

impl IndexType {
    /// Map a numeric catalog type code. Unknown codes are treated as `Other`.
    pub fn from_code(code: i16) -> Self {
        match code {
            0 => IndexType::Statistic,
            1 => IndexType::Clustered,
            2 => IndexType::Hashed,
            _ => IndexType::Other,
        }
    }

    pub fn code(self) -> i16 {
        match self {
            IndexType::Statistic => 0,
            IndexType::Clustered => 1,
            IndexType::Hashed => 2,
            IndexType::Other => 3,
        }
    }

    pub fn is_statistic(self) -> bool {
        self == IndexType::Statistic
    }
}

/// One raw per-column row as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRow {
    pub index_name: String,
    pub index_type: IndexType,
    pub column_name: Option<String>,
    /// 1-based position of the column within the index.
    pub ordinal_position: i32,
    /// `None` when the engine does not report uniqueness.
    pub non_unique: Option<bool>,
    pub filter_condition: Option<String>,
}

impl IndexRow {
    pub fn new(
        index_name: impl Into<String>,
        index_type: IndexType,
        column_name: Option<&str>,
        ordinal_position: i32,
        non_unique: Option<bool>,
    ) -> Self {
        Self {
            index_name: index_name.into(),
            index_type,
            column_name: column_name.map(str::to_string),
            ordinal_position,
            non_unique,
            filter_condition: None,
        }
    }

    pub fn with_filter(mut self, condition: impl Into<String>) -> Self {
        self.filter_condition = Some(condition.into());
        self
    }

    /// Uniqueness as stored on the index. Engines that cannot tell are
    /// assumed non-unique.
    pub fn is_unique(&self) -> bool {
        !self.non_unique.unwrap_or(true)
    }
}

/// Engine quirks a source declares so the collector stays engine-agnostic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCapabilities {
    /// Index rows come from a direct catalog query instead of the generic
    /// index-info call.
    #[serde(default)]
    pub direct_index_query: bool,

    /// Genuine index columns may be reported at ordinal 0 instead of 1.
    #[serde(default)]
    pub zero_ordinal_bug: bool,

    /// Unnamed indexes get a generated name with a leading blank.
    #[serde(default)]
    pub blank_prefixed_generated_names: bool,
}

/// Catalog access required to build a snapshot.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Short engine identifier, e.g. `"postgres"`.
    fn engine(&self) -> &str;

    fn capabilities(&self) -> SourceCapabilities;

    /// Map a raw catalog identifier to the internal naming convention.
    fn normalize_name(&self, raw: &str) -> String {
        raw.to_string()
    }

    async fn version(&self) -> Result<String, SourceError>;

    async fn tables(&self, schema: &str) -> Result<Vec<Table>, SourceError>;

    async fn primary_keys(&self, schema: &str) -> Result<Vec<PrimaryKey>, SourceError>;

    async fn foreign_keys(&self, schema: &str) -> Result<Vec<ForeignKey>, SourceError>;

    async fn unique_constraints(&self, schema: &str)
    -> Result<Vec<UniqueConstraint>, SourceError>;

    /// Raw index rows for one table. Any cursor or connection opened to
    /// answer this must be released before returning, on error too.
    async fn index_rows(&self, table: &Table, schema: &str) -> Result<Vec<IndexRow>, SourceError>;
}
