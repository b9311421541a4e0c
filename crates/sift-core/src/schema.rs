//! Schema model shared by collectors, sources and snapshots.
//!
//! Tables are owned by the [`Snapshot`](crate::Snapshot); every other object
//! refers to its table through a [`TableRef`] value and never creates or
//! destroys tables itself.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Reference to a table by schema and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    pub fn new(schema: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.map(str::to_string),
            name: name.into(),
        }
    }

    /// Case-insensitive comparison on the table name only.
    ///
    /// Constraints and indexes may come from different catalog views that
    /// disagree on identifier casing, so schema is not part of the check.
    pub fn same_name(&self, other: &TableRef) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A table discovered in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
}

impl Table {
    pub fn new(schema: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: schema.map(str::to_string),
            name: name.into(),
        }
    }

    pub fn table_ref(&self) -> TableRef {
        TableRef {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub table: TableRef,
    pub columns: Vec<String>,
}

/// Foreign key constraint. `table`/`columns` are the referencing side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub name: String,
    pub table: TableRef,
    pub columns: Vec<String>,
    pub references: TableRef,
    pub referenced_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueConstraint {
    pub name: String,
    pub table: TableRef,
    pub columns: Vec<String>,
}

/// Constraint kind an index has been found to back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexAssociation {
    PrimaryKey,
    ForeignKey,
    UniqueConstraint,
}

impl fmt::Display for IndexAssociation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndexAssociation::PrimaryKey => "primary_key",
            IndexAssociation::ForeignKey => "foreign_key",
            IndexAssociation::UniqueConstraint => "unique_constraint",
        })
    }
}

/// A fully assembled (possibly multi-column) index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub table: TableRef,
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_condition: Option<String>,
    /// Column per ordinal slot. `None` marks a slot no row has filled yet.
    pub columns: Vec<Option<String>>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub associations: BTreeSet<IndexAssociation>,
}

impl Index {
    pub fn new(name: impl Into<String>, table: TableRef) -> Self {
        Self {
            name: name.into(),
            table,
            unique: false,
            filter_condition: None,
            columns: Vec::new(),
            associations: BTreeSet::new(),
        }
    }

    /// Place `column` at the 1-based `position`, padding any gap with unset
    /// slots. Positions below 1 are ignored.
    pub fn set_column(&mut self, position: usize, column: impl Into<String>) {
        if position == 0 {
            return;
        }
        if self.columns.len() < position {
            self.columns.resize(position, None);
        }
        self.columns[position - 1] = Some(column.into());
    }

    /// True when `columns` is exactly this index's column list: same names,
    /// same order, same count. An unset slot never matches.
    pub fn has_columns(&self, columns: &[String]) -> bool {
        self.columns.len() == columns.len()
            && self
                .columns
                .iter()
                .zip(columns)
                .all(|(slot, column)| slot.as_deref() == Some(column.as_str()))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().flatten().map(String::as_str).collect()
    }

    pub fn is_associated(&self) -> bool {
        !self.associations.is_empty()
    }

    pub fn associate(&mut self, association: IndexAssociation) {
        self.associations.insert(association);
    }
}
