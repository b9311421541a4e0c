//! Assembles multi-column indexes from the flat per-column rows a catalog
//! returns for one table.

use std::collections::HashMap;

use crate::error::IntrospectError;
use crate::schema::{Index, Table, TableRef};
use crate::source::{IndexRow, MetadataSource, SourceCapabilities};

/// Prefix substituted for the leading blank of engine-generated index names.
pub const GENERATED_INDEX_PREFIX: &str = "_generated_index_";

/// Highest ordinal position accepted for an index key column. Engines cap
/// key columns far below this (Postgres at 32, DB2 at 64); larger values are
/// catalog garbage.
pub const MAX_INDEX_KEY_COLUMNS: usize = 1024;

/// Folds index rows into [`Index`] values, one table at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexCollector {
    capabilities: SourceCapabilities,
}

impl IndexCollector {
    pub fn new(capabilities: SourceCapabilities) -> Self {
        Self { capabilities }
    }

    /// Collect indexes for `table` using the identity name normalizer.
    pub fn collect<I>(&self, table: &TableRef, rows: I) -> Vec<Index>
    where
        I: IntoIterator<Item = IndexRow>,
    {
        self.collect_with(table, rows, str::to_string)
    }

    /// Collect indexes for `table`, mapping raw index and column names
    /// through `normalize`. Indexes are returned in the order their name was first
    /// seen.
    pub fn collect_with<I, F>(&self, table: &TableRef, rows: I, normalize: F) -> Vec<Index>
    where
        I: IntoIterator<Item = IndexRow>,
        F: Fn(&str) -> String,
    {
        let mut indexes: Vec<Index> = Vec::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for row in rows {
            if row.index_type.is_statistic() {
                continue;
            }

            let Some(column) = row.column_name.as_deref() else {
                tracing::trace!(table = %table, index = %row.index_name, "Skipping index row without column");
                continue;
            };

            let name = self.index_name(&normalize(&row.index_name));

            let Some(position) = self.ordinal_position(table, &name, &row) else {
                continue;
            };

            let slot = match by_name.get(&name) {
                Some(&slot) => slot,
                None => {
                    let mut index = Index::new(name.clone(), table.clone());
                    index.unique = row.is_unique();
                    index.filter_condition = row.filter_condition.clone();
                    indexes.push(index);
                    by_name.insert(name, indexes.len() - 1);
                    indexes.len() - 1
                }
            };

            indexes[slot].set_column(position, normalize(column));
        }

        indexes
    }

    fn index_name(&self, normalized: &str) -> String {
        if self.capabilities.blank_prefixed_generated_names
            && let Some(rest) = normalized.strip_prefix(' ')
        {
            return format!("{GENERATED_INDEX_PREFIX}{rest}");
        }
        normalized.to_string()
    }

    /// The 1-based position to write, after repairing the zero-ordinal defect.
    /// `None` means the row cannot be placed.
    fn ordinal_position(&self, table: &TableRef, index: &str, row: &IndexRow) -> Option<usize> {
        let mut position = row.ordinal_position;

        if self.capabilities.zero_ordinal_bug && !row.index_type.is_statistic() && position == 0 {
            position = 1;
            tracing::debug!(
                table = %table,
                index = %index,
                corrected = position,
                "Corrected zero ordinal position"
            );
        }

        match usize::try_from(position) {
            Ok(position) if (1..=MAX_INDEX_KEY_COLUMNS).contains(&position) => Some(position),
            _ => {
                tracing::warn!(
                    table = %table,
                    index = %index,
                    position = row.ordinal_position,
                    "Dropping index row with invalid ordinal position"
                );
                None
            }
        }
    }
}

/// Read and assemble every index of one table from `source`.
///
/// A source failure aborts the table and is returned as
/// [`IntrospectError::MetadataAccess`]; nothing collected so far is kept.
pub async fn collect_indexes_for_table<S>(
    table: &Table,
    schema: &str,
    source: &S,
) -> Result<Vec<Index>, IntrospectError>
where
    S: MetadataSource + ?Sized,
{
    let table_ref = table.table_ref();
    let rows = source
        .index_rows(table, schema)
        .await
        .map_err(|e| IntrospectError::metadata_access(table_ref.clone(), e))?;

    let collector = IndexCollector::new(source.capabilities());
    Ok(collector.collect_with(&table_ref, rows, |raw| source.normalize_name(raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::IndexType;

    fn table() -> TableRef {
        TableRef::new(None, "T")
    }

    fn row(name: &str, ty: IndexType, column: Option<&str>, pos: i32, non_unique: bool) -> IndexRow {
        IndexRow::new(name, ty, column, pos, Some(non_unique))
    }

    fn cols(index: &Index) -> Vec<Option<&str>> {
        index.columns.iter().map(Option::as_deref).collect()
    }

    #[test]
    fn test_multi_column_index() {
        let rows = vec![
            row("IDX1", IndexType::Other, Some("COL1"), 1, false),
            row("IDX1", IndexType::Other, Some("COL2"), 2, false),
        ];
        let indexes = IndexCollector::default().collect(&table(), rows);

        assert_eq!(indexes.len(), 1);
        assert_eq!(indexes[0].name, "IDX1");
        assert!(indexes[0].unique);
        assert_eq!(cols(&indexes[0]), vec![Some("COL1"), Some("COL2")]);
        assert_eq!(indexes[0].table, table());
    }

    #[test]
    fn test_statistic_rows_are_ignored() {
        let rows = vec![row("IDX2", IndexType::Statistic, Some("COL1"), 1, true)];
        assert!(IndexCollector::default().collect(&table(), rows).is_empty());
    }

    #[test]
    fn test_statistic_rows_do_not_change_result() {
        let base = vec![
            row("IDX", IndexType::Other, Some("A"), 1, true),
            row("IDX", IndexType::Other, Some("B"), 2, true),
        ];
        let mut noisy = base.clone();
        noisy.insert(0, row("IDX", IndexType::Statistic, Some("Z"), 7, true));
        noisy.push(row("", IndexType::Statistic, None, 0, true));
        noisy.push(row("OTHER", IndexType::Statistic, Some("Q"), 3, true));

        let collector = IndexCollector::default();
        assert_eq!(collector.collect(&table(), base), collector.collect(&table(), noisy));
    }

    #[test]
    fn test_null_column_rows_are_ignored() {
        let rows = vec![
            row("EXPR", IndexType::Other, None, 1, true),
            row("IDX", IndexType::Other, Some("A"), 1, true),
            row("IDX", IndexType::Other, None, 3, true),
        ];
        let indexes = IndexCollector::default().collect(&table(), rows);

        assert_eq!(indexes.len(), 1);
        assert_eq!(indexes[0].name, "IDX");
        assert_eq!(cols(&indexes[0]), vec![Some("A")]);
    }

    #[test]
    fn test_out_of_order_positions_fill_gaps() {
        let rows = vec![
            row("IDX", IndexType::Other, Some("C"), 3, true),
            row("IDX", IndexType::Other, Some("A"), 1, true),
        ];
        let indexes = IndexCollector::default().collect(&table(), rows);
        assert_eq!(cols(&indexes[0]), vec![Some("A"), None, Some("C")]);

        let rows = vec![
            row("IDX", IndexType::Other, Some("C"), 3, true),
            row("IDX", IndexType::Other, Some("A"), 1, true),
            row("IDX", IndexType::Other, Some("B"), 2, true),
        ];
        let indexes = IndexCollector::default().collect(&table(), rows);
        assert_eq!(cols(&indexes[0]), vec![Some("A"), Some("B"), Some("C")]);
    }

    #[test]
    fn test_zero_ordinal_repaired_when_flagged() {
        let collector = IndexCollector::new(SourceCapabilities {
            zero_ordinal_bug: true,
            ..Default::default()
        });
        let rows = vec![row("IDX3", IndexType::Other, Some("COL1"), 0, true)];
        let indexes = collector.collect(&table(), rows);

        assert_eq!(indexes.len(), 1);
        assert_eq!(indexes[0].name, "IDX3");
        assert!(!indexes[0].unique);
        assert_eq!(cols(&indexes[0]), vec![Some("COL1")]);
    }

    #[test]
    fn test_zero_ordinal_same_as_one() {
        let collector = IndexCollector::new(SourceCapabilities {
            zero_ordinal_bug: true,
            ..Default::default()
        });
        let zero = collector.collect(&table(), vec![row("IDX", IndexType::Hashed, Some("A"), 0, false)]);
        let one = collector.collect(&table(), vec![row("IDX", IndexType::Hashed, Some("A"), 1, false)]);
        assert_eq!(zero, one);
    }

    #[test]
    fn test_zero_ordinal_dropped_without_flag() {
        let rows = vec![
            row("IDX", IndexType::Other, Some("A"), 0, true),
            row("IDX", IndexType::Other, Some("B"), -2, true),
        ];
        assert!(IndexCollector::default().collect(&table(), rows).is_empty());
    }

    #[test]
    fn test_blank_generated_name_is_rewritten() {
        let collector = IndexCollector::new(SourceCapabilities {
            blank_prefixed_generated_names: true,
            ..Default::default()
        });
        let rows = vec![row(" 123_45", IndexType::Other, Some("A"), 1, true)];
        let indexes = collector.collect(&table(), rows);
        assert_eq!(indexes[0].name, "_generated_index_123_45");
    }

    #[test]
    fn test_blank_name_kept_without_flag() {
        let rows = vec![row(" 123_45", IndexType::Other, Some("A"), 1, true)];
        let indexes = IndexCollector::default().collect(&table(), rows);
        assert_eq!(indexes[0].name, " 123_45");
    }

    #[test]
    fn test_first_row_sets_index_attributes() {
        let rows = vec![
            row("IDX", IndexType::Other, Some("A"), 1, false).with_filter("a > 0"),
            row("IDX", IndexType::Other, Some("B"), 2, true),
        ];
        let indexes = IndexCollector::default().collect(&table(), rows);
        assert!(indexes[0].unique);
        assert_eq!(indexes[0].filter_condition.as_deref(), Some("a > 0"));
    }

    #[test]
    fn test_normalizer_merges_names() {
        let rows = vec![
            row("idx", IndexType::Other, Some("A"), 1, true),
            row("IDX", IndexType::Other, Some("B"), 2, true),
        ];
        let indexes =
            IndexCollector::default().collect_with(&table(), rows, |raw| raw.to_ascii_uppercase());
        assert_eq!(indexes.len(), 1);
        assert_eq!(cols(&indexes[0]), vec![Some("A"), Some("B")]);
    }

    #[test]
    fn test_normalizer_applies_to_columns() {
        let rows = vec![
            row("idx", IndexType::Other, Some("col_a"), 1, true),
            row("idx", IndexType::Other, Some("col_b"), 2, true),
        ];
        let indexes =
            IndexCollector::default().collect_with(&table(), rows, |raw| raw.to_ascii_uppercase());
        assert_eq!(indexes[0].name, "IDX");
        assert_eq!(cols(&indexes[0]), vec![Some("COL_A"), Some("COL_B")]);
    }

    #[test]
    fn test_oversized_ordinal_dropped() {
        let rows = vec![
            row("IDX", IndexType::Other, Some("A"), 1, true),
            row("IDX", IndexType::Other, Some("B"), i32::MAX, true),
            row("IDX", IndexType::Other, Some("C"), MAX_INDEX_KEY_COLUMNS as i32 + 1, true),
        ];
        let indexes = IndexCollector::default().collect(&table(), rows);
        assert_eq!(cols(&indexes[0]), vec![Some("A")]);
    }

    #[test]
    fn test_max_ordinal_accepted() {
        let rows = vec![row("IDX", IndexType::Other, Some("Z"), MAX_INDEX_KEY_COLUMNS as i32, true)];
        let indexes = IndexCollector::default().collect(&table(), rows);
        assert_eq!(indexes[0].columns.len(), MAX_INDEX_KEY_COLUMNS);
        assert_eq!(indexes[0].columns.last().unwrap().as_deref(), Some("Z"));
    }

    #[test]
    fn test_column_count_matches_max_ordinal() {
        let rows = vec![
            row("A_IDX", IndexType::Other, Some("x"), 2, true),
            row("B_IDX", IndexType::Other, Some("y"), 1, true),
            row("A_IDX", IndexType::Other, Some("w"), 1, true),
            row("B_IDX", IndexType::Other, Some("z"), 4, true),
        ];
        let indexes = IndexCollector::default().collect(&table(), rows);

        assert_eq!(indexes.len(), 2);
        assert_eq!(indexes[0].name, "A_IDX");
        assert_eq!(indexes[0].columns.len(), 2);
        assert_eq!(indexes[1].name, "B_IDX");
        assert_eq!(indexes[1].columns.len(), 4);
    }
}
