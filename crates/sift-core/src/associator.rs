//! Tags indexes with the constraints they back.
//!
//! Association is purely additive: indexes that back a constraint are kept
//! and only gain tags, so downstream consumers decide what to hide.

use crate::schema::{ForeignKey, Index, IndexAssociation, PrimaryKey, TableRef, UniqueConstraint};

/// Add an association tag to every index whose table and exact column list
/// match a primary key, foreign key or unique constraint.
pub fn associate_indexes_with_constraints(
    indexes: &mut [Index],
    primary_keys: &[PrimaryKey],
    foreign_keys: &[ForeignKey],
    unique_constraints: &[UniqueConstraint],
) {
    for index in indexes.iter_mut() {
        if primary_keys
            .iter()
            .any(|pk| backs(index, &pk.table, &pk.columns))
        {
            index.associate(IndexAssociation::PrimaryKey);
        }

        if foreign_keys
            .iter()
            .any(|fk| backs(index, &fk.table, &fk.columns))
        {
            index.associate(IndexAssociation::ForeignKey);
        }

        if unique_constraints
            .iter()
            .any(|uc| backs(index, &uc.table, &uc.columns))
        {
            index.associate(IndexAssociation::UniqueConstraint);
        }

        if index.is_associated() {
            tracing::debug!(
                table = %index.table,
                index = %index.name,
                associations = ?index.associations,
                "Index backs constraint"
            );
        }
    }
}

fn backs(index: &Index, table: &TableRef, columns: &[String]) -> bool {
    index.table.same_name(table) && index.has_columns(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(table: &str, columns: &[&str]) -> Index {
        let mut index = Index::new("idx", TableRef::new(None, table));
        for (i, column) in columns.iter().enumerate() {
            index.set_column(i + 1, *column);
        }
        index
    }

    fn strings(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|c| c.to_string()).collect()
    }

    fn pk(table: &str, columns: &[&str]) -> PrimaryKey {
        PrimaryKey {
            name: None,
            table: TableRef::new(None, table),
            columns: strings(columns),
        }
    }

    fn fk(table: &str, columns: &[&str]) -> ForeignKey {
        ForeignKey {
            name: "fk".to_string(),
            table: TableRef::new(None, table),
            columns: strings(columns),
            references: TableRef::new(None, "parent"),
            referenced_columns: strings(&["id"]),
        }
    }

    fn uc(table: &str, columns: &[&str]) -> UniqueConstraint {
        UniqueConstraint {
            name: "uc".to_string(),
            table: TableRef::new(None, table),
            columns: strings(columns),
        }
    }

    #[test]
    fn test_foreign_key_association() {
        let mut indexes = vec![index("T", &["A"])];
        associate_indexes_with_constraints(&mut indexes, &[], &[fk("T", &["A"])], &[]);
        assert_eq!(
            indexes[0].associations.iter().copied().collect::<Vec<_>>(),
            vec![IndexAssociation::ForeignKey]
        );
    }

    #[test]
    fn test_column_order_and_count_must_match() {
        let mut indexes = vec![index("T", &["A", "B"])];
        associate_indexes_with_constraints(
            &mut indexes,
            &[pk("T", &["B", "A"]), pk("T", &["A"]), pk("T", &["A", "B", "C"])],
            &[],
            &[],
        );
        assert!(!indexes[0].is_associated());

        associate_indexes_with_constraints(&mut indexes, &[pk("T", &["A", "B"])], &[], &[]);
        assert!(indexes[0].associations.contains(&IndexAssociation::PrimaryKey));
    }

    #[test]
    fn test_table_name_is_case_insensitive() {
        let mut indexes = vec![index("users", &["id"])];
        associate_indexes_with_constraints(&mut indexes, &[pk("USERS", &["id"])], &[], &[]);
        assert!(indexes[0].associations.contains(&IndexAssociation::PrimaryKey));
    }

    #[test]
    fn test_other_table_does_not_match() {
        let mut indexes = vec![index("orders", &["id"])];
        associate_indexes_with_constraints(
            &mut indexes,
            &[pk("users", &["id"])],
            &[fk("users", &["id"])],
            &[uc("users", &["id"])],
        );
        assert!(!indexes[0].is_associated());
    }

    #[test]
    fn test_multiple_tags() {
        let mut indexes = vec![index("T", &["A"])];
        associate_indexes_with_constraints(
            &mut indexes,
            &[pk("T", &["A"])],
            &[fk("T", &["A"])],
            &[uc("T", &["A"])],
        );
        assert_eq!(indexes[0].associations.len(), 3);
    }

    #[test]
    fn test_unset_slot_never_matches() {
        let mut idx = Index::new("idx", TableRef::new(None, "T"));
        idx.set_column(2, "B");
        let mut indexes = vec![idx];
        associate_indexes_with_constraints(&mut indexes, &[pk("T", &["A", "B"])], &[], &[]);
        assert!(!indexes[0].is_associated());
    }

    #[test]
    fn test_indexes_are_never_removed() {
        let mut indexes = vec![index("T", &["A"]), index("T", &["B"])];
        associate_indexes_with_constraints(&mut indexes, &[pk("T", &["A"])], &[], &[]);
        assert_eq!(indexes.len(), 2);
        assert!(indexes[0].is_associated());
        assert!(!indexes[1].is_associated());
    }
}
