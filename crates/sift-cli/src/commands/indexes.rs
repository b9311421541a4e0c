//! `sift indexes` - list indexes with the constraints they back.

use sift_core::{Index, SiftConfig, Snapshot};
use std::fmt::Write;

pub async fn run(
    config: &SiftConfig,
    database_url: Option<&str>,
    table: Option<&str>,
    standalone: bool,
) -> anyhow::Result<()> {
    let snapshot = super::capture(config, database_url).await?;

    if let Some(name) = table
        && snapshot.find_table(name).is_none()
    {
        return Err(anyhow::anyhow!(
            "Table '{}' not found in schema '{}'",
            name,
            snapshot.schema
        ));
    }

    print!("{}", render(&snapshot, table, standalone));
    Ok(())
}

/// Render indexes grouped by table, in snapshot table order.
pub fn render(snapshot: &Snapshot, table: Option<&str>, standalone: bool) -> String {
    let mut out = String::new();

    for t in &snapshot.tables {
        if table.is_some_and(|name| !t.name.eq_ignore_ascii_case(name)) {
            continue;
        }

        let table_ref = t.table_ref();
        let indexes: Vec<&Index> = snapshot
            .indexes_for(&table_ref)
            .filter(|i| !standalone || !i.is_associated())
            .collect();
        if indexes.is_empty() {
            continue;
        }

        let _ = writeln!(out, "{}", table_ref);
        for index in indexes {
            let _ = writeln!(out, "  {}", describe(index));
        }
    }

    if out.is_empty() {
        out.push_str("No indexes found.\n");
    }
    out
}

fn describe(index: &Index) -> String {
    let columns: Vec<&str> = index
        .columns
        .iter()
        .map(|c| c.as_deref().unwrap_or("?"))
        .collect();

    let mut line = format!("{} ({})", index.name, columns.join(", "));
    if index.unique {
        line.push_str(" unique");
    }
    if let Some(filter) = &index.filter_condition {
        let _ = write!(line, " where {}", filter);
    }
    if index.is_associated() {
        let tags: Vec<String> = index.associations.iter().map(|a| a.to_string()).collect();
        let _ = write!(line, " -> {}", tags.join(", "));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::{DatabaseInfo, IndexAssociation, Table, TableRef};

    fn snapshot() -> Snapshot {
        let mut snapshot = Snapshot::new(
            "public",
            DatabaseInfo {
                kind: "postgres".to_string(),
                version: "16".to_string(),
            },
        );
        snapshot.tables = vec![
            Table::new(Some("public"), "users"),
            Table::new(Some("public"), "orders"),
        ];

        let mut pkey = Index::new("users_pkey", TableRef::new(Some("public"), "users"));
        pkey.unique = true;
        pkey.set_column(1, "id");
        pkey.associate(IndexAssociation::PrimaryKey);

        let mut partial = Index::new("users_active_idx", TableRef::new(Some("public"), "users"));
        partial.set_column(2, "email");
        partial.filter_condition = Some("(deleted_at IS NULL)".to_string());

        snapshot.indexes = vec![pkey, partial];
        snapshot
    }

    #[test]
    fn test_render_all() {
        let out = render(&snapshot(), None, false);
        assert_eq!(
            out,
            "public.users\n  users_pkey (id) unique -> primary_key\n  users_active_idx (?, email) where (deleted_at IS NULL)\n"
        );
    }

    #[test]
    fn test_render_standalone_only() {
        let out = render(&snapshot(), Some("USERS"), true);
        assert!(!out.contains("users_pkey"));
        assert!(out.contains("users_active_idx"));
    }

    #[test]
    fn test_render_empty_table() {
        assert_eq!(render(&snapshot(), Some("orders"), false), "No indexes found.\n");
    }
}
