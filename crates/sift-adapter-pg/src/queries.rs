//! Catalog queries. Every query takes the schema as `$1`; index queries take
//! the table name as `$2`.

/// Base tables of one schema.
pub const TABLES: &str = r#"
    select table_catalog, table_schema, table_name
    from information_schema.tables
    where table_type = 'BASE TABLE'
      and table_schema = $1
    order by table_name
"#;

pub const PRIMARY_KEYS: &str = r#"
    select tc.table_name, tc.constraint_name, kcu.column_name
    from information_schema.table_constraints tc
    join information_schema.key_column_usage kcu
      on tc.constraint_name = kcu.constraint_name
     and tc.table_schema = kcu.table_schema
     and tc.table_name = kcu.table_name
    where tc.constraint_type = 'PRIMARY KEY'
      and tc.table_schema = $1
    order by tc.table_name, tc.constraint_name, kcu.ordinal_position
"#;

pub const UNIQUE_CONSTRAINTS: &str = r#"
    select tc.table_name, tc.constraint_name, kcu.column_name
    from information_schema.table_constraints tc
    join information_schema.key_column_usage kcu
      on tc.constraint_name = kcu.constraint_name
     and tc.table_schema = kcu.table_schema
     and tc.table_name = kcu.table_name
    where tc.constraint_type = 'UNIQUE'
      and tc.table_schema = $1
    order by tc.table_name, tc.constraint_name, kcu.ordinal_position
"#;

/// Foreign keys with referenced columns paired by position. Read from
/// `pg_constraint` by owning relation, since constraint names are only unique
/// per table.
pub const FOREIGN_KEYS: &str = r#"
    select
      t.relname::text as table_name,
      c.conname::text as constraint_name,
      a.attname::text as column_name,
      rn.nspname::text as foreign_table_schema,
      rt.relname::text as foreign_table_name,
      ra.attname::text as foreign_column_name
    from pg_catalog.pg_constraint c
    join pg_catalog.pg_class t on t.oid = c.conrelid
    join pg_catalog.pg_namespace n on n.oid = t.relnamespace
    join pg_catalog.pg_class rt on rt.oid = c.confrelid
    join pg_catalog.pg_namespace rn on rn.oid = rt.relnamespace
    cross join lateral unnest(c.conkey, c.confkey) with ordinality as k(attnum, ref_attnum, ordinality)
    join pg_catalog.pg_attribute a
      on a.attrelid = c.conrelid and a.attnum = k.attnum
    join pg_catalog.pg_attribute ra
      on ra.attrelid = c.confrelid and ra.attnum = k.ref_attnum
    where c.contype = 'f'
      and n.nspname = $1
    order by t.relname, c.conname, k.ordinality
"#;

/// Generic index-info shape: a statistics row for the table followed by one
/// row per key column. Expression columns have no name.
pub const INDEX_INFO: &str = r#"
    select
      null::text as index_name,
      0::int2 as index_type,
      null::text as column_name,
      0::int4 as ordinal_position,
      null::bool as non_unique,
      null::text as filter_condition
    from pg_catalog.pg_class t
    join pg_catalog.pg_namespace n on n.oid = t.relnamespace
    where n.nspname = $1 and t.relname = $2
    union all
    select
      i.relname::text,
      case
        when am.amname = 'hash' then 2
        when ix.indisclustered then 1
        else 3
      end::int2,
      a.attname::text,
      k.ordinality::int4,
      not ix.indisunique,
      pg_catalog.pg_get_expr(ix.indpred, ix.indrelid)
    from pg_catalog.pg_index ix
    join pg_catalog.pg_class t on t.oid = ix.indrelid
    join pg_catalog.pg_namespace n on n.oid = t.relnamespace
    join pg_catalog.pg_class i on i.oid = ix.indexrelid
    join pg_catalog.pg_am am on am.oid = i.relam
    cross join lateral unnest(ix.indkey::int2[]) with ordinality as k(attnum, ordinality)
    left join pg_catalog.pg_attribute a
      on a.attrelid = t.oid and a.attnum = k.attnum
    where n.nspname = $1 and t.relname = $2
      and k.ordinality <= ix.indnkeyatts
    order by 5, 2, 1, 4
"#;

/// Direct catalog read, ordered by index name then ordinal position.
pub const INDEX_COLUMNS_DIRECT: &str = r#"
    select
      i.relname::text as index_name,
      case
        when am.amname = 'hash' then 2
        when ix.indisclustered then 1
        else 3
      end::int2 as index_type,
      a.attname::text as column_name,
      k.ordinality::int4 as ordinal_position,
      not ix.indisunique as non_unique,
      pg_catalog.pg_get_expr(ix.indpred, ix.indrelid) as filter_condition
    from pg_catalog.pg_index ix
    join pg_catalog.pg_class t on t.oid = ix.indrelid
    join pg_catalog.pg_namespace n on n.oid = t.relnamespace
    join pg_catalog.pg_class i on i.oid = ix.indexrelid
    join pg_catalog.pg_am am on am.oid = i.relam
    cross join lateral unnest(ix.indkey::int2[]) with ordinality as k(attnum, ordinality)
    left join pg_catalog.pg_attribute a
      on a.attrelid = t.oid and a.attnum = k.attnum
    where n.nspname = $1 and t.relname = $2
      and k.ordinality <= ix.indnkeyatts
    order by i.relname, k.ordinality
"#;

/// One column of a named constraint, as returned by the constraint queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintColumn {
    pub table_name: String,
    pub constraint_name: String,
    pub column_name: String,
}

/// Fold consecutive rows of the same (table, constraint) into
/// `(table, constraint, columns)`, keeping row order.
pub fn group_constraint_columns(rows: Vec<ConstraintColumn>) -> Vec<(String, String, Vec<String>)> {
    let mut grouped: Vec<(String, String, Vec<String>)> = Vec::new();
    for row in rows {
        if let Some((table, constraint, columns)) = grouped.last_mut()
            && *table == row.table_name
            && *constraint == row.constraint_name
        {
            columns.push(row.column_name);
            continue;
        }
        grouped.push((row.table_name, row.constraint_name, vec![row.column_name]));
    }
    grouped
}
