//! Database schema definitions
//!
//! One table: two non-null id columns under a composite primary key, plus a
//! secondary index per column. Rendered per binding since the table and
//! column names are configurable.

use crate::binding::TableBinding;

/// SQL to create the preference table
pub fn create_table_sql(binding: &TableBinding) -> String {
    let t = binding.table();
    let u = binding.user_column();
    let i = binding.item_column();
    format!(
        "CREATE TABLE IF NOT EXISTS {t} (\n    \
            {u} INTEGER NOT NULL,\n    \
            {i} INTEGER NOT NULL,\n    \
            PRIMARY KEY ({u}, {i})\n\
         )"
    )
}

/// SQL to create indexes
pub fn create_index_sql(binding: &TableBinding) -> Vec<String> {
    let t = binding.table();
    let u = binding.user_column();
    let i = binding.item_column();
    vec![
        format!("CREATE INDEX IF NOT EXISTS idx_{t}_{u} ON {t}({u})"),
        format!("CREATE INDEX IF NOT EXISTS idx_{t}_{i} ON {t}({i})"),
    ]
}

/// All schema creation statements for a binding
pub fn all_schema_statements(binding: &TableBinding) -> Vec<String> {
    let mut stmts = vec![create_table_sql(binding)];
    stmts.extend(create_index_sql(binding));
    stmts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sql_uses_binding_identifiers() {
        let binding = TableBinding::new("prefs", "uid", "iid").unwrap();
        let sql = create_table_sql(&binding);
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS prefs"));
        assert!(sql.contains("uid INTEGER NOT NULL"));
        assert!(sql.contains("iid INTEGER NOT NULL"));
        assert!(sql.contains("PRIMARY KEY (uid, iid)"));
    }

    #[test]
    fn test_statement_count() {
        let binding = TableBinding::default();
        assert_eq!(all_schema_statements(&binding).len(), 3);
    }
}
