use rusqlite::Connection;
use soxdash_model::Domain;

/// Ensure the domain's table and upload index exist.
///
/// Safe to run on every open; uses `IF NOT EXISTS` throughout. Business
/// columns are declared TEXT and hold the model's tagged JSON cell encoding
/// so values round-trip with their original types.
pub(crate) fn init(conn: &Connection, domain: Domain) -> rusqlite::Result<()> {
    let table = domain.table_name();
    let business_columns: String = domain
        .columns()
        .iter()
        .map(|c| format!("          {} TEXT,\n", c.ident))
        .collect();

    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
{business_columns}          upload_id TEXT NOT NULL,
          filename TEXT NOT NULL,
          uploaded_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_{table}_upload ON {table}(upload_id);
        "#
    ))?;

    Ok(())
}
