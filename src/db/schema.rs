use rusqlite::Connection;

/// Initialize the activation database schema
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Activation codes (one row per code, at most one bound device)
        -- code is stored normalized: no hyphens, uppercase
        -- active_till is an ISO calendar date (YYYY-MM-DD), valid through 23:59:59.999 UTC
        CREATE TABLE IF NOT EXISTS activation_codes (
            code TEXT PRIMARY KEY,
            email TEXT,
            name TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            active_till TEXT NOT NULL,
            device_id TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_activation_codes_active ON activation_codes(code) WHERE is_active = 1;
        "#,
    )
}
