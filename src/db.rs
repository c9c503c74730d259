use rusqlite::{Connection, Transaction};
use std::path::Path;

pub const DB_FILE_NAME: &str = "smartmenus.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS users(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS user_capabilities(
            user_id INTEGER NOT NULL,
            capability TEXT NOT NULL,
            PRIMARY KEY(user_id, capability),
            FOREIGN KEY(user_id) REFERENCES users(id)
        )",
        [],
    )?;

    // sessions.id holds the SHA-256 digest of the session id, never the id itself.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS sessions(
            id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL,
            sesskey TEXT NOT NULL,
            created_at TEXT NOT NULL,
            last_seen_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS session_notices(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id TEXT NOT NULL,
            level TEXT NOT NULL,
            message TEXT NOT NULL,
            FOREIGN KEY(session_id) REFERENCES sessions(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_session_notices_session ON session_notices(session_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS menus(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            updated_at TEXT
        )",
        [],
    )?;

    // No UNIQUE(menu, sortorder): SQLite checks uniqueness per statement and
    // rank swaps/shifts pass through transient duplicates.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS menu_items(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            menu INTEGER NOT NULL,
            title TEXT NOT NULL,
            url TEXT,
            item_type TEXT NOT NULL DEFAULT 'static',
            css_class TEXT,
            target TEXT,
            visible INTEGER NOT NULL DEFAULT 1,
            sortorder INTEGER NOT NULL,
            FOREIGN KEY(menu) REFERENCES menus(id)
        )",
        [],
    )?;
    ensure_menu_items_updated_at(conn)?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_menu_items_menu_sort ON menu_items(menu, sortorder)",
        [],
    )?;

    Ok(())
}

/// Runs `f` inside one transaction. `Ok` commits; any `Err` drops the
/// transaction, which rolls every write back.
pub fn with_transaction<T, E, F>(conn: &Connection, f: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<rusqlite::Error>,
{
    let tx = conn.unchecked_transaction()?;
    let out = f(&tx)?;
    tx.commit()?;
    Ok(out)
}

// Workspaces created before item timestamps existed.
fn ensure_menu_items_updated_at(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "menu_items", "updated_at")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE menu_items ADD COLUMN updated_at TEXT", [])?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
