use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: i64 = 1;

pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;
    // Checkpoint every ~400KB instead of the default ~4MB — keeps WAL files small
    conn.pragma_update(None, "wal_autocheckpoint", 100)?;

    // Force-checkpoint any stale WAL data into the main DB on startup.
    // Errors are non-fatal — in-memory DBs and fresh files legitimately fail this.
    if conn
        .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
        .is_ok()
    {
        tracing::info!("startup WAL checkpoint complete");
    }

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS latent_points (
            id      TEXT PRIMARY KEY,
            vector  TEXT NOT NULL,
            pixel_x INTEGER,
            pixel_y INTEGER,
            tags    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS hyper_edges (
            id          TEXT PRIMARY KEY,
            description TEXT NOT NULL DEFAULT '',
            weight      REAL NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS edge_members (
            edge_id  TEXT NOT NULL REFERENCES hyper_edges(id),
            point_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (edge_id, position)
        );

        CREATE TABLE IF NOT EXISTS concept_nodes (
            id              TEXT PRIMARY KEY,
            node_type       TEXT NOT NULL DEFAULT 'concept',
            label           TEXT NOT NULL,
            description     TEXT NOT NULL DEFAULT '',
            vector          TEXT NOT NULL,
            anchors         TEXT NOT NULL,
            proj_x          REAL,
            proj_y          REAL,
            proj_confidence REAL
        );

        CREATE TABLE IF NOT EXISTS traces (
            id               TEXT NOT NULL,
            concept_id       TEXT NOT NULL,
            prompt           TEXT NOT NULL,
            response_summary TEXT NOT NULL DEFAULT '',
            point_id         TEXT NOT NULL,
            coord_x          REAL NOT NULL,
            coord_y          REAL NOT NULL,
            coord_confidence REAL NOT NULL,
            value            REAL NOT NULL,
            created_at       INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_members_point ON edge_members(point_id);
        CREATE INDEX IF NOT EXISTS idx_traces_concept ON traces(concept_id);
        ",
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

pub fn get_schema_version(conn: &Connection) -> Result<Option<i64>> {
    let mut stmt = conn.prepare("SELECT value FROM metadata WHERE key = 'schema_version'")?;
    let version = stmt
        .query_row([], |row| {
            let v: String = row.get(0)?;
            Ok(v.parse::<i64>().unwrap_or(0))
        })
        .ok();
    Ok(version)
}
