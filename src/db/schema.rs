//! Database schema and migrations

use rusqlite::Connection;

use crate::Result;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Initialize the database schema
///
/// # Errors
///
/// Returns error if migration fails
pub fn init(conn: &Connection) -> Result<()> {
    let version: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        migrate_v1(conn)?;
    }
    if version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r"
        -- Farms, one row per boundary; soft-deleted rows keep is_active = 0
        CREATE TABLE IF NOT EXISTS farms (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            crop_type TEXT NOT NULL DEFAULT '',
            soil_type TEXT NOT NULL DEFAULT '',
            irrigation_type TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT '',
            total_area REAL NOT NULL,
            area_sq_m REAL NOT NULL,
            perimeter REAL,
            center_lat REAL NOT NULL,
            center_lng REAL NOT NULL,
            coordinates TEXT NOT NULL,
            soil_data TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_farms_user ON farms(user_id, is_active);

        -- Farm each user is currently working with
        CREATE TABLE IF NOT EXISTS selected_farms (
            user_id TEXT PRIMARY KEY,
            farm_id TEXT NOT NULL REFERENCES farms(id),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        PRAGMA user_version = 1;
        ",
    )?;

    tracing::info!("migrated database to v1");
    Ok(())
}

fn migrate_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS community_posts (
            id TEXT PRIMARY KEY,
            author TEXT NOT NULL,
            content TEXT NOT NULL,
            tag TEXT NOT NULL,
            likes INTEGER NOT NULL DEFAULT 0,
            comments INTEGER NOT NULL DEFAULT 0,
            shares INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_community_posts_created ON community_posts(created_at);

        -- One row per (post, user) like
        CREATE TABLE IF NOT EXISTS community_likes (
            post_id TEXT NOT NULL REFERENCES community_posts(id) ON DELETE CASCADE,
            user_id TEXT NOT NULL,
            PRIMARY KEY (post_id, user_id)
        );

        PRAGMA user_version = 2;
        ",
    )?;

    tracing::info!("migrated database to v2");
    Ok(())
}
