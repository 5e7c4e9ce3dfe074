use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    create_rooms_table(conn)?;
    create_members_table(conn)?;
    create_availability_table(conn)?;
    Ok(())
}

fn create_rooms_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS rooms (
            code TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            password_hash TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create rooms table")?;

    Ok(())
}

fn create_members_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS members (
            id TEXT PRIMARY KEY,
            room_code TEXT NOT NULL REFERENCES rooms(code) ON DELETE CASCADE,
            nickname TEXT NOT NULL,
            joined_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create members table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_members_room ON members(room_code)",
        [],
    )
    .context("Failed to create members index")?;

    Ok(())
}

fn create_availability_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS availability (
            room_code TEXT NOT NULL REFERENCES rooms(code) ON DELETE CASCADE,
            member_id TEXT NOT NULL,
            slots TEXT NOT NULL DEFAULT '[]',
            revision INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT,
            PRIMARY KEY (room_code, member_id)
        )",
        [],
    )
    .context("Failed to create availability table")?;

    Ok(())
}
