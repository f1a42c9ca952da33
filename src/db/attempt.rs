use rusqlite::{Connection, Result};

use super::now;

#[derive(Debug, Clone)]
pub struct AttemptData {
    pub id: u64,
    pub test_id: u64,
    pub correct_count: usize,
    pub total: usize,
    pub percentage: u32,
    pub created_at: u64,
}

pub fn record_attempt(
    conn: &Connection,
    test_id: u64,
    correct_count: usize,
    total: usize,
    percentage: u32,
) -> Result<u64> {
    conn.execute(
        "INSERT INTO attempts (test_id, correct_count, total, percentage, created_at)
         VALUES (?, ?, ?, ?, ?)",
        rusqlite::params![test_id, correct_count, total, percentage, now()],
    )?;

    Ok(conn.last_insert_rowid() as u64)
}

pub fn list_attempts(conn: &Connection, test_id: u64) -> Result<Vec<AttemptData>> {
    let mut stmt = conn.prepare(
        "SELECT id, test_id, correct_count, total, percentage, created_at
         FROM attempts WHERE test_id = ? ORDER BY id ASC",
    )?;

    let attempts = stmt
        .query_map([test_id], |row| {
            Ok(AttemptData {
                id: row.get(0)?,
                test_id: row.get(1)?,
                correct_count: row.get(2)?,
                total: row.get(3)?,
                percentage: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(attempts)
}
