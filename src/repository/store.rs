// src/repository/store.rs

//! SQLite-backed package metadata store
//!
//! An optional persistence layer in front of the solver: package records are
//! staged into SQLite tables (packages plus dependency/conflict link rows)
//! and read back in insertion order. The solver core only ever sees the
//! immutable `Repository` built from the returned records.

use crate::error::Result;
use crate::model::RepoRecord;
use rusqlite::{Connection, params};
use tracing::debug;

/// Schema for the metadata tables
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS packages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    version TEXT NOT NULL,
    size INTEGER NOT NULL,
    UNIQUE (name, version)
);
CREATE TABLE IF NOT EXISTS depends (
    package_id INTEGER NOT NULL REFERENCES packages(id),
    group_idx INTEGER NOT NULL,
    range TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS conflicts (
    package_id INTEGER NOT NULL REFERENCES packages(id),
    range TEXT NOT NULL
);
";

/// Package metadata store over a SQLite connection
pub struct PackageStore {
    conn: Connection,
}

impl PackageStore {
    /// Open an in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Open (or create) a store backed by a file
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Stage raw repository records into the store
    pub fn import(&mut self, records: &[RepoRecord]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for record in records {
            tx.execute(
                "INSERT INTO packages (name, version, size) VALUES (?1, ?2, ?3)",
                params![record.name, record.version, record.size],
            )?;
            let package_id = tx.last_insert_rowid();
            for (group_idx, group) in record.depends.iter().enumerate() {
                for range in group {
                    tx.execute(
                        "INSERT INTO depends (package_id, group_idx, range) \
                         VALUES (?1, ?2, ?3)",
                        params![package_id, group_idx as i64, range],
                    )?;
                }
            }
            for range in &record.conflicts {
                tx.execute(
                    "INSERT INTO conflicts (package_id, range) VALUES (?1, ?2)",
                    params![package_id, range],
                )?;
            }
        }
        tx.commit()?;
        debug!(records = records.len(), "staged repository records");
        Ok(())
    }

    /// Read all records back in insertion order
    pub fn records(&self) -> Result<Vec<RepoRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, version, size FROM packages ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u64>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, name, version, size) = row?;
            records.push(RepoRecord {
                name,
                version,
                size,
                depends: self.depends_of(id)?,
                conflicts: self.conflicts_of(id)?,
            });
        }
        Ok(records)
    }

    /// Exact point lookup by (name, version); returns the stored size
    pub fn find(&self, name: &str, version: &str) -> Result<Option<u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT size FROM packages WHERE name = ?1 AND version = ?2")?;
        let mut rows = stmt.query(params![name, version])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// All stored versions of a name, in insertion order
    pub fn versions_of(&self, name: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT version FROM packages WHERE name = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![name], |row| row.get(0))?;
        let mut versions = Vec::new();
        for row in rows {
            versions.push(row?);
        }
        Ok(versions)
    }

    fn depends_of(&self, package_id: i64) -> Result<Vec<Vec<String>>> {
        let mut stmt = self.conn.prepare(
            "SELECT group_idx, range FROM depends WHERE package_id = ?1 \
             ORDER BY group_idx, rowid",
        )?;
        let rows = stmt.query_map(params![package_id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut groups: Vec<Vec<String>> = Vec::new();
        for row in rows {
            let (group_idx, range) = row?;
            let group_idx = group_idx as usize;
            while groups.len() <= group_idx {
                groups.push(Vec::new());
            }
            groups[group_idx].push(range);
        }
        Ok(groups)
    }

    fn conflicts_of(&self, package_id: i64) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT range FROM conflicts WHERE package_id = ?1 ORDER BY rowid")?;
        let rows = stmt.query_map(params![package_id], |row| row.get(0))?;
        let mut conflicts = Vec::new();
        for row in rows {
            conflicts.push(row?);
        }
        Ok(conflicts)
    }
}
