//! DuckDB-backed record store for saved tenders, analyses and search history.
//!
//! Every table is keyed by an owning identity (`user_id`). Rows come back as
//! `HashMap<String, serde_json::Value>` and can be deserialized straight
//! into the model types with [`Store::execute_into`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use duckdb::{types::ValueRef, Connection as DuckDbConnection, ToSql};
use serde::de::DeserializeOwned;

use crate::error::{Result, TedError};

const SCHEMA: &str = "
CREATE SEQUENCE IF NOT EXISTS saved_tenders_id_seq START 1;
CREATE TABLE IF NOT EXISTS saved_tenders (
    id BIGINT PRIMARY KEY DEFAULT nextval('saved_tenders_id_seq'),
    user_id VARCHAR NOT NULL,
    ted_id VARCHAR NOT NULL,
    title VARCHAR NOT NULL,
    date VARCHAR NOT NULL,
    cpv_code VARCHAR,
    cpv_description VARCHAR,
    country VARCHAR,
    country_name VARCHAR,
    notice_type VARCHAR,
    uri VARCHAR,
    tender_value DOUBLE,
    currency VARCHAR DEFAULT 'EUR',
    is_our_sector BOOLEAN NOT NULL DEFAULT FALSE,
    notes VARCHAR,
    created_at VARCHAR NOT NULL,
    updated_at VARCHAR NOT NULL,
    UNIQUE (user_id, ted_id)
);
CREATE SEQUENCE IF NOT EXISTS market_analysis_id_seq START 1;
CREATE TABLE IF NOT EXISTS market_analysis (
    id BIGINT PRIMARY KEY DEFAULT nextval('market_analysis_id_seq'),
    user_id VARCHAR NOT NULL,
    analysis_name VARCHAR NOT NULL,
    description VARCHAR,
    total_market_value DOUBLE,
    our_sector_value DOUBLE,
    market_share_percentage DOUBLE,
    countries VARCHAR,
    cpv_codes VARCHAR,
    date_from VARCHAR,
    date_to VARCHAR,
    created_at VARCHAR NOT NULL,
    updated_at VARCHAR NOT NULL
);
CREATE SEQUENCE IF NOT EXISTS search_history_id_seq START 1;
CREATE TABLE IF NOT EXISTS search_history (
    id BIGINT PRIMARY KEY DEFAULT nextval('search_history_id_seq'),
    user_id VARCHAR NOT NULL,
    search_filters VARCHAR NOT NULL,
    search_name VARCHAR,
    results_count BIGINT,
    created_at VARCHAR NOT NULL
);
";

/// Wraps a DuckDB connection holding the per-owner tables.
pub struct Store {
    conn: DuckDbConnection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        let store = Self { conn, path: None };
        store.init_schema()?;
        Ok(store)
    }

    /// Open (or create) a database file, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = DuckDbConnection::open(path)?;
        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.init_schema()?;
        tracing::debug!(path = %path.display(), "Opened tender store");
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Location of the database file, `None` when in memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Works for `SELECT` as well as `INSERT/UPDATE ... RETURNING`.
    pub fn execute(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows_result = stmt.query(params)?;

        // Column metadata is only available once the statement has run.
        let column_names: Vec<String> = rows_result
            .as_ref()
            .map(|s| s.column_names().into_iter().map(|c| c.to_string()).collect())
            .unwrap_or_default();

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = HashMap::with_capacity(column_names.len());
            for (i, col_name) in column_names.iter().enumerate() {
                map.insert(col_name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
    ) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(row.into_iter().collect());
            results.push(serde_json::from_value(value)?);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row.
    pub fn execute_scalar(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
    ) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;

        if let Some(row) = rows.next()? {
            Ok(Some(convert_value_ref(row.get_ref(0)?)))
        } else {
            Ok(None)
        }
    }

    /// Execute a statement that returns no rows; yields the affected count.
    pub fn execute_update(&self, sql: &str, params: &[&dyn ToSql]) -> Result<usize> {
        Ok(self.conn.execute(sql, params)?)
    }

    /// Access the underlying DuckDB connection for advanced usage.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
    }
}

/// Current time as an RFC 3339 string with microsecond precision, so that
/// lexical order matches chronological order.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Store list columns as a `", "`-joined VARCHAR.
pub(crate) fn join_list(values: &[String]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

pub(crate) fn split_list(value: Option<&str>) -> Vec<String> {
    match value {
        Some(v) if !v.trim().is_empty() => v.split(", ").map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// Whether a DuckDB error is a UNIQUE / PRIMARY KEY violation.
pub(crate) fn is_unique_violation(err: &TedError) -> bool {
    match err {
        TedError::DuckDb(e) => {
            let msg = e.to_string();
            msg.contains("Duplicate key") || msg.contains("violates unique constraint")
        }
        _ => false,
    }
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UTinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::USmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UBigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => match i64::try_from(n) {
            Ok(i) => serde_json::Value::Number(i.into()),
            Err(_) => serde_json::Value::String(n.to_string()),
        },
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => serde_json::Value::String(String::from_utf8_lossy(bytes).to_string()),
        // Every column in this schema is one of the types above.
        _ => serde_json::Value::Null,
    }
}
