use std::path::Path;

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, Row, ToSql};
use serde::{Serialize, Serializer};
use tracing::error;

use crate::error::StoreError;

/// Core value types for store operations
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Boolean(bool),
}

impl Value {
    /// Coerce to an integer where the underlying value allows it
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Real(f) => Some(*f as i64),
            Value::Text(s) => s.parse().ok(),
            Value::Boolean(b) => Some(*b as i64),
            _ => None,
        }
    }

    /// Coerce to a float where the underlying value allows it
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(f) => Some(*f),
            Value::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Borrow the text content, if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::Integer(i) => Some(*i != 0),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(v: ValueRef<'_>) -> Self {
        match v {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
            Value::Boolean(b) => ToSqlOutput::Borrowed(ValueRef::Integer(*b as i64)),
        })
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Real(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Blob(b) => serializer.serialize_bytes(b),
            Value::Boolean(b) => serializer.serialize_bool(*b),
        }
    }
}

/// Field mapping for inserts and updates. Keeps insertion order; the keys
/// determine exactly which columns appear in the generated statement.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Fields {
    entries: Vec<(String, Value)>,
}

impl Fields {
    /// Create an empty field mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named value, replacing any existing entry with the same name
    pub fn with_value(mut self, name: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name.to_string(), value));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
}

/// One row of query output, as an ordered column-to-value mapping
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Vec<(String, Value)>,
}

impl Record {
    fn from_row(names: &[String], row: &Row<'_>) -> rusqlite::Result<Self> {
        let mut columns = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            columns.push((name.clone(), Value::from(row.get_ref(i)?)));
        }
        Ok(Self { columns })
    }

    /// Look up a value by column name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Look up a value by column position
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.columns.get(index).map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// Identifiers are interpolated into statement text (the driver cannot bind
// them), so table and column names must pass this check before any SQL is
// built. Values are always bound, never interpolated.
fn check_identifier(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}

/// Table-agnostic CRUD access to a single SQLite database file.
///
/// The connection is opened once at construction and held for the accessor's
/// lifetime. Each operation is its own implicit transaction; driver failures
/// are logged with the originating statement and returned as [`StoreError`],
/// never panicked on.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open the database file at `path`, creating it if absent.
    ///
    /// Callers treat a failed open as a startup failure; there is no
    /// reconnection path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { conn })
    }

    /// Open an in-memory database, mainly for tests and fixtures.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: ":memory:".into(),
            source,
        })?;
        Ok(Self { conn })
    }

    /// Run a raw statement with no parameter binding and return the
    /// affected-row count. Used for DDL and statements the caller has
    /// already assembled from trusted input.
    pub fn execute(&self, sql: &str) -> Result<usize, StoreError> {
        self.conn.execute(sql, []).map_err(|source| {
            error!(sql, error = %source, "statement execution failed");
            StoreError::Statement {
                sql: sql.to_string(),
                source,
            }
        })
    }

    /// Run a raw query with no parameter binding and return the first
    /// resulting row, or `None` if the query yields nothing.
    pub fn fetch(&self, sql: &str) -> Result<Option<Record>, StoreError> {
        self.fetch_first(sql, []).map_err(|source| {
            error!(sql, error = %source, "query failed");
            StoreError::Statement {
                sql: sql.to_string(),
                source,
            }
        })
    }

    /// Insert a row addressing exactly the supplied field names, values
    /// bound as parameters. Returns the new row's id.
    pub fn create(&self, table: &str, fields: &Fields) -> Result<i64, StoreError> {
        check_identifier(table)?;
        if fields.is_empty() {
            return Err(StoreError::EmptyFields {
                table: table.to_string(),
            });
        }
        for name in fields.names() {
            check_identifier(name)?;
        }

        let columns = fields.names().collect::<Vec<_>>().join(", ");
        let placeholders = (1..=fields.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("INSERT INTO {table} ({columns}) VALUES ({placeholders})");

        self.conn
            .execute(&sql, params_from_iter(fields.values()))
            .map_err(|source| {
                error!(table, sql = %sql, data = ?fields, error = %source, "create failed");
                StoreError::Statement { sql, source }
            })?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Fetch the single row whose `id` column equals `id`.
    pub fn read(&self, table: &str, id: i64) -> Result<Option<Record>, StoreError> {
        check_identifier(table)?;
        let sql = format!("SELECT * FROM {table} WHERE id = ?1");
        self.fetch_first(&sql, [id]).map_err(|source| {
            error!(table, id, sql = %sql, error = %source, "read failed");
            StoreError::Statement { sql, source }
        })
    }

    /// Update exactly the supplied columns of the row with the given `id`.
    ///
    /// Returns the number of rows affected; `Ok(0)` means no row matched,
    /// which is distinct from a statement failure.
    pub fn update(&self, table: &str, id: i64, fields: &Fields) -> Result<usize, StoreError> {
        check_identifier(table)?;
        if fields.is_empty() {
            return Err(StoreError::EmptyFields {
                table: table.to_string(),
            });
        }
        for name in fields.names() {
            check_identifier(name)?;
        }

        let assignments = fields
            .names()
            .enumerate()
            .map(|(i, name)| format!("{name} = ?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {table} SET {assignments} WHERE id = ?{}",
            fields.len() + 1
        );

        let id_value = Value::Integer(id);
        let params = fields.values().chain(std::iter::once(&id_value));
        self.conn
            .execute(&sql, params_from_iter(params))
            .map_err(|source| {
                error!(table, id, sql = %sql, data = ?fields, error = %source, "update failed");
                StoreError::Statement { sql, source }
            })
    }

    /// Delete the row with the given `id`.
    pub fn delete(&self, table: &str, id: i64) -> Result<(), StoreError> {
        check_identifier(table)?;
        let sql = format!("DELETE FROM {table} WHERE id = ?1");
        self.conn.execute(&sql, [id]).map_err(|source| {
            error!(table, id, sql = %sql, error = %source, "delete failed");
            StoreError::Statement { sql, source }
        })?;
        Ok(())
    }

    /// Count the rows in `table`.
    ///
    /// An empty table is `Ok(0)`; a failed count (for example against a
    /// missing table) is an error, the two are never conflated.
    pub fn count(&self, table: &str) -> Result<i64, StoreError> {
        check_identifier(table)?;
        let sql = format!("SELECT COUNT(*) FROM {table}");
        let record = self.fetch(&sql)?;
        Ok(record
            .and_then(|r| r.value_at(0).and_then(Value::as_i64))
            .unwrap_or(0))
    }

    fn fetch_first<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> rusqlite::Result<Option<Record>> {
        let mut stmt = self.conn.prepare(sql)?;
        let names = (0..stmt.column_count())
            .map(|i| stmt.column_name(i).map(str::to_string))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        let mut rows = stmt.query(params)?;
        match rows.next()? {
            Some(row) => Record::from_row(&names, row).map(Some),
            None => Ok(None),
        }
    }
}
