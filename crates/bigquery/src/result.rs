//! BigQuery v2 REST wire types and the shaped result handed to callers.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Request ──────────────────────────────────────────────────────

/// Body of a `jobs.query` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: String,
    /// Always sent, so the service never falls back to its legacy default.
    pub use_legacy_sql: bool,
}

impl QueryRequest {
    /// A standard-SQL request for `query`.
    pub fn standard(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            use_legacy_sql: false,
        }
    }
}

// ── Response ─────────────────────────────────────────────────────

/// Response of a `jobs.query` call.
///
/// `schema` and `rows` are both optional on the wire: an incomplete job or
/// an empty result omits them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<TableSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<TableRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_reference: Option<JobReference>,
    /// uint64 encoded as a JSON string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_bytes_processed: Option<String>,
    #[serde(default)]
    pub job_complete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    pub project_id: String,
    pub job_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Column schema of a result set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSchema {
    #[serde(default)]
    pub fields: Vec<TableFieldSchema>,
}

/// One column descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableFieldSchema {
    pub name: String,
    /// BigQuery type name ("STRING", "INTEGER", "RECORD", ...).
    #[serde(rename = "type", default)]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl TableFieldSchema {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            mode: None,
        }
    }
}

/// A result row: one cell per schema field, in schema order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub f: Vec<TableCell>,
}

impl TableRow {
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            f: values.into_iter().map(|v| TableCell { v }).collect(),
        }
    }
}

/// A single cell. BigQuery sends scalars as strings, NULL as `null`, and
/// RECORD/REPEATED values as nested JSON; all of it is kept as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub v: Value,
}

/// Response of a `datasets.list` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetList {
    #[serde(default)]
    pub datasets: Vec<DatasetListEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetListEntry {
    /// Fully-qualified id, `project:dataset`.
    pub id: String,
}

// ── Shaped result ────────────────────────────────────────────────

/// One result row with its cells type-erased to opaque JSON values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapedRow(pub Vec<Value>);

impl ShapedRow {
    pub fn cells(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ShapedRow {
    /// `[JFK LAX 42]`: strings unquoted, `null` as NULL, nested values as JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, cell) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match cell {
                Value::Null => write!(f, "NULL")?,
                Value::String(s) => write!(f, "{}", s)?,
                other => write!(f, "{}", other)?,
            }
        }
        write!(f, "]")
    }
}

/// Column names plus the row matrix, in the order the service returned them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapedResult {
    pub headers: Vec<String>,
    pub rows: Vec<ShapedRow>,
}

impl ShapedResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds the zero-based index of a column by name (case-sensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}
