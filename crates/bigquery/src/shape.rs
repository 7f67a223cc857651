//! Schema + typed cells → header list + row-of-values matrix.

use serde_json::Value;

use crate::result::{ShapedResult, ShapedRow, TableRow, TableSchema};

/// Reshape a query result into column names and opaque rows.
///
/// Returns `None` when either the schema or the row set is absent; that is
/// a normal outcome, not an error. Every produced row is exactly as wide as
/// the schema: cell `j` of row `i` is the verbatim value of input cell `j`
/// of input row `i`. A short row is padded with `Null`, and cells past the
/// schema width are dropped.
pub fn shape(schema: Option<&TableSchema>, rows: Option<&[TableRow]>) -> Option<ShapedResult> {
    let (schema, rows) = (schema?, rows?);
    let width = schema.fields.len();

    let headers = schema.fields.iter().map(|f| f.name.clone()).collect();

    let rows = rows
        .iter()
        .map(|row| {
            let mut cells = vec![Value::Null; width];
            for (slot, cell) in cells.iter_mut().zip(&row.f) {
                *slot = cell.v.clone();
            }
            ShapedRow(cells)
        })
        .collect();

    Some(ShapedResult { headers, rows })
}
