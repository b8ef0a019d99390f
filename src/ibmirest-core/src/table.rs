use serde_json::Value;

use crate::error::{CoreError, Result};

/// Value type inferred for a column from its non-null cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Only nulls seen so far
    Unknown,
    Boolean,
    Integer,
    Float,
    String,
    /// Nested object or array, kept as JSON (not flattened)
    Json,
}

impl ColumnType {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => ColumnType::Unknown,
            Value::Bool(_) => ColumnType::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => ColumnType::Integer,
            Value::Number(_) => ColumnType::Float,
            Value::String(_) => ColumnType::String,
            Value::Array(_) | Value::Object(_) => ColumnType::Json,
        }
    }

    fn widen(self, other: ColumnType) -> Self {
        use ColumnType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Unknown, b) => b,
            (a, Unknown) => a,
            (Integer, Float) | (Float, Integer) => Float,
            (Json, _) | (_, Json) => Json,
            _ => String,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

/// Result set of a query: named columns and rows of nullable values.
///
/// Only flat objects convert cleanly. Nested objects and arrays are kept as
/// raw JSON values in a `Json` column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Option<Value>>>,
}

impl Table {
    /// Build a table from a JSON array of row objects
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| CoreError::Conversion(format!("invalid JSON: {}", e)))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Array(items) = value else {
            return Err(CoreError::Conversion(
                "expected a JSON array of row objects".to_string(),
            ));
        };

        let mut table = Table::default();
        let mut objects = Vec::with_capacity(items.len());

        for (index, item) in items.into_iter().enumerate() {
            let Value::Object(map) = item else {
                return Err(CoreError::Conversion(format!(
                    "row {} is not a JSON object",
                    index
                )));
            };
            for (key, cell) in &map {
                let idx = match table.column_index(key) {
                    Some(idx) => idx,
                    None => {
                        table.columns.push(Column {
                            name: key.clone(),
                            column_type: ColumnType::Unknown,
                        });
                        table.columns.len() - 1
                    }
                };
                let column = &mut table.columns[idx];
                column.column_type = column.column_type.widen(ColumnType::of(cell));
            }
            objects.push(map);
        }

        table.rows = objects
            .into_iter()
            .map(|mut map| {
                table
                    .columns
                    .iter()
                    .map(|col| match map.remove(&col.name) {
                        None | Some(Value::Null) => None,
                        Some(v) => Some(v),
                    })
                    .collect()
            })
            .collect();

        tracing::debug!(
            columns = table.columns.len(),
            rows = table.rows.len(),
            "Materialized table from JSON"
        );

        Ok(table)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn rows(&self) -> &[Vec<Option<Value>>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Cell value by row number and column name. `None` for nulls and
    /// out-of-range lookups alike.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_ref()
    }

    /// Rows as loosely typed lists, optionally preceded by a header row
    /// holding the column names. Nulls become `Value::Null`.
    pub fn rows_as_list(&self, include_header: bool) -> Vec<Vec<Value>> {
        let mut list = Vec::with_capacity(self.rows.len() + usize::from(include_header));
        if include_header {
            list.push(
                self.columns
                    .iter()
                    .map(|c| Value::String(c.name.clone()))
                    .collect(),
            );
        }
        list.extend(self.rows.iter().map(|row| {
            row.iter()
                .map(|cell| cell.clone().unwrap_or(Value::Null))
                .collect()
        }));
        list
    }
}

/// Text form of a cell as used by the CSV and XML writers
pub(crate) fn cell_text(cell: &Option<Value>) -> String {
    match cell {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
