//! Column-oriented feature table for one prediction request.

use serde_json::{Map, Value};

use super::error::InferenceError;

/// A single named feature column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// Row-aligned table of named numeric columns.
///
/// Column order is the order the columns were supplied in. All columns
/// hold the same number of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    columns: Vec<Column>,
    n_rows: usize,
}

impl FeatureTable {
    /// Build a table from `(name, values)` pairs.
    pub fn new<I, S>(columns: I) -> Result<Self, InferenceError>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let columns: Vec<Column> = columns
            .into_iter()
            .map(|(name, values)| Column { name: name.into(), values })
            .collect();

        if columns.is_empty() {
            return Err(InferenceError::MalformedInput(
                "input must contain at least one feature column".into(),
            ));
        }

        let n_rows = columns[0].values.len();
        for (i, column) in columns.iter().enumerate() {
            if column.name.is_empty() {
                return Err(InferenceError::MalformedInput("column names cannot be empty".into()));
            }
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(InferenceError::MalformedInput(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
            if column.values.len() != n_rows {
                return Err(InferenceError::MalformedInput(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name,
                    column.values.len(),
                    n_rows
                )));
            }
        }

        Ok(Self { columns, n_rows })
    }

    /// Parse a JSON object of `feature name -> array of numbers`.
    pub fn from_json(value: &Value) -> Result<Self, InferenceError> {
        let object = value.as_object().ok_or_else(|| {
            InferenceError::MalformedInput(
                "request body must be a JSON object of feature columns".into(),
            )
        })?;

        let mut columns = Vec::with_capacity(object.len());
        for (name, raw) in object {
            let cells = raw.as_array().ok_or_else(|| {
                InferenceError::MalformedInput(format!("column '{}' must be an array", name))
            })?;
            let values = cells
                .iter()
                .map(|cell| {
                    cell.as_f64().ok_or_else(|| {
                        InferenceError::MalformedInput(format!(
                            "column '{}' contains a non-numeric value: {}",
                            name, cell
                        ))
                    })
                })
                .collect::<Result<Vec<f64>, _>>()?;
            columns.push((name.clone(), values));
        }

        Self::new(columns)
    }

    /// Serialize back to the `feature name -> array` JSON shape.
    pub fn to_json(&self) -> Value {
        let mut object = Map::with_capacity(self.columns.len());
        for column in &self.columns {
            object.insert(column.name.clone(), Value::from(column.values.clone()));
        }
        Value::Object(object)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Values of one row, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.n_rows {
            return None;
        }
        Some(self.columns.iter().map(|c| c.values[index]).collect())
    }

    /// Iterate over rows in input order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<f64>> + '_ {
        (0..self.n_rows).map(move |i| self.columns.iter().map(|c| c.values[i]).collect())
    }

    /// Project onto `names`, in that order. Columns not listed are dropped.
    pub fn select(&self, names: &[String]) -> Result<Self, InferenceError> {
        let missing: Vec<String> = names
            .iter()
            .filter(|name| !self.has_column(name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(InferenceError::MissingFeatures {
                missing,
                received: self.column_names(),
            });
        }

        let columns = names
            .iter()
            .filter_map(|name| self.columns.iter().find(|c| &c.name == name))
            .cloned()
            .collect();
        Ok(Self { columns, n_rows: self.n_rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_column_order() {
        let table = FeatureTable::from_json(&json!({
            "angle_from_net": [10.0, 22.0],
            "distance_from_net": [20, 45],
        }))
        .unwrap();
        assert_eq!(table.column_names(), vec!["angle_from_net", "distance_from_net"]);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.row(1), Some(vec![22.0, 45.0]));
        assert_eq!(table.column("distance_from_net"), Some(&[20.0, 45.0][..]));
        assert_eq!(table.column("period"), None);
    }

    #[test]
    fn test_from_json_rejects_ragged_columns() {
        let err = FeatureTable::from_json(&json!({"a": [1, 2], "b": [1]})).unwrap_err();
        assert!(matches!(err, InferenceError::MalformedInput(_)));
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = FeatureTable::from_json(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, InferenceError::MalformedInput(_)));
    }

    #[test]
    fn test_from_json_rejects_strings() {
        let err = FeatureTable::from_json(&json!({"a": ["far"]})).unwrap_err();
        assert!(err.to_string().contains("non-numeric"));
    }

    #[test]
    fn test_empty_object_is_malformed() {
        assert!(FeatureTable::from_json(&json!({})).is_err());
    }

    #[test]
    fn test_zero_rows_allowed() {
        let table = FeatureTable::from_json(&json!({"a": []})).unwrap();
        assert_eq!(table.n_rows(), 0);
        assert_eq!(table.rows().count(), 0);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = FeatureTable::new(vec![("a", vec![1.0]), ("a", vec![2.0])]).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_select_reports_missing() {
        let table = FeatureTable::new(vec![("angle_from_net", vec![1.0])]).unwrap();
        let err = table.select(&["distance_from_net".to_string()]).unwrap_err();
        match err {
            InferenceError::MissingFeatures { missing, received } => {
                assert_eq!(missing, vec!["distance_from_net"]);
                assert_eq!(received, vec!["angle_from_net"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
