//! Feature alignment: select, validate, and reorder request columns so they
//! match what the active classifier was trained on.

use tracing::debug;

use super::{FeatureTable, InferenceError};

/// Align `table` to the classifier's expected input.
///
/// With a known `schema` every listed column must be present; the output
/// holds exactly those columns in schema order and anything else is
/// dropped. Without a schema the column count must equal
/// `feature_count_hint`, and columns are ordered alphabetically by name.
/// Row order is preserved in both cases.
pub fn align(
    table: &FeatureTable,
    schema: Option<&[String]>,
    feature_count_hint: usize,
) -> Result<FeatureTable, InferenceError> {
    match schema {
        Some(expected) => {
            debug!(expected = ?expected, received = ?table.column_names(), "aligning to declared schema");
            table.select(expected)
        }
        None => {
            let mut columns = table.column_names();
            if columns.len() != feature_count_hint {
                return Err(InferenceError::FeatureCountMismatch {
                    expected: feature_count_hint,
                    received: columns.len(),
                    columns,
                });
            }
            columns.sort();
            debug!(order = ?columns, "no declared schema, using alphabetical column order");
            table.select(&columns)
        }
    }
}
