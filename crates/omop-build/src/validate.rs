use omop_model::TableRow;

use crate::error::{BuildError, Result};

/// Fails on the first required column that is null or missing from the row's cells.
pub fn validate_required_fields(row: &impl TableRow) -> Result<()> {
    let schema = row.schema();
    let cells = row.cells();
    for column in schema.required_columns() {
        let present = cells
            .iter()
            .any(|(name, value)| *name == column && !value.is_null());
        if !present {
            return Err(BuildError::RequiredFieldViolation {
                table: schema.table_name,
                column,
                row_id: row.row_id(),
            });
        }
    }
    Ok(())
}
