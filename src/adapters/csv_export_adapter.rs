//! CSV index-history export adapter.

use crate::domain::calendar::format_date;
use crate::domain::error::EqindexError;
use crate::domain::observation::IndexPoint;
use crate::ports::export_port::ExportPort;
use std::path::Path;

pub struct CsvExportAdapter;

impl CsvExportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvExportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportPort for CsvExportAdapter {
    fn write(&self, points: &[IndexPoint], output_path: &Path) -> Result<(), EqindexError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| EqindexError::Export {
            reason: format!("failed to open {}: {}", output_path.display(), e),
        })?;

        wtr.write_record(["date", "index_value"])
            .map_err(|e| EqindexError::Export {
                reason: e.to_string(),
            })?;

        for point in points {
            let value = point
                .index_value
                .map(|v| format!("{v:.4}"))
                .unwrap_or_default();
            wtr.write_record([format_date(point.date), value])
                .map_err(|e| EqindexError::Export {
                    reason: e.to_string(),
                })?;
        }

        wtr.flush().map_err(|e| EqindexError::Export {
            reason: e.to_string(),
        })?;

        Ok(())
    }
}
