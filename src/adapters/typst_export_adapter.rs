//! Typst document export adapter.
//!
//! Renders the index history as Typst markup ready for `typst compile` into
//! a PDF. Pure text generation, no external tooling required at write time.

use crate::domain::calendar::format_date;
use crate::domain::error::EqindexError;
use crate::domain::observation::IndexPoint;
use crate::ports::export_port::ExportPort;
use std::fs;
use std::path::Path;

pub struct TypstExportAdapter;

impl TypstExportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TypstExportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn render(points: &[IndexPoint]) -> String {
    let mut output = String::from("= Equal-Weighted Index History\n\n");

    if points.is_empty() {
        output.push_str("_No index data available._\n");
        return output;
    }

    let first = points.first().map(|p| format_date(p.date)).unwrap_or_default();
    let last = points.last().map(|p| format_date(p.date)).unwrap_or_default();
    output.push_str(&format!("Period: {} to {}\n\n", first, last));

    output.push_str("#table(\n  columns: (auto, auto),\n");
    output.push_str("  [*Date*], [*Index Value*],\n");
    for point in points {
        let value = match point.index_value {
            Some(v) => format!("{v:.2}"),
            None => "—".to_string(),
        };
        output.push_str(&format!("  [{}], [{}],\n", format_date(point.date), value));
    }
    output.push_str(")\n");

    output
}

impl ExportPort for TypstExportAdapter {
    fn write(&self, points: &[IndexPoint], output_path: &Path) -> Result<(), EqindexError> {
        fs::write(output_path, render(points)).map_err(|e| EqindexError::Export {
            reason: format!("failed to write {}: {}", output_path.display(), e),
        })
    }
}
