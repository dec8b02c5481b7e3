//! Index-history export port trait.

use crate::domain::error::EqindexError;
use crate::domain::observation::IndexPoint;
use std::path::Path;

/// Port for materializing an index time series as a file. Best-effort:
/// callers log failures and carry on.
pub trait ExportPort {
    fn write(&self, points: &[IndexPoint], output_path: &Path) -> Result<(), EqindexError>;
}
