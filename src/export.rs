//! JSON export of a trail collection.
//!
//! Output shape:
//! ```json
//! {
//!   "eco_trails": [ ... ],
//!   "export_info": { "timestamp": "...", "total_count": 3, "exported_by": "..." }
//! }
//! ```
//! Pretty-printed with two-space indentation; non-ASCII text is written as-is.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::{Result, TrailError};
use crate::Trail;

/// Metadata block written alongside exported trails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportInfo {
    pub timestamp: DateTime<Local>,
    pub total_count: usize,
    pub exported_by: String,
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    eco_trails: &'a [Trail],
    export_info: &'a ExportInfo,
}

/// Write `trails` to `path`, replacing any existing file.
pub fn write_export(path: &Path, trails: &[Trail], exported_by: &str) -> Result<ExportInfo> {
    let info = ExportInfo {
        timestamp: Local::now(),
        total_count: trails.len(),
        exported_by: exported_by.to_string(),
    };

    let file = File::create(path).map_err(|e| TrailError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(
        &mut writer,
        &ExportDocument {
            eco_trails: trails,
            export_info: &info,
        },
    )?;
    writer.flush().map_err(|e| TrailError::io(path, e))?;

    Ok(info)
}
