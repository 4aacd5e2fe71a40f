//! Writing session history to disk.

use crate::error::Result;
use crate::record::TurnRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Whole history as one pretty-printed JSON array.
pub fn write_json(path: &Path, history: &[TurnRecord]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, history)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    tracing::info!("Exported {} turns to {}", history.len(), path.display());
    Ok(())
}

/// One compact JSON record per line.
pub fn write_jsonl(path: &Path, history: &[TurnRecord]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for record in history {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    tracing::info!("Exported {} turns to {}", history.len(), path.display());
    Ok(())
}
