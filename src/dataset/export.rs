use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::Serialize;
use std::path::Path;

/// Write serializable rows as a CSV artifact.
///
/// Uses atomic-write-file so a failed export never leaves a half-written
/// file behind. Write errors are reported to the caller, not retried.
pub fn export_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open export file at {}", path.display()))?;

    {
        let mut writer = csv::Writer::from_writer(&mut file);
        for row in rows {
            writer
                .serialize(row)
                .with_context(|| format!("Failed to serialize row for {}", path.display()))?;
        }
        writer.flush().context("Failed to flush CSV export")?;
    }

    file.commit()
        .with_context(|| format!("Failed to commit export at {}", path.display()))?;
    Ok(())
}

/// Write any serializable report as pretty-printed JSON, atomically.
pub fn export_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open export file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, value).context("Failed to serialize JSON export")?;

    file.commit()
        .with_context(|| format!("Failed to commit export at {}", path.display()))?;
    Ok(())
}
