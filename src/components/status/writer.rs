use super::StatusRecord;
use crate::error::BotResult;
use std::path::Path;
use tracing::info;

/// Serialize the record as two-space indented JSON, replacing the file.
///
/// The write is not atomic: a crash mid-write can leave a truncated file.
pub async fn write_status(record: &StatusRecord, path: &Path) -> BotResult<()> {
    let json = serde_json::to_string_pretty(record)?;
    tokio::fs::write(path, json).await?;

    info!("Wrote {} status to {}", record.mode(), path.display());

    Ok(())
}

/// Read a previously written record back
pub async fn read_status(path: &Path) -> BotResult<StatusRecord> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}
