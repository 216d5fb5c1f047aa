//! Atomic prompt log writer
//!
//! The log is written to `<path>.<uuid>.tmp` and renamed over `<path>` once
//! the temp file is flushed and closed, so readers never see a partial log.
//! Every write gets its own temp file, so concurrent writers to the same path
//! race only at the rename and the last one wins.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::LlmError;

/// Suffix shared by every in-flight temp file
pub const TEMP_SUFFIX: &str = ".tmp";

/// A fresh temp file path next to `path`, unique to one write
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(format!(".{}{TEMP_SUFFIX}", Uuid::new_v4().simple()));
    PathBuf::from(name)
}

/// Write `contents` to `path`, creating the parent directory if needed
pub async fn write_prompt_log(path: &Path, contents: &str) -> Result<(), LlmError> {
    let result = write_atomically(path, contents).await;
    if let Err(ref source) = result {
        tracing::error!(path = %path.display(), error = %source, "Failed to write prompt log");
    }
    result.map_err(|source| LlmError::LogWriteFailed {
        path: path.to_path_buf(),
        source,
    })
}

async fn write_atomically(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = temp_path(path);
    {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp)
            .await?;
        if let Err(e) = write_and_sync(&mut file, contents).await {
            drop(file);
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }
    }

    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }
    Ok(())
}

async fn write_and_sync(file: &mut tokio::fs::File, contents: &str) -> std::io::Result<()> {
    file.write_all(contents.as_bytes()).await?;
    file.flush().await?;
    file.sync_all().await
}
