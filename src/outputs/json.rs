//! JSON output of processed results.
//!
//! Results are written as one pretty-printed JSON array, either summary
//! records mixed with failure stand-ins or, in extract-only runs, the raw
//! extracted articles. Non-ASCII text is kept as-is.
//!
//! The file is first written to `<name>.tmp` beside the target and then
//! renamed over it, so a crash never leaves a half-written result file.

use crate::utils::{default_output_filename, ensure_writable_dir};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `results` to `path`, or to `news_summaries_<timestamp>.json` in the
/// working directory when `path` is `None`. Returns the path written.
#[instrument(level = "info", skip_all, fields(count = results.len()))]
pub async fn save_results<T: Serialize>(
    results: &[T],
    path: Option<&Path>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let target = match path {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(default_output_filename()),
    };
    let json = serde_json::to_string_pretty(results)?;

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = ensure_writable_dir(parent).await {
            error!(dir = %parent.display(), error = %e, "Output directory is not writable");
            return Err(e.into());
        }
    }

    let mut tmp = target.clone().into_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    info!(path = %target.display(), "Writing JSON");
    fs::write(&tmp, json).await?;
    if let Err(e) = fs::rename(&tmp, &target).await {
        error!(path = %target.display(), error = %e, "Failed to move results into place");
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    info!(path = %target.display(), "Results saved");
    Ok(target)
}
