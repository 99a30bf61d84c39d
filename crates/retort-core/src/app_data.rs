//! Where Retort stores its own data (config, embeddings database).
//!
//! The Q&A corpus stays wherever the user keeps it. We only store app state here.

use std::path::PathBuf;

/// Returns the directory where Retort stores config and the embeddings database.
/// On macOS: `~/Library/Application Support/Retort/`.
/// Creates the directory if it doesn't exist; returns `None` if we can't determine the path.
pub fn app_data_dir() -> Option<PathBuf> {
    let dir = directories::ProjectDirs::from("app", "Retort", "Retort")?.data_local_dir().to_path_buf();
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}
