use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "pointer-list";
const SNAPSHOT_FILE: &str = "playlist.json";
const PLAYLIST_FILE: &str = "playlist.m3u";
pub const STATE_DIR_ENV: &str = "POINTER_LIST_STATE_DIR";

pub fn state_root() -> Result<PathBuf> {
    if let Ok(override_dir) = env::var(STATE_DIR_ENV) {
        return Ok(PathBuf::from(override_dir));
    }

    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("neither HOME nor USERPROFILE is set")?;
    Ok(PathBuf::from(home).join(".config").join(APP_DIR))
}

pub fn snapshot_path() -> Result<PathBuf> {
    Ok(state_root()?.join(SNAPSHOT_FILE))
}

pub fn playlist_path() -> Result<PathBuf> {
    Ok(state_root()?.join(PLAYLIST_FILE))
}

pub fn ensure_state_dir() -> Result<PathBuf> {
    let root = state_root()?;
    fs::create_dir_all(&root).with_context(|| format!("failed to create {}", root.display()))?;
    Ok(root)
}
