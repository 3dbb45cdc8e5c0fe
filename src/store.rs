use crate::config;
use crate::snapshot::{self, ListSnapshot};
use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

pub fn load_snapshot<T: DeserializeOwned>() -> Result<ListSnapshot<T>> {
    let path = config::snapshot_path()?;
    load_snapshot_from_path(&path)
}

pub fn save_snapshot<T: Serialize>(snapshot: &ListSnapshot<T>) -> Result<()> {
    config::ensure_state_dir()?;
    let path = config::snapshot_path()?;
    save_snapshot_to_path(&path, snapshot)
}

pub fn load_snapshot_from_path<T: DeserializeOwned>(path: &Path) -> Result<ListSnapshot<T>> {
    if !path.exists() {
        return Ok(ListSnapshot::default());
    }

    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let snapshot: ListSnapshot<T> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    debug!(path = %path.display(), items = snapshot.items.len(), "loaded snapshot");
    Ok(snapshot)
}

pub fn save_snapshot_to_path<T: Serialize>(path: &Path, snapshot: &ListSnapshot<T>) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), items = snapshot.items.len(), "saved snapshot");
    Ok(())
}

pub fn load_playlist_file<T>(path: &Path) -> Result<ListSnapshot<T>>
where
    T: FromStr,
    T::Err: Display,
{
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    snapshot::parse_playlist_text(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn save_playlist_file<T: Display>(path: &Path, snapshot: &ListSnapshot<T>) -> Result<()> {
    let text = snapshot::to_playlist_text(snapshot)
        .with_context(|| format!("cannot save {}", path.display()))?;
    ensure_parent(path)?;
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), items = snapshot.items.len(), "saved playlist");
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display())),
        _ => Ok(()),
    }
}
