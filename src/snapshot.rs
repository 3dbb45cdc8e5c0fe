use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

const PLAYING_MARKER: &str = "# PLAYING";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSnapshot<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub current: Option<usize>,
}

impl<T> Default for ListSnapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current: None,
        }
    }
}

impl<T> ListSnapshot<T> {
    pub fn current_item(&self) -> Option<&T> {
        self.items.get(self.current?)
    }

    /// Drops the cursor so the saved list carries no playing entry.
    pub fn without_current(mut self) -> Self {
        self.current = None;
        self
    }
}

/// One entry per line, with a `# PLAYING` line ahead of the current entry.
///
/// Entries the parser would skip or split (empty, starting with `#`, or
/// spanning lines) are rejected.
pub fn to_playlist_text<T: Display>(snapshot: &ListSnapshot<T>) -> Result<String> {
    let mut out = String::new();
    for (index, item) in snapshot.items.iter().enumerate() {
        let line = item.to_string();
        if line.is_empty() {
            bail!("playlist entry {index} is empty");
        }
        if line.starts_with('#') {
            bail!("playlist entry {index} starts with '#': {line}");
        }
        if line.contains(['\n', '\r']) {
            bail!("playlist entry {index} spans lines");
        }
        if snapshot.current == Some(index) {
            out.push_str(PLAYING_MARKER);
            out.push('\n');
        }
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

pub fn parse_playlist_text<T>(raw: &str) -> Result<ListSnapshot<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let mut snapshot = ListSnapshot::default();
    let mut playing = false;

    for (line_number, line) in raw.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        if line.starts_with('#') {
            if line == PLAYING_MARKER {
                playing = true;
            }
            continue;
        }

        let normalized = line.replace('\\', "/");
        let item = normalized
            .parse::<T>()
            .map_err(|err| anyhow::anyhow!("{err}"))
            .with_context(|| format!("invalid playlist entry on line {}", line_number + 1))?;
        if playing {
            snapshot.current = Some(snapshot.items.len());
            playing = false;
        }
        snapshot.items.push(item);
    }

    Ok(snapshot)
}
