use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::engine::MediaFlags;

const DREAM_TALK_EXTENSIONS: [&str; 6] = ["gif", "mp4", "png", "jpg", "jpeg", "webp"];
const DREAM_SONG_FILE: &str = "DreamSong.canvas";

/// Existence checks only; media is never opened.
pub(super) fn detect_media(node_dir: &Path) -> Result<MediaFlags> {
    let entries = fs::read_dir(node_dir)
        .with_context(|| format!("failed to list {}", node_dir.display()))?;

    let mut dream_talk = false;
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to list {}", node_dir.display()))?;
        let is_file = entry.file_type().map(|kind| kind.is_file()).unwrap_or(false);
        if is_file && has_dream_talk_extension(&entry.path()) {
            dream_talk = true;
            break;
        }
    }

    let dream_song = fs::metadata(node_dir.join(DREAM_SONG_FILE))
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false);

    Ok(MediaFlags {
        dream_talk,
        dream_song,
    })
}

fn has_dream_talk_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            DREAM_TALK_EXTENSIONS
                .iter()
                .any(|known| extension.eq_ignore_ascii_case(known))
        })
}
