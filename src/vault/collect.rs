use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::engine::NodeRecord;

use super::media::detect_media;
use super::metadata::read_metadata;

const REPOSITORY_MARKER: &str = ".git";

#[derive(Clone, Debug)]
pub struct VaultSnapshot {
    pub root: PathBuf,
    /// Sorted by id.
    pub nodes: Vec<NodeRecord>,
}

/// Lists every repository directly under `root` with its metadata and media
/// flags.
///
/// Only an unreadable root fails the scan; problems with a single node are
/// logged and that node falls back to defaults.
pub fn scan_vault(root: &Path) -> Result<VaultSnapshot> {
    let entries =
        fs::read_dir(root).with_context(|| format!("failed to read vault {}", root.display()))?;

    let mut ids = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read vault {}", root.display()))?;
        let path = entry.path();
        if !path.is_dir() || !path.join(REPOSITORY_MARKER).exists() {
            continue;
        }

        let Some(id) = entry.file_name().to_str().map(str::to_owned) else {
            log::warn!("skipping non UTF-8 directory {}", path.display());
            continue;
        };
        if id.starts_with('.') {
            continue;
        }
        ids.push(id);
    }
    ids.sort();
    ids.dedup();

    let nodes = ids
        .into_iter()
        .map(|id| {
            let node_dir = root.join(&id);
            let metadata = read_metadata(&node_dir, &id);
            let media = detect_media(&node_dir).unwrap_or_else(|err| {
                log::warn!("media check failed for {id}: {err:#}");
                Default::default()
            });
            NodeRecord {
                id,
                metadata,
                media,
            }
        })
        .collect::<Vec<_>>();

    log::info!("scanned {} nodes in {}", nodes.len(), root.display());

    Ok(VaultSnapshot {
        root: root.to_path_buf(),
        nodes,
    })
}
