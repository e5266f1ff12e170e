use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

use crate::engine::{Category, NodeMetadata};

pub(super) const METADATA_FILE: &str = ".pl";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetadata {
    #[serde(default, rename = "type")]
    kind: Option<Value>,
    #[serde(default, alias = "liminalWebRelationships")]
    related_nodes: Option<Value>,
}

/// Reads `<node>/.pl`. A missing or broken file yields the default metadata.
pub(super) fn read_metadata(node_dir: &Path, id: &str) -> NodeMetadata {
    let path = node_dir.join(METADATA_FILE);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            log::debug!("{id} has no metadata file");
            return NodeMetadata::default();
        }
        Err(err) => {
            log::warn!("failed to read {}: {err}", path.display());
            return NodeMetadata::default();
        }
    };

    parse_metadata(&raw, id).unwrap_or_else(|err| {
        log::warn!("ignoring metadata of {id}: {err:#}");
        NodeMetadata::default()
    })
}

pub(super) fn parse_metadata(raw: &str, id: &str) -> Result<NodeMetadata> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in metadata")?;
    if !parsed.is_object() {
        return Err(anyhow!("metadata must be a JSON object"));
    }
    let raw = RawMetadata::deserialize(parsed).context("unexpected metadata layout")?;

    let category = raw
        .kind
        .as_ref()
        .and_then(Value::as_str)
        .map(Category::parse)
        .unwrap_or_default();

    // Entries that are not strings are skipped rather than failing the node.
    let relations = match raw.related_nodes {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|relation| !relation.is_empty() && *relation != id)
            .map(str::to_owned)
            .collect::<BTreeSet<_>>(),
        Some(Value::Null) | None => BTreeSet::new(),
        Some(other) => {
            log::warn!("{id}: relations should be a list, found {other}");
            BTreeSet::new()
        }
    };

    Ok(NodeMetadata {
        category,
        relations,
    })
}
