use std::collections::{BTreeSet, HashMap};

use glam::Vec3;

use super::interaction::FlipPhase;
use super::layout::{LayoutInput, ScaleIntent};
use super::tween::AnimState;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub yaw: f32,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            scale: 1.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Category {
    #[default]
    Unspecified,
    Idea,
    Person,
    Other(String),
}

impl Category {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" => Self::Unspecified,
            "idea" | "dream" => Self::Idea,
            "person" | "dreamer" => Self::Person,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Unspecified => "unspecified",
            Self::Idea => "idea",
            Self::Person => "person",
            Self::Other(label) => label,
        }
    }
}

/// Category and declared relations of a node, as read from the vault.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeMetadata {
    pub category: Category,
    pub relations: BTreeSet<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MediaFlags {
    pub dream_talk: bool,
    pub dream_song: bool,
}

/// One scanned vault entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeRecord {
    pub id: String,
    pub metadata: NodeMetadata,
    pub media: MediaFlags,
}

impl NodeRecord {
    #[cfg(test)]
    pub fn bare(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            metadata: NodeMetadata::default(),
            media: MediaFlags::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: String,
    pub metadata: NodeMetadata,
    pub media: MediaFlags,
    /// `None` until the first layout pass places the node.
    pub live: Option<Transform>,
    pub target: Transform,
    pub scale_intent: ScaleIntent,
    pub flip: FlipPhase,
    pub hovered: bool,
    pub selected: bool,
    pub anim: AnimState,
}

impl Node {
    pub fn new(record: NodeRecord) -> Self {
        Self {
            id: record.id,
            metadata: record.metadata,
            media: record.media,
            live: None,
            target: Transform::default(),
            scale_intent: ScaleIntent::Auto,
            flip: FlipPhase::Front,
            hovered: false,
            selected: false,
            anim: AnimState::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Surviving nodes whose category or relations differ from before.
    pub changed: Vec<String>,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Ordered node set with an id index.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
    index_by_id: HashMap<String, usize>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index_of(id).and_then(|index| self.nodes.get(index))
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        let index = self.index_of(id)?;
        self.nodes.get_mut(index)
    }

    pub fn node_at_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.nodes.get_mut(index)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    /// Appends a node; returns `false` and changes nothing when the id is taken.
    pub fn insert(&mut self, record: NodeRecord) -> bool {
        if self.index_by_id.contains_key(&record.id) {
            return false;
        }

        self.index_by_id.insert(record.id.clone(), self.nodes.len());
        self.nodes.push(Node::new(record));
        true
    }

    /// Reconciles the registry with a fresh scan.
    ///
    /// The scan order becomes the node order. Nodes that survive keep their
    /// transforms, flip and animation state; their metadata is refreshed.
    /// Nodes absent from the scan are dropped, even mid-animation. Duplicate
    /// ids in the scan keep their first occurrence.
    pub fn sync(&mut self, records: Vec<NodeRecord>) -> SyncReport {
        let mut previous = std::mem::take(&mut self.nodes)
            .into_iter()
            .map(Some)
            .collect::<Vec<_>>();
        let previous_index = std::mem::take(&mut self.index_by_id);
        let mut report = SyncReport::default();

        self.nodes.reserve(records.len());
        for record in records {
            if self.index_by_id.contains_key(&record.id) {
                continue;
            }

            let node = match previous_index
                .get(&record.id)
                .and_then(|&index| previous[index].take())
            {
                Some(mut existing) => {
                    if existing.metadata != record.metadata {
                        report.changed.push(record.id.clone());
                        existing.metadata = record.metadata;
                    }
                    existing.media = record.media;
                    existing
                }
                None => {
                    report.added.push(record.id.clone());
                    Node::new(record)
                }
            };

            self.index_by_id.insert(node.id.clone(), self.nodes.len());
            self.nodes.push(node);
        }

        report.removed = previous
            .into_iter()
            .flatten()
            .map(|node| node.id)
            .collect();
        report
    }

    pub fn layout_inputs(&self) -> Vec<LayoutInput<'_>> {
        self.nodes
            .iter()
            .map(|node| LayoutInput {
                id: &node.id,
                metadata: &node.metadata,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, NodeRecord, NodeRegistry, Transform};

    fn records(ids: &[&str]) -> Vec<NodeRecord> {
        ids.iter().map(|id| NodeRecord::bare(*id)).collect()
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let mut registry = NodeRegistry::new();
        assert!(registry.insert(NodeRecord::bare("alpha")));
        assert!(!registry.insert(NodeRecord::bare("alpha")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn sync_reports_changes_and_follows_scan_order() {
        let mut registry = NodeRegistry::new();
        registry.sync(records(&["a", "b", "c"]));

        let report = registry.sync(records(&["c", "d", "a"]));

        assert_eq!(report.added, vec!["d".to_owned()]);
        assert_eq!(report.removed, vec!["b".to_owned()]);
        let order = registry.iter().map(|node| node.id.as_str()).collect::<Vec<_>>();
        assert_eq!(order, vec!["c", "d", "a"]);
        assert_eq!(registry.index_of("a"), Some(2));
        assert!(!registry.contains("b"));
    }

    #[test]
    fn sync_keeps_live_state_of_surviving_nodes() {
        let mut registry = NodeRegistry::new();
        registry.sync(records(&["a", "b"]));
        let placed = Transform {
            scale: 2.0,
            ..Transform::default()
        };
        if let Some(node) = registry.get_mut("b") {
            node.live = Some(placed);
            node.selected = true;
        }

        let mut refreshed = records(&["b"]);
        refreshed[0].metadata.category = Category::Person;
        registry.sync(refreshed);

        let node = registry.get("b").unwrap();
        assert_eq!(node.live, Some(placed));
        assert!(node.selected);
        assert_eq!(node.metadata.category, Category::Person);
    }

    #[test]
    fn sync_reports_metadata_changes_of_surviving_nodes() {
        let mut registry = NodeRegistry::new();
        registry.sync(records(&["a", "b"]));

        let unchanged = registry.sync(records(&["a", "b"]));
        assert!(unchanged.is_empty());

        let mut refreshed = records(&["a", "b"]);
        refreshed[0].metadata.relations.insert("b".to_owned());
        let report = registry.sync(refreshed);

        assert!(report.added.is_empty());
        assert!(report.removed.is_empty());
        assert_eq!(report.changed, vec!["a".to_owned()]);
        assert!(!report.is_empty());
        assert!(registry.get("a").unwrap().metadata.relations.contains("b"));
    }

    #[test]
    fn sync_drops_duplicate_scan_entries() {
        let mut registry = NodeRegistry::new();
        registry.sync(records(&["a", "a", "b"]));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn category_parsing_is_lenient() {
        assert_eq!(Category::parse(" Person "), Category::Person);
        assert_eq!(Category::parse("idea"), Category::Idea);
        assert_eq!(Category::parse(""), Category::Unspecified);
        assert_eq!(Category::parse("Place"), Category::Other("place".to_owned()));
    }
}
