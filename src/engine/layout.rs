use std::f64::consts::TAU;

use glam::Vec3;

use crate::config::EngineConfig;

use super::registry::NodeMetadata;

const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Who decides a node's scale once the layout has been applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScaleIntent {
    /// The camera-distance scaler owns the scale.
    Auto,
    /// The layout pins the scale; the distance scaler leaves the node alone.
    Fixed(f32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutTarget {
    pub position: Vec3,
    pub scale: ScaleIntent,
}

impl LayoutTarget {
    fn auto(position: Vec3) -> Self {
        Self {
            position,
            scale: ScaleIntent::Auto,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LayoutInput<'a> {
    pub id: &'a str,
    pub metadata: &'a NodeMetadata,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutMode {
    Grid,
    Sphere,
    RadialCluster { focus: String },
}

impl LayoutMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Sphere => "sphere",
            Self::RadialCluster { .. } => "radial cluster",
        }
    }

    pub fn focus(&self) -> Option<&str> {
        match self {
            Self::RadialCluster { focus } => Some(focus),
            Self::Grid | Self::Sphere => None,
        }
    }
}

pub fn compute(mode: &LayoutMode, nodes: &[LayoutInput<'_>], config: &EngineConfig) -> Vec<LayoutTarget> {
    match mode {
        LayoutMode::Grid => grid(nodes, config.grid_spacing),
        LayoutMode::Sphere => sphere(nodes, config.sphere_radius),
        LayoutMode::RadialCluster { focus } => radial_cluster(nodes, focus, config),
    }
}

/// Row-major square-ish grid centered on the origin in the `z = 0` plane.
pub fn grid(nodes: &[LayoutInput<'_>], spacing: f32) -> Vec<LayoutTarget> {
    let n = nodes.len();
    if n == 0 {
        return Vec::new();
    }

    let cols = (n as f64).sqrt().ceil() as usize;
    let rows = n.div_ceil(cols);
    let half_cols = cols as f32 / 2.0;
    let half_rows = rows as f32 / 2.0;

    (0..n)
        .map(|index| {
            let row = index / cols;
            let col = index % cols;
            LayoutTarget::auto(Vec3::new(
                (col as f32 - half_cols) * spacing,
                (half_rows - row as f32) * spacing,
                0.0,
            ))
        })
        .collect()
}

/// Golden-angle (Fibonacci) distribution over a sphere of `radius`.
pub fn sphere(nodes: &[LayoutInput<'_>], radius: f32) -> Vec<LayoutTarget> {
    let n = nodes.len();
    let radius = f64::from(radius);

    (1..=n)
        .map(|i| {
            let i = i as f64;
            let phi = (1.0 - 2.0 * i / (n as f64 + 1.0)).acos();
            let theta = TAU * i / GOLDEN_RATIO;
            let position = Vec3::new(
                (radius * phi.sin() * theta.cos()) as f32,
                (radius * phi.sin() * theta.sin()) as f32,
                (radius * phi.cos()) as f32,
            );
            LayoutTarget::auto(position)
        })
        .collect()
}

/// Focus at the origin, related nodes on an inner ring, the rest on an
/// outer ring outside the default view.
///
/// A node is related when the focus declares it in its relation set and the
/// two categories differ. An unknown focus falls back to [`sphere`].
pub fn radial_cluster(
    nodes: &[LayoutInput<'_>],
    focus_id: &str,
    config: &EngineConfig,
) -> Vec<LayoutTarget> {
    let Some(focus) = nodes.iter().find(|node| node.id == focus_id) else {
        log::warn!("focus {focus_id} is not in the node set; using the sphere layout");
        return sphere(nodes, config.sphere_radius);
    };

    let is_related = |node: &LayoutInput<'_>| {
        focus.metadata.relations.contains(node.id)
            && focus.metadata.category != node.metadata.category
    };

    let related_count = nodes
        .iter()
        .filter(|node| node.id != focus_id && is_related(node))
        .count();
    let unrelated_count = nodes.len() - 1 - related_count;

    let mut related_index = 0usize;
    let mut unrelated_index = 0usize;
    nodes
        .iter()
        .map(|node| {
            if node.id == focus_id {
                return LayoutTarget {
                    position: Vec3::ZERO,
                    scale: ScaleIntent::Fixed(config.focus_scale),
                };
            }

            let (index, group_size, radius) = if is_related(node) {
                related_index += 1;
                (related_index - 1, related_count, config.related_ring_radius)
            } else {
                unrelated_index += 1;
                (unrelated_index - 1, unrelated_count, config.unrelated_ring_radius)
            };

            LayoutTarget::auto(ring_position(index, group_size, radius))
        })
        .collect()
}

fn ring_position(index: usize, group_size: usize, radius: f32) -> Vec3 {
    // A member implies a non-empty group; the guard keeps the division safe.
    if group_size == 0 {
        return Vec3::ZERO;
    }

    let angle = (index as f64 / group_size as f64) * TAU;
    Vec3::new(
        (f64::from(radius) * angle.cos()) as f32,
        (f64::from(radius) * angle.sin()) as f32,
        0.0,
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use glam::Vec3;

    use super::{LayoutInput, LayoutMode, ScaleIntent, compute, grid, radial_cluster, sphere};
    use crate::config::EngineConfig;
    use crate::engine::registry::{Category, NodeMetadata};

    fn metadata(category: Category, relations: &[&str]) -> NodeMetadata {
        NodeMetadata {
            category,
            relations: relations.iter().map(|id| (*id).to_owned()).collect::<BTreeSet<_>>(),
        }
    }

    fn inputs<'a>(ids: &'a [String], metadata: &'a NodeMetadata) -> Vec<LayoutInput<'a>> {
        ids.iter()
            .map(|id| LayoutInput { id, metadata })
            .collect()
    }

    fn ids(count: usize) -> Vec<String> {
        (0..count).map(|index| format!("node-{index}")).collect()
    }

    #[test]
    fn grid_matches_formula_for_nine_nodes() {
        let ids = ids(9);
        let meta = NodeMetadata::default();
        let targets = grid(&inputs(&ids, &meta), 200.0);

        assert_eq!(targets.len(), 9);
        assert_eq!(targets[0].position, Vec3::new(-300.0, 300.0, 0.0));
        assert_eq!(targets[4].position, Vec3::new(-100.0, 100.0, 0.0));
        assert_eq!(targets[8].position, Vec3::new(100.0, -100.0, 0.0));
    }

    #[test]
    fn grid_uses_ceil_rows_for_partial_last_row() {
        let ids = ids(5);
        let meta = NodeMetadata::default();
        let targets = grid(&inputs(&ids, &meta), 10.0);

        // 3 columns, 2 rows.
        assert_eq!(targets[0].position, Vec3::new(-15.0, 10.0, 0.0));
        assert_eq!(targets[4].position, Vec3::new(-5.0, 0.0, 0.0));
    }

    #[test]
    fn grid_is_deterministic() {
        let ids = ids(17);
        let meta = NodeMetadata::default();
        let nodes = inputs(&ids, &meta);
        assert_eq!(grid(&nodes, 200.0), grid(&nodes, 200.0));
    }

    #[test]
    fn empty_node_set_produces_no_targets() {
        let config = EngineConfig::default();
        assert!(grid(&[], 200.0).is_empty());
        assert!(sphere(&[], 1000.0).is_empty());
        assert!(radial_cluster(&[], "missing", &config).is_empty());
    }

    #[test]
    fn sphere_positions_lie_on_the_radius() {
        let meta = NodeMetadata::default();
        for count in [1usize, 2, 3, 10, 97, 500] {
            let ids = ids(count);
            let targets = sphere(&inputs(&ids, &meta), 1000.0);
            assert_eq!(targets.len(), count);
            for target in targets {
                let distance = target.position.length();
                assert!((distance - 1000.0).abs() < 0.01, "n={count}: {distance}");
                assert_eq!(target.scale, ScaleIntent::Auto);
            }
        }
    }

    #[test]
    fn sphere_positions_are_distinct_for_ten_thousand_nodes() {
        let ids = ids(10_000);
        let meta = NodeMetadata::default();
        let mut positions = sphere(&inputs(&ids, &meta), 1000.0)
            .into_iter()
            .map(|target| target.position)
            .collect::<Vec<_>>();

        // z strictly decreases with the index; adjacent z values after
        // sorting must still be apart.
        positions.sort_by(|a, b| a.z.total_cmp(&b.z));
        for pair in positions.windows(2) {
            assert!(pair[0].distance(pair[1]) > 1e-3, "{:?} ~ {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn radial_cluster_pins_focus_and_partitions_rings() {
        let config = EngineConfig::default();
        let focus_meta = metadata(Category::Idea, &["friend", "sibling", "ghost"]);
        let person = metadata(Category::Person, &[]);
        let idea = metadata(Category::Idea, &[]);
        let nodes = vec![
            LayoutInput { id: "stranger", metadata: &person },
            LayoutInput { id: "focus", metadata: &focus_meta },
            LayoutInput { id: "friend", metadata: &person },
            LayoutInput { id: "sibling", metadata: &idea },
        ];

        let targets = radial_cluster(&nodes, "focus", &config);

        assert_eq!(targets[1].position, Vec3::ZERO);
        assert_eq!(targets[1].scale, ScaleIntent::Fixed(config.focus_scale));

        // Only `friend` is declared and of a different category.
        let friend = targets[2].position;
        assert!((friend.length() - config.related_ring_radius).abs() < 0.01);
        assert!((friend - Vec3::new(config.related_ring_radius, 0.0, 0.0)).length() < 0.01);

        // Same-category `sibling` goes to the outer ring with `stranger`.
        for index in [0, 3] {
            let distance = targets[index].position.length();
            assert!((distance - config.unrelated_ring_radius).abs() < 0.05);
            assert_eq!(targets[index].position.z, 0.0);
        }
        assert!(targets[0].position.distance(targets[3].position) > 1.0);
    }

    #[test]
    fn radial_cluster_without_related_nodes_skips_inner_ring() {
        let config = EngineConfig::default();
        let meta = NodeMetadata::default();
        let ids = ids(4);
        let targets = radial_cluster(&inputs(&ids, &meta), "node-2", &config);

        for (index, target) in targets.iter().enumerate() {
            assert!(target.position.is_finite());
            if index != 2 {
                assert!((target.position.length() - config.unrelated_ring_radius).abs() < 0.05);
            }
        }
    }

    #[test]
    fn radial_cluster_with_only_the_focus_is_finite() {
        let config = EngineConfig::default();
        let meta = NodeMetadata::default();
        let ids = ids(1);
        let targets = radial_cluster(&inputs(&ids, &meta), "node-0", &config);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].position, Vec3::ZERO);
    }

    #[test]
    fn unknown_focus_falls_back_to_sphere() {
        let config = EngineConfig::default();
        let meta = NodeMetadata::default();
        let ids = ids(6);
        let nodes = inputs(&ids, &meta);

        let cluster = compute(
            &LayoutMode::RadialCluster {
                focus: "missing".to_owned(),
            },
            &nodes,
            &config,
        );

        assert_eq!(cluster, sphere(&nodes, config.sphere_radius));
    }
}
