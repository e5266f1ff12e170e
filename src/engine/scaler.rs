use glam::Vec3;

use crate::config::EngineConfig;

use super::layout::ScaleIntent;
use super::registry::NodeRegistry;

/// Gaussian falloff width; `exp(-(d / R)^2 / FALLOFF_WIDTH)`.
const FALLOFF_WIDTH: f32 = 0.1;

/// Maps node-to-camera distance onto a bounded render scale.
#[derive(Clone, Copy, Debug)]
pub struct CameraDistanceScaler {
    min_scale: f32,
    max_scale: f32,
    falloff_radius: f32,
    epsilon: f32,
}

impl CameraDistanceScaler {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            falloff_radius: config.scale_falloff_radius,
            epsilon: config.scale_epsilon,
        }
    }

    pub fn scale_for_distance(&self, distance: f32) -> f32 {
        let normalized = distance / self.falloff_radius;
        let scale = self.max_scale * (-(normalized * normalized) / FALLOFF_WIDTH).exp();
        if scale.is_nan() {
            return self.min_scale;
        }
        scale.clamp(self.min_scale, self.max_scale)
    }

    pub fn scale_at(&self, position: Vec3, camera_position: Vec3) -> f32 {
        self.scale_for_distance(position.distance(camera_position))
    }

    /// Writes distance-driven scales into live transforms and returns how
    /// many nodes changed.
    ///
    /// Nodes with a pinned scale or an in-flight scale tween are skipped, so
    /// an explicit scale animation always wins over the scaler.
    pub fn apply(&self, registry: &mut NodeRegistry, camera_position: Vec3) -> usize {
        let mut committed = 0usize;

        for node in registry.iter_mut() {
            if matches!(node.scale_intent, ScaleIntent::Fixed(_)) || node.anim.scale.is_some() {
                continue;
            }
            let Some(live) = node.live.as_mut() else {
                continue;
            };

            let scale = self.scale_at(live.position, camera_position);
            if (scale - live.scale).abs() > self.epsilon {
                live.scale = scale;
                committed += 1;
            }
        }

        committed
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::CameraDistanceScaler;
    use crate::config::EngineConfig;
    use crate::engine::layout::ScaleIntent;
    use crate::engine::registry::{NodeRecord, NodeRegistry, Transform};
    use crate::engine::tween::Tween;

    fn scaler() -> (CameraDistanceScaler, EngineConfig) {
        let config = EngineConfig::default();
        (CameraDistanceScaler::new(&config), config)
    }

    fn registry_with(position: Vec3, scale: f32) -> NodeRegistry {
        let mut registry = NodeRegistry::new();
        registry.insert(NodeRecord::bare("node"));
        registry.get_mut("node").unwrap().live = Some(Transform {
            position,
            yaw: 0.0,
            scale,
        });
        registry
    }

    #[test]
    fn zero_distance_is_max_scale() {
        let (scaler, config) = scaler();
        assert_eq!(scaler.scale_for_distance(0.0), config.max_scale);
    }

    #[test]
    fn large_distance_clamps_to_min_scale() {
        let (scaler, config) = scaler();
        assert_eq!(scaler.scale_for_distance(1.0e6), config.min_scale);
        assert_eq!(scaler.scale_for_distance(f32::MAX), config.min_scale);
        assert_eq!(scaler.scale_for_distance(f32::INFINITY), config.min_scale);
    }

    #[test]
    fn scale_shrinks_with_distance() {
        let (scaler, _) = scaler();
        let near = scaler.scale_for_distance(500.0);
        let far = scaler.scale_for_distance(1500.0);
        assert!(near > far);
    }

    #[test]
    fn tiny_changes_are_not_committed() {
        let (scaler, _) = scaler();
        let camera = Vec3::new(0.0, 0.0, 2000.0);
        let position = Vec3::new(0.0, 0.0, 1000.0);
        let exact = scaler.scale_at(position, camera);
        let mut registry = registry_with(position, exact + 0.005);

        assert_eq!(scaler.apply(&mut registry, camera), 0);
        assert_eq!(registry.get("node").unwrap().live.unwrap().scale, exact + 0.005);
    }

    #[test]
    fn scaler_commits_distance_scale() {
        let (scaler, _) = scaler();
        let camera = Vec3::new(0.0, 0.0, 2000.0);
        let mut registry = registry_with(Vec3::ZERO, 1.0);

        assert_eq!(scaler.apply(&mut registry, camera), 1);
        let live = registry.get("node").unwrap().live.unwrap();
        assert_eq!(live.scale, scaler.scale_at(Vec3::ZERO, camera));
    }

    #[test]
    fn explicit_scale_wins_over_scaler() {
        let (scaler, _) = scaler();
        let camera = Vec3::new(0.0, 0.0, 2000.0);

        let mut pinned = registry_with(Vec3::ZERO, 5.0);
        pinned.get_mut("node").unwrap().scale_intent = ScaleIntent::Fixed(5.0);
        assert_eq!(scaler.apply(&mut pinned, camera), 0);
        assert_eq!(pinned.get("node").unwrap().live.unwrap().scale, 5.0);

        let mut tweening = registry_with(Vec3::ZERO, 2.0);
        tweening.get_mut("node").unwrap().anim.scale = Some(Tween::new(2.0, 3.0, 0.0, 0.5));
        assert_eq!(scaler.apply(&mut tweening, camera), 0);
        assert_eq!(tweening.get("node").unwrap().live.unwrap().scale, 2.0);
    }
}
