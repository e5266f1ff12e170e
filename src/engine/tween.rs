use glam::Vec3;

use crate::config::EngineConfig;

use super::registry::{Node, NodeRegistry};

/// Absorbs float error when `now` lands exactly on `start_time + duration`.
const COMPLETION_EPSILON_SECS: f64 = 1e-9;

/// Cubic ease-in-out on `[0, 1]`.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

pub trait Lerp: Copy {
    fn lerp_to(self, target: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp_to(self, target: Self, t: f32) -> Self {
        self + (target - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp_to(self, target: Self, t: f32) -> Self {
        self.lerp(target, t)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TweenField {
    Position,
    Yaw,
    Scale,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween<T> {
    pub start: T,
    pub target: T,
    pub start_time: f64,
    pub duration: f64,
}

impl<T: Lerp> Tween<T> {
    pub fn new(start: T, target: T, start_time: f64, duration: f64) -> Self {
        Self {
            start,
            target,
            start_time,
            duration,
        }
    }

    pub fn progress(&self, now: f64) -> f32 {
        let elapsed = now - self.start_time;
        if self.duration <= 0.0 || elapsed + COMPLETION_EPSILON_SECS >= self.duration {
            return 1.0;
        }
        (elapsed / self.duration).clamp(0.0, 1.0) as f32
    }

    /// Value at `now`, plus whether the tween has finished.
    ///
    /// A finished tween yields exactly `target`.
    pub fn sample(&self, now: f64) -> (T, bool) {
        let t = self.progress(now);
        if t >= 1.0 {
            (self.target, true)
        } else {
            (self.start.lerp_to(self.target, ease_in_out_cubic(t)), false)
        }
    }
}

/// In-flight tweens of one node, one slot per animatable field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimState {
    pub position: Option<Tween<Vec3>>,
    pub yaw: Option<Tween<f32>>,
    pub scale: Option<Tween<f32>>,
}

impl AnimState {
    pub fn is_idle(&self) -> bool {
        self.position.is_none() && self.yaw.is_none() && self.scale.is_none()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TweenDurations {
    pub position: f64,
    pub yaw: f64,
    pub scale: f64,
}

impl TweenDurations {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            position: config.position_duration_secs,
            yaw: config.flip_duration_secs,
            scale: config.scale_duration_secs,
        }
    }

    pub fn get(&self, field: TweenField) -> f64 {
        match field {
            TweenField::Position => self.position,
            TweenField::Yaw => self.yaw,
            TweenField::Scale => self.scale,
        }
    }
}

/// Moves live transforms toward their targets.
///
/// The controller and the distance scaler are the only writers of
/// `Node::live`.
#[derive(Clone, Debug)]
pub struct AnimationController {
    durations: TweenDurations,
}

impl AnimationController {
    pub fn new(durations: TweenDurations) -> Self {
        Self { durations }
    }

    /// Starts (or restarts) the tween of `field` toward `node.target`.
    ///
    /// The start value is the current live value, never the previous
    /// target. A node without a live transform is snapped onto its target.
    pub fn retarget(&self, node: &mut Node, field: TweenField, now: f64) {
        let Some(live) = node.live else {
            node.live = Some(node.target);
            node.anim = AnimState::default();
            return;
        };

        let duration = self.durations.get(field);
        match field {
            TweenField::Position => {
                node.anim.position = (live.position != node.target.position
                    || node.anim.position.is_some())
                .then(|| Tween::new(live.position, node.target.position, now, duration));
            }
            TweenField::Yaw => {
                node.anim.yaw = (live.yaw != node.target.yaw || node.anim.yaw.is_some())
                    .then(|| Tween::new(live.yaw, node.target.yaw, now, duration));
            }
            TweenField::Scale => {
                node.anim.scale = (live.scale != node.target.scale || node.anim.scale.is_some())
                    .then(|| Tween::new(live.scale, node.target.scale, now, duration));
            }
        }
    }

    /// Advances every in-flight tween to `now` and returns the
    /// `(node index, field)` pairs that finished during this call.
    pub fn advance(&self, registry: &mut NodeRegistry, now: f64) -> Vec<(usize, TweenField)> {
        let mut finished = Vec::new();

        for (index, node) in registry.iter_mut().enumerate() {
            let Some(live) = node.live.as_mut() else {
                continue;
            };

            if let Some(tween) = node.anim.position {
                let (value, done) = tween.sample(now);
                live.position = value;
                if done {
                    node.anim.position = None;
                    finished.push((index, TweenField::Position));
                }
            }

            if let Some(tween) = node.anim.yaw {
                let (value, done) = tween.sample(now);
                live.yaw = value;
                if done {
                    node.anim.yaw = None;
                    finished.push((index, TweenField::Yaw));
                }
            }

            if let Some(tween) = node.anim.scale {
                let (value, done) = tween.sample(now);
                live.scale = value;
                if done {
                    node.anim.scale = None;
                    finished.push((index, TweenField::Scale));
                }
            }
        }

        finished
    }

    pub fn is_animating(&self, registry: &NodeRegistry) -> bool {
        registry.iter().any(|node| !node.anim.is_idle())
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::{AnimationController, Tween, TweenDurations, TweenField, ease_in_out_cubic};
    use crate::engine::registry::{NodeRecord, NodeRegistry, Transform};

    fn controller() -> AnimationController {
        AnimationController::new(TweenDurations {
            position: 2.0,
            yaw: 1.0,
            scale: 0.5,
        })
    }

    fn placed_registry(position: Vec3) -> NodeRegistry {
        let mut registry = NodeRegistry::new();
        registry.insert(NodeRecord::bare("node"));
        let node = registry.get_mut("node").unwrap();
        node.live = Some(Transform {
            position,
            ..Transform::default()
        });
        node.target = node.live.unwrap();
        registry
    }

    #[test]
    fn easing_hits_fixed_points() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert_eq!(ease_in_out_cubic(0.5), 0.5);
    }

    #[test]
    fn easing_is_monotonic() {
        let mut previous = ease_in_out_cubic(0.0);
        for step in 1..=1000 {
            let value = ease_in_out_cubic(step as f32 / 1000.0);
            assert!(value >= previous, "ease decreased at step {step}");
            previous = value;
        }
    }

    #[test]
    fn easing_clamps_outside_unit_interval() {
        assert_eq!(ease_in_out_cubic(-3.0), 0.0);
        assert_eq!(ease_in_out_cubic(7.0), 1.0);
    }

    #[test]
    fn tween_snaps_to_target_after_exact_duration() {
        let start = Vec3::new(0.1, -3.7, 11.3);
        let target = Vec3::new(997.3, 0.3, -42.9);
        let tween = Tween::new(start, target, 0.7, 2.0);

        let (value, done) = tween.sample(2.7);

        assert!(done);
        assert_eq!(value, target);
    }

    #[test]
    fn advancing_by_duration_lands_exactly_on_target() {
        let controller = controller();
        let mut registry = placed_registry(Vec3::ZERO);
        let target = Vec3::new(123.456, -78.9, 0.001);
        {
            let node = registry.get_mut("node").unwrap();
            node.target.position = target;
            controller.retarget(node, TweenField::Position, 0.0);
        }

        controller.advance(&mut registry, 1.0);
        let halfway = registry.get("node").unwrap().live.unwrap().position;
        assert!(halfway != target);

        let finished = controller.advance(&mut registry, 2.0);

        let node = registry.get("node").unwrap();
        assert_eq!(node.live.unwrap().position, target);
        assert!(node.anim.position.is_none());
        assert_eq!(finished, vec![(0, TweenField::Position)]);
    }

    #[test]
    fn retarget_restarts_from_live_value() {
        let controller = controller();
        let mut registry = placed_registry(Vec3::ZERO);
        {
            let node = registry.get_mut("node").unwrap();
            node.target.position = Vec3::new(100.0, 0.0, 0.0);
            controller.retarget(node, TweenField::Position, 0.0);
        }
        controller.advance(&mut registry, 1.0);
        let midway = registry.get("node").unwrap().live.unwrap().position;

        let node = registry.get_mut("node").unwrap();
        node.target.position = Vec3::new(-50.0, 0.0, 0.0);
        controller.retarget(node, TweenField::Position, 1.0);

        let tween = node.anim.position.unwrap();
        assert_eq!(tween.start, midway);
        assert_eq!(tween.target, Vec3::new(-50.0, 0.0, 0.0));
        assert_eq!(tween.start_time, 1.0);
    }

    #[test]
    fn fields_animate_independently() {
        let controller = controller();
        let mut registry = placed_registry(Vec3::ZERO);
        {
            let node = registry.get_mut("node").unwrap();
            node.target.position = Vec3::X * 10.0;
            node.target.scale = 3.0;
            controller.retarget(node, TweenField::Position, 0.0);
            controller.retarget(node, TweenField::Scale, 0.0);
        }

        let finished = controller.advance(&mut registry, 0.5);

        let node = registry.get("node").unwrap();
        assert_eq!(finished, vec![(0, TweenField::Scale)]);
        assert_eq!(node.live.unwrap().scale, 3.0);
        assert!(node.anim.position.is_some());
    }

    #[test]
    fn unplaced_node_snaps_onto_target() {
        let controller = controller();
        let mut registry = NodeRegistry::new();
        registry.insert(NodeRecord::bare("fresh"));
        let node = registry.get_mut("fresh").unwrap();
        node.target.position = Vec3::new(5.0, 6.0, 7.0);

        controller.retarget(node, TweenField::Position, 3.0);

        assert_eq!(node.live.unwrap().position, Vec3::new(5.0, 6.0, 7.0));
        assert!(node.anim.is_idle());
    }

    #[test]
    fn retarget_to_current_value_schedules_nothing() {
        let controller = controller();
        let mut registry = placed_registry(Vec3::ONE);
        let node = registry.get_mut("node").unwrap();

        controller.retarget(node, TweenField::Position, 0.0);

        assert!(node.anim.is_idle());
        assert!(!controller.is_animating(&registry));
    }
}
