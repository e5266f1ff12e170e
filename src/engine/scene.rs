use glam::{Vec2, Vec3};

use crate::config::EngineConfig;

use super::camera::{Camera, Viewport};
use super::hit::BoundsTable;
use super::interaction::{
    ClickAction, InputEvent, InteractionRouter, KeyCommand, begin_flip, force_front, settle_flip,
};
use super::layout::{self, LayoutMode, ScaleIntent};
use super::listeners::{ListenerKind, ListenerSet};
use super::registry::{Node, NodeRecord, NodeRegistry, SyncReport, Transform};
use super::scaler::CameraDistanceScaler;
use super::tween::{AnimationController, TweenDurations, TweenField};

/// Outbound notifications for the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneEvent {
    NodeActivated(String),
    NodeContextMenu { id: String, pointer: Vec2 },
}

/// The layout, animation and interaction state of one vault.
#[derive(Debug)]
pub struct Scene {
    config: EngineConfig,
    registry: NodeRegistry,
    controller: AnimationController,
    scaler: CameraDistanceScaler,
    router: InteractionRouter,
    bounds: BoundsTable,
    camera: Camera,
    viewport: Viewport,
    mode: LayoutMode,
    /// Last grid/sphere mode, the starting point of a layout toggle.
    base_mode: LayoutMode,
    laid_out: bool,
    distance_scaling: bool,
    listeners: ListenerSet,
    events: Vec<SceneEvent>,
}

impl Scene {
    pub fn new(config: EngineConfig) -> Self {
        let camera = Camera::new(config.camera_distance, config.camera_fov_degrees);
        Self {
            registry: NodeRegistry::new(),
            controller: AnimationController::new(TweenDurations::from_config(&config)),
            scaler: CameraDistanceScaler::new(&config),
            router: InteractionRouter::new(config.hover_opacity),
            bounds: BoundsTable::new(),
            camera,
            viewport: Viewport::default(),
            mode: LayoutMode::Sphere,
            base_mode: LayoutMode::Sphere,
            laid_out: false,
            distance_scaling: config.distance_scaling,
            listeners: ListenerSet::new(),
            events: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn mode(&self) -> &LayoutMode {
        &self.mode
    }

    pub fn focus(&self) -> Option<&str> {
        self.mode.focus()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.router.hovered()
    }

    pub fn highlight_opacity(&self, node: &Node) -> f32 {
        self.router.highlight_opacity(node)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.aspect = viewport.aspect();
    }

    pub fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }

    pub fn distance_scaling(&self) -> bool {
        self.distance_scaling
    }

    /// Switches the camera-distance scaler on or off.
    ///
    /// Auto-scaled nodes tween to their new scale (distance-driven, or 1.0
    /// when the scaler is off).
    pub fn set_distance_scaling(&mut self, enabled: bool, now: f64) {
        if self.distance_scaling == enabled {
            return;
        }
        self.distance_scaling = enabled;

        for node in self.registry.iter_mut() {
            if node.scale_intent != ScaleIntent::Auto {
                continue;
            }
            node.target.scale =
                auto_scale(&self.config, &self.scaler, enabled, self.camera.position, node);
            self.controller.retarget(node, TweenField::Scale, now);
        }
        log::info!("distance scaling {}", if enabled { "on" } else { "off" });
    }

    /// Reconciles the node set with a vault scan.
    ///
    /// The first scan lays everything out on the sphere. Later scans that
    /// add, drop or re-describe nodes re-apply the active mode; a focus that
    /// disappeared falls back to the sphere.
    pub fn sync_nodes(&mut self, records: Vec<NodeRecord>, now: f64) -> SyncReport {
        let report = self.registry.sync(records);
        self.router.prune(&self.registry);

        if !self.laid_out {
            self.laid_out = true;
            self.apply_layout(LayoutMode::Sphere, now);
        } else if !report.is_empty() {
            self.apply_layout(self.mode.clone(), now);
        }
        self.bounds.rebuild(&self.registry, self.config.node_radius);

        log::info!(
            "scene holds {} nodes ({} added, {} removed, {} changed)",
            self.registry.len(),
            report.added.len(),
            report.removed.len(),
            report.changed.len()
        );
        report
    }

    /// Recomputes every target for `mode` and starts the tweens toward them.
    pub fn apply_layout(&mut self, mode: LayoutMode, now: f64) {
        let mode = match mode {
            LayoutMode::RadialCluster { focus } if !self.registry.contains(&focus) => {
                log::warn!("focus {focus} is gone; falling back to the sphere layout");
                LayoutMode::Sphere
            }
            other => other,
        };

        let targets = {
            let inputs = self.registry.layout_inputs();
            layout::compute(&mode, &inputs, &self.config)
        };

        let camera_position = self.camera.position;
        for (node, target) in self.registry.iter_mut().zip(targets) {
            node.target.position = target.position;

            // Scale targets are settled first so an unplaced node snaps onto
            // an in-range scale together with its position.
            let rescale = match (node.scale_intent, target.scale) {
                (_, ScaleIntent::Fixed(scale)) => {
                    let scale = self.config.clamp_scale(scale);
                    node.scale_intent = ScaleIntent::Fixed(scale);
                    node.target.scale = scale;
                    true
                }
                (ScaleIntent::Fixed(_), ScaleIntent::Auto) => {
                    node.scale_intent = ScaleIntent::Auto;
                    node.target.scale = auto_scale(
                        &self.config,
                        &self.scaler,
                        self.distance_scaling,
                        camera_position,
                        node,
                    );
                    true
                }
                (ScaleIntent::Auto, ScaleIntent::Auto) => {
                    if node.live.is_none() {
                        node.target.scale = auto_scale(
                            &self.config,
                            &self.scaler,
                            self.distance_scaling,
                            camera_position,
                            node,
                        );
                    }
                    false
                }
            };

            self.controller.retarget(node, TweenField::Position, now);
            if rescale {
                self.controller.retarget(node, TweenField::Scale, now);
            }
        }

        if let Some(previous) = self.mode.focus()
            && mode.focus() != Some(previous)
            && let Some(node) = self.registry.get_mut(previous)
            && force_front(node)
        {
            log::debug!("{} lost focus; turning to the front", node.id);
            self.controller.retarget(node, TweenField::Yaw, now);
        }

        if matches!(mode, LayoutMode::Grid | LayoutMode::Sphere) {
            self.base_mode = mode.clone();
        }
        if mode != self.mode {
            log::info!("layout: {}", mode.label());
        }
        self.mode = mode;
    }

    /// Grid and sphere swap; an active focus is cleared.
    pub fn toggle_layout(&mut self, now: f64) {
        let next = match self.base_mode {
            LayoutMode::Grid => LayoutMode::Sphere,
            _ => LayoutMode::Grid,
        };
        self.apply_layout(next, now);
    }

    /// Clears the focus, returns to the sphere and resets the camera.
    pub fn cancel(&mut self, now: f64) {
        self.camera.reset();
        self.apply_layout(LayoutMode::Sphere, now);
    }

    pub fn focus_node(&mut self, id: &str, now: f64) -> bool {
        if !self.registry.contains(id) {
            return false;
        }

        log::debug!("focusing {id}");
        self.apply_layout(
            LayoutMode::RadialCluster {
                focus: id.to_owned(),
            },
            now,
        );
        true
    }

    /// Flips the focused node; any other node is left alone.
    pub fn flip_node(&mut self, id: &str, now: f64) -> bool {
        if self.mode.focus() != Some(id) {
            return false;
        }
        let Some(node) = self.registry.get_mut(id) else {
            return false;
        };
        let Some(face) = begin_flip(node) else {
            return false;
        };

        log::debug!("flipping {id} to {face:?}");
        self.controller.retarget(node, TweenField::Yaw, now);
        true
    }

    pub fn toggle_selection(&mut self, id: &str) -> bool {
        let Some(node) = self.registry.get_mut(id) else {
            return false;
        };
        node.selected = !node.selected;
        true
    }

    pub fn clear_selection(&mut self) {
        for node in self.registry.iter_mut() {
            node.selected = false;
        }
    }

    /// Routes one input event. Events of a kind without a registered
    /// listener are dropped.
    pub fn handle_input(&mut self, event: InputEvent, now: f64) {
        let kind = match event {
            InputEvent::Key(_) => ListenerKind::Keyboard,
            _ => ListenerKind::Pointer,
        };
        if !self.listeners.is_registered(kind) {
            return;
        }

        match event {
            InputEvent::PointerMoved { position } => {
                let hit = self.pick(position);
                self.set_hover(hit.as_deref());
            }
            InputEvent::PointerLeft => self.set_hover(None),
            InputEvent::Click {
                position,
                button,
                modifiers,
            } => {
                let hit = self.pick(position);
                let action = self.router.resolve_click(
                    hit.as_deref(),
                    self.mode.focus(),
                    button,
                    modifiers,
                    position,
                );
                if let Some(action) = action {
                    self.perform(action, now);
                }
            }
            InputEvent::Key(KeyCommand::Cancel) => self.cancel(now),
            InputEvent::Key(KeyCommand::ToggleLayout) => self.toggle_layout(now),
        }
    }

    pub fn pick(&self, position: Vec2) -> Option<String> {
        self.router
            .pick(&self.camera, self.viewport, &self.bounds, position)
    }

    fn set_hover(&mut self, hit: Option<&str>) {
        let change = self.router.update_hover(&mut self.registry, hit);
        if change.left.is_some() || change.entered.is_some() {
            log::trace!("hover {:?} -> {:?}", change.left, change.entered);
        }
    }

    fn perform(&mut self, action: ClickAction, now: f64) {
        match action {
            ClickAction::ToggleSelection(id) => {
                self.toggle_selection(&id);
            }
            ClickAction::Flip(id) => {
                self.flip_node(&id, now);
                self.events.push(SceneEvent::NodeActivated(id));
            }
            ClickAction::Focus(id) => {
                self.focus_node(&id, now);
                self.events.push(SceneEvent::NodeActivated(id));
            }
            ClickAction::ContextMenu { id, pointer } => {
                self.events.push(SceneEvent::NodeContextMenu { id, pointer });
            }
        }
    }

    /// Advances one frame. Returns `true` while any tween is in flight.
    pub fn tick(&mut self, now: f64) -> bool {
        for (index, field) in self.controller.advance(&mut self.registry, now) {
            if field == TweenField::Yaw
                && let Some(node) = self.registry.node_at_mut(index)
            {
                settle_flip(node);
            }
        }

        if self.distance_scaling {
            self.scaler.apply(&mut self.registry, self.camera.position);
        }
        self.bounds.rebuild(&self.registry, self.config.node_radius);

        self.controller.is_animating(&self.registry)
    }

    /// Live transforms of every placed node, in node order.
    pub fn transforms(&self) -> impl Iterator<Item = (&str, Transform)> {
        self.registry
            .iter()
            .filter_map(|node| node.live.map(|live| (node.id.as_str(), live)))
    }

    pub fn drain_events(&mut self, out: &mut Vec<SceneEvent>) {
        out.append(&mut self.events);
    }
}

/// Resting scale of an auto-scaled node, sampled where it is headed.
fn auto_scale(
    config: &EngineConfig,
    scaler: &CameraDistanceScaler,
    distance_scaling: bool,
    camera_position: Vec3,
    node: &Node,
) -> f32 {
    if !distance_scaling {
        return config.clamp_scale(1.0);
    }
    scaler.scale_at(node.target.position, camera_position)
}
