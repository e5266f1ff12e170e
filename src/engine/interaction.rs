use std::f32::consts::PI;

use glam::Vec2;

use super::camera::{Camera, Viewport};
use super::hit::BoundsTable;
use super::registry::{Node, NodeRegistry};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Face {
    Front,
    Back,
}

impl Face {
    pub fn yaw(self) -> f32 {
        match self {
            Self::Front => 0.0,
            Self::Back => PI,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlipPhase {
    Front,
    Back,
    Rotating { toward: Face },
}

impl FlipPhase {
    pub fn is_rotating(self) -> bool {
        matches!(self, Self::Rotating { .. })
    }

    /// The face the node shows, or is turning to.
    pub fn face(self) -> Face {
        match self {
            Self::Front => Face::Front,
            Self::Back => Face::Back,
            Self::Rotating { toward } => toward,
        }
    }
}

/// Starts a flip and returns the face to rotate to.
///
/// Ignored while the node is already rotating.
pub fn begin_flip(node: &mut Node) -> Option<Face> {
    if node.flip.is_rotating() {
        return None;
    }

    let toward = node.flip.face().opposite();
    node.flip = FlipPhase::Rotating { toward };
    node.target.yaw = toward.yaw();
    Some(toward)
}

/// Forces the node back to its front face.
///
/// Returns `true` when the yaw target changed and a rotation has to be
/// (re)started from the current live angle.
pub fn force_front(node: &mut Node) -> bool {
    let already_front = node.flip == FlipPhase::Front
        && node.target.yaw == Face::Front.yaw()
        && node.anim.yaw.is_none();
    if already_front {
        return false;
    }

    node.flip = FlipPhase::Front;
    node.target.yaw = Face::Front.yaw();
    true
}

/// Settles a finished rotation onto its face.
pub fn settle_flip(node: &mut Node) {
    if let FlipPhase::Rotating { toward } = node.flip {
        node.flip = match toward {
            Face::Front => FlipPhase::Front,
            Face::Back => FlipPhase::Back,
        };
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift or the platform command key.
    pub multi_select: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    Cancel,
    ToggleLayout,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerMoved { position: Vec2 },
    PointerLeft,
    Click {
        position: Vec2,
        button: PointerButton,
        modifiers: Modifiers,
    },
    Key(KeyCommand),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClickAction {
    ToggleSelection(String),
    Flip(String),
    Focus(String),
    ContextMenu { id: String, pointer: Vec2 },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HoverChange {
    pub left: Option<String>,
    pub entered: Option<String>,
}

/// Turns pointer input into hits, click actions and hover state.
#[derive(Clone, Debug)]
pub struct InteractionRouter {
    hovered: Option<String>,
    hover_opacity: f32,
}

impl InteractionRouter {
    pub fn new(hover_opacity: f32) -> Self {
        Self {
            hovered: None,
            hover_opacity: hover_opacity.clamp(0.0, 1.0),
        }
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn highlight_opacity(&self, node: &Node) -> f32 {
        if node.hovered { self.hover_opacity } else { 0.0 }
    }

    /// Node under the pointer, if any.
    pub fn pick(
        &self,
        camera: &Camera,
        viewport: Viewport,
        bounds: &BoundsTable,
        position: Vec2,
    ) -> Option<String> {
        if bounds.is_empty() || !viewport.contains(position) {
            return None;
        }

        let ray = camera.ray_from_screen(viewport, position);
        bounds.raycast(&ray).map(|hit| hit.id.to_owned())
    }

    pub fn resolve_click(
        &self,
        hit: Option<&str>,
        focus: Option<&str>,
        button: PointerButton,
        modifiers: Modifiers,
        pointer: Vec2,
    ) -> Option<ClickAction> {
        let id = hit?.to_owned();

        let action = match button {
            PointerButton::Secondary => ClickAction::ContextMenu { id, pointer },
            PointerButton::Primary if modifiers.multi_select => ClickAction::ToggleSelection(id),
            PointerButton::Primary if focus == Some(id.as_str()) => ClickAction::Flip(id),
            PointerButton::Primary => ClickAction::Focus(id),
        };
        Some(action)
    }

    /// Moves the hover to `hit`.
    ///
    /// The previous node is cleared before the new one is set, within the
    /// same call.
    pub fn update_hover(&mut self, registry: &mut NodeRegistry, hit: Option<&str>) -> HoverChange {
        if self.hovered.as_deref() == hit {
            return HoverChange::default();
        }

        let left = self.hovered.take();
        if let Some(previous) = left.as_deref()
            && let Some(node) = registry.get_mut(previous)
        {
            node.hovered = false;
        }

        let entered = hit.and_then(|id| {
            let node = registry.get_mut(id)?;
            node.hovered = true;
            Some(node.id.clone())
        });
        self.hovered = entered.clone();

        HoverChange { left, entered }
    }

    /// Forgets a hovered node that left the registry.
    pub fn prune(&mut self, registry: &NodeRegistry) {
        if self
            .hovered
            .as_deref()
            .is_some_and(|id| !registry.contains(id))
        {
            self.hovered = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::{
        ClickAction, Face, FlipPhase, InteractionRouter, Modifiers, PointerButton, begin_flip,
        force_front, settle_flip,
    };
    use crate::engine::registry::{Node, NodeRecord, NodeRegistry};

    fn registry(ids: &[&str]) -> NodeRegistry {
        let mut registry = NodeRegistry::new();
        for id in ids {
            registry.insert(NodeRecord::bare(*id));
        }
        registry
    }

    fn hovered_ids(registry: &NodeRegistry) -> Vec<&str> {
        registry
            .iter()
            .filter(|node| node.hovered)
            .map(|node| node.id.as_str())
            .collect()
    }

    #[test]
    fn hover_moves_exclusively() {
        let mut registry = registry(&["x", "y"]);
        let mut router = InteractionRouter::new(0.6);

        router.update_hover(&mut registry, Some("x"));
        assert_eq!(hovered_ids(&registry), vec!["x"]);

        let change = router.update_hover(&mut registry, Some("y"));
        assert_eq!(change.left.as_deref(), Some("x"));
        assert_eq!(change.entered.as_deref(), Some("y"));
        assert_eq!(hovered_ids(&registry), vec!["y"]);
        assert_eq!(router.highlight_opacity(registry.get("x").unwrap()), 0.0);
        assert_eq!(router.highlight_opacity(registry.get("y").unwrap()), 0.6);

        router.update_hover(&mut registry, None);
        assert!(hovered_ids(&registry).is_empty());
        assert_eq!(router.hovered(), None);
    }

    #[test]
    fn repeated_hover_reports_no_change() {
        let mut registry = registry(&["x"]);
        let mut router = InteractionRouter::new(0.6);
        router.update_hover(&mut registry, Some("x"));
        assert_eq!(router.update_hover(&mut registry, Some("x")), Default::default());
    }

    #[test]
    fn hover_on_unknown_id_clears_previous() {
        let mut registry = registry(&["x"]);
        let mut router = InteractionRouter::new(0.6);
        router.update_hover(&mut registry, Some("x"));
        let change = router.update_hover(&mut registry, Some("gone"));
        assert_eq!(change.entered, None);
        assert!(hovered_ids(&registry).is_empty());
    }

    #[test]
    fn click_semantics() {
        let router = InteractionRouter::new(0.6);
        let pointer = Vec2::new(3.0, 4.0);
        let plain = Modifiers::default();
        let multi = Modifiers { multi_select: true };

        assert_eq!(
            router.resolve_click(Some("a"), Some("b"), PointerButton::Primary, plain, pointer),
            Some(ClickAction::Focus("a".to_owned()))
        );
        assert_eq!(
            router.resolve_click(Some("a"), Some("a"), PointerButton::Primary, plain, pointer),
            Some(ClickAction::Flip("a".to_owned()))
        );
        assert_eq!(
            router.resolve_click(Some("a"), Some("a"), PointerButton::Primary, multi, pointer),
            Some(ClickAction::ToggleSelection("a".to_owned()))
        );
        assert_eq!(
            router.resolve_click(Some("a"), None, PointerButton::Secondary, plain, pointer),
            Some(ClickAction::ContextMenu {
                id: "a".to_owned(),
                pointer
            })
        );
        assert_eq!(
            router.resolve_click(None, Some("a"), PointerButton::Primary, plain, pointer),
            None
        );
    }

    #[test]
    fn flip_cycle_and_rotation_guard() {
        let mut node = Node::new(NodeRecord::bare("n"));

        assert_eq!(begin_flip(&mut node), Some(Face::Back));
        assert_eq!(node.flip, FlipPhase::Rotating { toward: Face::Back });
        assert_eq!(node.target.yaw, Face::Back.yaw());

        assert_eq!(begin_flip(&mut node), None);

        settle_flip(&mut node);
        assert_eq!(node.flip, FlipPhase::Back);

        assert_eq!(begin_flip(&mut node), Some(Face::Front));
        settle_flip(&mut node);
        assert_eq!(node.flip, FlipPhase::Front);
    }

    #[test]
    fn force_front_interrupts_rotation() {
        let mut node = Node::new(NodeRecord::bare("n"));
        assert!(!force_front(&mut node));

        begin_flip(&mut node);
        assert!(force_front(&mut node));
        assert_eq!(node.flip, FlipPhase::Front);
        assert_eq!(node.target.yaw, 0.0);
    }
}
