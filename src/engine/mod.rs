//! Spatial layout, animation and interaction core.
//!
//! Nothing in here touches the filesystem or the GUI; the app feeds it vault
//! scans and input events and reads live transforms back out.

pub mod camera;
pub mod hit;
pub mod interaction;
pub mod layout;
pub mod listeners;
pub mod registry;
pub mod scaler;
pub mod scene;
pub mod tween;

pub use camera::Viewport;
pub use interaction::{Face, FlipPhase, InputEvent, KeyCommand, Modifiers, PointerButton};
pub use layout::LayoutMode;
pub use listeners::{ListenerGuard, ListenerKind};
pub use registry::{Category, MediaFlags, NodeMetadata, NodeRecord};
pub use scene::{Scene, SceneEvent};
