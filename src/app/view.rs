use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{
    self, Align2, Color32, FontId, Key, Painter, Pos2, Rect, Sense, Shape, Stroke, Ui, vec2,
};
use fuzzy_matcher::skim::SkimMatcherV2;
use glam::Vec3;

use crate::engine::{
    Face, InputEvent, KeyCommand, Modifiers, PointerButton, SceneEvent, Viewport,
};
use crate::util::{fuzzy_match_score, short_label};

use super::render_utils::{
    blend_color, category_border, circle_visible, dim_color, draw_background, ellipse_points,
    ellipse_segments, to_glam, to_pos2,
};
use super::{ContextMenuState, SearchMatchCache, ViewModel};

const ORBIT_RADIANS_PER_PIXEL: f32 = 0.005;
pub(in crate::app) const LABEL_MAX_CHARS: usize = 28;
const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
const MATCH_COLOR: Color32 = Color32::from_rgb(103, 196, 255);

struct ProjectedNode {
    index: usize,
    center: Pos2,
    /// Disc radius in pixels.
    radius: f32,
    depth: f32,
}

impl ViewModel {
    pub(in crate::app) fn draw_scene(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let now = ui.input(|input| input.time);

        self.scene.set_viewport(Viewport::new(
            to_glam(rect.min),
            glam::Vec2::new(rect.width(), rect.height()),
        ));
        self.handle_camera(ui, &response);
        self.route_input(ui, &response, now);

        let animating = self.scene.tick(now);
        if animating || response.dragged() {
            ui.ctx().request_repaint();
        }
        self.consume_scene_events();

        let horizon = self
            .scene
            .camera()
            .project(self.scene.viewport(), Vec3::ZERO)
            .map(|projection| projection.screen.y);
        draw_background(&painter, rect, horizon);

        let projected = self.project_nodes(rect);
        if self.show_relations {
            self.draw_relations(&painter, &projected);
        }

        let search_matches = self.cached_search_matches();
        for item in &projected {
            self.draw_node(&painter, item, search_matches.as_deref());
        }

        if self.scene.registry().is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No dream nodes in this vault",
                FontId::proportional(16.0),
                Color32::from_gray(180),
            );
        }

        if let Some(hovered) = self.scene.hovered() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });

            if let Some(node) = self.scene.registry().get(hovered) {
                let panel_text = format!(
                    "{}  |  {}  |  relations {}",
                    node.id,
                    node.metadata.category.label(),
                    node.metadata.relations.len()
                );
                painter.text(
                    rect.left_top() + vec2(10.0, 10.0),
                    Align2::LEFT_TOP,
                    panel_text,
                    FontId::proportional(13.0),
                    Color32::from_gray(240),
                );
            }
        }
    }

    fn handle_camera(&mut self, ui: &Ui, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_delta();
            self.scene.camera_mut().orbit(
                -delta.x * ORBIT_RADIANS_PER_PIXEL,
                delta.y * ORBIT_RADIANS_PER_PIXEL,
            );
            self.context_menu = None;
        }

        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() > f32::EPSILON {
            let zoom_factor = (1.0 - (scroll * 0.0018)).clamp(0.85, 1.15);
            self.scene.camera_mut().zoom(zoom_factor);
        }
    }

    fn route_input(&mut self, ui: &Ui, response: &egui::Response, now: f64) {
        let hover = match response.hover_pos() {
            Some(position) if !response.dragged() => InputEvent::PointerMoved {
                position: to_glam(position),
            },
            _ => InputEvent::PointerLeft,
        };
        self.scene.handle_input(hover, now);

        let modifiers = ui.input(|input| Modifiers {
            multi_select: input.modifiers.shift || input.modifiers.command,
        });
        if let Some(position) = response.interact_pointer_pos() {
            let button = if response.clicked_by(egui::PointerButton::Primary) {
                Some(PointerButton::Primary)
            } else if response.clicked_by(egui::PointerButton::Secondary) {
                Some(PointerButton::Secondary)
            } else {
                None
            };

            if let Some(button) = button {
                self.context_menu = None;
                self.scene.handle_input(
                    InputEvent::Click {
                        position: to_glam(position),
                        button,
                        modifiers,
                    },
                    now,
                );
            }
        }

        if ui.ctx().wants_keyboard_input() {
            return;
        }
        let (cancel, toggle) =
            ui.input(|input| (input.key_pressed(Key::Escape), input.key_pressed(Key::G)));
        if cancel {
            self.context_menu = None;
            self.scene.handle_input(InputEvent::Key(KeyCommand::Cancel), now);
        }
        if toggle {
            self.scene
                .handle_input(InputEvent::Key(KeyCommand::ToggleLayout), now);
        }
    }

    fn consume_scene_events(&mut self) {
        self.scene.drain_events(&mut self.events);
        for event in self.events.drain(..) {
            match event {
                SceneEvent::NodeActivated(id) => self.active = Some(id),
                SceneEvent::NodeContextMenu { id, pointer } => {
                    self.context_menu = Some(ContextMenuState {
                        id,
                        pointer: to_pos2(pointer),
                    });
                }
            }
        }
    }

    /// Visible nodes, farthest first.
    fn project_nodes(&self, rect: Rect) -> Vec<ProjectedNode> {
        let camera = self.scene.camera();
        let viewport = self.scene.viewport();
        let node_radius = self.scene.config().node_radius;

        let registry = self.scene.registry();

        let mut projected = self
            .scene
            .transforms()
            .filter_map(|(id, live)| {
                let index = registry.index_of(id)?;
                let projection = camera.project(viewport, live.position)?;
                let center = to_pos2(projection.screen);
                let radius = node_radius * live.scale * projection.pixels_per_unit;
                circle_visible(rect, center, radius).then_some(ProjectedNode {
                    index,
                    center,
                    radius,
                    depth: projection.depth,
                })
            })
            .collect::<Vec<_>>();

        projected.sort_by(|a, b| b.depth.total_cmp(&a.depth));
        projected
    }

    fn draw_relations(&self, painter: &Painter, projected: &[ProjectedNode]) {
        let registry = self.scene.registry();
        let mut screen = vec![None; registry.len()];
        for item in projected {
            screen[item.index] = Some(item.center);
        }

        let focus = self.scene.focus();
        let hovered = self.scene.hovered();
        for (index, node) in registry.iter().enumerate() {
            let Some(start) = screen[index] else {
                continue;
            };

            for relation in &node.metadata.relations {
                let Some(other_index) = registry.index_of(relation) else {
                    continue;
                };
                let Some(end) = screen[other_index] else {
                    continue;
                };
                let other = &registry.nodes()[other_index];
                // Mutual relations are drawn once.
                if other.metadata.relations.contains(&node.id) && other_index < index {
                    continue;
                }

                let touches = |id: Option<&str>| {
                    id.is_some_and(|id| id == node.id || id == other.id)
                };
                let stroke = if touches(focus) || touches(hovered) {
                    Stroke::new(1.8, Color32::from_rgba_unmultiplied(241, 146, 94, 200))
                } else {
                    Stroke::new(1.0, Color32::from_rgba_unmultiplied(90, 100, 120, 90))
                };
                painter.line_segment([start, end], stroke);
            }
        }
    }

    fn draw_node(&self, painter: &Painter, item: &ProjectedNode, matches: Option<&HashSet<usize>>) {
        let Some(node) = self.scene.registry().nodes().get(item.index) else {
            return;
        };
        let Some(live) = node.live else {
            return;
        };

        // The disc turns about its vertical axis; past a quarter turn the
        // back face shows.
        let squash = live.yaw.cos();
        let face = if squash >= 0.0 { Face::Front } else { Face::Back };
        let radius_x = (item.radius * squash.abs()).max(1.0);
        let border = category_border(&node.metadata.category);
        let hover = self.scene.highlight_opacity(node);
        let is_match = matches.is_some_and(|matches| matches.contains(&item.index));

        let base_fill = match face {
            Face::Front => Color32::from_rgb(30, 36, 52),
            Face::Back => Color32::from_rgb(16, 18, 28),
        };
        let fill = if is_match {
            blend_color(base_fill, MATCH_COLOR, 0.55)
        } else if matches.is_some_and(|matches| !matches.is_empty()) {
            dim_color(base_fill, 0.6)
        } else {
            base_fill
        };
        let fill = blend_color(fill, border, hover * 0.5);

        let segments = ellipse_segments(item.radius);
        painter.add(Shape::convex_polygon(
            ellipse_points(item.center, radius_x, item.radius, segments),
            fill,
            Stroke::new(2.0 + (hover * 2.0), border),
        ));

        if node.selected {
            painter.add(Shape::closed_line(
                ellipse_points(item.center, radius_x + 5.0, item.radius + 5.0, segments),
                Stroke::new(2.2, SELECTED_COLOR),
            ));
        }

        match face {
            Face::Front if node.media.dream_talk => {
                painter.circle_filled(
                    item.center,
                    (item.radius * 0.18).min(radius_x).max(2.0),
                    blend_color(border, Color32::WHITE, 0.35),
                );
            }
            Face::Back if radius_x > 24.0 => {
                let text = if node.media.dream_song {
                    "DreamSong"
                } else {
                    "no DreamSong"
                };
                painter.text(
                    item.center,
                    Align2::CENTER_CENTER,
                    text,
                    FontId::proportional((item.radius * 0.2).clamp(9.0, 18.0)),
                    Color32::from_gray(200),
                );
            }
            Face::Front | Face::Back => {}
        }

        let show_label = self.show_labels
            && (item.radius > 10.0 || hover > 0.0 || node.selected || is_match);
        if show_label {
            painter.text(
                item.center + vec2(0.0, item.radius + 4.0),
                Align2::CENTER_TOP,
                short_label(&node.id, LABEL_MAX_CHARS),
                FontId::proportional(12.0),
                Color32::from_gray(232),
            );
        }
    }

    pub(in crate::app) fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let search_query = self.search.trim();
        if search_query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.revision == self.revision
            && cached.query == search_query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .scene
            .registry()
            .iter()
            .enumerate()
            .filter(|(_, node)| fuzzy_match_score(&matcher, &node.id, search_query).is_some())
            .map(|(index, _)| index)
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: search_query.to_owned(),
            revision: self.revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }
}
