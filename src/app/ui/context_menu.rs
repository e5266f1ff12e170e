use eframe::egui::{self, Context, RichText};

use crate::util::short_label;

use super::super::ViewModel;
use super::super::view::LABEL_MAX_CHARS;

enum MenuAction {
    Focus,
    Flip,
    ToggleSelection,
    CopyName,
}

impl ViewModel {
    pub(in crate::app) fn draw_context_menu(&mut self, ctx: &Context, now: f64) {
        let Some(menu) = &self.context_menu else {
            return;
        };
        let id = menu.id.clone();
        let pointer = menu.pointer;

        let Some(node) = self.scene.registry().get(&id) else {
            self.context_menu = None;
            return;
        };
        let selected = node.selected;
        let focused = self.scene.focus() == Some(id.as_str());

        let mut action = None;
        egui::Area::new(egui::Id::new("node_context_menu"))
            .order(egui::Order::Foreground)
            .fixed_pos(pointer)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(RichText::new(short_label(&id, LABEL_MAX_CHARS)).strong());
                    ui.separator();
                    if ui.button("Focus").clicked() {
                        action = Some(MenuAction::Focus);
                    }
                    if ui
                        .add_enabled(focused, egui::Button::new("Flip"))
                        .on_disabled_hover_text("Only the focused node can flip.")
                        .clicked()
                    {
                        action = Some(MenuAction::Flip);
                    }
                    let selection_label = if selected { "Deselect" } else { "Select" };
                    if ui.button(selection_label).clicked() {
                        action = Some(MenuAction::ToggleSelection);
                    }
                    if ui.button("Copy name").clicked() {
                        action = Some(MenuAction::CopyName);
                    }
                });
            });

        let Some(action) = action else {
            return;
        };
        match action {
            MenuAction::Focus => {
                if self.scene.focus_node(&id, now) {
                    self.active = Some(id);
                }
            }
            MenuAction::Flip => {
                self.scene.flip_node(&id, now);
            }
            MenuAction::ToggleSelection => {
                self.scene.toggle_selection(&id);
            }
            MenuAction::CopyName => ctx.copy_text(id),
        }
        self.context_menu = None;
    }
}
