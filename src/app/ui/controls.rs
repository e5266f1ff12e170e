use eframe::egui::{self, Ui};

use crate::engine::LayoutMode;
use crate::util::short_label;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui, now: f64) {
        ui.heading("Layout");
        ui.separator();
        ui.add_space(4.0);

        let mode = self.scene.mode().clone();
        ui.horizontal_wrapped(|ui| {
            if ui
                .selectable_label(mode == LayoutMode::Sphere, "Sphere")
                .on_hover_text("Spread every node over a sphere around the origin.")
                .clicked()
            {
                self.scene.apply_layout(LayoutMode::Sphere, now);
            }
            if ui
                .selectable_label(mode == LayoutMode::Grid, "Grid")
                .on_hover_text("Arrange every node on a flat grid.")
                .clicked()
            {
                self.scene.apply_layout(LayoutMode::Grid, now);
            }
        });

        ui.horizontal(|ui| {
            if ui.button("Toggle (G)").clicked() {
                self.scene.toggle_layout(now);
            }
            if ui
                .button("Reset (Esc)")
                .on_hover_text("Clear the focus, return to the sphere and reset the camera.")
                .clicked()
            {
                self.context_menu = None;
                self.scene.cancel(now);
            }
        });

        match self.scene.focus() {
            Some(focus) => ui.label(format!("Focused: {}", short_label(focus, 40))),
            None => ui.label("No node in focus"),
        };

        ui.separator();
        ui.heading("Display");

        let mut distance_scaling = self.scene.distance_scaling();
        if ui
            .checkbox(&mut distance_scaling, "Scale by camera distance")
            .on_hover_text("Nodes near the camera grow, distant ones shrink.")
            .changed()
        {
            self.scene.set_distance_scaling(distance_scaling, now);
        }
        ui.checkbox(&mut self.show_relations, "Relation lines");
        ui.checkbox(&mut self.show_labels, "Labels");

        ui.separator();
        ui.label("Search")
            .on_hover_text("Fuzzy-highlight nodes by name.");
        ui.text_edit_singleline(&mut self.search);

        if let Some(matches) = self.cached_search_matches() {
            let nodes = self.scene.registry().nodes();
            let mut ids = matches
                .iter()
                .filter_map(|&index| nodes.get(index).map(|node| node.id.clone()))
                .collect::<Vec<_>>();
            ids.sort();

            ui.label(format!("{} matching nodes", ids.len()));
            let mut focus_request = None;
            egui::ScrollArea::vertical()
                .id_salt("search_matches_scroll")
                .max_height(280.0)
                .auto_shrink([false, false])
                .show_rows(ui, 22.0, ids.len(), |ui, row_range| {
                    for index in row_range {
                        let Some(id) = ids.get(index) else {
                            continue;
                        };
                        if ui
                            .link(short_label(id, 40))
                            .on_hover_text(id.as_str())
                            .clicked()
                        {
                            focus_request = Some(id.clone());
                        }
                    }
                });

            if let Some(id) = focus_request
                && self.scene.focus_node(&id, now)
            {
                self.active = Some(id);
            }
        }

        ui.separator();
        ui.small(
            "Click: focus, click again: flip. Shift-click: select. \
             Right click: menu. Right drag: orbit. Scroll: zoom.",
        );
    }
}
