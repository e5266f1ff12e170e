use eframe::egui::{self, RichText, Ui};

use crate::engine::{Face, FlipPhase};
use crate::util::{short_label, yes_no};

use super::super::ViewModel;

fn face_label(flip: FlipPhase) -> &'static str {
    match flip {
        FlipPhase::Front => "front",
        FlipPhase::Back => "back",
        FlipPhase::Rotating {
            toward: Face::Front,
        } => "turning to front",
        FlipPhase::Rotating { toward: Face::Back } => "turning to back",
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui, now: f64) {
        ui.heading("Node Details");
        ui.add_space(6.0);

        if let Some(active) = self.active.clone() {
            self.draw_node_details(ui, &active, now);
        } else {
            ui.label("Click a node to see its details.");
        }

        ui.separator();
        self.draw_selection(ui);
    }

    fn draw_node_details(&mut self, ui: &mut Ui, id: &str, now: f64) {
        let Some(node) = self.scene.registry().get(id) else {
            ui.label("This node is no longer in the vault.");
            return;
        };

        let category = node.metadata.category.label().to_owned();
        let face = face_label(node.flip);
        let media = node.media;
        let selected = node.selected;
        let focused = self.scene.focus() == Some(id);
        let relations = node
            .metadata
            .relations
            .iter()
            .map(|relation| (relation.clone(), self.scene.registry().contains(relation)))
            .collect::<Vec<_>>();

        ui.label(RichText::new(id).strong());
        ui.small(self.vault_root.join(id).display().to_string());
        ui.add_space(6.0);

        ui.label(format!("Category: {category}"));
        ui.label(format!("Face: {face}"));
        ui.label(format!("In focus: {}", yes_no(focused)));
        ui.label(format!("Selected: {}", yes_no(selected)));
        ui.label(format!("DreamTalk media: {}", yes_no(media.dream_talk)));
        ui.label(format!("DreamSong canvas: {}", yes_no(media.dream_song)));

        ui.separator();
        ui.label(RichText::new("Related nodes").strong());
        if relations.is_empty() {
            ui.label("No relations declared.");
            return;
        }

        let mut focus_request = None;
        egui::ScrollArea::vertical()
            .id_salt("related_nodes_scroll")
            .max_height(320.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for (relation, present) in &relations {
                    if !present {
                        ui.weak(format!("{} (not in vault)", short_label(relation, 40)));
                        continue;
                    }
                    if ui
                        .link(short_label(relation, 40))
                        .on_hover_text(relation.as_str())
                        .clicked()
                    {
                        focus_request = Some(relation.clone());
                    }
                }
            });

        if let Some(relation) = focus_request
            && self.scene.focus_node(&relation, now)
        {
            self.active = Some(relation);
        }
    }

    fn draw_selection(&mut self, ui: &mut Ui) {
        let selected = self
            .scene
            .registry()
            .iter()
            .filter(|node| node.selected)
            .map(|node| node.id.clone())
            .collect::<Vec<_>>();

        ui.label(RichText::new(format!("Selection ({})", selected.len())).strong());
        if selected.is_empty() {
            ui.small("Shift-click nodes to select several.");
            return;
        }

        for id in &selected {
            ui.label(short_label(id, 40));
        }
        if ui.button("Clear selection").clicked() {
            self.scene.clear_selection();
        }
    }
}
