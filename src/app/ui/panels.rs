use std::path::PathBuf;

use eframe::egui::{self, Align, Context, Key, Layout, Ui};

use crate::config::EngineConfig;
use crate::engine::{ListenerKind, Scene};
use crate::vault::VaultSnapshot;

use super::super::{VaultControls, VaultRequest, ViewModel};

/// Editable vault path; Enter or "Open" asks for that vault.
pub(in crate::app) fn vault_bar(ui: &mut Ui, vault: &mut VaultControls) {
    ui.label("vault:");
    let response = ui.add(
        egui::TextEdit::singleline(&mut vault.input)
            .desired_width(280.0)
            .hint_text("path to a dream vault"),
    );
    let submitted = response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter));
    if ui.button("Open").clicked() || submitted {
        let path = vault.input.trim();
        if !path.is_empty() {
            vault.request = Some(VaultRequest::Open(PathBuf::from(path)));
        }
    }
}

impl ViewModel {
    pub(in crate::app) fn new(config: EngineConfig, snapshot: VaultSnapshot, now: f64) -> Self {
        let mut scene = Scene::new(config);
        let pointer_listener = scene.listeners().register(ListenerKind::Pointer);
        let keyboard_listener = scene.listeners().register(ListenerKind::Keyboard);
        scene.sync_nodes(snapshot.nodes, now);

        Self {
            scene,
            vault_root: snapshot.root,
            revision: 0,
            search: String::new(),
            search_match_cache: None,
            active: None,
            context_menu: None,
            show_relations: true,
            show_labels: true,
            events: Vec::new(),
            _pointer_listener: pointer_listener,
            _keyboard_listener: keyboard_listener,
        }
    }

    /// Folds a rescan into the live scene without resetting it.
    pub(in crate::app) fn apply_snapshot(&mut self, snapshot: VaultSnapshot, now: f64) {
        self.vault_root = snapshot.root;
        let report = self.scene.sync_nodes(snapshot.nodes, now);
        if report.is_empty() {
            return;
        }

        self.revision += 1;
        let registry = self.scene.registry();
        if self.active.as_deref().is_some_and(|id| !registry.contains(id)) {
            self.active = None;
        }
        if self
            .context_menu
            .as_ref()
            .is_some_and(|menu| !registry.contains(&menu.id))
        {
            self.context_menu = None;
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        vault: &mut VaultControls,
        is_scanning: bool,
    ) {
        let now = ctx.input(|input| input.time);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("dream-space");
                    ui.separator();
                    vault_bar(ui, vault);
                    let rescan_button =
                        ui.add_enabled(!is_scanning, egui::Button::new("Rescan"));
                    if rescan_button.clicked() {
                        vault.request = Some(VaultRequest::Rescan);
                    }
                    ui.separator();
                    ui.label(format!("nodes: {}", self.scene.registry().len()));
                    ui.label(format!("layout: {}", self.scene.mode().label()));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if is_scanning {
                            ui.spinner();
                            ui.label("scanning");
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui, now));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui, now));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_scene(ui));

        self.draw_context_menu(ctx, now);
    }
}
