use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use eframe::egui::{self, Context, Pos2};

use crate::config::EngineConfig;
use crate::engine::{ListenerGuard, Scene, SceneEvent};

mod render_utils;
mod scan;
mod ui;
mod view;

use scan::{ScanPoll, VaultScanner};
use ui::vault_bar;

pub struct DreamSpaceApp {
    config: EngineConfig,
    scanner: VaultScanner,
    vault: VaultControls,
    state: AppState,
}

enum VaultRequest {
    Rescan,
    Open(PathBuf),
}

/// The editable vault path and what the user asked for this frame.
struct VaultControls {
    input: String,
    request: Option<VaultRequest>,
}

enum AppState {
    Loading,
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    scene: Scene,
    vault_root: PathBuf,
    /// Bumped on every vault sync; keys the search cache.
    revision: u64,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    active: Option<String>,
    context_menu: Option<ContextMenuState>,
    show_relations: bool,
    show_labels: bool,
    events: Vec<SceneEvent>,
    _pointer_listener: ListenerGuard,
    _keyboard_listener: ListenerGuard,
}

struct SearchMatchCache {
    query: String,
    revision: u64,
    matches: Arc<HashSet<usize>>,
}

struct ContextMenuState {
    id: String,
    pointer: Pos2,
}

impl DreamSpaceApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, vault_path: PathBuf, config: EngineConfig) -> Self {
        let vault = VaultControls {
            input: vault_path.display().to_string(),
            request: None,
        };
        let mut scanner = VaultScanner::new(vault_path);
        scanner.start();
        Self {
            config,
            scanner,
            vault,
            state: AppState::Loading,
        }
    }

    /// Starts the scan the user asked for. Returns `true` when the scene
    /// has to be rebuilt from scratch.
    fn handle_vault_request(&mut self) -> bool {
        match self.vault.request.take() {
            Some(VaultRequest::Open(path)) if path.as_path() != self.scanner.vault_path() => {
                self.scanner.open(path);
                true
            }
            Some(VaultRequest::Open(_) | VaultRequest::Rescan) => {
                if !self.scanner.is_scanning() {
                    self.scanner.start();
                }
                false
            }
            None => false,
        }
    }
}

impl eframe::App for DreamSpaceApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|input| input.time);
        let mut transition = None;

        match &mut self.state {
            AppState::Loading => {
                match self.scanner.poll() {
                    ScanPoll::Finished(Ok(snapshot)) => {
                        let model = ViewModel::new(self.config.clone(), snapshot, now);
                        transition = Some(AppState::Ready(Box::new(model)));
                    }
                    ScanPoll::Finished(Err(error)) => transition = Some(AppState::Error(error)),
                    ScanPoll::Pending | ScanPoll::Idle => {}
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Scanning dream vault...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to scan the dream vault");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if ui.button("Retry").clicked() {
                            self.vault.request = Some(VaultRequest::Rescan);
                        }
                        ui.separator();
                        vault_bar(ui, &mut self.vault);
                    });
                });
                if self.vault.request.is_some() {
                    transition = Some(AppState::Loading);
                }
            }
            AppState::Ready(model) => {
                let is_scanning = self.scanner.is_scanning();
                model.show(ctx, &mut self.vault, is_scanning);

                match self.scanner.poll() {
                    ScanPoll::Finished(Ok(snapshot)) => model.apply_snapshot(snapshot, now),
                    ScanPoll::Finished(Err(error)) => transition = Some(AppState::Error(error)),
                    ScanPoll::Pending => ctx.request_repaint(),
                    ScanPoll::Idle => {}
                }
            }
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
        if self.handle_vault_request() {
            self.state = AppState::Loading;
        }
    }
}
