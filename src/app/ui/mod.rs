mod context_menu;
mod controls;
mod details;
mod panels;

pub(super) use panels::vault_bar;
