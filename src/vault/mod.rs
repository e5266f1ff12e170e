mod collect;
mod media;
mod metadata;

pub use collect::{VaultSnapshot, scan_vault};
