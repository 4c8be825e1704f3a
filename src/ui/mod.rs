/// UI widgets layered over the gallery
///
/// - Per-image hover menu and its positioning geometry (menu.rs)
/// - The transient reload-count indicator (notify.rs)

pub mod menu;
pub mod notify;
