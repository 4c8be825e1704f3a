/// State management module
///
/// This module handles all application state, including:
/// - Monitored image records and their side table (monitor.rs)
/// - The per-image retry state machine (retry.rs)
/// - The reload counter and notification display state (notify.rs)

pub mod monitor;
pub mod notify;
pub mod retry;
