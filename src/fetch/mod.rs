/// Network layer
///
/// This module talks to the outside world:
/// - Fetching and decoding image data (loader.rs)
/// - Watching network connectivity (connectivity.rs)

pub mod connectivity;
pub mod loader;
