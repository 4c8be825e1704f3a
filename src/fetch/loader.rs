/// Image fetching and decoding
///
/// Downloads image data over HTTP and decodes it into pixels the renderer
/// can display. Decoding is CPU-bound, so it runs on a blocking thread and
/// never stalls the UI loop.

use iced::widget::image::Handle;
use thiserror::Error;
use tokio::task;

/// A successfully fetched and decoded image
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub handle: Handle,
    /// Intrinsic pixel dimensions of the decoded data
    pub width: u32,
    pub height: u32,
}

/// Why a load attempt failed.
///
/// Carries rendered strings rather than source errors so it stays `Clone`
/// and can ride inside an application message.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("server returned status {0}")]
    Status(u16),
    #[error("failed to decode image data: {0}")]
    Decode(String),
    #[error("decode task cancelled")]
    Cancelled,
}

/// Fetch and decode the image at `url`.
///
/// Every failure is recoverable from the caller's point of view; the retry
/// machinery decides what happens next.
pub async fn fetch_image(client: reqwest::Client, url: String) -> Result<LoadedImage, LoadError> {
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| LoadError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status(status.as_u16()));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| LoadError::Request(e.to_string()))?;

    // Decode off the async runtime; image parsing is pure CPU work
    task::spawn_blocking(move || decode_image(&bytes))
        .await
        .map_err(|_| LoadError::Cancelled)?
}

/// Decode raw bytes into an RGBA handle
fn decode_image(bytes: &[u8]) -> Result<LoadedImage, LoadError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| LoadError::Decode(e.to_string()))?;

    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(LoadedImage {
        handle: Handle::from_rgba(width, height, rgba.into_raw()),
        width,
        height,
    })
}
