/// Network connectivity watcher
///
/// Maintains the viewer's cached online/offline flag by probing a known
/// endpoint on an interval and emitting only the edges. The offline→online
/// edge is the "connectivity restored" signal that releases deferred
/// reloads; deferred work waits for that edge and is never re-issued by the
/// probe loop itself.

use std::time::Duration;

use iced::futures::SinkExt;
use iced::{stream, Subscription};

/// Per-probe timeout; a probe that cannot complete quickly counts as offline
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Watch connectivity, emitting `true`/`false` on every change.
///
/// Any HTTP response from the endpoint counts as online; only failing to
/// reach it at all (connect error or timeout) counts as offline.
pub fn watch(probe_url: String, interval: Duration) -> Subscription<bool> {
    Subscription::run_with_id(
        "connectivity-watch",
        stream::channel(8, move |mut output| async move {
            let client = reqwest::Client::new();
            let mut online: Option<bool> = None;

            loop {
                let now = probe(&client, &probe_url).await;

                if online != Some(now) {
                    online = Some(now);
                    tracing::info!(online = now, "connectivity changed");
                    let _ = output.send(now).await;
                }

                tokio::time::sleep(interval).await;
            }
        }),
    )
}

async fn probe(client: &reqwest::Client, url: &str) -> bool {
    client
        .head(url)
        .timeout(PROBE_TIMEOUT)
        .send()
        .await
        .is_ok()
}
