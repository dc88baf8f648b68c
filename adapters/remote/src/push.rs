//! Push channel listener.

use std::time::Duration;

use dungeon_defence_core::Event;
use futures_util::StreamExt;
use reqwest::Url;
use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Text frame the service sends after every dungeon change.
pub const DUNGEON_UPDATED: &str = "dungeon_updated";

/// Pause before reconnecting after the push channel closes.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(2000);

/// Reports whether a text frame announces a dungeon change.
#[must_use]
pub fn is_dungeon_update(frame: &str) -> bool {
    frame.trim() == DUNGEON_UPDATED
}

/// Keeps a websocket connection to the service open and forwards update
/// notifications as [`Event::PushNotified`].
#[derive(Debug, Clone)]
pub struct PushListener {
    url: Url,
    reconnect_delay: Duration,
}

impl PushListener {
    /// Creates a listener for the provided websocket URL.
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            reconnect_delay: RECONNECT_DELAY,
        }
    }

    /// Overrides the reconnect delay.
    #[must_use]
    pub fn with_reconnect_delay(mut self, reconnect_delay: Duration) -> Self {
        self.reconnect_delay = reconnect_delay;
        self
    }

    /// URL the listener connects to.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Spawns the listener. The task ends once `events` is closed.
    pub fn spawn(self, events: UnboundedSender<Event>) -> JoinHandle<()> {
        tokio::spawn(self.run(events))
    }

    async fn run(self, events: UnboundedSender<Event>) {
        loop {
            match connect_async(self.url.as_str()).await {
                Ok((mut stream, _)) => {
                    tracing::info!(url = %self.url, "push channel connected");
                    while let Some(frame) = stream.next().await {
                        match frame {
                            Ok(Message::Text(text)) if is_dungeon_update(&text) => {
                                if events.send(Event::PushNotified).is_err() {
                                    return;
                                }
                            }
                            Ok(Message::Close(_)) => break,
                            Ok(_) => {}
                            Err(error) => {
                                tracing::warn!(%error, "push channel failed");
                                break;
                            }
                        }
                    }
                    tracing::info!("push channel closed");
                }
                Err(error) => {
                    tracing::warn!(url = %self.url, %error, "push channel unavailable");
                }
            }

            if events.is_closed() {
                return;
            }
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }
}
