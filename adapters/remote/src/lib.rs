#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Remote dungeon service adapter.
//!
//! The service is authoritative for the dungeon, the heroes and the campaign.
//! This crate exposes its HTTP contract through the [`DungeonService`] port and
//! listens to its `/ws` push channel.

mod http;
mod push;

use async_trait::async_trait;
use dungeon_defence_core::{
    AdvanceOutcome, DungeonSnapshot, Placement, SaveRequest, SidebarMetrics, StartOutcome,
};
use thiserror::Error;

pub use http::HttpDungeonService;
pub use push::{is_dungeon_update, PushListener, DUNGEON_UPDATED, RECONNECT_DELAY};

/// Port for every request the client issues to the dungeon service.
#[async_trait]
pub trait DungeonService: Send + Sync {
    /// Fetches the current dungeon snapshot, bypassing intermediate caches.
    async fn fetch_snapshot(&self) -> Result<DungeonSnapshot, RemoteError>;

    /// Fetches the sidebar metrics.
    async fn fetch_metrics(&self) -> Result<SidebarMetrics, RemoteError>;

    /// Places an entity on a cell.
    async fn place_entity(&self, placement: Placement) -> Result<(), RemoteError>;

    /// Starts the simulation.
    async fn start_simulation(&self) -> Result<StartOutcome, RemoteError>;

    /// Moves every hero one step.
    async fn advance_simulation(&self) -> Result<AdvanceOutcome, RemoteError>;

    /// Resets the simulation to its editing state.
    async fn reset_simulation(&self) -> Result<(), RemoteError>;

    /// Moves the campaign on to the next level.
    async fn next_level(&self) -> Result<(), RemoteError>;

    /// Replaces the dungeon with an external definition.
    async fn import_dungeon(&self, definition: &serde_json::Value) -> Result<(), RemoteError>;

    /// Persists the dungeon.
    async fn save_dungeon(&self, request: &SaveRequest) -> Result<(), RemoteError>;
}

/// Failures talking to the dungeon service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request never produced a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The service answered with a non-2xx status.
    #[error("service rejected the request ({status}): {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Text body explaining the rejection.
        body: String,
    },
    /// The response body did not match the expected shape.
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    /// A service URL could not be built.
    #[error("invalid service url: {0}")]
    InvalidUrl(String),
}

impl RemoteError {
    /// Text body of a rejection, if the service answered with one.
    #[must_use]
    pub fn rejection(&self) -> Option<&str> {
        match self {
            Self::Rejected { body, .. } => Some(body.as_str()),
            _ => None,
        }
    }
}
