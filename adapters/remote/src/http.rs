//! HTTP client for the dungeon service.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use dungeon_defence_core::{
    AdvanceOutcome, AdvanceReply, DungeonSnapshot, Placement, SaveRequest, SidebarMetrics,
    StartOutcome, StartSimulationReply,
};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::{DungeonService, RemoteError};

/// [`DungeonService`] implementation speaking HTTP.
#[derive(Debug, Clone)]
pub struct HttpDungeonService {
    client: Client,
    base_url: Url,
}

impl HttpDungeonService {
    /// Creates a client for the service rooted at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a client reusing an existing connection pool.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, RemoteError> {
        let mut base_url =
            Url::parse(base_url).map_err(|error| RemoteError::InvalidUrl(error.to_string()))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    /// Root URL of the service.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the push channel served next to the HTTP API.
    pub fn push_url(&self) -> Result<Url, RemoteError> {
        let mut url = self.endpoint("ws")?;
        let scheme = match url.scheme() {
            "https" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme)
            .map_err(|()| RemoteError::InvalidUrl(format!("cannot use {scheme} for {url}")))?;
        Ok(url)
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        self.base_url
            .join(path)
            .map_err(|error| RemoteError::InvalidUrl(error.to_string()))
    }

    fn snapshot_url(&self) -> Result<Url, RemoteError> {
        let mut url = self.endpoint("api/dungeon")?;
        let _ = url
            .query_pairs_mut()
            .append_pair("t", &cache_buster().to_string());
        Ok(url)
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, RemoteError>
    where
        T: DeserializeOwned,
    {
        let response = self.client.get(self.endpoint(path)?).send().await?;
        read_json(response).await
    }
}

/// Milliseconds since the epoch, appended to snapshot fetches.
fn cache_buster() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}

async fn read_text(response: Response) -> Result<String, RemoteError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(RemoteError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

async fn read_json<T>(response: Response) -> Result<T, RemoteError>
where
    T: DeserializeOwned,
{
    let body = read_text(response).await?;
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl DungeonService for HttpDungeonService {
    async fn fetch_snapshot(&self) -> Result<DungeonSnapshot, RemoteError> {
        let response = self.client.get(self.snapshot_url()?).send().await?;
        read_json(response).await
    }

    async fn fetch_metrics(&self) -> Result<SidebarMetrics, RemoteError> {
        self.get_json("api/dungeon_data").await
    }

    async fn place_entity(&self, placement: Placement) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.endpoint("api/place_entity/")?)
            .json(&placement)
            .send()
            .await?;
        let _ = read_text(response).await?;
        Ok(())
    }

    async fn start_simulation(&self) -> Result<StartOutcome, RemoteError> {
        let reply: StartSimulationReply = self.get_json("api/start_simulation/").await?;
        Ok(reply.into())
    }

    async fn advance_simulation(&self) -> Result<AdvanceOutcome, RemoteError> {
        let response = self
            .client
            .post(self.endpoint("api/move_hero")?)
            .send()
            .await?;
        let reply: AdvanceReply = read_json(response).await?;
        Ok(reply.into())
    }

    async fn reset_simulation(&self) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.endpoint("api/reset_simulation")?)
            .send()
            .await?;
        let _ = read_text(response).await?;
        Ok(())
    }

    async fn next_level(&self) -> Result<(), RemoteError> {
        let response = self
            .client
            .get(self.endpoint("api/next_level/")?)
            .send()
            .await?;
        let _ = read_text(response).await?;
        Ok(())
    }

    async fn import_dungeon(&self, definition: &serde_json::Value) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.endpoint("api/import_dungeon")?)
            .json(definition)
            .send()
            .await?;
        let _ = read_text(response).await?;
        Ok(())
    }

    async fn save_dungeon(&self, request: &SaveRequest) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.endpoint("api/save_dungeon")?)
            .json(request)
            .send()
            .await?;
        let _ = read_text(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_resolve_against_base_path() {
        let service = HttpDungeonService::new("http://127.0.0.1:8000/game").expect("valid url");

        assert_eq!(
            service.endpoint("api/dungeon_data").expect("joins").as_str(),
            "http://127.0.0.1:8000/game/api/dungeon_data"
        );
    }

    #[test]
    fn snapshot_url_is_cache_busted() {
        let service = HttpDungeonService::new("http://localhost:8000").expect("valid url");
        let url = service.snapshot_url().expect("joins");

        assert_eq!(url.path(), "/api/dungeon");
        assert!(url.query_pairs().any(|(key, value)| key == "t" && !value.is_empty()));
    }

    #[test]
    fn push_url_follows_http_scheme() {
        let plain = HttpDungeonService::new("http://localhost:8000").expect("valid url");
        let secure = HttpDungeonService::new("https://dungeon.example/").expect("valid url");

        assert_eq!(
            plain.push_url().expect("push url").as_str(),
            "ws://localhost:8000/ws"
        );
        assert_eq!(
            secure.push_url().expect("push url").as_str(),
            "wss://dungeon.example/ws"
        );
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        let error = HttpDungeonService::new("not a url").expect_err("must fail");

        assert!(matches!(error, RemoteError::InvalidUrl(_)));
    }
}
