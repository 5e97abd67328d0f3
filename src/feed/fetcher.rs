use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde_json::Value;

use crate::config::Config;
use crate::error::Result;

use super::{BoxscoreSnapshot, ScoreboardSnapshot};

pub struct FeedFetcher {
    client: Client,
    config: Config,
}

impl FeedFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.request_timeout().min(std::time::Duration::from_secs(10)))
            .user_agent("nba-live-stats/1.0")
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub async fn fetch_scoreboard(&self) -> Result<ScoreboardSnapshot> {
        let value = self.fetch_json(&self.config.scoreboard_url).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn fetch_boxscore(&self, game_id: &str) -> Result<BoxscoreSnapshot> {
        let url = self.config.boxscore_url(game_id)?;
        let value = self.fetch_json(url.as_str()).await?;

        if value.get("game").is_none() {
            return Err(anyhow::anyhow!("Missing 'game' key in boxscore for game {}", game_id).into());
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Fetch several boxscores concurrently. Results come back in completion
    /// order, each tagged with its game id.
    pub async fn fetch_boxscores(
        &self,
        game_ids: Vec<String>,
    ) -> Vec<(String, Result<BoxscoreSnapshot>)> {
        stream::iter(game_ids)
            .map(|game_id| async move {
                let result = self.fetch_boxscore(&game_id).await;
                if let Err(e) = &result {
                    tracing::debug!("Failed to fetch boxscore {}: {}", game_id, e);
                }
                (game_id, result)
            })
            .buffer_unordered(self.config.max_concurrent_boxscores.max(1))
            .collect()
            .await
    }

    async fn fetch_json(&self, url: &str) -> Result<Value> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Failed to fetch {}: HTTP {}", url, response.status()).into());
        }

        Ok(response.json().await?)
    }
}
