use std::fmt;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;

use crate::config::Config;
use crate::db::Repository;
use crate::error::{RecordError, Result};
use crate::feed::{BoxscoreSnapshot, FeedFetcher, ScoreboardSnapshot};
use crate::models::{DatabaseStats, GameStatus};
use crate::normalize::{normalize_boxscore, normalize_scoreboard, Normalized, ScoreboardRows};

/// What one ingestion call wrote, plus every record it had to skip.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IngestReport {
    pub games: usize,
    pub teams: usize,
    pub game_teams: usize,
    pub players: usize,
    pub errors: Vec<RecordError>,
    /// Game ids whose boxscore could not be fetched this cycle.
    pub failed_fetches: Vec<String>,
}

impl IngestReport {
    pub fn merge(&mut self, other: IngestReport) {
        self.games += other.games;
        self.teams += other.teams;
        self.game_teams += other.game_teams;
        self.players += other.players;
        self.errors.extend(other.errors);
        self.failed_fetches.extend(other.failed_fetches);
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} games, {} teams, {} game teams, {} players ({} skipped records, {} failed fetches)",
            self.games,
            self.teams,
            self.game_teams,
            self.players,
            self.errors.len(),
            self.failed_fetches.len()
        )
    }
}

pub struct App {
    pub repository: Repository,
    fetcher: FeedFetcher,
    refresh_interval: Duration,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let repository = Repository::new(&config.db_path).await?;
        Self::with_repository(config, repository)
    }

    pub fn with_repository(config: &Config, repository: Repository) -> Result<Self> {
        Ok(Self {
            repository,
            fetcher: FeedFetcher::new(config)?,
            refresh_interval: config.refresh_interval(),
        })
    }

    /// Normalize and apply one scoreboard snapshot.
    pub async fn ingest_scoreboard(&self, snapshot: &ScoreboardSnapshot) -> Result<IngestReport> {
        let normalized = normalize_scoreboard(snapshot, Utc::now());
        self.apply_scoreboard(normalized).await
    }

    async fn apply_scoreboard(&self, normalized: Normalized<ScoreboardRows>) -> Result<IngestReport> {
        log_record_errors(&normalized.errors);
        if normalized.rows.is_empty() {
            tracing::debug!("Scoreboard snapshot had no usable games");
        }

        let report = IngestReport {
            games: normalized.rows.games.len(),
            teams: normalized.rows.teams.len(),
            game_teams: normalized.rows.game_teams.len(),
            errors: normalized.errors,
            ..Default::default()
        };

        self.repository.apply_scoreboard(normalized.rows).await?;
        tracing::debug!("Applied scoreboard: {}", report);
        Ok(report)
    }

    /// Normalize and apply one game's boxscore snapshot.
    pub async fn ingest_boxscore(&self, snapshot: &BoxscoreSnapshot) -> Result<IngestReport> {
        let normalized = normalize_boxscore(snapshot, Utc::now());
        log_record_errors(&normalized.errors);

        let report = IngestReport {
            players: normalized.rows.players.len(),
            errors: normalized.errors,
            ..Default::default()
        };

        let game_id = normalized.rows.game_id.clone();
        self.repository.apply_boxscore(normalized.rows).await?;
        tracing::debug!("Applied boxscore for {}: {}", game_id, report);
        Ok(report)
    }

    /// One refresh: the scoreboard, then boxscores for games in progress.
    /// A game is fetched once more on the poll where it turns Final, and
    /// again later only while none of its players are stored.
    pub async fn poll_once(&self) -> Result<IngestReport> {
        let snapshot = self.fetcher.fetch_scoreboard().await?;
        let normalized = normalize_scoreboard(&snapshot, Utc::now());

        let mut targets = Vec::new();
        for game in &normalized.rows.games {
            let wanted = match game.status {
                GameStatus::Live => true,
                GameStatus::Final => match self.repository.get_game(&game.game_id).await? {
                    Some(stored) if stored.status == GameStatus::Final => {
                        !self.repository.has_players(&game.game_id).await?
                    }
                    _ => true,
                },
                GameStatus::Scheduled => false,
            };
            if wanted {
                targets.push(game.game_id.clone());
            }
        }

        let mut report = self.apply_scoreboard(normalized).await?;

        // Fetched concurrently, applied one game at a time.
        for (game_id, result) in self.fetcher.fetch_boxscores(targets).await {
            match result {
                Ok(boxscore) => report.merge(self.ingest_boxscore(&boxscore).await?),
                Err(e) => {
                    tracing::warn!("Skipping boxscore for {}: {}", game_id, e);
                    report.failed_fetches.push(game_id);
                }
            }
        }

        Ok(report)
    }

    /// Poll on the configured interval until interrupted. A failed cycle is
    /// logged and the next one runs on schedule.
    pub async fn run(&self) -> Result<()> {
        let mut ticker = tokio::time::interval(self.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.poll_once().await {
                        Ok(report) => tracing::info!("Poll complete: {}", report),
                        Err(e) => tracing::error!("Poll failed: {}", e),
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutting down");
                    return Ok(());
                }
            }
        }
    }

    pub async fn import_scoreboard(&self, path: &Path) -> Result<IngestReport> {
        let content = tokio::fs::read_to_string(path).await?;
        let snapshot: ScoreboardSnapshot = serde_json::from_str(&content)?;
        self.ingest_scoreboard(&snapshot).await
    }

    pub async fn import_boxscore(&self, path: &Path) -> Result<IngestReport> {
        let content = tokio::fs::read_to_string(path).await?;
        let snapshot: BoxscoreSnapshot = serde_json::from_str(&content)?;
        self.ingest_boxscore(&snapshot).await
    }

    pub async fn stats(&self) -> Result<DatabaseStats> {
        self.repository.stats().await
    }

    /// Explicit administrative reset. Never called by ingestion.
    pub async fn reset(&self) -> Result<()> {
        self.repository.reset().await
    }
}

fn log_record_errors(errors: &[RecordError]) {
    for err in errors {
        tracing::warn!(kind = %err.kind, record = %err.record, "Skipped record: {}", err.reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, AWAY_ID, GAME_ID, HOME_ID};
    use serde_json::{json, Value};
    use std::io::Write;

    fn config() -> Config {
        Config {
            db_path: ":memory:".to_string(),
            scoreboard_url: "http://127.0.0.1:9/scoreboard.json".to_string(),
            boxscore_url_template: "http://127.0.0.1:9/boxscore_{game_id}.json".to_string(),
            refresh_interval_seconds: 30,
            max_concurrent_boxscores: 2,
            request_timeout_seconds: 1,
        }
    }

    async fn app() -> App {
        let repository = Repository::open_in_memory().await.unwrap();
        App::with_repository(&config(), repository).unwrap()
    }

    async fn stub_app(base: &str) -> App {
        let config = Config {
            scoreboard_url: format!("{}/scoreboard.json", base),
            boxscore_url_template: format!("{}/boxscore_{{game_id}}.json", base),
            ..config()
        };
        let repository = Repository::open_in_memory().await.unwrap();
        App::with_repository(&config, repository).unwrap()
    }

    async fn serve(server: &mut mockito::ServerGuard, path: &str, body: Value) -> mockito::Mock {
        server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    fn scoreboard_body(games: Vec<Value>) -> Value {
        json!({"scoreboard": {"gameDate": "2024-10-22", "games": games}})
    }

    fn boxscore_body(points: u32) -> Value {
        json!({
            "game": {
                "gameId": GAME_ID,
                "homeTeam": {"teamId": HOME_ID, "players": [fixtures::box_player(201939, "1", "1", points)]},
                "awayTeam": {"teamId": AWAY_ID, "players": []}
            }
        })
    }

    fn game_with_status(status: i64) -> Value {
        fixtures::scoreboard_game(
            GAME_ID,
            status,
            fixtures::team_side(HOME_ID, "BOS", 101, Some(30)),
            fixtures::team_side(AWAY_ID, "NYK", 99, Some(22)),
        )
    }

    #[tokio::test]
    async fn ingest_reports_skipped_sides() {
        let app = app().await;
        let snapshot = fixtures::scoreboard(vec![
            fixtures::scoreboard_game(
                GAME_ID,
                2,
                fixtures::team_side(HOME_ID, "BOS", 50, None),
                fixtures::team_side(AWAY_ID, "NYK", 48, Some(25)),
            ),
            fixtures::scoreboard_game(
                "0022400002",
                1,
                fixtures::team_side(1610612747, "LAL", 0, Some(0)),
                fixtures::team_side(1610612750, "MIN", 0, Some(0)),
            ),
        ]);

        let report = app.ingest_scoreboard(&snapshot).await.unwrap();

        assert_eq!((report.games, report.teams, report.game_teams), (2, 4, 3));
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].record, format!("{}/{}", GAME_ID, HOME_ID));

        let sides = app.repository.get_game_teams(GAME_ID).await.unwrap();
        assert_eq!(sides.len(), 1);
        assert_eq!(sides[0].team_id, AWAY_ID);
        assert_eq!(app.repository.get_game_teams("0022400002").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn ingest_boxscore_counts_players_who_played() {
        let app = app().await;
        let snapshot = fixtures::boxscore(
            GAME_ID,
            vec![
                fixtures::box_player(201939, "1", "1", 20),
                fixtures::box_player(201940, "0", "0", 0),
            ],
            vec![fixtures::box_player(1628969, "1", "0", 9)],
        );

        let report = app.ingest_boxscore(&snapshot).await.unwrap();

        assert_eq!(report.players, 2);
        assert!(report.errors.is_empty());
        assert_eq!(app.stats().await.unwrap().total_players, 2);
    }

    #[tokio::test]
    async fn imports_saved_snapshots() {
        let app = app().await;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let payload = serde_json::json!({
            "scoreboard": {
                "games": [fixtures::scoreboard_game(
                    GAME_ID,
                    3,
                    fixtures::team_side(HOME_ID, "BOS", 110, Some(30)),
                    fixtures::team_side(AWAY_ID, "NYK", 104, Some(22)),
                )]
            }
        });
        write!(file, "{}", payload).unwrap();

        let report = app.import_scoreboard(file.path()).await.unwrap();

        assert_eq!(report.games, 1);
        let sides = app.repository.get_game_teams(GAME_ID).await.unwrap();
        assert_eq!(
            sides.iter().map(|s| s.points_period1).collect::<Vec<_>>(),
            vec![30, 22]
        );
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let app = app().await;
        app.ingest_scoreboard(&fixtures::live_scoreboard()).await.unwrap();
        assert_eq!(app.stats().await.unwrap().as_tuple(), (1, 2, 0));

        app.reset().await.unwrap();

        assert_eq!(app.stats().await.unwrap().as_tuple(), (0, 0, 0));
    }

    #[test]
    fn reports_merge() {
        let mut total = IngestReport {
            games: 1,
            teams: 2,
            game_teams: 2,
            ..Default::default()
        };
        total.merge(IngestReport {
            players: 11,
            failed_fetches: vec![GAME_ID.to_string()],
            ..Default::default()
        });

        assert_eq!(total.players, 11);
        assert_eq!(total.failed_fetches, vec![GAME_ID.to_string()]);
        assert_eq!(
            total.to_string(),
            "1 games, 2 teams, 2 game teams, 11 players (0 skipped records, 1 failed fetches)"
        );
    }

    #[tokio::test]
    async fn unreachable_feed_is_an_error() {
        let app = app().await;
        tokio_test::assert_err!(app.poll_once().await);
        assert_eq!(app.stats().await.unwrap().as_tuple(), (0, 0, 0));
    }

    #[tokio::test]
    async fn final_poll_captures_the_closing_box() {
        let mut server = mockito::Server::new_async().await;
        let app = stub_app(&server.url()).await;
        let boxscore_path = format!("/boxscore_{}.json", GAME_ID);

        let live = serve(&mut server, "/scoreboard.json", scoreboard_body(vec![game_with_status(2)])).await;
        let live_box = serve(&mut server, &boxscore_path, boxscore_body(20)).await;
        let report = app.poll_once().await.unwrap();
        assert_eq!((report.games, report.players), (1, 1));
        assert_eq!(app.repository.get_players(GAME_ID).await.unwrap()[0].points, 20);
        live.remove_async().await;
        live_box.remove_async().await;

        let _final = serve(&mut server, "/scoreboard.json", scoreboard_body(vec![game_with_status(3)])).await;
        let final_box = serve(&mut server, &boxscore_path, boxscore_body(31)).await;
        let report = app.poll_once().await.unwrap();
        assert_eq!(report.players, 1);
        assert!(report.failed_fetches.is_empty());
        assert_eq!(app.repository.get_players(GAME_ID).await.unwrap()[0].points, 31);
        final_box.remove_async().await;

        // Already Final with players stored, so the boxscore is not requested.
        let report = app.poll_once().await.unwrap();
        assert_eq!(report.games, 1);
        assert_eq!(report.players, 0);
        assert!(report.failed_fetches.is_empty());
        assert_eq!(app.repository.get_players(GAME_ID).await.unwrap()[0].points, 31);
    }

    #[tokio::test]
    async fn rejected_entries_are_not_fetched() {
        let mut server = mockito::Server::new_async().await;
        let app = stub_app(&server.url()).await;
        let shared = fixtures::scoreboard_game(
            "0022400009",
            2,
            fixtures::team_side(HOME_ID, "BOS", 10, Some(10)),
            fixtures::team_side(HOME_ID, "BOS", 8, Some(8)),
        );
        let mut blank = game_with_status(2);
        blank["gameId"] = json!("");
        let _board = serve(&mut server, "/scoreboard.json", scoreboard_body(vec![shared, blank])).await;

        let report = app.poll_once().await.unwrap();

        assert_eq!(report.games, 0);
        assert_eq!(report.errors.len(), 2);
        assert!(report.failed_fetches.is_empty());
        assert_eq!(app.stats().await.unwrap().as_tuple(), (0, 0, 0));
    }
}
