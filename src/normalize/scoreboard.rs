use chrono::{DateTime, Utc};

use crate::error::{RecordError, RecordKind};
use crate::feed::{ScoreboardGame, ScoreboardSnapshot, TeamSide};
use crate::models::{Game, GameStatus, GameTeam, Team};

use super::Normalized;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreboardRows {
    pub games: Vec<Game>,
    pub teams: Vec<Team>,
    pub game_teams: Vec<GameTeam>,
}

impl ScoreboardRows {
    pub fn is_empty(&self) -> bool {
        self.games.is_empty() && self.teams.is_empty() && self.game_teams.is_empty()
    }
}

pub fn normalize_scoreboard(
    snapshot: &ScoreboardSnapshot,
    processed_at: DateTime<Utc>,
) -> Normalized<ScoreboardRows> {
    let mut rows = ScoreboardRows::default();
    let mut errors = Vec::new();

    for (label, entry) in snapshot.entries() {
        let game = match entry {
            Ok(game) => game,
            Err(e) => {
                errors.push(RecordError::new(RecordKind::Game, label, e.to_string()));
                continue;
            }
        };

        if let Err(err) = push_game(&mut rows, &mut errors, &label, game, processed_at) {
            errors.push(err);
        }
    }

    Normalized { rows, errors }
}

/// Maps one entry. A returned error rejects the whole entry; a side with no
/// period data only drops that side's game-team row.
fn push_game(
    rows: &mut ScoreboardRows,
    errors: &mut Vec<RecordError>,
    label: &str,
    game: ScoreboardGame,
    processed_at: DateTime<Utc>,
) -> Result<(), RecordError> {
    if game.game_id.trim().is_empty() {
        return Err(RecordError::new(RecordKind::Game, label, "empty gameId"));
    }

    let status = GameStatus::try_from(game.game_status).map_err(|code| {
        RecordError::new(
            RecordKind::Game,
            &game.game_id,
            format!("unknown gameStatus {}", code),
        )
    })?;

    if game.home_team.team_id == game.away_team.team_id {
        return Err(RecordError::new(
            RecordKind::Game,
            &game.game_id,
            format!("home and away share teamId {}", game.home_team.team_id),
        ));
    }

    rows.games.push(Game {
        game_id: game.game_id.clone(),
        status,
        status_text: game.game_status_text,
        period: game.period,
        game_clock: game.game_clock,
        game_time_utc: game.game_time_utc.filter(|s| !s.is_empty()),
        game_et: game.game_et.filter(|s| !s.is_empty()),
        regulation_periods: game.regulation_periods,
        series_game_number: game.series_game_number,
        series_text: game.series_text,
        last_updated: processed_at,
    });

    for (side, is_home) in [(&game.home_team, true), (&game.away_team, false)] {
        rows.teams.push(team_row(side));
        match game_team_row(&game.game_id, side, is_home, processed_at) {
            Ok(row) => rows.game_teams.push(row),
            Err(err) => errors.push(err),
        }
    }

    Ok(())
}

fn team_row(side: &TeamSide) -> Team {
    Team {
        team_id: side.team_id,
        team_name: side.team_name.clone(),
        team_city: side.team_city.clone(),
        team_tricode: side.team_tricode.clone(),
        wins: side.wins,
        losses: side.losses,
    }
}

fn game_team_row(
    game_id: &str,
    side: &TeamSide,
    is_home: bool,
    processed_at: DateTime<Utc>,
) -> Result<GameTeam, RecordError> {
    let first_period = side.periods.first().ok_or_else(|| {
        RecordError::new(
            RecordKind::GameTeam,
            format!("{}/{}", game_id, side.team_id),
            "missing period data",
        )
    })?;

    Ok(GameTeam {
        game_id: game_id.to_string(),
        team_id: side.team_id,
        is_home,
        score: side.score,
        in_bonus: side.in_bonus.clone(),
        timeouts_remaining: side.timeouts_remaining,
        points_period1: first_period.score,
        last_updated: processed_at,
    })
}
