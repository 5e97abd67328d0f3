pub const TABLES: [&str; 4] = ["games", "teams", "game_teams", "players"];

pub const SCHEMA: &str = r#"
-- games table (scoreboard feed)
CREATE TABLE IF NOT EXISTS games (
    game_id TEXT PRIMARY KEY NOT NULL,
    game_status INTEGER NOT NULL CHECK (game_status IN (1, 2, 3)),
    game_status_text TEXT NOT NULL,
    period INTEGER NOT NULL DEFAULT 0,
    game_clock TEXT NOT NULL DEFAULT '',
    game_time_utc TEXT,
    game_et TEXT,
    regulation_periods INTEGER NOT NULL,
    series_game_number TEXT,
    series_text TEXT,
    last_updated TEXT NOT NULL
);

-- teams table (shared across games, last write wins)
CREATE TABLE IF NOT EXISTS teams (
    team_id INTEGER PRIMARY KEY NOT NULL,
    team_name TEXT NOT NULL,
    team_city TEXT NOT NULL,
    team_tricode TEXT NOT NULL,
    wins INTEGER NOT NULL DEFAULT 0,
    losses INTEGER NOT NULL DEFAULT 0
);

-- game_teams table (one row per side per game)
CREATE TABLE IF NOT EXISTS game_teams (
    game_id TEXT NOT NULL REFERENCES games(game_id),
    team_id INTEGER NOT NULL REFERENCES teams(team_id),
    is_home INTEGER NOT NULL,
    score INTEGER NOT NULL DEFAULT 0,
    in_bonus TEXT,
    timeouts_remaining INTEGER NOT NULL DEFAULT 0,
    points_period1 INTEGER NOT NULL DEFAULT 0,
    last_updated TEXT NOT NULL,
    PRIMARY KEY (game_id, team_id)
);

CREATE INDEX IF NOT EXISTS idx_game_teams_game_id ON game_teams(game_id);

-- players table (boxscore feed, one row per player per game)
CREATE TABLE IF NOT EXISTS players (
    player_id INTEGER NOT NULL,
    game_id TEXT NOT NULL,
    team_id INTEGER NOT NULL,
    jersey_num TEXT NOT NULL DEFAULT '',
    name TEXT NOT NULL,
    position TEXT NOT NULL DEFAULT '',
    starter INTEGER NOT NULL DEFAULT 0,
    minutes TEXT NOT NULL DEFAULT '',
    points INTEGER NOT NULL DEFAULT 0,
    rebounds INTEGER NOT NULL DEFAULT 0,
    assists INTEGER NOT NULL DEFAULT 0,
    field_goals_made INTEGER NOT NULL DEFAULT 0,
    field_goals_attempted INTEGER NOT NULL DEFAULT 0,
    field_goals_percentage REAL NOT NULL DEFAULT 0,
    three_pointers_made INTEGER NOT NULL DEFAULT 0,
    three_pointers_attempted INTEGER NOT NULL DEFAULT 0,
    free_throws_made INTEGER NOT NULL DEFAULT 0,
    free_throws_attempted INTEGER NOT NULL DEFAULT 0,
    plus_minus REAL NOT NULL DEFAULT 0,
    last_updated TEXT NOT NULL,
    PRIMARY KEY (player_id, game_id)
);

CREATE INDEX IF NOT EXISTS idx_players_game_id ON players(game_id);
"#;

// Children first so foreign keys never dangle mid-drop.
pub const DROP_SCHEMA: &str = r#"
DROP TABLE IF EXISTS players;
DROP TABLE IF EXISTS game_teams;
DROP TABLE IF EXISTS teams;
DROP TABLE IF EXISTS games;
"#;
