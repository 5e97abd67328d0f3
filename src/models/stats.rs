use serde::{Deserialize, Serialize};

/// Distinct games, teams and players currently held in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub total_games: i64,
    pub total_teams: i64,
    pub total_players: i64,
}

impl DatabaseStats {
    #[cfg(test)]
    pub fn as_tuple(&self) -> (i64, i64, i64) {
        (self.total_games, self.total_teams, self.total_players)
    }
}
