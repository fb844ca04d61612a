//! Team, TeamStats and the derived QualifiedTeam standings row.

use serde::{Deserialize, Serialize};

/// Accumulated group-stage record. Only `record` mutates it, so `played = won + drawn + lost`
/// and `points = 3 * won + drawn` always hold.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
}

impl TeamStats {
    pub const WIN_POINTS: u32 = 3;
    pub const DRAW_POINTS: u32 = 1;

    /// Record one played match from this team's perspective.
    pub fn record(&mut self, scored: u32, conceded: u32) {
        // Scores come straight from referee input; totals saturate instead of wrapping.
        self.played = self.played.saturating_add(1);
        self.goals_for = self.goals_for.saturating_add(scored);
        self.goals_against = self.goals_against.saturating_add(conceded);
        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => {
                self.won = self.won.saturating_add(1);
                self.points = self.points.saturating_add(Self::WIN_POINTS);
            }
            std::cmp::Ordering::Equal => {
                self.drawn = self.drawn.saturating_add(1);
                self.points = self.points.saturating_add(Self::DRAW_POINTS);
            }
            std::cmp::Ordering::Less => {
                self.lost = self.lost.saturating_add(1);
            }
        }
    }

    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }
}

/// A team in the roster. Stats are carried for serialization compatibility; standings are always
/// recomputed from matches, never read from here.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub group: u32,
    #[serde(flatten)]
    pub stats: TeamStats,
}

impl Team {
    /// Create a team with a zeroed record.
    pub fn new(name: impl Into<String>, group: u32) -> Self {
        Self {
            name: name.into(),
            group,
            stats: TeamStats::default(),
        }
    }
}

/// One row of computed standings: a team with its 1-based finishing position in its group.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct QualifiedTeam {
    pub name: String,
    pub group: u32,
    pub position: u32,
    #[serde(flatten)]
    pub stats: TeamStats,
}

impl QualifiedTeam {
    pub fn goal_difference(&self) -> i64 {
        self.stats.goal_difference()
    }
}
