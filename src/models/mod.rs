//! Data structures for the football tournament: teams, matches, bracket and snapshot.

mod game;
mod team;
mod tournament;

pub use game::{Match, MatchId, MatchStatus, Side, TimeSlot};
pub use team::{QualifiedTeam, Team, TeamStats};
pub use tournament::{
    KnockoutBracket, KnockoutRound, MatchLocation, TournamentError, TournamentMatches,
};
