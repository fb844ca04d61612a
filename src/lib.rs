//! Football tournament web app: library with models, standings and bracket logic, and storage.

pub mod config;
pub mod logic;
pub mod models;
pub mod roster;
pub mod store;

pub use config::{Config, ConfigError};
pub use logic::{
    calculate_standings, find_match_by_id, locate_match, referee_update, resolve_match_teams,
    tournament_leaders, MatchUpdate, RefereeAction, Resolver, SlotMap, SlotMapBuilder,
};
pub use models::{
    KnockoutBracket, KnockoutRound, Match, MatchId, MatchLocation, MatchStatus, QualifiedTeam,
    Side, Team, TeamStats, TimeSlot, TournamentError, TournamentMatches,
};
pub use roster::{default_roster, load_roster_csv, parse_roster, RosterError};
pub use store::{default_seed, MatchStore, StoreError};
