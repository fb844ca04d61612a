//! Tournament logic: standings, slot map, match lookup, bracket resolution, referee control.

mod locator;
mod referee;
mod resolver;
mod slot_map;
mod standings;
mod statistics;

pub use locator::{find_match_by_id, locate_match};
pub use referee::{referee_update, MatchUpdate, RefereeAction};
pub use resolver::{
    resolve_match_teams, split_description, Contestant, MatchTeams, Resolver,
    MAX_RESOLUTION_DEPTH, THIRD_PLACE_MATCH_ID, TO_BE_DETERMINED,
};
pub use slot_map::{build_slot_map, english_ordinal, SlotMap, SlotMapBuilder, SlotRef};
pub use standings::{
    calculate_standings, compare_standing, group_stage_complete, normalize_team_name,
    rank_best_placed, standings_by_group,
};
pub use statistics::{tournament_leaders, Leader, TournamentLeaders};
