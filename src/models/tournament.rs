//! Knockout bracket, tournament match snapshot and TournamentError.

use crate::models::game::{Match, MatchId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors raised by tournament data operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// No match carries this id.
    MatchNotFound(MatchId),
    /// Index past the end of a group or knockout round list.
    MatchIndexOutOfRange { round: String, index: usize },
    /// Round name is not one of the bracket rounds.
    UnknownRound(String),
    /// A `previousMatchIds` chain loops back to a match already being resolved.
    CycleDetected(MatchId),
    /// A `previousMatchIds` chain is deeper than any real bracket.
    ResolutionTooDeep { depth: usize },
    /// Time slot not in "HH:MM-HH:MM" form or ending before it starts.
    InvalidTimeSlot(String),
}

impl fmt::Display for TournamentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TournamentError::MatchNotFound(id) => write!(f, "Match {} not found", id),
            TournamentError::MatchIndexOutOfRange { round, index } => {
                write!(f, "No match at index {} in {}", index, round)
            }
            TournamentError::UnknownRound(round) => write!(f, "Unknown round '{}'", round),
            TournamentError::CycleDetected(id) => {
                write!(f, "Bracket data is cyclic: match {} depends on itself", id)
            }
            TournamentError::ResolutionTooDeep { depth } => {
                write!(f, "Bracket dependency chain exceeds {} levels", depth)
            }
            TournamentError::InvalidTimeSlot(s) => {
                write!(f, "Invalid time slot '{}' (expected HH:MM-HH:MM)", s)
            }
        }
    }
}

impl std::error::Error for TournamentError {}

/// The knockout rounds, in the order the match locator scans them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KnockoutRound {
    RoundOf16,
    QuarterFinals,
    SemiFinals,
    ThirdPlace,
    Final,
}

impl KnockoutRound {
    pub const ALL: [KnockoutRound; 5] = [
        KnockoutRound::RoundOf16,
        KnockoutRound::QuarterFinals,
        KnockoutRound::SemiFinals,
        KnockoutRound::ThirdPlace,
        KnockoutRound::Final,
    ];

    /// Name used in persisted JSON and API paths.
    pub fn as_str(self) -> &'static str {
        match self {
            KnockoutRound::RoundOf16 => "roundOf16",
            KnockoutRound::QuarterFinals => "quarterFinals",
            KnockoutRound::SemiFinals => "semiFinals",
            KnockoutRound::ThirdPlace => "thirdPlace",
            KnockoutRound::Final => "final",
        }
    }
}

impl std::str::FromStr for KnockoutRound {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnockoutRound::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| TournamentError::UnknownRound(s.to_string()))
    }
}

impl fmt::Display for KnockoutRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-shape knockout bracket: 8 round-of-16, 4 quarter-final, 2 semi-final matches, then the
/// third-place game and the final.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnockoutBracket {
    pub round_of_16: Vec<Match>,
    pub quarter_finals: Vec<Match>,
    pub semi_finals: Vec<Match>,
    pub third_place: Match,
    #[serde(rename = "final")]
    pub final_match: Match,
}

impl KnockoutBracket {
    /// Matches of one round (single-element slice for third place and final).
    pub fn round(&self, round: KnockoutRound) -> &[Match] {
        match round {
            KnockoutRound::RoundOf16 => &self.round_of_16,
            KnockoutRound::QuarterFinals => &self.quarter_finals,
            KnockoutRound::SemiFinals => &self.semi_finals,
            KnockoutRound::ThirdPlace => std::slice::from_ref(&self.third_place),
            KnockoutRound::Final => std::slice::from_ref(&self.final_match),
        }
    }

    pub fn round_mut(&mut self, round: KnockoutRound) -> &mut [Match] {
        match round {
            KnockoutRound::RoundOf16 => &mut self.round_of_16,
            KnockoutRound::QuarterFinals => &mut self.quarter_finals,
            KnockoutRound::SemiFinals => &mut self.semi_finals,
            KnockoutRound::ThirdPlace => std::slice::from_mut(&mut self.third_place),
            KnockoutRound::Final => std::slice::from_mut(&mut self.final_match),
        }
    }

    /// Every knockout match with its round, in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (KnockoutRound, &Match)> + '_ {
        KnockoutRound::ALL
            .into_iter()
            .flat_map(move |r| self.round(r).iter().map(move |m| (r, m)))
    }
}

/// Where a match lives in the tournament data.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchLocation {
    Group(usize),
    Knockout(KnockoutRound, usize),
}

/// Snapshot of all match state: the group-stage list and the knockout bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentMatches {
    #[serde(rename = "groupMatches")]
    pub group: Vec<Match>,
    #[serde(rename = "knockoutMatches")]
    pub knockout: KnockoutBracket,
}

impl TournamentMatches {
    pub fn get(&self, location: MatchLocation) -> Option<&Match> {
        match location {
            MatchLocation::Group(i) => self.group.get(i),
            MatchLocation::Knockout(round, i) => self.knockout.round(round).get(i),
        }
    }

    /// Mutable access by location; out-of-range indices are an error.
    pub fn get_mut(&mut self, location: MatchLocation) -> Result<&mut Match, TournamentError> {
        let (round, index) = match location {
            MatchLocation::Group(i) => ("group", i),
            MatchLocation::Knockout(r, i) => (r.as_str(), i),
        };
        let found = match location {
            MatchLocation::Group(i) => self.group.get_mut(i),
            MatchLocation::Knockout(r, i) => self.knockout.round_mut(r).get_mut(i),
        };
        found.ok_or_else(|| TournamentError::MatchIndexOutOfRange {
            round: round.to_string(),
            index,
        })
    }
}
