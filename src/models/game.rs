//! Match, MatchId, TimeSlot and MatchStatus, shared by group and knockout rounds.

use crate::models::tournament::TournamentError;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a match (e.g. "G12", "R16-4", "TP-1").
#[derive(Clone, Debug, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MatchId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MatchId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Scheduled kick-off and end, written "HH:MM-HH:MM".
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, TournamentError> {
        if end < start {
            return Err(TournamentError::InvalidTimeSlot(format!(
                "{}-{}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse "09:30-09:50". Surrounding whitespace is ignored.
    pub fn parse(s: &str) -> Result<Self, TournamentError> {
        let invalid = || TournamentError::InvalidTimeSlot(s.to_string());
        let (start, end) = s.trim().split_once('-').ok_or_else(invalid)?;
        let start = NaiveTime::parse_from_str(start.trim(), "%H:%M").map_err(|_| invalid())?;
        let end = NaiveTime::parse_from_str(end.trim(), "%H:%M").map_err(|_| invalid())?;
        Self::new(start, end).map_err(|_| invalid())
    }

    /// Whether `time` falls inside the slot (end exclusive).
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = TournamentError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}

/// Which side of a match a score belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    One,
    Two,
}

/// Display state of a match, as shown on the referee surface and schedule.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Pending,
    Playing,
    Finished,
}

/// A single match, group stage or knockout.
///
/// Knockout matches may leave `team1`/`team2` blank and instead carry a slot reference in
/// `description`, or the ids of the matches their contestants come from in `previous_match_ids`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MatchId>,
    pub time: TimeSlot,
    pub field: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score1: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score2: Option<u32>,
    /// Live match: scores may be partial.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_playing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Empty means absent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub previous_match_ids: Vec<MatchId>,
}

impl Match {
    /// A match with both contestants known up front (group stage).
    pub fn between(
        id: impl Into<MatchId>,
        time: TimeSlot,
        field: u32,
        team1: impl Into<String>,
        team2: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            time,
            field,
            team1: Some(team1.into()),
            team2: Some(team2.into()),
            score1: None,
            score2: None,
            is_playing: false,
            description: None,
            previous_match_ids: Vec::new(),
        }
    }

    /// A knockout match whose contestants are described by a slot reference.
    pub fn described(
        id: impl Into<MatchId>,
        time: TimeSlot,
        field: u32,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            time,
            field,
            team1: None,
            team2: None,
            score1: None,
            score2: None,
            is_playing: false,
            description: Some(description.into()),
            previous_match_ids: Vec::new(),
        }
    }

    /// A knockout match fed by the outcome of earlier matches.
    pub fn fed_by(
        id: impl Into<MatchId>,
        time: TimeSlot,
        field: u32,
        description: impl Into<String>,
        previous: &[&str],
    ) -> Self {
        Self {
            previous_match_ids: previous.iter().map(|&p| MatchId::from(p)).collect(),
            ..Self::described(id, time, field, description)
        }
    }

    pub fn with_score(mut self, score1: u32, score2: u32) -> Self {
        self.score1 = Some(score1);
        self.score2 = Some(score2);
        self
    }

    /// Both contestant names, if both are present and non-blank.
    pub fn teams(&self) -> Option<(&str, &str)> {
        fn named(t: &Option<String>) -> Option<&str> {
            t.as_deref().filter(|n| !n.trim().is_empty())
        }
        Some((named(&self.team1)?, named(&self.team2)?))
    }

    /// Both scores, if both are defined.
    pub fn scores(&self) -> Option<(u32, u32)> {
        Some((self.score1?, self.score2?))
    }

    /// Both scores are in and the match is no longer live.
    pub fn is_complete(&self) -> bool {
        self.scores().is_some() && !self.is_playing
    }

    pub fn status(&self) -> MatchStatus {
        if self.is_playing {
            MatchStatus::Playing
        } else if self.score1.is_some() || self.score2.is_some() {
            MatchStatus::Finished
        } else {
            MatchStatus::Pending
        }
    }

    pub fn has_id(&self, id: &MatchId) -> bool {
        self.id.as_ref() == Some(id)
    }

    pub fn score(&self, side: Side) -> Option<u32> {
        match side {
            Side::One => self.score1,
            Side::Two => self.score2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot() -> TimeSlot {
        TimeSlot::parse("09:30-09:50").unwrap()
    }

    #[test]
    fn time_slot_parses_and_displays() {
        let s = TimeSlot::parse(" 16:20-16:40 ").unwrap();
        assert_eq!(s.to_string(), "16:20-16:40");
        assert!(s.contains(NaiveTime::from_hms_opt(16, 30, 0).unwrap()));
        assert!(!s.contains(NaiveTime::from_hms_opt(16, 40, 0).unwrap()));
    }

    #[test]
    fn time_slot_rejects_garbage_and_reversed_ranges() {
        assert!(TimeSlot::parse("9.30").is_err());
        assert!(TimeSlot::parse("10:00-09:00").is_err());
        assert!(TimeSlot::parse("25:00-26:00").is_err());
    }

    #[test]
    fn match_json_uses_camel_case_and_skips_absent_fields() {
        let m = Match::fed_by("QF-1", slot(), 1, "Winners", &["R16-1", "R16-2"]);
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["previousMatchIds"], serde_json::json!(["R16-1", "R16-2"]));
        assert_eq!(json["time"], "09:30-09:50");
        assert!(json.get("team1").is_none());
        assert!(json.get("isPlaying").is_none());

        let back: Match = serde_json::from_value(json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn blank_team_names_count_as_absent() {
        let mut m = Match::between("G1", slot(), 1, "A", "  ");
        assert_eq!(m.teams(), None);
        m.team2 = Some("B".into());
        assert_eq!(m.teams(), Some(("A", "B")));
    }

    #[test]
    fn completeness_and_status() {
        let mut m = Match::between("G1", slot(), 1, "A", "B");
        assert_eq!(m.status(), MatchStatus::Pending);
        assert!(!m.is_complete());

        m.score1 = Some(1);
        assert_eq!(m.status(), MatchStatus::Finished);
        assert!(!m.is_complete());

        m.score2 = Some(0);
        m.is_playing = true;
        assert_eq!(m.status(), MatchStatus::Playing);
        assert!(!m.is_complete());

        m.is_playing = false;
        assert!(m.is_complete());
    }
}
