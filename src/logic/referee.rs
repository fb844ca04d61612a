//! Referee-side score control: partial match updates and the actions behind the referee buttons.

use crate::models::{Match, Side};
use serde::{Deserialize, Deserializer, Serialize};

/// Partial update of a match. Absent fields are left alone.
///
/// Scores are clearable: an explicit `null` for either score, or `isPlaying: false` with both
/// scores omitted, resets the match to unplayed.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team2: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub score1: Option<Option<u32>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub score2: Option<Option<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_playing: Option<bool>,
}

/// Distinguishes `"score1": null` (Some(None)) from a missing key (None).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl MatchUpdate {
    fn clears_scores(&self) -> bool {
        let stopped_without_scores =
            self.is_playing == Some(false) && self.score1.is_none() && self.score2.is_none();
        stopped_without_scores || self.score1 == Some(None) || self.score2 == Some(None)
    }

    /// Merge into `m`.
    pub fn apply_to(&self, m: &mut Match) {
        if self.clears_scores() {
            m.score1 = None;
            m.score2 = None;
        } else {
            if let Some(s) = self.score1 {
                m.score1 = s;
            }
            if let Some(s) = self.score2 {
                m.score2 = s;
            }
        }
        if let Some(playing) = self.is_playing {
            m.is_playing = playing;
        }
        if let Some(t) = &self.team1 {
            m.team1 = Some(t.clone());
        }
        if let Some(t) = &self.team2 {
            m.team2 = Some(t.clone());
        }
    }

    fn set_score(&mut self, side: Side, value: u32) {
        match side {
            Side::One => self.score1 = Some(Some(value)),
            Side::Two => self.score2 = Some(Some(value)),
        }
    }
}

/// What a referee can do to a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RefereeAction {
    /// Type a score in directly.
    SetScore { side: Side, value: u32 },
    /// +/- buttons. Never goes below zero; fills the other side with 0 if it has no score yet.
    AdjustScore { side: Side, delta: i32 },
    /// Back to "to play": scores cleared.
    MarkPending,
    /// Live: missing scores start at 0.
    MarkPlaying,
    /// Final whistle: missing scores become 0.
    MarkFinished,
}

/// The update a referee action makes to `m`.
pub fn referee_update(m: &Match, action: RefereeAction) -> MatchUpdate {
    let mut update = MatchUpdate::default();
    match action {
        RefereeAction::SetScore { side, value } => update.set_score(side, value),
        RefereeAction::AdjustScore { side, delta } => {
            let current = i64::from(m.score(side).unwrap_or(0));
            let next = (current + i64::from(delta)).clamp(0, i64::from(u32::MAX)) as u32;
            update.set_score(side, next);
            let other = match side {
                Side::One => Side::Two,
                Side::Two => Side::One,
            };
            if m.score(other).is_none() {
                update.set_score(other, 0);
            }
        }
        RefereeAction::MarkPending => {
            update.is_playing = Some(false);
            update.score1 = Some(None);
            update.score2 = Some(None);
        }
        RefereeAction::MarkPlaying | RefereeAction::MarkFinished => {
            update.is_playing = Some(action == RefereeAction::MarkPlaying);
            update.score1 = Some(Some(m.score1.unwrap_or(0)));
            update.score2 = Some(Some(m.score2.unwrap_or(0)));
        }
    }
    update
}
