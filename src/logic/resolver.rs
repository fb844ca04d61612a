//! Knockout bracket resolution: turn a match's explicit names, slot-reference description or
//! `previousMatchIds` into the two contestants, recursing through earlier rounds as needed.
//!
//! Nothing is cached. Every call evaluates against the snapshot it is given, so resolution is
//! always consistent with the latest results.

use crate::logic::locator::find_match_by_id;
use crate::logic::slot_map::SlotMap;
use crate::models::{Match, MatchId, TournamentError, TournamentMatches};

/// Id of the match that takes the losers of its previous matches.
pub const THIRD_PLACE_MATCH_ID: &str = "TP-1";

/// Deeper than any real bracket (group stage plus four knockout rounds); hitting it means the
/// `previousMatchIds` data is corrupt.
pub const MAX_RESOLUTION_DEPTH: usize = 8;

/// Shown for a contestant that cannot be determined yet.
pub const TO_BE_DETERMINED: &str = "To be determined";

/// One side of a knockout match.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Contestant {
    /// A team name, or the raw slot text when the slot map has no entry for it.
    Resolved(String),
    /// Fed by a match that is missing, unfinished or drawn.
    Unresolved,
}

impl Contestant {
    pub fn name(&self) -> Option<&str> {
        match self {
            Contestant::Resolved(name) => Some(name),
            Contestant::Unresolved => None,
        }
    }

    fn display(&self) -> &str {
        self.name().unwrap_or(TO_BE_DETERMINED)
    }
}

/// Contestants of a match as far as they can be determined from the snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MatchTeams {
    Pair(Contestant, Contestant),
    /// Fed by a single previous match.
    Single(Contestant),
    /// No rule applies, or the description is not a two-sided slot reference.
    Undetermined,
}

impl MatchTeams {
    /// Both names, when both sides are resolved.
    pub fn names(&self) -> Option<(&str, &str)> {
        match self {
            MatchTeams::Pair(a, b) => Some((a.name()?, b.name()?)),
            _ => None,
        }
    }

    /// "A - B", "A - To be determined", or `fallback` when nothing is resolved.
    pub fn display(&self, fallback: &str) -> String {
        match self {
            MatchTeams::Pair(Contestant::Unresolved, Contestant::Unresolved)
            | MatchTeams::Single(Contestant::Unresolved)
            | MatchTeams::Undetermined => fallback.to_string(),
            MatchTeams::Pair(a, b) => format!("{} - {}", a.display(), b.display()),
            MatchTeams::Single(a) => a.display().to_string(),
        }
    }
}

/// Split "1r Grup 1 - 4t Grup 2" into its two sides. A spaced dash is tried first so that
/// hyphenated references ("1st Best 3rd-Place - 2nd Group 1") survive; otherwise any single
/// dash separates. Anything that does not give exactly two sides is not a pairing.
pub fn split_description(description: &str) -> Option<(&str, &str)> {
    fn two<'a>(mut parts: impl Iterator<Item = &'a str>) -> Option<(&'a str, &'a str)> {
        match (parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), None) => Some((a.trim(), b.trim())),
            _ => None,
        }
    }
    two(description.split(" - ")).or_else(|| two(description.split('-')))
}

/// Resolves knockout contestants against one snapshot.
#[derive(Clone, Debug)]
pub struct Resolver<'a> {
    slots: &'a SlotMap,
    matches: &'a TournamentMatches,
    third_place_id: MatchId,
}

impl<'a> Resolver<'a> {
    pub fn new(slots: &'a SlotMap, matches: &'a TournamentMatches) -> Self {
        Self {
            slots,
            matches,
            third_place_id: MatchId::from(THIRD_PLACE_MATCH_ID),
        }
    }

    /// Use a different id for the losers' match.
    pub fn with_third_place_id(mut self, id: MatchId) -> Self {
        self.third_place_id = id;
        self
    }

    /// Contestants of `m`. Errors only on corrupt bracket data (cycles, runaway depth).
    pub fn contestants(&self, m: &Match) -> Result<MatchTeams, TournamentError> {
        self.contestants_in(m, &mut Vec::new())
    }

    /// Display string for `m`: "A - B", partial, the description, or `TO_BE_DETERMINED`.
    pub fn display(&self, m: &Match) -> Result<String, TournamentError> {
        let fallback = m.description.as_deref().unwrap_or(TO_BE_DETERMINED);
        Ok(self.contestants(m)?.display(fallback))
    }

    fn contestants_in(
        &self,
        m: &Match,
        chain: &mut Vec<MatchId>,
    ) -> Result<MatchTeams, TournamentError> {
        if let Some((a, b)) = m.teams() {
            return Ok(MatchTeams::Pair(
                Contestant::Resolved(a.to_string()),
                Contestant::Resolved(b.to_string()),
            ));
        }

        if m.previous_match_ids.is_empty() {
            let Some(description) = m.description.as_deref() else {
                return Ok(MatchTeams::Undetermined);
            };
            return Ok(match split_description(description) {
                Some((a, b)) => MatchTeams::Pair(self.slot_part(a), self.slot_part(b)),
                None => MatchTeams::Undetermined,
            });
        }

        if let Some(id) = &m.id {
            enter(id, chain)?;
        }

        let want_loser = m.has_id(&self.third_place_id);
        let mut sides = Vec::with_capacity(2);
        for prev in m.previous_match_ids.iter().take(2) {
            sides.push(self.outcome_of(prev, want_loser, chain)?);
        }
        if m.id.is_some() {
            chain.pop();
        }

        let mut sides = sides.into_iter();
        Ok(match (sides.next(), sides.next()) {
            (Some(a), Some(b)) => MatchTeams::Pair(a, b),
            (Some(a), None) => MatchTeams::Single(a),
            _ => MatchTeams::Undetermined,
        })
    }

    fn slot_part(&self, part: &str) -> Contestant {
        let name = self.slots.lookup(part).unwrap_or(part);
        Contestant::Resolved(name.to_string())
    }

    /// Walk the feeds of an unfinished match so corrupt links surface before any score is in.
    fn check_feeds(&self, m: &Match, chain: &mut Vec<MatchId>) -> Result<(), TournamentError> {
        let Some(id) = &m.id else {
            return Ok(());
        };
        enter(id, chain)?;
        for prev in m.previous_match_ids.iter().take(2) {
            if let Some(upstream) = find_match_by_id(prev, self.matches) {
                self.check_feeds(upstream, chain)?;
            }
        }
        chain.pop();
        Ok(())
    }

    /// Winner (or loser) of the match `id`.
    fn outcome_of(
        &self,
        id: &MatchId,
        want_loser: bool,
        chain: &mut Vec<MatchId>,
    ) -> Result<Contestant, TournamentError> {
        let Some(prev) = find_match_by_id(id, self.matches) else {
            log::debug!("Previous match {} not found", id);
            return Ok(Contestant::Unresolved);
        };
        let Some((score1, score2)) = prev.scores().filter(|_| prev.is_complete()) else {
            self.check_feeds(prev, chain)?;
            return Ok(Contestant::Unresolved);
        };
        let teams = self.contestants_in(prev, chain)?;
        let Some((team1, team2)) = teams.names() else {
            return Ok(Contestant::Unresolved);
        };
        let (winner, loser) = match score1.cmp(&score2) {
            std::cmp::Ordering::Greater => (team1, team2),
            std::cmp::Ordering::Less => (team2, team1),
            std::cmp::Ordering::Equal => {
                log::debug!("Match {} ended level; no knockout winner", id);
                return Ok(Contestant::Unresolved);
            }
        };
        let picked = if want_loser { loser } else { winner };
        Ok(Contestant::Resolved(picked.to_string()))
    }
}

/// Push `id` onto the resolution chain, failing on a repeat or a runaway chain.
fn enter(id: &MatchId, chain: &mut Vec<MatchId>) -> Result<(), TournamentError> {
    if chain.contains(id) {
        log::warn!("Cyclic previousMatchIds reaching {}", id);
        return Err(TournamentError::CycleDetected(id.clone()));
    }
    if chain.len() >= MAX_RESOLUTION_DEPTH {
        return Err(TournamentError::ResolutionTooDeep {
            depth: MAX_RESOLUTION_DEPTH,
        });
    }
    chain.push(id.clone());
    Ok(())
}

/// Display string for a knockout match, using the default third-place id.
pub fn resolve_match_teams(
    m: &Match,
    slots: &SlotMap,
    matches: &TournamentMatches,
) -> Result<String, TournamentError> {
    Resolver::new(slots, matches).display(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::slot_map::SlotRef;
    use crate::models::{KnockoutBracket, TimeSlot};

    fn t() -> TimeSlot {
        TimeSlot::parse("16:20-16:40").unwrap()
    }

    fn bracket() -> TournamentMatches {
        TournamentMatches {
            group: Vec::new(),
            knockout: KnockoutBracket {
                round_of_16: vec![
                    Match::described("R16-1", t(), 1, "1r Grup 1 - 2n Grup 2"),
                    Match::described("R16-2", t(), 2, "1r Grup 2 - 2n Grup 1"),
                ],
                quarter_finals: vec![Match::fed_by("QF-1", t(), 1, "Winners", &["R16-1", "R16-2"])],
                semi_finals: Vec::new(),
                third_place: Match::fed_by("TP-1", t(), 1, "3r i 4t LLOC", &["R16-1", "R16-2"]),
                final_match: Match::fed_by("F-1", t(), 1, "FINAL", &["QF-1"]),
            },
        }
    }

    fn slots() -> SlotMap {
        let mut map = SlotMap::default();
        map.insert(SlotRef::GroupPosition { position: 1, group: 1 }, "Trempats 1");
        map.insert(SlotRef::GroupPosition { position: 2, group: 1 }, "Grillats");
        map.insert(SlotRef::GroupPosition { position: 1, group: 2 }, "Emboirats");
        map.insert(SlotRef::GroupPosition { position: 2, group: 2 }, "Ganapies 1");
        map
    }

    #[test]
    fn split_description_prefers_spaced_dash() {
        assert_eq!(
            split_description("1st Best 3rd-Place - 2nd Group 1"),
            Some(("1st Best 3rd-Place", "2nd Group 1"))
        );
        assert_eq!(split_description("1r Grup 1-4t Grup 2"), Some(("1r Grup 1", "4t Grup 2")));
        assert_eq!(split_description("FINAL"), None);
        assert_eq!(split_description("a-b-c"), None);
    }

    #[test]
    fn description_resolves_through_slot_map_and_keeps_unknown_text() {
        let s = bracket();
        let slots = slots();
        let r = Resolver::new(&slots, &s);
        assert_eq!(r.display(&s.knockout.round_of_16[0]).unwrap(), "Trempats 1 - Ganapies 1");

        let odd = Match::described("R16-9", t(), 1, "1r Grup 1 - Millor perdedor");
        assert_eq!(r.display(&odd).unwrap(), "Trempats 1 - Millor perdedor");
    }

    #[test]
    fn malformed_description_is_returned_unchanged() {
        let s = bracket();
        let slots = slots();
        let m = Match::described("X", t(), 1, "3r i 4t LLOC");
        assert_eq!(resolve_match_teams(&m, &slots, &s).unwrap(), "3r i 4t LLOC");
    }

    #[test]
    fn multi_level_chain_resolves_winners() {
        let mut s = bracket();
        s.knockout.round_of_16[0] = s.knockout.round_of_16[0].clone().with_score(0, 2);
        s.knockout.round_of_16[1] = s.knockout.round_of_16[1].clone().with_score(3, 1);
        s.knockout.quarter_finals[0] = s.knockout.quarter_finals[0].clone().with_score(1, 0);
        let slots = slots();
        let r = Resolver::new(&slots, &s);
        assert_eq!(r.display(&s.knockout.quarter_finals[0]).unwrap(), "Ganapies 1 - Emboirats");
        assert_eq!(r.display(&s.knockout.final_match).unwrap(), "Ganapies 1");
        assert_eq!(r.display(&s.knockout.third_place).unwrap(), "Trempats 1 - Grillats");
    }

    #[test]
    fn live_previous_match_has_no_winner_yet() {
        let mut s = bracket();
        s.knockout.round_of_16[0] = s.knockout.round_of_16[0].clone().with_score(0, 2);
        let mut live = s.knockout.round_of_16[1].clone().with_score(1, 0);
        live.is_playing = true;
        s.knockout.round_of_16[1] = live;
        let slots = slots();
        let teams = Resolver::new(&slots, &s)
            .contestants(&s.knockout.quarter_finals[0])
            .unwrap();
        assert_eq!(
            teams,
            MatchTeams::Pair(Contestant::Resolved("Ganapies 1".into()), Contestant::Unresolved)
        );
        assert_eq!(teams.display("Winners"), "Ganapies 1 - To be determined");
    }

    #[test]
    fn nothing_resolved_falls_back_to_description_then_placeholder() {
        let s = bracket();
        let slots = slots();
        let r = Resolver::new(&slots, &s);
        assert_eq!(r.display(&s.knockout.quarter_finals[0]).unwrap(), "Winners");

        let mut bare = s.knockout.quarter_finals[0].clone();
        bare.description = None;
        assert_eq!(r.display(&bare).unwrap(), TO_BE_DETERMINED);
    }

    #[test]
    fn custom_third_place_id_switches_to_losers() {
        let mut s = bracket();
        s.knockout.round_of_16[0] = s.knockout.round_of_16[0].clone().with_score(4, 0);
        s.knockout.round_of_16[1] = s.knockout.round_of_16[1].clone().with_score(0, 4);
        let slots = slots();
        let r = Resolver::new(&slots, &s).with_third_place_id("QF-1".into());
        assert_eq!(r.display(&s.knockout.quarter_finals[0]).unwrap(), "Ganapies 1 - Emboirats");
        assert_eq!(r.display(&s.knockout.third_place).unwrap(), "Trempats 1 - Grillats");
    }

    #[test]
    fn self_referencing_match_is_a_cycle() {
        let mut s = bracket();
        let looped = Match::fed_by("SF-1", t(), 1, "Winners", &["SF-2"]).with_score(1, 0);
        let back = Match::fed_by("SF-2", t(), 1, "Winners", &["SF-1"]).with_score(2, 0);
        s.knockout.semi_finals = vec![looped, back];
        let slots = slots();
        let err = Resolver::new(&slots, &s)
            .contestants(&s.knockout.semi_finals[0])
            .unwrap_err();
        assert_eq!(err, TournamentError::CycleDetected("SF-1".into()));
    }

    #[test]
    fn cycle_is_reported_before_any_score_is_in() {
        let mut s = bracket();
        s.knockout.semi_finals = vec![
            Match::fed_by("SF-1", t(), 1, "d1", &["SF-2"]),
            Match::fed_by("SF-2", t(), 1, "d2", &["SF-1"]),
        ];
        let slots = slots();
        let r = Resolver::new(&slots, &s);
        let err = r.display(&s.knockout.semi_finals[0]).unwrap_err();
        assert_eq!(err, TournamentError::CycleDetected("SF-1".into()));

        // Unfinished but well-formed feeds still just wait for results.
        assert_eq!(r.display(&s.knockout.final_match).unwrap(), "FINAL");
    }
}
