//! Find a match by id across the group stage and every knockout round.

use crate::models::{KnockoutRound, Match, MatchId, MatchLocation, TournamentMatches};

/// Where the match with `id` lives. Scans group matches, then round of 16, quarter-finals,
/// semi-finals, third place and final; the first hit wins.
pub fn locate_match(id: &MatchId, matches: &TournamentMatches) -> Option<MatchLocation> {
    if let Some(i) = matches.group.iter().position(|m| m.has_id(id)) {
        return Some(MatchLocation::Group(i));
    }
    KnockoutRound::ALL.into_iter().find_map(|round| {
        matches
            .knockout
            .round(round)
            .iter()
            .position(|m| m.has_id(id))
            .map(|i| MatchLocation::Knockout(round, i))
    })
}

/// The match carrying `id`, if any. `None` means the dependency cannot be resolved yet.
pub fn find_match_by_id<'a>(id: &MatchId, matches: &'a TournamentMatches) -> Option<&'a Match> {
    locate_match(id, matches).and_then(|loc| matches.get(loc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KnockoutBracket, TimeSlot};

    fn snapshot() -> TournamentMatches {
        let t = TimeSlot::parse("18:00-18:20").unwrap();
        let r16: Vec<Match> = (1..=8)
            .map(|i| Match::described(format!("R16-{i}"), t, 1, "1st Group 1 - 2nd Group 2"))
            .collect();
        TournamentMatches {
            group: vec![Match::between("G1", t, 1, "A", "B")],
            knockout: KnockoutBracket {
                round_of_16: r16,
                quarter_finals: vec![Match::fed_by("QF-1", t, 1, "Winners", &["R16-1", "R16-2"])],
                semi_finals: vec![Match::fed_by("SF-1", t, 1, "Winners", &["QF-1", "QF-2"])],
                third_place: Match::fed_by("TP-1", t, 1, "Third place", &["SF-1", "SF-2"]),
                final_match: Match::fed_by("F-1", t, 1, "Final", &["SF-1", "SF-2"]),
            },
        }
    }

    #[test]
    fn finds_matches_in_every_round() {
        let s = snapshot();
        assert_eq!(locate_match(&"G1".into(), &s), Some(MatchLocation::Group(0)));
        assert_eq!(
            locate_match(&"R16-5".into(), &s),
            Some(MatchLocation::Knockout(KnockoutRound::RoundOf16, 4))
        );
        assert_eq!(
            locate_match(&"TP-1".into(), &s),
            Some(MatchLocation::Knockout(KnockoutRound::ThirdPlace, 0))
        );
        let f = find_match_by_id(&"F-1".into(), &s).unwrap();
        assert_eq!(f.description.as_deref(), Some("Final"));
    }

    #[test]
    fn missing_id_is_none() {
        assert!(find_match_by_id(&"QF-9".into(), &snapshot()).is_none());
    }

    #[test]
    fn group_stage_is_scanned_first() {
        let mut s = snapshot();
        s.group[0].id = Some("QF-1".into());
        assert_eq!(locate_match(&"QF-1".into(), &s), Some(MatchLocation::Group(0)));
    }
}
