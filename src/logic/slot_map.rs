//! Slot references ("1st Group 2", "2n Grup 3", "1r Millor 3r", ...) and the lookup table that
//! maps every accepted spelling to the team currently holding that slot.

use crate::logic::standings::rank_best_placed;
use crate::models::QualifiedTeam;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;

/// Trailing punctuation tolerated after any slot reference.
const SUFFIXES: [&str; 3] = ["", "-", " -"];

/// Words naming a group.
const GROUP_WORDS: [&str; 2] = ["Group", "Grup"];

const ENGLISH_WORDS: [&str; 8] = [
    "First", "Second", "Third", "Fourth", "Fifth", "Sixth", "Seventh", "Eighth",
];

/// Catalan spellings per position, as typed into the fixture data.
const CATALAN_SPELLINGS: [&[&str]; 8] = [
    &["1r", "1er", "Primer"],
    &["2n", "2on", "Segon"],
    &["3r", "3er", "Tercer"],
    &["4t", "4rt", "Quart"],
    &["5è", "5e", "Cinquè"],
    &["6è", "6e", "Sisè"],
    &["7è", "7e", "Setè"],
    &["8è", "8e", "Vuitè"],
];

/// Suffixes accepted after a numeric ordinal.
const ORDINAL_SUFFIXES: [&str; 12] = [
    "st", "nd", "rd", "th", "er", "on", "rt", "è", "r", "n", "t", "e",
];

static GROUP_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\S+)\s+(?:group\s*|grup\s*|g)(\d+)").expect("group ref regex"));
static BEST_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\S+)\s+(?:best|millor)\s+(\d+)").expect("best ref regex"));
static BARE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s+(\d+)\s*$").expect("bare ref regex"));

/// A bracket slot defined by group-stage placement.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SlotRef {
    /// Team finishing `position` in `group`.
    GroupPosition { position: u32, group: u32 },
    /// The `rank`-th best team among those finishing `position` in their group.
    BestPlaced { rank: u32, position: u32 },
}

impl SlotRef {
    /// The one spelling every lookup falls back to, e.g. "1st Group 1", "2nd Best 3rd-Place".
    pub fn canonical_key(&self) -> String {
        match *self {
            SlotRef::GroupPosition { position, group } => {
                format!("{} Group {}", english_ordinal(position), group)
            }
            SlotRef::BestPlaced { rank, position } => {
                format!("{} Best {}-Place", english_ordinal(rank), english_ordinal(position))
            }
        }
    }

    /// Every accepted spelling of this slot. The canonical key comes first.
    pub fn spellings(&self) -> Vec<String> {
        let mut keys = vec![self.canonical_key()];
        match *self {
            SlotRef::GroupPosition { position, group } => {
                for ord in ordinal_spellings(position) {
                    for word in GROUP_WORDS {
                        for suffix in SUFFIXES {
                            keys.push(format!("{} {} {}{}", ord, word, group, suffix));
                        }
                    }
                    for suffix in SUFFIXES {
                        keys.push(format!("{} G{}{}", ord, group, suffix));
                    }
                }
                keys.push(format!("{} {}", position, group));
            }
            SlotRef::BestPlaced { rank, position } => {
                let placed = english_ordinal(position);
                let phrases = [
                    format!("Best {}-Place", placed),
                    format!("Best {} Place", placed),
                    format!("Millor {}", catalan_ordinal(position)),
                ];
                for ord in ordinal_spellings(rank) {
                    for phrase in &phrases {
                        for suffix in SUFFIXES {
                            keys.push(format!("{} {}{}", ord, phrase, suffix));
                        }
                    }
                }
            }
        }
        dedup_in_order(keys)
    }

    /// Extract a slot from free text that is not a registered spelling, e.g. "1st  group 2 -"
    /// or "2on millor 3r". Best-placed references are tried before group references.
    pub fn parse(text: &str) -> Option<SlotRef> {
        if let Some(caps) = BEST_REF.captures(text) {
            let rank = parse_ordinal(&caps[1])?;
            let position = caps[2].parse().ok()?;
            return Some(SlotRef::BestPlaced { rank, position });
        }
        if let Some(caps) = GROUP_REF.captures(text) {
            let position = parse_ordinal(&caps[1])?;
            let group = caps[2].parse().ok()?;
            return Some(SlotRef::GroupPosition { position, group });
        }
        let caps = BARE_REF.captures(text)?;
        Some(SlotRef::GroupPosition {
            position: caps[1].parse().ok()?,
            group: caps[2].parse().ok()?,
        })
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_key())
    }
}

/// "1st", "2nd", "3rd", "4th", "11th", "21st", ...
pub fn english_ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

fn catalan_ordinal(n: u32) -> String {
    match n {
        1 | 3 => format!("{}r", n),
        2 => "2n".to_string(),
        4 => "4t".to_string(),
        _ => format!("{}è", n),
    }
}

fn ordinal_spellings(n: u32) -> Vec<String> {
    let mut out = vec![english_ordinal(n)];
    let idx = n.checked_sub(1).map(|i| i as usize);
    if let Some(word) = idx.and_then(|i| ENGLISH_WORDS.get(i)) {
        out.push((*word).to_string());
    }
    match idx.and_then(|i| CATALAN_SPELLINGS.get(i)) {
        Some(spellings) => out.extend(spellings.iter().map(|s| s.to_string())),
        None => out.push(catalan_ordinal(n)),
    }
    // Legacy "<n>r" keys were written for every position.
    out.push(format!("{}r", n));
    dedup_in_order(out)
}

/// Numeric ordinal with any accepted suffix ("3rd", "3r", "3", "2on"), or an ordinal word.
fn parse_ordinal(token: &str) -> Option<u32> {
    let token = token.trim().trim_end_matches('.');
    let digits_end = token
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(token.len(), |(i, _)| i);
    if digits_end > 0 {
        let suffix = token[digits_end..].to_lowercase();
        if suffix.is_empty() || ORDINAL_SUFFIXES.contains(&suffix.as_str()) {
            return token[..digits_end].parse().ok();
        }
        return None;
    }
    word_position(ENGLISH_WORDS.iter().copied(), token)
        .or_else(|| word_position(CATALAN_SPELLINGS.iter().map(|s| s[2]), token))
}

fn word_position<'a>(mut words: impl Iterator<Item = &'a str>, token: &str) -> Option<u32> {
    let lower = token.to_lowercase();
    words
        .position(|w| w.to_lowercase() == lower)
        .map(|i| i as u32 + 1)
}

fn dedup_in_order(keys: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    keys.into_iter().filter(|k| seen.insert(k.clone())).collect()
}

/// Lookup table from slot spelling to team name, rebuilt from standings on every pass.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SlotMap {
    entries: HashMap<String, String>,
}

impl SlotMap {
    /// Register every spelling of `slot` for `team`.
    pub fn insert(&mut self, slot: SlotRef, team: &str) {
        for key in slot.spellings() {
            self.entries.insert(key, team.to_string());
        }
    }

    /// Exact key lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Team holding a slot.
    pub fn slot(&self, slot: &SlotRef) -> Option<&str> {
        self.get(&slot.canonical_key())
    }

    /// Direct lookup of `text` (trimmed), then a parsed lookup on the canonical key.
    pub fn lookup(&self, text: &str) -> Option<&str> {
        let text = text.trim();
        self.get(text)
            .or_else(|| SlotRef::parse(text).and_then(|slot| self.slot(&slot)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Builds a `SlotMap` from standings.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SlotMapBuilder {
    /// How many "best N-th placed" slots the bracket consumes.
    pub best_placed_slots: usize,
    /// Which group position the best-placed ranking is taken over.
    pub best_placed_position: u32,
}

impl Default for SlotMapBuilder {
    fn default() -> Self {
        Self {
            best_placed_slots: 2,
            best_placed_position: 3,
        }
    }
}

impl SlotMapBuilder {
    pub fn build(&self, qualified: &[QualifiedTeam]) -> SlotMap {
        let mut map = SlotMap::default();
        for team in qualified {
            let slot = SlotRef::GroupPosition {
                position: team.position,
                group: team.group,
            };
            map.insert(slot, &team.name);
        }

        let ranked = rank_best_placed(qualified, self.best_placed_position);
        for (i, team) in ranked.iter().take(self.best_placed_slots).enumerate() {
            let slot = SlotRef::BestPlaced {
                rank: i as u32 + 1,
                position: self.best_placed_position,
            };
            log::debug!(
                "{} -> {} (group {}, {} pts, GD {}, GF {})",
                slot,
                team.name,
                team.group,
                team.stats.points,
                team.goal_difference(),
                team.stats.goals_for
            );
            map.insert(slot, &team.name);
        }
        map
    }
}

/// Slot map with the default best-placed settings (top two third-placed teams).
pub fn build_slot_map(qualified: &[QualifiedTeam]) -> SlotMap {
    SlotMapBuilder::default().build(qualified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_ordinals() {
        let got: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 101]
            .into_iter()
            .map(english_ordinal)
            .collect();
        assert_eq!(
            got,
            ["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "101st"]
        );
    }

    #[test]
    fn group_position_spellings_cover_the_documented_variants() {
        let keys = SlotRef::GroupPosition { position: 2, group: 3 }.spellings();
        for expected in [
            "2nd Group 3",
            "2nd Group 3-",
            "2nd Group 3 -",
            "Second Group 3",
            "2n Grup 3",
            "2on Grup 3 -",
            "Segon Grup 3-",
            "2r Grup 3",
            "2n G3",
            "2 3",
        ] {
            assert!(keys.iter().any(|k| k == expected), "missing {expected}");
        }
        assert_eq!(keys[0], "2nd Group 3");
    }

    #[test]
    fn best_placed_spellings() {
        let keys = SlotRef::BestPlaced { rank: 1, position: 3 }.spellings();
        for expected in [
            "1st Best 3rd-Place",
            "1st Best 3rd Place -",
            "1r Millor 3r",
            "Primer Millor 3r-",
            "1er Millor 3r -",
        ] {
            assert!(keys.iter().any(|k| k == expected), "missing {expected}");
        }
    }

    #[test]
    fn parse_extracts_position_and_group() {
        assert_eq!(
            SlotRef::parse("4t  grup 2-"),
            Some(SlotRef::GroupPosition { position: 4, group: 2 })
        );
        assert_eq!(
            SlotRef::parse("Tercer GROUP 12"),
            Some(SlotRef::GroupPosition { position: 3, group: 12 })
        );
        assert_eq!(
            SlotRef::parse("5th G6"),
            Some(SlotRef::GroupPosition { position: 5, group: 6 })
        );
        assert_eq!(
            SlotRef::parse("1 4"),
            Some(SlotRef::GroupPosition { position: 1, group: 4 })
        );
    }

    #[test]
    fn parse_prefers_best_placed_phrases() {
        assert_eq!(
            SlotRef::parse("2on Millor 3r"),
            Some(SlotRef::BestPlaced { rank: 2, position: 3 })
        );
        assert_eq!(
            SlotRef::parse("1st best 3rd-place"),
            Some(SlotRef::BestPlaced { rank: 1, position: 3 })
        );
    }

    #[test]
    fn parse_rejects_non_references() {
        assert_eq!(SlotRef::parse("Guanyadors encreuaments anteriors"), None);
        assert_eq!(SlotRef::parse("FINAL"), None);
        assert_eq!(SlotRef::parse("Trempats 1"), None);
        assert_eq!(SlotRef::parse("xyz Group 1"), None);
    }

    #[test]
    fn lookup_falls_back_to_parsed_canonical_key() {
        let mut map = SlotMap::default();
        map.insert(SlotRef::GroupPosition { position: 1, group: 2 }, "Arreplegats 1");
        assert_eq!(map.lookup("1r Grup 2"), Some("Arreplegats 1"));
        assert_eq!(map.lookup("  1st   group 2  "), Some("Arreplegats 1"));
        assert_eq!(map.lookup("1st Group 3"), None);
    }
}
