//! Static team roster, loaded once at startup from a `name,group` CSV.

use crate::logic::normalize_team_name;
use crate::models::Team;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io;
use std::path::Path;

/// Roster shipped with the crate: six groups of four.
const DEFAULT_ROSTER: &str = include_str!("../seed/roster.csv");

#[derive(Debug)]
pub enum RosterError {
    Csv(csv::Error),
    /// A row with a blank team name (1-based data row).
    EmptyName { row: usize },
    /// Group numbers start at 1.
    InvalidGroup { name: String, group: u32 },
    /// Groups must be numbered 1..=N without gaps.
    MissingGroup(u32),
    /// Same name (ignoring accents) twice in one group.
    DuplicateTeam { name: String, group: u32 },
    Empty,
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterError::Csv(e) => write!(f, "Roster CSV error: {}", e),
            RosterError::EmptyName { row } => write!(f, "Roster row {} has no team name", row),
            RosterError::InvalidGroup { name, group } => {
                write!(f, "Team {} has invalid group {}", name, group)
            }
            RosterError::MissingGroup(g) => write!(f, "Roster has no teams in group {}", g),
            RosterError::DuplicateTeam { name, group } => {
                write!(f, "Team {} appears twice in group {}", name, group)
            }
            RosterError::Empty => write!(f, "Roster is empty"),
        }
    }
}

impl std::error::Error for RosterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterError::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for RosterError {
    fn from(e: csv::Error) -> Self {
        RosterError::Csv(e)
    }
}

#[derive(Deserialize)]
struct RosterRow {
    name: String,
    group: u32,
}

/// Parse roster CSV (header `name,group`) into groups ordered by group number, teams in file
/// order within each group.
pub fn parse_roster<R: io::Read>(reader: R) -> Result<Vec<Vec<Team>>, RosterError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut groups: BTreeMap<u32, Vec<Team>> = BTreeMap::new();
    let mut seen = HashSet::new();
    for (i, row) in rdr.deserialize::<RosterRow>().enumerate() {
        let row = row?;
        if row.name.is_empty() {
            return Err(RosterError::EmptyName { row: i + 1 });
        }
        if row.group == 0 {
            return Err(RosterError::InvalidGroup {
                name: row.name,
                group: row.group,
            });
        }
        if !seen.insert((row.group, normalize_team_name(&row.name))) {
            return Err(RosterError::DuplicateTeam {
                name: row.name,
                group: row.group,
            });
        }
        groups
            .entry(row.group)
            .or_default()
            .push(Team::new(row.name, row.group));
    }

    if groups.is_empty() {
        return Err(RosterError::Empty);
    }
    for (expected, &g) in (1..).zip(groups.keys()) {
        if g != expected {
            return Err(RosterError::MissingGroup(expected));
        }
    }
    Ok(groups.into_values().collect())
}

pub fn load_roster_csv(path: impl AsRef<Path>) -> Result<Vec<Vec<Team>>, RosterError> {
    let file = std::fs::File::open(path.as_ref()).map_err(csv::Error::from)?;
    let groups = parse_roster(file)?;
    log::info!(
        "Loaded roster from {}: {} groups, {} teams",
        path.as_ref().display(),
        groups.len(),
        groups.iter().map(Vec::len).sum::<usize>()
    );
    Ok(groups)
}

/// The built-in roster.
pub fn default_roster() -> Result<Vec<Vec<Team>>, RosterError> {
    parse_roster(DEFAULT_ROSTER.as_bytes())
}
