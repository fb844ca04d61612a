//! Match state store: group matches and the knockout bracket persisted as two JSON files.
//!
//! Reads always go to disk, so every caller sees the latest snapshot. Writes are serialized by a
//! lock acquired with a timeout and land atomically: backup, write a temp file, fsync, rename
//! over the original, drop the backup. A failed write restores the backup.

use crate::logic::{locate_match, MatchUpdate};
use crate::models::{KnockoutBracket, Match, MatchId, MatchLocation, TournamentError, TournamentMatches};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard};

const MATCHES_FILE: &str = "matches.json";
const KNOCKOUT_FILE: &str = "knockout.json";

const SEED_MATCHES: &str = include_str!("../seed/matches.json");
const SEED_KNOCKOUT: &str = include_str!("../seed/knockout.json");

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Json(serde_json::Error),
    /// Another write held the lock for longer than the timeout.
    LockTimeout(Duration),
    /// A data file the store needs does not exist.
    Missing(PathBuf),
    Tournament(TournamentError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "Storage I/O error: {}", e),
            StoreError::Json(e) => write!(f, "Invalid match data: {}", e),
            StoreError::LockTimeout(t) => {
                write!(f, "Timed out after {:?} waiting for the match data lock", t)
            }
            StoreError::Missing(p) => write!(f, "Match data file {} not found", p.display()),
            StoreError::Tournament(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Json(e) => Some(e),
            StoreError::Tournament(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}

impl From<TournamentError> for StoreError {
    fn from(e: TournamentError) -> Self {
        StoreError::Tournament(e)
    }
}

/// Fixture list shipped with the crate, with no results entered.
pub fn default_seed() -> Result<TournamentMatches, StoreError> {
    Ok(TournamentMatches {
        group: serde_json::from_str(SEED_MATCHES)?,
        knockout: serde_json::from_str(SEED_KNOCKOUT)?,
    })
}

pub struct MatchStore {
    matches_path: PathBuf,
    knockout_path: PathBuf,
    write_lock: Mutex<()>,
    lock_timeout: Duration,
}

impl MatchStore {
    /// Store rooted at `dir`. Nothing is touched until `initialize` or the first read.
    pub fn open(dir: impl AsRef<Path>, lock_timeout: Duration) -> Self {
        let dir = dir.as_ref();
        Self {
            matches_path: dir.join(MATCHES_FILE),
            knockout_path: dir.join(KNOCKOUT_FILE),
            write_lock: Mutex::new(()),
            lock_timeout,
        }
    }

    /// Write `seed` if neither data file exists yet. Returns whether it seeded.
    /// Exactly one file present is treated as damage, not as a fresh start.
    pub async fn initialize(&self, seed: &TournamentMatches) -> Result<bool, StoreError> {
        let _guard = self.lock().await?;
        let has_matches = fs::try_exists(&self.matches_path).await?;
        let has_knockout = fs::try_exists(&self.knockout_path).await?;
        match (has_matches, has_knockout) {
            (true, true) => Ok(false),
            (true, false) => Err(StoreError::Missing(self.knockout_path.clone())),
            (false, true) => Err(StoreError::Missing(self.matches_path.clone())),
            (false, false) => {
                if let Some(dir) = self.matches_path.parent() {
                    fs::create_dir_all(dir).await?;
                }
                write_json(&self.matches_path, &seed.group).await?;
                write_json(&self.knockout_path, &seed.knockout).await?;
                log::info!(
                    "Seeded match data: {} group matches, {} knockout matches",
                    seed.group.len(),
                    seed.knockout.iter().count()
                );
                Ok(true)
            }
        }
    }

    pub async fn group_matches(&self) -> Result<Vec<Match>, StoreError> {
        read_json(&self.matches_path).await
    }

    pub async fn knockout(&self) -> Result<KnockoutBracket, StoreError> {
        read_json(&self.knockout_path).await
    }

    /// Fresh snapshot of all match state.
    pub async fn snapshot(&self) -> Result<TournamentMatches, StoreError> {
        Ok(TournamentMatches {
            group: self.group_matches().await?,
            knockout: self.knockout().await?,
        })
    }

    /// Apply `update` to the match carrying `id` and persist it. Returns the updated match.
    pub async fn update_match(&self, id: &MatchId, update: &MatchUpdate) -> Result<Match, StoreError> {
        let _guard = self.lock().await?;
        let snapshot = self.snapshot().await?;
        let location = locate_match(id, &snapshot)
            .ok_or_else(|| TournamentError::MatchNotFound(id.clone()))?;
        self.write_update(snapshot, location, update).await
    }

    /// Apply `update` to the match at `location` and persist it. Returns the updated match.
    pub async fn update_at(
        &self,
        location: MatchLocation,
        update: &MatchUpdate,
    ) -> Result<Match, StoreError> {
        let _guard = self.lock().await?;
        let snapshot = self.snapshot().await?;
        self.write_update(snapshot, location, update).await
    }

    /// Caller holds the write lock.
    async fn write_update(
        &self,
        mut snapshot: TournamentMatches,
        location: MatchLocation,
        update: &MatchUpdate,
    ) -> Result<Match, StoreError> {
        let m = snapshot.get_mut(location)?;
        update.apply_to(m);
        let updated = m.clone();
        match location {
            MatchLocation::Group(_) => write_json(&self.matches_path, &snapshot.group).await?,
            MatchLocation::Knockout(..) => write_json(&self.knockout_path, &snapshot.knockout).await?,
        }
        log::debug!("Updated match {:?} at {:?}", updated.id, location);
        Ok(updated)
    }

    async fn lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        tokio::time::timeout(self.lock_timeout, self.write_lock.lock())
            .await
            .map_err(|_| StoreError::LockTimeout(self.lock_timeout))
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(StoreError::Missing(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_str(&raw)?)
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let backup = sibling(path, ".backup");
    let tmp = sibling(path, ".tmp");

    let had_original = fs::try_exists(path).await?;
    if had_original {
        fs::copy(path, &backup).await?;
    }

    match write_synced(&tmp, path, &bytes).await {
        Ok(()) => {
            if had_original {
                if let Err(e) = fs::remove_file(&backup).await {
                    log::warn!("Could not remove backup {}: {}", backup.display(), e);
                }
            }
            Ok(())
        }
        Err(e) => {
            log::error!("Failed to write {}: {}", path.display(), e);
            if had_original {
                if let Err(restore) = fs::copy(&backup, path).await {
                    log::error!("Failed to restore {} from backup: {}", path.display(), restore);
                }
            }
            if let Err(cleanup) = fs::remove_file(&tmp).await {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    log::warn!("Could not remove temp file {}: {}", tmp.display(), cleanup);
                }
            }
            Err(e.into())
        }
    }
}

async fn write_synced(tmp: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(tmp).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(tmp, path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KnockoutRound;

    fn store(dir: &Path) -> MatchStore {
        MatchStore::open(dir, Duration::from_secs(2))
    }

    fn score(s1: u32, s2: u32) -> MatchUpdate {
        MatchUpdate {
            score1: Some(Some(s1)),
            score2: Some(Some(s2)),
            ..MatchUpdate::default()
        }
    }

    #[test]
    fn seed_has_the_full_bracket_shape() {
        let seed = default_seed().unwrap();
        assert_eq!(seed.group.len(), 36);
        assert_eq!(seed.knockout.round_of_16.len(), 8);
        assert_eq!(seed.knockout.quarter_finals.len(), 4);
        assert_eq!(seed.knockout.semi_finals.len(), 2);
        assert_eq!(seed.knockout.third_place.id, Some(MatchId::from("TP-1")));
        assert!(seed.group.iter().all(|m| m.scores().is_none()));
    }

    #[tokio::test]
    async fn initialize_seeds_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let seed = default_seed().unwrap();
        assert!(store.initialize(&seed).await.unwrap());
        assert!(!store.initialize(&seed).await.unwrap());
        assert_eq!(store.snapshot().await.unwrap(), seed);
    }

    #[tokio::test]
    async fn initialize_refuses_half_present_data() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MATCHES_FILE), "[]").unwrap();
        let err = store(dir.path()).initialize(&default_seed().unwrap()).await.unwrap_err();
        assert!(matches!(err, StoreError::Missing(p) if p.ends_with(KNOCKOUT_FILE)));
    }

    #[tokio::test]
    async fn update_by_id_persists_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.initialize(&default_seed().unwrap()).await.unwrap();

        let updated = store.update_match(&"R16-3".into(), &score(2, 1)).await.unwrap();
        assert_eq!(updated.scores(), Some((2, 1)));

        let reloaded = store.knockout().await.unwrap();
        assert_eq!(reloaded.round_of_16[2].scores(), Some((2, 1)));
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_name().to_string_lossy().ends_with(".json"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn unknown_id_and_bad_index_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.initialize(&default_seed().unwrap()).await.unwrap();

        let err = store.update_match(&"QF-99".into(), &score(1, 0)).await.unwrap_err();
        assert!(matches!(err, StoreError::Tournament(TournamentError::MatchNotFound(_))));

        let at = MatchLocation::Knockout(KnockoutRound::SemiFinals, 5);
        let err = store.update_at(at, &score(1, 0)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Tournament(TournamentError::MatchIndexOutOfRange { .. })
        ));
    }

    #[tokio::test]
    async fn concurrent_updates_both_land() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.initialize(&default_seed().unwrap()).await.unwrap();

        let id1 = MatchId::from("G1");
        let id2 = MatchId::from("G2");
        let (first, second) = (score(1, 0), score(0, 3));
        let (a, b) = tokio::join!(
            store.update_match(&id1, &first),
            store.update_match(&id2, &second),
        );
        a.unwrap();
        b.unwrap();

        let group = store.group_matches().await.unwrap();
        assert_eq!(group[0].scores(), Some((1, 0)));
        assert_eq!(group[1].scores(), Some((0, 3)));
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MATCHES_FILE);
        std::fs::write(&path, "[]").unwrap();
        // A directory squatting on the temp path makes the write fail.
        std::fs::create_dir(sibling(&path, ".tmp")).unwrap();

        let err = write_json(&path, &vec![1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
        assert!(sibling(&path, ".tmp").is_dir());
    }

    #[tokio::test]
    async fn reading_before_initialize_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = store(dir.path()).snapshot().await.unwrap_err();
        assert!(matches!(err, StoreError::Missing(_)));
    }
}
