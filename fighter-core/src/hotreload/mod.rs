//! Hot reload of fighter data files.
//!
//! Watches a directory of fighter JSON definitions with `notify`. Changed
//! files are re-read and validated before anything is applied; a file that
//! fails to load leaves the running fighters untouched.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Mutex;

use crate::error::HotReloadError;
use crate::fighter::FighterDef;
use crate::world::FightWorld;

/// Directory watcher reporting changed fighter files
pub struct FighterDataWatcher {
    dir: PathBuf,
    _watcher: RecommendedWatcher,
    receiver: Mutex<Receiver<notify::Result<Event>>>,
}

impl FighterDataWatcher {
    pub fn new(dir: &Path) -> Result<Self, HotReloadError> {
        if !dir.is_dir() {
            return Err(HotReloadError::MissingDirectory(dir.to_path_buf()));
        }
        let (tx, rx) = channel();
        let mut watcher = notify::recommended_watcher(tx)?;
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        tracing::info!(dir = %dir.display(), "watching fighter data");
        Ok(Self {
            dir: dir.to_path_buf(),
            _watcher: watcher,
            receiver: Mutex::new(rx),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Drain pending events; returns each changed fighter file once, sorted
    pub fn poll(&self) -> Vec<PathBuf> {
        let receiver = match self.receiver.lock() {
            Ok(receiver) => receiver,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut changed = BTreeSet::new();
        while let Ok(result) = receiver.try_recv() {
            match result {
                Ok(event) => changed.extend(fighter_data_paths(&event).map(Path::to_path_buf)),
                Err(e) => tracing::warn!("file watcher error: {e}"),
            }
        }
        changed.into_iter().collect()
    }
}

/// Fighter JSON files written or created by `event`
pub fn fighter_data_paths(event: &Event) -> impl Iterator<Item = &Path> {
    let relevant = matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_));
    event
        .paths
        .iter()
        .filter(move |path| relevant && path.extension().is_some_and(|ext| ext == "json"))
        .map(PathBuf::as_path)
}

/// Result of applying a batch of changed files
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReloadOutcome {
    /// Names of fighters whose definitions were replaced
    pub reloaded: Vec<String>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Load each changed file and apply it to matching fighters
pub fn apply_changes(world: &mut FightWorld, paths: &[PathBuf]) -> ReloadOutcome {
    let mut outcome = ReloadOutcome::default();
    for path in paths {
        let result = FighterDef::load(path).and_then(|def| {
            let count = world.reload_fighter_def(&def)?;
            Ok((def.name, count))
        });
        match result {
            Ok((name, count)) => {
                tracing::debug!(path = %path.display(), fighter = %name, count, "applied fighter data");
                if count > 0 {
                    outcome.reloaded.push(name);
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "fighter data rejected, keeping previous: {e}");
                outcome.failed.push((path.clone(), e.to_string()));
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::MatchSetup;
    use notify::event::{CreateKind, DataChange, ModifyKind, RemoveKind};

    fn event(kind: EventKind, path: &str) -> Event {
        Event {
            kind,
            paths: vec![PathBuf::from(path)],
            attrs: Default::default(),
        }
    }

    #[test]
    fn test_modify_json_is_relevant() {
        let e = event(
            EventKind::Modify(ModifyKind::Data(DataChange::Any)),
            "fighters/training.json",
        );
        let paths: Vec<_> = fighter_data_paths(&e).collect();
        assert_eq!(paths, vec![Path::new("fighters/training.json")]);
    }

    #[test]
    fn test_create_json_is_relevant() {
        let e = event(EventKind::Create(CreateKind::File), "fighters/new.json");
        assert_eq!(fighter_data_paths(&e).count(), 1);
    }

    #[test]
    fn test_other_files_and_removals_ignored() {
        let swap = event(
            EventKind::Modify(ModifyKind::Data(DataChange::Any)),
            "fighters/training.json.swp",
        );
        assert_eq!(fighter_data_paths(&swap).count(), 0);
        let removed = event(EventKind::Remove(RemoveKind::File), "fighters/training.json");
        assert_eq!(fighter_data_paths(&removed).count(), 0);
    }

    #[test]
    fn test_missing_directory() {
        let err = FighterDataWatcher::new(Path::new("/no/such/fighters")).err();
        assert!(matches!(err, Some(HotReloadError::MissingDirectory(_))));
    }

    #[test]
    fn test_fresh_watcher_has_nothing_pending() {
        let dir = tempfile::tempdir().unwrap();
        let watcher = FighterDataWatcher::new(dir.path()).unwrap();
        assert_eq!(watcher.dir(), dir.path());
        assert!(watcher.poll().is_empty());
    }

    #[test]
    fn test_apply_changes_reloads_matching_fighters() {
        let dir = tempfile::tempdir().unwrap();
        let mut def = FighterDef::training();
        def.stats.dash_speed = 1.4;
        let good = dir.path().join("training.json");
        std::fs::write(&good, serde_json::to_string(&def).unwrap()).unwrap();
        let bad = dir.path().join("broken.json");
        std::fs::write(&bad, "{ not json").unwrap();

        let mut world = MatchSetup::training(2).build().unwrap();
        let outcome = apply_changes(&mut world, &[good, bad.clone()]);
        assert_eq!(outcome.reloaded, vec!["Training".to_string()]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].0, bad);
        assert_eq!(world.fighter(0).unwrap().stats().dash_speed, 1.4);
    }

    #[test]
    fn test_invalid_stats_keep_previous() {
        let dir = tempfile::tempdir().unwrap();
        let mut def = FighterDef::training();
        def.stats.gravity = 0.0;
        let path = dir.path().join("training.json");
        std::fs::write(&path, serde_json::to_string(&def).unwrap()).unwrap();

        let mut world = MatchSetup::training(1).build().unwrap();
        let outcome = apply_changes(&mut world, &[path]);
        assert!(outcome.reloaded.is_empty());
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(world.fighter(0).unwrap().stats().gravity, 1.0);
    }
}
