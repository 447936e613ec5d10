/// Verify recorded replays against the current simulation
///
/// Usage: cargo run --bin replay_check -- replays/match-42.json [more.json ...] [--config sim.json]
///
/// Each replay is re-simulated in a fresh training world with as many
/// fighters as the replay header lists; a header naming another stage or
/// other fighters is rejected. Exits non-zero if any replay fails to load
/// or no longer reproduces its recorded hashes.
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use fighter_core::config::SimConfig;
use fighter_core::logging::init_tracing;
use fighter_core::replay::{verify_replay, ReplayRecording, REPLAY_VERSION};
use fighter_core::world::MatchSetup;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config, paths) = split_args(&args)?;
    let config = match config {
        Some(path) => SimConfig::load(&path)
            .with_context(|| format!("loading simulation config {}", path.display()))?,
        None => SimConfig::default(),
    };
    init_tracing(&config.tracing);

    if paths.is_empty() {
        bail!("usage: replay_check <replay.json>... [--config sim.json]");
    }

    let mut failed = 0usize;
    for path in &paths {
        match check(path, &config) {
            Ok(ticks) => println!("  OK    {} ({} ticks)", path.display(), ticks),
            Err(e) => {
                failed += 1;
                println!("  FAIL  {}: {e:#}", path.display());
            }
        }
    }

    println!("\n{} replays checked, {} failed", paths.len(), failed);
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn check(path: &Path, config: &SimConfig) -> Result<u64> {
    let recording = ReplayRecording::load(path).context("loading replay")?;
    if recording.header.version != REPLAY_VERSION {
        bail!(
            "replay version {} is not supported (expected {})",
            recording.header.version,
            REPLAY_VERSION
        );
    }

    let mut setup = MatchSetup::training(recording.header.fighters.len());
    setup.config = config.clone();
    let mut world = setup.build().context("building match world")?;
    verify_replay(&recording, &mut world)?;
    info!(path = %path.display(), seed = ?recording.header.seed, "replay reproduced");
    Ok(recording.header.duration_ticks)
}

/// Separate `--config <path>` from the replay paths
fn split_args(args: &[String]) -> Result<(Option<PathBuf>, Vec<PathBuf>)> {
    let mut config = None;
    let mut paths = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let value = iter.next().context("--config needs a path")?;
            config = Some(PathBuf::from(value));
        } else {
            paths.push(PathBuf::from(arg));
        }
    }
    Ok((config, paths))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fighter_core::input::Input;
    use fighter_core::replay::{ReplayHeader, ReplayRecorder};

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_args() {
        let (config, paths) = split_args(&strings(&["a.json", "--config", "sim.json", "b.json"])).unwrap();
        assert_eq!(config, Some(PathBuf::from("sim.json")));
        assert_eq!(paths, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
        assert!(split_args(&strings(&["--config"])).is_err());
    }

    #[test]
    fn test_check_saved_replay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replay.json");

        let mut world = MatchSetup::training(1).build().unwrap();
        let header = ReplayHeader::for_world("saved", None, &world);
        let mut recorder = ReplayRecorder::new(header, 8);
        for tick in 0..64 {
            let input = if tick % 16 == 0 {
                Input::default().with_jump()
            } else {
                Input::default()
            };
            recorder.record(world.tick_count(), &[input]);
            world.tick(&[input]);
            recorder.checkpoint(&world);
        }
        let mut recording = recorder.finish(&world);
        recording.save(&path).unwrap();
        assert_eq!(check(&path, &SimConfig::default()).unwrap(), 64);

        recording.final_state_hash ^= 1;
        recording.save(&path).unwrap();
        assert!(check(&path, &SimConfig::default()).is_err());
    }

    #[test]
    fn test_check_rejects_other_setup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replay.json");

        let world = MatchSetup::training(2).build().unwrap();
        let header = ReplayHeader::for_world("elsewhere", None, &world);
        let mut recording = ReplayRecorder::new(header, 0).finish(&world);
        recording.header.stage = "Battlefield".to_string();
        recording.save(&path).unwrap();
        let err = check(&path, &SimConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("Battlefield"), "{err:#}");

        recording.header.stage = world.stage().name.clone();
        recording.header.fighters[0] = "Heavy".to_string();
        recording.save(&path).unwrap();
        let err = check(&path, &SimConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("Heavy"), "{err:#}");

        recording.header.fighters[0] = "Training".to_string();
        recording.save(&path).unwrap();
        assert_eq!(check(&path, &SimConfig::default()).unwrap(), 0);
    }
}
