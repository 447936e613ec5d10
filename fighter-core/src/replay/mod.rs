//! Replays & Determinism Checks
//!
//! A match is reproducible from its setup plus the per-tick inputs, so a
//! replay stores only those inputs. Verification re-simulates a fresh world
//! and compares SHA3 state hashes:
//! 1. Record: `ReplayRecorder::record` before every world tick, `checkpoint` after
//! 2. Finish: `ReplayRecorder::finish` stamps the final state hash
//! 3. Verify: `verify_replay` replays into a freshly built world; the first
//!    mismatching checkpoint reports the tick where the simulation diverged

use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::path::Path;

use crate::error::{read_json, ConfigError, ReplayError};
use crate::fighter::animation::AnimationKey;
use crate::fighter::Bookkeeping;
use crate::input::Input;
use crate::world::FightWorld;

pub const REPLAY_VERSION: u32 = 1;

/// Inputs for every fighter on one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    pub tick: u64,
    pub inputs: Vec<Input>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayHeader {
    pub replay_id: String,
    /// Seed of the input generator, when the inputs were generated
    pub seed: Option<u64>,
    pub stage: String,
    pub fighters: Vec<String>,
    pub duration_ticks: u64,
    pub version: u32,
}

impl ReplayHeader {
    pub fn for_world(replay_id: &str, seed: Option<u64>, world: &FightWorld) -> Self {
        Self {
            replay_id: replay_id.to_string(),
            seed,
            stage: world.stage().name.clone(),
            fighters: world.fighters().iter().map(|f| f.name().to_string()).collect(),
            duration_ticks: 0,
            version: REPLAY_VERSION,
        }
    }
}

/// State hash taken after a world tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub tick: u64,
    pub hash: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecording {
    pub header: ReplayHeader,
    pub frames: Vec<InputFrame>,
    pub checkpoints: Vec<Checkpoint>,
    pub final_state_hash: u64,
}

impl ReplayRecording {
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        read_json(path)
    }
}

/// Collects input frames and checkpoints while a match runs
#[derive(Debug, Clone)]
pub struct ReplayRecorder {
    header: ReplayHeader,
    frames: Vec<InputFrame>,
    checkpoints: Vec<Checkpoint>,
    checkpoint_interval: u64,
}

impl ReplayRecorder {
    /// `checkpoint_interval` of 0 disables intermediate checkpoints
    pub fn new(header: ReplayHeader, checkpoint_interval: u64) -> Self {
        Self {
            header,
            frames: Vec::new(),
            checkpoints: Vec::new(),
            checkpoint_interval,
        }
    }

    pub fn record(&mut self, tick: u64, inputs: &[Input]) {
        self.frames.push(InputFrame {
            tick,
            inputs: inputs.to_vec(),
        });
    }

    /// Hash the world if it sits on a checkpoint boundary
    pub fn checkpoint(&mut self, world: &FightWorld) {
        let tick = world.tick_count();
        if self.checkpoint_interval > 0 && tick % self.checkpoint_interval == 0 {
            self.checkpoints.push(Checkpoint {
                tick,
                hash: state_hash(world),
            });
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn finish(mut self, world: &FightWorld) -> ReplayRecording {
        self.header.duration_ticks = world.tick_count();
        ReplayRecording {
            header: self.header,
            frames: self.frames,
            checkpoints: self.checkpoints,
            final_state_hash: state_hash(world),
        }
    }
}

/// Digest of everything that determines how the match continues
pub fn state_hash(world: &FightWorld) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(world.tick_count().to_le_bytes());
    for fighter in world.fighters() {
        let status = fighter.status();
        let position = fighter.position();
        hasher.update((fighter.index() as u64).to_le_bytes());
        hasher.update(position.x.to_bits().to_le_bytes());
        hasher.update(position.y.to_bits().to_le_bytes());
        hasher.update(status.velocity.x.to_bits().to_le_bytes());
        hasher.update(status.velocity.y.to_bits().to_le_bytes());
        hasher.update([
            status.facing.as_i32() as u8,
            fighter.state() as u8,
            fighter.active_action_type() as u8,
            status.intangible as u8,
        ]);
        hasher.update(fighter.active_action_frame().unwrap_or(u32::MAX).to_le_bytes());
        hasher.update(fighter.state_progress().to_le_bytes());
        hasher.update(status.extra_jumps.to_le_bytes());
        let ledge = status.ledge.map_or(u64::MAX, |id| id.0 as u64);
        hasher.update(ledge.to_le_bytes());
        hasher.update(status.time_since_ledge.to_le_bytes());
        hash_bookkeeping(&mut hasher, &fighter.bookkeeping());
    }
    let digest = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(head)
}

fn hash_bookkeeping(hasher: &mut Sha3_256, book: &Bookkeeping) {
    let key = |k: Option<AnimationKey>| k.map_or(u8::MAX, |k| k as u8);
    for value in [
        book.translate.x,
        book.translate.y,
        book.brake_velocity,
        book.jump_velocity,
        book.anim_time_continuous,
        book.root_motion_last,
    ] {
        hasher.update(value.to_bits().to_le_bytes());
    }
    hasher.update(book.move_axis_x.to_le_bytes());
    hasher.update(book.brake_turn.to_le_bytes());
    hasher.update(book.anim_time_discrete.to_le_bytes());
    hasher.update(book.fade_progress.to_le_bytes());
    hasher.update(book.fade_frames.to_le_bytes());
    hasher.update([
        book.jump_held as u8,
        book.ignore_platforms as u8,
        book.on_platform as u8,
        book.turn_dash as u8,
        book.vertigo_active as u8,
        key(book.animation),
        key(book.next_animation),
        key(book.static_pose),
    ]);
}

/// Feed a recording's inputs into `world`, returning the final state hash
pub fn play_back(recording: &ReplayRecording, world: &mut FightWorld) -> Result<u64, ReplayError> {
    check_world(recording, world)?;
    let mut checkpoints = recording.checkpoints.iter().peekable();

    for frame in &recording.frames {
        world.tick(&frame.inputs);
        while let Some(checkpoint) = checkpoints.next_if(|c| c.tick <= world.tick_count()) {
            let actual = state_hash(world);
            if checkpoint.tick == world.tick_count() && actual != checkpoint.hash {
                return Err(ReplayError::Diverged {
                    tick: checkpoint.tick,
                    expected: checkpoint.hash,
                    actual,
                });
            }
        }
    }
    Ok(state_hash(world))
}

/// Re-simulate a recording into a fresh world and compare every hash
pub fn verify_replay(recording: &ReplayRecording, world: &mut FightWorld) -> Result<(), ReplayError> {
    let actual = play_back(recording, world)?;
    if actual != recording.final_state_hash {
        return Err(ReplayError::Diverged {
            tick: world.tick_count(),
            expected: recording.final_state_hash,
            actual,
        });
    }
    tracing::info!(
        replay = %recording.header.replay_id,
        ticks = world.tick_count(),
        "replay verified"
    );
    Ok(())
}

fn check_world(recording: &ReplayRecording, world: &FightWorld) -> Result<(), ReplayError> {
    if world.tick_count() != 0 {
        return Err(ReplayError::NotFresh(world.tick_count()));
    }
    let header = &recording.header;
    let expected = header.fighters.len();
    let actual = world.fighters().len();
    if expected != actual {
        return Err(ReplayError::FighterCount { expected, actual });
    }
    if header.stage != world.stage().name {
        return Err(ReplayError::StageMismatch {
            expected: header.stage.clone(),
            actual: world.stage().name.clone(),
        });
    }
    for (index, (expected, fighter)) in header.fighters.iter().zip(world.fighters()).enumerate() {
        if expected != fighter.name() {
            return Err(ReplayError::FighterMismatch {
                index,
                expected: expected.clone(),
                actual: fighter.name().to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::MatchSetup;
    use bevy::math::Vec2;

    fn scripted_input(tick: u64) -> Vec<Input> {
        let walk = Input::from_stick(Vec2::new(1.0, 0.0));
        let jump = Input::default().with_jump();
        let attack = Input::default().with_attack();
        let first = match tick % 60 {
            0 => jump,
            20 => attack,
            _ => walk,
        };
        vec![first, Input::from_stick(Vec2::new(-0.5, 0.0))]
    }

    fn record(ticks: u64) -> ReplayRecording {
        let setup = MatchSetup::training(2);
        let mut world = setup.build().unwrap();
        let header = ReplayHeader::for_world("scripted", None, &world);
        let mut recorder = ReplayRecorder::new(header, 16);
        for _ in 0..ticks {
            let inputs = scripted_input(world.tick_count());
            recorder.record(world.tick_count(), &inputs);
            world.tick(&inputs);
            recorder.checkpoint(&world);
        }
        recorder.finish(&world)
    }

    #[test]
    fn test_identical_worlds_hash_equal() {
        let a = MatchSetup::training(2).build().unwrap();
        let b = MatchSetup::training(2).build().unwrap();
        assert_eq!(state_hash(&a), state_hash(&b));
    }

    #[test]
    fn test_hash_changes_with_state() {
        let mut world = MatchSetup::training(1).build().unwrap();
        let before = state_hash(&world);
        world.tick(&[Input::from_stick(Vec2::new(1.0, 0.0))]);
        assert_ne!(before, state_hash(&world));
    }

    #[test]
    fn test_recorded_match_verifies() {
        let recording = record(200);
        assert_eq!(recording.header.duration_ticks, 200);
        assert_eq!(recording.frames.len(), 200);
        assert_eq!(recording.checkpoints.len(), 12);
        let mut world = MatchSetup::training(2).build().unwrap();
        verify_replay(&recording, &mut world).unwrap();
    }

    #[test]
    fn test_tampered_input_detected() {
        let mut recording = record(120);
        recording.frames[5].inputs[0] = Input::default().with_jump();
        let mut world = MatchSetup::training(2).build().unwrap();
        let err = verify_replay(&recording, &mut world).unwrap_err();
        assert!(matches!(err, ReplayError::Diverged { tick: 16, .. }));
    }

    #[test]
    fn test_wrong_fighter_count_rejected() {
        let recording = record(10);
        let mut world = MatchSetup::training(3).build().unwrap();
        let err = verify_replay(&recording, &mut world).unwrap_err();
        assert!(matches!(err, ReplayError::FighterCount { expected: 2, actual: 3 }));
    }

    #[test]
    fn test_renamed_fighter_rejected() {
        let mut recording = record(10);
        recording.header.fighters[1] = "Someone".to_string();
        let mut world = MatchSetup::training(2).build().unwrap();
        let err = verify_replay(&recording, &mut world).unwrap_err();
        assert!(matches!(err, ReplayError::FighterMismatch { index: 1, .. }));
    }

    #[test]
    fn test_other_stage_rejected() {
        let mut recording = record(10);
        recording.header.stage = "Elsewhere".to_string();
        let mut world = MatchSetup::training(2).build().unwrap();
        let err = verify_replay(&recording, &mut world).unwrap_err();
        assert!(matches!(err, ReplayError::StageMismatch { .. }));
    }

    #[test]
    fn test_used_world_rejected() {
        let recording = record(10);
        let mut world = MatchSetup::training(2).build().unwrap();
        world.tick(&[]);
        assert!(matches!(
            verify_replay(&recording, &mut world),
            Err(ReplayError::NotFresh(1))
        ));
    }

    #[test]
    fn test_recording_json_roundtrip() {
        let recording = record(30);
        let json = recording.to_json().unwrap();
        let restored = ReplayRecording::from_json(&json).unwrap();
        assert_eq!(restored, recording);
    }
}
