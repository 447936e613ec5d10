//! Fighter Core - deterministic platform-fighter simulation
//!
//! This crate provides the per-fighter simulation of a platform fighting game:
//! - Fixed-timestep fighter state machine (movement, jumps, shields, ledges)
//! - Stage collision against aligned blocks and one-sided platforms
//! - Keyframed animation with fades, walk cycles and root motion
//! - Attack actions driven by frame-indexed event tables
//! - Sub-tick interpolation for rendering
//! - Replays with SHA3 state hashes, hot reload of fighter data
//! - Bevy plugin running the world on `FixedUpdate`

pub mod action;
pub mod animation;
pub mod config;
pub mod constants;
pub mod error;
pub mod fighter;
pub mod hotreload;
pub mod input;
pub mod logging;
pub mod physics;
pub mod plugin;
pub mod replay;
pub mod stage;
pub mod world;

pub use action::{ActionDef, ActionType, FinishReason};
pub use animation::{Armature, ClipLibrary, Pose};
pub use config::SimConfig;
pub use error::{ConfigError, HotReloadError, ReplayError};
pub use fighter::{Fighter, FighterDef, FighterState, Stats};
pub use input::Input;
pub use physics::{Facing, Tuning};
pub use stage::Stage;
pub use world::{FightWorld, MatchSetup};
