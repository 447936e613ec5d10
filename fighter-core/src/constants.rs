//! Centralized simulation constants for the fighter core.
//!
//! These are the defaults behind [`crate::physics::Tuning`]. Simulation code
//! never reads them directly; it reads the tuning struct handed to the
//! physics step so tests can override any of them.

// =====================================================
// Timing
// =====================================================

/// Simulation ticks per second
pub const TICK_RATE: f32 = 48.0;

/// Ticks between entering PreJump and leaving the ground
pub const JUMP_DELAY: u32 = 4;

/// Ticks spent in Landing before control returns
pub const LANDING_LAG: u32 = 4;

/// Ticks after a brake turn during which a tap commits to a turn-dash
pub const DASH_TURN_LIMIT: u32 = 4;

/// Share of terminal fall speed a jump animation spans past its launch speed
pub const JUMP_ANIM_FALL_SHARE: f32 = 0.75;

// =====================================================
// Horizontal Movement
// =====================================================

/// Base walk speed, scaled by `Stats::walk_speed` (units per second)
pub const WALK_SPEED: f32 = 3.0;

/// Base dash speed, scaled by `Stats::dash_speed`
pub const DASH_SPEED: f32 = 6.0;

/// Base air drift speed, scaled by `Stats::air_speed`
pub const AIR_SPEED: f32 = 3.0;

/// Per-tick acceleration while walking, scaled by traction
pub const WALK_MOBILITY: f32 = 1.0;

/// Per-tick acceleration while dashing, scaled by traction
pub const DASH_MOBILITY: f32 = 1.5;

/// Per-tick deceleration on the ground, scaled by traction
pub const LAND_FRICTION: f32 = 0.5;

/// Per-tick acceleration in the air, scaled by `Stats::air_mobility`
pub const AIR_MOBILITY: f32 = 0.5;

/// Per-tick deceleration in the air, scaled by `Stats::air_friction`
pub const AIR_FRICTION: f32 = 0.2;

// =====================================================
// Vertical Movement
// =====================================================

/// Per-tick gravity, scaled by `Stats::gravity`
pub const GRAVITY: f32 = 0.5;

/// Terminal fall speed, scaled by `Stats::fall_speed`
pub const FALL_SPEED: f32 = 12.0;

// =====================================================
// Ledges
// =====================================================

/// Horizontal push away from the stage when letting go of a ledge
pub const LEDGE_DROP_VELOCITY: f32 = 1.0;

/// Ticks after dropping a ledge before any ledge can be caught again
pub const NO_LEDGE_CATCH_TIME: u32 = 48;

/// Maximum distance between fighter origin and ledge point for a catch
pub const LEDGE_GRAB_DISTANCE: f32 = 1.2;

// =====================================================
// Actions
// =====================================================

/// Length of the placeholder action used when a definition is missing
pub const FALLBACK_ACTION_FRAMES: u32 = 32;
