//! Planar Physics Primitives
//!
//! - `Tuning`: every physics constant, passed explicitly into the tick
//! - `Facing`: left/right orientation as a signed unit
//! - `LocalDiamond` / `PhysicsDiamond`: the fighter's four-point collision extent
//! - Friction, gravity and horizontal acceleration helpers

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::ConfigError;

// ============================================================================
// Tuning
// ============================================================================

/// Physics tuning shared by every fighter in a world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub tick_rate: f32,
    pub walk_speed: f32,
    pub dash_speed: f32,
    pub air_speed: f32,
    pub walk_mobility: f32,
    pub dash_mobility: f32,
    pub land_friction: f32,
    pub air_mobility: f32,
    pub air_friction: f32,
    pub gravity: f32,
    pub fall_speed: f32,
    pub jump_delay: u32,
    pub landing_lag: u32,
    pub dash_turn_limit: u32,
    pub jump_anim_fall_share: f32,
    pub ledge_drop_velocity: f32,
    pub no_ledge_catch_time: u32,
    pub ledge_grab_distance: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tick_rate: constants::TICK_RATE,
            walk_speed: constants::WALK_SPEED,
            dash_speed: constants::DASH_SPEED,
            air_speed: constants::AIR_SPEED,
            walk_mobility: constants::WALK_MOBILITY,
            dash_mobility: constants::DASH_MOBILITY,
            land_friction: constants::LAND_FRICTION,
            air_mobility: constants::AIR_MOBILITY,
            air_friction: constants::AIR_FRICTION,
            gravity: constants::GRAVITY,
            fall_speed: constants::FALL_SPEED,
            jump_delay: constants::JUMP_DELAY,
            landing_lag: constants::LANDING_LAG,
            dash_turn_limit: constants::DASH_TURN_LIMIT,
            jump_anim_fall_share: constants::JUMP_ANIM_FALL_SHARE,
            ledge_drop_velocity: constants::LEDGE_DROP_VELOCITY,
            no_ledge_catch_time: constants::NO_LEDGE_CATCH_TIME,
            ledge_grab_distance: constants::LEDGE_GRAB_DISTANCE,
        }
    }
}

impl Tuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("tick_rate", self.tick_rate),
            ("walk_speed", self.walk_speed),
            ("dash_speed", self.dash_speed),
            ("air_speed", self.air_speed),
            ("gravity", self.gravity),
            ("fall_speed", self.fall_speed),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::invalid(format!(
                    "tuning.{name} must be positive, got {value}"
                )));
            }
        }
        if self.jump_delay == 0 {
            return Err(ConfigError::invalid("tuning.jump_delay must be at least 1"));
        }
        Ok(())
    }

    /// Vertical launch speed reaching `height` under `gravity` (per-tick units)
    pub fn launch_velocity(&self, height: f32, gravity: f32) -> f32 {
        (2.0 * height * gravity * self.tick_rate).sqrt()
    }
}

// ============================================================================
// Facing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

impl Default for Facing {
    fn default() -> Self {
        Facing::Right
    }
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn as_i32(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Facing for a signed value; zero has no facing
    pub fn from_sign(value: f32) -> Option<Self> {
        if value > 0.0 {
            Some(Facing::Right)
        } else if value < 0.0 {
            Some(Facing::Left)
        } else {
            None
        }
    }
}

// ============================================================================
// Collision diamond
// ============================================================================

/// Diamond extents relative to the fighter origin (the bottom point)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalDiamond {
    pub half_width: f32,
    pub offset_cross: f32,
    pub offset_top: f32,
}

impl Default for LocalDiamond {
    fn default() -> Self {
        Self {
            half_width: 0.4,
            offset_cross: 0.7,
            offset_top: 1.4,
        }
    }
}

impl LocalDiamond {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let well_formed = self.half_width > 0.0
            && self.offset_cross > 0.0
            && self.offset_top > self.offset_cross;
        if well_formed {
            Ok(())
        } else {
            Err(ConfigError::invalid(format!("malformed diamond {self:?}")))
        }
    }

    pub fn cross(&self) -> Vec2 {
        Vec2::new(0.0, self.offset_cross)
    }

    /// Outward unit normal of the lower-left edge. The lower-right edge mirrors it in x.
    pub fn normal_lower_left(&self) -> Vec2 {
        Vec2::new(-self.offset_cross, -self.half_width).normalize_or_zero()
    }

    /// Outward unit normal of the upper-left edge. The upper-right edge mirrors it in x.
    pub fn normal_upper_left(&self) -> Vec2 {
        Vec2::new(-(self.offset_top - self.offset_cross), self.half_width).normalize_or_zero()
    }
}

/// World-space diamond corners
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhysicsDiamond {
    pub x_neg: Vec2,
    pub x_pos: Vec2,
    pub y_neg: Vec2,
    pub y_pos: Vec2,
}

impl PhysicsDiamond {
    pub fn new(local: &LocalDiamond, origin: Vec2) -> Self {
        let cross_y = origin.y + local.offset_cross;
        Self {
            x_neg: Vec2::new(origin.x - local.half_width, cross_y),
            x_pos: Vec2::new(origin.x + local.half_width, cross_y),
            y_neg: origin,
            y_pos: Vec2::new(origin.x, origin.y + local.offset_top),
        }
    }

    pub fn centre(&self) -> Vec2 {
        Vec2::new(self.y_neg.x, self.x_neg.y)
    }
}

// ============================================================================
// Velocity helpers
// ============================================================================

/// Clamp `value` to [-max, max]
pub fn clamp_magnitude(value: f32, max: f32) -> f32 {
    value.clamp(-max, max)
}

/// Move `value` toward zero by `amount` without crossing it
pub fn apply_friction(value: f32, amount: f32) -> f32 {
    if value < 0.0 {
        (value + amount).min(0.0)
    } else {
        (value - amount).max(0.0)
    }
}

/// Accelerate `velocity` toward `target` in the stick direction.
///
/// Already at or above target speed, or no stick input: unchanged.
pub fn apply_horizontal_move(velocity: f32, axis: f32, mobility: f32, target: f32) -> f32 {
    if axis == 0.0 || velocity.abs() >= target {
        return velocity;
    }
    clamp_magnitude(velocity + mobility.copysign(axis), target)
}
