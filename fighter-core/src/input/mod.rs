//! Decoded per-tick controller input.
//!
//! The device layer produces one [`Input`] per fighter per tick:
//! - `float_axis`: analog stick, each component in [-1, 1]
//! - `int_axis`: stick quantised to -2..=2 (2 = fully tilted)
//! - `norm_axis`: sign of `int_axis`
//! - `mash_axis`: direction of a stick tap on this tick, else zero
//! - `mod_axis`: smash modifier direction on this tick, else zero
//! - `press_*` flags are edges (true on one tick per physical press),
//!   `hold_*` flags are level-sampled

use bevy::math::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// One tick of decoded input for one fighter
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Input {
    pub press_attack: bool,
    pub press_jump: bool,
    pub press_shield: bool,

    pub hold_attack: bool,
    pub hold_jump: bool,
    pub hold_shield: bool,

    pub float_axis: Vec2,
    pub int_axis: IVec2,
    pub norm_axis: IVec2,
    pub mash_axis: IVec2,
    pub mod_axis: IVec2,
}

impl Input {
    /// Input with only the stick set; derived integer axes follow the float axis.
    pub fn from_stick(axis: Vec2) -> Self {
        let float_axis = axis.clamp(Vec2::NEG_ONE, Vec2::ONE);
        let int_axis = IVec2::new(quantise(float_axis.x), quantise(float_axis.y));
        Self {
            float_axis,
            int_axis,
            norm_axis: int_axis.signum(),
            ..Default::default()
        }
    }

    pub fn with_jump(mut self) -> Self {
        self.press_jump = true;
        self.hold_jump = true;
        self
    }

    pub fn holding_jump(mut self) -> Self {
        self.hold_jump = true;
        self
    }

    pub fn with_attack(mut self) -> Self {
        self.press_attack = true;
        self.hold_attack = true;
        self
    }

    pub fn holding_attack(mut self) -> Self {
        self.hold_attack = true;
        self
    }

    pub fn with_shield(mut self) -> Self {
        self.press_shield = true;
        self.hold_shield = true;
        self
    }

    pub fn holding_shield(mut self) -> Self {
        self.hold_shield = true;
        self
    }

    pub fn with_mash(mut self, mash: IVec2) -> Self {
        self.mash_axis = mash;
        self
    }

    pub fn with_mod(mut self, modifier: IVec2) -> Self {
        self.mod_axis = modifier;
        self
    }

    /// Fold a newer sample into a pending one.
    ///
    /// Edges accumulate until consumed, levels and the stick take the newest value.
    pub fn merge(&mut self, newer: &Input) {
        self.press_attack |= newer.press_attack;
        self.press_jump |= newer.press_jump;
        self.press_shield |= newer.press_shield;

        self.hold_attack = newer.hold_attack;
        self.hold_jump = newer.hold_jump;
        self.hold_shield = newer.hold_shield;

        self.float_axis = newer.float_axis;
        self.int_axis = newer.int_axis;
        self.norm_axis = newer.norm_axis;

        if newer.mash_axis != IVec2::ZERO {
            self.mash_axis = newer.mash_axis;
        }
        if newer.mod_axis != IVec2::ZERO {
            self.mod_axis = newer.mod_axis;
        }
    }

    /// Clear edge signals after a tick has consumed them.
    pub fn consume_edges(&mut self) {
        self.press_attack = false;
        self.press_jump = false;
        self.press_shield = false;
        self.mash_axis = IVec2::ZERO;
        self.mod_axis = IVec2::ZERO;
    }
}

fn quantise(value: f32) -> i32 {
    (value * 2.0).round().clamp(-2.0, 2.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_stick_quantises() {
        let input = Input::from_stick(Vec2::new(1.0, -0.5));
        assert_eq!(input.int_axis, IVec2::new(2, -1));
        assert_eq!(input.norm_axis, IVec2::new(1, -1));
    }

    #[test]
    fn test_from_stick_clamps() {
        let input = Input::from_stick(Vec2::new(3.0, -7.0));
        assert_eq!(input.float_axis, Vec2::new(1.0, -1.0));
        assert_eq!(input.int_axis, IVec2::new(2, -2));
    }

    #[test]
    fn test_centred_stick_is_zero() {
        let input = Input::from_stick(Vec2::ZERO);
        assert_eq!(input.int_axis, IVec2::ZERO);
        assert_eq!(input.norm_axis, IVec2::ZERO);
    }

    #[test]
    fn test_merge_keeps_edges() {
        let mut pending = Input::default().with_jump();
        pending.merge(&Input::from_stick(Vec2::X));
        assert!(pending.press_jump);
        assert!(!pending.hold_jump);
        assert_eq!(pending.float_axis, Vec2::X);
    }

    #[test]
    fn test_merge_keeps_mash_until_consumed() {
        let mut pending = Input::default().with_mash(IVec2::new(1, 0));
        pending.merge(&Input::default());
        assert_eq!(pending.mash_axis, IVec2::new(1, 0));
        pending.consume_edges();
        assert_eq!(pending.mash_axis, IVec2::ZERO);
        assert!(!pending.press_attack);
    }

    #[test]
    fn test_input_json_roundtrip() {
        let input = Input::from_stick(Vec2::new(0.5, 0.0)).with_attack();
        let json = serde_json::to_string(&input).unwrap();
        let restored: Input = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, input);
    }
}
