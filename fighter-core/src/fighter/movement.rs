//! Input-driven state transitions and horizontal velocity shaping.
//!
//! Each state has a fixed priority list; the first entry whose condition
//! holds wins and no other transition happens that tick.

use bevy::math::Vec2;

use super::transitions::TransitionKey;
use super::{Fighter, FighterState};
use crate::input::Input;
use crate::physics::{apply_horizontal_move, Facing};
use crate::stage::Stage;

/// Everything the transition choice depends on besides the state itself
#[derive(Debug, Clone, Copy)]
pub struct MovementContext {
    pub input: Input,
    pub facing: Facing,
    pub on_platform: bool,
    pub extra_jumps: u32,
    pub has_ledge: bool,
    /// Direction of the held ledge, while hanging
    pub ledge_direction: Option<Facing>,
}

/// Pick this tick's movement transition, if any
pub fn movement_transition(state: FighterState, ctx: &MovementContext) -> Option<TransitionKey> {
    let input = &ctx.input;
    let facing = ctx.facing.as_i32();
    let drop_through = input.mash_axis.y == -1 && ctx.on_platform;
    let air_hop = input.press_jump && ctx.extra_jumps > 0;

    match state {
        FighterState::Neutral => {
            if input.press_jump {
                Some(TransitionKey::MiscPrejump)
            } else if input.hold_shield {
                Some(TransitionKey::NeutralShield)
            } else if drop_through {
                Some(TransitionKey::PlatformDrop)
            } else if input.float_axis.y <= -1.0 {
                Some(TransitionKey::NeutralCrouch)
            } else if input.float_axis.x != 0.0 {
                Some(TransitionKey::NeutralWalking)
            } else {
                None
            }
        }
        FighterState::Walking => {
            if input.press_jump {
                Some(TransitionKey::MiscPrejump)
            } else if input.press_shield {
                Some(TransitionKey::WalkingShield)
            } else if drop_through {
                Some(TransitionKey::PlatformDrop)
            } else if input.float_axis.y <= -1.0 {
                Some(TransitionKey::WalkingCrouch)
            } else if input.float_axis.x == 0.0 {
                Some(TransitionKey::WalkingNeutral)
            } else if input.mash_axis.x != 0 {
                Some(TransitionKey::WalkingDashing)
            } else {
                None
            }
        }
        FighterState::Dashing => {
            if input.press_jump {
                Some(TransitionKey::MiscPrejump)
            } else if input.press_shield {
                Some(TransitionKey::DashingShield)
            } else if input.norm_axis.x != facing {
                Some(TransitionKey::DashingBrake)
            } else {
                None
            }
        }
        FighterState::Brake => input.press_jump.then_some(TransitionKey::MiscPrejump),
        FighterState::Crouch => {
            if input.press_jump {
                Some(TransitionKey::MiscPrejump)
            } else if input.press_shield {
                Some(TransitionKey::CrouchShield)
            } else if drop_through {
                Some(TransitionKey::PlatformDrop)
            } else if input.float_axis.y > -1.0 {
                Some(TransitionKey::CrouchNeutral)
            } else {
                None
            }
        }
        FighterState::Jumping | FighterState::Falling => {
            if ctx.has_ledge {
                Some(TransitionKey::AirLedge)
            } else if air_hop {
                Some(TransitionKey::AirHop)
            } else if input.press_shield {
                Some(TransitionKey::AirDodge)
            } else {
                None
            }
        }
        FighterState::Shield => {
            if input.press_jump {
                Some(TransitionKey::MiscPrejump)
            } else if !input.hold_shield {
                Some(TransitionKey::ShieldNeutral)
            } else if input.mash_axis.x == -facing {
                Some(TransitionKey::ShieldEvadeBack)
            } else if input.mash_axis.x == facing {
                Some(TransitionKey::ShieldEvadeForward)
            } else if input.mash_axis.y != 0 {
                Some(TransitionKey::ShieldDodge)
            } else {
                None
            }
        }
        FighterState::LedgeHang => {
            let away = ctx
                .ledge_direction
                .is_some_and(|dir| input.int_axis.x / 2 == dir.as_i32());
            if input.press_jump {
                Some(TransitionKey::LedgeJump)
            } else if input.int_axis.y == 2 {
                Some(TransitionKey::LedgeClimb)
            } else if !ctx.has_ledge || input.int_axis.y == -2 || away {
                Some(TransitionKey::LedgeDrop)
            } else {
                None
            }
        }
        FighterState::PreJump
        | FighterState::Prone
        | FighterState::Dodge
        | FighterState::EvadeBack
        | FighterState::EvadeForward
        | FighterState::AirDodge
        | FighterState::Knocked
        | FighterState::Stunned
        | FighterState::Helpless
        | FighterState::LedgeClimb
        | FighterState::Charge
        | FighterState::Attack
        | FighterState::AirAttack
        | FighterState::Landing
        | FighterState::Freeze
        | FighterState::EditorPreview => None,
    }
}

impl Fighter {
    pub(crate) fn handle_input_movement(&mut self, input: &Input, stage: &Stage) {
        match self.state {
            FighterState::Jumping | FighterState::Falling
                if self.status.time_since_ledge > self.tuning.no_ledge_catch_time =>
            {
                let grabbed = stage.find_ledge(
                    self.current.position,
                    input.norm_axis.x,
                    self.tuning.ledge_grab_distance,
                );
                if let Some(id) = grabbed {
                    self.status.ledge = Some(id);
                    if let Some(ledge) = stage.ledge(id) {
                        self.status.facing = ledge.direction.flipped();
                    }
                }
            }
            FighterState::Neutral => {
                if let Some(facing) = Facing::from_sign(input.float_axis.x) {
                    self.status.facing = facing;
                }
            }
            FighterState::Brake if !input.press_jump => self.update_brake_turn(input),
            _ => {}
        }
        if matches!(self.state, FighterState::PreJump | FighterState::Jumping) {
            self.jump_held &= input.hold_jump;
        }
        self.move_axis_x = input.int_axis.x;

        let ctx = MovementContext {
            input: *input,
            facing: self.status.facing,
            on_platform: self.on_platform,
            extra_jumps: self.status.extra_jumps,
            has_ledge: self.status.ledge.is_some(),
            ledge_direction: self
                .status
                .ledge
                .and_then(|id| stage.ledge(id))
                .map(|ledge| ledge.direction),
        };
        if let Some(key) = movement_transition(self.state, &ctx) {
            self.apply_movement_transition(key, input);
        }

        self.shape_horizontal_velocity(input);

        if !matches!(self.state, FighterState::LedgeHang | FighterState::LedgeClimb) {
            self.status.ledge = None;
        }
    }

    /// Turn around while braking; a tap back in the new direction soon after
    /// commits to dashing that way once the brake ends
    fn update_brake_turn(&mut self, input: &Input) {
        let facing = self.status.facing.as_i32();
        if self.brake_turn == 0 {
            if input.norm_axis.x == -facing {
                self.brake_turn = -facing;
                self.state_transition(TransitionKey::BrakeTurnDash);
            }
        } else if !self.turn_dash && self.brake_turn != facing {
            let limit = self.tuning.dash_turn_limit;
            if self.state_progress < limit {
                if input.mash_axis.x == self.brake_turn {
                    self.turn_dash = true;
                }
            } else if self.state_progress == limit {
                if let Some(turned) = Facing::from_sign(self.brake_turn as f32) {
                    self.status.facing = turned;
                }
                self.brake_velocity = self.status.velocity.x.abs();
                self.state_transition(TransitionKey::BrakeTurnBrake);
            }
        }
    }

    fn apply_movement_transition(&mut self, key: TransitionKey, input: &Input) {
        let gravity = self.stats.gravity * self.tuning.gravity;
        match key {
            TransitionKey::MiscPrejump => self.jump_held = true,
            TransitionKey::AirHop => {
                self.status.extra_jumps -= 1;
                self.jump_velocity =
                    self.tuning.launch_velocity(self.stats.air_hop_height, gravity);
                self.status.velocity.y = self.jump_velocity;
            }
            TransitionKey::DashingBrake => {
                self.brake_velocity = self.status.velocity.x.abs();
            }
            TransitionKey::LedgeJump => {
                self.status.extra_jumps = self.stats.extra_jumps;
                self.status.velocity = Vec2::new(
                    0.0,
                    self.tuning.launch_velocity(self.stats.air_hop_height, gravity),
                );
                self.status.ledge = None;
                self.status.time_since_ledge = 0;
            }
            TransitionKey::LedgeDrop => {
                self.status.ledge = None;
                self.status.velocity = Vec2::new(
                    -self.status.facing.sign() * self.tuning.ledge_drop_velocity,
                    0.0,
                );
                self.status.time_since_ledge = 0;
            }
            TransitionKey::AirLedge => {
                self.status.velocity = Vec2::ZERO;
                self.status.extra_jumps = self.stats.extra_jumps;
            }
            TransitionKey::PlatformDrop => self.ignore_platforms = true,
            TransitionKey::WalkingDashing => {
                if let Some(facing) = Facing::from_sign(input.mash_axis.x as f32) {
                    self.status.facing = facing;
                }
            }
            _ => {}
        }
        self.state_transition(key);
    }

    /// Accelerate toward the stick target; the friction margin is taken off again in physics
    fn shape_horizontal_velocity(&mut self, input: &Input) {
        let x = input.float_axis.x;
        let stats = &self.stats;
        let tuning = &self.tuning;
        let (mobility, target) = match self.state {
            FighterState::Walking => (
                stats.traction * tuning.walk_mobility,
                x.abs() * stats.walk_speed * tuning.walk_speed + stats.traction * tuning.land_friction,
            ),
            FighterState::Dashing => (
                stats.traction * tuning.dash_mobility,
                x.abs() * stats.dash_speed * tuning.dash_speed + stats.traction * tuning.land_friction,
            ),
            state if state.is_aerial() => (
                stats.air_mobility * tuning.air_mobility,
                x.abs() * stats.air_speed * tuning.air_speed
                    + stats.air_friction * tuning.air_friction,
            ),
            _ => return,
        };
        self.status.velocity.x = apply_horizontal_move(self.status.velocity.x, x, mobility, target);
    }
}
