//! Per-tick physics: friction, gravity, state timers and stage collision.

use bevy::math::Vec2;

use super::transitions::TransitionKey;
use super::{Fighter, FighterState};
use crate::physics::{apply_friction, Facing, PhysicsDiamond};
use crate::stage::Stage;

impl Fighter {
    pub(crate) fn update_physics(&mut self, stage: &Stage) {
        self.diamond = PhysicsDiamond::new(&self.local_diamond, self.current.position);

        match self.state {
            FighterState::Freeze | FighterState::EditorPreview => return,
            FighterState::LedgeHang | FighterState::LedgeClimb => {
                self.hold_ledge(stage);
                self.state_progress += 1;
                return;
            }
            _ => {}
        }

        self.status.time_since_ledge = self.status.time_since_ledge.saturating_add(1);
        self.apply_friction_step();
        self.apply_gravity();
        self.update_state_timers();
        self.move_through_stage(stage);

        self.state_progress += 1;
    }

    fn apply_friction_step(&mut self) {
        let amount = if self.state.is_grounded() {
            self.stats.traction * self.tuning.land_friction
        } else if self.state.is_aerial() {
            self.stats.air_friction * self.tuning.air_friction
        } else {
            return;
        };
        self.status.velocity.x = apply_friction(self.status.velocity.x, amount);
    }

    fn apply_gravity(&mut self) {
        let velocity = &mut self.status.velocity;
        velocity.y -= self.stats.gravity * self.tuning.gravity;
        velocity.y = velocity.y.max(-self.stats.fall_speed * self.tuning.fall_speed);
    }

    /// Change state without a transition, leaving the animation running
    fn settle_state(&mut self, state: FighterState) {
        self.state = state;
        self.state_progress = 0;
    }

    fn update_state_timers(&mut self) {
        let progress = self.state_progress;
        match self.state {
            FighterState::PreJump if progress >= self.tuning.jump_delay => {
                let height = if self.jump_held {
                    self.stats.jump_height
                } else {
                    self.stats.hop_height
                };
                let gravity = self.stats.gravity * self.tuning.gravity;
                self.jump_velocity = self.tuning.launch_velocity(height, gravity);
                self.status.velocity.y = self.jump_velocity;
                self.jump_held = false;
                let key = if self.move_axis_x.signum() == -self.status.facing.as_i32() {
                    TransitionKey::JumpBack
                } else {
                    TransitionKey::JumpForward
                };
                self.state_transition(key);
            }
            FighterState::Jumping if self.status.velocity.y <= 0.0 => {
                self.settle_state(FighterState::Falling);
            }
            FighterState::Brake if self.status.velocity.x == 0.0 => {
                if self.turn_dash {
                    if let Some(facing) = Facing::from_sign(self.brake_turn as f32) {
                        self.status.facing = facing;
                    }
                    self.status.velocity.x = self.status.facing.sign()
                        * self.stats.traction
                        * self.tuning.dash_mobility
                        * 2.0;
                    self.state_transition(TransitionKey::InstantDashing);
                } else {
                    self.state_transition(TransitionKey::InstantNeutral);
                }
            }
            FighterState::Landing if progress >= self.tuning.landing_lag => {
                self.settle_state(FighterState::Neutral);
            }
            FighterState::Dodge => {
                let window = self.stats.dodge;
                self.status.intangible = window.contains(progress);
                if progress >= window.finish {
                    self.state_transition(TransitionKey::InstantNeutral);
                }
            }
            FighterState::EvadeBack => {
                let window = self.stats.evade;
                self.status.intangible = window.contains(progress);
                if progress >= window.finish {
                    self.state_transition(TransitionKey::InstantNeutral);
                }
            }
            FighterState::EvadeForward => {
                let window = self.stats.evade;
                self.status.intangible = window.contains(progress);
                if progress >= window.finish {
                    // rolled through to the other side
                    self.status.facing = self.status.facing.flipped();
                    self.state_transition(TransitionKey::InstantNeutral);
                }
            }
            FighterState::AirDodge => {
                let window = self.stats.air_dodge;
                self.status.intangible = window.contains(progress);
                if progress >= window.finish {
                    self.state_transition(TransitionKey::InstantFalling);
                }
            }
            _ => {}
        }
    }

    fn move_through_stage(&mut self, stage: &Stage) {
        let displacement = self.status.velocity / self.tuning.tick_rate + self.translate;
        self.translate = Vec2::ZERO;

        let edge_stop = match self.state {
            FighterState::EvadeBack
            | FighterState::EvadeForward
            | FighterState::Attack
            | FighterState::Shield => true,
            FighterState::Walking | FighterState::Brake | FighterState::Neutral => {
                self.move_axis_x.abs() < 2
            }
            _ => false,
        };

        let attempt = stage.attempt_move(
            &self.local_diamond,
            self.current.position,
            displacement,
            edge_stop,
            self.ignore_platforms,
        );
        self.ignore_platforms = false;

        let teeters = matches!(
            self.state,
            FighterState::Walking | FighterState::Brake | FighterState::Neutral
        );
        if teeters && !self.vertigo_active && attempt.edge == self.status.facing.as_i32() {
            self.state_transition(TransitionKey::MiscVertigo);
            self.vertigo_active = true;
        }

        self.current.position = attempt.result;
        self.on_platform = attempt.collide_floor && attempt.on_platform;

        if attempt.collide_floor {
            self.land();
        } else {
            self.leave_ground();
        }

        if attempt.collide_ceiling {
            self.status.velocity.y = 0.0;
        }

        if attempt.collide_wall {
            self.status.velocity.x = 0.0;
            if matches!(self.state, FighterState::Walking | FighterState::Dashing) {
                self.state_transition(TransitionKey::InstantNeutral);
            }
        }

        self.diamond = PhysicsDiamond::new(&self.local_diamond, self.current.position);
    }

    fn land(&mut self) {
        self.status.velocity.y = 0.0;
        match self.state {
            FighterState::Jumping
            | FighterState::Falling
            | FighterState::AirDodge
            | FighterState::Helpless
            | FighterState::Knocked
            | FighterState::Stunned => {
                self.status.extra_jumps = self.stats.extra_jumps;
                self.state_transition(TransitionKey::LandClean);
            }
            FighterState::AirAttack => {
                self.cancel_action();
                self.status.extra_jumps = self.stats.extra_jumps;
                self.state_transition(TransitionKey::LandClean);
            }
            _ => {}
        }
    }

    fn leave_ground(&mut self) {
        match self.state {
            FighterState::Walking => self.state_transition(TransitionKey::WalkingDive),
            FighterState::Dashing => self.state_transition(TransitionKey::DashingDive),
            FighterState::Attack | FighterState::Charge => {
                self.cancel_action();
                self.state_transition(TransitionKey::InstantFalling);
            }
            state if state.is_aerial() => {}
            FighterState::PreJump | FighterState::Knocked | FighterState::Stunned => {}
            _ => self.state_transition(TransitionKey::InstantFalling),
        }
    }

    /// Pin a hanging or climbing fighter to its ledge
    fn hold_ledge(&mut self, stage: &Stage) {
        let Some(ledge) = self.status.ledge.and_then(|id| stage.ledge(id)).copied() else {
            if self.state == FighterState::LedgeClimb {
                self.state_transition(TransitionKey::InstantFalling);
            }
            return;
        };

        self.status.velocity = Vec2::ZERO;
        self.status.time_since_ledge = 0;
        self.translate = Vec2::ZERO;
        let dir = ledge.direction.sign();

        if self.state == FighterState::LedgeClimb
            && self.state_progress >= self.stats.ledge_climb_finish
        {
            self.current.position =
                ledge.position + Vec2::new(-dir * self.local_diamond.half_width, 0.0);
            self.status.ledge = None;
            self.state_transition(TransitionKey::InstantNeutral);
        } else {
            self.current.position = Vec2::new(
                ledge.position.x + dir * self.local_diamond.half_width,
                ledge.position.y - self.local_diamond.offset_cross,
            );
        }
        self.diamond = PhysicsDiamond::new(&self.local_diamond, self.current.position);
    }
}
