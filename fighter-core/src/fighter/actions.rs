//! Attack selection and action lifecycle on the fighter.

use super::transitions::TransitionKey;
use super::{Fighter, FighterState};
use crate::action::{ActionType, FinishReason};
use crate::input::Input;
use crate::physics::Facing;

/// Attack chosen by a press of attack in `state`, if the state allows one
pub fn select_action(state: FighterState, input: &Input, facing: Facing) -> Option<ActionType> {
    let float = input.float_axis;
    let modifier = input.mod_axis;

    let action = match state {
        FighterState::Neutral => {
            if modifier.y == -1 {
                ActionType::SmashDown
            } else if modifier.y == 1 {
                ActionType::SmashUp
            } else if float.y < 0.0 {
                ActionType::TiltDown
            } else if float.y > 0.0 {
                ActionType::TiltUp
            } else {
                ActionType::NeutralFirst
            }
        }
        FighterState::Walking => {
            if modifier.x != 0 {
                ActionType::SmashForward
            } else if float.y > float.x.abs() {
                ActionType::TiltUp
            } else {
                ActionType::TiltForward
            }
        }
        FighterState::Dashing => {
            if modifier.x != 0 {
                ActionType::SmashForward
            } else {
                ActionType::DashAttack
            }
        }
        FighterState::Brake => {
            if modifier.y == 1 {
                ActionType::SmashUp
            } else {
                ActionType::DashAttack
            }
        }
        FighterState::Crouch => {
            if modifier.y == -1 {
                ActionType::SmashDown
            } else {
                ActionType::TiltDown
            }
        }
        FighterState::Jumping | FighterState::Falling => {
            if float.x == 0.0 && float.y == 0.0 {
                ActionType::AirNeutral
            } else if float.x.abs() >= float.y.abs() {
                if float.x * facing.sign() > 0.0 {
                    ActionType::AirForward
                } else {
                    ActionType::AirBack
                }
            } else if float.y < 0.0 {
                ActionType::AirDown
            } else {
                ActionType::AirUp
            }
        }
        _ => return None,
    };
    Some(action)
}

/// Transition entering `action`, or leaving `outgoing` when `action` is None
fn action_transition(action: ActionType, outgoing: ActionType) -> TransitionKey {
    match action {
        ActionType::None => match outgoing {
            ActionType::TiltDown => TransitionKey::InstantCrouch,
            ty if ty.is_air() => TransitionKey::InstantFalling,
            _ => TransitionKey::InstantNeutral,
        },
        ActionType::NeutralFirst => TransitionKey::NeutralAttack,
        ActionType::TiltDown => TransitionKey::TiltDownAttack,
        ActionType::TiltForward => TransitionKey::TiltForwardAttack,
        ActionType::TiltUp => TransitionKey::TiltUpAttack,
        ActionType::AirBack => TransitionKey::AirBackAttack,
        ActionType::AirDown => TransitionKey::AirDownAttack,
        ActionType::AirForward => TransitionKey::AirForwardAttack,
        ActionType::AirNeutral => TransitionKey::AirNeutralAttack,
        ActionType::AirUp => TransitionKey::AirUpAttack,
        ActionType::DashAttack => TransitionKey::DashAttack,
        ActionType::SmashDown => TransitionKey::SmashDownStart,
        ActionType::SmashForward => TransitionKey::SmashForwardStart,
        ActionType::SmashUp => TransitionKey::SmashUpStart,
    }
}

impl Fighter {
    pub(crate) fn handle_input_actions(&mut self, input: &Input) {
        if self.state == FighterState::Charge {
            if !input.hold_attack {
                self.release_charge();
            }
            return;
        }
        if !input.press_attack {
            return;
        }
        if let Some(action) = select_action(self.state, input, self.status.facing) {
            self.switch_action(action);
        }
    }

    fn release_charge(&mut self) {
        let key = match self.active_action_type() {
            ActionType::SmashDown => TransitionKey::SmashDownAttack,
            ActionType::SmashForward => TransitionKey::SmashForwardAttack,
            ActionType::SmashUp => TransitionKey::SmashUpAttack,
            other => unreachable!("fighter {} charging non-smash action {other:?}", self.index),
        };
        self.state_transition(key);
        if let Some(handle) = self.active_action {
            self.actions.get_mut(handle).on_start();
        }
    }

    /// Replace the active action, cancelling the outgoing one.
    ///
    /// Panics if `action` is already active.
    pub fn switch_action(&mut self, action: ActionType) {
        self.switch_action_with(action, FinishReason::Cancelled);
    }

    pub(crate) fn switch_action_with(&mut self, action: ActionType, reason: FinishReason) {
        let outgoing = self.active_action_type();
        assert_ne!(
            action, outgoing,
            "fighter {} switched to its already active action",
            self.index
        );
        tracing::debug!(
            fighter = self.index,
            from = outgoing.name(),
            to = action.name(),
            ?reason,
            "switch action"
        );

        self.state_transition(action_transition(action, outgoing));

        if let Some(handle) = self.active_action.take() {
            self.actions.get_mut(handle).on_finish(reason);
        }
        self.active_action = self.actions.handle(action);
        match self.active_action {
            Some(handle) if self.state != FighterState::Charge => {
                self.actions.get_mut(handle).on_start();
            }
            Some(_) => {}
            None => self.status.intangible = false,
        }
    }

    /// Drop the active action without routing to a base state
    pub(crate) fn cancel_action(&mut self) {
        if let Some(handle) = self.active_action.take() {
            self.actions.get_mut(handle).on_finish(FinishReason::Cancelled);
        }
        self.status.intangible = false;
    }

    pub(crate) fn update_active_action(&mut self) {
        if self.state == FighterState::Charge {
            return;
        }
        let Some(handle) = self.active_action else {
            return;
        };
        let tick = self.actions.get_mut(handle).on_tick(self.status.facing);
        self.status.velocity += tick.effects.velocity;
        if let Some(intangible) = tick.effects.intangible {
            self.status.intangible = intangible;
        }
        if tick.finished {
            self.switch_action_with(ActionType::None, FinishReason::Completed);
        }
    }
}
