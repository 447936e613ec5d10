//! State Transition Table
//!
//! Every named transition maps to a target state, a fade length and the
//! animations to enter with. The table is a plain value owned by each fighter
//! so an editor can retune one fighter without touching the others.

use super::animation::AnimationKey;
use super::FighterState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub new_state: FighterState,
    pub fade_frames: u32,
    /// Played first; `None` starts straight on the loop animation
    pub animation: Option<AnimationKey>,
    /// Played after `animation` ends
    pub loop_animation: Option<AnimationKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransitionKey {
    NeutralCrouch,
    NeutralShield,
    NeutralWalking,
    WalkingCrouch,
    WalkingShield,
    WalkingDashing,
    WalkingDive,
    WalkingNeutral,
    DashingShield,
    DashingBrake,
    DashingDive,
    BrakeTurnDash,
    BrakeTurnBrake,
    CrouchShield,
    CrouchNeutral,
    AirDodge,
    AirHop,
    AirLedge,
    ShieldDodge,
    ShieldEvadeBack,
    ShieldEvadeForward,
    ShieldNeutral,
    LedgeClimb,
    LedgeJump,
    LedgeDrop,
    MiscPrejump,
    MiscVertigo,
    JumpBack,
    JumpForward,
    LandClean,
    PlatformDrop,
    InstantCrouch,
    InstantDashing,
    InstantFalling,
    InstantNeutral,
    NeutralAttack,
    TiltDownAttack,
    TiltForwardAttack,
    TiltUpAttack,
    AirBackAttack,
    AirDownAttack,
    AirForwardAttack,
    AirNeutralAttack,
    AirUpAttack,
    DashAttack,
    SmashDownStart,
    SmashForwardStart,
    SmashUpStart,
    SmashDownAttack,
    SmashForwardAttack,
    SmashUpAttack,
    EditorPreview,
}

impl TransitionKey {
    pub const ALL: [TransitionKey; 52] = [
        TransitionKey::NeutralCrouch,
        TransitionKey::NeutralShield,
        TransitionKey::NeutralWalking,
        TransitionKey::WalkingCrouch,
        TransitionKey::WalkingShield,
        TransitionKey::WalkingDashing,
        TransitionKey::WalkingDive,
        TransitionKey::WalkingNeutral,
        TransitionKey::DashingShield,
        TransitionKey::DashingBrake,
        TransitionKey::DashingDive,
        TransitionKey::BrakeTurnDash,
        TransitionKey::BrakeTurnBrake,
        TransitionKey::CrouchShield,
        TransitionKey::CrouchNeutral,
        TransitionKey::AirDodge,
        TransitionKey::AirHop,
        TransitionKey::AirLedge,
        TransitionKey::ShieldDodge,
        TransitionKey::ShieldEvadeBack,
        TransitionKey::ShieldEvadeForward,
        TransitionKey::ShieldNeutral,
        TransitionKey::LedgeClimb,
        TransitionKey::LedgeJump,
        TransitionKey::LedgeDrop,
        TransitionKey::MiscPrejump,
        TransitionKey::MiscVertigo,
        TransitionKey::JumpBack,
        TransitionKey::JumpForward,
        TransitionKey::LandClean,
        TransitionKey::PlatformDrop,
        TransitionKey::InstantCrouch,
        TransitionKey::InstantDashing,
        TransitionKey::InstantFalling,
        TransitionKey::InstantNeutral,
        TransitionKey::NeutralAttack,
        TransitionKey::TiltDownAttack,
        TransitionKey::TiltForwardAttack,
        TransitionKey::TiltUpAttack,
        TransitionKey::AirBackAttack,
        TransitionKey::AirDownAttack,
        TransitionKey::AirForwardAttack,
        TransitionKey::AirNeutralAttack,
        TransitionKey::AirUpAttack,
        TransitionKey::DashAttack,
        TransitionKey::SmashDownStart,
        TransitionKey::SmashForwardStart,
        TransitionKey::SmashUpStart,
        TransitionKey::SmashDownAttack,
        TransitionKey::SmashForwardAttack,
        TransitionKey::SmashUpAttack,
        TransitionKey::EditorPreview,
    ];

    /// The stock transition for this key
    pub fn standard(self) -> Transition {
        use AnimationKey as A;
        use FighterState as S;

        let (new_state, fade_frames, animation, loop_animation) = match self {
            TransitionKey::NeutralCrouch => (S::Crouch, 2, Some(A::CrouchOn), Some(A::CrouchLoop)),
            TransitionKey::NeutralShield => (S::Shield, 2, Some(A::ShieldOn), Some(A::ShieldLoop)),
            TransitionKey::NeutralWalking => (S::Walking, 4, None, Some(A::WalkingLoop)),
            TransitionKey::WalkingCrouch => (S::Crouch, 2, Some(A::CrouchOn), Some(A::CrouchLoop)),
            TransitionKey::WalkingShield => (S::Shield, 2, Some(A::ShieldOn), Some(A::ShieldLoop)),
            TransitionKey::WalkingDashing => (S::Dashing, 4, None, Some(A::DashingLoop)),
            TransitionKey::WalkingDive => (S::Falling, 2, Some(A::DiveWalk), Some(A::FallingLoop)),
            TransitionKey::WalkingNeutral => (S::Neutral, 4, None, Some(A::NeutralLoop)),
            TransitionKey::DashingShield => (S::Shield, 2, Some(A::ShieldOn), Some(A::ShieldLoop)),
            TransitionKey::DashingBrake => (S::Brake, 4, Some(A::Brake), Some(A::NeutralLoop)),
            TransitionKey::DashingDive => (S::Falling, 2, Some(A::DiveDash), Some(A::FallingLoop)),
            TransitionKey::BrakeTurnDash => (S::Brake, 2, Some(A::TurnDash), None),
            TransitionKey::BrakeTurnBrake => (S::Brake, 0, Some(A::TurnBrake), None),
            TransitionKey::CrouchShield => (S::Shield, 2, None, Some(A::ShieldLoop)),
            TransitionKey::CrouchNeutral => (S::Neutral, 2, Some(A::CrouchOff), Some(A::NeutralLoop)),
            TransitionKey::AirDodge => (S::AirDodge, 1, Some(A::AirDodge), Some(A::FallingLoop)),
            TransitionKey::AirHop => (S::Jumping, 1, Some(A::AirHop), Some(A::FallingLoop)),
            TransitionKey::AirLedge => (S::LedgeHang, 1, Some(A::LedgeCatch), Some(A::LedgeLoop)),
            TransitionKey::ShieldDodge => (S::Dodge, 1, Some(A::Dodge), Some(A::NeutralLoop)),
            TransitionKey::ShieldEvadeBack => (S::EvadeBack, 1, Some(A::EvadeBack), None),
            TransitionKey::ShieldEvadeForward => (S::EvadeForward, 1, Some(A::EvadeForward), None),
            TransitionKey::ShieldNeutral => (S::Neutral, 1, Some(A::ShieldOff), Some(A::NeutralLoop)),
            TransitionKey::LedgeClimb => (S::LedgeClimb, 1, Some(A::LedgeClimb), Some(A::NeutralLoop)),
            TransitionKey::LedgeJump => (S::Jumping, 1, Some(A::LedgeJump), Some(A::FallingLoop)),
            TransitionKey::LedgeDrop => (S::Falling, 0, None, Some(A::FallingLoop)),
            TransitionKey::MiscPrejump => (S::PreJump, 1, Some(A::PreJump), None),
            TransitionKey::MiscVertigo => (S::Neutral, 2, Some(A::VertigoStart), Some(A::VertigoLoop)),
            TransitionKey::JumpBack => (S::Jumping, 1, Some(A::JumpBack), Some(A::FallingLoop)),
            TransitionKey::JumpForward => (S::Jumping, 1, Some(A::JumpForward), Some(A::FallingLoop)),
            TransitionKey::LandClean => (S::Landing, 1, Some(A::LandClean), Some(A::NeutralLoop)),
            TransitionKey::PlatformDrop => (S::Falling, 1, Some(A::PlatformDrop), Some(A::FallingLoop)),
            TransitionKey::InstantCrouch => (S::Crouch, 0, None, Some(A::CrouchLoop)),
            TransitionKey::InstantDashing => (S::Dashing, 0, None, Some(A::DashingLoop)),
            TransitionKey::InstantFalling => (S::Falling, 0, None, Some(A::FallingLoop)),
            TransitionKey::InstantNeutral => (S::Neutral, 0, None, Some(A::NeutralLoop)),
            TransitionKey::NeutralAttack => (S::Attack, 1, Some(A::NeutralFirst), None),
            TransitionKey::TiltDownAttack => (S::Attack, 1, Some(A::TiltDown), None),
            TransitionKey::TiltForwardAttack => (S::Attack, 1, Some(A::TiltForward), None),
            TransitionKey::TiltUpAttack => (S::Attack, 1, Some(A::TiltUp), None),
            TransitionKey::AirBackAttack => (S::AirAttack, 1, Some(A::AirBack), None),
            TransitionKey::AirDownAttack => (S::AirAttack, 1, Some(A::AirDown), None),
            TransitionKey::AirForwardAttack => (S::AirAttack, 1, Some(A::AirForward), None),
            TransitionKey::AirNeutralAttack => (S::AirAttack, 1, Some(A::AirNeutral), None),
            TransitionKey::AirUpAttack => (S::AirAttack, 1, Some(A::AirUp), None),
            TransitionKey::DashAttack => (S::Attack, 1, Some(A::DashAttack), None),
            TransitionKey::SmashDownStart => {
                (S::Charge, 1, Some(A::SmashDownStart), Some(A::SmashDownCharge))
            }
            TransitionKey::SmashForwardStart => {
                (S::Charge, 1, Some(A::SmashForwardStart), Some(A::SmashForwardCharge))
            }
            TransitionKey::SmashUpStart => {
                (S::Charge, 1, Some(A::SmashUpStart), Some(A::SmashUpCharge))
            }
            TransitionKey::SmashDownAttack => (S::Attack, 1, Some(A::SmashDownAttack), None),
            TransitionKey::SmashForwardAttack => (S::Attack, 1, Some(A::SmashForwardAttack), None),
            TransitionKey::SmashUpAttack => (S::Attack, 1, Some(A::SmashUpAttack), None),
            TransitionKey::EditorPreview => (S::EditorPreview, 0, Some(A::Null), None),
        };

        Transition {
            new_state,
            fade_frames,
            animation,
            loop_animation,
        }
    }
}

/// Per-fighter transition lookup, indexed by [`TransitionKey`]
#[derive(Debug, Clone)]
pub struct TransitionTable {
    transitions: Vec<Transition>,
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TransitionTable {
    pub fn standard() -> Self {
        Self {
            transitions: TransitionKey::ALL.iter().map(|k| k.standard()).collect(),
        }
    }

    pub fn get(&self, key: TransitionKey) -> Transition {
        self.transitions[key as usize]
    }

    /// Override one entry (editor tuning)
    pub fn set(&mut self, key: TransitionKey, transition: Transition) {
        self.transitions[key as usize] = transition;
    }
}
