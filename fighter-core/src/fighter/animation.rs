//! Fighter animation table and per-tick pose advancement.

use bevy::math::Vec2;

use super::{Fighter, FighterState};
use crate::animation::{Animation, Armature, ClipLibrary, Pose};

/// How an animation's clock advances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimMode {
    /// One frame per tick
    Standard,
    /// Advances with horizontal speed over the walk stride
    WalkCycle,
    /// Advances with horizontal speed over the dash stride
    DashCycle,
    /// One frame per tick; forward root motion moves the fighter
    ApplyMotion,
    /// Follows vertical speed from launch down toward fall speed
    JumpAscend,
    /// Follows horizontal speed from brake start down to zero
    BrakeSlow,
    /// Holds its last frame (editor scrubbing)
    Manual,
}

macro_rules! animation_keys {
    ($($key:ident => ($mode:ident, $looping:expr)),* $(,)?) => {
        /// Every animation a fighter uses, in table order
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum AnimationKey {
            $($key),*
        }

        impl AnimationKey {
            pub const ALL: &'static [AnimationKey] = &[$(AnimationKey::$key),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(AnimationKey::$key => stringify!($key)),*
                }
            }

            pub fn mode(self) -> AnimMode {
                match self {
                    $(AnimationKey::$key => AnimMode::$mode),*
                }
            }

            /// Whether the clip is expected to loop
            pub fn looping(self) -> bool {
                match self {
                    $(AnimationKey::$key => $looping),*
                }
            }
        }
    };
}

animation_keys! {
    Null => (Manual, true),
    NeutralLoop => (Standard, true),
    WalkingLoop => (WalkCycle, true),
    DashingLoop => (DashCycle, true),
    FallingLoop => (Standard, true),
    CrouchOn => (Standard, false),
    CrouchLoop => (Standard, true),
    CrouchOff => (Standard, false),
    ShieldOn => (Standard, false),
    ShieldLoop => (Standard, true),
    ShieldOff => (Standard, false),
    VertigoStart => (Standard, false),
    VertigoLoop => (Standard, true),
    Brake => (BrakeSlow, false),
    TurnBrake => (BrakeSlow, false),
    TurnDash => (BrakeSlow, false),
    PreJump => (Standard, false),
    JumpBack => (JumpAscend, false),
    JumpForward => (JumpAscend, false),
    AirHop => (JumpAscend, false),
    LandClean => (Standard, false),
    DiveWalk => (Standard, false),
    DiveDash => (Standard, false),
    PlatformDrop => (Standard, false),
    Dodge => (Standard, false),
    EvadeBack => (ApplyMotion, false),
    EvadeForward => (ApplyMotion, false),
    AirDodge => (Standard, false),
    LedgeCatch => (Standard, false),
    LedgeLoop => (Standard, true),
    LedgeClimb => (Standard, false),
    LedgeJump => (Standard, false),
    NeutralFirst => (Standard, false),
    TiltDown => (Standard, false),
    TiltForward => (Standard, false),
    TiltUp => (Standard, false),
    AirBack => (Standard, false),
    AirDown => (Standard, false),
    AirForward => (Standard, false),
    AirNeutral => (Standard, false),
    AirUp => (Standard, false),
    DashAttack => (ApplyMotion, false),
    SmashDownStart => (Standard, false),
    SmashDownCharge => (Standard, true),
    SmashDownAttack => (Standard, false),
    SmashForwardStart => (Standard, false),
    SmashForwardCharge => (Standard, true),
    SmashForwardAttack => (Standard, false),
    SmashUpStart => (Standard, false),
    SmashUpCharge => (Standard, true),
    SmashUpAttack => (Standard, false),
}

#[derive(Debug, Clone)]
pub struct FighterAnimation {
    pub key: AnimationKey,
    pub mode: AnimMode,
    pub clip: Animation,
}

/// One animation per [`AnimationKey`], indexed by key
#[derive(Debug, Clone)]
pub struct AnimationSet {
    anims: Vec<FighterAnimation>,
}

impl AnimationSet {
    /// Pick clips out of the library by key name.
    ///
    /// Missing or mismatched clips become Null with a warning; a clip whose
    /// looping flag disagrees with its key is kept but warned about.
    pub fn from_library(fighter: &str, library: &ClipLibrary) -> Self {
        let armature = &library.armature;
        let anims = AnimationKey::ALL
            .iter()
            .map(|&key| FighterAnimation {
                key,
                mode: key.mode(),
                clip: load_clip(fighter, armature, library, key),
            })
            .collect();
        Self { anims }
    }

    pub fn get(&self, key: AnimationKey) -> &FighterAnimation {
        &self.anims[key as usize]
    }
}

fn load_clip(
    fighter: &str,
    armature: &Armature,
    library: &ClipLibrary,
    key: AnimationKey,
) -> Animation {
    if key == AnimationKey::Null {
        return armature.make_null_animation(true);
    }
    let Some(clip) = library.clips.get(key.name()) else {
        tracing::warn!(fighter, animation = key.name(), "missing animation, using Null");
        return armature.make_null_animation(key.looping());
    };
    if let Err(e) = armature.check_animation(clip) {
        tracing::warn!(fighter, animation = key.name(), "bad animation, using Null: {e}");
        return armature.make_null_animation(key.looping());
    }
    if clip.looping != key.looping() {
        tracing::warn!(
            fighter,
            animation = key.name(),
            expected = key.looping(),
            "animation looping flag does not match its use"
        );
    }
    clip.clone()
}

/// Blend factor toward the new pose after `progress` of `frames` fade ticks
pub fn fade_factor(progress: u32, frames: u32) -> f32 {
    if progress >= frames {
        1.0
    } else {
        progress as f32 / (frames + 1) as f32
    }
}

impl Fighter {
    /// Advance the running animation (or hold the static pose), then apply any fade.
    pub(crate) fn base_tick_animation(&mut self) {
        assert!(
            self.state == FighterState::EditorPreview
                || self.animation.is_some() != self.static_pose.is_some(),
            "fighter {} must have exactly one of animation or static pose",
            self.index
        );

        if let Some(key) = self.animation {
            self.current.pose = self.advance_animation(key);
        } else if let Some(key) = self.static_pose {
            let anim = self.animations.get(key);
            if let Some(pose) = anim.clip.last_pose() {
                self.current.pose.clone_from(pose);
            }
            // root travel already went into translate
            if anim.mode == AnimMode::ApplyMotion {
                if let Some(root) = self.current.pose.bones.first_mut() {
                    root.offset.z = 0.0;
                }
            }
        }

        if self.fade_progress != self.fade_frames {
            self.fade_progress += 1;
            let factor = fade_factor(self.fade_progress, self.fade_frames);
            self.current.pose = self.fade_start_pose.blend(&self.current.pose, factor);
        }
    }

    fn advance_animation(&mut self, key: AnimationKey) -> Pose {
        let anim = self.animations.get(key);
        let total = anim.clip.total_time();
        let looping = anim.clip.looping;
        let mode = anim.mode;

        match mode {
            AnimMode::Standard | AnimMode::ApplyMotion => {
                let mut pose = anim.clip.sample_frame(self.anim_time_discrete);
                if mode == AnimMode::ApplyMotion {
                    self.extract_root_motion(&mut pose);
                }

                self.anim_time_discrete += 1;
                if self.anim_time_discrete >= total {
                    if looping {
                        self.anim_time_discrete = 0;
                    } else {
                        self.finish_animation(key);
                    }
                    self.root_motion_last = 0.0;
                }
                pose
            }
            AnimMode::WalkCycle | AnimMode::DashCycle => {
                let stride = if mode == AnimMode::WalkCycle {
                    self.stats.walk_anim_stride
                } else {
                    self.stats.dash_anim_stride
                };
                self.anim_time_continuous += self.status.velocity.x.abs()
                    / (stride / total as f32)
                    / self.tuning.tick_rate;
                anim.clip.sample(self.anim_time_continuous)
            }
            AnimMode::JumpAscend => {
                let gravity = self.stats.gravity * self.tuning.gravity;
                let range = self.jump_velocity
                    + self.stats.fall_speed * self.tuning.fall_speed * self.tuning.jump_anim_fall_share;
                let progress = (self.jump_velocity - self.status.velocity.y) / range;
                self.anim_time_continuous = progress * total as f32;
                let pose = anim.clip.sample(self.anim_time_continuous);

                // fall speed would be reached next tick
                if progress + gravity / range >= 1.0 {
                    self.finish_animation(key);
                }
                pose
            }
            AnimMode::BrakeSlow => {
                // never finishes: the state changes once speed reaches zero
                let progress = if self.brake_velocity > 0.0 {
                    ((self.brake_velocity - self.status.velocity.x.abs()) / self.brake_velocity)
                        .clamp(0.0, 1.0)
                } else {
                    1.0
                };
                self.anim_time_continuous = progress * total as f32;
                anim.clip.sample(self.anim_time_continuous)
            }
            AnimMode::Manual => match anim.clip.last_pose() {
                Some(pose) => pose.clone(),
                None => anim.clip.sample_frame(0),
            },
        }
    }

    /// Move on to the queued animation, or hold this one's last pose
    fn finish_animation(&mut self, key: AnimationKey) {
        if self.next_animation.is_none() {
            self.static_pose = Some(key);
        }
        self.animation = self.next_animation.take();
        self.anim_time_discrete = 0;
        self.anim_time_continuous = 0.0;
    }

    /// Move forward root travel out of the pose and into next tick's translation
    fn extract_root_motion(&mut self, pose: &mut Pose) {
        if let Some(root) = pose.bones.first_mut() {
            let forward = root.offset.z;
            let delta = forward - self.root_motion_last;
            self.root_motion_last = forward;
            self.translate += Vec2::new(delta * self.status.facing.sign(), 0.0);
            root.offset.z = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_factor_reaches_one_exactly() {
        for frames in 0..10 {
            assert_eq!(fade_factor(frames, frames), 1.0);
        }
    }

    #[test]
    fn test_fade_factor_progression() {
        assert!((fade_factor(1, 2) - 1.0 / 3.0).abs() < f32::EPSILON);
        assert!(fade_factor(1, 4) < fade_factor(2, 4));
        assert!(fade_factor(3, 4) < 1.0);
    }

    #[test]
    fn test_keys_are_indexed_in_order() {
        for (index, key) in AnimationKey::ALL.iter().enumerate() {
            assert_eq!(*key as usize, index);
        }
    }

    #[test]
    fn test_missing_clips_fall_back_to_null() {
        let library = ClipLibrary::empty(Armature::single_bone());
        let set = AnimationSet::from_library("test", &library);
        let neutral = set.get(AnimationKey::NeutralLoop);
        assert_eq!(neutral.clip.total_time(), 1);
        assert!(neutral.clip.looping);
        assert!(!set.get(AnimationKey::LandClean).clip.looping);
        assert_eq!(set.get(AnimationKey::WalkingLoop).mode, AnimMode::WalkCycle);
    }

    fn two_pose_clip(looping: bool) -> Animation {
        let at = |x: f32| {
            Pose::new(vec![crate::animation::BoneTransform {
                offset: bevy::math::Vec3::new(x, 0.0, 0.0),
                ..Default::default()
            }])
        };
        Animation {
            keyframes: vec![
                crate::animation::Keyframe {
                    duration: 4,
                    pose: at(0.0),
                },
                crate::animation::Keyframe {
                    duration: 4,
                    pose: at(1.0),
                },
            ],
            looping,
        }
    }

    #[test]
    fn test_manual_mode_shows_last_pose() {
        let mut fighter = super::super::tests::fighter_at(Vec2::ZERO);
        let clip = two_pose_clip(true);
        fighter.animations.anims[AnimationKey::Null as usize].clip = clip.clone();
        fighter.animation = Some(AnimationKey::Null);
        fighter.base_tick_animation();
        assert_eq!(Some(&fighter.current.pose), clip.last_pose());
        assert_eq!(fighter.anim_time_discrete, 0);
    }

    #[test]
    fn test_jump_ascend_follows_vertical_speed() {
        let mut fighter = super::super::tests::fighter_at(Vec2::ZERO);
        fighter.animations.anims[AnimationKey::JumpForward as usize].clip = two_pose_clip(false);
        fighter.state_transition(super::super::transitions::TransitionKey::JumpForward);
        fighter.jump_velocity = 10.0;
        let range = 10.0 + 12.0 * 0.75;

        fighter.status.velocity.y = 10.0 - 0.25 * range;
        fighter.base_tick_animation();
        assert!((fighter.anim_time_continuous - 2.0).abs() < 1e-4);
        assert_eq!(fighter.animation, Some(AnimationKey::JumpForward));

        // one more gravity step would reach the end
        fighter.status.velocity.y = 10.0 - range + 0.4;
        fighter.base_tick_animation();
        assert_eq!(fighter.animation, Some(AnimationKey::FallingLoop));
        assert_eq!(fighter.anim_time_continuous, 0.0);
    }

    #[test]
    fn test_brake_slow_follows_horizontal_speed() {
        let mut fighter = super::super::tests::fighter_at(Vec2::ZERO);
        fighter.animations.anims[AnimationKey::Brake as usize].clip = two_pose_clip(false);
        fighter.state_transition(super::super::transitions::TransitionKey::DashingBrake);
        fighter.brake_velocity = 8.0;
        fighter.status.velocity.x = -2.0;
        fighter.base_tick_animation();
        assert!((fighter.anim_time_continuous - 6.0).abs() < 1e-5);

        fighter.brake_velocity = 0.0;
        fighter.base_tick_animation();
        assert_eq!(fighter.anim_time_continuous, 8.0);
        assert_eq!(fighter.animation, Some(AnimationKey::Brake));
    }

    #[test]
    fn test_library_clip_used_when_present() {
        let armature = Armature::single_bone();
        let mut library = ClipLibrary::empty(armature.clone());
        let mut clip = armature.make_null_animation(false);
        clip.keyframes[0].duration = 12;
        library.clips.insert("TiltUp".to_string(), clip.clone());
        let set = AnimationSet::from_library("test", &library);
        assert_eq!(set.get(AnimationKey::TiltUp).clip, clip);
    }
}
