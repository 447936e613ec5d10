//! Fighter Simulation
//!
//! A fighter is a fixed-timestep state machine. Each tick runs, in order:
//! 1. `handle_input_movement`: at most one state transition + horizontal velocity shaping
//! 2. `handle_input_actions`: attack selection and smash charge release
//! 3. `update_physics`: friction, gravity, state timers, stage collision
//! 4. `update_active_action`: action frame events and completion
//! 5. `base_tick_animation`: pose advancement and fade blending
//!
//! `previous` is snapshotted from `current` before any of that, so render
//! queries can blend between the last two ticks.

pub mod actions;
pub mod animation;
pub mod movement;
pub mod physics;
pub mod transitions;

use bevy::math::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f32::consts::{FRAC_PI_2, PI};
use std::path::Path;

use crate::action::{ActionDef, ActionHandle, ActionTable, ActionType};
use crate::animation::{Armature, ClipLibrary, Pose};
use crate::error::{read_json, ConfigError};
use crate::input::Input;
use crate::physics::{Facing, LocalDiamond, PhysicsDiamond, Tuning};
use crate::stage::{LedgeId, Stage};

use self::animation::{AnimationKey, AnimationSet};
use self::transitions::{TransitionKey, TransitionTable};

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FighterState {
    Neutral,
    Walking,
    Dashing,
    Brake,
    Crouch,
    PreJump,
    Prone,
    Shield,
    Dodge,
    EvadeBack,
    EvadeForward,
    Jumping,
    Falling,
    AirDodge,
    Knocked,
    Stunned,
    Helpless,
    LedgeHang,
    LedgeClimb,
    Charge,
    Attack,
    AirAttack,
    Landing,
    Freeze,
    EditorPreview,
}

impl FighterState {
    /// States where the fighter stands on the stage
    pub fn is_grounded(self) -> bool {
        matches!(
            self,
            FighterState::Neutral
                | FighterState::Walking
                | FighterState::Dashing
                | FighterState::Brake
                | FighterState::Crouch
                | FighterState::Prone
                | FighterState::Shield
                | FighterState::Dodge
                | FighterState::EvadeBack
                | FighterState::EvadeForward
                | FighterState::Charge
                | FighterState::Attack
                | FighterState::Landing
        )
    }

    /// States under air drift and air friction
    pub fn is_aerial(self) -> bool {
        matches!(
            self,
            FighterState::Jumping
                | FighterState::Falling
                | FighterState::AirAttack
                | FighterState::AirDodge
                | FighterState::Helpless
        )
    }
}

// ============================================================================
// Stats
// ============================================================================

/// Frame window for dodges: intangible on [safe_start, safe_end), over at finish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameWindow {
    pub finish: u32,
    pub safe_start: u32,
    pub safe_end: u32,
}

impl FrameWindow {
    pub fn contains(&self, frame: u32) -> bool {
        frame >= self.safe_start && frame < self.safe_end
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.safe_start >= self.safe_end || self.safe_end > self.finish {
            return Err(ConfigError::invalid(format!(
                "{name} window {self:?} needs safe_start < safe_end <= finish"
            )));
        }
        Ok(())
    }
}

/// Per-fighter multipliers and timings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub walk_speed: f32,
    pub dash_speed: f32,
    pub air_speed: f32,
    pub traction: f32,
    pub air_mobility: f32,
    pub air_friction: f32,
    pub hop_height: f32,
    pub jump_height: f32,
    pub air_hop_height: f32,
    pub gravity: f32,
    pub fall_speed: f32,
    pub extra_jumps: u32,
    pub walk_anim_stride: f32,
    pub dash_anim_stride: f32,
    pub dodge: FrameWindow,
    pub evade: FrameWindow,
    pub air_dodge: FrameWindow,
    pub ledge_climb_finish: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            walk_speed: 1.0,
            dash_speed: 1.0,
            air_speed: 1.0,
            traction: 1.0,
            air_mobility: 1.0,
            air_friction: 1.0,
            hop_height: 2.0,
            jump_height: 3.0,
            air_hop_height: 2.0,
            gravity: 1.0,
            fall_speed: 1.0,
            extra_jumps: 1,
            walk_anim_stride: 2.0,
            dash_anim_stride: 3.0,
            dodge: FrameWindow {
                finish: 20,
                safe_start: 2,
                safe_end: 14,
            },
            evade: FrameWindow {
                finish: 24,
                safe_start: 3,
                safe_end: 16,
            },
            air_dodge: FrameWindow {
                finish: 30,
                safe_start: 2,
                safe_end: 20,
            },
            ledge_climb_finish: 24,
        }
    }
}

impl Stats {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("walk_speed", self.walk_speed),
            ("dash_speed", self.dash_speed),
            ("air_speed", self.air_speed),
            ("traction", self.traction),
            ("gravity", self.gravity),
            ("fall_speed", self.fall_speed),
            ("walk_anim_stride", self.walk_anim_stride),
            ("dash_anim_stride", self.dash_anim_stride),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::invalid(format!(
                    "stats.{name} must be positive, got {value}"
                )));
            }
        }
        for (name, value) in [
            ("hop_height", self.hop_height),
            ("jump_height", self.jump_height),
            ("air_hop_height", self.air_hop_height),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::invalid(format!(
                    "stats.{name} must not be negative, got {value}"
                )));
            }
        }
        self.dodge.validate("dodge")?;
        self.evade.validate("evade")?;
        self.air_dodge.validate("air_dodge")?;
        Ok(())
    }
}

/// Fighter status visible to debug display and other systems
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Status {
    pub facing: Facing,
    pub velocity: Vec2,
    pub intangible: bool,
    pub ledge: Option<LedgeId>,
    pub time_since_ledge: u32,
    pub extra_jumps: u32,
}

/// Snapshot of a fighter's internal counters, for determinism hashing
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Bookkeeping {
    pub translate: Vec2,
    pub jump_held: bool,
    pub move_axis_x: i32,
    pub ignore_platforms: bool,
    pub on_platform: bool,
    pub brake_turn: i32,
    pub turn_dash: bool,
    pub brake_velocity: f32,
    pub jump_velocity: f32,
    pub vertigo_active: bool,
    pub animation: Option<AnimationKey>,
    pub next_animation: Option<AnimationKey>,
    pub static_pose: Option<AnimationKey>,
    pub anim_time_discrete: u32,
    pub anim_time_continuous: f32,
    pub fade_progress: u32,
    pub fade_frames: u32,
    pub root_motion_last: f32,
}

/// Kinematic snapshot used for render interpolation
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationData {
    pub position: Vec2,
    pub rotation: Quat,
    pub pose: Pose,
}

// ============================================================================
// Definition
// ============================================================================

/// Everything needed to build a fighter apart from its clips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterDef {
    pub name: String,
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub diamond: LocalDiamond,
    #[serde(default)]
    pub actions: BTreeMap<ActionType, ActionDef>,
}

impl FighterDef {
    /// Default stats and the built-in training move set
    pub fn training() -> Self {
        Self {
            name: "Training".to_string(),
            stats: Stats::default(),
            diamond: LocalDiamond::default(),
            actions: ActionDef::training_set(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let def: FighterDef = serde_json::from_str(json)?;
        def.validate()?;
        Ok(def)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let def: FighterDef = read_json(path)?;
        def.validate()?;
        Ok(def)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.stats.validate()?;
        self.diamond.validate()
    }
}

// ============================================================================
// Fighter
// ============================================================================

#[derive(Debug, Clone)]
pub struct Fighter {
    index: usize,
    name: String,
    stats: Stats,
    tuning: Tuning,
    editor_mode: bool,

    state: FighterState,
    status: Status,
    spawn: Vec2,

    local_diamond: LocalDiamond,
    diamond: PhysicsDiamond,

    previous: InterpolationData,
    current: InterpolationData,

    armature: Armature,
    animations: AnimationSet,
    transitions: TransitionTable,
    actions: ActionTable,
    active_action: Option<ActionHandle>,

    // movement bookkeeping
    state_progress: u32,
    jump_held: bool,
    /// Horizontal stick tilt this tick, -2..=2
    move_axis_x: i32,
    translate: Vec2,
    ignore_platforms: bool,
    on_platform: bool,
    /// Direction a brake turn is heading, 0 when not turning
    brake_turn: i32,
    /// A turn-dash was committed during the brake turn
    turn_dash: bool,
    /// Horizontal speed when braking began
    brake_velocity: f32,
    /// Vertical speed of the last jump launch
    jump_velocity: f32,
    vertigo_active: bool,

    // animation bookkeeping
    animation: Option<AnimationKey>,
    next_animation: Option<AnimationKey>,
    static_pose: Option<AnimationKey>,
    anim_time_discrete: u32,
    anim_time_continuous: f32,
    fade_progress: u32,
    fade_frames: u32,
    fade_start_pose: Pose,
    root_motion_last: f32,
}

impl Fighter {
    /// Build a fighter standing at `spawn`, facing the stage centre
    pub fn new(
        index: usize,
        def: &FighterDef,
        library: &ClipLibrary,
        tuning: Tuning,
        spawn: Vec2,
        editor_mode: bool,
    ) -> Result<Self, ConfigError> {
        def.validate()?;
        tuning.validate()?;

        let animations = AnimationSet::from_library(&def.name, library);
        let actions = ActionTable::new(&def.name, &def.actions);
        let facing = if spawn.x > 0.0 {
            Facing::Left
        } else {
            Facing::Right
        };

        let pose = animations
            .get(AnimationKey::NeutralLoop)
            .clip
            .sample_frame(0);
        let current = InterpolationData {
            position: spawn,
            rotation: facing_rotation(facing, FighterState::Neutral),
            pose: pose.clone(),
        };

        let mut fighter = Self {
            index,
            name: def.name.clone(),
            stats: def.stats,
            tuning,
            editor_mode,
            state: FighterState::Neutral,
            status: Status {
                facing,
                velocity: Vec2::ZERO,
                intangible: false,
                ledge: None,
                time_since_ledge: tuning.no_ledge_catch_time + 1,
                extra_jumps: def.stats.extra_jumps,
            },
            spawn,
            local_diamond: def.diamond,
            diamond: PhysicsDiamond::new(&def.diamond, spawn),
            previous: current.clone(),
            current,
            armature: library.armature.clone(),
            animations,
            transitions: TransitionTable::standard(),
            actions,
            active_action: None,
            state_progress: 0,
            jump_held: false,
            move_axis_x: 0,
            translate: Vec2::ZERO,
            ignore_platforms: false,
            on_platform: false,
            brake_turn: 0,
            turn_dash: false,
            brake_velocity: 0.0,
            jump_velocity: 0.0,
            vertigo_active: false,
            animation: Some(AnimationKey::NeutralLoop),
            next_animation: None,
            static_pose: None,
            anim_time_discrete: 0,
            anim_time_continuous: 0.0,
            fade_progress: 0,
            fade_frames: 0,
            fade_start_pose: pose,
            root_motion_last: 0.0,
        };

        if editor_mode {
            fighter.state_transition(TransitionKey::EditorPreview);
        }

        tracing::debug!(fighter = index, name = %fighter.name, "fighter created");
        Ok(fighter)
    }

    /// Run one simulation step against the shared stage
    pub fn tick(&mut self, input: &Input, stage: &Stage) {
        self.previous.clone_from(&self.current);

        let input = if self.editor_mode {
            Input::default()
        } else {
            *input
        };

        self.handle_input_movement(&input, stage);
        self.handle_input_actions(&input);
        self.update_physics(stage);
        self.update_active_action();
        self.base_tick_animation();

        self.current.rotation = facing_rotation(self.status.facing, self.state);
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> FighterState {
        self.state
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn position(&self) -> Vec2 {
        self.current.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.status.velocity
    }

    pub fn diamond(&self) -> &PhysicsDiamond {
        &self.diamond
    }

    pub fn current(&self) -> &InterpolationData {
        &self.current
    }

    pub fn previous(&self) -> &InterpolationData {
        &self.previous
    }

    pub fn armature(&self) -> &Armature {
        &self.armature
    }

    pub fn transitions_mut(&mut self) -> &mut TransitionTable {
        &mut self.transitions
    }

    pub fn state_progress(&self) -> u32 {
        self.state_progress
    }

    pub fn animation(&self) -> Option<AnimationKey> {
        self.animation
    }

    pub fn static_pose(&self) -> Option<AnimationKey> {
        self.static_pose
    }

    pub fn anim_time_discrete(&self) -> u32 {
        self.anim_time_discrete
    }

    pub fn fade_progress(&self) -> u32 {
        self.fade_progress
    }

    pub fn fade_frames(&self) -> u32 {
        self.fade_frames
    }

    pub fn active_action_type(&self) -> ActionType {
        self.active_action
            .map(|h| self.actions.get(h).action_type())
            .unwrap_or(ActionType::None)
    }

    /// Frame of the active action, if any
    pub fn active_action_frame(&self) -> Option<u32> {
        self.active_action
            .map(|h| self.actions.get(h).current_frame())
    }

    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    /// Hidden per-tick state that still decides future ticks
    pub(crate) fn bookkeeping(&self) -> Bookkeeping {
        Bookkeeping {
            translate: self.translate,
            jump_held: self.jump_held,
            move_axis_x: self.move_axis_x,
            ignore_platforms: self.ignore_platforms,
            on_platform: self.on_platform,
            brake_turn: self.brake_turn,
            turn_dash: self.turn_dash,
            brake_velocity: self.brake_velocity,
            jump_velocity: self.jump_velocity,
            vertigo_active: self.vertigo_active,
            animation: self.animation,
            next_animation: self.next_animation,
            static_pose: self.static_pose,
            anim_time_discrete: self.anim_time_discrete,
            anim_time_continuous: self.anim_time_continuous,
            fade_progress: self.fade_progress,
            fade_frames: self.fade_frames,
            root_motion_last: self.root_motion_last,
        }
    }

    // ------------------------------------------------------------------------
    // Render queries
    // ------------------------------------------------------------------------

    pub fn interpolate_position(&self, blend: f32) -> Vec2 {
        if blend <= 0.0 {
            self.previous.position
        } else if blend >= 1.0 {
            self.current.position
        } else {
            self.previous.position.lerp(self.current.position, blend)
        }
    }

    pub fn interpolate_rotation(&self, blend: f32) -> Quat {
        if blend <= 0.0 {
            self.previous.rotation
        } else if blend >= 1.0 {
            self.current.rotation
        } else {
            self.previous.rotation.slerp(self.current.rotation, blend)
        }
    }

    pub fn interpolate_pose(&self, blend: f32) -> Pose {
        self.previous.pose.blend(&self.current.pose, blend)
    }

    pub fn interpolate_model_matrix(&self, blend: f32) -> Mat4 {
        let position = self.interpolate_position(blend);
        Mat4::from_rotation_translation(
            self.interpolate_rotation(blend),
            Vec3::new(position.x, position.y, 0.0),
        )
    }

    /// Write blended model-space bone matrices; `out` must hold one per bone
    pub fn interpolate_bone_matrices(&self, blend: f32, out: &mut [Mat4]) {
        assert_eq!(
            out.len(),
            self.armature.bone_count(),
            "bone matrix buffer length"
        );
        let pose = self.interpolate_pose(blend);
        self.armature.compute_bone_matrices(&pose, out);
    }

    // ------------------------------------------------------------------------
    // External events
    // ------------------------------------------------------------------------

    /// Blast zone: back to spawn, standing, with nothing active
    pub fn pass_boundary(&mut self) {
        self.cancel_action();
        self.current.position = self.spawn;
        self.diamond = PhysicsDiamond::new(&self.local_diamond, self.spawn);
        self.status.velocity = Vec2::ZERO;
        self.status.ledge = None;
        self.status.time_since_ledge = self.tuning.no_ledge_catch_time + 1;
        self.status.extra_jumps = self.stats.extra_jumps;
        self.translate = Vec2::ZERO;
        self.jump_held = false;
        self.state_transition(TransitionKey::InstantNeutral);
    }

    /// Another fighter took our ledge; we fall on our next tick
    pub fn release_ledge(&mut self) {
        self.status.ledge = None;
    }

    pub fn reload_actions(&mut self, defs: &BTreeMap<ActionType, ActionDef>) {
        self.actions.reload(&self.name, defs);
    }

    /// Replace stats, keeping the old ones if the new ones are invalid
    pub fn reload_stats(&mut self, stats: Stats) -> Result<(), ConfigError> {
        stats.validate()?;
        self.stats = stats;
        tracing::info!(fighter = self.index, name = %self.name, "reloaded stats");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Enter a new state through a table transition, restarting animation and fade
    pub(crate) fn state_transition(&mut self, key: TransitionKey) {
        let transition = self.transitions.get(key);
        assert!(
            transition.new_state == FighterState::EditorPreview
                || transition.animation.is_some()
                || transition.loop_animation.is_some(),
            "transition {key:?} has no animation"
        );

        tracing::trace!(
            fighter = self.index,
            from = ?self.state,
            to = ?transition.new_state,
            transition = ?key,
            "state transition"
        );

        self.state = transition.new_state;
        self.state_progress = 0;
        self.status.intangible = false;
        self.vertigo_active = false;
        if self.state != FighterState::Brake {
            self.brake_turn = 0;
            self.turn_dash = false;
        }

        self.anim_time_discrete = 0;
        self.anim_time_continuous = 0.0;
        self.root_motion_last = 0.0;
        self.fade_progress = 0;
        self.fade_frames = if self.editor_mode {
            0
        } else {
            transition.fade_frames
        };

        match transition.animation {
            Some(animation) => {
                self.animation = Some(animation);
                self.next_animation = transition.loop_animation;
            }
            None => {
                self.animation = transition.loop_animation;
                self.next_animation = None;
            }
        }
        self.static_pose = None;
        self.fade_start_pose.clone_from(&self.current.pose);
    }
}

fn facing_rotation(facing: Facing, state: FighterState) -> Quat {
    if state == FighterState::EditorPreview {
        Quat::from_rotation_y(PI)
    } else {
        Quat::from_rotation_y(facing.sign() * FRAC_PI_2)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn fighter_at(position: Vec2) -> Fighter {
        let library = ClipLibrary::empty(Armature::single_bone());
        Fighter::new(
            0,
            &FighterDef::training(),
            &library,
            Tuning::default(),
            position,
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_new_fighter_is_neutral() {
        let fighter = fighter_at(Vec2::new(-3.0, 0.0));
        assert_eq!(fighter.state(), FighterState::Neutral);
        assert_eq!(fighter.status().facing, Facing::Right);
        assert_eq!(fighter.animation(), Some(AnimationKey::NeutralLoop));
        assert_eq!(fighter.active_action_type(), ActionType::None);
    }

    #[test]
    fn test_spawn_right_faces_left() {
        let fighter = fighter_at(Vec2::new(3.0, 0.0));
        assert_eq!(fighter.status().facing, Facing::Left);
    }

    #[test]
    fn test_state_transition_resets_counters() {
        let mut fighter = fighter_at(Vec2::ZERO);
        fighter.anim_time_discrete = 7;
        fighter.fade_progress = 3;
        fighter.state_progress = 9;
        fighter.state_transition(TransitionKey::NeutralCrouch);
        assert_eq!(fighter.state(), FighterState::Crouch);
        assert_eq!(fighter.anim_time_discrete(), 0);
        assert_eq!(fighter.fade_progress(), 0);
        assert_eq!(fighter.fade_frames(), 2);
        assert_eq!(fighter.state_progress(), 0);
        assert_eq!(fighter.animation(), Some(AnimationKey::CrouchOn));
        assert_eq!(fighter.next_animation, Some(AnimationKey::CrouchLoop));
        assert_eq!(fighter.static_pose(), None);
    }

    #[test]
    fn test_loop_only_transition_starts_loop() {
        let mut fighter = fighter_at(Vec2::ZERO);
        fighter.state_transition(TransitionKey::InstantFalling);
        assert_eq!(fighter.animation(), Some(AnimationKey::FallingLoop));
        assert_eq!(fighter.next_animation, None);
    }

    #[test]
    fn test_editor_mode_starts_in_preview_without_fades() {
        let library = ClipLibrary::empty(Armature::single_bone());
        let mut fighter = Fighter::new(
            0,
            &FighterDef::training(),
            &library,
            Tuning::default(),
            Vec2::ZERO,
            true,
        )
        .unwrap();
        assert_eq!(fighter.state(), FighterState::EditorPreview);
        fighter.state_transition(TransitionKey::NeutralCrouch);
        assert_eq!(fighter.fade_frames(), 0);
    }

    #[test]
    fn test_stats_validation() {
        assert!(Stats::default().validate().is_ok());
        let bad = Stats {
            dodge: FrameWindow {
                finish: 10,
                safe_start: 5,
                safe_end: 5,
            },
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let negative = Stats {
            gravity: -1.0,
            ..Default::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_fighter_def_json_roundtrip() {
        let def = FighterDef::training();
        let json = serde_json::to_string(&def).unwrap();
        let restored = FighterDef::from_json(&json).unwrap();
        assert_eq!(restored, def);
    }

    #[test]
    fn test_fighter_def_defaults_fill_missing_fields() {
        let def = FighterDef::from_json(r#"{"name": "Bare"}"#).unwrap();
        assert_eq!(def.stats, Stats::default());
        assert!(def.actions.is_empty());
    }

    #[test]
    fn test_reload_stats_rejects_invalid() {
        let mut fighter = fighter_at(Vec2::ZERO);
        let bad = Stats {
            walk_speed: 0.0,
            ..Default::default()
        };
        assert!(fighter.reload_stats(bad).is_err());
        assert_eq!(fighter.stats().walk_speed, 1.0);
        let faster = Stats {
            walk_speed: 2.0,
            ..Default::default()
        };
        fighter.reload_stats(faster).unwrap();
        assert_eq!(fighter.stats().walk_speed, 2.0);
    }

    #[test]
    fn test_model_matrix_blend_endpoints() {
        let mut fighter = fighter_at(Vec2::ZERO);
        fighter.current.position = Vec2::new(2.0, 1.0);
        let start = fighter.interpolate_model_matrix(0.0);
        let end = fighter.interpolate_model_matrix(1.0);
        assert_eq!(start.w_axis.x, 0.0);
        assert_eq!(end.w_axis.x, 2.0);
        let mid = fighter.interpolate_model_matrix(0.5);
        assert!((mid.w_axis.x - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_state_hash_covers_bookkeeping() {
        use crate::replay::state_hash;
        use crate::world::{FightWorld, MatchSetup};

        let world = MatchSetup::training(1).build().unwrap();
        let base = state_hash(&world);
        let tweaks: [fn(&mut Fighter); 7] = [
            |f| f.jump_held = true,
            |f| f.translate = Vec2::new(0.25, 0.0),
            |f| f.ignore_platforms = true,
            |f| f.on_platform = true,
            |f| f.anim_time_discrete = 3,
            |f| f.root_motion_last = 0.5,
            |f| f.status.time_since_ledge = 0,
        ];
        for (index, tweak) in tweaks.iter().enumerate() {
            let mut changed: FightWorld = world.clone();
            if let Some(fighter) = changed.fighter_mut(0) {
                tweak(fighter);
            }
            assert_ne!(state_hash(&changed), base, "tweak {index} not hashed");
        }
    }

    #[test]
    #[should_panic(expected = "bone matrix buffer length")]
    fn test_bone_matrices_wrong_length() {
        let fighter = fighter_at(Vec2::ZERO);
        let mut out = vec![Mat4::IDENTITY; 5];
        fighter.interpolate_bone_matrices(0.5, &mut out);
    }
}
