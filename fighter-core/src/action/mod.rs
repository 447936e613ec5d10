//! Attack Action Subsystem
//!
//! One pre-built [`Action`] per [`ActionType`] lives in a fighter's
//! [`ActionTable`]; the fighter refers to the active one through an
//! [`ActionHandle`] index, so definitions can be reloaded in place.
//!
//! Behaviour is data: an [`ActionDef`] maps frame numbers to one-shot
//! [`FrameEvent`]s and names the frame the action completes on.
//!
//! Lifecycle: `on_start` on activation, `on_tick` once per tick while active
//! (returns finished), `on_finish` on completion or cancellation.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::constants::FALLBACK_ACTION_FRAMES;
use crate::error::ConfigError;
use crate::physics::Facing;

// ============================================================================
// Action types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionType {
    None,
    NeutralFirst,
    TiltDown,
    TiltForward,
    TiltUp,
    AirBack,
    AirDown,
    AirForward,
    AirNeutral,
    AirUp,
    DashAttack,
    SmashDown,
    SmashForward,
    SmashUp,
}

impl Default for ActionType {
    fn default() -> Self {
        ActionType::None
    }
}

impl ActionType {
    /// Every real action, in table order
    pub const ALL: [ActionType; 13] = [
        ActionType::NeutralFirst,
        ActionType::TiltDown,
        ActionType::TiltForward,
        ActionType::TiltUp,
        ActionType::AirBack,
        ActionType::AirDown,
        ActionType::AirForward,
        ActionType::AirNeutral,
        ActionType::AirUp,
        ActionType::DashAttack,
        ActionType::SmashDown,
        ActionType::SmashForward,
        ActionType::SmashUp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ActionType::None => "None",
            ActionType::NeutralFirst => "NeutralFirst",
            ActionType::TiltDown => "TiltDown",
            ActionType::TiltForward => "TiltForward",
            ActionType::TiltUp => "TiltUp",
            ActionType::AirBack => "AirBack",
            ActionType::AirDown => "AirDown",
            ActionType::AirForward => "AirForward",
            ActionType::AirNeutral => "AirNeutral",
            ActionType::AirUp => "AirUp",
            ActionType::DashAttack => "DashAttack",
            ActionType::SmashDown => "SmashDown",
            ActionType::SmashForward => "SmashForward",
            ActionType::SmashUp => "SmashUp",
        }
    }

    pub fn is_air(self) -> bool {
        matches!(
            self,
            ActionType::AirBack
                | ActionType::AirDown
                | ActionType::AirForward
                | ActionType::AirNeutral
                | ActionType::AirUp
        )
    }

    pub fn is_smash(self) -> bool {
        matches!(
            self,
            ActionType::SmashDown | ActionType::SmashForward | ActionType::SmashUp
        )
    }

    fn slot(self) -> Option<usize> {
        ActionType::ALL.iter().position(|t| *t == self)
    }
}

// ============================================================================
// Definitions
// ============================================================================

/// One-shot effect fired when an action reaches a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FrameEvent {
    EnableBlob { name: String },
    DisableBlob { name: String },
    /// `x` is relative to facing
    AddVelocity { x: f32, y: f32 },
    SetIntangible { value: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDef {
    /// Frame on which `on_tick` reports completion
    pub finish_frame: u32,
    #[serde(default)]
    pub frames: BTreeMap<u32, Vec<FrameEvent>>,
}

impl ActionDef {
    /// Placeholder for a missing definition: no events, fixed length
    pub fn fallback() -> Self {
        Self {
            finish_frame: FALLBACK_ACTION_FRAMES,
            frames: BTreeMap::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.finish_frame == 0 {
            return Err(ConfigError::invalid("action finish_frame must be at least 1"));
        }
        if let Some((&frame, _)) = self.frames.range(self.finish_frame..).next() {
            return Err(ConfigError::invalid(format!(
                "action event on frame {frame} is at or after finish frame {}",
                self.finish_frame
            )));
        }
        Ok(())
    }

    fn with_blob(finish_frame: u32, blob: &str, on: u32, off: u32) -> Self {
        let mut frames = BTreeMap::new();
        frames.insert(
            on,
            vec![FrameEvent::EnableBlob {
                name: blob.to_string(),
            }],
        );
        frames.insert(
            off,
            vec![FrameEvent::DisableBlob {
                name: blob.to_string(),
            }],
        );
        Self {
            finish_frame,
            frames,
        }
    }

    /// Definitions for the built-in training fighter
    pub fn training_set() -> BTreeMap<ActionType, ActionDef> {
        let mut defs = BTreeMap::new();
        defs.insert(ActionType::NeutralFirst, Self::with_blob(14, "jab", 2, 5));
        defs.insert(ActionType::TiltDown, Self::with_blob(26, "sweep", 6, 10));
        defs.insert(ActionType::TiltForward, Self::with_blob(22, "kick", 5, 9));
        defs.insert(ActionType::TiltUp, Self::with_blob(20, "uppercut", 4, 9));
        defs.insert(ActionType::AirBack, Self::with_blob(28, "backkick", 7, 12));
        defs.insert(ActionType::AirDown, Self::with_blob(32, "stomp", 10, 16));
        defs.insert(ActionType::AirForward, Self::with_blob(30, "swipe", 8, 14));
        defs.insert(ActionType::AirNeutral, Self::with_blob(24, "spin", 4, 16));
        defs.insert(ActionType::AirUp, Self::with_blob(26, "flip", 5, 11));
        defs.insert(ActionType::SmashDown, Self::with_blob(40, "split", 6, 12));
        defs.insert(ActionType::SmashForward, Self::with_blob(44, "lunge", 10, 14));
        defs.insert(ActionType::SmashUp, Self::with_blob(42, "headbutt", 8, 15));

        let mut dash = Self::with_blob(30, "shoulder", 4, 18);
        for frame in 0..24 {
            dash.frames
                .entry(frame)
                .or_default()
                .push(FrameEvent::AddVelocity { x: 0.3, y: 0.0 });
        }
        defs.insert(ActionType::DashAttack, dash);
        defs
    }
}

// ============================================================================
// Runtime actions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    Completed,
    Cancelled,
}

/// Accumulated fighter-facing effects of one action tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActionEffects {
    pub velocity: Vec2,
    pub intangible: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActionTick {
    pub finished: bool,
    pub effects: ActionEffects,
}

#[derive(Debug, Clone)]
pub struct Action {
    action_type: ActionType,
    def: ActionDef,
    current_frame: u32,
    time_left: u32,
    active_blobs: BTreeSet<String>,
    running: bool,
    last_finish: Option<FinishReason>,
}

impl Action {
    fn new(action_type: ActionType, def: ActionDef) -> Self {
        Self {
            action_type,
            def,
            current_frame: 0,
            time_left: 0,
            active_blobs: BTreeSet::new(),
            running: false,
            last_finish: None,
        }
    }

    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    pub fn def(&self) -> &ActionDef {
        &self.def
    }

    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn active_blobs(&self) -> &BTreeSet<String> {
        &self.active_blobs
    }

    pub fn last_finish(&self) -> Option<FinishReason> {
        self.last_finish
    }

    pub fn on_start(&mut self) {
        self.current_frame = 0;
        self.time_left = self.def.finish_frame;
        self.active_blobs.clear();
        self.running = true;
        self.last_finish = None;
    }

    /// Fire this frame's events and advance. Returns finished in the tick result.
    pub fn on_tick(&mut self, facing: Facing) -> ActionTick {
        let mut effects = ActionEffects::default();

        if let Some(events) = self.def.frames.get(&self.current_frame) {
            for event in events {
                match event {
                    FrameEvent::EnableBlob { name } => {
                        self.active_blobs.insert(name.clone());
                    }
                    FrameEvent::DisableBlob { name } => {
                        self.active_blobs.remove(name);
                    }
                    FrameEvent::AddVelocity { x, y } => {
                        effects.velocity += Vec2::new(x * facing.sign(), *y);
                    }
                    FrameEvent::SetIntangible { value } => {
                        effects.intangible = Some(*value);
                    }
                }
            }
        }

        self.current_frame += 1;
        self.time_left = self.time_left.saturating_sub(1);

        ActionTick {
            finished: self.time_left == 0,
            effects,
        }
    }

    pub fn on_finish(&mut self, reason: FinishReason) {
        tracing::debug!(
            action = self.action_type.name(),
            frame = self.current_frame,
            ?reason,
            "action finished"
        );
        self.active_blobs.clear();
        self.running = false;
        self.last_finish = Some(reason);
    }
}

/// Index of an action inside its fighter's table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionHandle(usize);

/// Arena of one action per type
#[derive(Debug, Clone)]
pub struct ActionTable {
    actions: Vec<Action>,
}

impl ActionTable {
    /// Build the table; missing or invalid definitions fall back with a warning
    pub fn new(fighter: &str, defs: &BTreeMap<ActionType, ActionDef>) -> Self {
        let actions = ActionType::ALL
            .iter()
            .map(|&ty| Action::new(ty, resolve_def(fighter, ty, defs.get(&ty))))
            .collect();
        Self { actions }
    }

    pub fn handle(&self, action_type: ActionType) -> Option<ActionHandle> {
        action_type.slot().map(ActionHandle)
    }

    pub fn get(&self, handle: ActionHandle) -> &Action {
        &self.actions[handle.0]
    }

    pub fn get_mut(&mut self, handle: ActionHandle) -> &mut Action {
        &mut self.actions[handle.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// Swap in new definitions; handles stay valid and running actions keep their frame
    pub fn reload(&mut self, fighter: &str, defs: &BTreeMap<ActionType, ActionDef>) {
        for action in &mut self.actions {
            action.def = resolve_def(fighter, action.action_type, defs.get(&action.action_type));
            if action.running {
                action.time_left = action
                    .def
                    .finish_frame
                    .saturating_sub(action.current_frame)
                    .max(1);
            }
        }
        tracing::info!(fighter, "reloaded action definitions");
    }
}

fn resolve_def(fighter: &str, ty: ActionType, def: Option<&ActionDef>) -> ActionDef {
    match def {
        Some(def) => match def.validate() {
            Ok(()) => def.clone(),
            Err(e) => {
                tracing::warn!(fighter, action = ty.name(), "invalid action, using fallback: {e}");
                ActionDef::fallback()
            }
        },
        None => {
            tracing::warn!(fighter, action = ty.name(), "missing action, using fallback");
            ActionDef::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ActionTable {
        ActionTable::new("test", &ActionDef::training_set())
    }

    #[test]
    fn test_training_set_complete_and_valid() {
        let defs = ActionDef::training_set();
        assert_eq!(defs.len(), ActionType::ALL.len());
        for def in defs.values() {
            assert!(def.validate().is_ok());
        }
    }

    #[test]
    fn test_none_has_no_handle() {
        assert!(table().handle(ActionType::None).is_none());
        for ty in ActionType::ALL {
            let t = table();
            let handle = t.handle(ty).unwrap();
            assert_eq!(t.get(handle).action_type(), ty);
        }
    }

    #[test]
    fn test_missing_def_uses_fallback() {
        let table = ActionTable::new("empty", &BTreeMap::new());
        let handle = table.handle(ActionType::TiltUp).unwrap();
        assert_eq!(table.get(handle).def(), &ActionDef::fallback());
    }

    #[test]
    fn test_invalid_def_uses_fallback() {
        let mut defs = BTreeMap::new();
        defs.insert(
            ActionType::TiltUp,
            ActionDef {
                finish_frame: 0,
                frames: BTreeMap::new(),
            },
        );
        let table = ActionTable::new("bad", &defs);
        let handle = table.handle(ActionType::TiltUp).unwrap();
        assert_eq!(table.get(handle).def().finish_frame, FALLBACK_ACTION_FRAMES);
    }

    #[test]
    fn test_tick_finishes_on_finish_frame() {
        let mut table = table();
        let handle = table.handle(ActionType::NeutralFirst).unwrap();
        let action = table.get_mut(handle);
        action.on_start();
        let mut ticks = 0;
        loop {
            ticks += 1;
            if action.on_tick(Facing::Right).finished {
                break;
            }
        }
        assert_eq!(ticks, 14);
    }

    #[test]
    fn test_blob_events() {
        let mut table = table();
        let handle = table.handle(ActionType::NeutralFirst).unwrap();
        let action = table.get_mut(handle);
        action.on_start();
        for _ in 0..3 {
            action.on_tick(Facing::Right);
        }
        assert!(action.active_blobs().contains("jab"));
        for _ in 0..3 {
            action.on_tick(Facing::Right);
        }
        assert!(action.active_blobs().is_empty());
    }

    #[test]
    fn test_add_velocity_uses_facing() {
        let mut table = table();
        let handle = table.handle(ActionType::DashAttack).unwrap();
        let action = table.get_mut(handle);
        action.on_start();
        let tick = action.on_tick(Facing::Left);
        assert!((tick.effects.velocity.x + 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_finish_records_reason() {
        let mut table = table();
        let handle = table.handle(ActionType::AirUp).unwrap();
        let action = table.get_mut(handle);
        action.on_start();
        action.on_tick(Facing::Right);
        action.on_finish(FinishReason::Cancelled);
        assert!(!action.is_running());
        assert_eq!(action.last_finish(), Some(FinishReason::Cancelled));
    }

    #[test]
    fn test_reload_keeps_running_action() {
        let mut table = table();
        let handle = table.handle(ActionType::TiltUp).unwrap();
        table.get_mut(handle).on_start();
        for _ in 0..5 {
            table.get_mut(handle).on_tick(Facing::Right);
        }
        let mut defs = ActionDef::training_set();
        defs.insert(
            ActionType::TiltUp,
            ActionDef {
                finish_frame: 8,
                frames: BTreeMap::new(),
            },
        );
        table.reload("test", &defs);
        let action = table.get(handle);
        assert!(action.is_running());
        assert_eq!(action.current_frame(), 5);
        assert_eq!(action.time_left(), 3);
    }

    #[test]
    fn test_def_json_roundtrip() {
        let def = ActionDef::training_set()[&ActionType::DashAttack].clone();
        let json = serde_json::to_string(&def).unwrap();
        let restored: ActionDef = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, def);
    }

    #[test]
    fn test_validate_rejects_late_event() {
        let mut def = ActionDef::fallback();
        def.frames.insert(40, vec![FrameEvent::SetIntangible { value: true }]);
        assert!(def.validate().is_err());
    }
}
