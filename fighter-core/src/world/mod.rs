//! Fight World
//!
//! Owns the stage and every fighter in a match. One `tick` advances each
//! fighter in index order against the shared stage, then settles the things
//! fighters cannot decide alone:
//! - ledge ownership (the newest grabber keeps the ledge)
//! - blast zones (fighters leaving the outer boundary respawn)

use bevy::math::Mat4;
use std::collections::BTreeMap;

use crate::animation::ClipLibrary;
use crate::config::SimConfig;
use crate::error::ConfigError;
use crate::fighter::{Fighter, FighterDef};
use crate::input::Input;
use crate::logging::TimingSpan;
use crate::physics::Tuning;
use crate::stage::{LedgeId, Stage};

#[derive(Debug, Clone)]
pub struct FightWorld {
    stage: Stage,
    tuning: Tuning,
    editor_mode: bool,
    fighters: Vec<Fighter>,
    ledge_owners: BTreeMap<LedgeId, usize>,
    tick_count: u64,
}

impl FightWorld {
    pub fn new(stage: Stage, config: &SimConfig) -> Result<Self, ConfigError> {
        stage.validate()?;
        config.validate()?;
        Ok(Self {
            stage,
            tuning: config.tuning,
            editor_mode: config.editor_mode,
            fighters: Vec::new(),
            ledge_owners: BTreeMap::new(),
            tick_count: 0,
        })
    }

    /// Add a fighter at the next spawn point; returns its index
    pub fn add_fighter(
        &mut self,
        def: &FighterDef,
        library: &ClipLibrary,
    ) -> Result<usize, ConfigError> {
        let index = self.fighters.len();
        let spawn = self.stage.spawn_point(index);
        let fighter = Fighter::new(index, def, library, self.tuning, spawn, self.editor_mode)?;
        self.fighters.push(fighter);
        tracing::info!(fighter = index, name = %def.name, x = spawn.x, y = spawn.y, "fighter joined");
        Ok(index)
    }

    /// Advance every fighter one tick. Missing inputs count as idle.
    pub fn tick(&mut self, inputs: &[Input]) {
        let _span = TimingSpan::new("world_tick");

        for index in 0..self.fighters.len() {
            let input = inputs.get(index).copied().unwrap_or_default();
            self.fighters[index].tick(&input, &self.stage);
            self.resolve_ledge(index);
            self.stage.check_boundary(&mut self.fighters[index]);
        }

        let fighters = &self.fighters;
        self.ledge_owners
            .retain(|id, owner| fighters[*owner].status().ledge == Some(*id));
        self.tick_count += 1;
    }

    /// A fighter holding a ledge another fighter owns takes it over
    fn resolve_ledge(&mut self, index: usize) {
        let Some(id) = self.fighters[index].status().ledge else {
            return;
        };
        match self.ledge_owners.insert(id, index) {
            Some(previous) if previous != index => {
                tracing::debug!(ledge = id.0, from = previous, to = index, "ledge stolen");
                self.fighters[previous].release_ledge();
            }
            _ => {}
        }
    }

    /// Apply changed definitions to every fighter built from `def`; returns how many changed
    pub fn reload_fighter_def(&mut self, def: &FighterDef) -> Result<usize, ConfigError> {
        def.validate()?;
        let mut count = 0;
        for fighter in self.fighters.iter_mut().filter(|f| f.name() == def.name) {
            fighter.reload_stats(def.stats)?;
            fighter.reload_actions(&def.actions);
            count += 1;
        }
        Ok(count)
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn fighters(&self) -> &[Fighter] {
        &self.fighters
    }

    pub fn fighter(&self, index: usize) -> Option<&Fighter> {
        self.fighters.get(index)
    }

    pub fn fighter_mut(&mut self, index: usize) -> Option<&mut Fighter> {
        self.fighters.get_mut(index)
    }

    pub fn ledge_owner(&self, id: LedgeId) -> Option<usize> {
        self.ledge_owners.get(&id).copied()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn interpolate_model_matrix(&self, index: usize, blend: f32) -> Option<Mat4> {
        self.fighters
            .get(index)
            .map(|f| f.interpolate_model_matrix(blend))
    }

    /// Blended bone matrices for one fighter; false if there is no such fighter
    pub fn interpolate_bone_matrices(&self, index: usize, blend: f32, out: &mut [Mat4]) -> bool {
        match self.fighters.get(index) {
            Some(fighter) => {
                fighter.interpolate_bone_matrices(blend, out);
                true
            }
            None => false,
        }
    }
}

/// Everything needed to start a match
#[derive(Debug, Clone)]
pub struct MatchSetup {
    pub stage: Stage,
    pub fighters: Vec<FighterDef>,
    pub library: ClipLibrary,
    pub config: SimConfig,
}

impl MatchSetup {
    /// `count` training fighters on the test zone with Null animations
    pub fn training(count: usize) -> Self {
        Self {
            stage: Stage::test_zone(),
            fighters: vec![FighterDef::training(); count],
            library: ClipLibrary::empty(crate::animation::Armature::single_bone()),
            config: SimConfig::default(),
        }
    }

    pub fn build(&self) -> Result<FightWorld, ConfigError> {
        let mut world = FightWorld::new(self.stage.clone(), &self.config)?;
        for def in &self.fighters {
            world.add_fighter(def, &self.library)?;
        }
        Ok(world)
    }
}
