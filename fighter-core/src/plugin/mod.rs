//! Bevy integration: runs the fight world on the fixed timestep.

use bevy::prelude::*;

use crate::hotreload::{apply_changes, FighterDataWatcher};
use crate::input::Input;
use crate::logging::init_tracing;
use crate::world::{FightWorld, MatchSetup};

pub struct FightPlugin {
    pub setup: MatchSetup,
}

impl FightPlugin {
    pub fn new(setup: MatchSetup) -> Self {
        Self { setup }
    }
}

impl Plugin for FightPlugin {
    fn build(&self, app: &mut App) {
        let config = &self.setup.config;
        init_tracing(&config.tracing);

        // the app cannot run a match without a world
        let world = match self.setup.build() {
            Ok(world) => world,
            Err(e) => panic!("fight world setup failed: {e}"),
        };
        let fighter_count = world.fighters().len();

        app.insert_resource(Time::<Fixed>::from_hz(f64::from(config.tick_rate())))
            .insert_resource(FightWorldResource(world))
            .insert_resource(PendingInputs::new(fighter_count))
            .init_resource::<RenderBlend>()
            .add_systems(FixedUpdate, fight_tick_system)
            .add_systems(Update, update_render_blend);

        if let Some(dir) = &config.watch_dir {
            match FighterDataWatcher::new(dir) {
                Ok(watcher) => {
                    app.insert_resource(FighterDataWatcherResource(watcher))
                        .init_resource::<HotReloadState>()
                        .add_systems(Update, reload_fighter_data);
                }
                Err(e) => warn!("fighter data hot reload disabled: {e}"),
            }
        }
    }
}

#[derive(Resource)]
pub struct FightWorldResource(pub FightWorld);

/// Input accumulated between fixed ticks, one slot per fighter
#[derive(Resource, Debug, Default)]
pub struct PendingInputs {
    inputs: Vec<Input>,
}

impl PendingInputs {
    pub fn new(fighters: usize) -> Self {
        Self {
            inputs: vec![Input::default(); fighters],
        }
    }

    /// Merge a device sample; edges are kept until the next fixed tick consumes them
    pub fn submit(&mut self, fighter: usize, input: &Input) {
        if let Some(pending) = self.inputs.get_mut(fighter) {
            pending.merge(input);
        }
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }
}

/// Fraction of a fixed tick elapsed since the last one, for render interpolation
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct RenderBlend(pub f32);

#[derive(Resource, Debug, Default)]
pub struct HotReloadState {
    pub reload_count: u32,
    pub last_error: Option<String>,
}

#[derive(Resource)]
struct FighterDataWatcherResource(FighterDataWatcher);

fn fight_tick_system(mut world: ResMut<FightWorldResource>, mut pending: ResMut<PendingInputs>) {
    world.0.tick(&pending.inputs);
    for input in &mut pending.inputs {
        input.consume_edges();
    }
}

fn update_render_blend(time: Res<Time<Fixed>>, mut blend: ResMut<RenderBlend>) {
    blend.0 = time.overstep_fraction();
}

fn reload_fighter_data(
    watcher: Res<FighterDataWatcherResource>,
    mut world: ResMut<FightWorldResource>,
    mut state: ResMut<HotReloadState>,
) {
    let changed = watcher.0.poll();
    if changed.is_empty() {
        return;
    }
    let outcome = apply_changes(&mut world.0, &changed);
    state.reload_count += outcome.reloaded.len() as u32;
    state.last_error = outcome.failed.last().map(|(_, e)| e.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::IVec2;
    use bevy::time::TimePlugin;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(TimePlugin)
            .add_plugins(FightPlugin::new(MatchSetup::training(2)));
        app
    }

    #[test]
    fn test_plugin_inserts_resources() {
        let app = app();
        assert!(app.world().contains_resource::<FightWorldResource>());
        assert!(app.world().contains_resource::<RenderBlend>());
        assert_eq!(app.world().resource::<PendingInputs>().inputs().len(), 2);
        assert!(!app.world().contains_resource::<HotReloadState>());
    }

    #[test]
    fn test_fixed_tick_consumes_edges() {
        let mut app = app();
        let press = Input::default().with_jump().with_mash(IVec2::new(1, 0));
        app.world_mut().resource_mut::<PendingInputs>().submit(0, &press);
        app.world_mut().run_schedule(FixedUpdate);

        let world = &app.world().resource::<FightWorldResource>().0;
        assert_eq!(world.tick_count(), 1);
        let pending = app.world().resource::<PendingInputs>();
        assert!(!pending.inputs()[0].press_jump);
        assert!(pending.inputs()[0].hold_jump);
        assert_eq!(pending.inputs()[0].mash_axis, IVec2::ZERO);
    }

    #[test]
    #[should_panic(expected = "fight world setup failed")]
    fn test_bad_setup_stops_app_build() {
        let mut setup = MatchSetup::training(1);
        setup.stage.spawn_points.clear();
        App::new().add_plugins(TimePlugin).add_plugins(FightPlugin::new(setup));
    }

    #[test]
    fn test_submit_out_of_range_is_ignored() {
        let mut pending = PendingInputs::new(1);
        pending.submit(4, &Input::default().with_attack());
        assert!(!pending.inputs()[0].press_attack);
    }
}
