use bevy::math::{IVec2, Mat4, Vec2};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use fighter_core::input::Input;
use fighter_core::physics::LocalDiamond;
use fighter_core::replay::state_hash;
use fighter_core::stage::Stage;
use fighter_core::world::MatchSetup;

fn scripted(tick: u64, fighter: usize) -> Input {
    let phase = (tick + fighter as u64 * 17) % 90;
    match phase {
        0 => Input::default().with_jump(),
        30 => Input::default().with_attack(),
        45..=60 => Input::from_stick(Vec2::new(-1.0, 0.0)),
        70 => Input::default().holding_shield().with_mash(IVec2::new(0, -1)),
        _ => Input::from_stick(Vec2::new(1.0, 0.0)),
    }
}

fn bench_world_tick(c: &mut Criterion) {
    for count in [1usize, 4] {
        c.bench_function(&format!("world_tick_{count}_fighters"), |b| {
            let mut world = MatchSetup::training(count).build().unwrap();
            b.iter(|| {
                let tick = world.tick_count();
                let inputs: Vec<Input> = (0..count).map(|i| scripted(tick, i)).collect();
                world.tick(black_box(&inputs));
            })
        });
    }

    c.bench_function("world_tick_1000_frames", |b| {
        b.iter(|| {
            let mut world = MatchSetup::training(2).build().unwrap();
            for tick in 0..1000 {
                world.tick(&[scripted(tick, 0), scripted(tick, 1)]);
            }
            black_box(state_hash(&world))
        })
    });
}

fn bench_collision(c: &mut Criterion) {
    let stage = Stage::test_zone();
    let diamond = LocalDiamond::default();

    c.bench_function("attempt_move_landing", |b| {
        b.iter(|| {
            stage.attempt_move(
                black_box(&diamond),
                black_box(Vec2::new(3.5, 2.6)),
                black_box(Vec2::new(0.05, -0.25)),
                false,
                false,
            )
        })
    });

    c.bench_function("find_ledge", |b| {
        b.iter(|| stage.find_ledge(black_box(Vec2::new(9.0, -0.4)), black_box(-1), 1.2))
    });
}

fn bench_interpolation(c: &mut Criterion) {
    let mut world = MatchSetup::training(2).build().unwrap();
    for _ in 0..10 {
        world.tick(&[Input::from_stick(Vec2::new(1.0, 0.0)); 2]);
    }
    let mut bones = vec![Mat4::IDENTITY; 1];

    c.bench_function("interpolate_model_matrix", |b| {
        b.iter(|| world.interpolate_model_matrix(black_box(0), black_box(0.5)))
    });

    c.bench_function("interpolate_bone_matrices", |b| {
        b.iter(|| world.interpolate_bone_matrices(black_box(1), black_box(0.25), &mut bones))
    });
}

fn bench_state_hash(c: &mut Criterion) {
    let world = MatchSetup::training(4).build().unwrap();
    c.bench_function("state_hash_4_fighters", |b| {
        b.iter(|| state_hash(black_box(&world)))
    });
}

criterion_group!(
    benches,
    bench_world_tick,
    bench_collision,
    bench_interpolation,
    bench_state_hash,
);
criterion_main!(benches);
