//! Benchmark suite for danci-bkt
//!
//! Run with: cargo bench

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use danci_bkt::{Model, Roster, RosterConfig, SkillParams, StudentId, UpdateOptions};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

const SKILL: &str = "fractions";

fn fitted_model() -> Arc<Model> {
    let model = Model::new();
    model
        .fit_skill(SKILL, SkillParams::new(0.3, 0.2, 0.1, 0.1).with_forget(0.01))
        .expect("valid parameters");
    Arc::new(model)
}

fn observations(rng: &mut ChaCha8Rng, len: usize) -> Vec<i32> {
    (0..len).map(|_| i32::from(rng.gen_bool(0.7))).collect()
}

fn bench_single_update(c: &mut Criterion) {
    let mut roster = Roster::new(1usize, SKILL, RosterConfig::default(), Some(fitted_model()))
        .expect("roster");
    let student = StudentId::from(1usize);
    let options = UpdateOptions::default();

    c.bench_function("update_state_single", |b| {
        b.iter(|| {
            let state = roster
                .update_state(&student, black_box(1), &options)
                .expect("update");
            black_box(state.mastery_probability())
        })
    });
}

fn bench_sequence_update(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut group = c.benchmark_group("update_state_sequence");

    for len in [8, 64, 512] {
        let run = observations(&mut rng, len);
        let mut roster = Roster::new(1usize, SKILL, RosterConfig::default(), Some(fitted_model()))
            .expect("roster");
        let student = StudentId::from(1usize);
        let options = UpdateOptions::default();

        group.bench_with_input(BenchmarkId::from_parameter(len), &run, |b, run| {
            b.iter(|| {
                roster
                    .update_state(&student, run.clone(), &options)
                    .expect("update");
            })
        });
    }
    group.finish();
}

fn bench_roster_dispatch(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let students = 200usize;
    let mut roster = Roster::new(students, SKILL, RosterConfig::default(), Some(fitted_model()))
        .expect("roster");
    let corrects: Vec<(usize, i32)> = (1..=students)
        .map(|id| (id, i32::from(rng.gen_bool(0.6))))
        .collect();
    let options = UpdateOptions::default();

    c.bench_function("update_states_200", |b| {
        b.iter(|| {
            let count = roster
                .update_states(corrects.clone(), &options)
                .expect("update")
                .count();
            black_box(count)
        })
    });
}

criterion_group!(
    benches,
    bench_single_update,
    bench_sequence_update,
    bench_roster_dispatch
);
criterion_main!(benches);
