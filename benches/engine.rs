use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use seatmap::config::{Config, ValidationMode};
use seatmap::ir::{FloorSpec, LayoutSpec, SpaceConfigInput, SpaceType};
use seatmap::layout::generate_layout;
use seatmap::reconcile::reconcile;
use seatmap::validate::validate;
use std::hint::black_box;

fn coach_spec(floors: u32, rows: u32) -> LayoutSpec {
    LayoutSpec {
        num_floors: floors,
        floors: (1..=floors)
            .map(|floor_number| FloorSpec {
                floor_number,
                num_rows: rows,
                seats_left: 2,
                seats_right: 2,
            })
            .collect(),
        total_seats: 0,
    }
}

fn fixture_spec() -> LayoutSpec {
    let raw = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/benches/fixtures/coach_large.json"
    ));
    serde_json::from_str(raw).expect("bench fixture parses")
}

fn bench_generate(c: &mut Criterion) {
    let config = Config::default();
    let mut group = c.benchmark_group("generate");
    for rows in [10u32, 40, 160] {
        let spec = coach_spec(2, rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &spec, |b, spec| {
            b.iter(|| {
                let spaces = generate_layout(black_box(spec), true, &config.generator)
                    .expect("generate failed");
                black_box(spaces.len());
            });
        });
    }
    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let config = Config::default();
    let spec = fixture_spec();
    let inputs: Vec<SpaceConfigInput> = generate_layout(&spec, true, &config.generator)
        .expect("generate failed")
        .iter()
        .map(SpaceConfigInput::from)
        .collect();
    c.bench_function("validate/coach_large", |b| {
        b.iter(|| {
            let result = validate(black_box(&inputs), Some(&spec), ValidationMode::CollectAll);
            black_box(result.is_ok());
        });
    });
}

fn bench_reconcile(c: &mut Criterion) {
    let config = Config::default();
    let spec = fixture_spec();
    let stored = generate_layout(&spec, true, &config.generator).expect("generate failed");
    // Every fifth seat becomes empty space.
    let submission: Vec<SpaceConfigInput> = stored
        .iter()
        .enumerate()
        .map(|(idx, space)| {
            let mut input = SpaceConfigInput::from(space);
            if idx % 5 == 0 && space.seat().is_some() {
                input = SpaceConfigInput::structural(
                    space.floor_number,
                    space.position,
                    SpaceType::Empty,
                );
            }
            input
        })
        .collect();
    c.bench_function("reconcile/coach_large", |b| {
        b.iter(|| {
            let plan = reconcile(black_box(&submission), &stored, &spec, &config.reconcile)
                .expect("reconcile failed");
            black_box(plan.update.len());
        });
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_generate, bench_validate, bench_reconcile
);
criterion_main!(benches);
