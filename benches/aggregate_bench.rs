// Benchmark for heatmap aggregation and drag handling
// Measures recomputing a room heatmap every frame for growing rooms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use moim::models::selection::{MemberSelection, SelectionSet};
use moim::models::slot::GridConfig;
use moim::services::aggregate::{compute_heatmap, room_heatmap};
use moim::services::gesture::{GestureCommand, SlotGrid};

/// Deterministic room where member `m` picks every slot whose index
/// shares a residue with `m`, giving overlapping but distinct selections.
fn build_room(members: usize, config: &GridConfig) -> Vec<MemberSelection> {
    (0..members)
        .map(|m| {
            let slots: SelectionSet = config
                .keys()
                .filter(|key| (usize::from(key.slot) + usize::from(key.day) + m) % 3 != 0)
                .collect();
            MemberSelection::new(format!("member-{}", m), slots, 1)
        })
        .collect()
}

fn bench_compute_heatmap(c: &mut Criterion) {
    let config = GridConfig::default();
    let mut group = c.benchmark_group("compute_heatmap");

    for members in [2, 10, 50].iter() {
        let room = build_room(*members, &config);
        group.bench_with_input(BenchmarkId::from_parameter(members), &room, |b, room| {
            b.iter(|| compute_heatmap(black_box(room).iter().map(|m| &m.slots)));
        });
    }

    group.finish();
}

fn bench_room_heatmap_with_top_n(c: &mut Criterion) {
    let config = GridConfig::default();
    let room = build_room(10, &config);
    let local = room[0].slots.clone();

    c.bench_function("room_heatmap_top3_10_members", |b| {
        b.iter(|| {
            let heatmap =
                room_heatmap(black_box(&room), "member-0", black_box(&local), &config);
            heatmap.top_n(3)
        });
    });
}

fn bench_full_grid_drag(c: &mut Criterion) {
    let config = GridConfig::default();
    let cells: Vec<_> = config.keys().collect();

    c.bench_function("drag_across_full_grid", |b| {
        b.iter(|| {
            let mut grid = SlotGrid::default();
            grid.apply(GestureCommand::Begin(cells[0]));
            for cell in &cells[1..] {
                grid.apply(GestureCommand::Move(black_box(*cell)));
            }
            grid.apply(GestureCommand::End)
        });
    });
}

criterion_group!(
    benches,
    bench_compute_heatmap,
    bench_room_heatmap_with_top_n,
    bench_full_grid_drag
);
criterion_main!(benches);
