// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use pcb_board_index::{
    BoardIndex, BoardPoint, Coord, Line, Object, Point, QueryFilter, Rect, Shape, Via,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const LAYERS: usize = 4;

/// A board with random traces on every layer and a via at most trace ends.
fn gen_board(traces: usize) -> BoardIndex {
    let mut rng = StdRng::seed_from_u64(0xBADC_F00D_1234_5678);
    let mut board = BoardIndex::new(LAYERS);
    for i in 0..traces {
        let x: Coord = rng.random_range(0..100_000);
        let y: Coord = rng.random_range(0..100_000);
        let (dx, dy) = if rng.random_bool(0.5) {
            (rng.random_range(200..2_000), 0)
        } else {
            (0, rng.random_range(200..2_000))
        };
        let line = Object::new(Shape::Line(Line {
            p1: BoardPoint::new(x, y),
            p2: BoardPoint::new(x + dx, y + dy),
            thickness: 100,
            clearance: 100,
        }))
        .expect("lines always have a box");
        let _ = board
            .insert(line, Some(i % LAYERS))
            .expect("layer in range");
        if i % 3 != 0 {
            let via = Object::new(Shape::Via(Via {
                center: BoardPoint::new(x + dx, y + dy),
                thickness: 300,
                clearance: 100,
                mask: 0,
                drill: 150,
            }))
            .expect("vias always have a box");
            let _ = board.insert(via, None).expect("vias take no layer");
        }
    }
    board
}

fn bench_board(c: &mut Criterion) {
    let mut group = c.benchmark_group("board");
    let board = gen_board(20_000);
    group.bench_function("hit_test_1k_points", |b| {
        b.iter(|| {
            let mut hits = 0_usize;
            for i in 0..1_000 {
                let p = Point::new(f64::from(i * 97 % 100_000), f64::from(i * 89 % 100_000));
                hits += usize::from(board.hit_test(p, 50.0, QueryFilter::default()).is_some());
            }
            black_box(hits);
        });
    });
    group.bench_function("query_window", |b| {
        b.iter(|| {
            let found = board.query(
                Rect::new(40_000.0, 40_000.0, 45_000.0, 45_000.0),
                QueryFilter::default(),
            );
            black_box(found.len());
        });
    });
    group.bench_function("is_clear_probe", |b| {
        b.iter(|| {
            let mut clear = 0_usize;
            for i in 0..1_000 {
                let x = f64::from(i * 97 % 100_000);
                let r = Rect::new(x, x, x + 150.0, x + 150.0);
                clear += usize::from(board.is_clear(r, QueryFilter::default()));
            }
            black_box(clear);
        });
    });
    group.bench_function("remove_in_region", |b| {
        b.iter_batched(
            || gen_board(5_000),
            |mut board| {
                let removed = board.remove_in_region(
                    Rect::new(20_000.0, 20_000.0, 60_000.0, 60_000.0),
                    QueryFilter::default(),
                );
                black_box(removed.len());
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_board);
criterion_main!(benches);
