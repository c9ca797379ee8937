use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mines::games::{Cell, FieldGenerator, GameRules, GameSession, PayoutScheduler, ServerSeed, SessionId};
use mines::games::payout::DEFAULT_HOUSE_EDGE;
use rand::{rngs::StdRng, SeedableRng};

fn payout_schedule(c: &mut Criterion) {
    let mut group = c.benchmark_group("payout_schedule");
    for mine_count in [1usize, 3, 12, 24] {
        group.bench_function(BenchmarkId::new("compute", mine_count), |b| {
            b.iter(|| black_box(PayoutScheduler::for_board(black_box(mine_count), DEFAULT_HOUSE_EDGE)))
        });
    }
    group.finish();
}

fn field_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_generation");
    for mine_count in [1usize, 3, 12, 24] {
        let mut rng = StdRng::seed_from_u64(mine_count as u64);
        group.bench_function(BenchmarkId::new("std_rng", mine_count), |b| {
            b.iter(|| black_box(FieldGenerator::generate(mine_count, &mut rng)))
        });
    }

    let seed = ServerSeed::generate();
    group.bench_function("from_server_seed", |b| {
        b.iter(|| black_box(FieldGenerator::generate(3, &mut seed.rng())))
    });
    group.finish();
}

fn session_transitions(c: &mut Criterion) {
    let rules = GameRules::default();
    let session = GameSession::start(SessionId::new(), 1.0, 3, &ServerSeed::generate(), &rules, Utc::now())
        .unwrap_or_else(|e| panic!("start failed: {}", e));
    let gems = session.field.positions_of(Cell::Gem);
    let now = Utc::now();

    c.bench_function("reveal_five_then_cash_out", |b| {
        b.iter(|| {
            let mut current = session.clone();
            for &position in gems.iter().take(5) {
                current = current.reveal(position, now).map(|o| o.session).unwrap_or(current);
            }
            black_box(current.cash_out(now))
        })
    });
}

criterion_group!(benches, payout_schedule, field_generation, session_transitions);
criterion_main!(benches);
