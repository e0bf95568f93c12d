use std::hint::black_box;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};

use plum_rules::Game;

// Morphy vs. Duke of Brunswick and Count Isouard, Paris 1858.
const OPERA_GAME: &str = r#"[Event "Paris"]
[Site "Paris FRA"]
[Date "1858.??.??"]
[Round "?"]
[White "Paul Morphy"]
[Black "Duke Karl / Count Isouard"]
[Result "1-0"]

1. e4 e5 2. Nf3 d6 3. d4 Bg4 4. dxe5 Bxf3 5. Qxf3 dxe5 6. Bc4 Nf6 7. Qb3 Qe7
8. Nc3 c6 9. Bg5 b5 10. Nxb5 cxb5 11. Bxb5+ Nbd7 12. O-O-O Rd8
13. Rxd7 Rxd7 14. Rd1 Qe6 15. Bxd7+ Nxd7 16. Qb8+ Nxb8 17. Rd8# 1-0
"#;

fn bench_pgn(c: &mut Criterion) {
    let mut group = c.benchmark_group("pgn");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(4));

    group.bench_function("replay_opera_game", |b| {
        b.iter(|| {
            let game = Game::from_pgn(black_box(OPERA_GAME)).expect("PGN should replay");
            black_box(game.history().len())
        });
    });

    let mut replayed = Game::from_pgn(OPERA_GAME).expect("PGN should replay");
    group.bench_function("export_opera_game", |b| {
        b.iter(|| black_box(replayed.pgn().expect("export should succeed")));
    });

    group.finish();
}

criterion_group!(pgn_benches, bench_pgn);
criterion_main!(pgn_benches);
