use std::time::{Duration, Instant};

use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::json;
use std::hint::black_box;

use tourney_terminal::cards::{Card, CardKind, CardList, SortKey, StatusFilter};
use tourney_terminal::stats_fetch::{parse_cards_json, parse_stats_json};

fn player_payload(count: usize) -> String {
    let players: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "user_id": format!("{}", 1000 + i),
                "name": format!("Player {i}"),
                "wins": (i * 7) % 31,
                "losses": (i * 3) % 17,
                "draws": i % 4,
                "kills": (i * 13) % 211,
                "deaths": (i * 5) % 97,
            })
        })
        .collect();
    serde_json::Value::Array(players).to_string()
}

fn tournament_cards(count: usize) -> Vec<Card> {
    let statuses = ["ongoing", "registration", "completed"];
    (0..count)
        .map(|i| Card::new(format!("t{i}"), format!("Cup {i}"), statuses[i % statuses.len()]))
        .collect()
}

fn bench_stats_parse(c: &mut Criterion) {
    c.bench_function("stats_parse", |b| {
        b.iter(|| {
            let snapshot = parse_stats_json(black_box(STATS_JSON)).unwrap();
            black_box(snapshot.total_players);
        })
    });
}

fn bench_player_cards_parse(c: &mut Criterion) {
    let payload = player_payload(500);
    c.bench_function("player_cards_parse", |b| {
        b.iter(|| {
            let cards = parse_cards_json(CardKind::Player, black_box(&payload)).unwrap();
            black_box(cards.len());
        })
    });
}

fn bench_player_sort(c: &mut Criterion) {
    let cards = parse_cards_json(CardKind::Player, &player_payload(500)).unwrap();
    c.bench_function("player_sort", |b| {
        b.iter(|| {
            let mut list = CardList::new(CardKind::Player);
            list.set_cards(cards.clone());
            let now = Instant::now();
            list.sort_by_metric(black_box(SortKey::Kd), now);
            list.tick(now + Duration::from_secs(60));
            black_box(list.cards.len());
        })
    });
}

fn bench_status_filter(c: &mut Criterion) {
    let cards = tournament_cards(1000);
    let filter = StatusFilter::parse("ongoing");
    c.bench_function("status_filter", |b| {
        b.iter(|| {
            let mut list = CardList::new(CardKind::Tournament);
            list.set_cards(cards.clone());
            let now = Instant::now();
            let shown = list.apply_filter(black_box(&filter), now);
            list.tick(now + Duration::from_secs(1));
            black_box(shown);
        })
    });
}

criterion_group!(
    perf,
    bench_stats_parse,
    bench_player_cards_parse,
    bench_player_sort,
    bench_status_filter
);
criterion_main!(perf);

static STATS_JSON: &str = include_str!("../tests/fixtures/stats.json");
