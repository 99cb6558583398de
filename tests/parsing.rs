use std::fs;
use std::path::PathBuf;

use tourney_terminal::cards::CardKind;
use tourney_terminal::stats_fetch::{StatKey, StatsSnapshot, parse_cards_json, parse_stats_json};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_stats_fixture() {
    let raw = read_fixture("stats.json");
    let stats = parse_stats_json(&raw).expect("fixture should parse");
    assert_eq!(
        stats,
        StatsSnapshot {
            total_players: 42,
            total_tournaments: 5,
            total_matches: 17,
            active_tournaments: 2,
            completed_matches: 11,
            pending_matches: 4,
        }
    );
    assert_eq!(stats.get(StatKey::CompletedMatches), 11);
}

#[test]
fn missing_and_invalid_counters_default_to_zero() {
    let raw = read_fixture("stats_partial.json");
    let stats = parse_stats_json(&raw).expect("fixture should parse");
    assert_eq!(stats.total_players, 10);
    assert_eq!(stats.total_tournaments, 0);
    assert_eq!(stats.total_matches, 0);
    assert_eq!(stats.pending_matches, 0);
}

#[test]
fn stats_null_is_empty_and_garbage_is_error() {
    assert_eq!(
        parse_stats_json("null").expect("null should parse"),
        StatsSnapshot::default()
    );
    assert!(parse_stats_json("<html>oops</html>").is_err());
}

#[test]
fn parses_player_cards_with_derived_metrics() {
    let raw = read_fixture("players.json");
    let players = parse_cards_json(CardKind::Player, &raw).expect("fixture should parse");
    assert_eq!(players.len(), 3);

    assert_eq!(players[0].id, "1001");
    assert_eq!(players[0].title, "Nova");
    assert_eq!(players[0].metric("wins"), 3.0);
    assert!((players[0].metric("kd") - 4.0).abs() < 1e-9);
    assert!((players[0].metric("win_rate") - 75.0).abs() < 1e-9);

    // deaths of zero count as one
    assert!((players[1].metric("kd") - 55.0).abs() < 1e-9);

    assert_eq!(players[2].metric("wins"), 0.0);
    assert_eq!(players[2].metric("win_rate"), 0.0);
}

#[test]
fn parses_tournament_cards_keyed_by_id() {
    let raw = read_fixture("tournaments.json");
    let cards = parse_cards_json(CardKind::Tournament, &raw).expect("fixture should parse");
    assert_eq!(cards.len(), 3);

    let winter = cards.iter().find(|c| c.title == "Winter Cup").expect("winter cup");
    assert_eq!(winter.id, "a1b2c3d4");
    assert_eq!(winter.status, "ongoing");
    assert!(winter.subtitle.starts_with("3/16 players"));

    let autumn = cards.iter().find(|c| c.title == "Autumn Clash").expect("autumn clash");
    assert_eq!(autumn.id, "c9d0e1f2");
    assert_eq!(autumn.subtitle, "1 players");
}

#[test]
fn parses_match_cards() {
    let raw = read_fixture("matches.json");
    let cards = parse_cards_json(CardKind::Match, &raw).expect("fixture should parse");
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].status, "scheduled");
    assert_eq!(cards[0].subtitle, "1001 vs 1002 @ 2025-01-12 18:00");
    assert_eq!(cards[1].subtitle, "1002 vs 1003");
}

#[test]
fn card_payloads_without_objects_are_empty() {
    assert!(parse_cards_json(CardKind::Match, "null").expect("null").is_empty());
    assert!(parse_cards_json(CardKind::Match, "[1, 2, 3]").expect("numbers").is_empty());
}
