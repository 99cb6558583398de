use std::sync::mpsc;
use std::time::{Duration, Instant};

use tourney_terminal::cards::{
    ButtonGroup, Card, CardKind, Fade, SORT_REORDER_DELAY, SORT_STAGGER, SortKey, StatusFilter,
};
use tourney_terminal::config::DashboardConfig;
use tourney_terminal::dashboard::Dashboard;
use tourney_terminal::notify::NotifyLevel;
use tourney_terminal::state::Delta;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn dashboard() -> Dashboard {
    let (cmd_tx, _cmd_rx) = mpsc::channel();
    Dashboard::new(&DashboardConfig::default(), Some(cmd_tx))
}

fn tournaments() -> Vec<Card> {
    vec![
        Card::new("t1", "Winter Cup", "ongoing"),
        Card::new("t2", "Autumn Clash", "completed"),
        Card::new("t3", "Night League", "ongoing"),
        Card::new("t4", "Rookie Brawl", "registration"),
    ]
}

fn players() -> Vec<Card> {
    vec![
        Card::new("p1", "Nova", "").with_metric("wins", 3.0),
        Card::new("p2", "Vega", "").with_metric("wins", 7.0),
        Card::new("p3", "Rook", ""),
        Card::new("p4", "Iris", "").with_metric("wins", 7.0),
    ]
}

fn displayed_ids(dash: &Dashboard, kind: CardKind) -> Vec<String> {
    dash.state
        .cards(kind)
        .displayed()
        .iter()
        .map(|c| c.id.clone())
        .collect()
}

#[test]
fn filter_options_follow_first_seen_statuses() {
    let now = Instant::now();
    let mut dash = dashboard();
    dash.handle_delta(
        Delta::SetCards {
            kind: CardKind::Tournament,
            cards: tournaments(),
        },
        now,
    );

    let labels: Vec<&str> = dash
        .state
        .tournaments
        .filters
        .options()
        .iter()
        .map(StatusFilter::label)
        .collect();
    assert_eq!(labels, vec!["all", "ongoing", "completed", "registration"]);
    assert_eq!(dash.state.tournaments.filters.active(), Some(&StatusFilter::All));
}

#[test]
fn status_filter_hides_the_rest_after_fade() {
    let now = Instant::now();
    let mut dash = dashboard();
    dash.handle_delta(
        Delta::SetCards {
            kind: CardKind::Tournament,
            cards: tournaments(),
        },
        now,
    );

    dash.filter_tournaments(StatusFilter::parse("ongoing"), now);
    assert_eq!(displayed_ids(&dash, CardKind::Tournament).len(), 4);

    dash.tick(now + ms(300));
    assert_eq!(displayed_ids(&dash, CardKind::Tournament), vec!["t1", "t3"]);
    assert!(
        dash.state
            .tournaments
            .displayed()
            .iter()
            .all(|c| c.fade == Fade::Visible)
    );
    assert_eq!(
        dash.state.tournaments.filters.active(),
        Some(&StatusFilter::Status("ongoing".to_string()))
    );

    let toast = dash.state.notifications.iter().last().expect("filter toast");
    assert_eq!(toast.level, NotifyLevel::Info);
    assert_eq!(toast.message, "Filtered tournaments by: ongoing");
}

#[test]
fn all_filter_brings_every_card_back() {
    let now = Instant::now();
    let mut dash = dashboard();
    dash.handle_delta(
        Delta::SetCards {
            kind: CardKind::Tournament,
            cards: tournaments(),
        },
        now,
    );
    dash.filter_tournaments(StatusFilter::parse("completed"), now);
    dash.tick(now + ms(300));
    assert_eq!(displayed_ids(&dash, CardKind::Tournament), vec!["t2"]);

    let later = now + ms(400);
    dash.filter_tournaments(StatusFilter::All, later);
    assert_eq!(displayed_ids(&dash, CardKind::Tournament).len(), 4);
    dash.tick(later + ms(50));
    assert!(dash.state.tournaments.cards.iter().all(|c| c.fade.is_opaque()));
}

#[test]
fn filter_matching_nothing_leaves_an_empty_list() {
    let now = Instant::now();
    let mut dash = dashboard();
    dash.handle_delta(
        Delta::SetCards {
            kind: CardKind::Match,
            cards: vec![Card::new("m1", "Semi", "scheduled")],
        },
        now,
    );
    dash.filter_matches(StatusFilter::parse("cancelled"), now);
    dash.tick(now + ms(300));
    assert!(displayed_ids(&dash, CardKind::Match).is_empty());
    assert_eq!(dash.state.matches.filters.active(), None);
}

#[test]
fn sort_reorders_after_delay_and_renumbers_ranks() {
    let now = Instant::now();
    let mut dash = dashboard();
    dash.handle_delta(
        Delta::SetCards {
            kind: CardKind::Player,
            cards: players(),
        },
        now,
    );

    assert!(dash.sort_players(SortKey::Wins, now));
    let before: Vec<&str> = dash.state.players.cards.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(before, vec!["p1", "p2", "p3", "p4"]);
    assert!(dash.state.players.cards.iter().all(|c| !c.fade.is_opaque()));

    dash.tick(now + SORT_REORDER_DELAY);
    let after: Vec<&str> = dash.state.players.cards.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(after, vec!["p2", "p4", "p1", "p3"]);
    let ranks: Vec<Option<String>> = dash.state.players.cards.iter().map(Card::rank_badge).collect();
    assert_eq!(
        ranks,
        vec![
            Some("#1".to_string()),
            Some("#2".to_string()),
            Some("#3".to_string()),
            Some("#4".to_string())
        ]
    );

    let wins: Vec<f64> = dash.state.players.cards.iter().map(|c| c.metric("wins")).collect();
    assert!(wins.windows(2).all(|w| w[0] >= w[1]));

    assert!(dash.state.players.cards[0].fade.is_opaque());
    assert!(!dash.state.players.cards[3].fade.is_opaque());
    dash.tick(now + SORT_REORDER_DELAY + SORT_STAGGER * 3);
    assert!(dash.state.players.cards.iter().all(|c| c.fade.is_opaque()));
    assert_eq!(dash.state.players.sorts.active(), Some(&SortKey::Wins));

    let toast = dash.state.notifications.iter().last().expect("sort toast");
    assert_eq!(toast.message, "Sorted players by: wins");
}

#[test]
fn sorting_an_empty_list_changes_nothing() {
    let now = Instant::now();
    let mut dash = dashboard();
    let active_before = dash.state.players.sorts.active().copied();

    assert!(!dash.sort_players(SortKey::Kills, now));
    assert!(dash.state.players.pending_sort.is_none());
    assert!(dash.state.notifications.is_empty());
    assert_eq!(dash.state.players.sorts.active().copied(), active_before);
}

#[test]
fn button_group_keeps_one_active_option() {
    let mut group = ButtonGroup::new(vec!["a", "b", "c"]);
    assert_eq!(group.active(), Some(&"a"));

    assert!(group.activate(&"c"));
    assert_eq!(group.active_index(), Some(2));
    assert_eq!(group.next_option(), Some("a"));
    assert_eq!(group.prev_option(), Some("b"));

    assert!(!group.activate(&"z"));
    assert_eq!(group.active(), None);
    assert_eq!(group.next_option(), Some("a"));
}

#[test]
fn failed_card_load_leaves_an_empty_view() {
    let now = Instant::now();
    let mut dash = dashboard();
    dash.handle_delta(
        Delta::CardsFailed {
            kind: CardKind::Player,
            error: "HTTP error! status: 404 Not Found".to_string(),
        },
        now,
    );
    assert!(dash.state.players.loaded);
    assert!(dash.state.players.cards.is_empty());
    assert!(dash.state.notifications.is_empty());
}

#[test]
fn untidy_statuses_collapse_into_one_filter() {
    let now = Instant::now();
    let mut dash = dashboard();
    dash.handle_delta(
        Delta::SetCards {
            kind: CardKind::Match,
            cards: vec![
                Card::new("m1", "Opener", " scheduled "),
                Card::new("m2", "Final", ""),
                Card::new("m3", "Semi", "scheduled"),
            ],
        },
        now,
    );

    let labels: Vec<&str> = dash
        .state
        .matches
        .filters
        .options()
        .iter()
        .map(StatusFilter::label)
        .collect();
    assert_eq!(labels, vec!["all", "scheduled"]);

    dash.filter_matches(StatusFilter::parse("scheduled"), now);
    dash.tick(now + ms(300));
    assert_eq!(displayed_ids(&dash, CardKind::Match), vec!["m1", "m3"]);
}
