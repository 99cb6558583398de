use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::cards::{Card, CardKind, CardList};
use crate::notify::{Notifications, NotifyLevel};
use crate::stats_fetch::{StatKey, StatsSnapshot};
use crate::timer::IntervalTimer;
use crate::tween::CounterTween;

pub const COUNTDOWN_PERIOD: Duration = Duration::from_secs(10);
pub const STATUS_PULSE: Duration = Duration::from_millis(1000);
pub const JUST_NOW: &str = "Just now";

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Overview,
    Tournaments,
    Matches,
    Players,
}

impl Screen {
    pub const ALL: [Screen; 4] = [
        Screen::Overview,
        Screen::Tournaments,
        Screen::Matches,
        Screen::Players,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Screen::Overview => "Overview",
            Screen::Tournaments => "Tournaments",
            Screen::Matches => "Matches",
            Screen::Players => "Players",
        }
    }

    pub fn next(self) -> Screen {
        let idx = Screen::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Screen::ALL[(idx + 1) % Screen::ALL.len()]
    }

    pub fn card_kind(self) -> Option<CardKind> {
        match self {
            Screen::Overview => None,
            Screen::Tournaments => Some(CardKind::Tournament),
            Screen::Matches => Some(CardKind::Match),
            Screen::Players => Some(CardKind::Player),
        }
    }
}

/// One statistics tile.
#[derive(Debug, Clone)]
pub struct Counter {
    pub key: StatKey,
    pub value: u64,
    pub tween: Option<CounterTween>,
    pub pulse_until: Option<Instant>,
}

impl Counter {
    pub fn new(key: StatKey) -> Self {
        Self {
            key,
            value: 0,
            tween: None,
            pulse_until: None,
        }
    }

    pub fn displayed(&self, now: Instant) -> u64 {
        match &self.tween {
            Some(tween) => tween.value_at(now),
            None => self.value,
        }
    }

    /// Starts a transition from whatever is on screen right now.
    pub fn retarget(&mut self, end: u64, now: Instant) {
        let start = self.displayed(now);
        self.tween = Some(CounterTween::new(start, end, now));
        self.value = end;
    }

    pub fn is_pulsing(&self, now: Instant) -> bool {
        self.pulse_until.is_some_and(|until| now < until)
    }
}

#[derive(Debug, Clone)]
pub struct RefreshState {
    pub interval: Duration,
    pub in_flight: bool,
    pub auto_refresh: IntervalTimer,
    pub countdown: IntervalTimer,
    pub last_success: Option<Instant>,
    pub last_success_wall: Option<DateTime<Local>>,
    pub last_update_label: String,
}

impl RefreshState {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            in_flight: false,
            auto_refresh: IntervalTimer::new(interval),
            countdown: IntervalTimer::new(COUNTDOWN_PERIOD),
            last_success: None,
            last_success_wall: None,
            last_update_label: JUST_NOW.to_string(),
        }
    }

    /// The refresh control shows its loading state exactly while a fetch is
    /// outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub counters: Vec<Counter>,
    pub stat_selected: usize,
    pub tournaments: CardList,
    pub matches: CardList,
    pub players: CardList,
    pub notifications: Notifications,
    pub logs: VecDeque<String>,
    pub refresh: RefreshState,
    pub compact: bool,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            screen: Screen::Overview,
            counters: StatKey::ALL.iter().map(|k| Counter::new(*k)).collect(),
            stat_selected: 0,
            tournaments: CardList::new(CardKind::Tournament),
            matches: CardList::new(CardKind::Match),
            players: CardList::new(CardKind::Player),
            notifications: Notifications::new(),
            logs: VecDeque::new(),
            refresh: RefreshState::new(refresh_interval),
            compact: false,
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, level: NotifyLevel, now: Instant) -> u64 {
        self.notifications.show(message, level, now)
    }

    pub fn counter(&self, key: StatKey) -> Option<&Counter> {
        self.counters.iter().find(|c| c.key == key)
    }

    pub fn cards(&self, kind: CardKind) -> &CardList {
        match kind {
            CardKind::Tournament => &self.tournaments,
            CardKind::Match => &self.matches,
            CardKind::Player => &self.players,
        }
    }

    pub fn cards_mut(&mut self, kind: CardKind) -> &mut CardList {
        match kind {
            CardKind::Tournament => &mut self.tournaments,
            CardKind::Match => &mut self.matches,
            CardKind::Player => &mut self.players,
        }
    }

    /// Resets the label to "Just now" and restarts the single countdown.
    /// Does not record a success.
    pub fn start_update_clock(&mut self, now: Instant) {
        self.refresh.last_update_label = JUST_NOW.to_string();
        self.refresh.countdown.restart(now);
    }

    /// Records a successful refresh and restarts the countdown.
    pub fn mark_updated(&mut self, now: Instant) {
        self.refresh.last_success = Some(now);
        self.refresh.last_success_wall = Some(Local::now());
        self.start_update_clock(now);
    }

    pub fn update_elapsed_label(&mut self, now: Instant) {
        let Some(last) = self.refresh.last_success else {
            return;
        };
        let secs = now.saturating_duration_since(last).as_secs();
        self.refresh.last_update_label = elapsed_label(secs);
    }

    /// Advances every time-driven piece of state except the auto-refresh
    /// timer, which the controller owns the reaction to.
    pub fn tick(&mut self, now: Instant) {
        if self.refresh.countdown.fire_due(now) {
            self.update_elapsed_label(now);
        }
        for kind in CardKind::ALL {
            self.cards_mut(kind).tick(now);
        }
        self.notifications.prune(now);
        for counter in &mut self.counters {
            if counter.tween.is_some_and(|t| t.is_finished(now)) {
                counter.tween = None;
            }
            if counter.pulse_until.is_some_and(|until| now >= until) {
                counter.pulse_until = None;
            }
        }
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.counters
            .iter()
            .any(|c| c.tween.is_some_and(|t| !t.is_finished(now)) || c.pulse_until.is_some())
            || CardKind::ALL.iter().any(|k| self.cards(*k).is_animating())
            || self.notifications.is_animating(now)
    }
}

pub fn elapsed_label(secs: u64) -> String {
    if secs < 60 {
        format!("{secs} seconds ago")
    } else if secs < 3600 {
        let minutes = secs / 60;
        format!("{minutes} minute{} ago", if minutes > 1 { "s" } else { "" })
    } else {
        let hours = secs / 3600;
        format!("{hours} hour{} ago", if hours > 1 { "s" } else { "" })
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    StatsFetched(StatsSnapshot),
    StatsFailed(String),
    SetCards { kind: CardKind, cards: Vec<Card> },
    CardsFailed { kind: CardKind, error: String },
    Log(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCommand {
    FetchStats,
    LoadCards(CardKind),
}

pub fn apply_delta(state: &mut AppState, delta: Delta, now: Instant) {
    match delta {
        Delta::StatsFetched(snapshot) => {
            for counter in &mut state.counters {
                counter.retarget(snapshot.get(counter.key), now);
            }
            state.mark_updated(now);
            state.refresh.in_flight = false;
            info!(?snapshot, "stats refreshed");
            state.push_log("[INFO] Dashboard data refreshed");
            state.notify("Data refreshed successfully!", NotifyLevel::Success, now);
        }
        Delta::StatsFailed(err) => {
            state.refresh.in_flight = false;
            warn!(error = %err, "stats refresh failed");
            state.push_log(format!("[ERROR] Error refreshing data: {err}"));
            state.notify(
                "Failed to refresh data. Please try again.",
                NotifyLevel::Error,
                now,
            );
        }
        Delta::SetCards { kind, cards } => {
            let count = cards.len();
            state.cards_mut(kind).set_cards(cards);
            state.push_log(format!("[INFO] Loaded {count} {}", kind.label()));
        }
        Delta::CardsFailed { kind, error } => {
            warn!(kind = kind.label(), error = %error, "card load failed");
            state.cards_mut(kind).set_cards(Vec::new());
            state.push_log(format!("[WARN] Could not load {}: {error}", kind.label()));
        }
        Delta::Log(line) => state.push_log(line),
    }
}
