use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};

use crate::cards::{CardKind, SortKey, StatusFilter};
use crate::config::{DashboardConfig, MIN_REFRESH_SECS};
use crate::notify::NotifyLevel;
use crate::state::{AppState, Delta, ProviderCommand, STATUS_PULSE, Screen, apply_delta};

const INTERVAL_STEP: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Started,
    AlreadyInFlight,
    Unavailable,
}

/// Page controller: owns the dashboard state, both timers and the command
/// channel to the provider worker.
pub struct Dashboard {
    pub state: AppState,
    pub should_quit: bool,
    cmd_tx: Option<Sender<ProviderCommand>>,
    compact_width: u16,
    destroyed: bool,
}

impl Dashboard {
    pub fn new(config: &DashboardConfig, cmd_tx: Option<Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(config.refresh_interval),
            should_quit: false,
            cmd_tx,
            compact_width: config.compact_width,
            destroyed: false,
        }
    }

    /// Loads the card lists, starts both timers and issues the first refresh.
    pub fn init(&mut self, now: Instant, width: u16) {
        self.state.compact = width <= self.compact_width;
        for kind in CardKind::ALL {
            self.request_cards(kind);
        }
        self.start_auto_refresh(now);
        self.state.start_update_clock(now);
        self.state.push_log("[INFO] Tournament dashboard initialized");
        info!("dashboard initialized");
        self.refresh_data(now);
    }

    pub fn refresh_data(&mut self, now: Instant) -> RefreshOutcome {
        if self.state.refresh.in_flight {
            self.state.push_log("[INFO] Refresh already in progress");
            return RefreshOutcome::AlreadyInFlight;
        }

        self.state.refresh.in_flight = true;
        self.state.push_log("[INFO] Refreshing dashboard data...");
        let sent = self
            .cmd_tx
            .as_ref()
            .is_some_and(|tx| tx.send(ProviderCommand::FetchStats).is_ok());
        if sent {
            RefreshOutcome::Started
        } else {
            apply_delta(
                &mut self.state,
                Delta::StatsFailed("data provider unavailable".to_string()),
                now,
            );
            RefreshOutcome::Unavailable
        }
    }

    fn request_cards(&mut self, kind: CardKind) {
        let sent = self
            .cmd_tx
            .as_ref()
            .is_some_and(|tx| tx.send(ProviderCommand::LoadCards(kind)).is_ok());
        if !sent {
            self.state
                .push_log(format!("[WARN] Cannot load {}: provider unavailable", kind.label()));
        }
    }

    pub fn handle_delta(&mut self, delta: Delta, now: Instant) {
        apply_delta(&mut self.state, delta, now);
    }

    /// Applies every delta the worker has sent so far. If the worker is gone,
    /// an outstanding fetch is failed and the command channel is released.
    pub fn drain_deltas(&mut self, rx: &Receiver<Delta>, now: Instant) {
        loop {
            match rx.try_recv() {
                Ok(delta) => self.handle_delta(delta, now),
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    self.provider_lost(now);
                    return;
                }
            }
        }
    }

    fn provider_lost(&mut self, now: Instant) {
        if self.cmd_tx.take().is_some() {
            warn!("data provider stopped");
            self.state.push_log("[ERROR] Data provider stopped");
        }
        if self.state.refresh.in_flight {
            apply_delta(
                &mut self.state,
                Delta::StatsFailed("data provider unavailable".to_string()),
                now,
            );
        }
    }

    pub fn start_auto_refresh(&mut self, now: Instant) {
        self.state.refresh.auto_refresh.start(now);
        let secs = self.state.refresh.interval.as_secs();
        self.state
            .push_log(format!("[INFO] Auto-refresh started (every {secs} seconds)"));
        info!(interval_secs = secs, "auto-refresh started");
    }

    /// No-op when the timer is not running.
    pub fn stop_auto_refresh(&mut self) -> bool {
        let stopped = self.state.refresh.auto_refresh.stop();
        if stopped {
            self.state.push_log("[INFO] Auto-refresh stopped");
            info!("auto-refresh stopped");
        }
        stopped
    }

    pub fn set_refresh_interval(&mut self, interval: Duration, now: Instant) {
        self.state.refresh.interval = interval;
        self.state.refresh.auto_refresh.set_period(interval);
        self.stop_auto_refresh();
        self.start_auto_refresh(now);
    }

    pub fn filter_tournaments(&mut self, filter: StatusFilter, now: Instant) {
        self.filter_cards(CardKind::Tournament, filter, now);
    }

    pub fn filter_matches(&mut self, filter: StatusFilter, now: Instant) {
        self.filter_cards(CardKind::Match, filter, now);
    }

    fn filter_cards(&mut self, kind: CardKind, filter: StatusFilter, now: Instant) {
        self.state.cards_mut(kind).apply_filter(&filter, now);
        let message = format!("Filtered {} by: {}", kind.label(), filter.label());
        self.show_notification(message, NotifyLevel::Info, now);
    }

    /// Returns false, touching nothing, when there are no player cards.
    pub fn sort_players(&mut self, key: SortKey, now: Instant) -> bool {
        if !self.state.players.sort_by_metric(key, now) {
            return false;
        }
        let message = format!("Sorted players by: {}", key.field());
        self.show_notification(message, NotifyLevel::Info, now);
        true
    }

    pub fn show_notification(
        &mut self,
        message: impl Into<String>,
        level: NotifyLevel,
        now: Instant,
    ) -> u64 {
        self.state.notify(message, level, now)
    }

    pub fn on_focus_lost(&mut self) {
        self.stop_auto_refresh();
    }

    pub fn on_focus_gained(&mut self, now: Instant) {
        self.start_auto_refresh(now);
        self.refresh_data(now);
    }

    pub fn on_resize(&mut self, width: u16) {
        let compact = width <= self.compact_width;
        if compact != self.state.compact {
            self.state.compact = compact;
        }
    }

    pub fn pulse_selected_stat(&mut self, now: Instant) {
        if let Some(counter) = self.state.counters.get_mut(self.state.stat_selected) {
            counter.pulse_until = Some(now + STATUS_PULSE);
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if self.state.refresh.auto_refresh.fire_due(now) {
            self.refresh_data(now);
        }
        self.state.tick(now);
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Stops both timers and releases the provider channel. Safe to call more
    /// than once.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.stop_auto_refresh();
        self.state.refresh.countdown.stop();
        self.cmd_tx = None;
        self.state.push_log("[INFO] Tournament dashboard destroyed");
        info!("dashboard destroyed");
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::F(5) => {
                self.refresh_data(now);
            }
            KeyCode::Char('r') | KeyCode::Char('R') if ctrl => {
                self.refresh_data(now);
            }
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('r') => {
                self.refresh_data(now);
            }
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => {
                if self.state.help_overlay {
                    self.state.help_overlay = false;
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Char('1') => self.state.screen = Screen::Overview,
            KeyCode::Char('2') => self.state.screen = Screen::Tournaments,
            KeyCode::Char('3') => self.state.screen = Screen::Matches,
            KeyCode::Char('4') => self.state.screen = Screen::Players,
            KeyCode::Tab => self.state.screen = self.state.screen.next(),
            KeyCode::Char('f') => self.cycle_filter(true, now),
            KeyCode::Char('F') => self.cycle_filter(false, now),
            KeyCode::Char('s') => self.cycle_sort(true, now),
            KeyCode::Char('S') => self.cycle_sort(false, now),
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_prev(),
            KeyCode::Right if self.state.screen == Screen::Overview => self.select_next(),
            KeyCode::Left if self.state.screen == Screen::Overview => self.select_prev(),
            KeyCode::Enter if self.state.screen == Screen::Overview => {
                self.pulse_selected_stat(now)
            }
            KeyCode::Char('[') => {
                let current = self.state.refresh.interval;
                let floor = Duration::from_secs(MIN_REFRESH_SECS);
                let next = current.saturating_sub(INTERVAL_STEP).max(floor);
                if next != current {
                    self.set_refresh_interval(next, now);
                }
            }
            KeyCode::Char(']') => {
                let next = self.state.refresh.interval + INTERVAL_STEP;
                self.set_refresh_interval(next, now);
            }
            KeyCode::Char('x') => {
                self.state.notifications.dismiss_latest(now);
            }
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn cycle_filter(&mut self, forward: bool, now: Instant) {
        let Some(kind) = self.state.screen.card_kind() else {
            return;
        };
        let filters = &self.state.cards(kind).filters;
        let next = if forward {
            filters.next_option()
        } else {
            filters.prev_option()
        };
        let Some(filter) = next else {
            return;
        };
        match kind {
            CardKind::Tournament => self.filter_tournaments(filter, now),
            CardKind::Match => self.filter_matches(filter, now),
            CardKind::Player => {}
        }
    }

    fn cycle_sort(&mut self, forward: bool, now: Instant) {
        if self.state.screen != Screen::Players {
            return;
        }
        let sorts = &self.state.players.sorts;
        let next = if forward {
            sorts.next_option()
        } else {
            sorts.prev_option()
        };
        if let Some(key) = next {
            self.sort_players(key, now);
        }
    }

    fn select_next(&mut self) {
        match self.state.screen.card_kind() {
            Some(kind) => self.state.cards_mut(kind).select_next(),
            None => {
                if self.state.stat_selected + 1 < self.state.counters.len() {
                    self.state.stat_selected += 1;
                }
            }
        }
    }

    fn select_prev(&mut self) {
        match self.state.screen.card_kind() {
            Some(kind) => self.state.cards_mut(kind).select_prev(),
            None => self.state.stat_selected = self.state.stat_selected.saturating_sub(1),
        }
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.destroy();
    }
}
