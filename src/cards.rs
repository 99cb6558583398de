use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const FADE_IN_DELAY: Duration = Duration::from_millis(50);
pub const HIDE_AFTER: Duration = Duration::from_millis(300);
pub const SORT_REORDER_DELAY: Duration = Duration::from_millis(300);
pub const SORT_STAGGER: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardKind {
    Tournament,
    Match,
    Player,
}

impl CardKind {
    pub const ALL: [CardKind; 3] = [CardKind::Tournament, CardKind::Match, CardKind::Player];

    pub fn label(self) -> &'static str {
        match self {
            CardKind::Tournament => "tournaments",
            CardKind::Match => "matches",
            CardKind::Player => "players",
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            CardKind::Tournament => "/api/tournaments",
            CardKind::Match => "/api/matches",
            CardKind::Player => "/api/players",
        }
    }
}

/// Visibility of a card, including the short transitions between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fade {
    Visible,
    /// Displayed but transparent until `at`.
    Revealing { at: Instant },
    /// Transparent, dropped from the list at `at`.
    Hiding { at: Instant },
    Hidden,
}

impl Fade {
    pub fn is_displayed(self) -> bool {
        !matches!(self, Fade::Hidden)
    }

    pub fn is_opaque(self) -> bool {
        matches!(self, Fade::Visible)
    }

    pub fn settle(self, now: Instant) -> Fade {
        match self {
            Fade::Revealing { at } if now >= at => Fade::Visible,
            Fade::Hiding { at } if now >= at => Fade::Hidden,
            other => other,
        }
    }

    pub fn is_transitioning(self) -> bool {
        matches!(self, Fade::Revealing { .. } | Fade::Hiding { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    All,
    Status(String),
}

impl StatusFilter {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("all") || trimmed.is_empty() {
            StatusFilter::All
        } else {
            StatusFilter::Status(trimmed.to_string())
        }
    }

    pub fn matches(&self, status: &str) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Status(want) => want == status.trim(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Status(status) => status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Wins,
    Losses,
    Draws,
    Kills,
    Deaths,
    Kd,
    WinRate,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Wins,
        SortKey::Kills,
        SortKey::Kd,
        SortKey::WinRate,
        SortKey::Losses,
        SortKey::Draws,
        SortKey::Deaths,
    ];

    /// Name of the card metric this key reads.
    pub fn field(self) -> &'static str {
        match self {
            SortKey::Wins => "wins",
            SortKey::Losses => "losses",
            SortKey::Draws => "draws",
            SortKey::Kills => "kills",
            SortKey::Deaths => "deaths",
            SortKey::Kd => "kd",
            SortKey::WinRate => "win_rate",
        }
    }
}

/// Set of mutually exclusive controls; at most one option is active.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonGroup<T> {
    options: Vec<T>,
    active: Option<usize>,
}

impl<T: PartialEq + Clone> ButtonGroup<T> {
    pub fn new(options: Vec<T>) -> Self {
        let active = if options.is_empty() { None } else { Some(0) };
        Self { options, active }
    }

    pub fn options(&self) -> &[T] {
        &self.options
    }

    pub fn active(&self) -> Option<&T> {
        self.active.and_then(|idx| self.options.get(idx))
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Deactivates every option, then activates `option` if the group has it.
    pub fn activate(&mut self, option: &T) -> bool {
        self.active = self.options.iter().position(|o| o == option);
        self.active.is_some()
    }

    pub fn next_option(&self) -> Option<T> {
        if self.options.is_empty() {
            return None;
        }
        let idx = match self.active {
            Some(idx) => (idx + 1) % self.options.len(),
            None => 0,
        };
        self.options.get(idx).cloned()
    }

    pub fn prev_option(&self) -> Option<T> {
        if self.options.is_empty() {
            return None;
        }
        let len = self.options.len();
        let idx = match self.active {
            Some(idx) => (idx + len - 1) % len,
            None => len - 1,
        };
        self.options.get(idx).cloned()
    }
}

#[derive(Debug, Clone)]
pub struct Card {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub status: String,
    pub metrics: HashMap<String, f64>,
    pub rank: Option<usize>,
    pub fade: Fade,
}

impl Card {
    pub fn new(id: impl Into<String>, title: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            subtitle: String::new(),
            status: status.into(),
            metrics: HashMap::new(),
            rank: None,
            fade: Fade::Visible,
        }
    }

    pub fn with_metric(mut self, name: &str, value: f64) -> Self {
        self.metrics.insert(name.to_string(), value);
        self
    }

    /// Missing or non-finite values read as 0.
    pub fn metric(&self, name: &str) -> f64 {
        match self.metrics.get(name) {
            Some(v) if v.is_finite() => *v,
            _ => 0.0,
        }
    }

    pub fn rank_badge(&self) -> Option<String> {
        self.rank.map(|r| format!("#{r}"))
    }
}

#[derive(Debug, Clone)]
pub struct PendingSort {
    pub key: SortKey,
    pub apply_at: Instant,
    /// Indices into the current card list, in final order.
    pub order: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct CardList {
    pub kind: CardKind,
    pub cards: Vec<Card>,
    pub filters: ButtonGroup<StatusFilter>,
    pub sorts: ButtonGroup<SortKey>,
    pub selected: usize,
    pub pending_sort: Option<PendingSort>,
    pub loaded: bool,
}

impl CardList {
    pub fn new(kind: CardKind) -> Self {
        let sorts = match kind {
            CardKind::Player => ButtonGroup::new(SortKey::ALL.to_vec()),
            _ => ButtonGroup::new(Vec::new()),
        };
        Self {
            kind,
            cards: Vec::new(),
            filters: ButtonGroup::new(vec![StatusFilter::All]),
            sorts,
            selected: 0,
            pending_sort: None,
            loaded: false,
        }
    }

    pub fn set_cards(&mut self, mut cards: Vec<Card>) {
        if self.kind == CardKind::Player {
            for (idx, card) in cards.iter_mut().enumerate() {
                if card.rank.is_none() {
                    card.rank = Some(idx + 1);
                }
            }
        }

        let mut options = vec![StatusFilter::All];
        for card in &cards {
            let filter = StatusFilter::parse(&card.status);
            if !options.contains(&filter) {
                options.push(filter);
            }
        }
        self.filters = ButtonGroup::new(options);
        self.cards = cards;
        self.pending_sort = None;
        self.selected = self.selected.min(self.cards.len().saturating_sub(1));
        self.loaded = true;
    }

    /// Shows cards whose status passes `filter` and hides the rest. Returns
    /// the number of cards left displayed.
    pub fn apply_filter(&mut self, filter: &StatusFilter, now: Instant) -> usize {
        let mut shown = 0;
        for card in &mut self.cards {
            if filter.matches(&card.status) {
                card.fade = Fade::Revealing {
                    at: now + FADE_IN_DELAY,
                };
                shown += 1;
            } else if card.fade != Fade::Hidden {
                card.fade = Fade::Hiding {
                    at: now + HIDE_AFTER,
                };
            }
        }
        self.filters.activate(filter);
        self.selected = 0;
        shown
    }

    /// Orders cards by `key` descending. The new order takes effect after
    /// `SORT_REORDER_DELAY`; each card is revealed `SORT_STAGGER` after the
    /// one above it. Returns false for an empty list.
    pub fn sort_by_metric(&mut self, key: SortKey, now: Instant) -> bool {
        if self.cards.is_empty() {
            return false;
        }

        let field = key.field();
        let mut order: Vec<usize> = (0..self.cards.len()).collect();
        order.sort_by(|&a, &b| {
            let av = self.cards[a].metric(field);
            let bv = self.cards[b].metric(field);
            bv.partial_cmp(&av).unwrap_or(Ordering::Equal)
        });

        let apply_at = now + SORT_REORDER_DELAY;
        for (position, &idx) in order.iter().enumerate() {
            self.cards[idx].fade = Fade::Revealing {
                at: apply_at + SORT_STAGGER * position as u32,
            };
        }
        self.pending_sort = Some(PendingSort {
            key,
            apply_at,
            order,
        });
        self.sorts.activate(&key);
        true
    }

    pub fn tick(&mut self, now: Instant) {
        let due = self
            .pending_sort
            .as_ref()
            .is_some_and(|pending| now >= pending.apply_at);
        if due {
            if let Some(pending) = self.pending_sort.take() {
                self.apply_order(&pending.order);
            }
        }

        for card in &mut self.cards {
            card.fade = card.fade.settle(now);
        }
    }

    fn apply_order(&mut self, order: &[usize]) {
        let mut slots: Vec<Option<Card>> = self.cards.drain(..).map(Some).collect();
        let mut reordered = Vec::with_capacity(slots.len());
        for &idx in order {
            if let Some(card) = slots.get_mut(idx).and_then(Option::take) {
                reordered.push(card);
            }
        }
        reordered.extend(slots.into_iter().flatten());
        for (position, card) in reordered.iter_mut().enumerate() {
            card.rank = Some(position + 1);
        }
        self.cards = reordered;
        self.selected = 0;
    }

    pub fn displayed(&self) -> Vec<&Card> {
        self.cards.iter().filter(|c| c.fade.is_displayed()).collect()
    }

    pub fn selected_card(&self) -> Option<&Card> {
        self.displayed().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let count = self.displayed().len();
        if count > 0 && self.selected + 1 < count {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn is_animating(&self) -> bool {
        self.pending_sort.is_some() || self.cards.iter().any(|c| c.fade.is_transitioning())
    }
}
