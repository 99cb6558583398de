use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const SLIDE_IN_DELAY: Duration = Duration::from_millis(100);
pub const AUTO_DISMISS_AFTER: Duration = Duration::from_millis(3000);
pub const FADE_OUT: Duration = Duration::from_millis(300);

const MAX_NOTIFICATIONS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl NotifyLevel {
    /// Unknown severities fall back to `Info`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "error" => Self::Error,
            "warning" | "warn" => Self::Warning,
            _ => Self::Info,
        }
    }

    /// Level of a console line from its `[TAG]` prefix.
    pub fn from_log_line(line: &str) -> Self {
        line.strip_prefix('[')
            .and_then(|rest| rest.split_once(']'))
            .map(|(tag, _)| Self::parse(tag))
            .unwrap_or(Self::Info)
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Success => "✔",
            Self::Error => "✖",
            Self::Warning => "⚠",
            Self::Info => "ℹ",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPhase {
    Entering,
    Shown,
    Leaving,
    Expired,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub level: NotifyLevel,
    pub created_at: Instant,
}

impl Notification {
    pub fn phase(&self, now: Instant) -> NotificationPhase {
        let age = now.saturating_duration_since(self.created_at);
        if age < SLIDE_IN_DELAY {
            NotificationPhase::Entering
        } else if age < AUTO_DISMISS_AFTER {
            NotificationPhase::Shown
        } else if age < AUTO_DISMISS_AFTER + FADE_OUT {
            NotificationPhase::Leaving
        } else {
            NotificationPhase::Expired
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Notifications {
    items: VecDeque<Notification>,
    next_id: u64,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: impl Into<String>, level: NotifyLevel, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push_back(Notification {
            id,
            message: message.into(),
            level,
            created_at: now,
        });
        while self.items.len() > MAX_NOTIFICATIONS {
            self.items.pop_front();
        }
        id
    }

    /// Removes a notification ahead of its timeout. Returns false when it was
    /// already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    /// Dismisses the newest notification that is on screen. Entries still
    /// sliding in are left alone.
    pub fn dismiss_latest(&mut self, now: Instant) -> bool {
        let newest_visible = self.items.iter().rposition(|n| {
            matches!(
                n.phase(now),
                NotificationPhase::Shown | NotificationPhase::Leaving
            )
        });
        match newest_visible {
            Some(idx) => self.items.remove(idx).is_some(),
            None => false,
        }
    }

    pub fn prune(&mut self, now: Instant) {
        self.items.retain(|n| n.phase(now) != NotificationPhase::Expired);
    }

    pub fn visible(&self, now: Instant) -> impl Iterator<Item = &Notification> {
        self.items.iter().filter(move |n| {
            matches!(
                n.phase(now),
                NotificationPhase::Shown | NotificationPhase::Leaving
            )
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.items.iter().any(|n| {
            matches!(
                n.phase(now),
                NotificationPhase::Entering | NotificationPhase::Leaving
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_level_is_info() {
        assert_eq!(NotifyLevel::parse("fatal"), NotifyLevel::Info);
        assert_eq!(NotifyLevel::parse("Warning"), NotifyLevel::Warning);
        assert_eq!(NotifyLevel::parse("info").icon(), "ℹ");
    }

    #[test]
    fn console_prefix_picks_level() {
        assert_eq!(
            NotifyLevel::from_log_line("[ERROR] Error refreshing data: boom"),
            NotifyLevel::Error
        );
        assert_eq!(
            NotifyLevel::from_log_line("[WARN] Could not load matches"),
            NotifyLevel::Warning
        );
        assert_eq!(NotifyLevel::from_log_line("[DEBUG] x"), NotifyLevel::Info);
        assert_eq!(NotifyLevel::from_log_line("no tag here"), NotifyLevel::Info);
    }

    #[test]
    fn lifecycle_slides_in_then_expires() {
        let t0 = Instant::now();
        let mut n = Notifications::new();
        n.show("hello", NotifyLevel::Success, t0);

        assert_eq!(n.visible(t0).count(), 0);
        assert_eq!(n.visible(t0 + Duration::from_millis(150)).count(), 1);
        assert_eq!(n.visible(t0 + Duration::from_millis(3100)).count(), 1);

        n.prune(t0 + Duration::from_millis(3200));
        assert_eq!(n.len(), 1);
        n.prune(t0 + Duration::from_millis(3300));
        assert!(n.is_empty());
    }

    #[test]
    fn dismiss_latest_skips_entries_not_yet_drawn() {
        let t0 = Instant::now();
        let mut n = Notifications::new();
        let shown = n.show("first", NotifyLevel::Info, t0);
        let entering = n.show("second", NotifyLevel::Success, t0 + Duration::from_millis(500));

        let now = t0 + Duration::from_millis(550);
        assert!(n.dismiss_latest(now));
        let left: Vec<u64> = n.iter().map(|x| x.id).collect();
        assert_eq!(left, vec![entering]);
        assert!(!n.dismiss(shown));

        assert!(!n.dismiss_latest(now));
        assert!(n.dismiss_latest(t0 + Duration::from_millis(700)));
        assert!(n.is_empty());
    }

    #[test]
    fn dismissed_notification_is_not_removed_twice() {
        let t0 = Instant::now();
        let mut n = Notifications::new();
        let id = n.show("bye", NotifyLevel::Info, t0);
        assert!(n.dismiss(id));
        assert!(!n.dismiss(id));
        n.prune(t0 + Duration::from_secs(4));
        assert!(n.is_empty());
    }
}
