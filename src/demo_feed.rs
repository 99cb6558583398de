use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cards::{Card, CardKind};
use crate::source::DashboardSource;
use crate::stats_fetch::{FetchError, StatsSnapshot};

const FAILURE_RATE: f64 = 0.08;

/// Offline source: seeded cards plus counters that drift between fetches.
pub struct DemoSource {
    rng: StdRng,
    players: u64,
    tournaments: u64,
    active: u64,
    completed: u64,
    pending: u64,
    failure_rate: f64,
}

impl DemoSource {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic source that never fails.
    pub fn seeded(seed: u64) -> Self {
        let mut source = Self::with_rng(StdRng::seed_from_u64(seed));
        source.failure_rate = 0.0;
        source
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            players: seed_players().len() as u64,
            tournaments: seed_tournaments().len() as u64,
            active: 1,
            completed: 3,
            pending: 2,
            failure_rate: FAILURE_RATE,
        }
    }
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardSource for DemoSource {
    fn fetch_stats(&mut self) -> Result<StatsSnapshot, FetchError> {
        if self.failure_rate > 0.0 && self.rng.gen_bool(self.failure_rate) {
            return Err(FetchError::Other(anyhow::anyhow!("simulated outage")));
        }

        if self.rng.gen_bool(0.3) {
            self.players += 1;
        }
        if self.rng.gen_bool(0.1) {
            self.tournaments += 1;
            self.active += 1;
        }
        if self.active > 0 && self.rng.gen_bool(0.05) {
            self.active -= 1;
        }
        let new_matches = self.rng.gen_range(0..3);
        self.pending += new_matches;
        let finished = self.rng.gen_range(0..=self.pending.min(2));
        self.pending -= finished;
        self.completed += finished;

        Ok(StatsSnapshot {
            total_players: self.players,
            total_tournaments: self.tournaments,
            total_matches: self.pending + self.completed,
            active_tournaments: self.active.min(self.tournaments),
            completed_matches: self.completed,
            pending_matches: self.pending,
        })
    }

    fn fetch_cards(&mut self, kind: CardKind) -> Result<Vec<Card>, FetchError> {
        Ok(match kind {
            CardKind::Tournament => seed_tournaments(),
            CardKind::Match => seed_matches(),
            CardKind::Player => seed_players(),
        })
    }

    fn describe(&self) -> String {
        "demo".to_string()
    }
}

fn seed_tournaments() -> Vec<Card> {
    [
        ("t1", "Winter Cup", "ongoing", "8/16 players"),
        ("t2", "Rookie Brawl", "registration", "3/8 players"),
        ("t3", "Autumn Clash", "completed", "16/16 players"),
        ("t4", "Night League", "ongoing", "12/12 players"),
    ]
    .into_iter()
    .map(|(id, name, status, subtitle)| {
        let mut card = Card::new(id, name, status);
        card.subtitle = subtitle.to_string();
        card
    })
    .collect()
}

fn seed_matches() -> Vec<Card> {
    [
        ("m1", "Duel Match", "scheduled", "Nova vs Rook"),
        ("m2", "Quarter Final", "completed", "Vega vs Holt"),
        ("m3", "Duel Match", "pending", "Quinn vs Ash"),
        ("m4", "Semi Final", "completed", "Nova vs Vega"),
        ("m5", "Duel Match", "cancelled", "Pike vs Moss"),
    ]
    .into_iter()
    .map(|(id, name, status, subtitle)| {
        let mut card = Card::new(id, name, status);
        card.subtitle = subtitle.to_string();
        card
    })
    .collect()
}

fn seed_players() -> Vec<Card> {
    [
        ("p1", "Nova", 14.0, 3.0, 1.0, 120.0, 41.0),
        ("p2", "Vega", 11.0, 5.0, 0.0, 98.0, 60.0),
        ("p3", "Rook", 9.0, 2.0, 2.0, 77.0, 30.0),
        ("p4", "Quinn", 6.0, 8.0, 1.0, 64.0, 70.0),
        ("p5", "Ash", 3.0, 9.0, 0.0, 35.0, 81.0),
    ]
    .into_iter()
    .map(|(id, name, wins, losses, draws, kills, deaths)| {
        let games: f64 = wins + losses + draws;
        let kd = kills / f64::max(deaths, 1.0);
        let mut card = Card::new(id, name, "")
            .with_metric("wins", wins)
            .with_metric("losses", losses)
            .with_metric("draws", draws)
            .with_metric("kills", kills)
            .with_metric("deaths", deaths)
            .with_metric("kd", kd)
            .with_metric("win_rate", if games > 0.0 { wins / games * 100.0 } else { 0.0 });
        card.subtitle = format!("W{wins:.0} L{losses:.0} D{draws:.0} · K/D {kd:.2}");
        card
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::DemoSource;
    use crate::cards::CardKind;
    use crate::source::DashboardSource;

    #[test]
    fn seeded_counters_stay_consistent() {
        let mut source = DemoSource::seeded(7);
        for _ in 0..50 {
            let snap = source.fetch_stats().expect("seeded source never fails");
            assert_eq!(snap.total_matches, snap.completed_matches + snap.pending_matches);
            assert!(snap.active_tournaments <= snap.total_tournaments);
        }
    }

    #[test]
    fn seeded_players_carry_sort_metrics() {
        let mut source = DemoSource::seeded(1);
        let players = source.fetch_cards(CardKind::Player).expect("cards");
        assert!(players.iter().all(|p| p.metrics.contains_key("win_rate")));
    }
}
