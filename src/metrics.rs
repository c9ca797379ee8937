//! Prometheus metrics for game events

use prometheus::{Counter, Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct GameMetrics {
    registry: Registry,
    games_started: IntCounter,
    reveals: IntCounterVec,
    cashouts: IntCounter,
    failures: IntCounterVec,
    wagered: Counter,
    paid_out: Counter,
}

impl GameMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let games_started = IntCounter::new("mines_games_started_total", "Game sessions started")?;
        let reveals = IntCounterVec::new(
            Opts::new("mines_reveals_total", "Tile reveals by outcome"),
            &["outcome"],
        )?;
        let cashouts = IntCounter::new("mines_cashouts_total", "Sessions won by cash-out")?;
        let failures = IntCounterVec::new(
            Opts::new("mines_failures_total", "Rejected game operations by error code"),
            &["code"],
        )?;
        let wagered = Counter::new("mines_wagered_total", "Sum of accepted bet amounts")?;
        let paid_out = Counter::new("mines_paid_out_total", "Sum of cash-out winnings")?;

        registry.register(Box::new(games_started.clone()))?;
        registry.register(Box::new(reveals.clone()))?;
        registry.register(Box::new(cashouts.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(wagered.clone()))?;
        registry.register(Box::new(paid_out.clone()))?;

        Ok(Self {
            registry,
            games_started,
            reveals,
            cashouts,
            failures,
            wagered,
            paid_out,
        })
    }

    pub fn record_start(&self, bet_amount: f64) {
        self.games_started.inc();
        self.wagered.inc_by(bet_amount);
    }

    pub fn record_reveal(&self, is_mine: bool, repeated: bool) {
        let outcome = match (repeated, is_mine) {
            (true, _) => "repeat",
            (false, true) => "mine",
            (false, false) => "gem",
        };
        self.reveals.with_label_values(&[outcome]).inc();
    }

    pub fn record_cashout(&self, winning_amount: f64) {
        self.cashouts.inc();
        self.paid_out.inc_by(winning_amount);
    }

    pub fn record_failure(&self, code: &str) {
        self.failures.with_label_values(&[code]).inc();
    }

    pub fn games_started(&self) -> u64 {
        self.games_started.get()
    }

    pub fn reveals(&self, outcome: &str) -> u64 {
        self.reveals.with_label_values(&[outcome]).get()
    }

    pub fn cashouts(&self) -> u64 {
        self.cashouts.get()
    }

    pub fn failures(&self, code: &str) -> u64 {
        self.failures.with_label_values(&[code]).get()
    }

    /// Text exposition format for `/metrics`
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_render() {
        let metrics = GameMetrics::new().unwrap();
        metrics.record_start(2.0);
        metrics.record_reveal(false, false);
        metrics.record_reveal(false, false);
        metrics.record_reveal(true, false);
        metrics.record_reveal(false, true);
        metrics.record_cashout(2.2272);
        metrics.record_failure("SESSION_NOT_FOUND");

        assert_eq!(metrics.games_started(), 1);
        assert_eq!(metrics.reveals("gem"), 2);
        assert_eq!(metrics.reveals("mine"), 1);
        assert_eq!(metrics.reveals("repeat"), 1);
        assert_eq!(metrics.cashouts(), 1);
        assert_eq!(metrics.failures("SESSION_NOT_FOUND"), 1);

        let text = metrics.render().unwrap();
        assert!(text.contains("mines_games_started_total 1"));
        assert!(text.contains("mines_reveals_total{outcome=\"gem\"} 2"));
        assert!(text.contains("mines_wagered_total 2"));
    }

    #[test]
    fn test_instances_are_independent() {
        let a = GameMetrics::new().unwrap();
        let b = GameMetrics::new().unwrap();
        a.record_start(1.0);
        assert_eq!(b.games_started(), 0);
    }
}
