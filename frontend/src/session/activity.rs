/// Rate-limiting for user-interaction signals. Two decoupled outputs: the
/// local countdown reset (cheap, near-instant) and the server liveness ping
/// (expensive, throttled hard, never more than one in flight).

pub const LOCAL_RESET_INTERVAL_MS: u64 = 1_000;
pub const SERVER_PING_INTERVAL_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivityDecision {
    /// Reset the local countdown now.
    pub reset_timer: bool,
    /// Begin a liveness request; the caller must report back via
    /// [`ActivityThrottle::ping_settled`].
    pub start_ping: bool,
}

#[derive(Debug, Clone)]
pub struct ActivityThrottle {
    local_interval_ms: u64,
    ping_interval_ms: u64,
    last_reset_at: Option<u64>,
    last_ping_at: Option<u64>,
    ping_in_flight: bool,
}

impl ActivityThrottle {
    pub fn new(local_interval_ms: u64, ping_interval_ms: u64) -> Self {
        Self {
            local_interval_ms,
            ping_interval_ms,
            last_reset_at: None,
            last_ping_at: None,
            ping_in_flight: false,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(LOCAL_RESET_INTERVAL_MS, SERVER_PING_INTERVAL_MS)
    }

    pub fn observe(&mut self, now_ms: u64) -> ActivityDecision {
        let reset_timer = self
            .last_reset_at
            .map_or(true, |t| now_ms.saturating_sub(t) >= self.local_interval_ms);
        if reset_timer {
            self.last_reset_at = Some(now_ms);
        }

        let ping_due = self
            .last_ping_at
            .map_or(true, |t| now_ms.saturating_sub(t) >= self.ping_interval_ms);
        let start_ping = ping_due && !self.ping_in_flight;
        if start_ping {
            self.ping_in_flight = true;
            self.last_ping_at = Some(now_ms);
        }

        ActivityDecision {
            reset_timer,
            start_ping,
        }
    }

    /// Called when the liveness request resolves, success or failure alike.
    /// Failures are not retried eagerly; the next qualifying activity will.
    pub fn ping_settled(&mut self) {
        self.ping_in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: u64 = 500_000;

    #[test]
    fn first_event_resets_and_pings() {
        let mut throttle = ActivityThrottle::with_defaults();
        let decision = throttle.observe(T0);
        assert!(decision.reset_timer);
        assert!(decision.start_ping);
    }

    #[test]
    fn local_resets_are_limited_to_once_per_second() {
        let mut throttle = ActivityThrottle::with_defaults();
        assert!(throttle.observe(T0).reset_timer);
        assert!(!throttle.observe(T0 + 400).reset_timer);
        assert!(!throttle.observe(T0 + 999).reset_timer);
        assert!(throttle.observe(T0 + 1_000).reset_timer);
    }

    #[test]
    fn ping_waits_for_interval_even_after_settling() {
        let mut throttle = ActivityThrottle::with_defaults();
        assert!(throttle.observe(T0).start_ping);
        throttle.ping_settled();

        assert!(!throttle.observe(T0 + 5_000).start_ping);
        assert!(!throttle.observe(T0 + 29_999).start_ping);
        assert!(throttle.observe(T0 + 30_000).start_ping);
    }

    #[test]
    fn in_flight_ping_suppresses_new_ones_regardless_of_elapsed_time() {
        let mut throttle = ActivityThrottle::with_defaults();
        assert!(throttle.observe(T0).start_ping);

        // Interval has long passed, but the first ping never settled.
        assert!(!throttle.observe(T0 + 120_000).start_ping);
        assert!(!throttle.observe(T0 + 240_000).start_ping);

        throttle.ping_settled();
        assert!(throttle.observe(T0 + 241_000).start_ping);
    }

    #[test]
    fn timer_resets_continue_while_ping_is_in_flight() {
        let mut throttle = ActivityThrottle::with_defaults();
        throttle.observe(T0);
        let decision = throttle.observe(T0 + 2_000);
        assert!(decision.reset_timer);
        assert!(!decision.start_ping);
    }
}
