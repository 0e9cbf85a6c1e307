/// Local countdown toward session expiry. Pure state machine: the caller
/// feeds it timestamps (a 1 Hz interval on wasm, explicit values in tests)
/// and it reports the remaining time plus at most one edge signal per tick.
/// It never performs logout itself; that is the expiry reactor's job.

pub const DEFAULT_SESSION_TIMEOUT_MS: u64 = 5 * 60 * 1000;
pub const DEFAULT_WARNING_THRESHOLD_MS: u64 = 60 * 1000;
pub const TICK_INTERVAL_MS: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownSignal {
    /// Remaining time crossed below the warning threshold.
    Warning,
    /// Remaining time reached zero.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub remaining_ms: u64,
    pub signal: Option<CountdownSignal>,
}

#[derive(Debug, Clone)]
pub struct SessionCountdown {
    last_activity_at: u64,
    timeout_ms: u64,
    warning_threshold_ms: u64,
    warning_fired: bool,
    expired_fired: bool,
}

impl SessionCountdown {
    pub fn new(timeout_ms: u64, warning_threshold_ms: u64, now_ms: u64) -> Self {
        Self {
            last_activity_at: now_ms,
            timeout_ms,
            warning_threshold_ms,
            warning_fired: false,
            expired_fired: false,
        }
    }

    pub fn with_defaults(now_ms: u64) -> Self {
        Self::new(DEFAULT_SESSION_TIMEOUT_MS, DEFAULT_WARNING_THRESHOLD_MS, now_ms)
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn warning_threshold_ms(&self) -> u64 {
        self.warning_threshold_ms
    }

    /// Activity must strictly advance `last_activity_at`; stale or equal
    /// timestamps (clock skew, out-of-order server refresh) are ignored.
    /// A successful reset re-arms both the warning and the expiry latch.
    pub fn record_activity(&mut self, now_ms: u64) -> bool {
        if now_ms <= self.last_activity_at {
            return false;
        }
        self.last_activity_at = now_ms;
        self.warning_fired = false;
        self.expired_fired = false;
        true
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.timeout_ms
            .saturating_sub(now_ms.saturating_sub(self.last_activity_at))
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.remaining_ms(now_ms) == 0
    }

    pub fn tick(&mut self, now_ms: u64) -> Tick {
        let remaining_ms = self.remaining_ms(now_ms);
        let signal = if remaining_ms == 0 {
            if self.expired_fired {
                None
            } else {
                self.expired_fired = true;
                // Expiry subsumes the warning edge for this cycle.
                self.warning_fired = true;
                Some(CountdownSignal::Expired)
            }
        } else if remaining_ms <= self.warning_threshold_ms {
            if self.warning_fired {
                None
            } else {
                self.warning_fired = true;
                Some(CountdownSignal::Warning)
            }
        } else {
            self.warning_fired = false;
            None
        };
        Tick {
            remaining_ms,
            signal,
        }
    }
}
