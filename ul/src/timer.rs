//! The ARTIM ("Association Request/Reject/Release Timer", §4.3.4): guards
//! against a peer that never answers a PDU we are entitled to expect a
//! prompt response to.
//!
//! The timer only ever matters in `Sta2` (waiting for an incoming
//! `A-ASSOCIATE-RQ`) and `Sta13` (waiting for the transport to close after
//! we sent an `A-ABORT` or `A-RELEASE-RP`); both are represented here as a
//! single optional deadline so the caller doesn't need a second type.

use std::time::{Duration, Instant};

/// Default ARTIM timeout. The standard leaves the exact value to the
/// implementation; this one matches the 10s default quoted by the
/// reference upper-layer state machine this crate's transition table is
/// grounded on.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A single-shot deadline. `None` means the timer is not running.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArtimTimer {
    deadline: Option<Instant>,
    timeout: Duration,
}

impl ArtimTimer {
    /// Build a stopped timer with the given timeout duration.
    pub fn new(timeout: Duration) -> Self {
        ArtimTimer {
            deadline: None,
            timeout,
        }
    }

    /// (Re)start the timer, counting `timeout` from now.
    pub fn start(&mut self) {
        self.deadline = Some(Instant::now() + self.timeout);
    }

    /// Stop the timer; subsequent [`Self::check`] calls return `false`
    /// until [`Self::start`] is called again.
    pub fn stop(&mut self) {
        self.deadline = None;
    }

    /// Whether the timer is currently running.
    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether the deadline has passed. Does not stop the timer; the
    /// caller is expected to call [`Self::stop`] once it acts on the
    /// expiry (mirroring how `AA-2`/`AA-5` both stop the timer themselves
    /// as part of handling `ArtimExpired`).
    pub fn check(&self) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    /// How long remains before expiry, if running and not yet expired.
    /// Useful for sizing a blocking read's timeout.
    pub fn remaining(&self) -> Option<Duration> {
        let deadline = self.deadline?;
        let now = Instant::now();
        if deadline > now {
            Some(deadline - now)
        } else {
            Some(Duration::ZERO)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_timer_never_expires() {
        let timer = ArtimTimer::new(Duration::from_millis(1));
        assert!(!timer.is_running());
        assert!(!timer.check());
    }

    #[test]
    fn started_timer_eventually_expires() {
        let mut timer = ArtimTimer::new(Duration::from_millis(1));
        timer.start();
        assert!(timer.is_running());
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.check());
    }

    #[test]
    fn stop_clears_expiry() {
        let mut timer = ArtimTimer::new(Duration::from_millis(1));
        timer.start();
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.check());
        timer.stop();
        assert!(!timer.check());
        assert!(!timer.is_running());
    }
}
