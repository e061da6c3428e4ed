use std::time::{Duration, Instant};

/// Turns monotonic timestamps into a count of whole elapsed periods.
///
/// Each call to [`Ticker::poll`] reports how many periods completed since the
/// previous one. The phase is kept from the arming instant so frames that
/// arrive late do not accumulate drift.
#[derive(Clone, Copy, Debug)]
pub struct Ticker {
    period: Duration,
    next_due: Instant,
}

impl Ticker {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_due: now + period,
        }
    }

    pub fn poll(&mut self, now: Instant) -> u32 {
        if now < self.next_due || self.period.is_zero() {
            return 0;
        }
        let overdue = now - self.next_due;
        let fired = 1 + (overdue.as_nanos() / self.period.as_nanos()) as u32;
        self.next_due += self.period * fired;
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_fires_once_per_period() {
        let start = Instant::now();
        let mut ticker = Ticker::new(Duration::from_secs(1), start);

        assert_eq!(ticker.poll(start + Duration::from_millis(999)), 0);
        assert_eq!(ticker.poll(start + Duration::from_millis(1000)), 1);
        assert_eq!(ticker.poll(start + Duration::from_millis(1500)), 0);
        assert_eq!(ticker.poll(start + Duration::from_millis(2001)), 1);
    }

    #[test]
    fn test_ticker_catches_up_without_drift() {
        let start = Instant::now();
        let mut ticker = Ticker::new(Duration::from_millis(500), start);

        assert_eq!(ticker.poll(start + Duration::from_millis(1750)), 3);
        // phase is still anchored on `start`, so the next tick is due at 2000ms
        assert_eq!(ticker.poll(start + Duration::from_millis(1999)), 0);
        assert_eq!(ticker.poll(start + Duration::from_millis(2000)), 1);
    }

    #[test]
    fn test_ticker_ignores_earlier_instants() {
        let start = Instant::now() + Duration::from_secs(10);
        let mut ticker = Ticker::new(Duration::from_secs(1), start);
        assert_eq!(ticker.poll(start - Duration::from_secs(5)), 0);
    }
}
