use std::time::Duration;

use tokio::time::Instant;

/// Identifies one pending emission. Timer expiries carry it back so an expiry
/// for a value that was since replaced can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub due: Instant,
}

#[derive(Debug)]
struct Pending<T> {
    value: T,
    generation: u64,
    due: Instant,
}

/// Trailing-edge debounce: the settled value follows the input only after the
/// input stayed unchanged for `delay`.
///
/// The debouncer owns no timer. Whoever drives it schedules a wake-up at
/// [`Ticket::due`] and calls [`Debouncer::settle`] with the ticket's
/// generation, or polls it with the current time.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    settled: T,
    pending: Option<Pending<T>>,
    generation: u64,
}

impl<T: Clone> Debouncer<T> {
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            delay,
            settled: initial,
            pending: None,
            generation: 0,
        }
    }

    /// Replaces any pending value and restarts the wait from `now`.
    pub fn push(&mut self, value: T, now: Instant) -> Ticket {
        self.generation += 1;
        let due = now + self.delay;
        self.pending = Some(Pending {
            value,
            generation: self.generation,
            due,
        });

        Ticket {
            generation: self.generation,
            due,
        }
    }

    /// Timer expiry for `generation`. Returns whether a value was emitted;
    /// expiries of superseded generations emit nothing.
    pub fn settle(&mut self, generation: u64) -> bool {
        match self.pending.take() {
            Some(pending) if pending.generation == generation => {
                self.settled = pending.value;
                true
            }
            other => {
                self.pending = other;
                false
            }
        }
    }

    /// Emits the pending value if its wait is over at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        let due = self
            .pending
            .as_ref()
            .filter(|pending| pending.due <= now)
            .map(|pending| pending.generation);

        match due {
            Some(generation) => self.settle(generation),
            None => false,
        }
    }

    /// Applies `value` at once, dropping whatever was pending.
    pub fn reset(&mut self, value: T) {
        self.generation += 1;
        self.pending = None;
        self.settled = value;
    }

    pub fn value(&self) -> &T {
        &self.settled
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D: Duration = Duration::from_millis(30);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn value_waits_for_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(None, D);

        debouncer.push(Some(1), start);
        assert!(!debouncer.poll(start + ms(29)));
        assert_eq!(*debouncer.value(), None);

        assert!(debouncer.poll(start + ms(30)));
        assert_eq!(*debouncer.value(), Some(1));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn burst_of_updates_emits_only_the_last() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(0, D);

        // every update lands inside the previous one's window
        for (i, at) in [0, 10, 20, 35, 50].iter().enumerate() {
            debouncer.push(i + 1, start + ms(*at));
            assert!(!debouncer.poll(start + ms(*at) + ms(29)));
        }
        assert_eq!(*debouncer.value(), 0);

        assert!(debouncer.poll(start + ms(80)));
        assert_eq!(*debouncer.value(), 5);
    }

    #[test]
    fn superseded_tickets_are_ignored() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new("a", D);

        let first = debouncer.push("b", start);
        let second = debouncer.push("c", start + ms(10));
        assert_eq!(second.due, start + ms(40));

        assert!(!debouncer.settle(first.generation));
        assert_eq!(*debouncer.value(), "a");
        assert!(debouncer.is_pending());

        assert!(debouncer.settle(second.generation));
        assert_eq!(*debouncer.value(), "c");

        // a second expiry of the same ticket is a no-op
        assert!(!debouncer.settle(second.generation));
    }

    #[test]
    fn reset_applies_at_once_and_cancels_pending() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Some(1), D);

        let ticket = debouncer.push(Some(2), start);
        debouncer.reset(None);
        assert_eq!(*debouncer.value(), None);

        assert!(!debouncer.settle(ticket.generation));
        assert!(!debouncer.poll(start + ms(100)));
        assert_eq!(*debouncer.value(), None);
    }
}
