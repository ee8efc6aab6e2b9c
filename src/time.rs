use std::time::{Duration, Instant};

/// Fire-and-forget deadlines. Nothing waits on them; `expire` hands back whatever is due.
#[derive(Debug)]
pub struct TimerQueue<T> {
    pending: Vec<(Instant, T)>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self { pending: Vec::new() }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, after: Duration, payload: T) {
        self.pending.push((now + after, payload));
    }

    /// Drops every pending payload matching `predicate`; returns how many went.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|(_, payload)| !predicate(payload));
        before - self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Removes and returns every payload whose deadline is at or before `now`, oldest first.
    pub fn expire(&mut self, now: Instant) -> Vec<T> {
        let mut due: Vec<(Instant, T)> = Vec::new();
        let mut index = 0;
        while index < self.pending.len() {
            if self.pending[index].0 <= now {
                due.push(self.pending.remove(index));
            } else {
                index += 1;
            }
        }
        due.sort_by_key(|(deadline, _)| *deadline);
        due.into_iter().map(|(_, payload)| payload).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expire_returns_only_due_payloads() {
        let start = Instant::now();
        let mut timers = TimerQueue::new();
        timers.schedule(start, Duration::from_millis(1_000), "late");
        timers.schedule(start, Duration::from_millis(10), "early");
        assert!(timers.expire(start).is_empty());
        assert_eq!(timers.expire(start + Duration::from_millis(500)), vec!["early"]);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.expire(start + Duration::from_secs(2)), vec!["late"]);
        assert!(timers.is_empty());
    }

    #[test]
    fn cancel_where_drops_matching_payloads() {
        let start = Instant::now();
        let mut timers = TimerQueue::new();
        timers.schedule(start, Duration::from_millis(10), "a");
        timers.schedule(start, Duration::from_millis(20), "b");
        timers.schedule(start, Duration::from_millis(30), "a");
        assert_eq!(timers.cancel_where(|payload| *payload == "a"), 2);
        assert_eq!(timers.expire(start + Duration::from_secs(1)), vec!["b"]);
    }
}
