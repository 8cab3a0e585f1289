use std::time::Duration;

/// One-shot timer queue.
///
/// Nothing is ever cancelled; tasks carry whatever identity the owner needs
/// to recognise them as stale when they fire.
#[derive(Debug, Clone)]
pub struct Schedule<K> {
    pending: Vec<Entry<K>>,
    next_seq: u64,
}

#[derive(Debug, Clone)]
struct Entry<K> {
    due_ns: u64,
    seq: u64,
    task: K,
}

impl<K> Schedule<K> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn at(&mut self, due_ns: u64, task: K) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Entry { due_ns, seq, task });
    }

    pub fn after(&mut self, now_ns: u64, delay: Duration, task: K) {
        self.at(now_ns.saturating_add(delay.as_nanos() as u64), task);
    }

    /// Removes and returns the earliest task due at `now_ns`. Tasks due at
    /// the same instant come out in the order they were scheduled.
    pub fn pop_due(&mut self, now_ns: u64) -> Option<(u64, K)> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ns <= now_ns)
            .min_by_key(|(_, e)| (e.due_ns, e.seq))
            .map(|(i, _)| i)?;
        let entry = self.pending.swap_remove(idx);
        Some((entry.due_ns, entry.task))
    }
}

impl<K> Default for Schedule<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_due_order() {
        let mut s = Schedule::new();
        s.at(30, "c");
        s.at(10, "a");
        s.at(20, "b");
        assert_eq!(s.pop_due(5), None);
        assert_eq!(s.pop_due(25), Some((10, "a")));
        assert_eq!(s.pop_due(25), Some((20, "b")));
        assert_eq!(s.pop_due(25), None);
        assert_eq!(s.pop_due(30), Some((30, "c")));
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut s = Schedule::new();
        s.at(5, 1);
        s.at(5, 2);
        s.at(5, 3);
        let order: Vec<_> = std::iter::from_fn(|| s.pop_due(5).map(|(_, t)| t)).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert_eq!(s.pop_due(u64::MAX), None);
    }

    #[test]
    fn after_is_relative() {
        let mut s = Schedule::new();
        s.after(1_000, Duration::from_nanos(500), ());
        assert_eq!(s.pop_due(1_499), None);
        assert_eq!(s.pop_due(1_500), Some((1_500, ())));
    }
}
