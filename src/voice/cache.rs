use std::sync::Arc;
use std::time::Duration;

/// Default freshness window for a voice list.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Time-aged cache holding one remote list.
///
/// Entries are replaced wholesale on refresh and never mutated in place.
/// Timestamps are session-clock readings (see [`super::clock::SessionClock`]).
#[derive(Debug)]
pub struct CacheSlot<T> {
    entries: Option<Arc<Vec<T>>>,
    last_refreshed_at: Option<Duration>,
    ttl: Duration,
}

impl<T> CacheSlot<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: None,
            last_refreshed_at: None,
            ttl,
        }
    }

    /// Age of the slot at `now`; `None` means never refreshed (infinitely old).
    pub fn age(&self, now: Duration) -> Option<Duration> {
        self.last_refreshed_at
            .map(|at| now.checked_sub(at).unwrap_or_default())
    }

    /// Cached entries if present and no older than the TTL.
    pub fn fresh(&self, now: Duration) -> Option<Arc<Vec<T>>> {
        let entries = self.entries.as_ref()?;
        match self.age(now) {
            Some(age) if age <= self.ttl => Some(Arc::clone(entries)),
            _ => None,
        }
    }

    /// Whatever the slot holds, regardless of age.
    pub fn current(&self) -> Option<Arc<Vec<T>>> {
        self.entries.clone()
    }

    pub fn replace(&mut self, entries: Vec<T>, now: Duration) -> Arc<Vec<T>> {
        let entries = Arc::new(entries);
        self.entries = Some(Arc::clone(&entries));
        self.last_refreshed_at = Some(now);
        entries
    }

    /// Drop the entries after a failed refresh. The timestamp is kept so the
    /// slot still reports when it last held trusted data.
    pub fn invalidate(&mut self) {
        self.entries = None;
    }

    /// Forget everything, including the refresh time.
    pub fn clear(&mut self) {
        self.entries = None;
        self.last_refreshed_at = None;
    }

    pub fn is_present(&self) -> bool {
        self.entries.is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |e| e.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn last_refreshed_at(&self) -> Option<Duration> {
        self.last_refreshed_at
    }
}

impl<T> Default for CacheSlot<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn empty_slot_is_never_fresh() {
        let slot: CacheSlot<u32> = CacheSlot::default();
        assert!(slot.fresh(secs(0)).is_none());
        assert!(slot.age(secs(10)).is_none());
        assert!(!slot.is_present());
    }

    #[test]
    fn fresh_until_ttl_inclusive() {
        let mut slot = CacheSlot::new(secs(300));
        slot.replace(vec![1, 2], secs(10));
        assert!(slot.fresh(secs(10)).is_some());
        assert!(slot.fresh(secs(310)).is_some(), "age == ttl is still fresh");
        assert!(slot.fresh(secs(311)).is_none());
    }

    #[test]
    fn fresh_returns_the_same_allocation() {
        let mut slot = CacheSlot::new(secs(300));
        let stored = slot.replace(vec!["a".to_string()], secs(0));
        let read = slot.fresh(secs(5)).unwrap();
        assert!(Arc::ptr_eq(&stored, &read));
    }

    #[test]
    fn invalidate_drops_entries_but_keeps_time() {
        let mut slot = CacheSlot::new(secs(300));
        slot.replace(vec![1], secs(0));
        slot.invalidate();
        assert!(slot.fresh(secs(1)).is_none());
        assert_eq!(slot.last_refreshed_at(), Some(secs(0)));
        assert_eq!(slot.len(), 0);
    }

    #[test]
    fn clear_forgets_refresh_time() {
        let mut slot = CacheSlot::new(secs(300));
        slot.replace(vec![1], secs(7));
        slot.clear();
        assert!(slot.last_refreshed_at().is_none());
        assert!(slot.is_empty());
    }
}
