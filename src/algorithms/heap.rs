//! Binary min-heap over dense integer keys with a position index, so any
//! entry can be repaired in place after its priority changes.
//!
//! Entries compare by `(priority, key)`: among equal priorities the lowest
//! key is extracted first.

#[derive(Debug, Clone)]
pub struct IndexedMinHeap<P> {
    entries: Vec<(usize, P)>,
    /// `positions[key]` is the slot of `key` in `entries`, if present.
    positions: Vec<Option<usize>>,
}

impl<P: Ord + Copy> IndexedMinHeap<P> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            positions: vec![None; capacity],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: usize) -> bool {
        self.positions.get(key).is_some_and(|slot| slot.is_some())
    }

    pub fn priority(&self, key: usize) -> Option<P> {
        let slot = (*self.positions.get(key)?)?;
        Some(self.entries[slot].1)
    }

    /// Inserts `key`; a key already present is repaired to the new priority.
    pub fn insert(&mut self, key: usize, priority: P) {
        if self.contains(key) {
            self.decrease_or_increase(key, priority);
            return;
        }
        if key >= self.positions.len() {
            self.positions.resize(key + 1, None);
        }

        let slot = self.entries.len();
        self.entries.push((key, priority));
        self.positions[key] = Some(slot);
        self.sift_up(slot);
    }

    pub fn extract_min(&mut self) -> Option<(usize, P)> {
        if self.entries.is_empty() {
            return None;
        }

        let last = self.entries.len() - 1;
        self.swap(0, last);
        let (key, priority) = self.entries.pop()?;
        self.positions[key] = None;

        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some((key, priority))
    }

    /// Sets a new priority for `key`, sifting up when it dropped and down
    /// when it rose. Returns false if `key` is not in the heap.
    pub fn decrease_or_increase(&mut self, key: usize, priority: P) -> bool {
        let Some(slot) = self.positions.get(key).copied().flatten() else {
            return false;
        };

        let old = self.entries[slot].1;
        self.entries[slot].1 = priority;
        if priority < old {
            self.sift_up(slot);
        } else {
            self.sift_down(slot);
        }
        true
    }

    fn less(&self, a: usize, b: usize) -> bool {
        let (ka, pa) = self.entries[a];
        let (kb, pb) = self.entries[b];
        (pa, ka) < (pb, kb)
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        self.positions[self.entries[a].0] = Some(a);
        self.positions[self.entries[b].0] = Some(b);
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.less(slot, parent) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;

            if left < len && self.less(left, smallest) {
                smallest = left;
            }
            if right < len && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap(slot, smallest);
            slot = smallest;
        }
    }

    #[cfg(test)]
    fn assert_invariants(&self) {
        for (slot, (key, priority)) in self.entries.iter().enumerate() {
            assert_eq!(self.positions[*key], Some(slot));
            for child in [2 * slot + 1, 2 * slot + 2] {
                if let Some((_, child_priority)) = self.entries.get(child) {
                    assert!(priority <= child_priority, "slot {} violates heap order", slot);
                }
            }
        }
        let indexed = self.positions.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(indexed, self.entries.len());
    }
}
