//! Ordered sequence backed by a generational slot arena.
//!
//! Values live in slots that never move; the visible order is a dense vector
//! of slot keys, and every occupied slot records its own position in that
//! vector. Position lookup, random access and neighbour traversal are O(1).
//! Appends are amortized O(1); splicing or removing in the middle shifts the
//! tail of the order vector.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
enum Slot<T> {
    Occupied {
        value: T,
        generation: u32,
        position: usize,
    },
    Vacant {
        generation: u32,
    },
}

impl<T> Slot<T> {
    fn generation(&self) -> u32 {
        match self {
            Self::Occupied { generation, .. } | Self::Vacant { generation } => *generation,
        }
    }
}

#[derive(Debug)]
pub struct Sequence<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    order: Vec<SlotKey>,
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Sequence<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn push_back(&mut self, value: T) -> SlotKey {
        let position = self.order.len();
        let key = self.alloc(value, position);
        self.order.push(key);
        key
    }

    /// Splices `value` in so that it ends up at `position`; positions past the
    /// end append.
    pub fn insert_at(&mut self, position: usize, value: T) -> SlotKey {
        let position = position.min(self.order.len());
        let key = self.alloc(value, position);
        self.order.insert(position, key);
        self.reindex_from(position + 1);
        key
    }

    /// Returns the position the value held and the value itself.
    pub fn remove(&mut self, key: SlotKey) -> Option<(usize, T)> {
        let position = self.position(key)?;
        self.order.remove(position);
        let value = self.release(key)?;
        self.reindex_from(position);
        Some((position, value))
    }

    /// Removes every key in `doomed` in a single compaction pass.
    ///
    /// `doomed` must be in ascending position order. Each returned position is
    /// the one the value held right before its own removal, so it already
    /// accounts for the removals that came earlier in the batch.
    pub fn remove_sorted(&mut self, doomed: &[SlotKey]) -> Vec<(usize, T)> {
        let mut removed = Vec::with_capacity(doomed.len());
        for key in doomed {
            let Some(position) = self.position(*key) else {
                continue;
            };
            debug_assert!(position >= removed.len(), "doomed keys out of order");
            let shifted = position.saturating_sub(removed.len());
            if let Some(value) = self.release(*key) {
                removed.push((shifted, value));
            }
        }

        if !removed.is_empty() {
            let slots = &self.slots;
            self.order.retain(|key| value_in(slots, *key).is_some());
            self.reindex_from(0);
        }
        removed
    }

    /// Empties the sequence, returning the values front to back. Keys handed
    /// out before the drain stay dead even after their slots are reused.
    pub fn drain(&mut self) -> Vec<T> {
        let order = std::mem::take(&mut self.order);
        order
            .into_iter()
            .filter_map(|key| self.release(key))
            .collect()
    }

    pub fn position(&self, key: SlotKey) -> Option<usize> {
        match self.slots.get(key.index as usize)? {
            Slot::Occupied {
                generation,
                position,
                ..
            } if *generation == key.generation => Some(*position),
            _ => None,
        }
    }

    pub fn get(&self, key: SlotKey) -> Option<&T> {
        value_in(&self.slots, key)
    }

    pub fn contains_key(&self, key: SlotKey) -> bool {
        self.get(key).is_some()
    }

    pub fn key_at(&self, position: usize) -> Option<SlotKey> {
        self.order.get(position).copied()
    }

    pub fn first(&self) -> Option<SlotKey> {
        self.order.first().copied()
    }

    pub fn last(&self) -> Option<SlotKey> {
        self.order.last().copied()
    }

    pub fn next_key(&self, key: SlotKey) -> Option<SlotKey> {
        let position = self.position(key)?;
        self.key_at(position + 1)
    }

    pub fn prev_key(&self, key: SlotKey) -> Option<SlotKey> {
        let position = self.position(key)?;
        position.checked_sub(1).and_then(|prev| self.key_at(prev))
    }

    pub fn keys(&self) -> impl Iterator<Item = SlotKey> + '_ {
        self.order.iter().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.order.iter().filter_map(|key| self.get(*key))
    }

    /// Position a stable sorted insert of `value` would take: after every
    /// element that does not compare greater than it.
    pub fn upper_bound<F>(&self, value: &T, mut compare: F) -> usize
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.order.partition_point(|key| match self.get(*key) {
            Some(existing) => compare(existing, value) != Ordering::Greater,
            None => false,
        })
    }

    /// Stable sort. Returns `permutation[new_position] = old_position`.
    pub fn sort_by<F>(&mut self, mut compare: F) -> Vec<usize>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let slots = &self.slots;
        merge_sort_by(&mut self.order, |left, right| {
            match (value_in(slots, *left), value_in(slots, *right)) {
                (Some(left), Some(right)) => compare(left, right),
                _ => Ordering::Equal,
            }
        });

        // Slots still hold their pre-sort positions until the reindex below.
        let permutation = self
            .order
            .iter()
            .filter_map(|key| self.position(*key))
            .collect();
        self.reindex_from(0);
        permutation
    }

    fn alloc(&mut self, value: T, position: usize) -> SlotKey {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            let generation = slot.generation();
            *slot = Slot::Occupied {
                value,
                generation,
                position,
            };
            return SlotKey { index, generation };
        }

        assert!(
            self.slots.len() < u32::MAX as usize,
            "sequence slot capacity exhausted"
        );
        let index = self.slots.len() as u32;
        self.slots.push(Slot::Occupied {
            value,
            generation: 0,
            position,
        });
        SlotKey {
            index,
            generation: 0,
        }
    }

    fn release(&mut self, key: SlotKey) -> Option<T> {
        let slot = self.slots.get_mut(key.index as usize)?;
        if slot.generation() != key.generation || matches!(slot, Slot::Vacant { .. }) {
            return None;
        }
        let vacant = Slot::Vacant {
            generation: key.generation.wrapping_add(1),
        };
        match std::mem::replace(slot, vacant) {
            Slot::Occupied { value, .. } => {
                self.free.push(key.index);
                Some(value)
            }
            Slot::Vacant { .. } => None,
        }
    }

    fn reindex_from(&mut self, start: usize) {
        for (position, key) in self.order.iter().enumerate().skip(start) {
            if let Some(Slot::Occupied {
                position: slot_position,
                ..
            }) = self.slots.get_mut(key.index as usize)
            {
                *slot_position = position;
            }
        }
    }
}

fn value_in<T>(slots: &[Slot<T>], key: SlotKey) -> Option<&T> {
    match slots.get(key.index as usize)? {
        Slot::Occupied {
            value, generation, ..
        } if *generation == key.generation => Some(value),
        _ => None,
    }
}

// Bottom-up merge sort. Unlike `slice::sort_by` it never panics when the
// comparator is not a total order; the result is just unspecified.
fn merge_sort_by<K, F>(items: &mut [K], mut compare: F)
where
    K: Copy,
    F: FnMut(&K, &K) -> Ordering,
{
    let len = items.len();
    if len <= 1 {
        return;
    }

    let mut buffer = items.to_vec();
    let mut width = 1;
    while width < len {
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            merge(
                &items[start..mid],
                &items[mid..end],
                &mut buffer[start..end],
                &mut compare,
            );
            start = end;
        }
        items.copy_from_slice(&buffer);
        width *= 2;
    }
}

fn merge<K, F>(left: &[K], right: &[K], out: &mut [K], compare: &mut F)
where
    K: Copy,
    F: FnMut(&K, &K) -> Ordering,
{
    let (mut i, mut j) = (0, 0);
    for slot in out.iter_mut() {
        let take_left = j >= right.len()
            || (i < left.len() && compare(&left[i], &right[j]) != Ordering::Greater);
        if take_left {
            *slot = left[i];
            i += 1;
        } else {
            *slot = right[j];
            j += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(sequence: &Sequence<&'static str>) -> Vec<&'static str> {
        sequence.iter().copied().collect()
    }

    fn assert_positions_consistent<T>(sequence: &Sequence<T>) {
        for (expected, key) in sequence.keys().enumerate() {
            assert_eq!(sequence.position(key), Some(expected));
        }
    }

    #[test]
    fn insert_at_shifts_following_positions() {
        let mut sequence = Sequence::new();
        let a = sequence.push_back("a");
        let c = sequence.push_back("c");
        let b = sequence.insert_at(1, "b");

        assert_eq!(values(&sequence), vec!["a", "b", "c"]);
        assert_eq!(sequence.position(a), Some(0));
        assert_eq!(sequence.position(b), Some(1));
        assert_eq!(sequence.position(c), Some(2));
    }

    #[test]
    fn insert_past_end_appends() {
        let mut sequence = Sequence::new();
        sequence.push_back("a");
        let b = sequence.insert_at(10, "b");
        assert_eq!(sequence.position(b), Some(1));
    }

    #[test]
    fn removed_key_stays_dead_after_slot_reuse() {
        let mut sequence = Sequence::new();
        let a = sequence.push_back("a");
        let b = sequence.push_back("b");

        assert_eq!(sequence.remove(a), Some((0, "a")));
        let c = sequence.push_back("c");

        assert_eq!(sequence.get(a), None);
        assert_eq!(sequence.position(a), None);
        assert_eq!(sequence.remove(a), None);
        assert_eq!(sequence.get(c), Some(&"c"));
        assert_eq!(sequence.position(b), Some(0));
        assert_positions_consistent(&sequence);
    }

    #[test]
    fn neighbours_follow_order() {
        let mut sequence = Sequence::new();
        let a = sequence.push_back("a");
        let b = sequence.push_back("b");

        assert_eq!(sequence.next_key(a), Some(b));
        assert_eq!(sequence.next_key(b), None);
        assert_eq!(sequence.prev_key(b), Some(a));
        assert_eq!(sequence.prev_key(a), None);
        assert_eq!(sequence.first(), Some(a));
        assert_eq!(sequence.last(), Some(b));
    }

    #[test]
    fn upper_bound_places_after_equal_keys() {
        let mut sequence = Sequence::new();
        for value in [1, 2, 2, 3] {
            sequence.push_back(value);
        }
        assert_eq!(sequence.upper_bound(&2, |a, b| a.cmp(b)), 3);
        assert_eq!(sequence.upper_bound(&0, |a, b| a.cmp(b)), 0);
        assert_eq!(sequence.upper_bound(&9, |a, b| a.cmp(b)), 4);
    }

    #[test]
    fn sort_reports_old_positions() {
        let mut sequence = Sequence::new();
        for value in ["c", "a", "b"] {
            sequence.push_back(value);
        }
        let permutation = sequence.sort_by(|a, b| a.cmp(b));

        assert_eq!(values(&sequence), vec!["a", "b", "c"]);
        assert_eq!(permutation, vec![1, 2, 0]);
        assert_positions_consistent(&sequence);
    }

    #[test]
    fn sort_is_stable() {
        let mut sequence = Sequence::new();
        for value in [(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd')] {
            sequence.push_back(value);
        }
        sequence.sort_by(|a, b| a.0.cmp(&b.0));
        let order: Vec<char> = sequence.iter().map(|value| value.1).collect();
        assert_eq!(order, vec!['b', 'd', 'a', 'c']);
    }

    #[test]
    fn inconsistent_comparator_does_not_panic() {
        let mut sequence = Sequence::new();
        for value in 0..64 {
            sequence.push_back(value);
        }
        let mut flip = false;
        sequence.sort_by(|_, _| {
            flip = !flip;
            if flip { Ordering::Less } else { Ordering::Greater }
        });
        assert_eq!(sequence.len(), 64);
        assert_positions_consistent(&sequence);
    }

    #[test]
    fn remove_sorted_reports_shifted_positions() {
        let mut sequence = Sequence::new();
        let keys: Vec<SlotKey> = ["a", "b", "c", "d", "e"]
            .into_iter()
            .map(|value| sequence.push_back(value))
            .collect();

        let removed = sequence.remove_sorted(&[keys[1], keys[3], keys[4]]);

        assert_eq!(removed, vec![(1, "b"), (2, "d"), (2, "e")]);
        assert_eq!(values(&sequence), vec!["a", "c"]);
        assert_positions_consistent(&sequence);
    }

    #[test]
    fn drain_empties_and_kills_keys() {
        let mut sequence = Sequence::new();
        let a = sequence.push_back("a");
        sequence.push_back("b");

        assert_eq!(sequence.drain(), vec!["a", "b"]);
        assert!(sequence.is_empty());
        let reused = sequence.push_back("c");
        assert_eq!(sequence.get(a), None);
        assert_eq!(sequence.get(reused), Some(&"c"));
    }
}
