use crate::model::{DropPosition, ListEvent, Observer, ObserverId, SortFn};
use crate::sequence::{Sequence, SlotKey};
use crate::snapshot::ListSnapshot;
use rand::RngExt;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use tracing::{debug, trace};

/// Handle to one element of a [`PointerList`], stamped with the list's
/// generation when it was issued. Any removal invalidates every outstanding
/// position; insertions and sorts do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    key: SlotKey,
    stamp: u32,
}

impl Position {
    pub fn stamp(&self) -> u32 {
        self.stamp
    }
}

/// Ordered collection of element identities with a reverse index, an optional
/// maintained sort order and a "current" cursor.
///
/// Every structural change is reported to the registered observers, inline
/// and in order, so a view can update incrementally.
pub struct PointerList<T> {
    sequence: Sequence<T>,
    reverse: HashMap<T, SlotKey>,
    stamp: u32,
    sort_fn: Option<SortFn<T>>,
    current: Option<SlotKey>,
    observers: Vec<(ObserverId, Observer<T>)>,
    next_observer: u64,
}

impl<T> Default for PointerList<T>
where
    T: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PointerList<T>
where
    T: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::with_stamp(rand::rng().random_range(0..u32::MAX))
    }

    fn with_stamp(stamp: u32) -> Self {
        Self {
            sequence: Sequence::new(),
            reverse: HashMap::new(),
            stamp,
            sort_fn: None,
            current: None,
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&ListEvent<T>) + 'static,
    {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn stamp(&self) -> u32 {
        self.stamp
    }

    /// Adds `item` at the tail, or at its stable sorted slot when a comparator
    /// is active. Returns false if it is already present.
    pub fn add(&mut self, item: T) -> bool {
        if self.reverse.contains_key(&item) {
            return false;
        }

        let key = match &self.sort_fn {
            Some(sort_fn) => {
                let position = self
                    .sequence
                    .upper_bound(&item, |left, right| sort_fn.compare(left, right));
                self.sequence.insert_at(position, item.clone())
            }
            None => self.sequence.push_back(item.clone()),
        };
        self.reverse.insert(item.clone(), key);
        self.emit_inserted(key, item);
        true
    }

    /// Splices `item` next to `anchor`, ignoring any active comparator.
    ///
    /// # Panics
    ///
    /// Panics if `anchor` is not in the list.
    pub fn insert_relative(&mut self, item: T, anchor: &T, drop: DropPosition) -> bool {
        if self.reverse.contains_key(&item) {
            return false;
        }
        let Some(&anchor_key) = self.reverse.get(anchor) else {
            panic!("insert_relative: anchor is not in the list");
        };

        let anchor_index = self.live_index(anchor_key);
        let target = match drop {
            DropPosition::Before => anchor_index,
            DropPosition::After => anchor_index + 1,
        };
        let key = self.sequence.insert_at(target, item.clone());
        self.reverse.insert(item.clone(), key);
        self.emit_inserted(key, item);
        true
    }

    pub fn remove(&mut self, item: &T) -> bool {
        match self.reverse.get(item) {
            Some(&key) => self.remove_key(key),
            None => false,
        }
    }

    /// # Panics
    ///
    /// Panics if `position` was issued before the last removal.
    pub fn remove_at(&mut self, position: Position) {
        self.check(position);
        self.remove_key(position.key);
    }

    pub fn clear(&mut self) {
        if self.sequence.is_empty() {
            return;
        }
        let had_current = match self.current.take() {
            Some(key) => {
                self.emit_changed(key);
                true
            }
            None => false,
        };

        let drained = self.sequence.drain();
        debug!(count = drained.len(), "clearing list");
        self.reverse.clear();
        for _ in drained {
            self.stamp = self.stamp.wrapping_add(1);
            self.emit(ListEvent::Deleted { index: 0 });
        }
        if had_current {
            self.emit(ListEvent::CurrentChanged { item: None });
        }
    }

    /// Keeps exactly the elements found in `keep` and removes the rest in one
    /// pass. Deletions are reported front to back; an empty `keep` clears.
    pub fn remove_delta<'a, I>(&mut self, keep: I)
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        if self.sequence.is_empty() {
            return;
        }
        let keep: HashSet<&T> = keep.into_iter().collect();
        if keep.is_empty() {
            self.clear();
            return;
        }

        let doomed: Vec<SlotKey> = self
            .sequence
            .keys()
            .filter(|key| {
                self.sequence
                    .get(*key)
                    .is_some_and(|item| !keep.contains(&item))
            })
            .collect();
        if doomed.is_empty() {
            return;
        }
        debug!(
            removing = doomed.len(),
            keeping = self.sequence.len() - doomed.len(),
            "removing delta"
        );

        let cursor_position = self.current.and_then(|key| self.sequence.position(key));
        let removed = self.sequence.remove_sorted(&doomed);
        for (offset, (index, item)) in removed.into_iter().enumerate() {
            let was_current = cursor_position == Some(index + offset);
            if was_current {
                self.current = None;
                self.emit(ListEvent::Changed {
                    index,
                    item: item.clone(),
                });
            }
            self.reverse.remove(&item);
            self.stamp = self.stamp.wrapping_add(1);
            self.emit(ListEvent::Deleted { index });
            if was_current {
                self.emit(ListEvent::CurrentChanged { item: None });
            }
        }
    }

    /// Reorders the list with `compare` and emits a single `Reordered` event
    /// if anything moved.
    pub fn sort<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        if self.sequence.len() < 2 {
            return;
        }

        let permutation = self.sequence.sort_by(compare);
        if permutation
            .iter()
            .enumerate()
            .all(|(new_index, old_index)| new_index == *old_index)
        {
            return;
        }
        debug!(len = permutation.len(), "list reordered");
        self.emit(ListEvent::Reordered { permutation });
    }

    pub fn set_sorting(&mut self, sort_fn: Option<SortFn<T>>) {
        let unchanged = match (&self.sort_fn, &sort_fn) {
            (None, None) => true,
            (Some(active), Some(next)) => active.same_as(next),
            _ => false,
        };
        if unchanged {
            return;
        }

        debug!(sorted = sort_fn.is_some(), "sorting changed");
        self.sort_fn = sort_fn.clone();
        if let Some(sort_fn) = sort_fn {
            self.sort(|left, right| sort_fn.compare(left, right));
        }
    }

    pub fn sorting(&self) -> Option<&SortFn<T>> {
        self.sort_fn.as_ref()
    }

    /// Whether a drop at `index` may be turned into an `insert_relative`.
    pub fn drop_possible(&self, index: usize) -> bool {
        self.sort_fn.is_none() && index <= self.sequence.len()
    }

    pub fn first(&mut self) -> Option<&T> {
        let target = self.sequence.first()?;
        self.move_cursor(target)
    }

    pub fn last(&mut self) -> Option<&T> {
        let target = self.sequence.last()?;
        self.move_cursor(target)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&T> {
        let target = self.current.and_then(|key| self.sequence.next_key(key))?;
        self.move_cursor(target)
    }

    pub fn prev(&mut self) -> Option<&T> {
        let target = self.current.and_then(|key| self.sequence.prev_key(key))?;
        self.move_cursor(target)
    }

    pub fn has_next(&self) -> bool {
        self.current
            .is_some_and(|key| self.sequence.next_key(key).is_some())
    }

    pub fn has_prev(&self) -> bool {
        self.current
            .is_some_and(|key| self.sequence.prev_key(key).is_some())
    }

    pub fn has_first(&self) -> bool {
        !self.sequence.is_empty()
    }

    pub fn get_current(&self) -> Option<&T> {
        self.sequence.get(self.current?)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.sequence.position(self.current?)
    }

    /// Moves the cursor onto `item`, or unsets it for `None`. Returns false
    /// without touching anything when `item` is not in the list.
    pub fn set_current(&mut self, item: Option<&T>) -> bool {
        match item {
            Some(item) => {
                let Some(&key) = self.reverse.get(item) else {
                    return false;
                };
                self.move_cursor(key);
                true
            }
            None => {
                if let Some(old) = self.current.take() {
                    self.emit_changed(old);
                }
                self.emit(ListEvent::CurrentChanged { item: None });
                true
            }
        }
    }

    /// Reports that the data behind `item` changed so a view can redraw it.
    pub fn changed(&mut self, item: &T) -> bool {
        match self.reverse.get(item) {
            Some(&key) => {
                self.emit_changed(key);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, item: &T) -> bool {
        self.reverse.contains_key(item)
    }

    pub fn position_of(&self, item: &T) -> Option<Position> {
        self.reverse.get(item).map(|key| self.mint(*key))
    }

    pub fn position_at(&self, index: usize) -> Option<Position> {
        self.sequence.key_at(index).map(|key| self.mint(key))
    }

    pub fn first_position(&self) -> Option<Position> {
        self.position_at(0)
    }

    /// # Panics
    ///
    /// Panics on a stale position.
    pub fn next_position(&self, position: Position) -> Option<Position> {
        self.check(position);
        self.sequence
            .next_key(position.key)
            .map(|key| self.mint(key))
    }

    /// # Panics
    ///
    /// Panics on a stale position.
    pub fn index_at(&self, position: Position) -> usize {
        self.check(position);
        self.live_index(position.key)
    }

    /// # Panics
    ///
    /// Panics on a stale position.
    pub fn get(&self, position: Position) -> &T {
        self.check(position);
        match self.sequence.get(position.key) {
            Some(item) => item,
            None => panic!("position does not refer to a live element"),
        }
    }

    pub fn index_of(&self, item: &T) -> Option<usize> {
        let key = self.reverse.get(item)?;
        self.sequence.position(*key)
    }

    pub fn get_index(&self, index: usize) -> Option<&T> {
        self.sequence.get(self.sequence.key_at(index)?)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.sequence.iter()
    }

    pub fn items(&self) -> Vec<T> {
        self.sequence.iter().cloned().collect()
    }

    /// Contents and cursor in a form a persistence layer can store. With
    /// `exclude_played` only the cursor element and what follows it are kept;
    /// without a cursor that leaves nothing.
    pub fn snapshot(&self, exclude_played: bool) -> ListSnapshot<T> {
        let current = self.current_index();
        if !exclude_played {
            return ListSnapshot {
                items: self.items(),
                current,
            };
        }

        match current {
            Some(start) => ListSnapshot {
                items: self.sequence.iter().skip(start).cloned().collect(),
                current: Some(0),
            },
            None => ListSnapshot::default(),
        }
    }

    /// Replaces the contents with `snapshot` and moves the cursor onto its
    /// current item. Returns how many items were added.
    pub fn restore(&mut self, snapshot: ListSnapshot<T>) -> usize {
        self.clear();
        let playing = snapshot
            .current
            .and_then(|index| snapshot.items.get(index).cloned());

        let mut added = 0;
        for item in snapshot.items {
            if self.add(item) {
                added += 1;
            }
        }
        if let Some(item) = playing {
            self.set_current(Some(&item));
        }
        debug!(added, "restored list snapshot");
        added
    }

    fn remove_key(&mut self, key: SlotKey) -> bool {
        let was_current = self.current == Some(key);
        if was_current {
            self.emit_changed(key);
            self.current = None;
        }

        let Some((index, item)) = self.sequence.remove(key) else {
            return false;
        };
        self.reverse.remove(&item);
        self.stamp = self.stamp.wrapping_add(1);
        trace!(index, "removed element");
        self.emit(ListEvent::Deleted { index });
        if was_current {
            self.emit(ListEvent::CurrentChanged { item: None });
        }
        true
    }

    fn move_cursor(&mut self, target: SlotKey) -> Option<&T> {
        if let Some(old) = self.current {
            self.emit_changed(old);
        }
        self.current = Some(target);
        self.emit_changed(target);
        trace!(index = self.sequence.position(target), "cursor moved");
        let item = self.sequence.get(target).cloned();
        self.emit(ListEvent::CurrentChanged { item });
        self.sequence.get(target)
    }

    fn emit_inserted(&mut self, key: SlotKey, item: T) {
        let index = self.live_index(key);
        trace!(index, "inserted element");
        self.emit(ListEvent::Inserted { index, item });
    }

    fn emit_changed(&mut self, key: SlotKey) {
        let (Some(index), Some(item)) = (self.sequence.position(key), self.sequence.get(key))
        else {
            return;
        };
        let item = item.clone();
        self.emit(ListEvent::Changed { index, item });
    }

    fn emit(&mut self, event: ListEvent<T>) {
        trace!(event = event.label(), observers = self.observers.len(), "emit");
        for (_, observer) in &mut self.observers {
            observer(&event);
        }
    }

    fn mint(&self, key: SlotKey) -> Position {
        Position {
            key,
            stamp: self.stamp,
        }
    }

    fn check(&self, position: Position) {
        assert_eq!(
            position.stamp, self.stamp,
            "stale position: the list lost an element since it was issued"
        );
    }

    fn live_index(&self, key: SlotKey) -> usize {
        match self.sequence.position(key) {
            Some(index) => index,
            None => panic!("position does not refer to a live element"),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PointerList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerList")
            .field("sequence", &self.sequence)
            .field("stamp", &self.stamp)
            .field("sort_fn", &self.sort_fn)
            .field("current", &self.current)
            .field("observers", &self.observers.len())
            .finish()
    }
}
