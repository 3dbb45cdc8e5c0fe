use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    Before,
    After,
}

/// Structural change notification. Indices are positions in the list at the
/// moment the event is emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent<T> {
    Inserted { index: usize, item: T },
    Deleted { index: usize },
    Changed { index: usize, item: T },
    /// The cursor moved onto `item`, or was unset.
    CurrentChanged { item: Option<T> },
    /// `permutation[new_index] == old_index`.
    Reordered { permutation: Vec<usize> },
}

impl<T> ListEvent<T> {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Inserted { .. } => "inserted",
            Self::Deleted { .. } => "deleted",
            Self::Changed { .. } => "changed",
            Self::CurrentChanged { .. } => "current-changed",
            Self::Reordered { .. } => "reordered",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub(crate) u64);

pub type Observer<T> = Box<dyn FnMut(&ListEvent<T>)>;

/// Shared comparator handle. Two handles are the same comparator only when
/// they point at the same allocation; behaviour is never compared.
pub struct SortFn<T> {
    compare: Rc<dyn Fn(&T, &T) -> Ordering>,
}

impl<T> SortFn<T> {
    pub fn new<F>(compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + 'static,
    {
        Self {
            compare: Rc::new(compare),
        }
    }

    pub fn compare(&self, left: &T, right: &T) -> Ordering {
        (self.compare)(left, right)
    }

    pub fn same_as(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.compare), Rc::as_ptr(&other.compare))
    }
}

impl<T> Clone for SortFn<T> {
    fn clone(&self) -> Self {
        Self {
            compare: Rc::clone(&self.compare),
        }
    }
}

impl<T> fmt::Debug for SortFn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortFn")
            .field("addr", &Rc::as_ptr(&self.compare).cast::<()>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_identity() {
        let by_value = SortFn::new(|a: &u32, b: &u32| a.cmp(b));
        let same = by_value.clone();
        let other = SortFn::new(|a: &u32, b: &u32| a.cmp(b));

        assert!(by_value.same_as(&same));
        assert!(!by_value.same_as(&other));
    }

    #[test]
    fn compare_delegates() {
        let reverse = SortFn::new(|a: &u32, b: &u32| b.cmp(a));
        assert_eq!(reverse.compare(&1, &2), Ordering::Greater);
    }
}
