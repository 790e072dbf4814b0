use smallvec::SmallVec;
use std::ops::{BitAnd, BitOr};

use crate::HpoTermId;

type Group = SmallVec<[HpoTermId; crate::DEFAULT_NUM_ALL_PARENTS]>;

/// A set of unique [`HpoTermId`]s
///
/// Each term can occur only once in the group and the IDs are kept
/// sorted, so membership checks are a binary search.
///
/// This group is used e.g. for the parents or children of a term, for the
/// observed features of a disease and as the storage of a [`crate::Layer`].
///
/// # Examples
///
/// ```
/// use boqa::{HpoGroup, HpoTermId};
///
/// let mut group = HpoGroup::new();
/// assert!(group.insert(3u32));
/// assert!(group.insert(1u32));
/// assert!(!group.insert(3u32));
///
/// assert_eq!(group.len(), 2);
/// assert!(group.contains(&1u32.into()));
/// assert_eq!(group.iter().next(), Some(HpoTermId::from(1u32)));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct HpoGroup {
    ids: Group,
}

impl HpoGroup {
    /// Constructs a new, empty [`HpoGroup`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a new, empty [`HpoGroup`] with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Group::with_capacity(capacity),
        }
    }

    /// Returns `true` if the group contains no [`HpoTermId`]s
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of [`HpoTermId`]s in the group
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Adds a new [`HpoTermId`] to the group
    ///
    /// Returns whether the `HpoTermId` was newly inserted. That is:
    ///
    /// - If the group did not previously contain this `HpoTermId`, true is returned.
    /// - If the group already contained this `HpoTermId`, false is returned.
    pub fn insert<I: Into<HpoTermId>>(&mut self, id: I) -> bool {
        let id = id.into();
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(idx) => {
                self.ids.insert(idx, id);
                true
            }
        }
    }

    /// Removes the [`HpoTermId`] from the group
    ///
    /// Returns whether the `HpoTermId` was present
    pub fn remove(&mut self, id: &HpoTermId) -> bool {
        match self.ids.binary_search(id) {
            Ok(idx) => {
                self.ids.remove(idx);
                true
            }
            Err(_) => false,
        }
    }

    /// Returns `true` if the group contains the [`HpoTermId`]
    pub fn contains(&self, id: &HpoTermId) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    /// Returns an Iterator of the [`HpoTermId`]s inside the group
    ///
    /// The iteration order is ascending by ID
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.ids.iter(),
        }
    }

    /// Keeps only the [`HpoTermId`]s for which `f` returns `true`
    pub fn retain<F: FnMut(&HpoTermId) -> bool>(&mut self, mut f: F) {
        self.ids.retain(|id| f(id));
    }
}

impl From<Vec<HpoTermId>> for HpoGroup {
    fn from(mut v: Vec<HpoTermId>) -> Self {
        v.sort_unstable();
        v.dedup();
        Self {
            ids: Group::from_vec(v),
        }
    }
}

impl FromIterator<HpoTermId> for HpoGroup {
    fn from_iter<T: IntoIterator<Item = HpoTermId>>(iter: T) -> Self {
        let v: Vec<HpoTermId> = iter.into_iter().collect();
        Self::from(v)
    }
}

impl Extend<HpoTermId> for HpoGroup {
    fn extend<T: IntoIterator<Item = HpoTermId>>(&mut self, iter: T) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl<'a> IntoIterator for &'a HpoGroup {
    type Item = HpoTermId;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// An iterator over [`HpoTermId`]s of an [`HpoGroup`]
pub struct Iter<'a> {
    inner: std::slice::Iter<'a, HpoTermId>,
}

impl Iterator for Iter<'_> {
    type Item = HpoTermId;
    fn next(&mut self) -> Option<HpoTermId> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Union of two groups
///
/// Both groups are sorted, so the union is a single linear merge
impl BitOr for &HpoGroup {
    type Output = HpoGroup;

    fn bitor(self, rhs: &HpoGroup) -> HpoGroup {
        let mut ids = Group::with_capacity(self.len() + rhs.len());
        let mut left = self.ids.iter().peekable();
        let mut right = rhs.ids.iter().peekable();
        loop {
            match (left.peek(), right.peek()) {
                (Some(l), Some(r)) if l < r => ids.push(*left.next().expect("peeked")),
                (Some(l), Some(r)) if l > r => ids.push(*right.next().expect("peeked")),
                (Some(_), Some(_)) => {
                    ids.push(*left.next().expect("peeked"));
                    right.next();
                }
                (Some(_), None) => ids.push(*left.next().expect("peeked")),
                (None, Some(_)) => ids.push(*right.next().expect("peeked")),
                (None, None) => break,
            }
        }
        HpoGroup { ids }
    }
}

/// Intersection of two groups
impl BitAnd for &HpoGroup {
    type Output = HpoGroup;

    fn bitand(self, rhs: &HpoGroup) -> HpoGroup {
        let (large, small) = if self.len() > rhs.len() {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let ids = small
            .ids
            .iter()
            .filter(|id| large.contains(id))
            .copied()
            .collect();
        HpoGroup { ids }
    }
}
