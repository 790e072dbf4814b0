use dashmap::DashSet;
use tracing::warn;

use crate::HpoTermId;

/// Reports replaced and unresolved terms at most once per term
///
/// A reporter is scoped to one run and shared by all
/// [`LayerExpander`](crate::LayerExpander) calls of that run, across threads.
///
/// # Examples
///
/// ```
/// use boqa::TermReporter;
///
/// let reporter = TermReporter::new();
/// assert!(reporter.replaced(3u32.into(), 4u32.into()));
/// assert!(!reporter.replaced(3u32.into(), 4u32.into()));
/// assert!(reporter.unresolved(9u32.into()));
/// assert_eq!(reporter.replaced_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct TermReporter {
    replaced: DashSet<HpoTermId>,
    unresolved: DashSet<HpoTermId>,
}

impl TermReporter {
    /// Constructs a new reporter that has not seen any term yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports that `term` was replaced by `primary`
    ///
    /// Returns `true` if this is the first report for `term`
    pub fn replaced(&self, term: HpoTermId, primary: HpoTermId) -> bool {
        let first = self.replaced.insert(term);
        if first {
            warn!("Replaced obsolete term {} with {}", term, primary);
        }
        first
    }

    /// Reports that `term` cannot be mapped to a current term
    ///
    /// Returns `true` if this is the first report for `term`
    pub fn unresolved(&self, term: HpoTermId) -> bool {
        let first = self.unresolved.insert(term);
        if first {
            warn!("Dropping unknown or obsolete term {}", term);
        }
        first
    }

    /// Returns the number of distinct replaced terms
    pub fn replaced_count(&self) -> usize {
        self.replaced.len()
    }

    /// Returns the number of distinct unresolved terms
    pub fn unresolved_count(&self) -> usize {
        self.unresolved.len()
    }
}
