//! Identifiers of ontology terms and sets of them
//!
//! [`HpoTermId`] identifies a single node of the ontology, [`HpoGroup`]
//! is a sorted set of IDs and the building block of every [`crate::Layer`].

mod group;
mod hpotermid;
pub(crate) mod internal;

pub use group::{HpoGroup, Iter};
pub use hpotermid::HpoTermId;

/// The direct parents of a term
pub type HpoParents = HpoGroup;

/// The direct children of a term
pub type HpoChildren = HpoGroup;
