use core::fmt::Debug;
use std::fmt::Display;

use crate::{BoqaError, BoqaResult, MAX_HPO_ID_INTEGER};

/// The ID of an HPO term
///
/// Terms are identified by their CURIE, e.g. `HP:0001166`. Internally,
/// only the numerical part is stored, so equality and hashing are by value.
///
/// # Examples
///
/// ```
/// use boqa::HpoTermId;
///
/// let id = HpoTermId::try_from("HP:0001166").unwrap();
/// assert_eq!(id.as_u32(), 1166u32);
/// assert_eq!(id.to_string(), "HP:0001166");
/// assert_eq!(id, HpoTermId::from(1166u32));
/// ```
#[derive(Copy, Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct HpoTermId {
    inner: u32,
}

impl HpoTermId {
    /// Constructs a new [`HpoTermId`] from a `u32`
    ///
    /// This is mainly used to define constant terms
    pub const fn from_u32(inner: u32) -> Self {
        Self { inner }
    }

    /// Returns the integer representation of the [`HpoTermId`]
    pub fn as_u32(&self) -> u32 {
        self.inner
    }
}

impl TryFrom<&str> for HpoTermId {
    type Error = BoqaError;

    /// Parses a CURIE of the form `HP:0001166`
    ///
    /// # Errors
    ///
    /// - [`BoqaError::InvalidInput`]: the string does not start with `HP:`
    /// - [`BoqaError::ParseIntError`]: the numerical part is not a valid number
    fn try_from(s: &str) -> BoqaResult<Self> {
        let Some(num) = s.trim().strip_prefix("HP:") else {
            return Err(BoqaError::InvalidInput(format!("not an HPO term: {s}")));
        };
        let inner = num.parse::<u32>()?;
        if inner as usize >= MAX_HPO_ID_INTEGER {
            return Err(BoqaError::InvalidInput(format!("HPO term out of range: {s}")));
        }
        Ok(HpoTermId { inner })
    }
}

impl From<u32> for HpoTermId {
    fn from(inner: u32) -> Self {
        Self { inner }
    }
}

impl Debug for HpoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HpoTermId({self})")
    }
}

impl Display for HpoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HP:{:07}", self.inner)
    }
}

impl PartialEq<str> for HpoTermId {
    fn eq(&self, other: &str) -> bool {
        HpoTermId::try_from(other).map_or(false, |id| id == *self)
    }
}

impl PartialEq<&str> for HpoTermId {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
