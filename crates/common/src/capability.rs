//! Object categories and capability sets.
//!
//! Behaviour is selected from an explicit capability set rather than by
//! comparing tags. A category adds implied capabilities on top of the ones an
//! object declares.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Movement class of an interactable object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Grabbable, follows the holder quickly.
    Light,
    /// Grabbable, slides along the floor sluggishly.
    Heavy,
    /// Cannot be moved, only activated.
    InteractOnly,
    /// Scenery. Never highlights.
    Static,
}

impl Category {
    /// Whether objects of this category can be owned and moved.
    pub fn is_grabbable(self) -> bool {
        matches!(self, Self::Light | Self::Heavy)
    }

    /// Whether a pointing ray may highlight objects of this category.
    pub fn is_interactable(self) -> bool {
        !matches!(self, Self::Static)
    }

    /// Capabilities every object of this category has regardless of its
    /// declared set. Grabbable objects carry the rotate and scale sliders.
    pub fn implied_capabilities(self) -> CapabilitySet {
        match self {
            Self::Light | Self::Heavy => CapabilitySet::from_iter([
                Capability::Rotatable,
                Capability::Scalable,
            ]),
            Self::InteractOnly | Self::Static => CapabilitySet::empty(),
        }
    }
}

/// A single interaction behaviour an object can support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Capability {
    Toggleable,
    Sittable,
    Door,
    Rotatable,
    Scalable,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::Toggleable,
        Capability::Sittable,
        Capability::Door,
        Capability::Rotatable,
        Capability::Scalable,
    ];

    fn bit(self) -> u8 {
        match self {
            Self::Toggleable => 1 << 0,
            Self::Sittable => 1 << 1,
            Self::Door => 1 << 2,
            Self::Rotatable => 1 << 3,
            Self::Scalable => 1 << 4,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Toggleable => "toggleable",
            Self::Sittable => "sittable",
            Self::Door => "door",
            Self::Rotatable => "rotatable",
            Self::Scalable => "scalable",
        };
        f.write_str(name)
    }
}

/// Small fixed-size set of capabilities.
///
/// Serialized as a list of capability names so configuration files stay
/// readable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Capability>", into = "Vec<Capability>")]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    /// A set with no capabilities.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// True when `capability` is in the set.
    pub fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    /// True when the set holds at least one of `capabilities`.
    pub fn contains_any(self, capabilities: &[Capability]) -> bool {
        capabilities.iter().any(|c| self.contains(*c))
    }

    /// Add `capability`; adding it twice is a no-op.
    pub fn insert(&mut self, capability: Capability) {
        self.0 |= capability.bit();
    }

    /// Drop `capability` if present.
    pub fn remove(&mut self, capability: Capability) {
        self.0 &= !capability.bit();
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, capability: Capability) -> Self {
        self.insert(capability);
        self
    }

    /// Every capability in either set.
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// True when the set holds nothing.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of capabilities in the set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Capabilities in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = Self::empty();
        for capability in iter {
            set.insert(capability);
        }
        set
    }
}

impl From<Vec<Capability>> for CapabilitySet {
    fn from(list: Vec<Capability>) -> Self {
        list.into_iter().collect()
    }
}

impl From<CapabilitySet> for Vec<Capability> {
    fn from(set: CapabilitySet) -> Self {
        set.iter().collect()
    }
}
