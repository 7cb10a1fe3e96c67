//! Visibility modifiers for class members.

use std::fmt;

/// Visibility modifier for class members.
///
/// Ordered from least to most restrictive: `Public < Protected < Private`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    /// All visibility levels, least restrictive first.
    pub const ALL: [Visibility; 3] = [
        Visibility::Public,
        Visibility::Protected,
        Visibility::Private,
    ];

    /// Check if `self` hides the member from more callers than `other`.
    pub fn is_more_restrictive_than(self, other: Visibility) -> bool {
        self > other
    }

    /// Whether members of this level are inherited by subtypes.
    pub fn is_inherited(self) -> bool {
        !matches!(self, Visibility::Private)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
