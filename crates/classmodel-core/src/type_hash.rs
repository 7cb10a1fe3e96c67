//! Deterministic hash-based identity for classes and members.
//!
//! This module provides [`TypeHash`], a 64-bit hash that identifies a class or
//! one member of a class. Hashes are computed from names, so:
//!
//! - The same qualified class name always yields the same hash
//! - A member hash is tied to its declaring class, so two classes declaring
//!   `foo` produce distinct member hashes
//! - Static and instance members of the same name never collide
//!
//! # Hash Computation
//!
//! Uses XXHash64 with domain-specific mixing constants so class hashes and
//! member hashes live in separate domains.
//!
//! # Examples
//!
//! ```
//! use classmodel_core::TypeHash;
//!
//! let foo = TypeHash::from_name("Foo");
//! assert_eq!(foo, TypeHash::from_name("Foo"));
//!
//! let a = TypeHash::from_member(foo, "bar", false);
//! let b = TypeHash::from_member(foo, "bar", true);
//! assert_ne!(a, b);
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Separator constant used when folding an owner hash into a member hash.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for class hashes
    pub const CLASS: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for instance member hashes
    pub const MEMBER: u64 = 0x7d3c8b4a92e15f6d;

    /// Domain marker for static member hashes
    pub const STATIC_MEMBER: u64 = 0x3e9f5d2a8c7b1403;
}

/// A deterministic 64-bit hash identifying a class or a member.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a class hash from its qualified name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::CLASS ^ xxh64(name.as_bytes(), 0))
    }

    /// Create a member hash from the declaring class and the member name.
    ///
    /// Static members use a separate domain so a static `count` and an
    /// instance `count` on the same class hash differently.
    #[inline]
    pub fn from_member(owner: TypeHash, name: &str, is_static: bool) -> Self {
        let domain = if is_static {
            hash_constants::STATIC_MEMBER
        } else {
            hash_constants::MEMBER
        };
        TypeHash(domain ^ owner.0.wrapping_mul(hash_constants::SEP) ^ xxh64(name.as_bytes(), 0))
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_hash_determinism() {
        assert_eq!(TypeHash::from_name("Foo"), TypeHash::from_name("Foo"));
        assert_eq!(
            TypeHash::from_name("Game::Player"),
            TypeHash::from_name("Game::Player")
        );
    }

    #[test]
    fn class_hash_uniqueness() {
        let foo = TypeHash::from_name("Foo");
        let bar = TypeHash::from_name("Bar");
        let sub = TypeHash::from_name("SubFoo");

        assert_ne!(foo, bar);
        assert_ne!(foo, sub);
        assert_ne!(bar, sub);
    }

    #[test]
    fn member_hash_depends_on_owner() {
        let foo = TypeHash::from_name("Foo");
        let bar = TypeHash::from_name("Bar");

        assert_ne!(
            TypeHash::from_member(foo, "getSelf", false),
            TypeHash::from_member(bar, "getSelf", false)
        );
    }

    #[test]
    fn static_and_instance_members_differ() {
        let foo = TypeHash::from_name("Foo");
        assert_ne!(
            TypeHash::from_member(foo, "count", false),
            TypeHash::from_member(foo, "count", true)
        );
    }

    #[test]
    fn member_hash_not_class_hash() {
        // A member named like a class must not alias the class hash
        let foo = TypeHash::from_name("Foo");
        assert_ne!(TypeHash::from_member(foo, "Foo", false), foo);
    }

    #[test]
    fn empty_hash() {
        assert!(TypeHash::EMPTY.is_empty());
        assert!(!TypeHash::from_name("Foo").is_empty());
        assert_eq!(TypeHash(42).as_u64(), 42);
    }

    #[test]
    fn debug_and_display() {
        let hash = TypeHash(0x1234);
        assert_eq!(format!("{:?}", hash), "TypeHash(0x0000000000001234)");
        assert_eq!(format!("{}", hash), "0x0000000000001234");
    }
}
