//! Class and member registries.
//!
//! - [`MemberRegistry`]: the members one class declares, by visibility
//! - [`ClassRegistry`]: every class, with ancestry-aware member lookup

mod member_registry;
mod registry;

pub use member_registry::MemberRegistry;
pub use registry::{ClassEntry, ClassRegistry};
