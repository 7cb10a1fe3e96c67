//! Instance construction and visibility-enforcing member dispatch.
//!
//! ## Key Types
//!
//! - [`Runtime`]: owns classes, layouts, statics and instances
//! - [`ClassLayout`]: per-class member tables resolved once from the registry
//! - [`InstanceHeap`]: generational storage of instance data

mod heap;
mod layout;
mod runtime;

pub use heap::{InstanceData, InstanceHeap};
pub use layout::{ClassLayout, LayoutEntry, Resolved};
pub use runtime::{CONSTRUCTOR, Runtime};
