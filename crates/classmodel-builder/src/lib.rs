//! Member builders and the override compatibility validator.
//!
//! Class definition hands each member declaration to a [`MemberBuilder`],
//! which checks it against what the class's ancestry already declares under
//! that name and, on success, commits it to the class registry.
//!
//! ```
//! use classmodel_builder::{Capabilities, MemberBuilder};
//! use classmodel_core::{MethodBody, Modifiers, NativeFn, Visibility};
//! use classmodel_registry::ClassRegistry;
//!
//! let mut registry = ClassRegistry::new();
//! let foo = registry.declare("Foo", None).unwrap();
//! let builder = Capabilities::FULL.builder();
//!
//! builder
//!     .build_method(
//!         &mut registry,
//!         foo,
//!         "greet",
//!         0,
//!         MethodBody::Native(NativeFn::new(|ctx| {
//!             ctx.set_return("hello");
//!             Ok(())
//!         })),
//!         Visibility::Public,
//!         Modifiers::VIRTUAL,
//!     )
//!     .unwrap();
//!
//! assert!(registry.lookup("greet", foo).is_some());
//! ```

mod builder;
mod capabilities;
pub mod validator;

pub use builder::{FallbackMemberBuilder, MemberBuilder, StandardMemberBuilder, build_member};
pub use capabilities::Capabilities;
pub use validator::validate;
