//! Target capability detection and builder selection.

use crate::{FallbackMemberBuilder, MemberBuilder, StandardMemberBuilder};

/// What the target environment supports.
///
/// Chosen once, when a runtime is created; the matching builder is then used
/// for every declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Getter/setter members can be defined.
    pub accessors: bool,
}

impl Capabilities {
    pub const FULL: Capabilities = Capabilities { accessors: true };
    pub const REDUCED: Capabilities = Capabilities { accessors: false };

    /// Capabilities of the current build.
    ///
    /// The `no-accessors` feature forces the reduced set.
    pub fn detect() -> Self {
        if cfg!(feature = "no-accessors") {
            Self::REDUCED
        } else {
            Self::FULL
        }
    }

    /// The builder variant for these capabilities.
    pub fn builder(self) -> Box<dyn MemberBuilder> {
        if self.accessors {
            Box::new(StandardMemberBuilder)
        } else {
            Box::new(FallbackMemberBuilder)
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::detect()
    }
}
