//! Member modifier flags and their legality rules.

use std::fmt;

use bitflags::bitflags;

use crate::{ClassError, MemberKind, Visibility};

bitflags! {
    /// Contract modifiers attached to a member declaration.
    ///
    /// The flags are independent, but not every combination is legal. Use
    /// [`Modifiers::validate`] (called by [`crate::Declaration::new`]) to
    /// obtain a normalized, checked set.
    ///
    /// ```
    /// use classmodel_core::Modifiers;
    ///
    /// let mods = Modifiers::VIRTUAL | Modifiers::OVERRIDE;
    /// assert!(mods.is_virtual());
    /// assert!(!mods.is_static());
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Member belongs to the class, not to instances.
        const STATIC = 1 << 0;
        /// Member may be overridden by subtypes.
        const VIRTUAL = 1 << 1;
        /// Member has no implementation; implies `VIRTUAL`.
        const ABSTRACT = 1 << 2;
        /// Member intentionally replaces an inherited virtual member.
        const OVERRIDE = 1 << 3;
    }
}

impl Modifiers {
    #[inline]
    pub fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    /// Virtual either explicitly or through `ABSTRACT`.
    #[inline]
    pub fn is_virtual(self) -> bool {
        self.intersects(Self::VIRTUAL | Self::ABSTRACT)
    }

    #[inline]
    pub fn is_abstract(self) -> bool {
        self.contains(Self::ABSTRACT)
    }

    #[inline]
    pub fn is_override(self) -> bool {
        self.contains(Self::OVERRIDE)
    }

    /// Check the modifier set against the member's kind and visibility.
    ///
    /// Returns the normalized set: abstract members are always virtual.
    pub fn validate(
        self,
        name: &str,
        kind: MemberKind,
        visibility: Visibility,
    ) -> Result<Modifiers, ClassError> {
        if self.is_abstract() && visibility == Visibility::Private {
            return Err(ClassError::InvalidModifierCombination {
                name: name.to_string(),
                reason: "private members cannot be abstract",
            });
        }

        if self.is_abstract() && kind != MemberKind::Method {
            return Err(ClassError::InvalidModifierCombination {
                name: name.to_string(),
                reason: "only methods may be abstract",
            });
        }

        let normalized = if self.is_abstract() {
            self | Self::VIRTUAL
        } else {
            self
        };

        if normalized.is_static() && normalized.is_virtual() {
            return Err(ClassError::InvalidModifierCombination {
                name: name.to_string(),
                reason: "static members cannot be virtual",
            });
        }

        Ok(normalized)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (keyword, flag) in [
            ("static", Self::STATIC),
            ("abstract", Self::ABSTRACT),
            ("virtual", Self::VIRTUAL),
            ("override", Self::OVERRIDE),
        ] {
            if self.contains(flag) {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(keyword)?;
                first = false;
            }
        }
        Ok(())
    }
}
