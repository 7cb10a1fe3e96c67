//! ClassRegistry - every declared class and its member registry.
//!
//! # Storage Model
//!
//! Classes are stored in a single map keyed by [`TypeHash`], computed from
//! the class name. Each [`ClassEntry`] owns the [`MemberRegistry`] of the
//! members it declares and refers to its parent by hash only; a subtype never
//! copies its parent's members.
//!
//! # Lookup
//!
//! [`ClassRegistry::lookup`] resolves a name for a class being defined: the
//! class's own registry first (all visibility levels), then each ancestor
//! outward, skipping members that ancestor keeps private.
//!
//! # Example
//!
//! ```
//! use classmodel_registry::ClassRegistry;
//!
//! let mut registry = ClassRegistry::new();
//! let foo = registry.declare("Foo", None).unwrap();
//! registry.finalize(foo).unwrap();
//!
//! let sub = registry.declare("SubFoo", Some("Foo")).unwrap();
//! assert!(registry.is_subclass_of(sub, foo));
//! ```

use std::sync::Arc;

use rustc_hash::FxHashMap;

use classmodel_core::{ClassError, MemberRecord, TypeHash};

use crate::MemberRegistry;

/// A declared class.
#[derive(Debug, Clone)]
pub struct ClassEntry {
    pub name: String,
    pub hash: TypeHash,
    pub parent: Option<TypeHash>,
    pub members: MemberRegistry,
}

impl ClassEntry {
    pub fn is_finalized(&self) -> bool {
        self.members.is_finalized()
    }
}

/// Registry of all classes.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: FxHashMap<TypeHash, ClassEntry>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Declaration
    // ==========================================================================

    /// Begin the definition of a class.
    ///
    /// The parent, if any, must already be declared and finalized.
    pub fn declare(&mut self, name: &str, parent: Option<&str>) -> Result<TypeHash, ClassError> {
        let hash = TypeHash::from_name(name);
        if self.classes.contains_key(&hash) {
            return Err(ClassError::DuplicateClass(name.to_string()));
        }

        let parent = match parent {
            Some(parent_name) => {
                let parent = self
                    .get_by_name(parent_name)
                    .ok_or_else(|| ClassError::UnknownClass(parent_name.to_string()))?;
                if !parent.is_finalized() {
                    return Err(ClassError::ParentNotFinalized {
                        class: name.to_string(),
                        parent: parent_name.to_string(),
                    });
                }
                Some(parent.hash)
            }
            None => None,
        };

        self.classes.insert(
            hash,
            ClassEntry {
                name: name.to_string(),
                hash,
                parent,
                members: MemberRegistry::new(hash, name),
            },
        );
        Ok(hash)
    }

    // ==========================================================================
    // Queries
    // ==========================================================================

    pub fn get(&self, hash: TypeHash) -> Option<&ClassEntry> {
        self.classes.get(&hash)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&ClassEntry> {
        self.get(TypeHash::from_name(name))
    }

    pub fn contains(&self, hash: TypeHash) -> bool {
        self.classes.contains_key(&hash)
    }

    /// Get a class, failing with [`ClassError::UnknownClass`].
    pub fn entry(&self, hash: TypeHash) -> Result<&ClassEntry, ClassError> {
        self.get(hash)
            .ok_or_else(|| ClassError::UnknownClass(hash.to_string()))
    }

    /// Mutable access to a class's member registry.
    pub fn members_mut(&mut self, hash: TypeHash) -> Result<&mut MemberRegistry, ClassError> {
        self.classes
            .get_mut(&hash)
            .map(|entry| &mut entry.members)
            .ok_or_else(|| ClassError::UnknownClass(hash.to_string()))
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassEntry> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Get the inheritance chain for a class (excluding the class itself).
    ///
    /// Returns base classes from immediate parent to root.
    pub fn base_class_chain(&self, hash: TypeHash) -> Vec<&ClassEntry> {
        let mut chain = Vec::new();
        let mut current = hash;

        while let Some(class) = self.get(current)
            && let Some(base) = class.parent
            && let Some(base_class) = self.get(base)
        {
            chain.push(base_class);
            current = base;
        }

        chain
    }

    /// The class and all its ancestors, root first.
    pub fn lineage(&self, hash: TypeHash) -> Vec<&ClassEntry> {
        let mut lineage = self.base_class_chain(hash);
        lineage.reverse();
        if let Some(class) = self.get(hash) {
            lineage.push(class);
        }
        lineage
    }

    /// Whether `class` is `ancestor` or derives from it.
    pub fn is_subclass_of(&self, class: TypeHash, ancestor: TypeHash) -> bool {
        class == ancestor
            || self
                .base_class_chain(class)
                .iter()
                .any(|base| base.hash == ancestor)
    }

    /// Resolve a member name for code being added to `from`.
    ///
    /// Searches `from`'s own members first, then each ancestor outward,
    /// stopping at the first match. Ancestors' private members are never
    /// returned. Absence is a normal outcome.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn lookup(&self, name: &str, from: TypeHash) -> Option<&Arc<MemberRecord>> {
        let class = self.get(from)?;
        if let Some(record) = class.members.get(name) {
            return Some(record);
        }

        self.base_class_chain(from)
            .into_iter()
            .find_map(|base| base.members.get_inherited(name))
    }

    // ==========================================================================
    // Mutation
    // ==========================================================================

    /// Commit a record into its origin class.
    pub fn commit(&mut self, record: MemberRecord) -> Result<Arc<MemberRecord>, ClassError> {
        self.members_mut(record.origin)?.commit(record)
    }

    /// Freeze a class's member registry.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn finalize(&mut self, hash: TypeHash) -> Result<(), ClassError> {
        self.members_mut(hash)?.finalize()
    }

    pub fn is_finalized(&self, hash: TypeHash) -> bool {
        self.get(hash).is_some_and(ClassEntry::is_finalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classmodel_core::{Declaration, MemberValue, Modifiers, Visibility};

    fn property(origin: TypeHash, name: &str, visibility: Visibility) -> MemberRecord {
        let decl = Declaration::new(
            name,
            MemberValue::property(0i64),
            visibility,
            Modifiers::empty(),
        )
        .unwrap();
        MemberRecord::new(origin, decl)
    }

    /// Foo <- SubFoo <- SubSubFoo, each finalized except the last.
    fn hierarchy() -> (ClassRegistry, TypeHash, TypeHash, TypeHash) {
        let mut registry = ClassRegistry::new();
        let foo = registry.declare("Foo", None).unwrap();
        registry
            .commit(property(foo, "pub", Visibility::Public))
            .unwrap();
        registry
            .commit(property(foo, "peeps", Visibility::Protected))
            .unwrap();
        registry
            .commit(property(foo, "parts", Visibility::Private))
            .unwrap();
        registry.finalize(foo).unwrap();

        let sub = registry.declare("SubFoo", Some("Foo")).unwrap();
        registry
            .commit(property(sub, "own", Visibility::Private))
            .unwrap();
        registry.finalize(sub).unwrap();

        let subsub = registry.declare("SubSubFoo", Some("SubFoo")).unwrap();
        (registry, foo, sub, subsub)
    }

    #[test]
    fn declare_duplicate_class() {
        let mut registry = ClassRegistry::new();
        registry.declare("Foo", None).unwrap();
        assert_eq!(
            registry.declare("Foo", None),
            Err(ClassError::DuplicateClass("Foo".into()))
        );
    }

    #[test]
    fn declare_unknown_parent() {
        let mut registry = ClassRegistry::new();
        assert_eq!(
            registry.declare("Foo", Some("Missing")),
            Err(ClassError::UnknownClass("Missing".into()))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn declare_requires_finalized_parent() {
        let mut registry = ClassRegistry::new();
        registry.declare("Foo", None).unwrap();
        let err = registry.declare("SubFoo", Some("Foo")).unwrap_err();
        assert!(matches!(err, ClassError::ParentNotFinalized { .. }));
    }

    #[test]
    fn base_class_chain_order() {
        let (registry, foo, sub, subsub) = hierarchy();

        let chain: Vec<_> = registry
            .base_class_chain(subsub)
            .iter()
            .map(|c| c.hash)
            .collect();
        assert_eq!(chain, vec![sub, foo]);
        assert!(registry.base_class_chain(foo).is_empty());

        let lineage: Vec<_> = registry.lineage(subsub).iter().map(|c| c.hash).collect();
        assert_eq!(lineage, vec![foo, sub, subsub]);
    }

    #[test]
    fn subclass_relation() {
        let (registry, foo, sub, subsub) = hierarchy();
        assert!(registry.is_subclass_of(subsub, foo));
        assert!(registry.is_subclass_of(sub, sub));
        assert!(!registry.is_subclass_of(foo, sub));
    }

    #[test]
    fn lookup_walks_ancestry() {
        let (registry, foo, sub, subsub) = hierarchy();

        assert_eq!(registry.lookup("pub", subsub).unwrap().origin, foo);
        assert_eq!(registry.lookup("peeps", subsub).unwrap().origin, foo);
        assert!(registry.lookup("missing", subsub).is_none());

        // Private members are only found from their own class
        assert!(registry.lookup("parts", foo).is_some());
        assert!(registry.lookup("parts", sub).is_none());
        assert!(registry.lookup("own", sub).is_some());
        assert!(registry.lookup("own", subsub).is_none());
    }

    #[test]
    fn lookup_prefers_own_members() {
        let (mut registry, _, _, subsub) = hierarchy();
        registry
            .commit(property(subsub, "parts", Visibility::Public))
            .unwrap();
        assert_eq!(registry.lookup("parts", subsub).unwrap().origin, subsub);
    }

    #[test]
    fn commit_after_finalize() {
        let (mut registry, foo, _, _) = hierarchy();
        let err = registry
            .commit(property(foo, "late", Visibility::Public))
            .unwrap_err();
        assert_eq!(err, ClassError::FinalizedRegistry { class: "Foo".into() });
    }

    #[test]
    fn commit_to_unknown_class() {
        let mut registry = ClassRegistry::new();
        let ghost = TypeHash::from_name("Ghost");
        let err = registry
            .commit(property(ghost, "x", Visibility::Public))
            .unwrap_err();
        assert!(matches!(err, ClassError::UnknownClass(_)));
    }

    #[test]
    fn finalize_state() {
        let (mut registry, foo, _, subsub) = hierarchy();
        assert!(registry.is_finalized(foo));
        assert!(!registry.is_finalized(subsub));
        registry.finalize(subsub).unwrap();
        assert!(registry.is_finalized(subsub));
        assert!(!registry.is_finalized(TypeHash::from_name("Ghost")));
    }
}
