//! Per-class member tables, resolved once per class.
//!
//! A [`ClassLayout`] flattens a finalized class and its ancestry into the
//! tables member access needs:
//!
//! - **shared**: protected and public instance members, most-derived record
//!   per name. Overrides replace the entry in place, so calls dispatch
//!   virtually no matter which class's code makes them.
//! - **private**: one table per declaring class, visible only to code whose
//!   origin is that class.
//! - **statics**: per declaring class, shared by every instance.
//!
//! Every data member gets one slot index into the instance's storage. A
//! property overriding a property reuses its slot, so code in the base class
//! and code in the subtype see the same value.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use classmodel_core::{
    ClassError, ConstructionFailure, MemberRecord, MemberValue, TypeHash, Value, Visibility,
};
use classmodel_registry::ClassRegistry;

/// One resolved instance member.
#[derive(Debug, Clone)]
pub struct LayoutEntry {
    pub record: Arc<MemberRecord>,
    /// Storage slot, for data members.
    pub slot: Option<usize>,
    /// Depth of the class that first declared this name.
    pub introduced_at: usize,
}

/// Result of resolving a name from inside the class chain.
#[derive(Debug, Clone, Copy)]
pub enum Resolved<'a> {
    Instance(&'a LayoutEntry),
    Static(&'a Arc<MemberRecord>),
}

/// Flattened member tables of one class.
#[derive(Debug, Clone)]
pub struct ClassLayout {
    class: TypeHash,
    name: String,
    /// Root first, this class last.
    chain: Vec<TypeHash>,
    depths: FxHashMap<TypeHash, usize>,
    shared: FxHashMap<String, LayoutEntry>,
    private: FxHashMap<TypeHash, FxHashMap<String, LayoutEntry>>,
    statics: FxHashMap<TypeHash, FxHashMap<String, Arc<MemberRecord>>>,
    defaults: Vec<Value>,
    abstract_member: Option<String>,
}

impl ClassLayout {
    /// Resolve `class` and its ancestry.
    ///
    /// Fails if the class is unknown or still being defined.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build(registry: &ClassRegistry, class: TypeHash) -> Result<Self, ClassError> {
        let entry = registry.entry(class)?;
        if !entry.is_finalized() {
            return Err(ClassError::Construction {
                class: entry.name.clone(),
                reason: ConstructionFailure::NotFinalized,
            });
        }

        let mut layout = Self {
            class,
            name: entry.name.clone(),
            chain: Vec::new(),
            depths: FxHashMap::default(),
            shared: FxHashMap::default(),
            private: FxHashMap::default(),
            statics: FxHashMap::default(),
            defaults: Vec::new(),
            abstract_member: None,
        };

        for (depth, ancestor) in registry.lineage(class).into_iter().enumerate() {
            layout.chain.push(ancestor.hash);
            layout.depths.insert(ancestor.hash, depth);

            let members = &ancestor.members;

            let mut private = FxHashMap::default();
            for record in members.bucket(Visibility::Private).values() {
                let slot = layout.allocate_slot(record, None);
                private.insert(
                    record.name.clone(),
                    LayoutEntry {
                        record: Arc::clone(record),
                        slot,
                        introduced_at: depth,
                    },
                );
            }
            layout.private.insert(ancestor.hash, private);

            for visibility in [Visibility::Protected, Visibility::Public] {
                for record in members.bucket(visibility).values() {
                    layout.insert_shared(record, depth);
                }
            }

            layout
                .statics
                .insert(ancestor.hash, members.statics().clone());
        }

        layout.abstract_member = layout
            .shared
            .values()
            .filter(|entry| entry.record.is_abstract())
            .map(|entry| entry.record.name.clone())
            .min();

        Ok(layout)
    }

    fn allocate_slot(&mut self, record: &MemberRecord, reuse: Option<usize>) -> Option<usize> {
        let MemberValue::Property(initial) = &record.value else {
            return None;
        };

        match reuse {
            Some(slot) => {
                self.defaults[slot] = initial.clone();
                Some(slot)
            }
            None => {
                self.defaults.push(initial.clone());
                Some(self.defaults.len() - 1)
            }
        }
    }

    fn insert_shared(&mut self, record: &Arc<MemberRecord>, depth: usize) {
        let (introduced_at, reuse) = match self.shared.get(&record.name) {
            Some(previous) => (previous.introduced_at, previous.slot),
            None => (depth, None),
        };
        let slot = self.allocate_slot(record, reuse);

        self.shared.insert(
            record.name.clone(),
            LayoutEntry {
                record: Arc::clone(record),
                slot,
                introduced_at,
            },
        );
    }

    pub fn class(&self) -> TypeHash {
        self.class
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The class and its ancestors, root first.
    pub fn chain(&self) -> &[TypeHash] {
        &self.chain
    }

    /// Whether `class` is this class or one of its ancestors.
    pub fn contains(&self, class: TypeHash) -> bool {
        self.depths.contains_key(&class)
    }

    /// Initial storage for a new instance.
    pub fn defaults(&self) -> &[Value] {
        &self.defaults
    }

    /// The first abstract method left unimplemented, if any.
    pub fn abstract_member(&self) -> Option<&str> {
        self.abstract_member.as_deref()
    }

    pub fn is_abstract(&self) -> bool {
        self.abstract_member.is_some()
    }

    /// Static members declared by `class` itself.
    pub fn statics_of(&self, class: TypeHash) -> impl Iterator<Item = &Arc<MemberRecord>> {
        self.statics.get(&class).into_iter().flat_map(|m| m.values())
    }

    /// Names of the members external callers can reach on an instance.
    pub fn public_members(&self) -> impl Iterator<Item = &str> {
        self.shared
            .values()
            .filter(|entry| entry.record.visibility == Visibility::Public)
            .map(|entry| entry.record.name.as_str())
    }

    /// Resolve `name` for code declared in `origin`.
    ///
    /// `origin`'s own private members come first, then inherited and
    /// overriding instance members, then statics. Members a subtype of
    /// `origin` added are never visible, but overrides of members `origin`
    /// can see are.
    pub fn resolve_internal(&self, origin: TypeHash, name: &str) -> Option<Resolved<'_>> {
        let depth = *self.depths.get(&origin)?;

        if let Some(entry) = self.private.get(&origin).and_then(|m| m.get(name)) {
            return Some(Resolved::Instance(entry));
        }

        if let Some(entry) = self.shared.get(name)
            && entry.introduced_at <= depth
        {
            return Some(Resolved::Instance(entry));
        }

        self.resolve_static(origin, name).map(Resolved::Static)
    }

    /// Resolve a static member for code declared in `origin`.
    ///
    /// Walks from `origin` to the root; ancestors contribute only members
    /// they do not keep private.
    pub fn resolve_static(&self, origin: TypeHash, name: &str) -> Option<&Arc<MemberRecord>> {
        let depth = *self.depths.get(&origin)?;

        self.chain[..=depth]
            .iter()
            .enumerate()
            .rev()
            .find_map(|(d, class)| {
                self.statics
                    .get(class)
                    .and_then(|m| m.get(name))
                    .filter(|record| d == depth || record.visibility.is_inherited())
            })
    }

    /// Resolve `name` for an external caller holding an instance.
    pub fn resolve_external(&self, name: &str) -> Option<&LayoutEntry> {
        self.shared
            .get(name)
            .filter(|entry| entry.record.visibility == Visibility::Public)
    }

    /// Resolve a static member for an external caller.
    pub fn resolve_static_external(&self, name: &str) -> Option<&Arc<MemberRecord>> {
        self.resolve_static(self.class, name)
            .filter(|record| record.visibility == Visibility::Public)
    }
}
