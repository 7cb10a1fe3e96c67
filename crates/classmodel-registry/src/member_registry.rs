//! Per-class member storage, partitioned by visibility.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use classmodel_core::{ClassError, MemberRecord, TypeHash, Visibility};

type Bucket = FxHashMap<String, Arc<MemberRecord>>;

/// The members one class declares itself.
///
/// Instance members are split into one bucket per visibility level; static
/// members share a separate bucket. A name appears in at most one bucket:
/// committing a record removes any earlier record of the same name from the
/// other buckets of this class.
///
/// A registry starts out building and is frozen exactly once by
/// [`finalize`](Self::finalize). Afterwards every mutation fails with
/// [`ClassError::FinalizedRegistry`].
#[derive(Debug, Clone)]
pub struct MemberRegistry {
    class: TypeHash,
    class_name: String,
    public: Bucket,
    protected: Bucket,
    private: Bucket,
    statics: Bucket,
    finalized: bool,
}

impl MemberRegistry {
    pub fn new(class: TypeHash, class_name: impl Into<String>) -> Self {
        Self {
            class,
            class_name: class_name.into(),
            public: Bucket::default(),
            protected: Bucket::default(),
            private: Bucket::default(),
            statics: Bucket::default(),
            finalized: false,
        }
    }

    pub fn class(&self) -> TypeHash {
        self.class
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Instance members declared at `visibility`.
    pub fn bucket(&self, visibility: Visibility) -> &FxHashMap<String, Arc<MemberRecord>> {
        match visibility {
            Visibility::Public => &self.public,
            Visibility::Protected => &self.protected,
            Visibility::Private => &self.private,
        }
    }

    /// Static members of every visibility.
    pub fn statics(&self) -> &FxHashMap<String, Arc<MemberRecord>> {
        &self.statics
    }

    fn bucket_for(&self, record: &MemberRecord) -> &Bucket {
        if record.is_static() {
            &self.statics
        } else {
            self.bucket(record.visibility)
        }
    }

    fn bucket_for_mut(&mut self, record: &MemberRecord) -> &mut Bucket {
        if record.is_static() {
            return &mut self.statics;
        }
        match record.visibility {
            Visibility::Public => &mut self.public,
            Visibility::Protected => &mut self.protected,
            Visibility::Private => &mut self.private,
        }
    }

    /// Find a member this class declares, of any visibility.
    ///
    /// Buckets are searched most restrictive first, statics last.
    pub fn get(&self, name: &str) -> Option<&Arc<MemberRecord>> {
        self.private
            .get(name)
            .or_else(|| self.protected.get(name))
            .or_else(|| self.public.get(name))
            .or_else(|| self.statics.get(name))
    }

    /// Find a member this class passes on to subtypes.
    pub fn get_inherited(&self, name: &str) -> Option<&Arc<MemberRecord>> {
        self.protected
            .get(name)
            .or_else(|| self.public.get(name))
            .or_else(|| {
                self.statics
                    .get(name)
                    .filter(|record| record.visibility.is_inherited())
            })
    }

    /// Check whether `record` could be committed without redefining a member.
    ///
    /// A record of the same name and visibility already declared by this
    /// class is a duplicate unless the incoming record overrides it, or the
    /// existing one is abstract and still waiting for its body.
    pub fn check_commit(&self, record: &MemberRecord) -> Result<(), ClassError> {
        if self.finalized {
            return Err(ClassError::FinalizedRegistry {
                class: self.class_name.clone(),
            });
        }

        if let Some(existing) = self.bucket_for(record).get(&record.name)
            && existing.visibility == record.visibility
            && !record.is_override()
            && !existing.is_abstract()
        {
            return Err(ClassError::DuplicateDefinition {
                name: record.name.clone(),
                visibility: record.visibility,
                class: self.class_name.clone(),
            });
        }

        Ok(())
    }

    /// Insert a record, shadowing any earlier record of the same name.
    pub fn commit(&mut self, record: MemberRecord) -> Result<Arc<MemberRecord>, ClassError> {
        self.check_commit(&record)?;

        for bucket in [
            &mut self.public,
            &mut self.protected,
            &mut self.private,
            &mut self.statics,
        ] {
            bucket.remove(&record.name);
        }

        let record = Arc::new(record);
        self.bucket_for_mut(&record)
            .insert(record.name.clone(), Arc::clone(&record));
        Ok(record)
    }

    /// Freeze the registry.
    pub fn finalize(&mut self) -> Result<(), ClassError> {
        if self.finalized {
            return Err(ClassError::FinalizedRegistry {
                class: self.class_name.clone(),
            });
        }
        self.finalized = true;
        Ok(())
    }

    /// All instance members, public first.
    pub fn instance_members(&self) -> impl Iterator<Item = &Arc<MemberRecord>> {
        self.public
            .values()
            .chain(self.protected.values())
            .chain(self.private.values())
    }

    /// Total number of members, statics included.
    pub fn len(&self) -> usize {
        self.public.len() + self.protected.len() + self.private.len() + self.statics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
