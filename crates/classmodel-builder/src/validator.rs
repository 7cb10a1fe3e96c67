//! Override compatibility rules.
//!
//! [`validate`] is pure: it looks at the record a class inherits (or already
//! declares) under a name and the candidate replacing it, and either accepts
//! the transition or names the rule it breaks. Checks run in a fixed order
//! so a candidate breaking several rules always reports the same error:
//!
//! 1. kind (method, property, accessor) must match
//! 2. static and instance members cannot replace one another
//! 3. `override` is required unless the existing member is abstract
//! 4. the existing member must be virtual
//! 5. a concrete member cannot become abstract again
//! 6. a method override may not drop parameters
//! 7. an override may not narrow visibility

use classmodel_core::{ClassError, MemberRecord};

/// Decide whether `candidate` may replace `existing`.
///
/// With no `existing` record the candidate is a fresh declaration and only
/// its own modifier set is checked.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn validate(
    existing: Option<&MemberRecord>,
    candidate: &MemberRecord,
) -> Result<(), ClassError> {
    let Some(existing) = existing else {
        candidate
            .modifiers
            .validate(&candidate.name, candidate.kind(), candidate.visibility)?;
        return Ok(());
    };

    check_kind(existing, candidate)?;
    check_static(existing, candidate)?;
    check_override_intent(existing, candidate)?;
    check_abstractness(existing, candidate)?;
    check_arity(existing, candidate)?;
    check_visibility(existing, candidate)
}

fn check_kind(existing: &MemberRecord, candidate: &MemberRecord) -> Result<(), ClassError> {
    if existing.kind() != candidate.kind() {
        return Err(ClassError::IncompatibleKind {
            name: candidate.name.clone(),
            existing: existing.describe(),
            candidate: candidate.describe(),
        });
    }
    Ok(())
}

fn check_static(existing: &MemberRecord, candidate: &MemberRecord) -> Result<(), ClassError> {
    if existing.is_static() != candidate.is_static() {
        return Err(ClassError::StaticMismatch {
            name: candidate.name.clone(),
            existing: scope(existing),
            candidate: scope(candidate),
        });
    }
    Ok(())
}

fn scope(record: &MemberRecord) -> &'static str {
    if record.is_static() {
        "static"
    } else {
        "instance"
    }
}

fn check_override_intent(
    existing: &MemberRecord,
    candidate: &MemberRecord,
) -> Result<(), ClassError> {
    // Abstract members are overridable without ceremony
    if existing.is_abstract() {
        return Ok(());
    }

    if !candidate.is_override() {
        return Err(ClassError::OverrideRequired {
            name: candidate.name.clone(),
        });
    }

    if !existing.is_virtual() {
        return Err(ClassError::NonVirtualOverride {
            name: candidate.name.clone(),
        });
    }

    Ok(())
}

fn check_abstractness(existing: &MemberRecord, candidate: &MemberRecord) -> Result<(), ClassError> {
    if candidate.is_abstract() && !existing.is_abstract() {
        return Err(ClassError::AbstractOverrideOfConcrete {
            name: candidate.name.clone(),
        });
    }
    Ok(())
}

fn check_arity(existing: &MemberRecord, candidate: &MemberRecord) -> Result<(), ClassError> {
    if let (Some(existing_arity), Some(candidate_arity)) = (existing.arity(), candidate.arity())
        && candidate_arity < existing_arity
    {
        return Err(ClassError::ArityMismatch {
            name: candidate.name.clone(),
            existing: existing_arity,
            candidate: candidate_arity,
        });
    }
    Ok(())
}

fn check_visibility(existing: &MemberRecord, candidate: &MemberRecord) -> Result<(), ClassError> {
    if candidate
        .visibility
        .is_more_restrictive_than(existing.visibility)
    {
        return Err(ClassError::VisibilityDeEscalation {
            name: candidate.name.clone(),
            existing: existing.visibility,
            candidate: candidate.visibility,
        });
    }
    Ok(())
}
