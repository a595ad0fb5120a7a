//! Form validation for the branch schema.
//!
//! A changeset pairs the merged candidate values with per-field errors and,
//! for a clean save, the finished record. Evaluation is a pure function;
//! nothing here touches the store.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::model::{Branch, BranchField, BranchInput};

/// What the caller intends to do with the input.
///
/// `Validate` is the live as-you-type check; `Save` is the full check that
/// fills defaults (fresh id, inactive status) and yields a record when every
/// field passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangesetAction {
    Validate,
    Save,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changeset {
    pub action: Option<ChangesetAction>,
    /// Id of the stored record the input merged over; `None` when the
    /// input came from the create form. The renderer uses this to route
    /// the changeset back to the form it belongs to.
    pub base_id: Option<String>,
    pub candidate: BranchInput,
    pub errors: BTreeMap<BranchField, String>,
    pub record: Option<Branch>,
}

impl Changeset {
    /// The untouched changeset a fresh form renders from: no action yet, no
    /// candidate values, no errors.
    pub fn pristine() -> Self {
        Self::default()
    }

    /// A pristine changeset whose candidate carries a stored record's
    /// values; what an edit form opens on.
    pub fn seeded(branch: &Branch) -> Self {
        Self {
            base_id: Some(branch.id.clone()),
            candidate: BranchInput::from(branch),
            ..Self::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_pristine(&self) -> bool {
        self.action.is_none()
    }

    /// Candidate value for a field, empty string when nothing was entered.
    pub fn value(&self, field: BranchField) -> &str {
        self.candidate.get(field).unwrap_or("")
    }

    pub fn error(&self, field: BranchField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }
}

/// Evaluate `input` merged over `base` (the stored record for an update,
/// `None` for a create) under the given action.
///
/// Every field is checked in both modes: absent means "is required", present
/// means the character count must sit inside the field's bounds. Only a
/// `Save` with no errors produces a record; its id and status come from the
/// base when updating, otherwise a fresh v4 uuid and `false`.
pub fn evaluate(base: Option<&Branch>, input: &BranchInput, action: ChangesetAction) -> Changeset {
    let mut candidate = base.map(BranchInput::from).unwrap_or_default();
    for field in BranchField::ALL {
        if let Some(value) = input.get(field) {
            candidate.set(field, value.to_string());
        }
    }

    let mut errors = BTreeMap::new();
    for field in BranchField::ALL {
        if let Some(message) = check_field(field, candidate.get(field)) {
            errors.insert(field, message);
        }
    }

    let base_id = base.map(|b| b.id.clone());
    let record = if action == ChangesetAction::Save && errors.is_empty() {
        Some(Branch {
            id: base_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: owned_value(&candidate, BranchField::Name),
            manager: owned_value(&candidate, BranchField::Manager),
            address: owned_value(&candidate, BranchField::Address),
            contact: owned_value(&candidate, BranchField::Contact),
            status: base.map(|b| b.status).unwrap_or(false),
        })
    } else {
        None
    };

    Changeset {
        action: Some(action),
        base_id,
        candidate,
        errors,
        record,
    }
}

fn check_field(field: BranchField, value: Option<&str>) -> Option<String> {
    let (min, max) = field.bounds();
    match value {
        None => Some("is required".to_string()),
        Some(s) => {
            let len = s.chars().count();
            if len < min {
                Some(format!("must be at least {} characters", min))
            } else if len > max {
                Some(format!("must be at most {} characters", max))
            } else {
                None
            }
        }
    }
}

fn owned_value(candidate: &BranchInput, field: BranchField) -> String {
    candidate.get(field).unwrap_or("").to_string()
}
