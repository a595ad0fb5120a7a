//! Inbound client events.
//!
//! The browser sends one JSON object per user action, discriminated by a
//! kebab-case `type` tag. Field-carrying events flatten the form payload
//! into the same object, so the wire shape is e.g.
//! `{"type":"save","name":"Main St","manager":"Alice Smith",...}`. Extra
//! keys (the pass-through csrf token among them) are ignored.

use serde::{Deserialize, Serialize};

use crate::model::BranchInput;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BranchEvent {
    Validate {
        #[serde(flatten)]
        fields: BranchInput,
    },
    Save {
        #[serde(flatten)]
        fields: BranchInput,
    },
    ToggleStatus {
        id: String,
    },
    Edit {
        id: String,
    },
    Update {
        #[serde(flatten)]
        fields: BranchInput,
    },
    Delete {
        id: String,
    },
}

impl BranchEvent {
    /// Wire tag, for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Validate { .. } => "validate",
            Self::Save { .. } => "save",
            Self::ToggleStatus { .. } => "toggle-status",
            Self::Edit { .. } => "edit",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}
