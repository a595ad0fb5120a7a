use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One physical bank branch. The only entity in the system.
///
/// `id` is assigned once at creation and never changes; `status` starts
/// false ("inactive") and is flipped by the toggle-status event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub manager: String,
    pub address: String,
    pub contact: String,
    pub status: bool,
}

/// Raw form payload for the field-carrying events. Every field is optional
/// because the client sends whatever the user has typed so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BranchInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

impl BranchInput {
    pub fn get(&self, field: BranchField) -> Option<&str> {
        match field {
            BranchField::Name => self.name.as_deref(),
            BranchField::Manager => self.manager.as_deref(),
            BranchField::Address => self.address.as_deref(),
            BranchField::Contact => self.contact.as_deref(),
        }
    }

    pub fn set(&mut self, field: BranchField, value: String) {
        match field {
            BranchField::Name => self.name = Some(value),
            BranchField::Manager => self.manager = Some(value),
            BranchField::Address => self.address = Some(value),
            BranchField::Contact => self.contact = Some(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        BranchField::ALL.iter().all(|f| self.get(*f).is_none())
    }
}

impl From<&Branch> for BranchInput {
    fn from(branch: &Branch) -> Self {
        Self {
            name: Some(branch.name.clone()),
            manager: Some(branch.manager.clone()),
            address: Some(branch.address.clone()),
            contact: Some(branch.contact.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchField {
    Name,
    Manager,
    Address,
    Contact,
}

impl BranchField {
    pub const ALL: [BranchField; 4] = [
        Self::Name,
        Self::Manager,
        Self::Address,
        Self::Contact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Manager => "manager",
            Self::Address => "address",
            Self::Contact => "contact",
        }
    }

    /// Inclusive (min, max) character bounds for the field.
    pub fn bounds(&self) -> (usize, usize) {
        match self {
            Self::Name => (2, 100),
            Self::Manager | Self::Address | Self::Contact => (4, 100),
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Name => "Branch Name",
            Self::Manager => "Manager",
            Self::Address => "Address",
            Self::Contact => "Contact",
        }
    }
}

impl std::fmt::Display for BranchField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BranchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "manager" => Ok(Self::Manager),
            "address" => Ok(Self::Address),
            "contact" => Ok(Self::Contact),
            _ => Err(format!("Invalid branch field: {}", s)),
        }
    }
}
