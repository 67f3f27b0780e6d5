//! Model selection for the Try-On flow.
//!
//! The value is passed through to the webhook unchanged, so the wire form
//! (`"male"` / `"female"`) is part of the external contract.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Which model the generated image should show the product on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelChoice {
    Male,
    Female,
}

impl ModelChoice {
    pub const ALL: [ModelChoice; 2] = [ModelChoice::Male, ModelChoice::Female];

    pub fn as_str(self) -> &'static str {
        match self {
            ModelChoice::Male => "male",
            ModelChoice::Female => "female",
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelChoice {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(ModelChoice::Male),
            "female" => Ok(ModelChoice::Female),
            other => Err(CoreError::Validation(format!(
                "Unknown model '{other}', expected 'male' or 'female'"
            ))),
        }
    }
}
