//! User classification.

use pricora_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Distinguishes company members from internal platform staff.
///
/// Company users gain permissions only through role assignments scoped to
/// their active company. Internal users gain company-context permissions
/// from their single platform role instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// Member of one or more companies.
    Company,
    /// Internal platform staff.
    Internal,
}

impl UserType {
    /// Returns a stable storage value for this user type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Internal => "internal",
        }
    }

    /// Parses a storage value into a user type.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "company" => Ok(Self::Company),
            "internal" => Ok(Self::Internal),
            _ => Err(AppError::Validation(format!("unknown user type '{value}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::UserType;

    #[test]
    fn storage_values_roundtrip() {
        for user_type in [UserType::Company, UserType::Internal] {
            let parsed = UserType::parse(user_type.as_str());
            assert!(parsed.is_ok());
            assert_eq!(parsed.unwrap_or(UserType::Company), user_type);
        }
    }

    #[test]
    fn unknown_user_type_is_rejected() {
        assert!(UserType::parse("guest").is_err());
    }
}
