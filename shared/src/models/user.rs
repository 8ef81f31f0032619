//! User Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Staff role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Receptionist,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Receptionist => "receptionist",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a role string is neither `owner` nor `receptionist`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "receptionist" => Ok(Self::Receptionist),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// User response (without password)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub role: Role,
    /// Unix millis
    pub created_at: i64,
}

/// Register payload
///
/// `role` stays a string here so an unknown role is reported as a
/// validation error instead of a body rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub role: Role,
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("owner".parse::<Role>(), Ok(Role::Owner));
        assert_eq!("receptionist".parse::<Role>(), Ok(Role::Receptionist));
        assert_eq!(
            "Owner".parse::<Role>(),
            Err(UnknownRole("Owner".to_string()))
        );
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Owner).unwrap(), "\"owner\"");
        let role: Role = serde_json::from_str("\"receptionist\"").unwrap();
        assert_eq!(role, Role::Receptionist);
    }

    #[test]
    fn test_login_response_shape() {
        let resp = LoginResponse {
            message: "Login successful".to_string(),
            role: Role::Owner,
            token: "t".to_string(),
            expires_in: 3600,
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["role"], "owner");
        assert_eq!(value["expiresIn"], 3600);
    }
}
