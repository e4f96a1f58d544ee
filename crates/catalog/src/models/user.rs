//! User domain types.
//!
//! The stored credential is always an Argon2id digest, never plaintext; the
//! user repository hashes at creation and on password change only.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use orchard_core::{AddressKind, Email, OrderId, PhoneNumber, ProductId, UserId, UserRole};

use crate::credential::{self, CredentialError};
use crate::validate::{Validate, ValidationErrors, check_str_len};

/// Personal details embedded in a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<PhoneNumber>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

impl UserProfile {
    fn validate_into(&self, errors: &mut ValidationErrors) {
        check_str_len(&mut *errors, "profile.first_name", &self.first_name, 1, 50);
        check_str_len(&mut *errors, "profile.last_name", &self.last_name, 1, 50);
    }
}

impl Validate for UserProfile {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.validate_into(&mut errors);
        errors.into_result()
    }
}

/// A saved address on a user's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAddress {
    pub kind: AddressKind,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Validate for UserAddress {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.validate_into(&mut errors, "address");
        errors.into_result()
    }
}

impl UserAddress {
    fn validate_into(&self, errors: &mut ValidationErrors, prefix: &str) {
        for (field, value) in [
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zip_code", &self.zip_code),
            ("country", &self.country),
        ] {
            if value.trim().is_empty() {
                errors.push(format!("{prefix}.{field}"), format!("{field} is required"));
            }
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique login email.
    pub email: Email,
    /// Argon2id digest of the password. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Personal details.
    pub profile: UserProfile,
    /// Saved addresses.
    pub addresses: Vec<UserAddress>,
    /// Orders this user has placed.
    pub order_history: Vec<OrderId>,
    /// Products saved for later.
    pub wishlist: Vec<ProductId>,
    /// Whether the account is active.
    pub is_active: bool,
    /// Permission role.
    pub role: UserRole,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check a candidate password against the stored digest.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::MalformedHash` if the stored digest is
    /// unusable; a plain mismatch is `Ok(false)`.
    pub fn verify_password(&self, candidate: &str) -> Result<bool, CredentialError> {
        credential::verify_password(candidate, &self.password_hash)
    }
}

/// Input for registering a user. Carries the plaintext password; the
/// repository hashes it before the row is written.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct NewUser {
    pub email: Email,
    pub password: String,
    pub profile: UserProfile,
    pub addresses: Vec<UserAddress>,
    pub role: UserRole,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("profile", &self.profile)
            .field("addresses", &self.addresses)
            .field("role", &self.role)
            .finish()
    }
}

impl NewUser {
    /// Create input with defaults.
    #[must_use]
    pub fn new(email: Email, password: impl Into<String>, profile: UserProfile) -> Self {
        Self {
            email,
            password: password.into(),
            profile,
            addresses: Vec::new(),
            role: UserRole::Customer,
        }
    }
}

impl Validate for NewUser {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        self.profile.validate_into(&mut errors);
        for (i, address) in self.addresses.iter().enumerate() {
            address.validate_into(&mut errors, &format!("addresses[{i}]"));
        }

        errors.into_result()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            phone_number: None,
            date_of_birth: None,
        }
    }

    #[test]
    fn test_validate_ok() {
        let new = NewUser::new(
            Email::parse("ada@example.com").unwrap(),
            "analytical-engine",
            profile(),
        );
        assert!(new.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_names() {
        let mut new = NewUser::new(
            Email::parse("ada@example.com").unwrap(),
            "analytical-engine",
            profile(),
        );
        new.profile.first_name = String::new();
        let err = new.validate().unwrap_err();
        assert_eq!(err.errors()[0].field, "profile.first_name");
    }

    #[test]
    fn test_validate_rejects_blank_address() {
        let mut new = NewUser::new(
            Email::parse("ada@example.com").unwrap(),
            "analytical-engine",
            profile(),
        );
        new.addresses.push(UserAddress {
            kind: AddressKind::Home,
            street: String::new(),
            city: "London".to_owned(),
            state: "LDN".to_owned(),
            zip_code: "E1".to_owned(),
            country: "UK".to_owned(),
            is_default: true,
        });
        let err = new.validate().unwrap_err();
        assert_eq!(err.errors()[0].field, "addresses[0].street");
    }

    #[test]
    fn test_verify_password_against_stored_digest() {
        let digest = credential::hash_password("analytical-engine").unwrap();
        let user = User {
            id: UserId::new(1),
            email: Email::parse("ada@example.com").unwrap(),
            password_hash: digest,
            profile: profile(),
            addresses: Vec::new(),
            order_history: Vec::new(),
            wishlist: Vec::new(),
            is_active: true,
            role: UserRole::Customer,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(user.verify_password("analytical-engine").unwrap());
        assert!(!user.verify_password("difference-engine").unwrap());
    }
}
