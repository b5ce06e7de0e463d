//! Caller identity primitives.
//!
//! Identity is supplied by an external provider; the domain only needs an
//! opaque, non-blank owner identifier to scope records, plus the credential
//! pair accepted by the development login endpoint.

use std::fmt;

use zeroize::Zeroizing;

/// Validation failures for identity values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityValidationError {
    /// The owner identifier was blank.
    #[error("owner id must not be empty")]
    EmptyOwnerId,
    /// The owner identifier exceeded [`OwnerId::MAX_LEN`] bytes.
    #[error("owner id must be at most {max} bytes")]
    OwnerIdTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Opaque identifier of the authenticated caller owning records.
///
/// # Examples
/// ```
/// use finlens::domain::OwnerId;
///
/// let owner = OwnerId::new("  user-42 ").expect("valid owner");
/// assert_eq!(owner.as_str(), "user-42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(String);

impl OwnerId {
    /// Upper bound on identifier length; identity providers issue short ids.
    pub const MAX_LEN: usize = 255;

    /// Validate and construct an owner identifier. Surrounding whitespace is
    /// trimmed.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, IdentityValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IdentityValidationError::EmptyOwnerId);
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(IdentityValidationError::OwnerIdTooLong { max: Self::MAX_LEN });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for OwnerId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated login credentials.
///
/// The username is trimmed; the password keeps caller whitespace and is wiped
/// from memory on drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, IdentityValidationError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(IdentityValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(IdentityValidationError::EmptyPassword);
        }
        Ok(Self {
            username: username.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username used for account lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
