//! Driving port for login.
//!
//! Real identity lives with an external provider; this port lets the HTTP
//! adapter establish a session without knowing where accounts come from.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, OwnerId};

/// Domain use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the caller's owner id.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<OwnerId, Error>;
}

/// Development accounts accepted by [`FixtureLoginService`], as
/// `(username, owner id)`. All share [`FIXTURE_PASSWORD`].
pub const FIXTURE_ACCOUNTS: [(&str, &str); 2] = [
    ("admin", "123e4567-e89b-12d3-a456-426614174000"),
    ("auditor", "9b2f1c4e-0d7a-4a5e-8f3b-2c6d9e1a7b50"),
];

/// Password shared by the development accounts.
pub const FIXTURE_PASSWORD: &str = "password";

/// In-memory authenticator standing in for the identity provider.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<OwnerId, Error> {
        let account = FIXTURE_ACCOUNTS
            .iter()
            .find(|(username, _)| *username == credentials.username());
        match account {
            Some((_, owner)) if credentials.password() == FIXTURE_PASSWORD => OwnerId::new(owner)
                .map_err(|err| Error::internal(format!("invalid fixture owner id: {err}"))),
            _ => Err(Error::unauthorized("invalid credentials")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("admin", "password", Some("123e4567-e89b-12d3-a456-426614174000"))]
    #[case("auditor", "password", Some("9b2f1c4e-0d7a-4a5e-8f3b-2c6d9e1a7b50"))]
    #[case("admin", "wrong", None)]
    #[case("other", "password", None)]
    #[tokio::test]
    async fn fixture_accounts_authenticate(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: Option<&str>,
    ) {
        let creds =
            LoginCredentials::try_from_parts(username, password).expect("credentials shape");
        let result = FixtureLoginService.authenticate(&creds).await;
        match (expected, result) {
            (Some(owner), Ok(id)) => assert_eq!(id.as_ref(), owner),
            (None, Err(err)) => assert_eq!(err.code(), ErrorCode::Unauthorized),
            (expected, result) => panic!("expected {expected:?}, got {result:?}"),
        }
    }
}
