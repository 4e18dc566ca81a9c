//! Signed access tokens.
//!
//! Tokens are compact HS256 JWTs keyed by the calling application's secret.
//! The claim names and types below are a public wire contract: downstream
//! verifiers validate against them.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use keygate_core::{App, User};

/// Claims carried by every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject user id.
    pub uid: i64,

    /// Subject email.
    pub email: String,

    /// Application the token was issued for.
    pub app_id: i32,

    /// Absolute expiry, seconds since the Unix epoch.
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("application {0} has an empty signing secret")]
    EmptySecret(i32),

    #[error("token expiry overflows the representable time range")]
    ExpiryOutOfRange,

    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

impl TokenClaims {
    /// Bind `user` to `app` with expiry `now + ttl`.
    pub fn new(user: &User, app: &App, ttl: Duration, now: DateTime<Utc>) -> Result<Self, TokenError> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(TokenError::ExpiryOutOfRange)?;

        Ok(Self {
            uid: user.id.get(),
            email: user.email.clone(),
            app_id: app.id.get(),
            exp: expires_at.timestamp(),
        })
    }
}

/// Build and sign a token for `user` scoped to `app`.
pub fn issue(user: &User, app: &App, ttl: Duration, now: DateTime<Utc>) -> Result<String, TokenError> {
    if app.secret.is_empty() {
        return Err(TokenError::EmptySecret(app.id.get()));
    }

    let claims = TokenClaims::new(user, app, ttl, now)?;

    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(app.secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation};
    use keygate_core::{AppId, UserId};
    use proptest::prelude::*;

    fn user(id: i64, email: &str) -> User {
        User {
            id: UserId::new(id),
            email: email.to_string(),
            password_hash: Vec::new(),
        }
    }

    fn decode(token: &str, secret: &str) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Fixed test instants may lie in the past.
        validation.validate_exp = false;
        jsonwebtoken::decode::<TokenClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
            .map(|data| data.claims)
    }

    #[test]
    fn token_is_three_url_safe_segments() {
        let app = App::new(AppId::new(1), "console", "test-secret");
        let token = issue(&user(1, "a@x.com"), &app, Duration::hours(1), Utc::now()).unwrap();

        let segments: Vec<&str> = token.split('.').collect();
        assert_eq!(segments.len(), 3);
        for s in segments {
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }

    #[test]
    fn claims_bind_user_and_application() {
        let app = App::new(AppId::new(1), "console", "test-secret");
        let now = Utc::now();
        let token = issue(&user(1, "a@x.com"), &app, Duration::minutes(30), now).unwrap();

        let claims = decode(&token, "test-secret").unwrap();
        assert_eq!(
            claims,
            TokenClaims {
                uid: 1,
                email: "a@x.com".to_string(),
                app_id: 1,
                exp: (now + Duration::minutes(30)).timestamp(),
            }
        );
    }

    #[test]
    fn wire_claim_names_are_stable() {
        let app = App::new(AppId::new(3), "billing", "k");
        let claims = TokenClaims::new(&user(9, "b@x.com"), &app, Duration::seconds(10), DateTime::from_timestamp(0, 0).unwrap())
            .unwrap();
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "uid": 9, "email": "b@x.com", "app_id": 3, "exp": 10 })
        );
    }

    #[test]
    fn token_is_tied_to_the_application_secret() {
        let app = App::new(AppId::new(1), "console", "secret-one");
        let token = issue(&user(1, "a@x.com"), &app, Duration::hours(1), Utc::now()).unwrap();

        assert!(decode(&token, "secret-one").is_ok());
        assert!(decode(&token, "secret-two").is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        let app = App::new(AppId::new(4), "broken", "");
        let err = issue(&user(1, "a@x.com"), &app, Duration::hours(1), Utc::now()).unwrap_err();
        assert!(matches!(err, TokenError::EmptySecret(4)));
    }

    #[test]
    fn expiry_overflow_is_reported() {
        let app = App::new(AppId::new(1), "console", "k");
        let err = TokenClaims::new(&user(1, "a@x.com"), &app, Duration::seconds(i64::MAX / 1000), Utc::now()).unwrap_err();
        assert!(matches!(err, TokenError::ExpiryOutOfRange));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: exp is always issue time plus ttl, and the claims
        /// round-trip through the signed token unchanged.
        #[test]
        fn expiry_is_issue_time_plus_ttl(
            uid in 1i64..i64::MAX,
            app_id in 1i32..i32::MAX,
            issued_at in 0i64..4_000_000_000i64,
            ttl_secs in 1i64..31_536_000i64,
        ) {
            let now = DateTime::from_timestamp(issued_at, 0).unwrap();
            let app = App::new(AppId::new(app_id), "tenant", "prop-secret");
            let token = issue(&user(uid, "p@x.com"), &app, Duration::seconds(ttl_secs), now).unwrap();

            let claims = decode(&token, "prop-secret").unwrap();
            prop_assert_eq!(claims.exp, issued_at + ttl_secs);
            prop_assert_eq!(claims.uid, uid);
            prop_assert_eq!(claims.app_id, app_id);
        }
    }
}
