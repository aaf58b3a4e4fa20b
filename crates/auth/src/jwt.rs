use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::claims::{validate_claims, JwtClaims, TokenValidationError};

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("token could not be decoded: {0}")]
    Decode(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Token verification boundary.
///
/// Implementations decode + verify the signature and hand back claims;
/// time-window validation is shared and deterministic.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// HMAC-SHA256 validator over a shared secret.
pub struct Hs256JwtValidator {
    decoding: DecodingKey,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_ref()),
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        // The time window lives in our own claims (issued_at/expires_at),
        // so the library's registered-claim checks are switched off and
        // `validate_claims` is authoritative.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &validation)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};
    use stockmaster_core::UserId;

    use crate::Role;

    fn mint(secret: &str, claims: &JwtClaims) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("failed to encode jwt")
    }

    fn test_claims(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(),
            role: Role::manager(),
            assigned_warehouse: None,
            issued_at: now,
            expires_at: now + Duration::minutes(10),
        }
    }

    #[test]
    fn round_trips_valid_token() {
        let now = Utc::now();
        let claims = test_claims(now);
        let token = mint("secret", &claims);

        let validator = Hs256JwtValidator::new("secret");
        let decoded = validator.validate(&token, now).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn rejects_wrong_secret() {
        let now = Utc::now();
        let token = mint("secret", &test_claims(now));

        let validator = Hs256JwtValidator::new("other-secret");
        assert!(matches!(
            validator.validate(&token, now),
            Err(JwtError::Decode(_))
        ));
    }

    #[test]
    fn rejects_expired_token() {
        let now = Utc::now();
        let token = mint("secret", &test_claims(now - Duration::hours(1)));

        let validator = Hs256JwtValidator::new("secret");
        assert!(matches!(
            validator.validate(&token, now),
            Err(JwtError::Claims(TokenValidationError::Expired))
        ));
    }
}
