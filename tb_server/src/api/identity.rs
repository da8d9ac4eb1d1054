//! Identity middleware bridging the external identity provider.
//!
//! Token issuance lives outside this system; the server only verifies the
//! provider's HS256 JWT and condenses its claims into a [`Caller`] that is
//! attached to every request. Requests without a valid token proceed as
//! anonymous callers, because the customer booking path is public; the
//! engine itself rejects staff-only operations.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use table_book::identity::Caller;

use super::AppState;

/// Claims carried by the identity provider's access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// User ID
    pub sub: i64,
    pub username: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Expiration timestamp
    pub exp: i64,
}

fn default_active() -> bool {
    true
}

impl From<IdentityClaims> for Caller {
    fn from(claims: IdentityClaims) -> Self {
        Caller {
            user_id: Some(claims.sub),
            username: Some(claims.username),
            is_staff: claims.is_staff,
            is_superuser: claims.is_superuser,
            is_active: claims.is_active,
        }
    }
}

/// Verify a provider token and build the caller it represents.
pub fn decode_caller(token: &str, secret: &str) -> Result<Caller, jsonwebtoken::errors::Error> {
    let data = decode::<IdentityClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims.into())
}

/// Middleware attaching a [`Caller`] extension to every request.
///
/// A missing, malformed, or expired token downgrades the request to
/// anonymous rather than rejecting it; authorization decisions belong to the
/// engine operations themselves.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let caller = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(|token| decode_caller(token, &state.identity_jwt_secret).ok())
        .unwrap_or_else(Caller::anonymous);

    request.extensions_mut().insert(caller);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &str = "test_secret_key_for_testing_only_32b";

    fn token_for(claims: &IdentityClaims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn staff_claims(exp: i64) -> IdentityClaims {
        IdentityClaims {
            sub: 42,
            username: "host".to_string(),
            is_staff: true,
            is_superuser: false,
            is_active: true,
            exp,
        }
    }

    #[test]
    fn valid_token_yields_staff_caller() {
        let exp = chrono::Utc::now().timestamp() + 600;
        let caller = decode_caller(&token_for(&staff_claims(exp)), SECRET).unwrap();
        assert_eq!(caller.user_id, Some(42));
        assert!(caller.can_manage());
    }

    #[test]
    fn expired_token_is_rejected() {
        let exp = chrono::Utc::now().timestamp() - 600;
        assert!(decode_caller(&token_for(&staff_claims(exp)), SECRET).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let exp = chrono::Utc::now().timestamp() + 600;
        let token = token_for(&staff_claims(exp));
        assert!(decode_caller(&token, "another_secret_of_sufficient_len").is_err());
    }

    #[test]
    fn inactive_claims_cannot_manage() {
        let exp = chrono::Utc::now().timestamp() + 600;
        let mut claims = staff_claims(exp);
        claims.is_active = false;
        let caller = decode_caller(&token_for(&claims), SECRET).unwrap();
        assert!(!caller.can_manage());
    }
}
