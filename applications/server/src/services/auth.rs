/// Authentication service - JWT access tokens
use crate::error::{Result, ServerError};
use chrono::{Duration, Utc};
use dharma_core::{User, UserId};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct AuthService {
    secret: String,
    access_token_expiration: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
    pub admin: bool,
}

/// Identity carried by a verified access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenIdentity {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl AuthService {
    pub fn new(secret: String, access_expiration_hours: u64) -> Self {
        Self {
            secret,
            access_token_expiration: Duration::hours(access_expiration_hours as i64),
        }
    }

    /// Create an access token for `user`
    pub fn create_access_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let exp = now + self.access_token_expiration;

        let claims = Claims {
            sub: user.id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            admin: user.is_admin,
        };

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &encoding_key).map_err(ServerError::from)
    }

    /// Verify and decode a token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Verify an access token and return who it belongs to
    pub fn verify_access_token(&self, token: &str) -> Result<TokenIdentity> {
        let claims = self.verify_token(token)?;
        let user_id = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| ServerError::Auth("Invalid token subject".to_string()))?;

        Ok(TokenIdentity {
            user_id,
            is_admin: claims.admin,
        })
    }
}
