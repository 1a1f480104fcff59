use crate::config::app_config;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    // Audience, `user:<id>` for user tokens
    pub aud: String,
    // Issued at (as UTC timestamp)
    pub iat: usize,
    // Issuer
    pub iss: String,
    // Subject (whom token refers to)
    pub sub: String,
    // Expiration time (as UTC timestamp, validate_exp defaults to true in validation).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>,
}

impl Default for Claims {
    fn default() -> Claims {
        let now = Utc::now();

        Claims {
            aud: String::from("dealership users"),
            iat: now.timestamp() as usize,
            iss: String::from("dealership API"),
            sub: String::from("dealership API token"),
            exp: None,
        }
    }
}

impl Claims {
    /// claims for a token that authenticates a user for a day
    pub fn for_user(user_id: i32) -> Claims {
        let mut claims = Claims {
            aud: format!("user:{}", user_id),
            sub: String::from("user access token"),
            ..Default::default()
        };

        claims.set_expiration_in(Duration::days(1));
        claims
    }

    /// sets the claims `iat` (issued at) to the current time, and the `exp` to now + duration
    pub fn set_expiration_in(&mut self, duration: Duration) -> &Self {
        let now = Utc::now();

        self.exp = Some((now + duration).timestamp() as usize);
        self.iat = now.timestamp() as usize;

        self
    }

    /// the user id of a token created with `for_user`
    pub fn user_id(&self) -> Option<i32> {
        self.aud.strip_prefix("user:")?.parse().ok()
    }
}

pub fn encode(claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(app_config().jwt_secret.as_ref()),
    )
}

pub fn decode(jwt: &str) -> Result<TokenData<Claims>, jsonwebtoken::errors::Error> {
    jsonwebtoken::decode::<Claims>(
        jwt,
        &DecodingKey::from_secret(app_config().jwt_secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_token_round_trip() {
        let token = encode(&Claims::for_user(7)).unwrap();
        let decoded = decode(&token).unwrap();

        assert_eq!(decoded.claims.user_id(), Some(7));
        assert!(decoded.claims.exp.is_some());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let mut claims = Claims::for_user(7);
        claims.set_expiration_in(Duration::days(-2));

        let token = encode(&claims).unwrap();
        assert!(decode(&token).is_err());
    }

    #[test]
    fn only_user_audiences_have_ids() {
        let claims = Claims::default();
        assert_eq!(claims.user_id(), None);
    }
}
