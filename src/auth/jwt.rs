use chrono::{Utc, Duration};
use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey, Algorithm};
use serde::{Serialize, Deserialize};
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub role_id: i16,
    pub clinic_id: i64,
    pub exp: usize,
    pub iat: usize,
    pub full_name: String,
}

pub fn sign_token(
    user_id: i64,
    role_id: i16,
    clinic_id: i64,
    full_name: &str,
    secret: &str,
) -> Result<String, AppError> {
    let now = Utc::now();
    let exp = now + Duration::hours(8);
    let claims = Claims {
        sub: user_id,
        role_id,
        clinic_id,
        iat: now.timestamp() as usize,
        exp: exp.timestamp() as usize,
        full_name: full_name.to_string(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AppError::internal(format!("Token signing failed: {e}")))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256)
    )
    .map(|d| d.claims)
    .map_err(|e| AppError::validation(format!("Invalid or expired token: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_round_trip() {
        let token = sign_token(12, 3, 4, "Dr. Ayu", "test-secret").unwrap();
        let claims = verify_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, 12);
        assert_eq!(claims.role_id, 3);
        assert_eq!(claims.clinic_id, 4);
        assert_eq!(claims.full_name, "Dr. Ayu");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = sign_token(1, 1, 1, "Owner", "secret-a").unwrap();
        assert!(verify_token(&token, "secret-b").is_err());
    }
}
