use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use odisha_shared::errors::AppError;
use odisha_shared::middleware::sign_claims;
use odisha_shared::types::auth::{Claims, TokenPair, UserRole};

pub fn create_refresh_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// Refresh tokens are stored as SHA-256 hex digests only.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Returns the pair handed to the client and the hash of its refresh token.
pub fn create_token_pair(
    user_id: Uuid,
    role: UserRole,
    secret: &str,
    access_ttl: i64,
) -> Result<(TokenPair, String), AppError> {
    let access_token = sign_claims(&Claims::new(user_id, role, access_ttl), secret)?;
    let refresh_token = create_refresh_token();
    let refresh_hash = hash_token(&refresh_token);
    Ok((TokenPair::new(access_token, refresh_token, access_ttl), refresh_hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use odisha_shared::middleware::validate_jwt;

    #[test]
    fn pair_carries_role_and_hash() {
        let user = Uuid::now_v7();
        let (pair, hash) = create_token_pair(user, UserRole::Admin, "secret", 900).unwrap();

        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 900);
        assert_eq!(hash, hash_token(&pair.refresh_token));
        assert_eq!(pair.refresh_token.len(), 64);

        let claims = validate_jwt(&pair.access_token, "secret").unwrap();
        assert_eq!(claims.sub, user);
        assert!(claims.is_admin());
    }

    #[test]
    fn refresh_tokens_are_random() {
        assert_ne!(create_refresh_token(), create_refresh_token());
    }
}
