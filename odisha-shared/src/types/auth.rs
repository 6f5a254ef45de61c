use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roles stored in `user_roles`. Travellers and hosts are plain users;
/// admins curate content and oversee stays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::User, Self::Admin]
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown role: {s}"))
    }
}

/// Access token claims. `jti` identifies the session the token was issued for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

impl Claims {
    pub fn new(user_id: Uuid, role: UserRole, ttl_secs: i64) -> Self {
        let issued_at = Utc::now().timestamp();
        Self {
            sub: user_id,
            role,
            iat: issued_at,
            exp: issued_at + ttl_secs,
            jti: Uuid::now_v7(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.exp < Utc::now().timestamp()
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

/// Caller identity resolved from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: UserRole,
    pub token_id: Uuid,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

impl From<Claims> for AuthUser {
    fn from(Claims { sub, role, jti, .. }: Claims) -> Self {
        Self { id: sub, role, token_id: jti }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

impl TokenPair {
    pub fn new(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            token_type: "Bearer".into(),
            access_token,
            refresh_token,
            expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names() {
        assert_eq!("ADMIN".parse::<UserRole>(), Ok(UserRole::Admin));
        assert_eq!(" user ".parse::<UserRole>(), Ok(UserRole::User));
        assert!("host".parse::<UserRole>().is_err());
        assert_eq!(UserRole::default().to_string(), "user");
    }

    #[test]
    fn claims_expiry() {
        let live = Claims::new(Uuid::now_v7(), UserRole::User, 60);
        assert!(!live.is_expired());
        assert!(!live.is_admin());

        let stale = Claims::new(Uuid::now_v7(), UserRole::Admin, -60);
        assert!(stale.is_expired());
        assert!(AuthUser::from(stale).is_admin());
    }
}
