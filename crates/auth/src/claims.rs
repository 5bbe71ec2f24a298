//! Access token claims.

use serde::{Deserialize, Serialize};

use stockroom_core::TenantId;

use crate::user::UserId;

/// Claims embedded in every signed access token.
///
/// `sub` is the user, `tenant` the tenant the token authenticates for, and
/// `roles` the role names granted within that tenant at issue time.
/// Timestamps are Unix seconds, as JWT requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: UserId,
    pub email: String,
    pub tenant: TenantId,
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

impl AccessClaims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_jwt_claim_names() {
        let claims = AccessClaims {
            sub: UserId::new(),
            email: "o@x.com".into(),
            tenant: TenantId::new(),
            roles: vec!["Owner".into()],
            iat: 1_700_000_000,
            exp: 1_700_001_800,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["sub"], claims.sub.to_string());
        assert_eq!(json["tenant"], claims.tenant.to_string());
        assert_eq!(json["roles"][0], "Owner");
    }

    #[test]
    fn role_lookup_is_exact() {
        let claims = AccessClaims {
            sub: UserId::new(),
            email: "o@x.com".into(),
            tenant: TenantId::new(),
            roles: vec!["Owner".into()],
            iat: 0,
            exp: 0,
        };
        assert!(claims.has_role("Owner"));
        assert!(!claims.has_role("owner"));
        assert!(!claims.has_role("Admin"));
    }
}
