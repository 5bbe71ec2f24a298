//! `stockroom-auth` — identity domain and credential/token services.
//!
//! This crate is intentionally decoupled from HTTP and storage: entities for
//! users, roles, assignments, and refresh tokens, plus the pure credential
//! (argon2) and token (HS256 JWT + opaque refresh values) services the auth
//! flows compose.

pub mod claims;
pub mod password;
pub mod policy;
pub mod refresh;
pub mod roles;
pub mod token;
pub mod user;

pub use claims::AccessClaims;
pub use password::{CredentialError, MIN_PASSWORD_LENGTH, hash_password, verify_password};
pub use refresh::{RefreshToken, RefreshTokenId, TokenState};
pub use roles::{AssignmentId, BUILT_IN_ROLES, OWNER, Role, RoleAssignment, RoleId};
pub use token::{IssuedAccess, TokenConfig, TokenError, TokenService};
pub use user::{User, UserId, normalize_email};
