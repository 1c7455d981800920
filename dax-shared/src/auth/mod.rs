/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: Access/refresh token issue and validation
/// - [`middleware`]: Bearer-token request authentication and [`middleware::AuthContext`]
///
/// Access control is a single policy: the caller must be authenticated.
/// Vault ownership and contributor rows are stored but never consulted.

pub mod jwt;
pub mod middleware;
pub mod password;
