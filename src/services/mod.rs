pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{
    AuthError, AuthService, AuthenticatedAdmin, BootstrapOutcome, DEFAULT_ADMIN_PASSWORD,
    DEFAULT_ADMIN_USERNAME, LoginResult,
};
pub use auth_service_impl::CredentialAuthority;

pub mod password;
pub use password::PasswordHasher;

pub mod token;
pub use token::{Claims, IssuedToken, TokenError, TokenIssuer};
