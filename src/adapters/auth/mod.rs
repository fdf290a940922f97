//! Authentication adapters.
//!
//! Implementations of the `TokenValidator` port:
//!
//! - `jwt` - HS256-signed JWTs with optional issuer and audience checks
//! - `static_tokens` - Fixed allow-list, also handy in tests

mod jwt;
mod static_tokens;

pub use jwt::JwtTokenValidator;
pub use static_tokens::StaticTokenValidator;
