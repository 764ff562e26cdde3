//! Authentication: HS256 JWTs for identity, argon2id for stored passwords,
//! and an extractor that turns a bearer access token into the acting user.

mod extractor;
mod jwt;
mod password;

pub use extractor::{CurrentUser, bearer_token};
pub use jwt::{JwtService, TokenError, TokenKind};
pub use password::{PasswordError, hash_password_blocking, verify_password_blocking};
