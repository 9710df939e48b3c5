//! # AdInvoice Security
//! 
//! Security utilities: bearer tokens and password hashing.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtError, JwtService, TokenSubject};
pub use password::PasswordService;
