//! Authentication and authorization utilities.
//!
//! # Modules
//!
//! - [`password`]: Argon2id password hashing and verification
//! - [`jwt`]: session token generation and validation
//! - [`token`]: one-time tokens for email confirmation and password reset
//! - [`authorization`]: the project-level access control evaluator
//! - [`middleware`]: the `AuthContext` carried through request extensions
//!
//! # Security Features
//!
//! - **Password hashing**: Argon2id with 64 MB memory, 3 iterations
//! - **Session tokens**: HS256-signed JWTs with a fixed 30-day validity
//! - **One-time tokens**: 128 bits from the OS CSPRNG, hex encoded
//!
//! # Example
//!
//! ```no_run
//! use taskhive_shared::auth::password::{hash_password, verify_password};
//! use taskhive_shared::auth::jwt::{create_token, Claims};
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Password authentication
//! let hash = hash_password("user_password")?;
//! assert!(verify_password("user_password", &hash)?);
//!
//! // Session issuance
//! let claims = Claims::new(Uuid::new_v4());
//! let session = create_token(&claims, "secret-key-at-least-32-bytes-long")?;
//! # Ok(())
//! # }
//! ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod token;
