//! One-time account tokens.
//!
//! A user carries at most one outstanding token at a time. The same slot
//! backs both email confirmation and password reset; whichever flow
//! consumes the token clears it.

use rand::RngCore;

/// Length of a generated token in bytes before hex encoding.
const TOKEN_BYTES: usize = 16;

/// Generates a one-time token for email confirmation or password reset.
///
/// Uses the thread-local CSPRNG; the result is 32 lowercase hex chars,
/// URL-safe for inclusion in emailed links.
///
/// # Example
///
/// ```
/// use taskhive_shared::auth::token::generate_one_time_token;
///
/// let token = generate_one_time_token();
/// assert_eq!(token.len(), 32);
/// assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
pub fn generate_one_time_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_length() {
        let token = generate_one_time_token();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = generate_one_time_token();
        let b = generate_one_time_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_token_is_lowercase_hex() {
        let token = generate_one_time_token();
        assert!(token
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}
