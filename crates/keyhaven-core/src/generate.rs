//! Random password generation.
//!
//! Generated passwords go straight into the vault as real secrets, so index
//! selection draws from the OS CSPRNG — never a general-purpose PRNG.

use rand::Rng;
use rand::rngs::OsRng;

use crate::error::GenerateError;

/// Default generated length.
pub const DEFAULT_LENGTH: usize = 16;

/// Minimum accepted length.
pub const MIN_LENGTH: usize = 1;

/// Maximum accepted length.
pub const MAX_LENGTH: usize = 256;

/// Default alphabet: mixed-case letters, digits, and symbols.
pub const DEFAULT_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()_-+=<>?";

/// Generate a random password of `length` characters drawn uniformly from
/// `alphabet`.
///
/// # Errors
///
/// Returns [`GenerateError::InvalidLength`] for a length outside
/// `MIN_LENGTH..=MAX_LENGTH` and [`GenerateError::EmptyAlphabet`] for an
/// empty alphabet.
pub fn generate(length: usize, alphabet: &str) -> Result<String, GenerateError> {
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        return Err(GenerateError::InvalidLength {
            requested: length,
            min: MIN_LENGTH,
            max: MAX_LENGTH,
        });
    }

    let chars: Vec<char> = alphabet.chars().collect();
    if chars.is_empty() {
        return Err(GenerateError::EmptyAlphabet);
    }

    let mut rng = OsRng;
    let password = (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..chars.len());
            chars[idx]
        })
        .collect();

    Ok(password)
}
