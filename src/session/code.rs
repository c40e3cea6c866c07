//! Room codes.
//!
//! Short codes players type to find a room. The alphabet leaves out
//! characters that are easy to confuse when read aloud or handwritten
//! (0/O, 1/I/L).

use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::CodeError;

/// Characters a room code may contain.
pub const ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Default code length.
pub const DEFAULT_CODE_LENGTH: usize = 5;

/// A validated, upper-case room code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Generate a random code of `length` characters.
    #[must_use]
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, length: usize) -> Self {
        let code = (0..length)
            .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
            .collect();
        Self(code)
    }

    /// Parse user input with the default length.
    pub fn parse(input: &str) -> Result<Self, CodeError> {
        Self::parse_with_length(input, DEFAULT_CODE_LENGTH)
    }

    /// Parse user input: trims, upper-cases, then checks length and charset.
    pub fn parse_with_length(input: &str, length: usize) -> Result<Self, CodeError> {
        let normalized = input.trim().to_ascii_uppercase();

        let actual = normalized.chars().count();
        if actual != length {
            return Err(CodeError::Length { expected: length, actual });
        }
        if let Some(bad) = normalized.chars().find(|c| !c.is_ascii() || !ALPHABET.contains(&(*c as u8))) {
            return Err(CodeError::Charset(bad));
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RoomCode {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
