//! Built-in games.
//!
//! Each game is a `GameDefinition` plus the content packs it ships with.
//!
//! - `cah`: Prompt/response party game with a rotating judge

pub mod cah;

pub use cah::{builtin_packs, cah_definition, shared_definition};
