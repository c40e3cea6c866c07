//! Card system: card text, packs, and registry.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for one physical card
//! - `CardKind`: Prompt (with its pick count) or response
//! - `Card`: Static card data (kind, text, source pack)
//! - `CardPack`: A named bundle of cards
//! - `CardRegistry`: Lookup over the packs a room plays with
//!
//! Piles and hands only ever hold `CardId`s; text is resolved through the
//! registry when building player views.

pub mod card;
pub mod pack;
pub mod registry;

pub use card::{Card, CardId, CardKind, PackId};
pub use pack::{combine_packs, CardPack};
pub use registry::CardRegistry;
