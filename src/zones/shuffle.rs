//! Shuffling over any `rand` generator.

use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffle a slice in place (Fisher-Yates).
///
/// Generic over the generator so game state passes its seeded `GameRng`
/// and tests can pass a mock.
pub fn shuffle<T, R: Rng + ?Sized>(slice: &mut [T], rng: &mut R) {
    slice.shuffle(rng);
}
