//! Round-robin turn and role rotation over the roster.
//!
//! Rotation follows roster (join) order, wraps cyclically, and skips players
//! that are currently disconnected. Only ids present in the roster can be
//! returned, so a removed player is never selected.

use im::Vector;

use super::player::{Player, PlayerId};

/// Get the next connected player after `current` in roster order.
///
/// - `current == None`, or an id no longer in the roster: starts from the
///   beginning of the roster.
/// - `current` itself is eligible again only after every other player was
///   skipped (a lone connected player keeps the role).
///
/// Returns `None` if no player is connected.
#[must_use]
pub fn get_next_in_rotation(players: &Vector<Player>, current: Option<&PlayerId>) -> Option<PlayerId> {
    let count = players.len();
    if count == 0 {
        return None;
    }

    let start = current
        .and_then(|id| players.iter().position(|p| &p.id == id))
        .map_or(0, |pos| pos + 1);

    (0..count)
        .map(|offset| &players[(start + offset) % count])
        .find(|p| p.is_connected())
        .map(|p| p.id.clone())
}

/// Move the lead role to the next connected player after `current`.
///
/// Clears the lead flag on everyone else. Returns the updated roster and the
/// new lead, which is `None` when nobody is connected.
#[must_use]
pub fn assign_new_lead(
    players: &Vector<Player>,
    current: Option<&PlayerId>,
) -> (Vector<Player>, Option<PlayerId>) {
    let next = get_next_in_rotation(players, current);

    let updated = players
        .iter()
        .map(|p| {
            let mut p = p.clone();
            p.is_lead = next.as_ref() == Some(&p.id);
            p
        })
        .collect();

    (updated, next)
}
