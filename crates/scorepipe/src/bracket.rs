//! Top-8 bracket layout written to `bracket.json` for the overlay.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{ControllerError, Result};
use crate::scoreboard::to_pretty_json;

/// Overlay slot names, in the order phase group sets arrive when sorted
/// by round.
pub const SLOTS: [&str; 10] = [
    "lf", "ls", "lq1", "lq2", "ltop81", "ltop82", "ws2", "ws1", "wf", "gf",
];

/// Slot order within `bracket.json`: losers side from the top of the
/// bracket down, then winners side and grand final.
pub const FILE_ORDER: [&str; 10] = [
    "ltop82", "ltop81", "lq2", "lq1", "ls", "lf", "ws2", "ws1", "wf", "gf",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetSlot {
    pub name: String,
    pub score: String,
}

/// One set from a phase group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BracketSet {
    pub round: String,
    pub p1: SetSlot,
    pub p2: SetSlot,
}

/// Map the first ten sets onto the overlay slots.
///
/// Each slot gets four keys: `<slot>p1`, `<slot>p1s`, `<slot>p2`,
/// `<slot>p2s`, emitted in [`FILE_ORDER`]. Extra sets are ignored.
pub fn layout(sets: &[BracketSet]) -> Result<Map<String, Value>> {
    if sets.len() < SLOTS.len() {
        return Err(ControllerError::TooFewMatches(sets.len()));
    }

    let mut out = Map::new();
    for slot in FILE_ORDER {
        let Some(set) = SLOTS
            .iter()
            .position(|s| *s == slot)
            .and_then(|i| sets.get(i))
        else {
            continue;
        };
        out.insert(format!("{slot}p1"), Value::String(set.p1.name.clone()));
        out.insert(format!("{slot}p1s"), Value::String(set.p1.score.clone()));
        out.insert(format!("{slot}p2"), Value::String(set.p2.name.clone()));
        out.insert(format!("{slot}p2s"), Value::String(set.p2.score.clone()));
    }
    Ok(out)
}

/// Lay out `sets` and write them to `path`.
pub fn save(path: &Path, sets: &[BracketSet]) -> Result<()> {
    let layout = layout(sets)?;
    fs::write(path, to_pretty_json(&layout)?)?;
    tracing::debug!(path = %path.display(), sets = sets.len(), "bracket written");
    Ok(())
}
