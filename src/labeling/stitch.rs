//! Stitching overlapping window predictions back into one sequence.
//!
//! Every flat token lies in one or more windows. The window that holds it
//! closest to its center wins, since models are least reliable near the edges
//! of what they see. Ties go to the earliest window.

use tracing::debug;

use super::types::{Assignment, LabelingError};
use super::window::Window;

/// For each flat index in `[0, n)`, the windows whose in-range part holds it,
/// in window order.
pub fn candidate_sets(windows: &[Window], n: usize) -> Vec<Vec<Window>> {
    let mut candidates = vec![Vec::new(); n];
    for window in windows {
        let start = window.begin.max(0) as usize;
        let stop = window.end.clamp(0, n as isize) as usize;
        for slot in candidates.iter_mut().take(stop).skip(start) {
            slot.push(*window);
        }
    }
    candidates
}

/// Pick the candidate that places `index` nearest its center. The first of
/// several equally good candidates wins.
pub fn resolve_index(index: usize, candidates: &[Window]) -> Option<Assignment> {
    let mut best: Option<&Window> = None;
    for window in candidates {
        match best {
            Some(current) if window.center_offset(index) >= current.center_offset(index) => {}
            _ => best = Some(window),
        }
    }
    best.map(|w| Assignment {
        sequence_number: w.sequence_number,
        position: w.position_of(index),
    })
}

/// Assign every flat index in `[0, n)` to exactly one window.
pub fn resolve(windows: &[Window], n: usize) -> Result<Vec<Assignment>, LabelingError> {
    let assignments = candidate_sets(windows, n)
        .iter()
        .enumerate()
        .map(|(index, candidates)| {
            resolve_index(index, candidates).ok_or(LabelingError::Uncovered { index })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        tokens = n,
        windows = windows.len(),
        "Resolved window assignments"
    );
    Ok(assignments)
}
