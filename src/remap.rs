use ndarray::{Array1, ArrayView1};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::PrepError;

/// Explicit old-id -> rank mapping for sessions whose raw gesture ids follow a
/// sparse numbering scheme. The remapped id is `running_max + rank`, so the
/// table lands its ids on the contiguous range immediately after the ids the
/// earlier sessions already used.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapTable {
    entries: Vec<(i8, i8)>,
}

impl RemapTable {
    pub fn new(entries: &[(i8, i8)]) -> Self {
        Self {
            entries: entries.to_vec(),
        }
    }

    /// Remapped id for `old` given the highest id already in use, or `None`
    /// when the table has no entry for `old`.
    pub fn target(&self, old: i8, running_max: i8) -> Option<i32> {
        self.entries
            .iter()
            .find(|(from, _)| *from == old)
            .map(|(_, rank)| running_max as i32 + *rank as i32)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Force-exercise stimulus table shared by the DB2/DB3 final session, where the
/// raw ids are {1,2,4,6,8,9,16,32,40}. With 40 gestures already numbered this
/// reproduces the published 41..=49 ids.
pub static SPARSE_FORCE_TABLE: Lazy<RemapTable> = Lazy::new(|| {
    RemapTable::new(&[
        (1, 1),
        (2, 2),
        (4, 3),
        (6, 4),
        (8, 5),
        (9, 6),
        (16, 7),
        (32, 8),
        (40, 9),
    ])
});

/// How one session's movement ids are folded into the subject-wide numbering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemapRule {
    /// Ids already continue the numbering of earlier sessions.
    Identity,
    /// Offset every nonzero id by the running maximum of earlier sessions.
    Offset,
    /// Route nonzero ids through an explicit table (see [`RemapTable`]).
    Table(RemapTable),
}

/// Remap one session's movement stream. Rest (label 0) is never touched.
///
/// `running_max` is the highest movement id used by the sessions concatenated
/// so far; any remapped id that would leave the `i8` label range is an error,
/// never a silent wraparound.
pub fn remap_session(
    moves: ArrayView1<i8>,
    rule: &RemapRule,
    running_max: i8,
) -> Result<Array1<i8>, PrepError> {
    let mut out = Array1::zeros(moves.len());
    for (slot, &old) in out.iter_mut().zip(moves.iter()) {
        if old == 0 {
            continue;
        }
        let new = match rule {
            RemapRule::Identity => old as i32,
            RemapRule::Offset => old as i32 + running_max as i32,
            RemapRule::Table(table) => table
                .target(old, running_max)
                .ok_or(PrepError::UnmappedLabel(old))?,
        };
        if new > i8::MAX as i32 {
            return Err(PrepError::LabelOverflow(new));
        }
        *slot = new as i8;
    }
    Ok(out)
}
