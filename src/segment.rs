use log::debug;
use ndarray::{s, Array1, ArrayView1};

use crate::error::PrepError;

/// Round half to even; block boundaries on exact .5 midpoints land on the
/// same sample as the published NinaPro region tables.
fn round_half_even(x: f64) -> usize {
    x.round_ties_even() as usize
}

/// Outcome of re-segmenting a subject recording into rest-move-rest blocks.
#[derive(Clone, Debug)]
pub struct Segmentation {
    /// Derived repetition label per sample; 0 marks unassigned samples.
    pub rep: Array1<i8>,
    /// Inclusive (start, end) sample bounds of each block, ascending.
    pub rep_regions: Vec<(usize, usize)>,
    /// Number of block boundaries shortened by the rest-length cap. Each
    /// over-cap rest region caps the tail of one block and the head of the
    /// next, so this counter moves in steps of two.
    pub nb_capped: usize,
}

/// Indices `i` where `moves[i] != moves[i + 1]`.
///
/// Rest and gesture labels alternate, so transitions come in
/// (into-gesture, back-to-rest) pairs.
pub fn movement_transitions(moves: ArrayView1<i8>) -> Vec<usize> {
    moves
        .iter()
        .zip(moves.iter().skip(1))
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(i, _)| i)
        .collect()
}

/// Re-derive clean repetition blocks from movement-label transitions.
///
/// The raw repetition stream is only consulted for its number of distinct
/// nonzero ids, which sets the cycle length of the assigned indices (the
/// dataset reuses repetition numbers across exercise sessions). Block
/// boundaries are the midpoints of the rest regions between gestures; rest
/// longer than `rest_length_cap_secs` on either side of a boundary is left
/// unassigned and counted in `nb_capped`.
pub fn segment_repetitions(
    moves: ArrayView1<i8>,
    raw_rep: ArrayView1<i8>,
    fs: f64,
    rest_length_cap_secs: f64,
) -> Result<Segmentation, PrepError> {
    if moves.len() != raw_rep.len() {
        return Err(PrepError::LengthMismatch {
            signal: moves.len(),
            labels: raw_rep.len(),
        });
    }
    let transitions = movement_transitions(moves);
    if transitions.is_empty() {
        return Err(PrepError::NoTransitions);
    }

    let nb_blocks = round_half_even(transitions.len() as f64 / 2.0);
    let cycle_len = {
        let mut ids: Vec<i8> = raw_rep.iter().copied().filter(|&r| r != 0).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len() as i8
    };
    let cap_samples = round_half_even(rest_length_cap_secs * fs);
    debug!(
        "segmenting {} samples: {} transitions, {} blocks, cycle length {}, cap {} samples",
        moves.len(),
        transitions.len(),
        nb_blocks,
        cycle_len,
        cap_samples
    );

    let mut rep = Array1::<i8>::zeros(moves.len());
    let mut rep_regions = Vec::with_capacity(nb_blocks);
    // The first block starts at the midpoint of the leading rest (uncapped).
    let mut last_end = round_half_even(transitions[0] as f64 / 2.0);
    let mut cur_rep: i8 = 1;
    let mut nb_capped = 0usize;

    for i in 0..nb_blocks.saturating_sub(1) {
        let rest_start = transitions[2 * i + 1];
        let rest_end = transitions[2 * i + 2];
        let midpoint = round_half_even((rest_start + rest_end) as f64 / 2.0) + 1;

        let trailing_rest = midpoint - rest_start;
        if trailing_rest <= cap_samples {
            rep.slice_mut(s![last_end..midpoint]).fill(cur_rep);
            rep_regions.push((last_end, midpoint - 1));
            last_end = midpoint;
        } else {
            // Cap the trailing rest of this block and the leading rest of the
            // next one; the excess stays unassigned.
            let rep_end = rest_start + cap_samples;
            rep.slice_mut(s![last_end..rep_end]).fill(cur_rep);
            rep_regions.push((last_end, rep_end - 1));
            last_end = rest_end - cap_samples;
            nb_capped += 2;
        }

        cur_rep += 1;
        if cur_rep > cycle_len {
            cur_rep = 1;
        }
    }

    let last_transition = transitions[transitions.len() - 1];
    let end_idx = round_half_even((moves.len() + last_transition) as f64 / 2.0);
    rep.slice_mut(s![last_end..end_idx]).fill(cur_rep);
    rep_regions.push((last_end, end_idx - 1));

    Ok(Segmentation {
        rep,
        rep_regions,
        nb_capped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    /// rest(4) move(4) rest(4) move(4) ... rest(4), with the given gesture ids.
    fn alternating_stream(gestures: &[i8]) -> Array1<i8> {
        let mut out = vec![0i8; 4];
        for &g in gestures {
            out.extend(std::iter::repeat(g).take(4));
            out.extend(std::iter::repeat(0).take(4));
        }
        Array1::from(out)
    }

    fn raw_reps(cycle: i8, len: usize) -> Array1<i8> {
        // Values 1..=cycle somewhere in the stream; positions are irrelevant,
        // only the distinct-id count matters.
        Array1::from_iter((0..len).map(|i| ((i % cycle as usize) + 1) as i8))
    }

    #[test]
    fn splits_at_rest_midpoints() {
        let moves = alternating_stream(&[1, 2]);
        let seg =
            segment_repetitions(moves.view(), raw_reps(2, moves.len()).view(), 1.0, 999.0).unwrap();
        assert_eq!(seg.rep_regions, vec![(2, 9), (10, 17)]);
        assert_eq!(seg.nb_capped, 0);
        assert_eq!(seg.rep[2], 1);
        assert_eq!(seg.rep[9], 1);
        assert_eq!(seg.rep[10], 2);
        assert_eq!(seg.rep[17], 2);
        // Leading and trailing rest halves stay unassigned.
        assert_eq!(seg.rep[0], 0);
        assert_eq!(seg.rep[19], 0);
    }

    #[test]
    fn odd_sum_rest_midpoint_rounds_half_to_even() {
        // rest(5) move(4) rest(5) move(4) rest(5): transitions at 4, 8, 13,
        // 17, so the inner rest midpoint is (8 + 13) / 2 = 10.5. Half to even
        // gives 10, putting the boundary at sample 11, not 12.
        let mut moves = vec![0i8; 5];
        moves.extend(std::iter::repeat(1i8).take(4));
        moves.extend(std::iter::repeat(0i8).take(5));
        moves.extend(std::iter::repeat(2i8).take(4));
        moves.extend(std::iter::repeat(0i8).take(5));
        let moves = Array1::from(moves);
        let seg =
            segment_repetitions(moves.view(), raw_reps(2, moves.len()).view(), 1.0, 999.0).unwrap();
        assert_eq!(seg.rep_regions, vec![(2, 10), (11, 19)]);
        assert_eq!(seg.rep[10], 1);
        assert_eq!(seg.rep[11], 2);
    }

    #[test]
    fn over_cap_rest_leaves_a_gap_and_counts_two() {
        let moves = alternating_stream(&[1, 2]);
        let seg =
            segment_repetitions(moves.view(), raw_reps(2, moves.len()).view(), 1.0, 1.0).unwrap();
        assert_eq!(seg.nb_capped, 2);
        assert_eq!(seg.rep_regions, vec![(2, 7), (10, 17)]);
        // Samples 8 and 9 are the discarded rest gap.
        assert_eq!(seg.rep[8], 0);
        assert_eq!(seg.rep[9], 0);
    }

    #[test]
    fn assigned_samples_equal_region_lengths() {
        for cap in [999.0, 1.0] {
            let moves = alternating_stream(&[1, 2, 3]);
            let seg = segment_repetitions(
                moves.view(),
                raw_reps(3, moves.len()).view(),
                1.0,
                cap,
            )
            .unwrap();
            let assigned = seg.rep.iter().filter(|&&r| r != 0).count();
            let covered: usize = seg
                .rep_regions
                .iter()
                .map(|&(start, end)| end - start + 1)
                .sum();
            assert_eq!(assigned, covered);
            assert_eq!(seg.nb_capped % 2, 0);
        }
    }

    #[test]
    fn regions_are_ascending_and_disjoint() {
        let moves = alternating_stream(&[1, 2, 3, 4]);
        let seg =
            segment_repetitions(moves.view(), raw_reps(4, moves.len()).view(), 1.0, 999.0).unwrap();
        for pair in seg.rep_regions.windows(2) {
            assert!(pair[0].1 < pair[1].0);
        }
    }

    #[test]
    fn repetition_indices_wrap_at_cycle_length() {
        let moves = alternating_stream(&[1, 2, 3, 4]);
        let seg =
            segment_repetitions(moves.view(), raw_reps(2, moves.len()).view(), 1.0, 999.0).unwrap();
        let labels: Vec<i8> = seg
            .rep_regions
            .iter()
            .map(|&(start, _)| seg.rep[start])
            .collect();
        assert_eq!(labels, vec![1, 2, 1, 2]);
        assert!(seg.rep.iter().all(|&r| r <= 2));
    }

    #[test]
    fn flat_stream_is_malformed() {
        let moves = Array1::<i8>::zeros(32);
        let reps = Array1::<i8>::zeros(32);
        assert!(matches!(
            segment_repetitions(moves.view(), reps.view(), 1.0, 999.0),
            Err(PrepError::NoTransitions)
        ));
    }

    #[test]
    fn mismatched_stream_lengths_are_rejected() {
        let moves = alternating_stream(&[1]);
        let reps = Array1::<i8>::zeros(3);
        assert!(matches!(
            segment_repetitions(moves.view(), reps.view(), 1.0, 999.0),
            Err(PrepError::LengthMismatch { .. })
        ));
    }
}
