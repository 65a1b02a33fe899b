use ndarray::{s, Array1, Array3, ArrayView1, ArrayView2, NdFloat};

use crate::error::PrepError;

/// Windowed slice of a subject recording plus co-indexed per-window labels.
#[derive(Clone, Debug)]
pub struct WindowSet<A> {
    /// (window, sample, channel) tensor; each window includes its end sample.
    pub x: Array3<A>,
    /// Movement label at each window's end sample.
    pub y: Array1<i8>,
    /// Repetition label at each window's end sample.
    pub rep: Array1<i8>,
}

/// Slice `emg` into fixed-length overlapping windows filtered by repetition
/// (and optionally movement) membership.
///
/// Candidate window ends are `window_len - 1 + k * window_inc`; a window is
/// kept when the labels at its end sample match the requested sets. Windows
/// are grouped by the order of `which_reps` (then `which_moves`), ascending
/// within each group. A requested id with no matching end sample contributes
/// zero windows; the result may be empty. The element type of `emg` picks the
/// output precision; `f32` is the usual choice.
pub fn get_windows<A>(
    which_reps: &[i8],
    window_len: usize,
    window_inc: usize,
    emg: ArrayView2<A>,
    moves: ArrayView1<i8>,
    reps: ArrayView1<i8>,
    which_moves: Option<&[i8]>,
) -> Result<WindowSet<A>, PrepError>
where
    A: NdFloat,
{
    if window_len == 0 || window_inc == 0 {
        return Err(PrepError::WindowParams {
            len: window_len,
            inc: window_inc,
        });
    }
    let nb_obs = emg.nrows();
    if moves.len() != nb_obs || reps.len() != nb_obs {
        return Err(PrepError::LengthMismatch {
            signal: nb_obs,
            labels: moves.len().min(reps.len()),
        });
    }
    let nb_channels = emg.ncols();

    // Every admissible window end, then filter by end-sample membership.
    // Ids with no surviving end simply contribute nothing.
    let retain_grouped = |candidates: &[usize], labels: ArrayView1<i8>, wanted: &[i8]| {
        let mut kept = Vec::with_capacity(candidates.len());
        for &id in wanted {
            kept.extend(candidates.iter().copied().filter(|&e| labels[e] == id));
        }
        kept
    };
    let possible_ends: Vec<usize> = (window_len - 1..nb_obs).step_by(window_inc).collect();
    let mut ends = retain_grouped(&possible_ends, reps, which_reps);
    if let Some(which_moves) = which_moves {
        ends = retain_grouped(&ends, moves, which_moves);
    }

    let mut x = Array3::<A>::zeros((ends.len(), window_len, nb_channels));
    let mut y = Array1::<i8>::zeros(ends.len());
    let mut rep = Array1::<i8>::zeros(ends.len());
    for (w, &end) in ends.iter().enumerate() {
        let start = end + 1 - window_len;
        x.slice_mut(s![w, .., ..])
            .assign(&emg.slice(s![start..=end, ..]));
        y[w] = moves[end];
        rep[w] = reps[end];
    }

    Ok(WindowSet { x, y, rep })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};

    fn ramp_signal(len: usize, channels: usize) -> Array2<f32> {
        Array2::from_shape_fn((len, channels), |(i, c)| (i * 10 + c) as f32)
    }

    #[test]
    fn window_ends_follow_length_and_increment() {
        let emg = ramp_signal(12, 3);
        let moves = Array1::from_elem(12, 7i8);
        let reps = Array1::from_elem(12, 1i8);
        let set = get_windows(&[1], 5, 2, emg.view(), moves.view(), reps.view(), None).unwrap();
        // Ends at 4, 6, 8, 10.
        assert_eq!(set.x.dim(), (4, 5, 3));
        assert_eq!(set.x[[0, 0, 0]], 0.0);
        assert_eq!(set.x[[0, 4, 0]], 40.0);
        assert_eq!(set.x[[3, 4, 2]], 102.0);
        assert_eq!(set.y, Array1::from_elem(4, 7i8));
        assert_eq!(set.rep, Array1::from_elem(4, 1i8));
    }

    #[test]
    fn windows_filtered_by_repetition_membership() {
        let emg = ramp_signal(12, 1);
        let moves = Array1::from_elem(12, 1i8);
        let mut reps = Array1::from_elem(12, 1i8);
        reps.slice_mut(s![6..]).fill(2);
        let set = get_windows(&[2], 5, 2, emg.view(), moves.view(), reps.view(), None).unwrap();
        // Only ends 6, 8, 10 carry repetition 2.
        assert_eq!(set.x.dim(), (3, 5, 1));
        assert_eq!(set.rep, Array1::from_elem(3, 2i8));
    }

    #[test]
    fn movement_filter_applies_after_repetition_filter() {
        let emg = ramp_signal(16, 1);
        let mut moves = Array1::from_elem(16, 1i8);
        moves.slice_mut(s![8..]).fill(2);
        let reps = Array1::from_elem(16, 1i8);
        let set = get_windows(
            &[1],
            4,
            4,
            emg.view(),
            moves.view(),
            reps.view(),
            Some(&[2]),
        )
        .unwrap();
        // Candidate ends 3, 7, 11, 15; movement 2 only at 11 and 15.
        assert_eq!(set.x.dim(), (2, 4, 1));
        assert_eq!(set.y, Array1::from_elem(2, 2i8));
    }

    #[test]
    fn repetition_with_no_end_sample_yields_no_windows() {
        // Repetition 2 covers only sample 5, which no end position (3, 7, 11)
        // lands on; it contributes nothing instead of erroring.
        let emg = ramp_signal(12, 1);
        let moves = Array1::from_elem(12, 1i8);
        let mut reps = Array1::from_elem(12, 1i8);
        reps[5] = 2;
        let set =
            get_windows(&[1, 2], 4, 4, emg.view(), moves.view(), reps.view(), None).unwrap();
        assert_eq!(set.x.dim(), (3, 4, 1));
        assert_eq!(set.rep, Array1::from_elem(3, 1i8));
    }

    #[test]
    fn absent_ids_give_an_empty_window_set() {
        let emg = ramp_signal(12, 2);
        let moves = Array1::from_elem(12, 1i8);
        let reps = Array1::from_elem(12, 1i8);
        let set = get_windows(&[3], 4, 4, emg.view(), moves.view(), reps.view(), None).unwrap();
        assert_eq!(set.x.dim(), (0, 4, 2));
        assert!(set.y.is_empty());
    }

    #[test]
    fn f64_output_precision_is_caller_chosen() {
        let emg = Array2::<f64>::ones((8, 2));
        let moves = Array1::from_elem(8, 1i8);
        let reps = Array1::from_elem(8, 1i8);
        let set = get_windows(&[1], 4, 2, emg.view(), moves.view(), reps.view(), None).unwrap();
        assert_eq!(set.x.dim(), (3, 4, 2));
        assert_eq!(set.x[[0, 0, 0]], 1.0f64);
    }

    #[test]
    fn zero_increment_is_rejected() {
        let emg = ramp_signal(8, 1);
        let moves = Array1::from_elem(8, 1i8);
        let reps = Array1::from_elem(8, 1i8);
        assert!(matches!(
            get_windows(&[1], 4, 0, emg.view(), moves.view(), reps.view(), None),
            Err(PrepError::WindowParams { .. })
        ));
    }
}
