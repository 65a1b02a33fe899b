use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::error::PrepError;
use crate::lookup::get_idxs;

/// Z-score the EMG matrix per channel, fitted on training rows only.
///
/// Training rows are the samples whose repetition label is in `train_reps`,
/// optionally narrowed to selected movements. Every row of the output is
/// transformed with the training statistics; zero-variance channels pass
/// through unscaled.
pub fn normalise_emg(
    emg: ArrayView2<f32>,
    reps: ArrayView1<i8>,
    train_reps: &[i8],
    movements: Option<ArrayView1<i8>>,
    which_moves: Option<&[i8]>,
) -> Result<Array2<f32>, PrepError> {
    if reps.len() != emg.nrows() {
        return Err(PrepError::LengthMismatch {
            signal: emg.nrows(),
            labels: reps.len(),
        });
    }
    let mut rows = get_idxs(reps, train_reps)?;
    if let (Some(moves), Some(which_moves)) = (movements, which_moves) {
        if moves.len() != emg.nrows() {
            return Err(PrepError::LengthMismatch {
                signal: emg.nrows(),
                labels: moves.len(),
            });
        }
        let row_moves = ndarray::Array1::from_iter(rows.iter().map(|&i| moves[i]));
        rows = get_idxs(row_moves.view(), which_moves)?
            .into_iter()
            .map(|k| rows[k])
            .collect();
    }

    let nb_channels = emg.ncols();
    let n = rows.len() as f64;
    let mut means = vec![0.0f64; nb_channels];
    let mut stds = vec![0.0f64; nb_channels];
    for &row in &rows {
        for c in 0..nb_channels {
            means[c] += emg[[row, c]] as f64;
        }
    }
    for mean in &mut means {
        *mean /= n;
    }
    for &row in &rows {
        for c in 0..nb_channels {
            let d = emg[[row, c]] as f64 - means[c];
            stds[c] += d * d;
        }
    }
    for std in &mut stds {
        *std = (*std / n).sqrt();
        if *std == 0.0 {
            *std = 1.0;
        }
    }

    let mut out = emg.to_owned();
    for mut row in out.rows_mut() {
        for (c, v) in row.iter_mut().enumerate() {
            *v = ((*v as f64 - means[c]) / stds[c]) as f32;
        }
    }
    Ok(out)
}

/// Class vector to binary class matrix, one row per label.
///
/// The class count defaults to `max(labels) + 1`.
pub fn one_hot(labels: ArrayView1<i8>, nb_classes: Option<usize>) -> Result<Array2<f32>, PrepError> {
    let max_label = labels.iter().copied().max().unwrap_or(0);
    let nb_classes = nb_classes.unwrap_or((max_label.max(0) as usize) + 1);
    let mut out = Array2::<f32>::zeros((labels.len(), nb_classes));
    for (i, &label) in labels.iter().enumerate() {
        if label < 0 || label as usize >= nb_classes {
            return Err(PrepError::ClassOutOfRange { label, nb_classes });
        }
        out[[i, label as usize]] = 1.0;
    }
    Ok(out)
}
