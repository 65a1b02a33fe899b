use ndarray::ArrayView1;

use crate::error::PrepError;

/// Positions of each value of `to_find` inside `in_array`.
///
/// Results are grouped in the order the values were given, ascending within
/// each group. A value with zero matches is a caller contract violation and
/// fails the whole call rather than silently producing a short result.
pub fn get_idxs(in_array: ArrayView1<i8>, to_find: &[i8]) -> Result<Vec<usize>, PrepError> {
    let mut out = Vec::new();
    for &value in to_find {
        let before = out.len();
        out.extend(
            in_array
                .iter()
                .enumerate()
                .filter(|(_, &v)| v == value)
                .map(|(i, _)| i),
        );
        if out.len() == before {
            return Err(PrepError::NoMatches(value));
        }
    }
    Ok(out)
}
