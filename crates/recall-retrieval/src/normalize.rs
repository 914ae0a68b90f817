//! Unit-length normalization so that inner product equals cosine similarity.

use recall_core::{Error, Result};

/// Euclidean length of a vector, accumulated in `f64` so that large finite
/// components cannot overflow the sum.
pub fn l2_norm(vector: &[f32]) -> f64 {
    vector
        .iter()
        .map(|value| f64::from(*value) * f64::from(*value))
        .sum::<f64>()
        .sqrt()
}

/// Rescale a vector to unit Euclidean length.
///
/// # Errors
/// Returns [`Error::NonFinite`] or [`Error::ZeroVector`] (with no row) when
/// the vector holds NaN or infinity, or has zero length. The vector is left
/// untouched in that case.
pub fn normalize_in_place(vector: &mut [f32]) -> Result<()> {
    scale_to_unit(vector, None)
}

/// Rescale every row of a collection to unit Euclidean length.
///
/// # Errors
/// Returns [`Error::NonFinite`] or [`Error::ZeroVector`] naming the first row
/// that cannot be normalized. Rows before it have already been rescaled.
pub fn normalize_rows(rows: &mut [Vec<f32>]) -> Result<()> {
    for (row, vector) in rows.iter_mut().enumerate() {
        scale_to_unit(vector, Some(row))?;
    }
    Ok(())
}

fn scale_to_unit(vector: &mut [f32], row: Option<usize>) -> Result<()> {
    if !vector.iter().all(|value| value.is_finite()) {
        return Err(Error::NonFinite { row });
    }
    let norm = l2_norm(vector);
    if norm == 0.0 {
        return Err(Error::ZeroVector { row });
    }
    for value in vector.iter_mut() {
        *value = (f64::from(*value) / norm) as f32;
    }
    Ok(())
}
