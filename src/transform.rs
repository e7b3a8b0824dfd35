//! 2D discrete Fourier transforms
//!
//! The forward transform is unnormalized and the inverse transform is scaled by
//! `1/(n_rows x n_cols)`, so `inverse(forward(x)) = x`.

use std::fmt;

use nalgebra::DMatrix;
use rayon::prelude::*;
use rustfft::{num_complex::Complex64, Fft, FftDirection, FftPlanner};

/// 2D Fourier transform pair
pub trait Transform2D {
    /// In-place forward transform
    fn forward(&mut self, data: &mut DMatrix<Complex64>);
    /// In-place inverse transform
    fn inverse(&mut self, data: &mut DMatrix<Complex64>);
}

/// [Transform2D] backed by [rustfft]
///
/// Plans are cached by the planner, so a single instance should be reused for
/// transforms of the same size.
pub struct FftTransform {
    planner: FftPlanner<f64>,
}
impl Default for FftTransform {
    fn default() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }
}
impl fmt::Debug for FftTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftTransform").finish_non_exhaustive()
    }
}
impl FftTransform {
    pub fn new() -> Self {
        Default::default()
    }
    fn process(&mut self, data: &mut DMatrix<Complex64>, direction: FftDirection) {
        let (n_rows, n_cols) = data.shape();
        if n_rows == 0 || n_cols == 0 {
            return;
        }
        // columns are contiguous in nalgebra storage
        let fft = self.planner.plan_fft(n_rows, direction);
        transform_columns(&fft, data.as_mut_slice(), n_rows);
        let mut transposed = data.transpose();
        let fft = self.planner.plan_fft(n_cols, direction);
        transform_columns(&fft, transposed.as_mut_slice(), n_cols);
        transposed.transpose_to(data);
    }
}
fn transform_columns(fft: &std::sync::Arc<dyn Fft<f64>>, buffer: &mut [Complex64], len: usize) {
    buffer
        .par_chunks_mut(len)
        .for_each(|column| fft.process(column));
}
impl Transform2D for FftTransform {
    fn forward(&mut self, data: &mut DMatrix<Complex64>) {
        self.process(data, FftDirection::Forward);
    }
    fn inverse(&mut self, data: &mut DMatrix<Complex64>) {
        self.process(data, FftDirection::Inverse);
        let n = data.len() as f64;
        data.apply(|x| *x /= n);
    }
}

/// Circularly shifts a matrix by `(shift_rows, shift_cols)`
///
/// The sample at `(i,j)` is moved to `((i + shift_rows) mod n_rows, (j + shift_cols) mod n_cols)`.
pub fn roll2d<T: nalgebra::Scalar>(
    data: &DMatrix<T>,
    (shift_rows, shift_cols): (isize, isize),
) -> DMatrix<T> {
    let (n_rows, n_cols) = data.shape();
    if n_rows == 0 || n_cols == 0 {
        return data.clone();
    }
    let dr = shift_rows.rem_euclid(n_rows as isize) as usize;
    let dc = shift_cols.rem_euclid(n_cols as isize) as usize;
    DMatrix::from_fn(n_rows, n_cols, |i, j| {
        data[((i + n_rows - dr) % n_rows, (j + n_cols - dc) % n_cols)].clone()
    })
}

/// Moves the center sample back to the origin
pub fn ifftshift<T: nalgebra::Scalar>(data: &DMatrix<T>) -> DMatrix<T> {
    let (n_rows, n_cols) = data.shape();
    roll2d(data, (-((n_rows / 2) as isize), -((n_cols / 2) as isize)))
}

/// Moves the origin sample to the center
pub fn fftshift<T: nalgebra::Scalar>(data: &DMatrix<T>) -> DMatrix<T> {
    let (n_rows, n_cols) = data.shape();
    roll2d(data, ((n_rows / 2) as isize, (n_cols / 2) as isize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_inverse() {
        let data = DMatrix::from_fn(6, 4, |i, j| Complex64::new(i as f64, (i * j) as f64));
        let mut transform = FftTransform::new();
        let mut ft = data.clone();
        transform.forward(&mut ft);
        transform.inverse(&mut ft);
        let err = (ft - data).iter().map(|x| x.norm()).fold(0f64, f64::max);
        assert!(err < 1e-12, "{err}");
    }

    #[test]
    fn dc_is_sum() {
        let data = DMatrix::from_fn(5, 5, |i, j| Complex64::new((i + 2 * j) as f64, 0.));
        let sum: Complex64 = data.iter().sum();
        let mut ft = data;
        FftTransform::new().forward(&mut ft);
        assert!((ft[(0, 0)] - sum).norm() < 1e-10);
    }

    #[test]
    fn delta_transforms_to_plane_wave() {
        let mut data = DMatrix::<Complex64>::zeros(8, 8);
        data[(0, 1)] = Complex64::new(1., 0.);
        FftTransform::new().forward(&mut data);
        // exp(-2i.pi.k/8) along the columns, constant along the rows
        let expected = Complex64::from_polar(1., -2. * std::f64::consts::PI * 3. / 8.);
        assert!((data[(5, 3)] - expected).norm() < 1e-12);
    }

    #[test]
    fn roll() {
        let data = DMatrix::from_fn(3, 4, |i, j| (i * 10 + j) as i32);
        let rolled = roll2d(&data, (1, -1));
        assert_eq!(rolled[(1, 0)], data[(0, 1)]);
        assert_eq!(rolled[(0, 3)], data[(2, 0)]);
        assert_eq!(ifftshift(&fftshift(&data)), data);
    }
}
