//! Kolmogorov power spectrum and autoregressive coefficients
//!
//! For each turbulence layer, [PowerSpectrum::build] computes
//!  * the square root of the Kolmogorov power spectrum, `powerlaw`, that turns unit
//!    variance white noise into a phase screen,
//!  * the complex autoregressive coefficients, `alpha`, whose phase shifts the screen
//!    by the distance the wind blows during a time step.

use std::f64::consts::PI;

use nalgebra::DMatrix;
use rustfft::num_complex::Complex64;

use crate::layers::{Layer, LayerParameters, LayersError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpectrumError {
    #[error("invalid layer parameters")]
    Layers(#[from] LayersError),
    #[error("layer #{layer}: the Fried parameter must be positive, found {r0}m")]
    FriedParameter { layer: usize, r0: f64 },
    #[error("layer #{layer}: alpha magnitude must be in [0,1), found {alpha_mag}")]
    PersistenceMagnitude { layer: usize, alpha_mag: f64 },
    #[error("layer #{layer}: wind speed and direction must be finite, found {velocity}m/s and {direction}rd")]
    Wind {
        layer: usize,
        velocity: f64,
        direction: f64,
    },
    #[error("the grid size must be positive")]
    GridSize,
    #[error("the pixel scale must be positive, found {0}m")]
    PixelScale(f64),
    #[error("the sampling rate must be positive, found {0}Hz")]
    Rate(f64),
}
pub type Result<T> = std::result::Result<T, SpectrumError>;

/// Spectral tables of a turbulence layer
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpectrum {
    powerlaw: DMatrix<f64>,
    alpha: DMatrix<Complex64>,
}
impl LayerSpectrum {
    /// Creates the spectral tables from user supplied arrays
    ///
    /// No physical check is performed on the arrays, they only need to be both square
    /// and of the same size.
    pub fn new(powerlaw: DMatrix<f64>, alpha: DMatrix<Complex64>) -> Result<Self> {
        if powerlaw.is_empty() || !powerlaw.is_square() || powerlaw.shape() != alpha.shape() {
            return Err(SpectrumError::GridSize);
        }
        Ok(Self { powerlaw, alpha })
    }
    /// Square root of the Kolmogorov power spectrum
    pub fn powerlaw(&self) -> &DMatrix<f64> {
        &self.powerlaw
    }
    /// Autoregressive coefficients
    pub fn alpha(&self) -> &DMatrix<Complex64> {
        &self.alpha
    }
    /// Grid size
    pub fn size(&self) -> usize {
        self.powerlaw.nrows()
    }
}

/// Spatial frequency of the bin `j` of a `n` samples FFT with `delta_f` resolution
fn frequency(j: usize, n: usize, delta_f: f64) -> f64 {
    if 2 * j > n {
        (j as f64 - n as f64) * delta_f
    } else {
        j as f64 * delta_f
    }
}

/// Spatial frequency grids `(fx,fy)` of a `size x size` screen sampled every `scale` meters
///
/// `fx` varies along the columns and `fy` along the rows, the zero frequency is at `(0,0)`.
pub fn frequency_grids(size: usize, scale: f64) -> (DMatrix<f64>, DMatrix<f64>) {
    let delta_f = 1. / (size as f64 * scale);
    let fx = DMatrix::from_fn(size, size, |_, j| frequency(j, size, delta_f));
    let fy = fx.transpose();
    (fx, fy)
}

/// Power spectrum model of a multi-layer atmosphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerSpectrum {
    /// Number of pixels across the screen
    pub size: usize,
    /// Pixel scale in meters
    pub scale: f64,
    /// Sampling rate in Hz
    pub rate: f64,
}
impl PowerSpectrum {
    pub fn new(size: usize, scale: f64, rate: f64) -> Self {
        Self { size, scale, rate }
    }
    /// Screen side length in meters
    pub fn extent(&self) -> f64 {
        self.size as f64 * self.scale
    }
    fn check(&self, params: &LayerParameters) -> Result<()> {
        if self.size == 0 {
            return Err(SpectrumError::GridSize);
        }
        if !(self.scale.is_finite() && self.scale > 0.) {
            return Err(SpectrumError::PixelScale(self.scale));
        }
        if !(self.rate.is_finite() && self.rate > 0.) {
            return Err(SpectrumError::Rate(self.rate));
        }
        if params.n_layer() == 0 {
            return Err(LayersError::Empty.into());
        }
        for (layer, l) in params.layers().enumerate() {
            if !(l.r0.is_finite() && l.r0 > 0.) {
                return Err(SpectrumError::FriedParameter { layer, r0: l.r0 });
            }
            if !(0. ..1.).contains(&l.alpha_mag) {
                return Err(SpectrumError::PersistenceMagnitude {
                    layer,
                    alpha_mag: l.alpha_mag,
                });
            }
            if !(l.velocity.is_finite() && l.direction.is_finite()) {
                return Err(SpectrumError::Wind {
                    layer,
                    velocity: l.velocity,
                    direction: l.direction,
                });
            }
        }
        Ok(())
    }
    /// Computes the spectral tables of each layer
    ///
    /// All the parameters are checked before any table is allocated.
    pub fn build(&self, params: &LayerParameters) -> Result<Vec<LayerSpectrum>> {
        self.check(params)?;
        let (fx, fy) = frequency_grids(self.size, self.scale);
        let n = self.size as f64;
        let extent = self.extent();
        Ok(params
            .layers()
            .map(|layer| {
                let Layer { r0, alpha_mag, .. } = layer;
                let (vx, vy) = layer.wind();
                let c = 2. * PI / extent * 0.00058f64.sqrt() * r0.powf(-5. / 6.) * n * 2f64.sqrt().sqrt();
                let powerlaw = DMatrix::from_fn(self.size, self.size, |i, j| {
                    if i == 0 && j == 0 {
                        0.
                    } else {
                        let f2 = fx[(i, j)].powi(2) + fy[(i, j)].powi(2);
                        c * f2.powf(-11. / 12.)
                    }
                });
                let alpha = fx.zip_map(&fy, |fx, fy| {
                    let phase_advance = -(fx * vx + fy * vy) / self.rate;
                    Complex64::from_polar(alpha_mag, 2. * PI * phase_advance)
                });
                LayerSpectrum { powerlaw, alpha }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;
    use crate::layers::broadcast;

    fn two_layers() -> LayerParameters {
        broadcast(
            &vec![0.2, 0.15].into(),
            &vec![5., 12.].into(),
            &vec![0.3, FRAC_PI_2].into(),
            &0.99f64.into(),
        )
        .unwrap()
    }

    #[test]
    fn frequencies() {
        let (fx, fy) = frequency_grids(4, 0.25);
        // delta_f = 1Hz
        assert_eq!(
            fx.row(0).iter().copied().collect::<Vec<_>>(),
            vec![0., 1., 2., -1.]
        );
        assert_eq!(fx.column(1).iter().copied().collect::<Vec<_>>(), vec![1.; 4]);
        assert_eq!(fy, fx.transpose());
        let (fx, _) = frequency_grids(5, 0.2);
        assert_eq!(
            fx.row(0).iter().copied().collect::<Vec<_>>(),
            vec![0., 1., 2., -2., -1.]
        );
    }

    #[test]
    fn dc_bin() {
        let spectra = PowerSpectrum::new(32, 0.1, 100.).build(&two_layers()).unwrap();
        assert_eq!(spectra.len(), 2);
        for s in spectra {
            assert_eq!(s.powerlaw()[(0, 0)], 0.);
            assert_eq!(s.alpha()[(0, 0)].im, 0.);
            assert_eq!(s.alpha()[(0, 0)].re, 0.99);
        }
    }

    #[test]
    fn alpha_magnitude() {
        let spectra = PowerSpectrum::new(16, 0.1, 30.).build(&two_layers()).unwrap();
        for s in spectra {
            assert!(s.alpha().iter().all(|a| (a.norm() - 0.99).abs() < 1e-12));
        }
    }

    #[test]
    fn powerlaw_scaling() {
        let spectra = PowerSpectrum::new(16, 0.1, 30.).build(&two_layers()).unwrap();
        let ratio = spectra[1].powerlaw()[(0, 1)] / spectra[0].powerlaw()[(0, 1)];
        assert!((ratio - (0.15f64 / 0.2).powf(-5. / 6.)).abs() < 1e-12);
        // amplitude drops as f^(-11/6)
        let ratio = spectra[0].powerlaw()[(0, 2)] / spectra[0].powerlaw()[(0, 1)];
        assert!((ratio - 2f64.powf(-11. / 6.)).abs() < 1e-12);
    }

    #[test]
    fn wind_phase() {
        let params = broadcast(&0.2f64.into(), &10f64.into(), &0f64.into(), &0.5f64.into()).unwrap();
        let spectrum = PowerSpectrum::new(10, 0.1, 100.);
        let spectra = spectrum.build(&params).unwrap();
        // fx = 1Hz, vx = 10m/s, 100Hz: phase = -2.pi/10
        let a = spectra[0].alpha()[(0, 1)];
        assert!((a.arg() + 2. * PI / 10.).abs() < 1e-12);
        // no phase along the y frequencies
        assert!(spectra[0].alpha()[(3, 0)].arg().abs() < 1e-12);
    }

    #[test]
    fn configuration_errors() {
        let spectrum = PowerSpectrum::new(8, 0.1, 30.);
        let params = broadcast(&(-0.2f64).into(), &0f64.into(), &0f64.into(), &0.5f64.into()).unwrap();
        assert_eq!(
            spectrum.build(&params).unwrap_err(),
            SpectrumError::FriedParameter { layer: 0, r0: -0.2 }
        );
        let params =
            broadcast(&0.2f64.into(), &0f64.into(), &0f64.into(), &[0.5, 1.].into()).unwrap();
        assert_eq!(
            spectrum.build(&params).unwrap_err(),
            SpectrumError::PersistenceMagnitude {
                layer: 1,
                alpha_mag: 1.
            }
        );
        let params = broadcast(&0.2f64.into(), &0f64.into(), &0f64.into(), &0.5f64.into()).unwrap();
        assert_eq!(
            PowerSpectrum::new(8, 0.1, -1.).build(&params).unwrap_err(),
            SpectrumError::Rate(-1.)
        );
        assert_eq!(
            PowerSpectrum::new(8, 0., 30.).build(&params).unwrap_err(),
            SpectrumError::PixelScale(0.)
        );
        assert_eq!(
            PowerSpectrum::new(0, 0.1, 30.).build(&params).unwrap_err(),
            SpectrumError::GridSize
        );
    }

    #[test]
    fn user_tables() {
        let powerlaw = DMatrix::<f64>::zeros(4, 4);
        let alpha = DMatrix::<Complex64>::zeros(4, 3);
        assert_eq!(
            LayerSpectrum::new(powerlaw, alpha).unwrap_err(),
            SpectrumError::GridSize
        );
    }
}
