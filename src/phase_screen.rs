//! Autoregressive phase screen generator
//!
//! At each time step, and for each turbulence layer, the Fourier transform of the phase
//! screen is updated according to
//! ```text
//! phaseFT <- alpha x phaseFT + noiseFT x sqrt(1 - |alpha|^2)
//! ```
//! with `noiseFT` the Fourier transform of white noise filtered by the Kolmogorov power
//! spectrum. The phase screen is the sum over the layers of the real part of the
//! inverse Fourier transforms.
//!
//! Reference: S. Srinath et al., "Remembrance of phases past: An autoregressive method
//! for generating realistic atmospheres in simulations", Proc. SPIE 9148 (2014)

use std::fmt;

use nalgebra::DMatrix;
use rustfft::num_complex::Complex64;

use crate::{
    random::GaussianSource,
    spectrum::{LayerSpectrum, SpectrumError},
    transform::{FftTransform, Transform2D},
    NormalDeviate,
};

mod builder;
pub use builder::{PhaseScreenGeneratorBuilder, MAX_FFT_SIZE};

#[derive(Debug, thiserror::Error)]
pub enum PhaseScreenError {
    #[error("failed to compute the atmosphere power spectrum")]
    Spectrum(#[from] SpectrumError),
    #[error("the time step must be positive, found {0}s")]
    TimeStep(f64),
    #[error("screen size ({size}m) and screen scale ({scale}m) must be positive")]
    Screen { size: f64, scale: f64 },
    #[error("a {size}x{size} phase screen exceeds the maximum FFT size of {max}, increase the screen scale or decrease the screen size")]
    TooLarge { size: usize, max: usize },
    #[error("all the layers must have the same grid size")]
    GridMismatch,
    #[error("at least one layer is required")]
    NoLayer,
}
pub type Result<T> = std::result::Result<T, PhaseScreenError>;

struct ArLayer {
    powerlaw: DMatrix<Complex64>,
    alpha: DMatrix<Complex64>,
    noise_scale: DMatrix<Complex64>,
}
impl From<LayerSpectrum> for ArLayer {
    fn from(spectrum: LayerSpectrum) -> Self {
        let noise_scale = spectrum
            .alpha()
            .map(|a| Complex64::new((1. - a.norm_sqr()).max(0.).sqrt(), 0.));
        Self {
            powerlaw: spectrum.powerlaw().map(|p| Complex64::new(p, 0.)),
            alpha: spectrum.alpha().clone(),
            noise_scale,
        }
    }
}

enum State {
    Uninitialized,
    Running(Vec<DMatrix<Complex64>>),
}

/// Multi-layer autoregressive phase screen generator
///
/// The generator is an infinite sequence of phase screens: each call to
/// [step](PhaseScreenGenerator::step) returns a new screen and advances the internal state.
/// It cannot be rewound; a new generator must be created to start over.
///
/// # Examples
///
/// ```
/// use atmpsf::{Builder, FromBuilder, PhaseScreenGenerator};
/// let mut atm = PhaseScreenGenerator::builder()
///     .screen_size(4.)
///     .screen_scale(0.125)
///     .r0(vec![0.2, 0.15])
///     .velocity(5f64)
///     .direction(vec![0., 90f64.to_radians()])
///     .seed(7)
///     .build()
///     .unwrap();
/// let screen = atm.step();
/// assert_eq!(screen.shape(), (32, 32));
/// ```
pub struct PhaseScreenGenerator<G = NormalDeviate, T = FftTransform> {
    layers: Vec<ArLayer>,
    source: G,
    transform: T,
    size: usize,
    screen_scale: f64,
    state: State,
    n_step: usize,
}
impl<G, T> fmt::Debug for PhaseScreenGenerator<G, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseScreenGenerator")
            .field("n_layer", &self.layers.len())
            .field("size", &self.size)
            .field("screen_scale", &self.screen_scale)
            .field("n_step", &self.n_step)
            .finish()
    }
}
impl<G: GaussianSource, T: Transform2D> PhaseScreenGenerator<G, T> {
    /// Creates a generator from the spectral tables of each layer
    ///
    /// `screen_scale` is the pixel scale of the phase screens in meters
    pub fn from_spectra(
        spectra: Vec<LayerSpectrum>,
        screen_scale: f64,
        source: G,
        transform: T,
    ) -> Result<Self> {
        let size = spectra.first().ok_or(PhaseScreenError::NoLayer)?.size();
        if spectra.iter().any(|s| s.size() != size) {
            return Err(PhaseScreenError::GridMismatch);
        }
        if !(screen_scale.is_finite() && screen_scale > 0.) {
            return Err(PhaseScreenError::Screen {
                size: size as f64 * screen_scale,
                scale: screen_scale,
            });
        }
        Ok(Self {
            layers: spectra.into_iter().map(ArLayer::from).collect(),
            source,
            transform,
            size,
            screen_scale,
            state: State::Uninitialized,
            n_step: 0,
        })
    }
    /// Number of pixels across the phase screens
    pub fn size(&self) -> usize {
        self.size
    }
    /// Pixel scale of the phase screens in meters
    pub fn screen_scale(&self) -> f64 {
        self.screen_scale
    }
    /// Side length of the phase screens in meters
    pub fn extent(&self) -> f64 {
        self.size as f64 * self.screen_scale
    }
    /// Number of turbulence layers
    pub fn n_layer(&self) -> usize {
        self.layers.len()
    }
    /// Number of phase screens generated so far
    pub fn n_step(&self) -> usize {
        self.n_step
    }
    /// Returns the next phase screen
    ///
    /// The noise of each layer is drawn in the order of the layers.
    pub fn step(&mut self) -> DMatrix<f64> {
        let n = self.size;
        let Self {
            layers,
            source,
            transform,
            state,
            ..
        } = self;
        let noise_ft: Vec<_> = layers
            .iter()
            .map(|layer| {
                let mut noise_ft = source.sample(n, n).map(|x| Complex64::new(x, 0.));
                transform.forward(&mut noise_ft);
                noise_ft.component_mul_assign(&layer.powerlaw);
                noise_ft
            })
            .collect();
        match state {
            State::Uninitialized => *state = State::Running(noise_ft),
            State::Running(phase_ft) => {
                for ((phase_ft, noise_ft), layer) in phase_ft.iter_mut().zip(noise_ft).zip(layers.iter())
                {
                    phase_ft.component_mul_assign(&layer.alpha);
                    *phase_ft += noise_ft.component_mul(&layer.noise_scale);
                }
            }
        }
        let mut phase = DMatrix::<f64>::zeros(n, n);
        if let State::Running(phase_ft) = state {
            for layer_ft in phase_ft.iter() {
                let mut layer_phase = layer_ft.clone();
                transform.inverse(&mut layer_phase);
                phase.zip_apply(&layer_phase, |p, l| *p += l.re);
            }
        }
        self.n_step += 1;
        log::debug!(
            "phase screen #{}: rms {:.3}rd",
            self.n_step,
            (phase.norm_squared() / (n * n) as f64).sqrt()
        );
        phase
    }
}
