//! Long exposure atmospheric PSF
//!
//! The phase screens of a [PhaseScreenGenerator] are turned into short exposure PSFs that
//! are summed over the exposure time:
//!  1. the wavefront `exp(i.phase)` is zero padded to twice its size,
//!  2. the focal plane field is the inverse Fourier transform of the wavefront,
//!  3. each intensity frame is normalized to the target flux before being added to the
//!     long exposure image.

use indicatif::{ProgressBar, ProgressStyle};
use nalgebra::DMatrix;
use rustfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::{
    angle::ScaleUnit,
    phase_screen::MAX_FFT_SIZE,
    profile::{ProfileError, ProfileFromImage, SampledProfile},
    random::GaussianSource,
    transform::{ifftshift, roll2d, FftTransform, Transform2D},
    PhaseScreenGenerator,
};

mod builder;
pub use builder::{build_psf, AtmosphericPsfBuilder};

/// Zero padding factor of the wavefront
pub const PAD: usize = 2;
/// Largest number of frames in an exposure
pub const MAX_STEP: usize = u32::MAX as usize;

#[derive(Debug, thiserror::Error)]
pub enum PsfError {
    #[error("the wavelength must be positive, found {0}nm")]
    Wavelength(f64),
    #[error("the time step must be positive, found {0}s")]
    TimeStep(f64),
    #[error("the exposure time must be positive, found {0}s")]
    ExposureTime(f64),
    #[error("the flux must be finite, found {0}")]
    Flux(f64),
    #[error("a {exptime}s exposure with a {time_step}s time step exceeds the maximum of {max} frames")]
    StepCount {
        exptime: f64,
        time_step: f64,
        max: usize,
    },
    #[error("a {size}x{size} FFT exceeds the maximum FFT size of {max}, increase the screen scale or decrease the screen size")]
    TooLarge { size: usize, max: usize },
    #[error("frame #{step} has a degenerate total intensity ({sum}), cannot normalize it")]
    DegenerateFrame { step: usize, sum: f64 },
    #[error("failed to build the PSF profile")]
    Profile(#[from] ProfileError),
}
pub type Result<T> = std::result::Result<T, PsfError>;

/// Normalization of the long exposure image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExposureNormalization {
    /// Sum of the frames: the flux grows with the number of time steps
    #[default]
    Sum,
    /// Average of the frames: the flux is the target flux
    Mean,
}

/// Exposure parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exposure {
    /// Wavelength in nanometers
    pub wavelength: f64,
    /// Time interval between 2 phase screens in seconds
    pub time_step: f64,
    /// Exposure time in seconds
    pub exptime: f64,
    /// Flux of each frame
    pub flux: f64,
    /// Unit of the pixel scale
    pub scale_unit: ScaleUnit,
}
impl Exposure {
    fn check(&self) -> Result<()> {
        if !(self.wavelength.is_finite() && self.wavelength > 0.) {
            return Err(PsfError::Wavelength(self.wavelength));
        }
        if !(self.time_step.is_finite() && self.time_step > 0.) {
            return Err(PsfError::TimeStep(self.time_step));
        }
        if !(self.exptime.is_finite() && self.exptime > 0.) {
            return Err(PsfError::ExposureTime(self.exptime));
        }
        if !self.flux.is_finite() {
            return Err(PsfError::Flux(self.flux));
        }
        let n_step = (self.exptime / self.time_step).ceil();
        if !(n_step.is_finite() && n_step <= MAX_STEP as f64) {
            return Err(PsfError::StepCount {
                exptime: self.exptime,
                time_step: self.time_step,
                max: MAX_STEP,
            });
        }
        Ok(())
    }
    /// Number of time steps in the exposure
    pub fn n_step(&self) -> usize {
        (self.exptime / self.time_step).ceil() as usize
    }
    /// PSF pixel scale for a phase screen `extent` meters wide
    ///
    /// The pixel scale is `PAD/extent x wavelength`, the padding factor over the screen
    /// width; for the default 10m screen this is `0.2 x wavelength`.
    pub fn pixel_scale(&self, extent: f64) -> f64 {
        let radians = PAD as f64 / extent * self.wavelength * 1e-9;
        self.scale_unit.from_radians(radians)
    }
}

/// The long exposure image before it is handed to a profile
#[derive(Debug, Clone, PartialEq)]
pub struct IntegratedPsf {
    /// Accumulated intensity
    pub image: DMatrix<f64>,
    /// Pixel scale
    pub scale: f64,
    /// Pixel scale unit
    pub scale_unit: ScaleUnit,
    /// Number of accumulated frames
    pub n_step: usize,
}
impl IntegratedPsf {
    /// Builds a profile from the long exposure image
    pub fn into_profile<P: ProfileFromImage>(self) -> Result<P> {
        Ok(P::from_image(self.image, self.scale)?)
    }
}

/// Short to long exposure PSF integrator
pub struct PsfIntegrator<T = FftTransform> {
    transform: T,
    normalization: ExposureNormalization,
    max_fft_size: usize,
    progress: bool,
}
impl Default for PsfIntegrator<FftTransform> {
    fn default() -> Self {
        Self::with_transform(FftTransform::new())
    }
}
impl PsfIntegrator<FftTransform> {
    pub fn new() -> Self {
        Default::default()
    }
}
impl<T: Transform2D> PsfIntegrator<T> {
    /// Creates an integrator that uses the given Fourier transform
    pub fn with_transform(transform: T) -> Self {
        Self {
            transform,
            normalization: Default::default(),
            max_fft_size: MAX_FFT_SIZE,
            progress: false,
        }
    }
    /// Sets the long exposure normalization
    pub fn normalization(self, normalization: ExposureNormalization) -> Self {
        Self {
            normalization,
            ..self
        }
    }
    /// Sets the largest FFT size
    pub fn max_fft_size(self, max_fft_size: usize) -> Self {
        Self {
            max_fft_size,
            ..self
        }
    }
    /// Displays a progress bar during the integration
    pub fn progress(self, progress: bool) -> Self {
        Self { progress, ..self }
    }
    /// Integrates the PSF over the exposure
    ///
    /// The generator is advanced by `ceil(exptime/time_step)` steps.
    pub fn integrate<G, U>(
        &mut self,
        generator: &mut PhaseScreenGenerator<G, U>,
        exposure: &Exposure,
    ) -> Result<IntegratedPsf>
    where
        G: GaussianSource,
        U: Transform2D,
    {
        exposure.check()?;
        let n = generator.size();
        let m = PAD * n;
        if m > self.max_fft_size {
            return Err(PsfError::TooLarge {
                size: m,
                max: self.max_fft_size,
            });
        }
        let n_step = exposure.n_step();
        let scale = exposure.pixel_scale(generator.extent());
        log::info!(
            "PSF: {} frame(s) of {}x{}px at {:.4}{}",
            n_step,
            m,
            m,
            scale,
            exposure.scale_unit
        );

        let pb = if self.progress {
            let pb = ProgressBar::new(n_step as u64);
            if let Ok(style) = ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} ({eta})") {
                pb.set_style(style);
            }
            pb.set_message("PSF integration");
            pb
        } else {
            ProgressBar::hidden()
        };

        let offset = n / 2;
        let norm = exposure.flux / (scale * scale);
        let mut image = DMatrix::<f64>::zeros(m, m);
        for step in 0..n_step {
            let phase = generator.step();
            let mut wavefront = DMatrix::<Complex64>::zeros(m, m);
            wavefront
                .view_mut((offset, offset), (n, n))
                .zip_apply(&phase, |w, p| *w = Complex64::from_polar(1., p));
            let mut field = ifftshift(&wavefront);
            self.transform.inverse(&mut field);
            let frame = roll2d(
                &field.map(|z| z.norm_sqr()),
                ((m / 2) as isize, (m / 2) as isize),
            );
            let sum = frame.sum();
            if !(sum.is_finite() && sum > 0.) {
                pb.abandon();
                return Err(PsfError::DegenerateFrame { step, sum });
            }
            image.zip_apply(&frame, |i, f| *i += f * norm / sum);
            pb.inc(1);
        }
        pb.finish();

        if let ExposureNormalization::Mean = self.normalization {
            image /= n_step as f64;
        }
        Ok(IntegratedPsf {
            image,
            scale,
            scale_unit: exposure.scale_unit,
            n_step,
        })
    }
}

/// Atmospheric PSF
///
/// The PSF keeps the phase screen generator it was built with, so it can be reused to
/// continue the same atmosphere in time.
#[derive(Debug)]
pub struct AtmosphericPsf {
    profile: SampledProfile,
    phase_generator: PhaseScreenGenerator,
    scale_unit: ScaleUnit,
    n_step: usize,
}
impl AtmosphericPsf {
    /// Image based profile of the PSF
    pub fn profile(&self) -> &SampledProfile {
        &self.profile
    }
    /// Pixel scale unit
    pub fn scale_unit(&self) -> ScaleUnit {
        self.scale_unit
    }
    /// Number of short exposures in the PSF
    pub fn n_step(&self) -> usize {
        self.n_step
    }
    /// The phase screen generator
    pub fn phase_generator(&self) -> &PhaseScreenGenerator {
        &self.phase_generator
    }
    /// Splits the PSF into its profile and its phase screen generator
    pub fn into_parts(self) -> (SampledProfile, PhaseScreenGenerator) {
        (self.profile, self.phase_generator)
    }
}
