use serde::{Deserialize, Serialize};

use crate::{
    angle::ScaleUnit,
    config::TomlConfig,
    layers::PerLayer,
    profile::{ProfileFromImage, SampledProfile},
    AtmpsfError, Builder, FromBuilder, PhaseScreenGenerator, PhaseScreenGeneratorBuilder,
};

use super::{AtmosphericPsf, Exposure, ExposureNormalization, PsfError, PsfIntegrator, PAD};

/// [AtmosphericPsf] builder
///
/// Default properties:
///  * wavelength    : 500nm
///  * exposure time : 0.3s
///  * flux          : 1
///  * scale unit    : arcsec
///  * normalization : sum of the frames
///  * atmosphere    : [PhaseScreenGeneratorBuilder] defaults
///
/// The time step of the exposure is the time step of the atmosphere.
/// If a [PhaseScreenGenerator] is given with [phase_generator](AtmosphericPsfBuilder::phase_generator),
/// the atmosphere parameters are ignored and the PSF continues the evolution of that generator.
///
/// # Examples
///
/// ```
/// use atmpsf::{AtmosphericPsf, Builder, FromBuilder};
/// let psf = AtmosphericPsf::builder()
///     .screen_size(2.)
///     .screen_scale(0.125)
///     .time_step(0.25)
///     .exptime(0.75)
///     .velocity(10f64)
///     .seed(1)
///     .build()
///     .unwrap();
/// assert_eq!(psf.n_step(), 3);
/// assert_eq!(psf.profile().shape(), (32, 32));
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct AtmosphericPsfBuilder {
    pub wavelength: f64,
    pub exptime: f64,
    pub flux: f64,
    #[serde(default)]
    pub scale_unit: ScaleUnit,
    #[serde(default)]
    pub normalization: ExposureNormalization,
    #[serde(skip)]
    progress: bool,
    pub atmosphere: PhaseScreenGeneratorBuilder,
    #[serde(skip)]
    phase_generator: Option<PhaseScreenGenerator>,
}
impl Default for AtmosphericPsfBuilder {
    fn default() -> Self {
        Self {
            wavelength: 500.,
            exptime: 0.3,
            flux: 1.,
            scale_unit: Default::default(),
            normalization: Default::default(),
            progress: false,
            atmosphere: Default::default(),
            phase_generator: None,
        }
    }
}
impl TomlConfig for AtmosphericPsfBuilder {
    const HEADER: &'static str = "::atmpsf::AtmosphericPsfBuilder";
}
impl AtmosphericPsfBuilder {
    /// Set the wavelength in nanometers
    pub fn wavelength(self, wavelength: f64) -> Self {
        Self { wavelength, ..self }
    }
    /// Set the exposure time in seconds
    pub fn exptime(self, exptime: f64) -> Self {
        Self { exptime, ..self }
    }
    /// Set the flux of each short exposure
    pub fn flux(self, flux: f64) -> Self {
        Self { flux, ..self }
    }
    /// Set the unit of the PSF pixel scale
    pub fn scale_unit(self, scale_unit: ScaleUnit) -> Self {
        Self { scale_unit, ..self }
    }
    /// Set the long exposure normalization
    pub fn normalization(self, normalization: ExposureNormalization) -> Self {
        Self {
            normalization,
            ..self
        }
    }
    /// Displays a progress bar while integrating
    pub fn progress(self) -> Self {
        Self {
            progress: true,
            ..self
        }
    }
    /// Set the atmosphere
    pub fn atmosphere(self, atmosphere: PhaseScreenGeneratorBuilder) -> Self {
        Self { atmosphere, ..self }
    }
    /// Uses an existing phase screen generator instead of building a new one
    pub fn phase_generator(self, phase_generator: PhaseScreenGenerator) -> Self {
        Self {
            phase_generator: Some(phase_generator),
            ..self
        }
    }
    /// Set the Fried parameter in meters
    pub fn r0<P: Into<PerLayer<f64>>>(self, r0: P) -> Self {
        Self {
            atmosphere: self.atmosphere.r0(r0),
            ..self
        }
    }
    /// Set the magnitude of the autoregressive parameter
    pub fn alpha_mag<P: Into<PerLayer<f64>>>(self, alpha_mag: P) -> Self {
        Self {
            atmosphere: self.atmosphere.alpha_mag(alpha_mag),
            ..self
        }
    }
    /// Set the wind speed in m/s
    pub fn velocity<P: Into<PerLayer<f64>>>(self, velocity: P) -> Self {
        Self {
            atmosphere: self.atmosphere.velocity(velocity),
            ..self
        }
    }
    /// Set the wind direction in radians
    pub fn direction<P: Into<PerLayer<f64>>>(self, direction: P) -> Self {
        Self {
            atmosphere: self.atmosphere.direction(direction),
            ..self
        }
    }
    /// Set the time interval between 2 short exposures in seconds
    pub fn time_step(self, time_step: f64) -> Self {
        Self {
            atmosphere: self.atmosphere.time_step(time_step),
            ..self
        }
    }
    /// Set the phase screen side length in meters
    pub fn screen_size(self, screen_size: f64) -> Self {
        Self {
            atmosphere: self.atmosphere.screen_size(screen_size),
            ..self
        }
    }
    /// Set the phase screen pixel scale in meters
    pub fn screen_scale(self, screen_scale: f64) -> Self {
        Self {
            atmosphere: self.atmosphere.screen_scale(screen_scale),
            ..self
        }
    }
    /// Set the seed of the random number generator
    pub fn seed(self, seed: u64) -> Self {
        Self {
            atmosphere: self.atmosphere.seed(seed),
            ..self
        }
    }
    /// Set the largest FFT size
    pub fn max_fft_size(self, max_fft_size: usize) -> Self {
        Self {
            atmosphere: self.atmosphere.max_fft_size(max_fft_size),
            ..self
        }
    }
    fn exposure(&self) -> Exposure {
        Exposure {
            wavelength: self.wavelength,
            time_step: self.atmosphere.time_step,
            exptime: self.exptime,
            flux: self.flux,
            scale_unit: self.scale_unit,
        }
    }
}
impl Builder for AtmosphericPsfBuilder {
    type Component = AtmosphericPsf;
    /// Build the [AtmosphericPsf]
    fn build(self) -> std::result::Result<AtmosphericPsf, AtmpsfError> {
        let exposure = self.exposure();
        exposure.check()?;
        let max_fft_size = self.atmosphere.max_fft_size;
        let mut phase_generator = match self.phase_generator {
            Some(phase_generator) => phase_generator,
            None => {
                check_padded_size(&self.atmosphere)?;
                self.atmosphere.build()?
            }
        };
        let integrated = PsfIntegrator::new()
            .normalization(self.normalization)
            .max_fft_size(max_fft_size)
            .progress(self.progress)
            .integrate(&mut phase_generator, &exposure)?;
        let n_step = integrated.n_step;
        let profile: SampledProfile = integrated.into_profile()?;
        log::info!(
            "Atmospheric PSF: {} frame(s), flux {:.3}, FWHM {:.3}{}",
            n_step,
            profile.flux(),
            profile.fwhm(),
            self.scale_unit
        );
        Ok(AtmosphericPsf {
            profile,
            phase_generator,
            scale_unit: self.scale_unit,
            n_step,
        })
    }
}
// the padded grid is checked before any allocation
fn check_padded_size(atmosphere: &PhaseScreenGeneratorBuilder) -> crate::Result<()> {
    let size = PAD * atmosphere.power_spectrum()?.size;
    if size > atmosphere.max_fft_size {
        return Err(PsfError::TooLarge {
            size,
            max: atmosphere.max_fft_size,
        }
        .into());
    }
    Ok(())
}

impl FromBuilder for AtmosphericPsf {
    type ComponentBuilder = AtmosphericPsfBuilder;
}

/// Builds a long exposure atmospheric PSF
///
/// * `lam`: wavelength in nanometers
/// * `r0`: Fried parameter in meters, per layer
/// * `alpha_mag`: magnitude of the autoregressive parameter, per layer
/// * `exptime`: exposure time in seconds
/// * `time_step`: time interval between 2 short exposures in seconds
/// * `velocity`: wind speed in m/s, per layer
/// * `direction`: wind direction in radians, per layer
/// * `flux`: flux of each short exposure
/// * `scale_unit`: unit of the pixel scale
/// * `phase_generator`: a generator to continue; if `None` a 10m wide screen sampled at
///   0.1m is created from the other parameters
///
/// A supplied generator keeps its own turbulence parameters, only the exposure
/// parameters are used and the generator is advanced by the number of time steps.
#[allow(clippy::too_many_arguments)]
pub fn build_psf<P: ProfileFromImage>(
    lam: f64,
    r0: impl Into<PerLayer<f64>>,
    alpha_mag: impl Into<PerLayer<f64>>,
    exptime: f64,
    time_step: f64,
    velocity: impl Into<PerLayer<f64>>,
    direction: impl Into<PerLayer<f64>>,
    flux: f64,
    scale_unit: ScaleUnit,
    phase_generator: Option<&mut PhaseScreenGenerator>,
) -> crate::Result<P> {
    let exposure = Exposure {
        wavelength: lam,
        time_step,
        exptime,
        flux,
        scale_unit,
    };
    exposure.check()?;
    let mut integrator = PsfIntegrator::new();
    let integrated = match phase_generator {
        Some(phase_generator) => integrator.integrate(phase_generator, &exposure)?,
        None => {
            let atmosphere = PhaseScreenGeneratorBuilder::default()
                .r0(r0)
                .alpha_mag(alpha_mag)
                .velocity(velocity)
                .direction(direction)
                .time_step(time_step);
            check_padded_size(&atmosphere)?;
            let mut phase_generator = atmosphere.build()?;
            integrator.integrate(&mut phase_generator, &exposure)?
        }
    };
    Ok(integrated.into_profile()?)
}
