use serde::{Deserialize, Serialize};

use crate::{
    config::TomlConfig,
    layers::{broadcast, PerLayer},
    spectrum::{PowerSpectrum, SpectrumError},
    AtmpsfError, Builder, FftTransform, FromBuilder, NormalDeviate,
};

use super::{PhaseScreenError, PhaseScreenGenerator};

/// Largest FFT size allowed by default
pub const MAX_FFT_SIZE: usize = 8192;

/// [PhaseScreenGenerator] builder
///
/// Default properties:
///  * time step      : 0.03s
///  * screen size    : 10m
///  * screen scale   : 0.1m
///  * r0             : 0.2m
///  * alpha_mag      : 0.999
///  * wind speed     : 0m/s
///  * wind direction : 0rd
///  * seed           : none (seeded from the OS)
///  * max FFT size   : 8192
///
/// `r0`, `velocity`, `direction` and `alpha_mag` are given either for all the layers
/// or for each layer; the number of layers is the length of the longest list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseScreenGeneratorBuilder {
    pub time_step: f64,
    pub screen_size: f64,
    pub screen_scale: f64,
    pub r0: PerLayer<f64>,
    pub alpha_mag: PerLayer<f64>,
    pub velocity: PerLayer<f64>,
    pub direction: PerLayer<f64>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "max_fft_size")]
    pub max_fft_size: usize,
}
fn max_fft_size() -> usize {
    MAX_FFT_SIZE
}
impl Default for PhaseScreenGeneratorBuilder {
    fn default() -> Self {
        Self {
            time_step: 0.03,
            screen_size: 10.,
            screen_scale: 0.1,
            r0: PerLayer::One(0.2),
            alpha_mag: PerLayer::One(0.999),
            velocity: PerLayer::One(0.),
            direction: PerLayer::One(0.),
            seed: None,
            max_fft_size: MAX_FFT_SIZE,
        }
    }
}
impl TomlConfig for PhaseScreenGeneratorBuilder {
    const HEADER: &'static str = "::atmpsf::PhaseScreenGeneratorBuilder";
}
impl PhaseScreenGeneratorBuilder {
    /// Set the time interval between 2 phase screens in seconds
    pub fn time_step(self, time_step: f64) -> Self {
        Self { time_step, ..self }
    }
    /// Set the phase screen side length in meters
    pub fn screen_size(self, screen_size: f64) -> Self {
        Self {
            screen_size,
            ..self
        }
    }
    /// Set the phase screen pixel scale in meters
    pub fn screen_scale(self, screen_scale: f64) -> Self {
        Self {
            screen_scale,
            ..self
        }
    }
    /// Set the Fried parameter in meters
    pub fn r0<P: Into<PerLayer<f64>>>(self, r0: P) -> Self {
        Self {
            r0: r0.into(),
            ..self
        }
    }
    /// Set the magnitude of the autoregressive parameter
    ///
    /// `1-alpha_mag` is the fraction of the phase of the previous time step that is
    /// replaced by new turbulence
    pub fn alpha_mag<P: Into<PerLayer<f64>>>(self, alpha_mag: P) -> Self {
        Self {
            alpha_mag: alpha_mag.into(),
            ..self
        }
    }
    /// Set the wind speed in m/s
    pub fn velocity<P: Into<PerLayer<f64>>>(self, velocity: P) -> Self {
        Self {
            velocity: velocity.into(),
            ..self
        }
    }
    /// Set the wind direction in radians, counter-clockwise from +x
    pub fn direction<P: Into<PerLayer<f64>>>(self, direction: P) -> Self {
        Self {
            direction: direction.into(),
            ..self
        }
    }
    /// Set the seed of the random number generator
    pub fn seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }
    /// Set the largest FFT size
    pub fn max_fft_size(self, max_fft_size: usize) -> Self {
        Self {
            max_fft_size,
            ..self
        }
    }
    /// Number of pixels across the phase screen
    pub fn size(&self) -> usize {
        (self.screen_size / self.screen_scale).ceil() as usize
    }
    /// Checks the parameters and returns the power spectrum model
    pub fn power_spectrum(&self) -> std::result::Result<PowerSpectrum, PhaseScreenError> {
        if !(self.time_step.is_finite() && self.time_step > 0.) {
            return Err(PhaseScreenError::TimeStep(self.time_step));
        }
        if !(self.screen_size.is_finite()
            && self.screen_size > 0.
            && self.screen_scale.is_finite()
            && self.screen_scale > 0.)
        {
            return Err(PhaseScreenError::Screen {
                size: self.screen_size,
                scale: self.screen_scale,
            });
        }
        let size = self.size();
        if size > self.max_fft_size {
            return Err(PhaseScreenError::TooLarge {
                size,
                max: self.max_fft_size,
            });
        }
        Ok(PowerSpectrum::new(
            size,
            self.screen_scale,
            self.time_step.recip(),
        ))
    }
}
impl Builder for PhaseScreenGeneratorBuilder {
    type Component = PhaseScreenGenerator;
    /// Build the [PhaseScreenGenerator]
    fn build(self) -> std::result::Result<PhaseScreenGenerator, AtmpsfError> {
        let params = broadcast(&self.r0, &self.velocity, &self.direction, &self.alpha_mag)
            .map_err(SpectrumError::from)
            .map_err(PhaseScreenError::from)?;
        let spectrum = self.power_spectrum()?;
        let spectra = spectrum.build(&params).map_err(PhaseScreenError::from)?;
        log::info!(
            "Phase screen generator: {} layer(s), {}x{} screen at {:.3}m/px, {:.0}Hz",
            params.n_layer(),
            spectrum.size,
            spectrum.size,
            spectrum.scale,
            spectrum.rate
        );
        let generator = PhaseScreenGenerator::from_spectra(
            spectra,
            self.screen_scale,
            NormalDeviate::new(self.seed),
            FftTransform::new(),
        )?;
        Ok(generator)
    }
}
impl FromBuilder for PhaseScreenGenerator {
    type ComponentBuilder = PhaseScreenGeneratorBuilder;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_size() {
        let builder = PhaseScreenGeneratorBuilder::default();
        assert_eq!(builder.size(), 100);
    }

    #[test]
    fn not_broadcastable() {
        let err = PhaseScreenGenerator::builder()
            .screen_size(1.)
            .r0([0.2, 0.15, 0.1])
            .direction([0., 1.])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            AtmpsfError::PhaseScreen(PhaseScreenError::Spectrum(SpectrumError::Layers(_)))
        ));
    }

    #[test]
    fn too_large() {
        let err = PhaseScreenGenerator::builder()
            .screen_scale(1e-4)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            AtmpsfError::PhaseScreen(PhaseScreenError::TooLarge { .. })
        ));
    }

    #[test]
    fn invalid_time_step() {
        let err = PhaseScreenGenerator::builder()
            .time_step(0.)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            AtmpsfError::PhaseScreen(PhaseScreenError::TimeStep(_))
        ));
    }

    #[test]
    fn invalid_screen() {
        let err = PhaseScreenGenerator::builder()
            .screen_size(-1.)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            AtmpsfError::PhaseScreen(PhaseScreenError::Screen { size, .. }) if size == -1.
        ));
        let err = PhaseScreenGenerator::builder()
            .screen_scale(0.)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            AtmpsfError::PhaseScreen(PhaseScreenError::Screen { scale, .. }) if scale == 0.
        ));
    }

    #[test]
    fn toml_round_trip() -> anyhow::Result<()> {
        let builder = PhaseScreenGeneratorBuilder::default()
            .r0(vec![0.2, 0.15])
            .direction([0., 1.])
            .seed(3);
        let path = std::env::temp_dir().join("atmpsf_phase_screen_builder.toml");
        builder.save(&path)?;
        let loaded = PhaseScreenGeneratorBuilder::load(&path)?;
        assert_eq!(builder, loaded);
        std::fs::remove_file(path)?;
        Ok(())
    }
}
