//!
//! # Atmospheric PSF
//!
//! Time-evolving atmospheric phase screens and the long exposure point spread functions
//! they produce.
//!
//! The atmosphere is made of turbulence layers, each one with its own Fried parameter,
//! wind vector and "boiling" rate. The phase screens are generated with an autoregressive
//! model in the Fourier domain: at each time step the screen of the previous step is
//! shifted by the wind and partially replaced by new Kolmogorov turbulence.
//! The PSF is the sum of the short exposure PSFs of the phase screens over the exposure time.
//!
//! Both the [PhaseScreenGenerator] and the [AtmosphericPsf] are created with their builders:
//! ```rust
//! use atmpsf::{AtmosphericPsf, Builder, FromBuilder};
//! let psf = AtmosphericPsf::builder()
//!     .screen_size(2.)
//!     .screen_scale(0.125)
//!     .r0(vec![0.2, 0.15])
//!     .velocity(vec![10., 5.])
//!     .direction(vec![0., 45f64.to_radians()])
//!     .wavelength(800.)
//!     .seed(1)
//!     .build()
//!     .unwrap();
//! println!("PSF FWHM: {:.3}{}", psf.profile().fwhm(), psf.scale_unit());
//! ```

pub mod angle;
pub mod config;
pub mod error;
pub mod layers;
pub mod phase_screen;
pub mod profile;
pub mod psf;
pub mod random;
pub mod spectrum;
pub mod transform;

#[doc(inline)]
pub use self::angle::ScaleUnit;
#[doc(inline)]
pub use self::config::TomlConfig;
#[doc(inline)]
pub use self::error::AtmpsfError;
#[doc(inline)]
pub use self::layers::{broadcast, Layer, LayerParameters, PerLayer};
#[doc(inline)]
pub use self::phase_screen::{PhaseScreenGenerator, PhaseScreenGeneratorBuilder};
#[doc(inline)]
pub use self::profile::{ProfileFromImage, SampledProfile};
#[doc(inline)]
pub use self::psf::{
    build_psf, AtmosphericPsf, AtmosphericPsfBuilder, Exposure, ExposureNormalization,
    PsfIntegrator,
};
#[doc(inline)]
pub use self::random::{GaussianSource, NormalDeviate};
#[doc(inline)]
pub use self::spectrum::{LayerSpectrum, PowerSpectrum};
#[doc(inline)]
pub use self::transform::{FftTransform, Transform2D};

pub type Result<T> = std::result::Result<T, AtmpsfError>;

/// Builder type trait
pub trait Builder: Default {
    type Component;
    fn new() -> Self {
        Default::default()
    }
    fn build(self) -> Result<Self::Component>;
}

/// Access to the builder of a component
pub trait FromBuilder: Sized {
    type ComponentBuilder: Builder<Component = Self>;
    fn builder() -> Self::ComponentBuilder {
        Self::ComponentBuilder::default()
    }
}
