use crate::{
    config::ConfigError, layers::LayersError, phase_screen::PhaseScreenError, profile::ProfileError,
    psf::PsfError, spectrum::SpectrumError,
};

#[derive(Debug, thiserror::Error)]
pub enum AtmpsfError {
    #[error("cannot broadcast the layer parameters")]
    Layers(#[from] LayersError),
    #[error("cannot compute the power spectrum")]
    Spectrum(#[from] SpectrumError),
    #[error("cannot build `::atmpsf::PhaseScreenGenerator`")]
    PhaseScreen(#[from] PhaseScreenError),
    #[error("cannot build `::atmpsf::AtmosphericPsf`")]
    Psf(#[from] PsfError),
    #[error("cannot build the PSF profile")]
    Profile(#[from] ProfileError),
    #[error("configuration file error")]
    Config(#[from] ConfigError),
}
