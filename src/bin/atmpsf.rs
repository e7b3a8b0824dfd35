use std::{path::PathBuf, time::Instant};

use atmpsf::{
    AtmosphericPsf, AtmosphericPsfBuilder, Builder, ExposureNormalization, FromBuilder,
    ScaleUnit, TomlConfig,
};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, ValueEnum)]
enum Normalization {
    Sum,
    Mean,
}
impl From<Normalization> for ExposureNormalization {
    fn from(value: Normalization) -> Self {
        match value {
            Normalization::Sum => ExposureNormalization::Sum,
            Normalization::Mean => ExposureNormalization::Mean,
        }
    }
}

#[derive(Parser)]
#[command(name = "atmpsf")]
#[command(about = "Long exposure PSF through an autoregressive atmosphere")]
struct Args {
    /// Builder toml file, the other options override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Saves the builder to a toml file
    #[arg(long)]
    save: Option<PathBuf>,
    /// Wavelength [nm]
    #[arg(long)]
    wavelength: Option<f64>,
    /// Fried parameter of each layer [m]
    #[arg(long, value_delimiter = ',')]
    r0: Vec<f64>,
    /// Wind speed of each layer [m/s]
    #[arg(long, value_delimiter = ',')]
    velocity: Vec<f64>,
    /// Wind direction of each layer, counter-clockwise from +x [deg]
    #[arg(long, value_delimiter = ',')]
    direction: Vec<f64>,
    /// Autoregressive parameter magnitude of each layer
    #[arg(long, value_delimiter = ',')]
    alpha_mag: Vec<f64>,
    /// Exposure time [s]
    #[arg(long)]
    exptime: Option<f64>,
    /// Time step [s]
    #[arg(long)]
    time_step: Option<f64>,
    /// Phase screen size [m]
    #[arg(long)]
    screen_size: Option<f64>,
    /// Phase screen pixel scale [m]
    #[arg(long)]
    screen_scale: Option<f64>,
    /// Flux of each short exposure
    #[arg(long)]
    flux: Option<f64>,
    /// PSF pixel scale unit: rd, deg, arcmin, arcsec or mas
    #[arg(long)]
    unit: Option<ScaleUnit>,
    /// Long exposure normalization
    #[arg(long, value_enum)]
    normalization: Option<Normalization>,
    /// Random number generator seed
    #[arg(long)]
    seed: Option<u64>,
    /// Displays a progress bar
    #[arg(long)]
    progress: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut builder = match &args.config {
        Some(path) => AtmosphericPsfBuilder::load(path)?,
        None => AtmosphericPsf::builder(),
    };
    if let Some(wavelength) = args.wavelength {
        builder = builder.wavelength(wavelength);
    }
    if !args.r0.is_empty() {
        builder = builder.r0(args.r0);
    }
    if !args.velocity.is_empty() {
        builder = builder.velocity(args.velocity);
    }
    if !args.direction.is_empty() {
        builder = builder.direction(
            args.direction
                .into_iter()
                .map(f64::to_radians)
                .collect::<Vec<_>>(),
        );
    }
    if !args.alpha_mag.is_empty() {
        builder = builder.alpha_mag(args.alpha_mag);
    }
    if let Some(exptime) = args.exptime {
        builder = builder.exptime(exptime);
    }
    if let Some(time_step) = args.time_step {
        builder = builder.time_step(time_step);
    }
    if let Some(screen_size) = args.screen_size {
        builder = builder.screen_size(screen_size);
    }
    if let Some(screen_scale) = args.screen_scale {
        builder = builder.screen_scale(screen_scale);
    }
    if let Some(flux) = args.flux {
        builder = builder.flux(flux);
    }
    if let Some(unit) = args.unit {
        builder = builder.scale_unit(unit);
    }
    if let Some(normalization) = args.normalization {
        builder = builder.normalization(normalization.into());
    }
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    if let Some(path) = &args.save {
        builder.save(path)?;
        println!("Builder saved to {path:?}");
    }
    if args.progress {
        builder = builder.progress();
    }

    let now = Instant::now();
    let psf = builder.build()?;
    let profile = psf.profile();
    let unit = psf.scale_unit();
    println!(
        "PSF: {} frame(s) integrated in {}ms",
        psf.n_step(),
        now.elapsed().as_millis()
    );
    let (n_rows, n_cols) = profile.shape();
    println!(" * size       : {n_rows}x{n_cols}px");
    println!(" * pixel scale: {:.4}{unit}", profile.pixel_scale());
    println!(" * flux       : {:.4}", profile.flux());
    println!(" * peak       : {:.4e}", profile.peak());
    let (x, y) = profile.centroid();
    println!(" * centroid   : ({x:.4},{y:.4}){unit}");
    println!(" * FWHM       : {:.4}{unit}", profile.fwhm());

    Ok(())
}
