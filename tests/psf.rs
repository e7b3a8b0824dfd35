use std::time::Instant;

use atmpsf::{
    build_psf, AtmosphericPsf, AtmosphericPsfBuilder, Builder, FromBuilder, PhaseScreenGenerator,
    SampledProfile, ScaleUnit, TomlConfig,
};

#[test]
fn long_exposure() {
    let now = Instant::now();
    let psf = AtmosphericPsf::builder()
        .screen_size(4.)
        .screen_scale(0.125)
        .r0(vec![0.2, 0.15])
        .velocity(vec![10., 5.])
        .direction(vec![0., std::f64::consts::FRAC_PI_2])
        .alpha_mag(vec![0.99, 0.9])
        .time_step(0.125)
        .exptime(1.)
        .flux(2.)
        .seed(123)
        .build()
        .unwrap();
    println!("PSF in {:?}", now.elapsed());
    assert_eq!(psf.n_step(), 8);
    assert_eq!(psf.profile().shape(), (64, 64));
    let flux = psf.profile().flux();
    println!("flux: {flux}");
    assert!((flux - 16.).abs() / 16. < 1e-6);
    assert_eq!(psf.phase_generator().n_layer(), 2);
}

#[test]
fn seeing_broadens_the_psf() {
    let fwhm = |r0: f64| {
        AtmosphericPsf::builder()
            .screen_size(2.)
            .screen_scale(0.125)
            .r0(r0)
            .time_step(0.25)
            .exptime(1.)
            .seed(7)
            .build()
            .unwrap()
            .profile()
            .fwhm()
    };
    let (bad, good) = (fwhm(0.05), fwhm(1.));
    println!("FWHM: {bad:.3} vs {good:.3}arcsec");
    assert!(bad > 2. * good);
}

#[test]
fn continued_atmosphere() {
    let mut atm = PhaseScreenGenerator::builder()
        .screen_size(2.)
        .screen_scale(0.125)
        .time_step(0.25)
        .velocity(8f64)
        .seed(3)
        .build()
        .unwrap();
    for _ in 0..3 {
        let profile: SampledProfile = build_psf(
            500.,
            0.2f64,
            0.999f64,
            0.5,
            0.25,
            0f64,
            0f64,
            1.,
            ScaleUnit::Arcsecond,
            Some(&mut atm),
        )
        .unwrap();
        assert!((profile.flux() - 2.).abs() < 1e-6);
    }
    assert_eq!(atm.n_step(), 6);
}

#[test]
fn toml_config() -> anyhow::Result<()> {
    let path = std::env::temp_dir().join("atmpsf_integration.toml");
    std::fs::write(
        &path,
        r#"# ::atmpsf::AtmosphericPsfBuilder

wavelength = 700.0
exptime = 0.5
flux = 1.0
scale_unit = "milliarcsecond"
normalization = "mean"

[atmosphere]
time_step = 0.25
screen_size = 2.0
screen_scale = 0.125
r0 = [0.2, 0.1]
alpha_mag = 0.99
velocity = [5.0, 15.0]
direction = 0.0
seed = 11
"#,
    )?;
    let psf = AtmosphericPsfBuilder::load(&path)?.build()?;
    std::fs::remove_file(path)?;
    assert_eq!(psf.n_step(), 2);
    assert_eq!(psf.scale_unit(), ScaleUnit::MilliArcsecond);
    assert!((psf.profile().flux() - 1.).abs() < 1e-6);
    let scale = ScaleUnit::MilliArcsecond.from_radians(700e-9);
    assert!((psf.profile().pixel_scale() - scale).abs() / scale < 1e-12);
    Ok(())
}
