use atmpsf::{Builder, Exposure, FromBuilder, PhaseScreenGenerator, PsfIntegrator, ScaleUnit};
use criterion::*;

fn generator(screen_scale: f64, n_layer: usize) -> PhaseScreenGenerator {
    PhaseScreenGenerator::builder()
        .screen_scale(screen_scale)
        .r0(vec![0.2; n_layer])
        .velocity((0..n_layer).map(|i| 5. * (i + 1) as f64).collect::<Vec<_>>())
        .direction(vec![0.; n_layer])
        .seed(1)
        .build()
        .unwrap()
}

pub fn phase_screen_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("phase_screen_step");
    for n_layer in [1, 3, 7] {
        let mut atm = generator(0.1, n_layer);
        group.bench_with_input(BenchmarkId::new("layers", n_layer), &n_layer, |b, _| {
            b.iter(|| atm.step())
        });
    }
    group.finish();
}

pub fn psf_benchmark(c: &mut Criterion) {
    let exposure = Exposure {
        wavelength: 500.,
        time_step: 0.03,
        exptime: 0.03,
        flux: 1.,
        scale_unit: ScaleUnit::Arcsecond,
    };
    let mut group = c.benchmark_group("psf_frame");
    for screen_scale in [0.2, 0.1, 0.05] {
        let mut atm = generator(screen_scale, 1);
        let mut integrator = PsfIntegrator::new();
        group.bench_with_input(
            BenchmarkId::new("size", atm.size()),
            &screen_scale,
            |b, _| b.iter(|| integrator.integrate(&mut atm, &exposure).unwrap()),
        );
    }
    group.finish();
}

criterion_group!(benches, phase_screen_benchmark, psf_benchmark);
criterion_main!(benches);
