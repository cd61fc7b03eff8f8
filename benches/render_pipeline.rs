use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use mandelbrot_viewer::core::data::complex::Complex;
use mandelbrot_viewer::core::fractals::mandelbrot::algorithm::evaluate;
use mandelbrot_viewer::{
    ColourMapKind, DEFAULT_VIEW, DeviceSize, GpuBackend, MandelbrotConfig, RenderPipeline,
    SoftwareBackend, render_frame_cpu,
};

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    for (name, point) in [
        ("interior", Complex::new(-0.1, 0.1)),
        ("boundary", Complex::new(-0.7435, 0.1314)),
        ("exterior", Complex::new(1.5, 1.5)),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &point, |b, &point| {
            b.iter(|| evaluate(black_box(point), 1000));
        });
    }

    group.finish();
}

fn bench_render_cpu(c: &mut Criterion) {
    let config = MandelbrotConfig::default();
    let colour_map = config.build_colour_map(config.palette());
    let size = DeviceSize::new(320, 240);

    c.bench_function("render_frame_cpu 320x240", |b| {
        b.iter(|| render_frame_cpu(&DEFAULT_VIEW, size, config.max_iterations, colour_map.as_ref()));
    });
}

fn bench_software_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("software_pipeline");

    for kind in [
        ColourMapKind::Palette,
        ColourMapKind::Exponential,
        ColourMapKind::MagnitudeTint,
    ] {
        let config = MandelbrotConfig {
            colour_map_kind: kind,
            ..MandelbrotConfig::default()
        };
        let Ok(mut pipeline) = RenderPipeline::new(SoftwareBackend::new(), config) else {
            continue;
        };
        pipeline.set_viewport_size(DeviceSize::new(320, 240));

        group.bench_function(BenchmarkId::from_parameter(format!("{kind:?}")), |b| {
            b.iter(|| pipeline.render_view(black_box(&DEFAULT_VIEW)));
        });
    }

    group.finish();
}

fn bench_gpu_pipeline(c: &mut Criterion) {
    let backend = match GpuBackend::new() {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("skipping gpu_pipeline: {e}");
            return;
        }
    };
    let Ok(mut pipeline) = RenderPipeline::new(backend, MandelbrotConfig::default()) else {
        return;
    };
    pipeline.set_viewport_size(DeviceSize::new(320, 240));

    c.bench_function("gpu_pipeline 320x240", |b| {
        b.iter(|| pipeline.render_view(black_box(&DEFAULT_VIEW)));
    });
}

criterion_group!(
    benches,
    bench_evaluate,
    bench_render_cpu,
    bench_software_pipeline,
    bench_gpu_pipeline
);
criterion_main!(benches);
