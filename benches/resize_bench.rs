use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, Rgb, RgbImage};
use photo_squeeze::{resize_image, target_dimensions};
use std::path::PathBuf;
use tempfile::TempDir;

fn create_test_photo(width: u32, height: u32) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let test_file = temp_dir.path().join("photo.jpg");
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    DynamicImage::ImageRgb8(img).save(&test_file).unwrap();
    (test_file, temp_dir)
}

fn bench_target_dimensions(c: &mut Criterion) {
    c.bench_function("target_dimensions", |b| {
        b.iter(|| target_dimensions(black_box(4032), black_box(3024), black_box(1200)))
    });
}

fn bench_resize_image(c: &mut Criterion) {
    let (test_file, temp_dir) = create_test_photo(1920, 1080);
    let out_dir = temp_dir.path().join("out");

    let mut group = c.benchmark_group("resize_image");
    group.sample_size(10);
    for max in [320u32, 800, 1200] {
        group.bench_with_input(BenchmarkId::from_parameter(max), &max, |b, &max| {
            b.iter(|| resize_image(black_box(&test_file), Some(&out_dir), "_small", max))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_target_dimensions, bench_resize_image);
criterion_main!(benches);
