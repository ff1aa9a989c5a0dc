//! Percentile field checked against the brute-force neighborhood sort.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::cast_possible_truncation)]

use image::GrayImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rbgg_core::{compute_percentile_field, normalize, PercentileFieldComputer, WindowGeometry};
use rbgg_test_support::{reference, SyntheticImageBuilder};

const PERCENTILES: [f64; 6] = [0.1, 0.25, 0.5, 0.6, 0.9, 1.0];

fn assert_matches_oracle(image: &GrayImage, radius: u32, p: f64) {
    let field = compute_percentile_field(image, radius, p).expect("field");
    let expected = reference::percentile_field(image, radius, p);
    for (x, y, pixel) in expected.enumerate_pixels() {
        assert_eq!(
            field.get(x, y),
            pixel.0[0],
            "({x}, {y}) of {}x{} with r={radius} p={p}",
            image.width(),
            image.height()
        );
    }
}

#[test]
fn test_field_equals_brute_force_on_random_images() {
    let mut rng = StdRng::seed_from_u64(0x7262_6767);
    for _ in 0..24 {
        let width = rng.gen_range(8..=32);
        let height = rng.gen_range(8..=32);
        let radius = rng.gen_range(1..=4);
        let image = SyntheticImageBuilder::noise(width, height, rng.gen());
        for p in PERCENTILES {
            assert_matches_oracle(&image, radius, p);
        }
    }
}

#[test]
fn test_field_equals_brute_force_on_narrow_ranges() {
    // Few distinct values means many ties inside each window
    for seed in 0..6 {
        let image = SyntheticImageBuilder::noise_in_range(17, 13, 120, 124, seed);
        for radius in 1..=4 {
            assert_matches_oracle(&image, radius, 0.9);
            assert_matches_oracle(&image, radius, 0.5);
        }
    }
}

#[test]
fn test_field_equals_brute_force_on_text_page() {
    let image = SyntheticImageBuilder::text_on_gradient(32, 32);
    for radius in 1..=4 {
        assert_matches_oracle(&image, radius, 0.9);
    }
}

#[test]
fn test_one_pixel_wide_and_tall_images() {
    for radius in 1..=5 {
        assert_matches_oracle(&SyntheticImageBuilder::noise(1, 20, 3), radius, 0.9);
        assert_matches_oracle(&SyntheticImageBuilder::noise(20, 1, 4), radius, 0.25);
    }
    assert_matches_oracle(&SyntheticImageBuilder::uniform_luma(1, 1, 9), 1, 0.9);
}

#[test]
fn test_radius_exceeding_image_matches_oracle() {
    let image = SyntheticImageBuilder::noise(5, 3, 11);
    assert_matches_oracle(&image, 8, 0.9);
    assert_matches_oracle(&image, 8, 0.3);
}

#[test]
fn test_parallel_and_sequential_are_bit_identical() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..8 {
        let width = rng.gen_range(1..=80);
        let height = rng.gen_range(1..=80);
        let image = SyntheticImageBuilder::noise(width, height, rng.gen());
        let geometry = WindowGeometry::new(rng.gen_range(1..=6), 0.9).expect("geometry");

        let parallel = PercentileFieldComputer::new(geometry)
            .compute(&image)
            .expect("parallel");
        let sequential = PercentileFieldComputer::new(geometry)
            .with_parallel(false)
            .compute(&image)
            .expect("sequential");
        assert_eq!(parallel.as_raw(), sequential.as_raw());
    }
}

#[test]
fn test_bright_spot_scenario() {
    let image = SyntheticImageBuilder::bright_spot_4x4();
    let field = compute_percentile_field(&image, 1, 0.9).expect("field");
    assert_eq!(field.get(2, 2), 200);
    assert_eq!(field.get(0, 0), 100);
    assert_matches_oracle(&image, 1, 0.9);
}

#[test]
fn test_all_black_region_divides_by_one() {
    // Left half black, right half mid gray
    let image = GrayImage::from_fn(24, 8, |x, _| image::Luma([if x < 12 { 0 } else { 80 }]));
    let field = compute_percentile_field(&image, 2, 0.9).expect("field");
    assert_eq!(field.get(0, 4), 0);

    let flattened = normalize(&image, &field, 240).expect("normalize");
    // 0 / max(0, 1) * 240 = 0
    assert_eq!(flattened.get_pixel(0, 4).0[0], 0);
    assert_eq!(flattened.get_pixel(23, 4).0[0], 240);
}
