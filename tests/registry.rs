//! Chain parsing and dispatch through the filter registry.

use std::io::Cursor;

use image_craft::bmp;
use image_craft::{parse_chain, FilterRegistry, Image, ImageError, Rgb};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn tokens(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

#[test]
fn chain_runs_in_order() {
    let registry = FilterRegistry::standard();
    let mut image = Image::filled(10, 6, Rgb::WHITE).unwrap();
    let chain = parse_chain(&tokens("-crop 4 3 -neg -gs")).unwrap();

    registry
        .apply_chain(&mut image, &chain, &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(image.dimensions(), (4, 3));
    assert!(image.pixels().all(|c| c == Rgb::BLACK));
}

#[test]
fn every_filter_runs_with_sample_arguments() {
    let registry = FilterRegistry::standard();
    let samples = [
        ("crop", "5 5"),
        ("gs", ""),
        ("neg", ""),
        ("sharp", ""),
        ("edge", "0.2"),
        ("med", "3"),
        ("blur", "0.8"),
        ("crystallize", ""),
        ("glass", ""),
        ("sepia", ""),
        ("vignette", ""),
    ];
    assert_eq!(samples.len(), registry.iter().count());

    for (name, args) in samples {
        let mut image = Image::from_fn(8, 8, |x, y| {
            Rgb::new(x as f32 / 8.0, y as f32 / 8.0, 0.5)
        })
        .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        registry
            .apply(name, &mut image, &tokens(args), &mut rng)
            .unwrap_or_else(|e| panic!("{} failed: {}", name, e));
    }
}

#[test]
fn aliases_match_primary_names() {
    let registry = FilterRegistry::standard();
    let original = Image::from_fn(9, 9, |x, y| {
        Rgb::new((x * y) as f32 / 64.0, x as f32 / 8.0, y as f32 / 8.0)
    })
    .unwrap();

    for (short, long, args) in [
        ("gs", "grayscale", ""),
        ("sharp", "sharpen", ""),
        ("blur", "gaussian_blur", "1.2"),
        ("glass", "glass_distortion", ""),
    ] {
        let mut a = original.clone();
        let mut b = original.clone();
        registry
            .apply(short, &mut a, &tokens(args), &mut StdRng::seed_from_u64(4))
            .unwrap();
        registry
            .apply(long, &mut b, &tokens(args), &mut StdRng::seed_from_u64(4))
            .unwrap();
        assert_eq!(a, b, "{} vs {}", short, long);
    }
}

#[test]
fn failing_filter_stops_chain() {
    let registry = FilterRegistry::standard();
    let mut image = Image::filled(4, 4, Rgb::gray(0.5)).unwrap();
    let chain = parse_chain(&tokens("-neg -med 4 -gs")).unwrap();

    let result = registry.apply_chain(&mut image, &chain, &mut StdRng::seed_from_u64(0));
    assert!(matches!(result, Err(ImageError::Validation(_))));
    // Negative already ran; grayscale never did
    assert!(image.pixels().all(|c| c == Rgb::gray(0.5)));
}

#[test]
fn unknown_filter_in_chain() {
    let registry = FilterRegistry::standard();
    let mut image = Image::new(2, 2).unwrap();
    let chain = parse_chain(&tokens("-gs -posterize 4")).unwrap();
    let result = registry.apply_chain(&mut image, &chain, &mut StdRng::seed_from_u64(0));
    assert!(matches!(result, Err(ImageError::UnknownFilter(name)) if name == "posterize"));
}

#[test]
fn bmp_bytes_through_chain() {
    let registry = FilterRegistry::standard();
    let source = Image::from_fn(6, 5, |x, _| if x < 3 { Rgb::BLACK } else { Rgb::WHITE }).unwrap();
    let mut encoded = Vec::new();
    bmp::write_bmp(&mut encoded, &source).unwrap();

    let mut image = bmp::read_bmp(&mut Cursor::new(encoded)).unwrap();
    let chain = parse_chain(&tokens("-edge 0.5 -crop 4 5")).unwrap();
    registry
        .apply_chain(&mut image, &chain, &mut StdRng::seed_from_u64(0))
        .unwrap();

    assert_eq!(image.dimensions(), (4, 5));
    assert_eq!(image.get(0, 0), Some(Rgb::BLACK));
    assert_eq!(image.get(2, 0), Some(Rgb::WHITE));
    assert_eq!(image.get(3, 4), Some(Rgb::WHITE));
}
