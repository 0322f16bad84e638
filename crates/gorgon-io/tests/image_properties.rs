//! Addressing, sizing and reshaping properties of `ImageData`.

use approx::assert_relative_eq;
use gorgon_core::{BufferFormat, ImageKind, ImageSettings, PitchFlags, size_in_bytes};
use gorgon_io::{ImageData, ImageError};
use gorgon_ops::{Dithering, ImageFilter};

const RGBA8: BufferFormat = BufferFormat::R8G8B8A8UNorm;

fn sample_settings() -> Vec<ImageSettings> {
    vec![
        ImageSettings::new_1d(37, RGBA8).with_mip_count(0).with_array_count(3),
        ImageSettings::new_2d(64, 48, RGBA8).with_mip_count(0),
        ImageSettings::new_2d(13, 7, BufferFormat::R16G16Float).with_mip_count(0).with_array_count(4),
        ImageSettings::new_2d(30, 18, BufferFormat::Bc3UNorm).with_mip_count(0),
        ImageSettings::new_cube(16, BufferFormat::R8UNorm).with_mip_count(3),
        ImageSettings::new_3d(16, 8, 5, BufferFormat::R32Float).with_mip_count(0),
        ImageSettings::new_2d(9, 9, BufferFormat::R1UNorm).with_mip_count(0),
    ]
}

fn numbered(settings: &ImageSettings) -> ImageData {
    let size = size_in_bytes(settings, PitchFlags::None).unwrap();
    ImageData::from_vec(settings, (0..size).map(|i| (i * 7 % 256) as u8).collect()).unwrap()
}

#[test]
fn every_slot_lies_inside_the_allocation() {
    for settings in sample_settings() {
        let image = ImageData::new(&settings).unwrap();
        let size = image.size_in_bytes();
        let s = *image.settings();
        for mip in 0..s.mip_count {
            let planes = if s.kind == ImageKind::Image3D { image.depth_slice_count(mip) } else { s.array_count };
            for index in 0..planes {
                let slot = image.slot(mip, index).unwrap();
                assert!(slot.offset + slot.len() <= size, "{s}: mip {mip} index {index}");
            }
            // The slices of one level are contiguous.
            let first = image.slot(mip, 0).unwrap();
            let depth = image.depth_slice_count(mip) as usize;
            assert!(first.offset + first.slice_pitch * depth <= size);
        }
    }
}

#[test]
fn size_matches_sum_of_slots() {
    for settings in sample_settings() {
        let image = ImageData::new(&settings).unwrap();
        let total: usize = image.slots().iter().map(|slot| slot.slice_pitch).sum();
        assert_eq!(total, image.size_in_bytes(), "{}", image.settings());
        assert_eq!(total, size_in_bytes(&settings, PitchFlags::None).unwrap());
    }
}

#[test]
fn full_mip_chain_halves_each_level() {
    let mut image = ImageData::new(&ImageSettings::new_2d(256, 256, RGBA8)).unwrap();
    let mips = image.generate_mip_maps(0, ImageFilter::Fant).unwrap();
    assert_eq!(mips, 9);
    assert_eq!(image.settings().mip_count, 9);

    let widths: Vec<u32> = (0..9).map(|mip| image.slot(mip, 0).unwrap().width).collect();
    assert_eq!(widths, vec![256, 128, 64, 32, 16, 8, 4, 2, 1]);
    for mip in 1..9 {
        let above = image.slot(mip - 1, 0).unwrap();
        let slot = image.slot(mip, 0).unwrap();
        assert_eq!(slot.width, (above.width / 2).max(1));
        assert_eq!(slot.height, (above.height / 2).max(1));
    }
}

#[test]
fn mip_generation_keeps_level_zero_and_clamps_count() {
    let settings = ImageSettings::new_2d(8, 4, RGBA8).with_array_count(2);
    let mut image = numbered(&settings);
    let top: Vec<Vec<u8>> = (0..2).map(|a| image.buffer(0, a).unwrap().as_bytes().to_vec()).collect();

    assert_eq!(image.generate_mip_maps(40, ImageFilter::Linear).unwrap(), 4);
    for (a, bytes) in top.iter().enumerate() {
        assert_eq!(image.buffer(0, a as u32).unwrap().as_bytes(), bytes.as_slice());
    }
    assert_eq!(image.slot(3, 1).unwrap().width, 1);

    // Dropping levels works too.
    assert_eq!(image.generate_mip_maps(2, ImageFilter::Point).unwrap(), 2);
    assert_eq!(image.slots().len(), 4);
}

#[test]
fn mip_filter_averages_constant_planes() {
    let settings = ImageSettings::new_2d(16, 16, BufferFormat::R32Float);
    let mut image = ImageData::new(&settings).unwrap();
    image.buffer_mut(0, 0).unwrap().fill_pixel(&0.25f32.to_le_bytes()).unwrap();
    image.generate_mip_maps(0, ImageFilter::Cubic).unwrap();

    let last = image.buffer(4, 0).unwrap();
    let value = f32::from_le_bytes(last.row(0)[..4].try_into().unwrap());
    assert_relative_eq!(value, 0.25, epsilon = 1e-5);
}

#[test]
fn resize_to_current_size_is_a_no_op() {
    let settings = ImageSettings::new_2d(12, 10, RGBA8).with_mip_count(0);
    let mut image = numbered(&settings);
    let before = image.to_raw_vec();
    for clip in [false, true] {
        image.resize(12, 10, clip, ImageFilter::Fant).unwrap();
        assert_eq!(image.settings(), &settings.sanitize().unwrap());
        assert_eq!(image.as_bytes(), before.as_slice());
    }
}

#[test]
fn converting_to_the_current_format_is_a_no_op() {
    let mut image = numbered(&ImageSettings::new_2d(5, 3, RGBA8));
    let before = image.to_raw_vec();
    image.convert_format(RGBA8, Dithering::Ordered8x8).unwrap();
    assert_eq!(image.as_bytes(), before.as_slice());
}

#[test]
fn repeated_conversion_matches_single_conversion() {
    let starts = [
        BufferFormat::B8G8R8A8UNorm,
        BufferFormat::R16G16B16A16Float,
        BufferFormat::R32G32B32A32Float,
        BufferFormat::B5G6R5UNorm,
        BufferFormat::R10G10B10A2UNorm,
    ];
    for start in starts {
        let settings = ImageSettings::new_2d(6, 5, start).with_mip_count(0);
        let source = numbered(&ImageSettings::new_2d(6, 5, RGBA8).with_mip_count(0));
        let mut seed = source.clone();
        seed.convert_format(start, Dithering::None).unwrap();
        assert_eq!(seed.settings().format, settings.format);

        let mut once = seed.clone();
        once.convert_format(RGBA8, Dithering::None).unwrap();
        let mut twice = seed.clone();
        twice.convert_format(RGBA8, Dithering::None).unwrap();
        twice.convert_format(RGBA8, Dithering::None).unwrap();
        assert_eq!(once.as_bytes(), twice.as_bytes(), "from {start}");
    }
}

#[test]
fn lossless_conversion_roundtrips() {
    let original = numbered(&ImageSettings::new_2d(7, 3, RGBA8).with_mip_count(0));
    let mut image = original.clone();
    image.convert_format(BufferFormat::R32G32B32A32Float, Dithering::None).unwrap();
    image.convert_format(BufferFormat::R16G16B16A16UNorm, Dithering::None).unwrap();
    image.convert_format(RGBA8, Dithering::None).unwrap();
    assert_eq!(image.as_bytes(), original.as_bytes());
}

#[test]
fn dithered_conversion_keeps_shape() {
    let mut image = numbered(&ImageSettings::new_2d(16, 16, RGBA8).with_mip_count(0));
    image.convert_format(BufferFormat::B4G4R4A4UNorm, Dithering::ErrorDiffusion).unwrap();
    assert_eq!(image.settings().mip_count, 5);
    assert_eq!(image.size_in_bytes(), size_in_bytes(image.settings(), PitchFlags::None).unwrap());
}

#[test]
fn cube_array_count_rounds_up_to_six() {
    let settings = ImageSettings::new_cube(8, RGBA8).with_array_count(4);
    let image = ImageData::new(&settings).unwrap();
    assert_eq!(image.settings().array_count, 6);
    assert_eq!(image.settings().kind, ImageKind::ImageCube);
    assert!(image.slot(0, 5).is_ok());
    assert!(image.slot(0, 6).unwrap_err().is_range_error());
}

#[test]
fn short_seed_buffer_is_rejected() {
    let settings = ImageSettings::new_2d(4, 4, RGBA8);
    let err = ImageData::from_vec(&settings, vec![0u8; 63]).unwrap_err();
    assert!(err.is_size_mismatch(), "{err}");
    let err = ImageData::from_bytes(&settings, &[0u8; 10]).unwrap_err();
    assert!(matches!(
        err,
        ImageError::Core(gorgon_core::Error::SizeMismatch { expected: 64, actual: 10 })
    ));
}

#[test]
fn unknown_format_cannot_be_created() {
    let err = ImageData::new(&ImageSettings::new_2d(4, 4, BufferFormat::Unknown)).unwrap_err();
    assert!(matches!(err, ImageError::Core(gorgon_core::Error::CannotCreate { .. })));
}

#[test]
fn oversized_images_are_rejected_without_allocating() {
    let cases = [
        ImageSettings::new_2d(u32::MAX, u32::MAX, BufferFormat::R32G32B32A32Float),
        ImageSettings::new_2d(65536, 65536, BufferFormat::R32G32B32A32Float)
            .with_mip_count(0)
            .with_array_count(u32::MAX),
        ImageSettings::new_cube(1 << 16, BufferFormat::R32G32B32A32Float).with_array_count(u32::MAX),
    ];
    for settings in cases {
        let err = ImageData::new(&settings).unwrap_err();
        assert!(matches!(err, ImageError::Core(gorgon_core::Error::InvalidDimensions { .. })), "{settings}: {err}");
    }
}

#[test]
fn raw_bytes_rebuild_identical_image() {
    for settings in sample_settings() {
        let image = numbered(&settings);
        let raw = image.save_raw().to_vec();
        let copy = ImageData::from_vec(&settings, raw.clone()).unwrap();
        assert_eq!(copy.as_bytes(), raw.as_slice());
        assert_eq!(copy.slots(), image.slots());

        let borrowed = ImageData::from_bytes(&settings, &raw).unwrap();
        assert_eq!(borrowed.to_raw_vec(), raw);
    }
}

#[test]
fn failed_reshape_leaves_image_untouched() {
    let settings = ImageSettings::new_2d(8, 8, BufferFormat::D24UNormS8UInt);
    let mut image = numbered(&settings);
    let before = image.to_raw_vec();

    assert!(image.generate_mip_maps(0, ImageFilter::Fant).unwrap_err().is_unsupported());
    assert!(image.resize(4, 4, false, ImageFilter::Fant).unwrap_err().is_unsupported());
    assert!(image.convert_format(RGBA8, Dithering::None).unwrap_err().is_unsupported());

    assert_eq!(image.settings(), &settings.sanitize().unwrap());
    assert_eq!(image.as_bytes(), before.as_slice());
}
