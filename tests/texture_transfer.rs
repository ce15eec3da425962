// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use command_buffer_gapi::error::Error;
use command_buffer_gapi::format::{TextureFormat, Volume};
use command_buffer_gapi::resource::ResourceKind;
use command_buffer_gapi::texture::{CubeFace, TextureFlags};
use command_buffer_gapi::{Gapi, GapiConfig, INVALID_RESOURCE, ParseError, ResourceId, SoftDevice};

const TEXTURE: ResourceId = ResourceId(3);

fn engine() -> Gapi<SoftDevice> {
    let mut gapi = Gapi::new(SoftDevice::new(16, 16), GapiConfig::default());
    gapi.initialize().unwrap();
    gapi
}

#[test]
fn sub_volume_of_a_smaller_level() {
    let mut gapi = engine();
    gapi.create_texture_2d(TEXTURE, 4, 4, 3, TextureFormat::Xrgb8, TextureFlags::empty())
        .unwrap();
    let texel = Volume::rect(1, 1, 1, 1);
    gapi.set_texture_data(TEXTURE, &texel, 1, CubeFace::PositiveX, 4, 4, &[1, 2, 3, 4])
        .unwrap();
    let result = gapi.set_texture_data(TEXTURE, &texel, 1, CubeFace::PositiveX, 4, 4, &[5, 6]);
    assert_eq!(ParseError::from_result(&result), ParseError::InvalidArguments);

    let mut level = [0xFFu8; 16];
    gapi.get_texture_data(
        TEXTURE,
        &Volume::rect(0, 0, 2, 2),
        1,
        CubeFace::PositiveX,
        8,
        16,
        &mut level,
    )
    .unwrap();
    assert_eq!(level, [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4]);

    let full: Vec<u8> = (0..16).collect();
    gapi.set_texture_data(TEXTURE, &Volume::rect(0, 0, 2, 2), 1, CubeFace::PositiveX, 8, 16, &full)
        .unwrap();
    let mut one = [0u8; 4];
    gapi.get_texture_data(TEXTURE, &texel, 1, CubeFace::PositiveX, 4, 4, &mut one)
        .unwrap();
    assert_eq!(one, [12, 13, 14, 15]);
}

#[test]
fn out_of_range_accesses_fail() {
    let mut gapi = engine();
    gapi.create_texture_2d(TEXTURE, 4, 4, 3, TextureFormat::Argb8, TextureFlags::empty())
        .unwrap();
    let mut out = [0u8; 64];
    assert!(
        gapi.get_texture_data(TEXTURE, &Volume::rect(0, 0, 1, 1), 3, CubeFace::PositiveX, 4, 4, &mut out)
            .is_err()
    );
    assert!(matches!(
        gapi.get_texture_data(TEXTURE, &Volume::rect(3, 3, 2, 1), 0, CubeFace::PositiveX, 8, 8, &mut out),
        Err(Error::OutOfRange)
    ));
    assert!(
        gapi.set_texture_data(TEXTURE, &Volume::rect(0, 0, 0, 1), 0, CubeFace::PositiveX, 0, 0, &[])
            .is_err()
    );
    // rows would overlap
    assert!(
        gapi.set_texture_data(TEXTURE, &Volume::rect(0, 0, 2, 2), 0, CubeFace::PositiveX, 4, 16, &out)
            .is_err()
    );
}

#[test]
fn level_counts_are_bounded() {
    let mut gapi = engine();
    assert!(
        gapi.create_texture_2d(TEXTURE, 4, 4, 4, TextureFormat::Argb8, TextureFlags::empty())
            .is_err()
    );
    assert!(
        gapi.create_texture_2d(TEXTURE, 4, 4, 0, TextureFormat::Argb8, TextureFlags::empty())
            .is_err()
    );
    assert!(gapi.textures().is_empty());

    let mut small = Gapi::new(
        SoftDevice::new(16, 16),
        GapiConfig::default().with_max_texture_levels(2),
    );
    small.initialize().unwrap();
    assert!(
        small
            .create_texture_2d(TEXTURE, 4, 4, 3, TextureFormat::Argb8, TextureFlags::empty())
            .is_err()
    );
    small
        .create_texture_2d(TEXTURE, 4, 4, 2, TextureFormat::Argb8, TextureFlags::DYNAMIC)
        .unwrap();
    assert!(small.textures().get(TEXTURE).unwrap().flags().contains(TextureFlags::DYNAMIC));
}

#[test]
fn volume_texture_slices() {
    let mut gapi = engine();
    gapi.create_texture_3d(TEXTURE, 4, 4, 2, 1, TextureFormat::Argb8, TextureFlags::empty())
        .unwrap();
    let data: Vec<u8> = (0..32).collect();
    gapi.set_texture_data(
        TEXTURE,
        &Volume::new(0, 0, 0, 2, 2, 2),
        0,
        CubeFace::PositiveX,
        8,
        16,
        &data,
    )
    .unwrap();

    let mut level = vec![0u8; 128];
    gapi.get_texture_data(
        TEXTURE,
        &Volume::full(4, 4, 2),
        0,
        CubeFace::PositiveX,
        16,
        64,
        &mut level,
    )
    .unwrap();
    assert_eq!(&level[0..8], &data[0..8]);
    assert_eq!(&level[16..24], &data[8..16]);
    assert_eq!(&level[64..72], &data[16..24]);
    assert_eq!(&level[80..88], &data[24..32]);
    assert_eq!(&level[8..16], &[0; 8]);
}

#[test]
fn cube_faces_hold_separate_images() {
    let mut gapi = engine();
    gapi.create_texture_cube(TEXTURE, 2, 1, TextureFormat::R32F, TextureFlags::empty())
        .unwrap();
    let texel = Volume::rect(0, 1, 1, 1);
    gapi.set_texture_data(TEXTURE, &texel, 0, CubeFace::NegativeZ, 4, 4, &[1, 1, 1, 1])
        .unwrap();
    let mut out = [0u8; 4];
    gapi.get_texture_data(TEXTURE, &texel, 0, CubeFace::PositiveZ, 4, 4, &mut out)
        .unwrap();
    assert_eq!(out, [0; 4]);
    gapi.get_texture_data(TEXTURE, &texel, 0, CubeFace::NegativeZ, 4, 4, &mut out)
        .unwrap();
    assert_eq!(out, [1; 4]);
}

#[test]
fn compressed_transfers_are_block_aligned() {
    let mut gapi = engine();
    gapi.create_texture_2d(TEXTURE, 8, 8, 3, TextureFormat::Dxt1, TextureFlags::empty())
        .unwrap();
    gapi.set_texture_data(TEXTURE, &Volume::rect(4, 4, 4, 4), 0, CubeFace::PositiveX, 8, 8, &[7; 8])
        .unwrap();
    assert!(
        gapi.set_texture_data(TEXTURE, &Volume::rect(2, 0, 4, 4), 0, CubeFace::PositiveX, 8, 8, &[7; 8])
            .is_err()
    );
    // the 2x2 level is a single partial block
    gapi.set_texture_data(TEXTURE, &Volume::rect(0, 0, 2, 2), 2, CubeFace::PositiveX, 8, 8, &[9; 8])
        .unwrap();

    let mut level = [0u8; 32];
    gapi.get_texture_data(TEXTURE, &Volume::rect(0, 0, 8, 8), 0, CubeFace::PositiveX, 16, 32, &mut level)
        .unwrap();
    assert_eq!(&level[..24], &[0; 24]);
    assert_eq!(&level[24..], &[7; 8]);
}

#[test]
fn create_destroy_round_trip() {
    let mut gapi = engine();
    gapi.create_texture_2d(TEXTURE, 2, 2, 1, TextureFormat::Abgr16F, TextureFlags::empty())
        .unwrap();
    assert_eq!(gapi.device().live_textures(), 1);
    gapi.destroy_texture(TEXTURE).unwrap();
    assert_eq!(gapi.device().live_textures(), 0);
    assert!(matches!(
        gapi.destroy_texture(TEXTURE),
        Err(Error::UnknownResource {
            kind: ResourceKind::Texture,
            ..
        })
    ));
    let mut out = [0u8; 8];
    assert!(
        gapi.get_texture_data(TEXTURE, &Volume::rect(0, 0, 1, 1), 0, CubeFace::PositiveX, 8, 8, &mut out)
            .is_err()
    );
}

#[test]
fn oversized_or_reserved_textures_are_rejected() {
    let mut gapi = engine();
    let result = gapi.create_texture_2d(TEXTURE, u32::MAX, u32::MAX, 1, TextureFormat::Abgr32F, TextureFlags::empty());
    assert_eq!(ParseError::from_result(&result), ParseError::InvalidArguments);
    assert!(
        gapi.create_texture_3d(TEXTURE, 2, 2, 8193, 1, TextureFormat::Argb8, TextureFlags::empty())
            .is_err()
    );
    assert!(
        gapi.create_texture_cube(INVALID_RESOURCE, 2, 1, TextureFormat::Argb8, TextureFlags::empty())
            .is_err()
    );
    assert!(gapi.textures().is_empty());
    assert_eq!(gapi.device().live_textures(), 0);

    let mut wide = Gapi::new(
        SoftDevice::new(16, 16),
        GapiConfig::default().with_max_texture_dimension(u32::MAX),
    );
    wide.initialize().unwrap();
    let result = wide.create_texture_2d(TEXTURE, u32::MAX, u32::MAX, 1, TextureFormat::Abgr32F, TextureFlags::empty());
    assert!(matches!(result, Err(Error::Device(_))));
    assert!(wide.textures().is_empty());
    assert_eq!(wide.device().live_textures(), 0);
}
