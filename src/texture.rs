// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Mip-mapped textures.
//!
//! 2D, 3D and cube textures share one [`Texture`] type tagged with a [`TextureShape`].
//! The mip chain is allocated in full when the texture is created; afterwards data
//! moves in and out one level (and, for cubes, one face) at a time.
//!
//! Callers describe their bytes with a row pitch and a slice pitch.  When those
//! describe anything other than tightly packed data, the transfer goes through a
//! scratch buffer (see [`crate::format::transfer_volume`]).  Reads of a partial level
//! also go through a scratch buffer, because reading a whole level is the only read
//! the native API offers.

use crate::device::{Device, ImageTarget, NativeTexture, TextureTarget};
use crate::error::Error;
use crate::format::{MipLevelInfo, TextureFormat, TransferInfo, Volume, full_mip_chain_length, transfer_volume};
use crate::resource::{Resource, ResourceKind};
use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TextureFlags: u32 {
        /// Contents are expected to change often.
        const DYNAMIC = 0x1;
    }
}

/// One face of a cube texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];
}

/// Dimensionality and base size of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureShape {
    Texture2D { width: u32, height: u32 },
    Texture3D { width: u32, height: u32, depth: u32 },
    Cube { side: u32 },
}

impl TextureShape {
    /// Width, height and depth of level 0.
    pub const fn base_dimensions(&self) -> (u32, u32, u32) {
        match *self {
            TextureShape::Texture2D { width, height } => (width, height, 1),
            TextureShape::Texture3D {
                width,
                height,
                depth,
            } => (width, height, depth),
            TextureShape::Cube { side } => (side, side, 1),
        }
    }

    pub const fn target(&self) -> TextureTarget {
        match self {
            TextureShape::Texture2D { .. } => TextureTarget::Texture2D,
            TextureShape::Texture3D { .. } => TextureTarget::Texture3D,
            TextureShape::Cube { .. } => TextureTarget::CubeMap,
        }
    }

    /// The image slot addressed by `face`.  Only cubes have faces; the others
    /// ignore it.
    pub const fn image(&self, face: CubeFace) -> ImageTarget {
        match self {
            TextureShape::Texture2D { .. } => ImageTarget::Texture2D,
            TextureShape::Texture3D { .. } => ImageTarget::Texture3D,
            TextureShape::Cube { .. } => ImageTarget::CubeFace(face),
        }
    }

    fn images(&self) -> Vec<ImageTarget> {
        match self {
            TextureShape::Cube { .. } => CubeFace::ALL.iter().map(|f| ImageTarget::CubeFace(*f)).collect(),
            _ => vec![self.image(CubeFace::PositiveX)],
        }
    }
}

#[derive(Debug)]
pub struct Texture {
    native: NativeTexture,
    shape: TextureShape,
    levels: u32,
    format: TextureFormat,
    flags: TextureFlags,
}

impl Texture {
    /// Allocates every level of the mip chain.
    pub fn create<D: Device + ?Sized>(
        device: &mut D,
        shape: TextureShape,
        levels: u32,
        format: TextureFormat,
        flags: TextureFlags,
    ) -> Result<Self, Error> {
        let (width, height, depth) = shape.base_dimensions();
        if width == 0 || height == 0 || depth == 0 {
            return Err(Error::InvalidArgument("texture dimensions must be non-zero"));
        }
        if levels == 0 || levels > full_mip_chain_length(width, height, depth) {
            return Err(Error::InvalidArgument("invalid mip level count"));
        }
        let target = shape.target();
        let native = device.create_texture(target)?;
        device.bind_texture(target, Some(native));
        let allocated = Self::allocate_chain(device, &shape, levels, format);
        device.bind_texture(target, None);
        if let Err(e) = allocated {
            device.delete_texture(native);
            return Err(e);
        }
        Ok(Texture {
            native,
            shape,
            levels,
            format,
            flags,
        })
    }

    fn allocate_chain<D: Device + ?Sized>(
        device: &mut D,
        shape: &TextureShape,
        levels: u32,
        format: TextureFormat,
    ) -> Result<(), Error> {
        let (width, height, depth) = shape.base_dimensions();
        for image in shape.images() {
            for level in 0..levels {
                let mip = MipLevelInfo::new(format, width, height, depth, level);
                device.tex_image(image, level, format, mip.width, mip.height, mip.depth)?;
            }
        }
        Ok(())
    }

    pub fn shape(&self) -> TextureShape {
        self.shape
    }

    pub fn levels(&self) -> u32 {
        self.levels
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn flags(&self) -> TextureFlags {
        self.flags
    }

    pub fn target(&self) -> TextureTarget {
        self.shape.target()
    }

    pub(crate) fn native(&self) -> NativeTexture {
        self.native
    }

    /// Layout of one level, or an error if the level does not exist.
    pub fn level_info(&self, level: u32) -> Result<MipLevelInfo, Error> {
        if level >= self.levels {
            return Err(Error::InvalidArgument("mip level out of range"));
        }
        let (width, height, depth) = self.shape.base_dimensions();
        Ok(MipLevelInfo::new(self.format, width, height, depth, level))
    }

    /// Validates a transfer and returns the level layout and the caller's layout.
    fn prepare_transfer(
        &self,
        volume: &Volume,
        level: u32,
        row_pitch: usize,
        slice_pitch: usize,
        len: usize,
    ) -> Result<(MipLevelInfo, TransferInfo), Error> {
        let mip = self.level_info(level)?;
        if !mip.check_volume(volume) {
            return Err(Error::OutOfRange);
        }
        let info = TransferInfo::new(&mip, volume, row_pitch, slice_pitch)
            .ok_or(Error::InvalidArgument("row or slice pitch too small"))?;
        if len < info.total_size {
            return Err(Error::InvalidArgument("not enough data for the requested volume"));
        }
        Ok((mip, info))
    }

    /// Uploads `volume` of `level` (and `face`, for cubes) from `data`.
    #[allow(clippy::too_many_arguments)]
    pub fn set_data<D: Device + ?Sized>(
        &self,
        device: &mut D,
        volume: &Volume,
        level: u32,
        face: CubeFace,
        row_pitch: usize,
        slice_pitch: usize,
        data: &[u8],
    ) -> Result<(), Error> {
        let (mip, src_info) = self.prepare_transfer(volume, level, row_pitch, slice_pitch, data.len())?;
        let image = self.shape.image(face);
        let target = self.target();
        device.bind_texture(target, Some(self.native));
        let result = if src_info.packed {
            device.tex_sub_image(image, level, volume, &data[..src_info.total_size])
        } else {
            let packed_info = TransferInfo::packed(&mip, volume);
            let mut scratch = vec![0u8; packed_info.total_size];
            transfer_volume(volume, &mip, &packed_info, &mut scratch, &src_info, data);
            device.tex_sub_image(image, level, volume, &scratch)
        };
        device.bind_texture(target, None);
        result.map_err(Error::from)
    }

    /// Reads `volume` of `level` (and `face`, for cubes) into `out`.
    #[allow(clippy::too_many_arguments)]
    pub fn get_data<D: Device + ?Sized>(
        &self,
        device: &mut D,
        volume: &Volume,
        level: u32,
        face: CubeFace,
        row_pitch: usize,
        slice_pitch: usize,
        out: &mut [u8],
    ) -> Result<(), Error> {
        let (mip, dst_info) = self.prepare_transfer(volume, level, row_pitch, slice_pitch, out.len())?;
        let level_size = mip.level_size().ok_or(Error::OutOfRange)?;
        let image = self.shape.image(face);
        let target = self.target();
        device.bind_texture(target, Some(self.native));
        let result = if dst_info.packed && mip.is_full(volume) {
            device.get_tex_image(image, level, &mut out[..dst_info.total_size])
        } else {
            let mut level_bytes = vec![0u8; level_size];
            device.get_tex_image(image, level, &mut level_bytes).map(|()| {
                let packed_info = TransferInfo::packed(&mip, volume);
                let mut scratch = vec![0u8; packed_info.total_size];
                crate::format::extract_volume(&mip, &level_bytes, volume, &mut scratch);
                transfer_volume(volume, &mip, &dst_info, out, &packed_info, &scratch);
            })
        };
        device.bind_texture(target, None);
        result.map_err(Error::from)
    }
}

impl Resource for Texture {
    const KIND: ResourceKind = ResourceKind::Texture;
    fn release<D: Device + ?Sized>(self, device: &mut D) {
        device.delete_texture(self.native);
    }
}
