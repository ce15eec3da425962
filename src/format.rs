// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Texture formats and the layout math used to move texel data in and out of mip levels.
//!
//! Transfers are described by three pieces:
//!
//! - a [`MipLevelInfo`], the dimensions and block layout of one level of a texture,
//! - a [`Volume`], the sub-region of that level being transferred,
//! - a [`TransferInfo`], how the caller's bytes for that region are laid out in memory.
//!
//! A transfer is *packed* when its rows and slices follow each other without padding.
//! Native uploads only accept packed data, so anything else is repacked through
//! [`transfer_volume`].
//!
//! Compressed formats are stored in 4x4 blocks.  Their volumes must start on a block
//! boundary and may only end off-boundary at the right or bottom edge of the level.

/// Texel formats a texture may be created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit BGRX, alpha ignored.
    Xrgb8,
    /// 8-bit BGRA.
    Argb8,
    /// 16-bit float RGBA.
    Abgr16F,
    /// Single-channel 32-bit float.
    R32F,
    /// 32-bit float RGBA.
    Abgr32F,
    /// BC1, 8 bytes per 4x4 block.
    Dxt1,
    /// BC2, 16 bytes per 4x4 block.
    Dxt3,
    /// BC3, 16 bytes per 4x4 block.
    Dxt5,
}

impl TextureFormat {
    pub const fn is_compressed(self) -> bool {
        matches!(
            self,
            TextureFormat::Dxt1 | TextureFormat::Dxt3 | TextureFormat::Dxt5
        )
    }

    /// Width and height, in texels, of one storage block.
    pub const fn block_extent(self) -> (u32, u32) {
        if self.is_compressed() { (4, 4) } else { (1, 1) }
    }

    /// Bytes occupied by one storage block (one texel for uncompressed formats).
    pub const fn bytes_per_block(self) -> u32 {
        match self {
            TextureFormat::Xrgb8 | TextureFormat::Argb8 | TextureFormat::R32F => 4,
            TextureFormat::Abgr16F => 8,
            TextureFormat::Abgr32F => 16,
            TextureFormat::Dxt1 => 8,
            TextureFormat::Dxt3 | TextureFormat::Dxt5 => 16,
        }
    }
}

/// Size of `base` at mip `level`: halved per level, never below 1.
pub const fn mip_dimension(base: u32, level: u32) -> u32 {
    let shifted = if level >= 32 { 0 } else { base >> level };
    if shifted == 0 { 1 } else { shifted }
}

/// Number of levels in a complete mip chain for the given base size.
pub fn full_mip_chain_length(width: u32, height: u32, depth: u32) -> u32 {
    let largest = width.max(height).max(depth).max(1);
    32 - largest.leading_zeros()
}

/// A box within one mip level, in texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Volume {
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Volume {
    pub const fn new(x: u32, y: u32, z: u32, width: u32, height: u32, depth: u32) -> Self {
        Volume {
            x,
            y,
            z,
            width,
            height,
            depth,
        }
    }

    /// A 2D rectangle at depth 0.
    pub const fn rect(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::new(x, y, 0, width, height, 1)
    }

    /// The whole of a level with the given dimensions.
    pub const fn full(width: u32, height: u32, depth: u32) -> Self {
        Self::new(0, 0, 0, width, height, depth)
    }
}

/// Dimensions and block layout of one mip level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipLevelInfo {
    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl MipLevelInfo {
    pub fn new(format: TextureFormat, base_width: u32, base_height: u32, base_depth: u32, level: u32) -> Self {
        MipLevelInfo {
            format,
            width: mip_dimension(base_width, level),
            height: mip_dimension(base_height, level),
            depth: mip_dimension(base_depth, level),
        }
    }

    fn blocks(&self, width: u32, height: u32) -> (usize, usize) {
        let (bw, bh) = self.format.block_extent();
        (width.div_ceil(bw) as usize, height.div_ceil(bh) as usize)
    }

    /// Bytes needed for one packed row of blocks `width` texels wide.
    pub fn row_size(&self, width: u32) -> usize {
        self.blocks(width, 1).0 * self.format.bytes_per_block() as usize
    }

    /// Number of block rows covering `height` texels.
    pub fn block_rows(&self, height: u32) -> usize {
        self.blocks(1, height).1
    }

    /// Bytes occupied by the whole level when tightly packed, or `None` if that
    /// does not fit in `usize`.
    pub fn level_size(&self) -> Option<usize> {
        self.row_size(self.width)
            .checked_mul(self.block_rows(self.height))?
            .checked_mul(self.depth as usize)
    }

    pub fn full_volume(&self) -> Volume {
        Volume::full(self.width, self.height, self.depth)
    }

    pub fn is_full(&self, volume: &Volume) -> bool {
        *volume == self.full_volume()
    }

    /// Whether `volume` lies inside this level and respects block alignment.
    pub fn check_volume(&self, volume: &Volume) -> bool {
        if volume.width == 0 || volume.height == 0 || volume.depth == 0 {
            return false;
        }
        let fits = |start: u32, extent: u32, limit: u32| {
            start.checked_add(extent).is_some_and(|end| end <= limit)
        };
        if !fits(volume.x, volume.width, self.width)
            || !fits(volume.y, volume.height, self.height)
            || !fits(volume.z, volume.depth, self.depth)
        {
            return false;
        }
        let (bw, bh) = self.format.block_extent();
        let aligned = |start: u32, extent: u32, block: u32, limit: u32| {
            start % block == 0 && (extent % block == 0 || start + extent == limit)
        };
        aligned(volume.x, volume.width, bw, self.width)
            && aligned(volume.y, volume.height, bh, self.height)
    }
}

/// Memory layout of the caller's bytes for one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferInfo {
    pub row_pitch: usize,
    pub slice_pitch: usize,
    /// Bytes of actual data per row; at most `row_pitch`.
    pub row_size: usize,
    /// Minimum number of bytes the caller must supply.
    pub total_size: usize,
    pub packed: bool,
}

impl TransferInfo {
    /// Describes `volume` laid out with the given pitches.
    ///
    /// Returns `None` when rows or slices would overlap.
    pub fn new(mip: &MipLevelInfo, volume: &Volume, row_pitch: usize, slice_pitch: usize) -> Option<Self> {
        let row_size = mip.row_size(volume.width);
        let rows = mip.block_rows(volume.height);
        let depth = volume.depth as usize;
        if rows == 0 || depth == 0 {
            return None;
        }
        if rows > 1 && row_pitch < row_size {
            return None;
        }
        let slice_size = row_pitch.checked_mul(rows - 1)?.checked_add(row_size)?;
        if depth > 1 && slice_pitch < slice_size {
            return None;
        }
        let total_size = slice_pitch.checked_mul(depth - 1)?.checked_add(slice_size)?;
        let packed = (rows == 1 || row_pitch == row_size)
            && (depth == 1 || slice_pitch == row_size * rows);
        Some(TransferInfo {
            row_pitch,
            slice_pitch,
            row_size,
            total_size,
            packed,
        })
    }

    /// Describes `volume` with no padding between rows or slices.
    pub fn packed(mip: &MipLevelInfo, volume: &Volume) -> Self {
        let row_size = mip.row_size(volume.width);
        let rows = mip.block_rows(volume.height);
        let slice_pitch = row_size * rows;
        TransferInfo {
            row_pitch: row_size,
            slice_pitch,
            row_size,
            total_size: slice_pitch * volume.depth as usize,
            packed: true,
        }
    }
}

/// Copies `volume` from `src` to `dst`, each described by its own layout.
///
/// Both buffers must hold at least their layout's `total_size` bytes; the
/// caller validates this before mutating anything.
pub fn transfer_volume(
    volume: &Volume,
    mip: &MipLevelInfo,
    dst_info: &TransferInfo,
    dst: &mut [u8],
    src_info: &TransferInfo,
    src: &[u8],
) {
    debug_assert_eq!(dst_info.row_size, src_info.row_size);
    debug_assert!(dst.len() >= dst_info.total_size);
    debug_assert!(src.len() >= src_info.total_size);
    let row_size = src_info.row_size;
    let rows = mip.block_rows(volume.height);
    if dst_info.packed && src_info.packed {
        dst[..src_info.total_size].copy_from_slice(&src[..src_info.total_size]);
        return;
    }
    for slice in 0..volume.depth as usize {
        for row in 0..rows {
            let s = slice * src_info.slice_pitch + row * src_info.row_pitch;
            let d = slice * dst_info.slice_pitch + row * dst_info.row_pitch;
            dst[d..d + row_size].copy_from_slice(&src[s..s + row_size]);
        }
    }
}

/// Offset and layout of `volume` inside a packed full level.
fn sub_volume_layout(mip: &MipLevelInfo, volume: &Volume) -> (usize, TransferInfo) {
    let level = TransferInfo::packed(mip, &mip.full_volume());
    let (bw, bh) = mip.format.block_extent();
    let offset = volume.z as usize * level.slice_pitch
        + (volume.y / bh) as usize * level.row_pitch
        + (volume.x / bw) as usize * mip.format.bytes_per_block() as usize;
    let row_size = mip.row_size(volume.width);
    let rows = mip.block_rows(volume.height);
    let depth = volume.depth as usize;
    let info = TransferInfo {
        row_pitch: level.row_pitch,
        slice_pitch: level.slice_pitch,
        row_size,
        total_size: level.slice_pitch * (depth - 1) + level.row_pitch * (rows - 1) + row_size,
        packed: (rows == 1 || level.row_pitch == row_size)
            && (depth == 1 || level.slice_pitch == row_size * rows),
    };
    (offset, info)
}

/// Copies `volume` out of a packed full level into a packed sub-volume buffer.
pub(crate) fn extract_volume(mip: &MipLevelInfo, level_bytes: &[u8], volume: &Volume, out: &mut [u8]) {
    let (offset, src_info) = sub_volume_layout(mip, volume);
    let dst_info = TransferInfo::packed(mip, volume);
    transfer_volume(volume, mip, &dst_info, out, &src_info, &level_bytes[offset..]);
}

/// Copies a packed sub-volume into its place inside a packed full level.
pub(crate) fn insert_volume(mip: &MipLevelInfo, level_bytes: &mut [u8], volume: &Volume, data: &[u8]) {
    let (offset, dst_info) = sub_volume_layout(mip, volume);
    let src_info = TransferInfo::packed(mip, volume);
    transfer_volume(volume, mip, &dst_info, &mut level_bytes[offset..], &src_info, data);
}
