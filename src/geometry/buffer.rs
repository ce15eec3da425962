// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::device::{BufferTarget, Device, IndexType, NativeBuffer};
use crate::error::Error;
use crate::resource::{Resource, ResourceKind};
use bitflags::bitflags;

bitflags! {
    /// Creation flags shared by vertex and index buffers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BufferFlags: u32 {
        /// Contents are expected to change often.
        const DYNAMIC = 0x1;
        /// Index buffers only: indices are 32-bit rather than 16-bit.
        const INDEX_32BIT = 0x2;
    }
}

/// Native storage shared by both buffer kinds.
#[derive(Debug)]
struct BufferStorage {
    native: NativeBuffer,
    target: BufferTarget,
    size: usize,
    flags: BufferFlags,
}

impl BufferStorage {
    fn create<D: Device + ?Sized>(
        device: &mut D,
        target: BufferTarget,
        size: usize,
        flags: BufferFlags,
    ) -> Result<Self, Error> {
        let native = device.create_buffer(target, size, flags.contains(BufferFlags::DYNAMIC))?;
        Ok(BufferStorage {
            native,
            target,
            size,
            flags,
        })
    }

    /// Rejects any range that does not lie entirely inside the buffer.
    fn check_range(&self, offset: usize, len: usize) -> Result<(), Error> {
        if offset >= self.size {
            return Err(Error::OutOfRange);
        }
        match offset.checked_add(len) {
            Some(end) if end <= self.size => Ok(()),
            _ => Err(Error::OutOfRange),
        }
    }

    fn set_data<D: Device + ?Sized>(&self, device: &mut D, offset: usize, data: &[u8]) -> Result<(), Error> {
        self.check_range(offset, data.len())?;
        device.buffer_sub_data(self.target, self.native, offset, data)?;
        Ok(())
    }

    fn get_data<D: Device + ?Sized>(&self, device: &mut D, offset: usize, out: &mut [u8]) -> Result<(), Error> {
        self.check_range(offset, out.len())?;
        device.get_buffer_sub_data(self.target, self.native, offset, out)?;
        Ok(())
    }
}

/// A fixed-size store of vertex data.
#[derive(Debug)]
pub struct VertexBuffer(BufferStorage);

impl VertexBuffer {
    /// Allocates `size` bytes of native storage.
    pub fn create<D: Device + ?Sized>(device: &mut D, size: usize, flags: BufferFlags) -> Result<Self, Error> {
        BufferStorage::create(device, BufferTarget::Array, size, flags).map(VertexBuffer)
    }

    pub fn size(&self) -> usize {
        self.0.size
    }

    pub fn flags(&self) -> BufferFlags {
        self.0.flags
    }

    pub(crate) fn native(&self) -> NativeBuffer {
        self.0.native
    }

    /// Writes `data` at `offset`.  Fails without writing anything if the range
    /// does not fit.
    pub fn set_data<D: Device + ?Sized>(&self, device: &mut D, offset: usize, data: &[u8]) -> Result<(), Error> {
        self.0.set_data(device, offset, data)
    }

    /// Reads `out.len()` bytes starting at `offset`.
    pub fn get_data<D: Device + ?Sized>(&self, device: &mut D, offset: usize, out: &mut [u8]) -> Result<(), Error> {
        self.0.get_data(device, offset, out)
    }
}

impl Resource for VertexBuffer {
    const KIND: ResourceKind = ResourceKind::VertexBuffer;
    fn release<D: Device + ?Sized>(self, device: &mut D) {
        device.delete_buffer(self.0.native);
    }
}

/// A fixed-size store of 16- or 32-bit indices.
#[derive(Debug)]
pub struct IndexBuffer(BufferStorage);

impl IndexBuffer {
    pub fn create<D: Device + ?Sized>(device: &mut D, size: usize, flags: BufferFlags) -> Result<Self, Error> {
        BufferStorage::create(device, BufferTarget::ElementArray, size, flags).map(IndexBuffer)
    }

    pub fn size(&self) -> usize {
        self.0.size
    }

    pub fn flags(&self) -> BufferFlags {
        self.0.flags
    }

    pub fn index_type(&self) -> IndexType {
        if self.0.flags.contains(BufferFlags::INDEX_32BIT) {
            IndexType::U32
        } else {
            IndexType::U16
        }
    }

    pub(crate) fn native(&self) -> NativeBuffer {
        self.0.native
    }

    pub fn set_data<D: Device + ?Sized>(&self, device: &mut D, offset: usize, data: &[u8]) -> Result<(), Error> {
        self.0.set_data(device, offset, data)
    }

    pub fn get_data<D: Device + ?Sized>(&self, device: &mut D, offset: usize, out: &mut [u8]) -> Result<(), Error> {
        self.0.get_data(device, offset, out)
    }
}

impl Resource for IndexBuffer {
    const KIND: ResourceKind = ResourceKind::IndexBuffer;
    fn release<D: Device + ?Sized>(self, device: &mut D) {
        device.delete_buffer(self.0.native);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imp::SoftDevice;

    #[test]
    fn range_checks() {
        let mut device = SoftDevice::new(4, 4);
        let buffer = VertexBuffer::create(&mut device, 16, BufferFlags::empty()).unwrap();
        assert!(buffer.set_data(&mut device, 0, &[1; 16]).is_ok());
        assert!(buffer.set_data(&mut device, 15, &[2]).is_ok());
        assert!(matches!(buffer.set_data(&mut device, 16, &[]), Err(Error::OutOfRange)));
        assert!(matches!(buffer.set_data(&mut device, 8, &[3; 9]), Err(Error::OutOfRange)));
        assert!(matches!(
            buffer.set_data(&mut device, usize::MAX, &[3]),
            Err(Error::OutOfRange)
        ));

        let mut out = [0u8; 16];
        buffer.get_data(&mut device, 0, &mut out).unwrap();
        assert_eq!(&out[..15], &[1; 15]);
        assert_eq!(out[15], 2);
    }

    #[test]
    fn index_width_follows_flag() {
        let mut device = SoftDevice::new(4, 4);
        let narrow = IndexBuffer::create(&mut device, 8, BufferFlags::empty()).unwrap();
        let wide = IndexBuffer::create(&mut device, 8, BufferFlags::INDEX_32BIT).unwrap();
        assert_eq!(narrow.index_type(), IndexType::U16);
        assert_eq!(wide.index_type(), IndexType::U32);
    }
}
