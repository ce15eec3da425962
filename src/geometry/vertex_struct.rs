// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Declarative vertex layouts.
//!
//! A [`VertexStruct`] is a list of input slots, each describing where one vertex
//! attribute comes from: a vertex buffer id, a byte offset and stride, a component
//! type, and a semantic.  Before a draw the list is compiled into a flat table
//! indexed by attribute number, using the conventional numbering
//!
//! | Semantic    | Attribute |
//! |-------------|-----------|
//! | `POSITION`  | 0         |
//! | `NORMAL`    | 2         |
//! | `COLOR0..1` | 3..4      |
//! | `TEXCOORD0..7` | 8..15  |
//!
//! Compilation is lazy and happens only while the struct is dirty.

use crate::device::{AttribPointer, ComponentType, Device};
use crate::error::Error;
use crate::geometry::buffer::VertexBuffer;
use crate::resource::{INVALID_RESOURCE, Resource, ResourceId, ResourceKind, ResourceMap};

/// Size of the compiled attribute table.
pub const MAX_VERTEX_ATTRIBS: usize = 16;

/// Component layout of one vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexType {
    Float1,
    Float2,
    Float3,
    Float4,
    /// Four unsigned bytes normalized to `[0, 1]`.
    UChar4N,
}

impl VertexType {
    fn pointer(self, stride: u32, offset: u32) -> AttribPointer {
        let (components, component_type, normalized) = match self {
            VertexType::Float1 => (1, ComponentType::Float, false),
            VertexType::Float2 => (2, ComponentType::Float, false),
            VertexType::Float3 => (3, ComponentType::Float, false),
            VertexType::Float4 => (4, ComponentType::Float, false),
            VertexType::UChar4N => (4, ComponentType::UnsignedByte, true),
        };
        AttribPointer {
            components,
            component_type,
            normalized,
            stride,
            offset,
        }
    }

    /// Bytes read per vertex.
    pub const fn size(self) -> u32 {
        match self {
            VertexType::Float1 => 4,
            VertexType::Float2 => 8,
            VertexType::Float3 => 12,
            VertexType::Float4 => 16,
            VertexType::UChar4N => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Semantic {
    Position,
    Normal,
    Color,
    TexCoord,
}

impl Semantic {
    /// Number of legal semantic indices.
    pub const fn index_limit(self) -> u32 {
        match self {
            Semantic::Position | Semantic::Normal => 1,
            Semantic::Color => 2,
            Semantic::TexCoord => 8,
        }
    }

    /// Attribute number for `index` of this semantic, if the index is legal.
    pub const fn attrib_index(self, index: u32) -> Option<usize> {
        if index >= self.index_limit() {
            return None;
        }
        Some(match self {
            Semantic::Position => 0,
            Semantic::Normal => 2,
            Semantic::Color => 3 + index as usize,
            Semantic::TexCoord => 8 + index as usize,
        })
    }
}

/// One input slot of a vertex struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexInput {
    pub vertex_buffer: ResourceId,
    pub offset: u32,
    pub stride: u32,
    pub ty: VertexType,
    pub semantic: Semantic,
    pub semantic_index: u32,
}

/// One row of the compiled attribute table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttribBinding {
    pub vertex_buffer: ResourceId,
    pub ty: VertexType,
    pub pointer: AttribPointer,
}

#[derive(Debug)]
pub struct VertexStruct {
    inputs: Vec<Option<VertexInput>>,
    attribs: [Option<AttribBinding>; MAX_VERTEX_ATTRIBS],
    dirty: bool,
}

impl VertexStruct {
    pub fn new(count: usize) -> Self {
        VertexStruct {
            inputs: vec![None; count],
            attribs: [None; MAX_VERTEX_ATTRIBS],
            dirty: true,
        }
    }

    /// Number of input slots.
    pub fn count(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn input(&self, slot: usize) -> Option<&VertexInput> {
        self.inputs.get(slot).and_then(Option::as_ref)
    }

    /// Records one input slot and marks the struct for recompilation.
    pub fn set_input(&mut self, slot: usize, input: VertexInput) -> Result<(), Error> {
        if input.semantic.attrib_index(input.semantic_index).is_none() {
            return Err(Error::InvalidArgument("semantic index out of range"));
        }
        let entry = self
            .inputs
            .get_mut(slot)
            .ok_or(Error::InvalidArgument("vertex input slot out of range"))?;
        *entry = Some(input);
        self.dirty = true;
        Ok(())
    }

    /// The compiled attribute table.  Only meaningful once the struct is clean.
    pub fn attribs(&self) -> &[Option<AttribBinding>; MAX_VERTEX_ATTRIBS] {
        &self.attribs
    }

    fn compile(&mut self) {
        self.attribs = [None; MAX_VERTEX_ATTRIBS];
        for input in self.inputs.iter().flatten() {
            // set_input only stores legal indices
            if let Some(index) = input.semantic.attrib_index(input.semantic_index) {
                self.attribs[index] = Some(AttribBinding {
                    vertex_buffer: input.vertex_buffer,
                    ty: input.ty,
                    pointer: input.ty.pointer(input.stride, input.offset),
                });
            }
        }
        self.dirty = false;
    }

    /// Binds every attribute of the compiled table, disabling unbound ones.
    ///
    /// Returns the largest vertex count every bound buffer can serve, or 0 if
    /// any bound attribute names a missing vertex buffer.  With nothing bound
    /// the count is unlimited.
    pub fn set_streams<D: Device + ?Sized>(
        &mut self,
        device: &mut D,
        vertex_buffers: &ResourceMap<VertexBuffer>,
    ) -> u32 {
        if self.dirty {
            self.compile();
        }
        let mut max_vertices = u32::MAX;
        for (index, attrib) in self.attribs.iter().copied().enumerate() {
            let index = index as u32;
            let Some(attrib) = attrib.filter(|a| a.vertex_buffer != INVALID_RESOURCE) else {
                device.disable_vertex_attrib(index);
                continue;
            };
            let Some(buffer) = vertex_buffers.get(attrib.vertex_buffer) else {
                logwise::warn_sync!(
                    "attribute {index} reads from missing vertex buffer {id}",
                    index = index,
                    id = attrib.vertex_buffer.0
                );
                device.disable_vertex_attrib(index);
                max_vertices = 0;
                continue;
            };
            device.enable_vertex_attrib(index, buffer.native(), &attrib.pointer);
            max_vertices = max_vertices.min(Self::vertices_served(buffer.size(), &attrib));
        }
        device.unbind_array_buffer();
        max_vertices
    }

    fn vertices_served(buffer_size: usize, attrib: &AttribBinding) -> u32 {
        let stride = attrib.pointer.stride as usize;
        if stride == 0 {
            // every vertex reads the same element
            let end = attrib.pointer.offset as usize + attrib.ty.size() as usize;
            return if end <= buffer_size { u32::MAX } else { 0 };
        }
        u32::try_from(buffer_size / stride).unwrap_or(u32::MAX)
    }
}

impl Resource for VertexStruct {
    const KIND: ResourceKind = ResourceKind::VertexStruct;
    fn release<D: Device + ?Sized>(self, _device: &mut D) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::buffer::BufferFlags;
    use crate::imp::SoftDevice;

    fn input(vb: u32, stride: u32, semantic: Semantic, index: u32) -> VertexInput {
        VertexInput {
            vertex_buffer: ResourceId(vb),
            offset: 0,
            stride,
            ty: VertexType::Float3,
            semantic,
            semantic_index: index,
        }
    }

    #[test]
    fn semantic_numbering() {
        assert_eq!(Semantic::Position.attrib_index(0), Some(0));
        assert_eq!(Semantic::Position.attrib_index(1), None);
        assert_eq!(Semantic::Normal.attrib_index(0), Some(2));
        assert_eq!(Semantic::Color.attrib_index(1), Some(4));
        assert_eq!(Semantic::Color.attrib_index(2), None);
        assert_eq!(Semantic::TexCoord.attrib_index(7), Some(15));
        assert_eq!(Semantic::TexCoord.attrib_index(8), None);
    }

    #[test]
    fn rejects_bad_inputs() {
        let mut vs = VertexStruct::new(1);
        assert!(vs.set_input(1, input(1, 12, Semantic::Position, 0)).is_err());
        assert!(vs.set_input(0, input(1, 12, Semantic::Normal, 1)).is_err());
        assert!(vs.input(0).is_none());
    }

    #[test]
    fn narrowest_buffer_bounds_vertices() {
        let mut device = SoftDevice::new(4, 4);
        let mut buffers = ResourceMap::new();
        buffers.assign(
            ResourceId(1),
            VertexBuffer::create(&mut device, 120, BufferFlags::empty()).unwrap(),
            &mut device,
        );
        buffers.assign(
            ResourceId(2),
            VertexBuffer::create(&mut device, 64, BufferFlags::empty()).unwrap(),
            &mut device,
        );
        let mut vs = VertexStruct::new(2);
        vs.set_input(0, input(1, 12, Semantic::Position, 0)).unwrap();
        vs.set_input(1, input(2, 8, Semantic::TexCoord, 0)).unwrap();
        assert_eq!(vs.set_streams(&mut device, &buffers), 8);
        assert!(device.vertex_attrib(0).is_some());
        assert!(device.vertex_attrib(8).is_some());
        assert!(device.vertex_attrib(2).is_none());
    }

    #[test]
    fn missing_buffer_serves_nothing() {
        let mut device = SoftDevice::new(4, 4);
        let buffers = ResourceMap::new();
        let mut vs = VertexStruct::new(1);
        vs.set_input(0, input(9, 12, Semantic::Position, 0)).unwrap();
        assert_eq!(vs.set_streams(&mut device, &buffers), 0);
        assert!(device.vertex_attrib(0).is_none());
    }

    #[test]
    fn recompilation_is_idempotent_and_resets_slots() {
        let mut device = SoftDevice::new(4, 4);
        let mut buffers = ResourceMap::new();
        buffers.assign(
            ResourceId(1),
            VertexBuffer::create(&mut device, 48, BufferFlags::empty()).unwrap(),
            &mut device,
        );
        let mut vs = VertexStruct::new(1);
        vs.set_input(0, input(1, 12, Semantic::Color, 1)).unwrap();
        let first = vs.set_streams(&mut device, &buffers);
        let table = *vs.attribs();
        let second = vs.set_streams(&mut device, &buffers);
        assert_eq!(first, second);
        assert_eq!(&table, vs.attribs());
        assert!(vs.attribs()[4].is_some());

        vs.set_input(0, input(1, 12, Semantic::Position, 0)).unwrap();
        assert!(vs.is_dirty());
        assert_eq!(vs.set_streams(&mut device, &buffers), 4);
        assert!(vs.attribs()[4].is_none());
        assert!(vs.attribs()[0].is_some());
    }
}
