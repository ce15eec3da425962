// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Deferred validation and the draw commands.

use super::Gapi;
use crate::device::Device;
use crate::error::Error;
use crate::render_state::PrimitiveType;
use crate::resource::{ResourceId, ResourceKind};

impl<D: Device> Gapi<D> {
    /// Begins the current effect if it was dirtied.
    fn validate_effect_state(&mut self) -> Result<(), Error> {
        if !self.validate_effect {
            return Ok(());
        }
        let Some(effect) = self.effects.get(self.current_effect) else {
            logwise::warn_sync!(
                "draw with missing effect {id}",
                id = self.current_effect.0
            );
            return Err(Error::Validation("current effect does not exist"));
        };
        effect.begin(&mut self.device, &mut self.samplers, &self.textures);
        self.bound_effect = Some(self.current_effect);
        self.validate_effect = false;
        Ok(())
    }

    /// Binds the current vertex struct's streams if they were dirtied.
    fn validate_stream_state(&mut self) -> Result<(), Error> {
        if !self.validate_streams {
            return Ok(());
        }
        let Some(vertex_struct) = self.vertex_structs.get_mut(self.current_vertex_struct) else {
            logwise::warn_sync!(
                "draw with missing vertex struct {id}",
                id = self.current_vertex_struct.0
            );
            return Err(Error::Validation("current vertex struct does not exist"));
        };
        let max_vertices = vertex_struct.set_streams(&mut self.device, &self.vertex_buffers);
        if max_vertices == 0 {
            logwise::warn_sync!(
                "vertex struct {id} can't serve any vertices",
                id = self.current_vertex_struct.0
            );
            return Err(Error::Validation("vertex streams serve no vertices"));
        }
        self.max_vertices = max_vertices;
        self.validate_streams = false;
        Ok(())
    }

    fn validate(&mut self) -> Result<(), Error> {
        self.validate_effect_state()?;
        self.validate_stream_state()
    }

    /// Draws `count` primitives starting at vertex `first`.
    pub fn draw(&mut self, primitive: PrimitiveType, first: u32, count: u32) -> Result<(), Error> {
        self.live()?;
        let vertex_count = primitive
            .vertex_count(count)
            .ok_or(Error::InvalidArgument("primitive count overflows"))?;
        self.validate()?;
        match first.checked_add(vertex_count) {
            Some(end) if end <= self.max_vertices => {}
            _ => {
                logwise::warn_sync!(
                    "draw of vertices {first}..+{count} exceeds the {max} the streams serve",
                    first = first,
                    count = vertex_count,
                    max = self.max_vertices
                );
                return Err(Error::Validation("draw reads past the end of a vertex stream"));
            }
        }
        self.device.draw_arrays(primitive, first, vertex_count);
        Ok(())
    }

    /// Draws `count` primitives reading indices from `index_buffer`, starting at
    /// index `first`.  Every index must lie in `min_index..=max_index`.
    pub fn draw_indexed(
        &mut self,
        primitive: PrimitiveType,
        index_buffer: ResourceId,
        first: u32,
        count: u32,
        min_index: u32,
        max_index: u32,
    ) -> Result<(), Error> {
        self.live()?;
        let vertex_count = primitive
            .vertex_count(count)
            .ok_or(Error::InvalidArgument("primitive count overflows"))?;
        let (native, index_type, size) = match self.index_buffers.get(index_buffer) {
            Some(buffer) => (buffer.native(), buffer.index_type(), buffer.size()),
            None => return Err(Error::unknown(ResourceKind::IndexBuffer, index_buffer)),
        };
        self.validate()?;
        if min_index > max_index || max_index >= self.max_vertices {
            logwise::warn_sync!(
                "index range {min}..={max} invalid for {served} vertices",
                min = min_index,
                max = max_index,
                served = self.max_vertices
            );
            return Err(Error::Validation("index range exceeds the vertex streams"));
        }
        let index_size = index_type.size() as usize;
        let offset = first as usize * index_size;
        let end = (vertex_count as usize)
            .checked_mul(index_size)
            .and_then(|bytes| bytes.checked_add(offset));
        if !matches!(end, Some(end) if end <= size) {
            return Err(Error::Validation("draw reads past the end of the index buffer"));
        }
        self.device
            .draw_range_elements(primitive, native, index_type, min_index, max_index, vertex_count, offset);
        Ok(())
    }
}
