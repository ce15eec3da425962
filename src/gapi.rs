// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
The command execution engine.

[`Gapi`] owns one [`ResourceMap`] per resource kind and exposes one method per
command of the stream.  Every method either completes or fails with the engine
exactly as it was; see [`ParseError::from_result`](crate::ParseError::from_result)
for the code reported back to the producer.

# Deferred validation

The engine tracks two pieces of derived GPU state:

* the *effect state*: the current effect's programs bound, with every sampler
  parameter's texture applied,
* the *stream state*: the current vertex struct's attributes bound, with the
  vertex count its buffers can serve.

Commands that may invalidate either one only set a flag.  The state is rebuilt
by the next draw.  A reference that went stale in the meantime (a destroyed
current effect, a vertex struct naming a destroyed buffer) is therefore reported
by that draw, not by the command that destroyed it.

Draw validation lives in `draw`; fixed-function state and frame commands live
in `state`.
*/

mod draw;
mod state;

use crate::config::GapiConfig;
use crate::device::Device;
use crate::effect::creation::EffectData;
use crate::effect::param::ParamUpdate;
use crate::effect::{Effect, EffectParam};
use crate::error::Error;
use crate::format::{TextureFormat, Volume};
use crate::geometry::{BufferFlags, IndexBuffer, VertexBuffer, VertexInput, VertexStruct};
use crate::render_state::{Rgba, Viewport};
use crate::resource::{INVALID_RESOURCE, Resource, ResourceId, ResourceKind, ResourceMap};
use crate::sampler::{AddressingMode, FilteringMode, Sampler};
use crate::texture::{CubeFace, Texture, TextureFlags, TextureShape};

/// Looks up `id` in `map`, failing with the map's resource kind.
fn lookup<T: Resource>(map: &ResourceMap<T>, id: ResourceId) -> Result<&T, Error> {
    map.get(id).ok_or(Error::unknown(T::KIND, id))
}

fn lookup_mut<T: Resource>(map: &mut ResourceMap<T>, id: ResourceId) -> Result<&mut T, Error> {
    map.get_mut(id).ok_or(Error::unknown(T::KIND, id))
}

/// The reserved id doubles as "nothing selected", so nothing may be created under it.
fn assignable(id: ResourceId) -> Result<(), Error> {
    if !id.is_valid() {
        return Err(Error::InvalidArgument("can't create a resource at the reserved invalid id"));
    }
    Ok(())
}

/// The engine.  Generic over the native API it replays commands against.
pub struct Gapi<D: Device> {
    device: D,
    config: GapiConfig,
    initialized: bool,

    vertex_buffers: ResourceMap<VertexBuffer>,
    index_buffers: ResourceMap<IndexBuffer>,
    vertex_structs: ResourceMap<VertexStruct>,
    textures: ResourceMap<Texture>,
    samplers: ResourceMap<Sampler>,
    effects: ResourceMap<Effect>,
    params: ResourceMap<EffectParam>,

    current_vertex_struct: ResourceId,
    current_effect: ResourceId,
    validate_streams: bool,
    validate_effect: bool,
    /// Vertex count the bound streams can serve.  Valid while streams are.
    max_vertices: u32,
    /// Effect whose `begin` ran and whose `end` has not.
    bound_effect: Option<ResourceId>,
    next_effect_serial: u64,

    viewport: Option<Viewport>,
    in_frame: bool,
    frames: u64,
}

impl<D: Device> std::fmt::Debug for Gapi<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gapi")
            .field("initialized", &self.initialized)
            .field("current_vertex_struct", &self.current_vertex_struct)
            .field("current_effect", &self.current_effect)
            .field("validate_streams", &self.validate_streams)
            .field("validate_effect", &self.validate_effect)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl<D: Device> Gapi<D> {
    /// Wraps `device`.  Call [`initialize`](Self::initialize) before issuing commands.
    pub fn new(device: D, config: GapiConfig) -> Self {
        Gapi {
            device,
            config,
            initialized: false,
            vertex_buffers: ResourceMap::new(),
            index_buffers: ResourceMap::new(),
            vertex_structs: ResourceMap::new(),
            textures: ResourceMap::new(),
            samplers: ResourceMap::new(),
            effects: ResourceMap::new(),
            params: ResourceMap::new(),
            current_vertex_struct: INVALID_RESOURCE,
            current_effect: INVALID_RESOURCE,
            validate_streams: true,
            validate_effect: true,
            max_vertices: 0,
            bound_effect: None,
            next_effect_serial: 0,
            viewport: None,
            in_frame: false,
            frames: 0,
        }
    }

    /// Readies the engine and sets a viewport covering the whole surface.
    pub fn initialize(&mut self) -> Result<(), Error> {
        if self.device.is_context_lost() {
            logwise::error_sync!("can't initialize: device context is lost");
            return Err(Error::ContextLost);
        }
        self.initialized = true;
        let (width, height) = self.device.surface_size();
        logwise::info_sync!(
            "initialized engine on a {width}x{height} surface",
            width = width,
            height = height
        );
        if width > 0 && height > 0 {
            self.set_viewport(0, 0, width, height, 0.0, 1.0)?;
        }
        Ok(())
    }

    /// Releases every resource.  The engine may be initialized again afterwards.
    pub fn destroy(&mut self) {
        if !self.initialized {
            return;
        }
        self.dirty_effect();
        self.params.destroy_all(&mut self.device);
        self.effects.destroy_all(&mut self.device);
        self.samplers.destroy_all(&mut self.device);
        self.textures.destroy_all(&mut self.device);
        self.vertex_structs.destroy_all(&mut self.device);
        self.index_buffers.destroy_all(&mut self.device);
        self.vertex_buffers.destroy_all(&mut self.device);
        self.current_vertex_struct = INVALID_RESOURCE;
        self.current_effect = INVALID_RESOURCE;
        self.validate_streams = true;
        self.validate_effect = true;
        self.max_vertices = 0;
        self.in_frame = false;
        self.initialized = false;
        logwise::info_sync!("destroyed engine after {frames} frames", frames = self.frames);
    }

    pub fn config(&self) -> &GapiConfig {
        &self.config
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn current_effect(&self) -> ResourceId {
        self.current_effect
    }

    pub fn current_vertex_struct(&self) -> ResourceId {
        self.current_vertex_struct
    }

    pub fn vertex_buffers(&self) -> &ResourceMap<VertexBuffer> {
        &self.vertex_buffers
    }

    pub fn index_buffers(&self) -> &ResourceMap<IndexBuffer> {
        &self.index_buffers
    }

    pub fn vertex_structs(&self) -> &ResourceMap<VertexStruct> {
        &self.vertex_structs
    }

    pub fn textures(&self) -> &ResourceMap<Texture> {
        &self.textures
    }

    pub fn samplers(&self) -> &ResourceMap<Sampler> {
        &self.samplers
    }

    pub fn effects(&self) -> &ResourceMap<Effect> {
        &self.effects
    }

    pub fn params(&self) -> &ResourceMap<EffectParam> {
        &self.params
    }

    /// Fails every command once the engine is unusable.
    fn live(&self) -> Result<(), Error> {
        if self.device.is_context_lost() {
            logwise::error_sync!("device context is lost");
            return Err(Error::ContextLost);
        }
        if !self.initialized {
            return Err(Error::InvalidArgument("engine is not initialized"));
        }
        Ok(())
    }

    /// Unbinds the current effect and forces it to be rebuilt by the next draw.
    fn dirty_effect(&mut self) {
        if let Some(id) = self.bound_effect.take()
            && let Some(effect) = self.effects.get(id)
        {
            effect.end(&mut self.device);
        }
        self.validate_effect = true;
    }

    fn dirty_streams(&mut self) {
        self.validate_streams = true;
    }

    // Vertex buffers.

    pub fn create_vertex_buffer(&mut self, id: ResourceId, size: u32, flags: BufferFlags) -> Result<(), Error> {
        self.live()?;
        assignable(id)?;
        let buffer = VertexBuffer::create(&mut self.device, size as usize, flags)?;
        self.dirty_streams();
        self.vertex_buffers.assign(id, buffer, &mut self.device);
        Ok(())
    }

    pub fn destroy_vertex_buffer(&mut self, id: ResourceId) -> Result<(), Error> {
        self.live()?;
        if !self.vertex_buffers.destroy(id, &mut self.device) {
            return Err(Error::unknown(ResourceKind::VertexBuffer, id));
        }
        self.dirty_streams();
        Ok(())
    }

    pub fn set_vertex_buffer_data(&mut self, id: ResourceId, offset: u32, data: &[u8]) -> Result<(), Error> {
        self.live()?;
        lookup(&self.vertex_buffers, id)?.set_data(&mut self.device, offset as usize, data)
    }

    pub fn get_vertex_buffer_data(&mut self, id: ResourceId, offset: u32, out: &mut [u8]) -> Result<(), Error> {
        self.live()?;
        lookup(&self.vertex_buffers, id)?.get_data(&mut self.device, offset as usize, out)
    }

    // Index buffers.

    pub fn create_index_buffer(&mut self, id: ResourceId, size: u32, flags: BufferFlags) -> Result<(), Error> {
        self.live()?;
        assignable(id)?;
        let buffer = IndexBuffer::create(&mut self.device, size as usize, flags)?;
        self.index_buffers.assign(id, buffer, &mut self.device);
        Ok(())
    }

    pub fn destroy_index_buffer(&mut self, id: ResourceId) -> Result<(), Error> {
        self.live()?;
        if !self.index_buffers.destroy(id, &mut self.device) {
            return Err(Error::unknown(ResourceKind::IndexBuffer, id));
        }
        Ok(())
    }

    pub fn set_index_buffer_data(&mut self, id: ResourceId, offset: u32, data: &[u8]) -> Result<(), Error> {
        self.live()?;
        lookup(&self.index_buffers, id)?.set_data(&mut self.device, offset as usize, data)
    }

    pub fn get_index_buffer_data(&mut self, id: ResourceId, offset: u32, out: &mut [u8]) -> Result<(), Error> {
        self.live()?;
        lookup(&self.index_buffers, id)?.get_data(&mut self.device, offset as usize, out)
    }

    // Vertex structs.

    pub fn create_vertex_struct(&mut self, id: ResourceId, input_count: u32) -> Result<(), Error> {
        self.live()?;
        assignable(id)?;
        if input_count == 0 || input_count > self.config.max_vertex_inputs {
            return Err(Error::InvalidArgument("vertex struct input count out of range"));
        }
        if id == self.current_vertex_struct {
            self.dirty_streams();
        }
        self.vertex_structs
            .assign(id, VertexStruct::new(input_count as usize), &mut self.device);
        Ok(())
    }

    pub fn destroy_vertex_struct(&mut self, id: ResourceId) -> Result<(), Error> {
        self.live()?;
        if !self.vertex_structs.destroy(id, &mut self.device) {
            return Err(Error::unknown(ResourceKind::VertexStruct, id));
        }
        if id == self.current_vertex_struct {
            self.dirty_streams();
        }
        Ok(())
    }

    pub fn set_vertex_input(&mut self, id: ResourceId, slot: u32, input: VertexInput) -> Result<(), Error> {
        self.live()?;
        let vertex_struct = lookup_mut(&mut self.vertex_structs, id)?;
        if slot as usize >= vertex_struct.count() {
            return Err(Error::InvalidArgument("vertex input slot out of range"));
        }
        vertex_struct.set_input(slot as usize, input)?;
        if id == self.current_vertex_struct {
            self.dirty_streams();
        }
        Ok(())
    }

    /// Makes `id` the current vertex struct.  The id is resolved by the next draw.
    pub fn set_vertex_struct(&mut self, id: ResourceId) -> Result<(), Error> {
        self.live()?;
        self.current_vertex_struct = id;
        self.dirty_streams();
        Ok(())
    }

    // Textures.

    pub fn create_texture_2d(
        &mut self,
        id: ResourceId,
        width: u32,
        height: u32,
        levels: u32,
        format: TextureFormat,
        flags: TextureFlags,
    ) -> Result<(), Error> {
        self.create_texture(id, TextureShape::Texture2D { width, height }, levels, format, flags)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_texture_3d(
        &mut self,
        id: ResourceId,
        width: u32,
        height: u32,
        depth: u32,
        levels: u32,
        format: TextureFormat,
        flags: TextureFlags,
    ) -> Result<(), Error> {
        self.create_texture(
            id,
            TextureShape::Texture3D {
                width,
                height,
                depth,
            },
            levels,
            format,
            flags,
        )
    }

    pub fn create_texture_cube(
        &mut self,
        id: ResourceId,
        side: u32,
        levels: u32,
        format: TextureFormat,
        flags: TextureFlags,
    ) -> Result<(), Error> {
        self.create_texture(id, TextureShape::Cube { side }, levels, format, flags)
    }

    fn create_texture(
        &mut self,
        id: ResourceId,
        shape: TextureShape,
        levels: u32,
        format: TextureFormat,
        flags: TextureFlags,
    ) -> Result<(), Error> {
        self.live()?;
        assignable(id)?;
        if levels > self.config.max_texture_levels {
            return Err(Error::InvalidArgument("too many mip levels"));
        }
        let (width, height, depth) = shape.base_dimensions();
        if width.max(height).max(depth) > self.config.max_texture_dimension {
            return Err(Error::InvalidArgument("texture dimension exceeds the configured maximum"));
        }
        let texture = Texture::create(&mut self.device, shape, levels, format, flags)?;
        logwise::trace_sync!(
            "created texture {id} {shape}",
            id = id.0,
            shape = logwise::privacy::LogIt(&shape)
        );
        // a sampler may already name this id
        self.dirty_effect();
        self.textures.assign(id, texture, &mut self.device);
        Ok(())
    }

    pub fn destroy_texture(&mut self, id: ResourceId) -> Result<(), Error> {
        self.live()?;
        if !self.textures.contains(id) {
            return Err(Error::unknown(ResourceKind::Texture, id));
        }
        self.dirty_effect();
        self.textures.destroy(id, &mut self.device);
        Ok(())
    }

    /// Uploads `volume` of one level.  `face` is ignored unless the texture is a cube.
    #[allow(clippy::too_many_arguments)]
    pub fn set_texture_data(
        &mut self,
        id: ResourceId,
        volume: &Volume,
        level: u32,
        face: CubeFace,
        row_pitch: u32,
        slice_pitch: u32,
        data: &[u8],
    ) -> Result<(), Error> {
        self.live()?;
        lookup(&self.textures, id)?.set_data(
            &mut self.device,
            volume,
            level,
            face,
            row_pitch as usize,
            slice_pitch as usize,
            data,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn get_texture_data(
        &mut self,
        id: ResourceId,
        volume: &Volume,
        level: u32,
        face: CubeFace,
        row_pitch: u32,
        slice_pitch: u32,
        out: &mut [u8],
    ) -> Result<(), Error> {
        self.live()?;
        lookup(&self.textures, id)?.get_data(
            &mut self.device,
            volume,
            level,
            face,
            row_pitch as usize,
            slice_pitch as usize,
            out,
        )
    }

    // Samplers.

    pub fn create_sampler(&mut self, id: ResourceId) -> Result<(), Error> {
        self.live()?;
        assignable(id)?;
        self.dirty_effect();
        self.samplers.assign(id, Sampler::new(), &mut self.device);
        Ok(())
    }

    pub fn destroy_sampler(&mut self, id: ResourceId) -> Result<(), Error> {
        self.live()?;
        if !self.samplers.contains(id) {
            return Err(Error::unknown(ResourceKind::Sampler, id));
        }
        self.dirty_effect();
        self.samplers.destroy(id, &mut self.device);
        Ok(())
    }

    pub fn set_sampler_states(
        &mut self,
        id: ResourceId,
        address: [AddressingMode; 3],
        mag_filter: FilteringMode,
        min_filter: FilteringMode,
        mip_filter: FilteringMode,
        max_anisotropy: u32,
    ) -> Result<(), Error> {
        self.live()?;
        lookup_mut(&mut self.samplers, id)?.set_states(address, mag_filter, min_filter, mip_filter, max_anisotropy)?;
        self.dirty_effect();
        Ok(())
    }

    pub fn set_sampler_border_color(&mut self, id: ResourceId, color: Rgba) -> Result<(), Error> {
        self.live()?;
        lookup_mut(&mut self.samplers, id)?.set_border_color(color);
        self.dirty_effect();
        Ok(())
    }

    /// Points a sampler at a texture id.  The texture need not exist yet.
    pub fn set_sampler_texture(&mut self, id: ResourceId, texture_id: ResourceId) -> Result<(), Error> {
        self.live()?;
        lookup_mut(&mut self.samplers, id)?.set_texture(texture_id);
        self.dirty_effect();
        Ok(())
    }

    // Effects and parameters.

    /// Creates an effect from a `vertex_entry \0 fragment_entry \0 source` blob.
    ///
    /// On failure nothing is registered at `id`, and whatever was there survives.
    pub fn create_effect(&mut self, id: ResourceId, data: &[u8]) -> Result<(), Error> {
        self.live()?;
        assignable(id)?;
        let parsed = EffectData::parse(data).inspect_err(|e| {
            logwise::warn_sync!(
                "rejected effect data for {id}: {err}",
                id = id.0,
                err = logwise::privacy::LogIt(e)
            );
        })?;
        let effect = Effect::create(&mut self.device, &parsed, &self.config, self.next_effect_serial)?;
        self.next_effect_serial += 1;
        if id == self.current_effect || self.bound_effect == Some(id) {
            self.dirty_effect();
        }
        self.effects.assign(id, effect, &mut self.device);
        Ok(())
    }

    /// Destroys an effect.  Parameters created from it stop resolving.
    pub fn destroy_effect(&mut self, id: ResourceId) -> Result<(), Error> {
        self.live()?;
        if !self.effects.contains(id) {
            return Err(Error::unknown(ResourceKind::Effect, id));
        }
        if id == self.current_effect || self.bound_effect == Some(id) {
            self.dirty_effect();
        }
        self.effects.destroy(id, &mut self.device);
        Ok(())
    }

    /// Makes `id` the current effect.  The id is resolved by the next draw.
    pub fn set_effect(&mut self, id: ResourceId) -> Result<(), Error> {
        self.live()?;
        self.dirty_effect();
        self.current_effect = id;
        Ok(())
    }

    pub fn get_param_count(&self, effect_id: ResourceId) -> Result<u32, Error> {
        self.live()?;
        Ok(lookup(&self.effects, effect_id)?.param_count() as u32)
    }

    /// Creates a parameter object for entry `index` of an effect's parameter list.
    pub fn create_param(&mut self, id: ResourceId, effect_id: ResourceId, index: u32) -> Result<(), Error> {
        self.live()?;
        assignable(id)?;
        let effect = lookup(&self.effects, effect_id)?;
        let param = EffectParam::by_index(effect_id, effect, index as usize)?;
        self.params.assign(id, param, &mut self.device);
        Ok(())
    }

    pub fn create_param_by_name(&mut self, id: ResourceId, effect_id: ResourceId, name: &str) -> Result<(), Error> {
        self.live()?;
        assignable(id)?;
        let effect = lookup(&self.effects, effect_id)?;
        let param = EffectParam::by_name(effect_id, effect, name)?;
        self.params.assign(id, param, &mut self.device);
        Ok(())
    }

    pub fn destroy_param(&mut self, id: ResourceId) -> Result<(), Error> {
        self.live()?;
        if !self.params.destroy(id, &mut self.device) {
            return Err(Error::unknown(ResourceKind::EffectParam, id));
        }
        Ok(())
    }

    pub fn set_param_data(&mut self, id: ResourceId, data: &[u8]) -> Result<(), Error> {
        self.live()?;
        let param = lookup(&self.params, id)?;
        let update = param.set_data(&mut self.device, &mut self.effects, data)?;
        if let ParamUpdate::SamplerBinding { effect } = update
            && effect == self.current_effect
        {
            self.dirty_effect();
        }
        Ok(())
    }

    /// Writes the parameter's description into `out`.  Returns the bytes written.
    pub fn get_param_desc(&self, id: ResourceId, out: &mut [u8]) -> Result<usize, Error> {
        self.live()?;
        let desc = lookup(&self.params, id)?.desc(&self.effects)?;
        desc.write_to(out)
    }
}

impl<D: Device> Drop for Gapi<D> {
    fn drop(&mut self) {
        self.destroy();
    }
}
