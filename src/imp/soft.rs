// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
An in-memory [`Device`].

`SoftDevice` keeps buffers and texture levels as byte vectors, compiles effects
with a small compiler (see `compiler`), validates program text with an assembler
(see `assembler`) and records every piece of bound state and every draw so it
can be inspected afterwards.  It rasterizes nothing.

It follows the binding model the engine is written against: one current
texture per target, a current array buffer that attribute setup leaves bound,
and a sticky program error flag.
*/

mod assembler;
mod compiler;

use crate::device::{
    AttribPointer, BufferTarget, Device, DeviceError, Direction, ImageTarget, IndexType, NativeBuffer,
    NativeParam, NativeParamType, NativeProgram, NativeTexture, ParamValue, ParameterInfo, ProgramError,
    SamplerParameters, ShaderStage, TextureTarget, Variability,
};
use crate::format::{MipLevelInfo, TextureFormat, TransferInfo, Volume, insert_volume};
use crate::geometry::vertex_struct::MAX_VERTEX_ATTRIBS;
use crate::render_state::{
    AlphaTest, Blending, ClearBuffers, ColorWrite, DepthTest, PointLineRaster, PolygonOffset,
    PolygonRaster, PrimitiveType, Rgba, ScissorRect, StencilTest,
};
use std::collections::HashMap;

/// Largest single allocation accepted by default.
const DEFAULT_MAX_ALLOCATION: usize = 256 << 20;

/// One enabled vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttrib {
    pub buffer: NativeBuffer,
    pub pointer: AttribPointer,
}

/// Last value pushed to a program parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamRecord {
    Float(Vec<f32>),
    Int(i32),
    Bool(bool),
}

/// Texture state of a sampler parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureUnit {
    pub texture: Option<NativeTexture>,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearCall {
    pub buffers: ClearBuffers,
    pub color: Rgba,
    pub depth: f32,
    pub stencil: u32,
}

/// Native viewport, bottom-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeViewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Fixed-function state as last set.  `None` until first set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixedFunctionState {
    pub viewport: Option<NativeViewport>,
    pub depth_range: Option<(f32, f32)>,
    /// Outer `None` until set; inner `None` when scissoring is disabled.
    pub scissor: Option<Option<ScissorRect>>,
    pub point_line_raster: Option<PointLineRaster>,
    pub polygon_raster: Option<PolygonRaster>,
    pub polygon_offset: Option<PolygonOffset>,
    pub alpha_test: Option<AlphaTest>,
    pub depth_test: Option<DepthTest>,
    pub stencil_test: Option<StencilTest>,
    pub color_write: Option<ColorWrite>,
    pub blending: Option<Blending>,
    pub blending_color: Option<Rgba>,
    pub last_clear: Option<ClearCall>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    Arrays {
        first: u32,
        vertex_count: u32,
    },
    Elements {
        index_buffer: NativeBuffer,
        index_type: IndexType,
        min_index: u32,
        max_index: u32,
        index_count: u32,
        offset: usize,
    },
}

/// A draw as issued, with the programs bound at the time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub mode: PrimitiveType,
    pub kind: DrawKind,
    pub vertex_program: Option<NativeProgram>,
    pub fragment_program: Option<NativeProgram>,
}

#[derive(Debug)]
struct SoftBuffer {
    target: BufferTarget,
    dynamic: bool,
    data: Vec<u8>,
}

#[derive(Debug)]
struct SoftImage {
    info: MipLevelInfo,
    data: Vec<u8>,
}

#[derive(Debug)]
struct SoftTexture {
    target: TextureTarget,
    images: HashMap<(ImageTarget, u32), SoftImage>,
    sampler: Option<SamplerParameters>,
}

#[derive(Debug)]
struct SoftParam {
    name: String,
    ty: NativeParamType,
    variability: Variability,
    direction: Direction,
    value: Option<ParamRecord>,
    unit: TextureUnit,
}

#[derive(Debug)]
struct SoftProgram {
    stage: ShaderStage,
    assembly: String,
    params: Vec<SoftParam>,
}

#[derive(Debug)]
pub struct SoftDevice {
    surface: (u32, u32),
    context_lost: bool,
    max_allocation: usize,
    next_name: u32,
    buffers: HashMap<NativeBuffer, SoftBuffer>,
    array_buffer: Option<NativeBuffer>,
    attribs: [Option<VertexAttrib>; MAX_VERTEX_ATTRIBS],
    textures: HashMap<NativeTexture, SoftTexture>,
    bound_textures: HashMap<TextureTarget, NativeTexture>,
    programs: HashMap<NativeProgram, SoftProgram>,
    bound_programs: HashMap<ShaderStage, NativeProgram>,
    program_error: Option<ProgramError>,
    env: HashMap<(ShaderStage, u32), [f32; 4]>,
    state: FixedFunctionState,
    draws: Vec<DrawCall>,
    frames_begun: u64,
    frames_presented: u64,
    markers: Vec<String>,
}

impl SoftDevice {
    /// A device rendering to a `width` x `height` surface.
    pub fn new(width: u32, height: u32) -> Self {
        SoftDevice {
            surface: (width, height),
            context_lost: false,
            max_allocation: DEFAULT_MAX_ALLOCATION,
            next_name: 1,
            buffers: HashMap::new(),
            array_buffer: None,
            attribs: [None; MAX_VERTEX_ATTRIBS],
            textures: HashMap::new(),
            bound_textures: HashMap::new(),
            programs: HashMap::new(),
            bound_programs: HashMap::new(),
            program_error: None,
            env: HashMap::new(),
            state: FixedFunctionState::default(),
            draws: Vec::new(),
            frames_begun: 0,
            frames_presented: 0,
            markers: Vec::new(),
        }
    }

    /// Caps single buffer and texture level allocations; larger ones fail with
    /// [`DeviceError::OutOfMemory`].
    pub fn with_max_allocation(mut self, bytes: usize) -> Self {
        self.max_allocation = bytes;
        self
    }

    /// Simulates losing the native context.
    pub fn lose_context(&mut self) {
        logwise::warn_sync!("soft device context lost");
        self.context_lost = true;
    }

    fn name(&mut self) -> u32 {
        let name = self.next_name;
        self.next_name += 1;
        name
    }

    fn allocate(&self, size: usize) -> Result<Vec<u8>, DeviceError> {
        if self.context_lost {
            return Err(DeviceError::ContextLost);
        }
        if size > self.max_allocation {
            return Err(DeviceError::OutOfMemory);
        }
        Ok(vec![0; size])
    }

    fn buffer(&mut self, target: BufferTarget, buffer: NativeBuffer) -> Result<&mut SoftBuffer, DeviceError> {
        match self.buffers.get_mut(&buffer) {
            Some(b) if b.target == target => Ok(b),
            Some(_) => Err(DeviceError::InvalidOperation("buffer used with a different target")),
            None => Err(DeviceError::InvalidOperation("no such buffer")),
        }
    }

    fn current_texture(&mut self, target: TextureTarget) -> Result<&mut SoftTexture, DeviceError> {
        let name = self
            .bound_textures
            .get(&target)
            .ok_or(DeviceError::InvalidOperation("no texture bound"))?;
        self.textures
            .get_mut(name)
            .filter(|t| t.target == target)
            .ok_or(DeviceError::InvalidOperation("bound texture is gone"))
    }

    fn image(&mut self, image: ImageTarget, level: u32) -> Result<&mut SoftImage, DeviceError> {
        self.current_texture(image.texture_target())?
            .images
            .get_mut(&(image, level))
            .ok_or(DeviceError::InvalidOperation("level not allocated"))
    }

    fn param(&mut self, param: NativeParam) -> Option<&mut SoftParam> {
        self.programs
            .get_mut(&param.program)?
            .params
            .get_mut(param.index as usize)
    }

    // Inspection.

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn vertex_attrib(&self, index: usize) -> Option<VertexAttrib> {
        self.attribs.get(index).copied().flatten()
    }

    pub fn array_buffer(&self) -> Option<NativeBuffer> {
        self.array_buffer
    }

    pub fn is_dynamic_buffer(&self, buffer: NativeBuffer) -> Option<bool> {
        self.buffers.get(&buffer).map(|b| b.dynamic)
    }

    pub fn sampler_parameters(&self, texture: NativeTexture) -> Option<SamplerParameters> {
        self.textures.get(&texture)?.sampler
    }

    pub fn bound_texture(&self, target: TextureTarget) -> Option<NativeTexture> {
        self.bound_textures.get(&target).copied()
    }

    pub fn bound_program(&self, stage: ShaderStage) -> Option<NativeProgram> {
        self.bound_programs.get(&stage).copied()
    }

    pub fn program_assembly(&self, program: NativeProgram) -> Option<&str> {
        self.programs.get(&program).map(|p| p.assembly.as_str())
    }

    pub fn program_stage(&self, program: NativeProgram) -> Option<ShaderStage> {
        self.programs.get(&program).map(|p| p.stage)
    }

    /// Handle of the parameter called `name` in `program`.
    pub fn find_param(&self, program: NativeProgram, name: &str) -> Option<NativeParam> {
        let index = self.programs.get(&program)?.params.iter().position(|p| p.name == name)?;
        Some(NativeParam {
            program,
            index: index as u32,
        })
    }

    pub fn param_value(&self, param: NativeParam) -> Option<&ParamRecord> {
        self.programs
            .get(&param.program)?
            .params
            .get(param.index as usize)?
            .value
            .as_ref()
    }

    pub fn texture_unit(&self, param: NativeParam) -> Option<TextureUnit> {
        self.programs
            .get(&param.program)?
            .params
            .get(param.index as usize)
            .map(|p| p.unit)
    }

    pub fn env_parameter(&self, stage: ShaderStage, index: u32) -> Option<[f32; 4]> {
        self.env.get(&(stage, index)).copied()
    }

    pub fn state(&self) -> &FixedFunctionState {
        &self.state
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    pub fn frames_begun(&self) -> u64 {
        self.frames_begun
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    fn record_draw(&mut self, mode: PrimitiveType, kind: DrawKind) {
        self.draws.push(DrawCall {
            mode,
            kind,
            vertex_program: self.bound_program(ShaderStage::Vertex),
            fragment_program: self.bound_program(ShaderStage::Fragment),
        });
    }
}

impl Device for SoftDevice {
    fn debug_marker(&mut self, label: &str) {
        self.markers.push(label.to_string());
    }

    fn is_context_lost(&self) -> bool {
        self.context_lost
    }

    fn surface_size(&self) -> (u32, u32) {
        self.surface
    }

    fn create_buffer(&mut self, target: BufferTarget, size: usize, dynamic: bool) -> Result<NativeBuffer, DeviceError> {
        let data = self.allocate(size)?;
        let name = NativeBuffer(self.name());
        self.buffers.insert(name, SoftBuffer { target, dynamic, data });
        Ok(name)
    }

    fn delete_buffer(&mut self, buffer: NativeBuffer) {
        self.buffers.remove(&buffer);
        if self.array_buffer == Some(buffer) {
            self.array_buffer = None;
        }
    }

    fn buffer_sub_data(
        &mut self,
        target: BufferTarget,
        buffer: NativeBuffer,
        offset: usize,
        data: &[u8],
    ) -> Result<(), DeviceError> {
        let buffer = self.buffer(target, buffer)?;
        let range = buffer
            .data
            .get_mut(offset..offset.saturating_add(data.len()))
            .ok_or(DeviceError::InvalidOperation("range outside buffer"))?;
        range.copy_from_slice(data);
        Ok(())
    }

    fn get_buffer_sub_data(
        &mut self,
        target: BufferTarget,
        buffer: NativeBuffer,
        offset: usize,
        out: &mut [u8],
    ) -> Result<(), DeviceError> {
        let buffer = self.buffer(target, buffer)?;
        let range = buffer
            .data
            .get(offset..offset.saturating_add(out.len()))
            .ok_or(DeviceError::InvalidOperation("range outside buffer"))?;
        out.copy_from_slice(range);
        Ok(())
    }

    fn enable_vertex_attrib(&mut self, index: u32, buffer: NativeBuffer, pointer: &AttribPointer) {
        if let Some(slot) = self.attribs.get_mut(index as usize) {
            *slot = Some(VertexAttrib {
                buffer,
                pointer: *pointer,
            });
            self.array_buffer = Some(buffer);
        }
    }

    fn disable_vertex_attrib(&mut self, index: u32) {
        if let Some(slot) = self.attribs.get_mut(index as usize) {
            *slot = None;
        }
    }

    fn unbind_array_buffer(&mut self) {
        self.array_buffer = None;
    }

    fn create_texture(&mut self, target: TextureTarget) -> Result<NativeTexture, DeviceError> {
        if self.context_lost {
            return Err(DeviceError::ContextLost);
        }
        let name = NativeTexture(self.name());
        self.textures.insert(
            name,
            SoftTexture {
                target,
                images: HashMap::new(),
                sampler: None,
            },
        );
        Ok(name)
    }

    fn delete_texture(&mut self, texture: NativeTexture) {
        self.textures.remove(&texture);
        self.bound_textures.retain(|_, bound| *bound != texture);
    }

    fn bind_texture(&mut self, target: TextureTarget, texture: Option<NativeTexture>) {
        match texture {
            Some(texture) => self.bound_textures.insert(target, texture),
            None => self.bound_textures.remove(&target),
        };
    }

    fn tex_image(
        &mut self,
        image: ImageTarget,
        level: u32,
        format: TextureFormat,
        width: u32,
        height: u32,
        depth: u32,
    ) -> Result<(), DeviceError> {
        let info = MipLevelInfo {
            format,
            width,
            height,
            depth,
        };
        let data = self.allocate(info.level_size().ok_or(DeviceError::OutOfMemory)?)?;
        self.current_texture(image.texture_target())?
            .images
            .insert((image, level), SoftImage { info, data });
        Ok(())
    }

    fn tex_sub_image(&mut self, image: ImageTarget, level: u32, volume: &Volume, data: &[u8]) -> Result<(), DeviceError> {
        let image = self.image(image, level)?;
        if !image.info.check_volume(volume) {
            return Err(DeviceError::InvalidOperation("volume outside level"));
        }
        if data.len() != TransferInfo::packed(&image.info, volume).total_size {
            return Err(DeviceError::InvalidOperation("data size does not match volume"));
        }
        insert_volume(&image.info, &mut image.data, volume, data);
        Ok(())
    }

    fn get_tex_image(&mut self, image: ImageTarget, level: u32, out: &mut [u8]) -> Result<(), DeviceError> {
        let image = self.image(image, level)?;
        if out.len() != image.data.len() {
            return Err(DeviceError::InvalidOperation("output size does not match level"));
        }
        out.copy_from_slice(&image.data);
        Ok(())
    }

    fn set_sampler_parameters(&mut self, target: TextureTarget, parameters: &SamplerParameters) {
        if let Ok(texture) = self.current_texture(target) {
            texture.sampler = Some(*parameters);
        }
    }

    fn compile_program(&mut self, stage: ShaderStage, source: &str, entry_point: &str) -> Result<String, DeviceError> {
        if self.context_lost {
            return Err(DeviceError::ContextLost);
        }
        compiler::compile(stage, source, entry_point)
    }

    fn load_program(&mut self, stage: ShaderStage, assembly: &str) -> NativeProgram {
        let name = NativeProgram(self.name());
        let params = match assembler::assemble(stage, assembly) {
            Ok(program) => program
                .params
                .into_iter()
                .map(|p| SoftParam {
                    name: p.name,
                    ty: p.ty,
                    variability: p.variability,
                    direction: p.direction,
                    value: None,
                    unit: TextureUnit::default(),
                })
                .collect(),
            Err(err) => {
                logwise::debuginternal_sync!(
                    "assembler stopped at {position}",
                    position = err.position
                );
                self.program_error = Some(err);
                Vec::new()
            }
        };
        self.programs.insert(
            name,
            SoftProgram {
                stage,
                assembly: assembly.to_string(),
                params,
            },
        );
        name
    }

    fn take_program_error(&mut self) -> Option<ProgramError> {
        self.program_error.take()
    }

    fn program_parameters(&self, program: NativeProgram) -> Vec<ParameterInfo> {
        let Some(program_data) = self.programs.get(&program) else {
            return Vec::new();
        };
        program_data
            .params
            .iter()
            .enumerate()
            .map(|(index, p)| ParameterInfo {
                name: p.name.clone(),
                ty: p.ty,
                variability: p.variability,
                direction: p.direction,
                handle: NativeParam {
                    program,
                    index: index as u32,
                },
            })
            .collect()
    }

    fn delete_program(&mut self, program: NativeProgram) {
        self.programs.remove(&program);
        self.bound_programs.retain(|_, bound| *bound != program);
    }

    fn bind_program(&mut self, stage: ShaderStage, program: Option<NativeProgram>) {
        match program {
            Some(program) => self.bound_programs.insert(stage, program),
            None => self.bound_programs.remove(&stage),
        };
    }

    fn set_program_parameter(&mut self, param: NativeParam, value: ParamValue<'_>) {
        if let Some(param) = self.param(param) {
            param.value = Some(match value {
                ParamValue::Float(values) => ParamRecord::Float(values.to_vec()),
                ParamValue::Int(value) => ParamRecord::Int(value),
                ParamValue::Bool(value) => ParamRecord::Bool(value),
            });
        }
    }

    fn set_texture_parameter(&mut self, param: NativeParam, texture: NativeTexture) {
        if let Some(param) = self.param(param) {
            param.unit.texture = Some(texture);
        }
    }

    fn enable_texture_parameter(&mut self, param: NativeParam) {
        if let Some(param) = self.param(param) {
            param.unit.enabled = true;
        }
    }

    fn disable_texture_parameter(&mut self, param: NativeParam) {
        if let Some(param) = self.param(param) {
            param.unit.enabled = false;
        }
    }

    fn set_program_env_parameter(&mut self, stage: ShaderStage, index: u32, value: [f32; 4]) {
        self.env.insert((stage, index), value);
    }

    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.state.viewport = Some(NativeViewport { x, y, width, height });
    }

    fn set_depth_range(&mut self, near: f32, far: f32) {
        self.state.depth_range = Some((near, far));
    }

    fn set_scissor(&mut self, rect: Option<ScissorRect>) {
        self.state.scissor = Some(rect);
    }

    fn set_point_line_raster(&mut self, state: &PointLineRaster) {
        self.state.point_line_raster = Some(*state);
    }

    fn set_polygon_raster(&mut self, state: &PolygonRaster) {
        self.state.polygon_raster = Some(*state);
    }

    fn set_polygon_offset(&mut self, state: &PolygonOffset) {
        self.state.polygon_offset = Some(*state);
    }

    fn set_alpha_test(&mut self, state: &AlphaTest) {
        self.state.alpha_test = Some(*state);
    }

    fn set_depth_test(&mut self, state: &DepthTest) {
        self.state.depth_test = Some(*state);
    }

    fn set_stencil_test(&mut self, state: &StencilTest) {
        self.state.stencil_test = Some(*state);
    }

    fn set_color_write(&mut self, state: &ColorWrite) {
        self.state.color_write = Some(*state);
    }

    fn set_blending(&mut self, state: &Blending) {
        self.state.blending = Some(*state);
    }

    fn set_blending_color(&mut self, color: Rgba) {
        self.state.blending_color = Some(color);
    }

    fn begin_frame(&mut self) {
        self.frames_begun += 1;
    }

    fn present(&mut self) -> Result<(), DeviceError> {
        if self.context_lost {
            return Err(DeviceError::ContextLost);
        }
        self.frames_presented += 1;
        Ok(())
    }

    fn clear(&mut self, buffers: ClearBuffers, color: Rgba, depth: f32, stencil: u32) {
        self.state.last_clear = Some(ClearCall {
            buffers,
            color,
            depth,
            stencil,
        });
    }

    fn draw_arrays(&mut self, mode: PrimitiveType, first: u32, vertex_count: u32) {
        self.record_draw(mode, DrawKind::Arrays { first, vertex_count });
    }

    fn draw_range_elements(
        &mut self,
        mode: PrimitiveType,
        index_buffer: NativeBuffer,
        index_type: IndexType,
        min_index: u32,
        max_index: u32,
        index_count: u32,
        offset: usize,
    ) {
        self.record_draw(
            mode,
            DrawKind::Elements {
                index_buffer,
                index_type,
                min_index,
                max_index,
                index_count,
                offset,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_are_target_checked() {
        let mut device = SoftDevice::new(8, 8);
        let buffer = device.create_buffer(BufferTarget::Array, 8, false).unwrap();
        device.buffer_sub_data(BufferTarget::Array, buffer, 4, &[1, 2, 3, 4]).unwrap();
        assert!(device.buffer_sub_data(BufferTarget::ElementArray, buffer, 0, &[1]).is_err());
        assert!(device.buffer_sub_data(BufferTarget::Array, buffer, 6, &[1, 2, 3]).is_err());
        let mut out = [0u8; 8];
        device.get_buffer_sub_data(BufferTarget::Array, buffer, 0, &mut out).unwrap();
        assert_eq!(out, [0, 0, 0, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn allocation_limit() {
        let mut device = SoftDevice::new(8, 8).with_max_allocation(16);
        assert_eq!(
            device.create_buffer(BufferTarget::Array, 17, false),
            Err(DeviceError::OutOfMemory)
        );
        assert!(device.create_buffer(BufferTarget::Array, 16, true).is_ok());
    }

    #[test]
    fn texture_calls_need_a_bound_texture() {
        let mut device = SoftDevice::new(8, 8);
        let texture = device.create_texture(TextureTarget::Texture2D).unwrap();
        assert!(
            device
                .tex_image(ImageTarget::Texture2D, 0, TextureFormat::Argb8, 2, 2, 1)
                .is_err()
        );
        device.bind_texture(TextureTarget::Texture2D, Some(texture));
        device
            .tex_image(ImageTarget::Texture2D, 0, TextureFormat::Argb8, 2, 2, 1)
            .unwrap();
        let mut level = [0xFFu8; 16];
        device.get_tex_image(ImageTarget::Texture2D, 0, &mut level).unwrap();
        assert_eq!(level, [0; 16]);
        device.delete_texture(texture);
        assert_eq!(device.bound_texture(TextureTarget::Texture2D), None);
    }

    #[test]
    fn failed_load_sets_sticky_error() {
        let mut device = SoftDevice::new(8, 8);
        let program = device.load_program(ShaderStage::Fragment, "!!ARBvp1.0\nEND\n");
        let err = device.take_program_error().unwrap();
        assert_eq!(err.position, 0);
        assert!(device.take_program_error().is_none());
        assert!(device.program_parameters(program).is_empty());
    }

    #[test]
    fn parameters_record_values_and_units() {
        let mut device = SoftDevice::new(8, 8);
        let assembly = compiler::compile(
            ShaderStage::Fragment,
            "float4 tint; sampler2D s; float4 ps() : COLOR { return tint * tex2D(s, 0); }",
            "ps",
        )
        .unwrap();
        let program = device.load_program(ShaderStage::Fragment, &assembly);
        assert!(device.take_program_error().is_none());
        let tint = device.find_param(program, "tint").unwrap();
        let sampler = device.find_param(program, "s").unwrap();
        device.set_program_parameter(tint, ParamValue::Float(&[1.0, 0.5, 0.25, 1.0]));
        assert_eq!(
            device.param_value(tint),
            Some(&ParamRecord::Float(vec![1.0, 0.5, 0.25, 1.0]))
        );
        device.set_texture_parameter(sampler, NativeTexture(42));
        device.enable_texture_parameter(sampler);
        assert_eq!(
            device.texture_unit(sampler),
            Some(TextureUnit {
                texture: Some(NativeTexture(42)),
                enabled: true
            })
        );
        device.disable_texture_parameter(sampler);
        assert!(!device.texture_unit(sampler).unwrap().enabled);
    }
}
