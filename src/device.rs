// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
The native 3D API seam.

Everything the engine does to the GPU goes through [`Device`].  The trait is
deliberately shaped like the immediate-mode API the engine was designed against:
objects are named by small integers, there is one current program per stage, one
current texture per target, and program assembly errors are reported through a
sticky error flag rather than by the compiler.

The engine tracks which of this implicit "current binding" state each call may
clobber.  In particular:

- [`Device::bind_texture`] and [`Device::set_sampler_parameters`] change the
  current texture binding, so sampler state is applied in its own pass before
  texture parameters are enabled (see [`crate::effect::Effect::begin`]).
- [`Device::enable_vertex_attrib`] binds the array buffer as a side effect; the
  engine restores it to none once stream validation is finished.
- [`Device::load_program`] only reports failure through
  [`Device::take_program_error`].

Backends live under `imp`.
*/

use crate::format::{TextureFormat, Volume};
use crate::render_state::{
    AlphaTest, Blending, ClearBuffers, ColorWrite, DepthTest, PointLineRaster, PolygonOffset,
    PolygonRaster, PrimitiveType, Rgba, ScissorRect, StencilTest,
};
use crate::sampler::{AddressingMode, FilteringMode};
use crate::texture::CubeFace;

/// Native buffer name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeBuffer(pub u32);

/// Native texture name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeTexture(pub u32);

/// Native program name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeProgram(pub u32);

/// One parameter of one loaded program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeParam {
    pub program: NativeProgram,
    pub index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Texture2D,
    Texture3D,
    CubeMap,
}

/// A single image slot of a texture: the texture itself, or one face of a cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageTarget {
    Texture2D,
    Texture3D,
    CubeFace(CubeFace),
}

impl ImageTarget {
    pub const fn texture_target(self) -> TextureTarget {
        match self {
            ImageTarget::Texture2D => TextureTarget::Texture2D,
            ImageTarget::Texture3D => TextureTarget::Texture3D,
            ImageTarget::CubeFace(_) => TextureTarget::CubeMap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    Float,
    UnsignedByte,
}

/// How one vertex attribute reads from its bound buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttribPointer {
    pub components: u8,
    pub component_type: ComponentType,
    pub normalized: bool,
    pub stride: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    U16,
    U32,
}

impl IndexType {
    pub const fn size(self) -> u32 {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Filtering and addressing for the currently bound texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerParameters {
    pub address: [AddressingMode; 3],
    pub mag_filter: FilteringMode,
    pub min_filter: FilteringMode,
    pub mip_filter: FilteringMode,
    pub max_anisotropy: u32,
    pub border_color: Rgba,
}

/// Type of a program parameter as the native compiler reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeParamType {
    Float1,
    Float2,
    Float3,
    Float4,
    Float4x4,
    Int,
    Bool,
    Sampler,
    /// Anything the engine has no command for (structs, arrays, other matrices).
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variability {
    Uniform,
    Varying,
    Constant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
    InOut,
}

/// One leaf parameter of a loaded program.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    pub name: String,
    pub ty: NativeParamType,
    pub variability: Variability,
    pub direction: Direction,
    pub handle: NativeParam,
}

/// A value pushed into a program parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue<'a> {
    Float(&'a [f32]),
    Int(i32),
    Bool(bool),
}

/// Contents of the sticky program error flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramError {
    /// Byte offset into the assembly where loading stopped.
    pub position: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DeviceError {
    #[error("out of device memory")]
    OutOfMemory,
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
    #[error("compile error: {0}")]
    Compile(String),
    #[error("device context lost")]
    ContextLost,
}

/// The native 3D API.
pub trait Device {
    /// Annotates the command stream for debugging tools.
    fn debug_marker(&mut self, _label: &str) {}

    /// Whether the native context has been lost.  Loss is unrecoverable.
    fn is_context_lost(&self) -> bool {
        false
    }

    /// Dimensions of the surface being rendered to.
    fn surface_size(&self) -> (u32, u32);

    // Buffers.

    fn create_buffer(
        &mut self,
        target: BufferTarget,
        size: usize,
        dynamic: bool,
    ) -> Result<NativeBuffer, DeviceError>;
    fn delete_buffer(&mut self, buffer: NativeBuffer);
    fn buffer_sub_data(
        &mut self,
        target: BufferTarget,
        buffer: NativeBuffer,
        offset: usize,
        data: &[u8],
    ) -> Result<(), DeviceError>;
    fn get_buffer_sub_data(
        &mut self,
        target: BufferTarget,
        buffer: NativeBuffer,
        offset: usize,
        out: &mut [u8],
    ) -> Result<(), DeviceError>;

    // Vertex attributes.

    /// Enables attribute `index` and points it at `buffer`.  Leaves `buffer`
    /// bound to [`BufferTarget::Array`].
    fn enable_vertex_attrib(&mut self, index: u32, buffer: NativeBuffer, pointer: &AttribPointer);
    fn disable_vertex_attrib(&mut self, index: u32);
    fn unbind_array_buffer(&mut self);

    // Textures.

    fn create_texture(&mut self, target: TextureTarget) -> Result<NativeTexture, DeviceError>;
    fn delete_texture(&mut self, texture: NativeTexture);
    /// Makes `texture` current for `target`.  Every other texture call acts on
    /// the current texture.
    fn bind_texture(&mut self, target: TextureTarget, texture: Option<NativeTexture>);
    /// Allocates zero-filled storage for one level of the current texture.
    fn tex_image(
        &mut self,
        image: ImageTarget,
        level: u32,
        format: TextureFormat,
        width: u32,
        height: u32,
        depth: u32,
    ) -> Result<(), DeviceError>;
    /// Uploads packed `data` into `volume` of one level of the current texture.
    fn tex_sub_image(
        &mut self,
        image: ImageTarget,
        level: u32,
        volume: &Volume,
        data: &[u8],
    ) -> Result<(), DeviceError>;
    /// Reads one whole level of the current texture, packed.
    fn get_tex_image(&mut self, image: ImageTarget, level: u32, out: &mut [u8]) -> Result<(), DeviceError>;
    /// Programs filtering and addressing for the current texture of `target`.
    fn set_sampler_parameters(&mut self, target: TextureTarget, parameters: &SamplerParameters);

    // Programs.

    /// Compiles `entry_point` of `source` into program assembly for `stage`.
    fn compile_program(
        &mut self,
        stage: ShaderStage,
        source: &str,
        entry_point: &str,
    ) -> Result<String, DeviceError>;
    /// Assembles and loads program text.  Failure is only visible through
    /// [`Device::take_program_error`].
    fn load_program(&mut self, stage: ShaderStage, assembly: &str) -> NativeProgram;
    /// Reads and clears the sticky program error flag.
    fn take_program_error(&mut self) -> Option<ProgramError>;
    /// Every leaf parameter of a loaded program, in declaration order.
    fn program_parameters(&self, program: NativeProgram) -> Vec<ParameterInfo>;
    fn delete_program(&mut self, program: NativeProgram);
    fn bind_program(&mut self, stage: ShaderStage, program: Option<NativeProgram>);
    fn set_program_parameter(&mut self, param: NativeParam, value: ParamValue<'_>);
    fn set_texture_parameter(&mut self, param: NativeParam, texture: NativeTexture);
    fn enable_texture_parameter(&mut self, param: NativeParam);
    fn disable_texture_parameter(&mut self, param: NativeParam);
    /// Sets a per-stage environment constant shared by every program.
    fn set_program_env_parameter(&mut self, stage: ShaderStage, index: u32, value: [f32; 4]);

    // Fixed-function state.

    /// Sets the viewport in native (bottom-left origin) coordinates.
    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32);
    fn set_depth_range(&mut self, near: f32, far: f32);
    fn set_scissor(&mut self, rect: Option<ScissorRect>);
    fn set_point_line_raster(&mut self, state: &PointLineRaster);
    fn set_polygon_raster(&mut self, state: &PolygonRaster);
    fn set_polygon_offset(&mut self, state: &PolygonOffset);
    fn set_alpha_test(&mut self, state: &AlphaTest);
    fn set_depth_test(&mut self, state: &DepthTest);
    fn set_stencil_test(&mut self, state: &StencilTest);
    fn set_color_write(&mut self, state: &ColorWrite);
    fn set_blending(&mut self, state: &Blending);
    fn set_blending_color(&mut self, color: Rgba);

    // Frames and draws.

    fn begin_frame(&mut self);
    fn present(&mut self) -> Result<(), DeviceError>;
    fn clear(&mut self, buffers: ClearBuffers, color: Rgba, depth: f32, stencil: u32);
    fn draw_arrays(&mut self, mode: PrimitiveType, first: u32, vertex_count: u32);
    #[allow(clippy::too_many_arguments)]
    fn draw_range_elements(
        &mut self,
        mode: PrimitiveType,
        index_buffer: NativeBuffer,
        index_type: IndexType,
        min_index: u32,
        max_index: u32,
        index_count: u32,
        offset: usize,
    );
}
