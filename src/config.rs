// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Engine configuration.
//!
//! The one policy decision here is [`ClipSpaceConvention`].  Command streams are
//! authored against a clip space where depth runs over `[0, w]` and pixel centers
//! sit on integer coordinates.  A native API whose depth runs over `[-w, w]` and
//! whose pixel centers sit at half-integers needs every vertex program patched to
//! match.  Which patches are applied is chosen here rather than hard-coded.

/// Which clip-space corrections the vertex program rewrite appends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipSpaceConvention {
    /// Shift x/y of the output position by half a pixel, scaled by w.
    pub half_pixel_offset: bool,
    /// Remap z from `[0, w]` to `[-w, w]`.
    pub depth_remap: bool,
}

impl ClipSpaceConvention {
    /// Streams authored for `[0, w]` depth and integer pixel centers, replayed on
    /// an API with `[-w, w]` depth and half-integer centers.
    pub const D3D_ON_GL: ClipSpaceConvention = ClipSpaceConvention {
        half_pixel_offset: true,
        depth_remap: true,
    };

    /// Stream and native API already agree; positions pass through unchanged.
    pub const NATIVE: ClipSpaceConvention = ClipSpaceConvention {
        half_pixel_offset: false,
        depth_remap: false,
    };
}

impl Default for ClipSpaceConvention {
    fn default() -> Self {
        Self::D3D_ON_GL
    }
}

/// Settings fixed for the lifetime of one engine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapiConfig {
    pub clip_space: ClipSpaceConvention,
    /// Vertex program environment slot holding the per-viewport helper constant.
    pub helper_env_index: u32,
    /// Largest mip level count a texture may be created with.
    pub max_texture_levels: u32,
    /// Largest width, height or depth a texture may be created with.
    pub max_texture_dimension: u32,
    /// Largest input count a vertex struct may be created with.
    pub max_vertex_inputs: u32,
}

impl Default for GapiConfig {
    fn default() -> Self {
        GapiConfig {
            clip_space: ClipSpaceConvention::default(),
            helper_env_index: 0,
            max_texture_levels: 14,
            max_texture_dimension: 8192,
            max_vertex_inputs: 16,
        }
    }
}

impl GapiConfig {
    pub fn with_clip_space(mut self, clip_space: ClipSpaceConvention) -> Self {
        self.clip_space = clip_space;
        self
    }

    pub fn with_helper_env_index(mut self, index: u32) -> Self {
        self.helper_env_index = index;
        self
    }

    pub fn with_max_texture_levels(mut self, levels: u32) -> Self {
        self.max_texture_levels = levels;
        self
    }

    pub fn with_max_texture_dimension(mut self, dimension: u32) -> Self {
        self.max_texture_dimension = dimension;
        self
    }

    pub fn with_max_vertex_inputs(mut self, inputs: u32) -> Self {
        self.max_vertex_inputs = inputs;
        self
    }
}
