// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Fixed-function state handed to the device by the render-state setters.
//!
//! These are plain data.  The engine validates them and forwards them; it does not
//! interpret them beyond the viewport helper constant used by the vertex rewrite.

use bitflags::bitflags;

/// Topology of a draw call.  Draw counts are in primitives, not vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Points,
    Lines,
    LineStrips,
    Triangles,
    TriangleStrips,
    TriangleFans,
}

impl PrimitiveType {
    /// Number of vertices consumed by `count` primitives.
    ///
    /// Returns `None` on overflow.  Zero primitives consume zero vertices
    /// for every topology.
    pub fn vertex_count(self, count: u32) -> Option<u32> {
        if count == 0 {
            return Some(0);
        }
        match self {
            PrimitiveType::Points => Some(count),
            PrimitiveType::Lines => count.checked_mul(2),
            PrimitiveType::LineStrips => count.checked_add(1),
            PrimitiveType::Triangles => count.checked_mul(3),
            PrimitiveType::TriangleStrips | PrimitiveType::TriangleFans => count.checked_add(2),
        }
    }
}

/// Comparison used by the alpha, depth and stencil tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Never,
    Less,
    Equal,
    LEqual,
    Greater,
    NotEqual,
    GEqual,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    IncNoWrap,
    DecNoWrap,
    Invert,
    IncWrap,
    DecWrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFunc {
    Zero,
    One,
    SrcColor,
    InvSrcColor,
    SrcAlpha,
    InvSrcAlpha,
    DstAlpha,
    InvDstAlpha,
    DstColor,
    InvDstColor,
    SrcAlphaSaturate,
    BlendColor,
    InvBlendColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendEq {
    Add,
    Sub,
    RevSub,
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonMode {
    Point,
    Line,
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceCullMode {
    None,
    Cw,
    Ccw,
}

bitflags! {
    /// Which framebuffer planes `Clear` touches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearBuffers: u32 {
        const COLOR = 0x1;
        const DEPTH = 0x2;
        const STENCIL = 0x4;
    }
}

/// An RGBA color with float channels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Rgba {
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Rgba {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub const fn to_array(self) -> [f32; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }
}

/// Viewport rectangle, top-left origin, plus depth range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub z_min: f32,
    pub z_max: f32,
}

/// Scissor rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScissorRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLineRaster {
    pub line_smooth: bool,
    pub point_sprite: bool,
    pub point_size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolygonRaster {
    pub fill_mode: PolygonMode,
    pub cull_mode: FaceCullMode,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonOffset {
    pub slope_factor: f32,
    pub units: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaTest {
    pub enable: bool,
    pub reference: f32,
    pub comparison: Comparison,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthTest {
    pub enable: bool,
    pub write_enable: bool,
    pub comparison: Comparison,
}

/// Stencil function and operations for one face winding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilFaceOps {
    pub func: Comparison,
    pub pass_op: StencilOp,
    pub fail_op: StencilOp,
    pub zfail_op: StencilOp,
}

impl Default for StencilFaceOps {
    fn default() -> Self {
        StencilFaceOps {
            func: Comparison::Always,
            pass_op: StencilOp::Keep,
            fail_op: StencilOp::Keep,
            zfail_op: StencilOp::Keep,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilTest {
    pub enable: bool,
    /// When false, `ccw` is ignored and `cw` applies to both windings.
    pub separate_ccw: bool,
    pub write_mask: u8,
    pub compare_mask: u8,
    pub reference: u8,
    pub cw: StencilFaceOps,
    pub ccw: StencilFaceOps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorWrite {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
    pub alpha: bool,
    pub dither: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendChannel {
    pub equation: BlendEq,
    pub src_func: BlendFunc,
    pub dst_func: BlendFunc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blending {
    pub enable: bool,
    /// When false, `alpha` is ignored and `color` applies to all channels.
    pub separate_alpha: bool,
    pub color: BlendChannel,
    pub alpha: BlendChannel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_counts() {
        assert_eq!(PrimitiveType::Points.vertex_count(5), Some(5));
        assert_eq!(PrimitiveType::Lines.vertex_count(5), Some(10));
        assert_eq!(PrimitiveType::LineStrips.vertex_count(5), Some(6));
        assert_eq!(PrimitiveType::Triangles.vertex_count(4), Some(12));
        assert_eq!(PrimitiveType::TriangleStrips.vertex_count(4), Some(6));
        assert_eq!(PrimitiveType::TriangleFans.vertex_count(4), Some(6));
        assert_eq!(PrimitiveType::TriangleFans.vertex_count(0), Some(0));
        assert_eq!(PrimitiveType::Triangles.vertex_count(u32::MAX), None);
    }
}
