// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Fixed-function state and frame commands.
//!
//! Stream rectangles use a top-left origin; the device expects bottom-left, so
//! viewport and scissor rectangles are flipped against the surface height.

use super::Gapi;
use crate::device::{Device, ShaderStage};
use crate::error::Error;
use crate::render_state::{
    AlphaTest, Blending, ClearBuffers, ColorWrite, DepthTest, PointLineRaster, PolygonOffset,
    PolygonRaster, Rgba, ScissorRect, StencilTest, Viewport,
};

impl<D: Device> Gapi<D> {
    fn flip_y(&self, y: u32, height: u32) -> u32 {
        let (_, surface_height) = self.device.surface_size();
        surface_height.saturating_sub(y.saturating_add(height))
    }

    /// Sets the viewport and depth range, and refreshes the vertex program
    /// helper constant `(1 / width, -1 / height, 2, 0)`.
    pub fn set_viewport(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        z_min: f32,
        z_max: f32,
    ) -> Result<(), Error> {
        self.live()?;
        if width == 0 || height == 0 {
            return Err(Error::InvalidArgument("viewport must have a non-zero size"));
        }
        let native_y = self.flip_y(y, height);
        self.device.set_viewport(x, native_y, width, height);
        self.device.set_depth_range(z_min, z_max);
        self.device.set_program_env_parameter(
            ShaderStage::Vertex,
            self.config.helper_env_index,
            [1.0 / width as f32, -1.0 / height as f32, 2.0, 0.0],
        );
        self.viewport = Some(Viewport {
            x,
            y,
            width,
            height,
            z_min,
            z_max,
        });
        Ok(())
    }

    /// The last viewport set, in stream coordinates.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn set_scissor(&mut self, enable: bool, x: u32, y: u32, width: u32, height: u32) -> Result<(), Error> {
        self.live()?;
        let rect = enable.then(|| ScissorRect {
            x,
            y: self.flip_y(y, height),
            width,
            height,
        });
        self.device.set_scissor(rect);
        Ok(())
    }

    pub fn set_point_line_raster(&mut self, state: PointLineRaster) -> Result<(), Error> {
        self.live()?;
        if state.point_size.is_nan() || state.point_size <= 0.0 {
            return Err(Error::InvalidArgument("point size must be positive"));
        }
        self.device.set_point_line_raster(&state);
        Ok(())
    }

    pub fn set_polygon_raster(&mut self, state: PolygonRaster) -> Result<(), Error> {
        self.live()?;
        self.device.set_polygon_raster(&state);
        Ok(())
    }

    pub fn set_polygon_offset(&mut self, state: PolygonOffset) -> Result<(), Error> {
        self.live()?;
        self.device.set_polygon_offset(&state);
        Ok(())
    }

    pub fn set_alpha_test(&mut self, state: AlphaTest) -> Result<(), Error> {
        self.live()?;
        self.device.set_alpha_test(&state);
        Ok(())
    }

    pub fn set_depth_test(&mut self, state: DepthTest) -> Result<(), Error> {
        self.live()?;
        self.device.set_depth_test(&state);
        Ok(())
    }

    /// Sets the stencil test.  Without `separate_ccw`, counter-clockwise faces use
    /// the clockwise operations.
    pub fn set_stencil_test(&mut self, mut state: StencilTest) -> Result<(), Error> {
        self.live()?;
        if !state.separate_ccw {
            state.ccw = state.cw;
        }
        self.device.set_stencil_test(&state);
        Ok(())
    }

    pub fn set_color_write(&mut self, state: ColorWrite) -> Result<(), Error> {
        self.live()?;
        self.device.set_color_write(&state);
        Ok(())
    }

    /// Sets blending.  Without `separate_alpha`, alpha uses the color channel's
    /// equation and factors.
    pub fn set_blending(&mut self, mut state: Blending) -> Result<(), Error> {
        self.live()?;
        if !state.separate_alpha {
            state.alpha = state.color;
        }
        self.device.set_blending(&state);
        Ok(())
    }

    pub fn set_blending_color(&mut self, color: Rgba) -> Result<(), Error> {
        self.live()?;
        self.device.set_blending_color(color);
        Ok(())
    }

    pub fn begin_frame(&mut self) -> Result<(), Error> {
        self.live()?;
        if self.in_frame {
            return Err(Error::InvalidArgument("frame already begun"));
        }
        self.device.begin_frame();
        self.in_frame = true;
        Ok(())
    }

    /// Presents the frame.
    pub fn end_frame(&mut self) -> Result<(), Error> {
        self.live()?;
        if !self.in_frame {
            return Err(Error::InvalidArgument("no frame to end"));
        }
        self.device.present().inspect_err(|e| {
            logwise::error_sync!("present failed: {err}", err = logwise::privacy::LogIt(e));
        })?;
        self.in_frame = false;
        self.frames += 1;
        logwise::trace_sync!("presented frame {frame}", frame = self.frames);
        Ok(())
    }

    /// Frames presented since the engine was created.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn clear(&mut self, buffers: ClearBuffers, color: Rgba, depth: f32, stencil: u32) -> Result<(), Error> {
        self.live()?;
        self.device.clear(buffers, color, depth, stencil);
        Ok(())
    }
}
