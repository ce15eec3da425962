// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Vertex and index storage, and the layouts that feed vertex data to programs.
//!
//! - [`buffer`] holds fixed-size byte stores with bounds-checked partial transfers.
//! - [`vertex_struct`] maps regions of vertex buffers onto numbered vertex attributes.

pub mod buffer;
pub mod vertex_struct;

pub use buffer::{BufferFlags, IndexBuffer, VertexBuffer};
pub use vertex_struct::{Semantic, VertexInput, VertexStruct, VertexType};
