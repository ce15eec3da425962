// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//at the moment only the in-memory backend exists

mod soft;

pub use soft::{
    ClearCall, DrawCall, DrawKind, FixedFunctionState, NativeViewport, ParamRecord, SoftDevice, TextureUnit,
    VertexAttrib,
};
