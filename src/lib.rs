// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! command_buffer_gapi is the execution engine behind a GPU command buffer.

A decoder (not part of this crate) reads serialized GPU commands and calls one
entry point of [`Gapi`] per command.  The engine owns every GPU resource the
stream creates, each under an id the stream chose, and replays the commands
against a native 3D API reached through the [`device::Device`] trait.

| Kind          | Create                          | Notes                                              |
|---------------|---------------------------------|----------------------------------------------------|
| Vertex buffer | [`Gapi::create_vertex_buffer`]  | Fixed size, partial reads and writes               |
| Index buffer  | [`Gapi::create_index_buffer`]   | 16 or 32 bit indices                               |
| Vertex struct | [`Gapi::create_vertex_struct`]  | Maps buffer regions to shader inputs               |
| Texture       | [`Gapi::create_texture_2d`] etc | 2D, 3D or cube, with a mip chain                   |
| Sampler       | [`Gapi::create_sampler`]        | Filtering and addressing, refers to a texture id   |
| Effect        | [`Gapi::create_effect`]         | Vertex and fragment program pair                   |
| Effect param  | [`Gapi::create_param`]          | Names one uniform of an effect                     |

# Deferred validation

Nothing is bound when the stream selects an effect or a vertex struct.  The
engine records that the selection is dirty and binds it on the next draw, so a
stream may create, select and destroy resources in any order as long as the
state is consistent when it draws.  See [`gapi`].

# Clip space

Effects are written for a top-left, zero-to-one depth convention.  Before a
vertex program is loaded the engine patches its assembly so the native API sees
the position it expects.  [`ClipSpaceConvention`] selects which corrections are
applied; see [`effect::rewrite`].

# Backends

[`SoftDevice`] keeps everything in memory and records what was bound and
drawn.  It is what the tests run against, and it is a reasonable model of what
a native backend has to provide.

# Errors

Every entry point returns `Result<_, Error>`.  A command stream only
distinguishes three outcomes; [`ParseError::from_result`] maps a result to
them.
*/

logwise::declare_logging_domain!();

pub mod config;
pub mod device;
pub mod effect;
pub mod error;
pub mod format;
pub mod gapi;
pub mod geometry;
pub mod imp;
pub mod render_state;
pub mod resource;
pub mod sampler;
pub mod texture;

pub use config::{ClipSpaceConvention, GapiConfig};
pub use error::{Error, ParseError};
pub use gapi::Gapi;
pub use imp::SoftDevice;
pub use resource::{INVALID_RESOURCE, ResourceId};
