// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Effects: a linked vertex + fragment program pair and its uniform parameters.

Creating an effect compiles both entry points, patches the vertex program to the
native clip-space convention (see [`rewrite`]), loads both programs, and collects
every top-level uniform input parameter of either stage.  A parameter declared in
both stages is listed once, with a native handle per stage.

Parameters are exposed to the command stream as separate [`param::EffectParam`]
resources.  These hold the owning effect's id rather than a reference, so a
destroyed effect is simply a failed lookup.
*/

pub mod creation;
pub mod param;
pub mod rewrite;

use crate::config::GapiConfig;
use crate::device::{
    Device, Direction, NativeParam, NativeParamType, NativeProgram, NativeTexture, ShaderStage,
    Variability,
};
use crate::error::Error;
use crate::resource::{INVALID_RESOURCE, Resource, ResourceId, ResourceKind, ResourceMap};
use crate::sampler::Sampler;
use crate::texture::Texture;
use creation::EffectData;

pub use param::{EffectParam, ParamDesc};

/// Type of an effect parameter as seen by the command stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// A parameter the stream can see but not set.
    Unknown,
    Float1,
    Float2,
    Float3,
    Float4,
    Matrix4,
    Int,
    Bool,
    /// Holds the id of a [`Sampler`].
    Sampler,
}

impl DataType {
    /// Bytes `SetParamData` must supply for this type.
    pub const fn size(self) -> usize {
        match self {
            DataType::Unknown => 0,
            DataType::Float1 | DataType::Int | DataType::Bool | DataType::Sampler => 4,
            DataType::Float2 => 8,
            DataType::Float3 => 12,
            DataType::Float4 => 16,
            DataType::Matrix4 => 64,
        }
    }

    /// Protocol code.
    pub const fn code(self) -> u32 {
        match self {
            DataType::Unknown => 0,
            DataType::Float1 => 1,
            DataType::Float2 => 2,
            DataType::Float3 => 3,
            DataType::Float4 => 4,
            DataType::Matrix4 => 5,
            DataType::Int => 6,
            DataType::Bool => 7,
            DataType::Sampler => 8,
        }
    }
}

impl From<NativeParamType> for DataType {
    fn from(value: NativeParamType) -> Self {
        match value {
            NativeParamType::Float1 => DataType::Float1,
            NativeParamType::Float2 => DataType::Float2,
            NativeParamType::Float3 => DataType::Float3,
            NativeParamType::Float4 => DataType::Float4,
            NativeParamType::Float4x4 => DataType::Matrix4,
            NativeParamType::Int => DataType::Int,
            NativeParamType::Bool => DataType::Bool,
            NativeParamType::Sampler => DataType::Sampler,
            NativeParamType::Other => DataType::Unknown,
        }
    }
}

/// One uniform of an effect, merged across both stages.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectParamInfo {
    pub name: String,
    pub data_type: DataType,
    pub vertex: Option<NativeParam>,
    pub fragment: Option<NativeParam>,
    /// Sampler bound to this parameter.  Only meaningful for [`DataType::Sampler`].
    pub sampler: ResourceId,
}

#[derive(Debug)]
pub struct Effect {
    vertex_program: NativeProgram,
    fragment_program: NativeProgram,
    params: Vec<EffectParamInfo>,
    serial: u64,
}

impl Effect {
    /// Compiles, patches and loads both programs.
    ///
    /// Nothing native survives a failure.  `serial` distinguishes this effect
    /// from any other effect later created under the same id.
    pub fn create<D: Device + ?Sized>(
        device: &mut D,
        data: &EffectData<'_>,
        config: &GapiConfig,
        serial: u64,
    ) -> Result<Self, Error> {
        let compiled = Self::compile(device, ShaderStage::Vertex, data.source, data.vertex_entry)?;
        let rewritten = rewrite::rewrite_vertex_program(&compiled, config.clip_space, config.helper_env_index)
            .inspect_err(|e| {
                logwise::warn_sync!(
                    "compiled vertex program can't be rewritten: {err}",
                    err = logwise::privacy::LogIt(e)
                );
            })?;
        let vertex_program = Self::load(device, ShaderStage::Vertex, &rewritten)?;

        let fragment = Self::compile(device, ShaderStage::Fragment, data.source, data.fragment_entry)
            .and_then(|assembly| Self::load(device, ShaderStage::Fragment, &assembly));
        let fragment_program = match fragment {
            Ok(program) => program,
            Err(e) => {
                device.delete_program(vertex_program);
                return Err(e);
            }
        };

        let params = match Self::collect_params(device, vertex_program, fragment_program) {
            Ok(params) => params,
            Err(e) => {
                device.delete_program(vertex_program);
                device.delete_program(fragment_program);
                return Err(e);
            }
        };
        logwise::info_sync!(
            "created effect with entry points {vertex}/{fragment} and {count} parameters",
            vertex = logwise::privacy::LogIt(&data.vertex_entry),
            fragment = logwise::privacy::LogIt(&data.fragment_entry),
            count = params.len()
        );
        Ok(Effect {
            vertex_program,
            fragment_program,
            params,
            serial,
        })
    }

    fn compile<D: Device + ?Sized>(
        device: &mut D,
        stage: ShaderStage,
        source: &str,
        entry_point: &str,
    ) -> Result<String, Error> {
        device.compile_program(stage, source, entry_point).map_err(|e| {
            logwise::warn_sync!(
                "{stage} entry point {entry} failed to compile: {err}",
                stage = logwise::privacy::LogIt(&stage),
                entry = logwise::privacy::LogIt(&entry_point),
                err = logwise::privacy::LogIt(&e)
            );
            Error::Compile { stage }
        })
    }

    /// Loads assembly, reading the error flag to find out whether it worked.
    fn load<D: Device + ?Sized>(device: &mut D, stage: ShaderStage, assembly: &str) -> Result<NativeProgram, Error> {
        // a stale flag would be blamed on this program
        let _ = device.take_program_error();
        let program = device.load_program(stage, assembly);
        match device.take_program_error() {
            None => Ok(program),
            Some(err) => {
                logwise::warn_sync!(
                    "{stage} program failed to load at byte {position}: {message}",
                    stage = logwise::privacy::LogIt(&stage),
                    position = err.position,
                    message = logwise::privacy::LogIt(&err.message)
                );
                device.delete_program(program);
                Err(Error::ProgramLoad {
                    stage,
                    position: err.position,
                    message: err.message,
                })
            }
        }
    }

    fn collect_params<D: Device + ?Sized>(
        device: &D,
        vertex_program: NativeProgram,
        fragment_program: NativeProgram,
    ) -> Result<Vec<EffectParamInfo>, Error> {
        let mut params: Vec<EffectParamInfo> = Vec::new();
        for (stage, program) in [
            (ShaderStage::Vertex, vertex_program),
            (ShaderStage::Fragment, fragment_program),
        ] {
            for info in device.program_parameters(program) {
                if info.variability != Variability::Uniform || info.direction != Direction::In {
                    continue;
                }
                let entry = match params.iter().position(|p| p.name == info.name) {
                    Some(index) => &mut params[index],
                    None => {
                        params.push(EffectParamInfo {
                            name: info.name.clone(),
                            data_type: info.ty.into(),
                            vertex: None,
                            fragment: None,
                            sampler: INVALID_RESOURCE,
                        });
                        let last = params.len() - 1;
                        &mut params[last]
                    }
                };
                if entry.data_type != DataType::from(info.ty) {
                    logwise::warn_sync!(
                        "parameter {name} has different types in each stage",
                        name = logwise::privacy::LogIt(&info.name)
                    );
                    return Err(Error::ParamTypeMismatch {
                        name: info.name.clone(),
                    });
                }
                match stage {
                    ShaderStage::Vertex => entry.vertex = Some(info.handle),
                    ShaderStage::Fragment => entry.fragment = Some(info.handle),
                }
            }
        }
        Ok(params)
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Number of distinct uniform parameters across both stages.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn param(&self, index: usize) -> Option<&EffectParamInfo> {
        self.params.get(index)
    }

    pub(crate) fn param_mut(&mut self, index: usize) -> Option<&mut EffectParamInfo> {
        self.params.get_mut(index)
    }

    pub fn find_param(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    pub fn vertex_program(&self) -> NativeProgram {
        self.vertex_program
    }

    pub fn fragment_program(&self) -> NativeProgram {
        self.fragment_program
    }

    /// Binds both programs and their textures.
    ///
    /// Applying a sampler rebinds the current texture, so every sampler is applied
    /// first and the fragment texture parameters are enabled or disabled afterwards.
    pub fn begin<D: Device + ?Sized>(
        &self,
        device: &mut D,
        samplers: &mut ResourceMap<Sampler>,
        textures: &ResourceMap<Texture>,
    ) {
        device.bind_program(ShaderStage::Vertex, Some(self.vertex_program));
        device.bind_program(ShaderStage::Fragment, Some(self.fragment_program));

        let sampler_params = || self.params.iter().filter(|p| p.data_type == DataType::Sampler);
        let resolved: Vec<Option<NativeTexture>> = sampler_params()
            .map(|param| {
                let sampler = samplers.get_mut(param.sampler)?;
                sampler
                    .apply_states(device, textures)
                    .inspect_err(|e| {
                        logwise::trace_sync!(
                            "sampler for {name} not applied: {err}",
                            name = logwise::privacy::LogIt(&param.name),
                            err = logwise::privacy::LogIt(e)
                        );
                    })
                    .ok()
            })
            .collect();

        for (param, texture) in sampler_params().zip(resolved) {
            let Some(handle) = param.fragment else {
                continue;
            };
            match texture {
                Some(texture) => {
                    device.set_texture_parameter(handle, texture);
                    device.enable_texture_parameter(handle);
                }
                None => device.disable_texture_parameter(handle),
            }
        }
    }

    /// Releases the texture units claimed by [`begin`](Self::begin).
    pub fn end<D: Device + ?Sized>(&self, device: &mut D) {
        for param in self.params.iter().filter(|p| p.data_type == DataType::Sampler) {
            if let Some(handle) = param.fragment {
                device.disable_texture_parameter(handle);
            }
        }
    }
}

impl Resource for Effect {
    const KIND: ResourceKind = ResourceKind::Effect;
    fn release<D: Device + ?Sized>(self, device: &mut D) {
        device.delete_program(self.vertex_program);
        device.delete_program(self.fragment_program);
    }
}
