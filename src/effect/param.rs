// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Effect parameters as stream resources.
//!
//! An [`EffectParam`] names one entry of an [`Effect`]'s parameter list.  It does
//! not keep the effect alive.  Each effect carries a serial number assigned at
//! creation, so a param whose effect was destroyed, or destroyed and replaced under
//! the same id, no longer resolves.

use super::{DataType, Effect};
use crate::device::{Device, ParamValue};
use crate::error::Error;
use crate::resource::{Resource, ResourceId, ResourceKind, ResourceMap};

/// What a successful [`EffectParam::set_data`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamUpdate {
    /// A value was pushed to the native programs.
    Value,
    /// A sampler binding was recorded on the effect.  Takes effect on the
    /// effect's next `begin`.
    SamplerBinding { effect: ResourceId },
}

#[derive(Debug)]
pub struct EffectParam {
    effect_id: ResourceId,
    effect_serial: u64,
    index: usize,
    data_type: DataType,
}

impl EffectParam {
    /// Looks up `name` on `effect`.
    pub fn by_name(effect_id: ResourceId, effect: &Effect, name: &str) -> Result<Self, Error> {
        let index = effect
            .find_param(name)
            .ok_or(Error::InvalidArgument("effect has no parameter with that name"))?;
        Self::by_index(effect_id, effect, index)
    }

    pub fn by_index(effect_id: ResourceId, effect: &Effect, index: usize) -> Result<Self, Error> {
        let info = effect
            .param(index)
            .ok_or(Error::InvalidArgument("parameter index out of range"))?;
        Ok(EffectParam {
            effect_id,
            effect_serial: effect.serial(),
            index,
            data_type: info.data_type,
        })
    }

    pub fn effect_id(&self) -> ResourceId {
        self.effect_id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    fn effect<'a>(&self, effects: &'a ResourceMap<Effect>) -> Result<&'a Effect, Error> {
        effects
            .get(self.effect_id)
            .filter(|e| e.serial() == self.effect_serial)
            .ok_or(Error::unknown(ResourceKind::Effect, self.effect_id))
    }

    fn effect_mut<'a>(&self, effects: &'a mut ResourceMap<Effect>) -> Result<&'a mut Effect, Error> {
        effects
            .get_mut(self.effect_id)
            .filter(|e| e.serial() == self.effect_serial)
            .ok_or(Error::unknown(ResourceKind::Effect, self.effect_id))
    }

    /// Sets the parameter from little-endian bytes.
    ///
    /// `data` must hold at least [`DataType::size`] bytes; any excess is ignored.
    pub fn set_data<D: Device + ?Sized>(
        &self,
        device: &mut D,
        effects: &mut ResourceMap<Effect>,
        data: &[u8],
    ) -> Result<ParamUpdate, Error> {
        let size = self.data_type.size();
        if self.data_type == DataType::Unknown {
            return Err(Error::InvalidArgument("parameter type can't be set"));
        }
        if data.len() < size {
            return Err(Error::InvalidArgument("not enough data for parameter type"));
        }
        let data = &data[..size];
        let effect = self.effect_mut(effects)?;
        let info = effect
            .param_mut(self.index)
            .ok_or(Error::InvalidArgument("parameter index out of range"))?;

        let value = match self.data_type {
            DataType::Sampler => {
                info.sampler = ResourceId(read_u32(data));
                return Ok(ParamUpdate::SamplerBinding {
                    effect: self.effect_id,
                });
            }
            DataType::Int => StoredValue::Int(read_u32(data) as i32),
            DataType::Bool => StoredValue::Bool(read_u32(data) != 0),
            _ => StoredValue::Float(bytemuck::pod_collect_to_vec::<u8, f32>(data)),
        };
        for handle in [info.vertex, info.fragment].into_iter().flatten() {
            device.set_program_parameter(handle, value.as_param());
        }
        Ok(ParamUpdate::Value)
    }

    /// Describes the parameter for `GetParamDesc`.
    pub fn desc(&self, effects: &ResourceMap<Effect>) -> Result<ParamDesc, Error> {
        let effect = self.effect(effects)?;
        let info = effect
            .param(self.index)
            .ok_or(Error::InvalidArgument("parameter index out of range"))?;
        Ok(ParamDesc {
            name: info.name.clone(),
            data_type: info.data_type,
        })
    }
}

impl Resource for EffectParam {
    const KIND: ResourceKind = ResourceKind::EffectParam;
    fn release<D: Device + ?Sized>(self, _device: &mut D) {}
}

enum StoredValue {
    Float(Vec<f32>),
    Int(i32),
    Bool(bool),
}

impl StoredValue {
    fn as_param(&self) -> ParamValue<'_> {
        match self {
            StoredValue::Float(values) => ParamValue::Float(values),
            StoredValue::Int(value) => ParamValue::Int(*value),
            StoredValue::Bool(value) => ParamValue::Bool(*value),
        }
    }
}

fn read_u32(data: &[u8]) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[..4]);
    u32::from_le_bytes(bytes)
}

/// Parameter description returned by `GetParamDesc`.
///
/// Serialized as five little-endian `u32`s followed by the name:
///
/// ```text
/// size | data_type | data_size | name_offset | name_size | name bytes + NUL
/// ```
///
/// `size` is the full length including the name.  A buffer too small for the name
/// still receives the header so the caller can learn the size it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDesc {
    pub name: String,
    pub data_type: DataType,
}

impl ParamDesc {
    pub const HEADER_SIZE: usize = 20;

    /// Bytes including the NUL-terminated name.
    pub fn total_size(&self) -> usize {
        Self::HEADER_SIZE + self.name.len() + 1
    }

    /// Writes the description into `out` and returns the bytes written.
    pub fn write_to(&self, out: &mut [u8]) -> Result<usize, Error> {
        if out.len() < Self::HEADER_SIZE {
            return Err(Error::InvalidArgument("buffer smaller than parameter description header"));
        }
        let name_size = self.name.len() + 1;
        let fits = out.len() >= self.total_size();
        let header = [
            self.total_size() as u32,
            self.data_type.code(),
            self.data_type.size() as u32,
            if fits { Self::HEADER_SIZE as u32 } else { 0 },
            if fits { name_size as u32 } else { 0 },
        ];
        for (chunk, value) in out.chunks_exact_mut(4).zip(header) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        if !fits {
            return Ok(Self::HEADER_SIZE);
        }
        let name = &mut out[Self::HEADER_SIZE..self.total_size()];
        name[..self.name.len()].copy_from_slice(self.name.as_bytes());
        name[self.name.len()] = 0;
        Ok(self.total_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn desc() -> ParamDesc {
        ParamDesc {
            name: "tint".to_string(),
            data_type: DataType::Float4,
        }
    }

    #[test]
    fn writes_header_and_name() {
        let mut out = [0xFFu8; 32];
        assert_eq!(desc().write_to(&mut out).unwrap(), 25);
        assert_eq!(&out[0..4], &25u32.to_le_bytes());
        assert_eq!(&out[4..8], &4u32.to_le_bytes());
        assert_eq!(&out[8..12], &16u32.to_le_bytes());
        assert_eq!(&out[12..16], &20u32.to_le_bytes());
        assert_eq!(&out[16..20], &5u32.to_le_bytes());
        assert_eq!(&out[20..25], b"tint\0");
        assert_eq!(out[25], 0xFF);
    }

    #[test]
    fn short_buffer_gets_header_only() {
        let mut out = [0u8; 22];
        assert_eq!(desc().write_to(&mut out).unwrap(), ParamDesc::HEADER_SIZE);
        assert_eq!(&out[0..4], &25u32.to_le_bytes());
        assert_eq!(&out[12..20], &[0; 8]);
    }

    #[test]
    fn buffer_smaller_than_header_fails() {
        let mut out = [0u8; 19];
        assert!(desc().write_to(&mut out).is_err());
    }
}
