// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::device::{Device, NativeTexture, SamplerParameters};
use crate::error::Error;
use crate::render_state::Rgba;
use crate::resource::{INVALID_RESOURCE, Resource, ResourceId, ResourceKind, ResourceMap};
use crate::texture::Texture;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Wrap,
    MirrorRepeat,
    ClampToEdge,
    ClampToBorder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilteringMode {
    /// Only valid as a mip filter, where it disables mipmapping.
    None,
    Point,
    Linear,
}

/// Filtering and addressing state for one texture.
///
/// The sampler refers to its texture by id and does not own it.  If the texture
/// is destroyed the sampler keeps the id and simply fails to apply.
#[derive(Debug)]
pub struct Sampler {
    address: [AddressingMode; 3],
    mag_filter: FilteringMode,
    min_filter: FilteringMode,
    mip_filter: FilteringMode,
    max_anisotropy: u32,
    border_color: Rgba,
    texture_id: ResourceId,
    /// Native texture resolved by the last successful apply.
    native_texture: Option<NativeTexture>,
}

impl Default for Sampler {
    fn default() -> Self {
        Sampler {
            address: [AddressingMode::Wrap; 3],
            mag_filter: FilteringMode::Linear,
            min_filter: FilteringMode::Linear,
            mip_filter: FilteringMode::Point,
            max_anisotropy: 1,
            border_color: Rgba::default(),
            texture_id: INVALID_RESOURCE,
            native_texture: None,
        }
    }
}

impl Sampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_states(
        &mut self,
        address: [AddressingMode; 3],
        mag_filter: FilteringMode,
        min_filter: FilteringMode,
        mip_filter: FilteringMode,
        max_anisotropy: u32,
    ) -> Result<(), Error> {
        if mag_filter == FilteringMode::None || min_filter == FilteringMode::None {
            return Err(Error::InvalidArgument("min and mag filters can't be none"));
        }
        if max_anisotropy == 0 {
            return Err(Error::InvalidArgument("max anisotropy must be at least 1"));
        }
        self.address = address;
        self.mag_filter = mag_filter;
        self.min_filter = min_filter;
        self.mip_filter = mip_filter;
        self.max_anisotropy = max_anisotropy;
        Ok(())
    }

    pub fn set_border_color(&mut self, color: Rgba) {
        self.border_color = color;
    }

    pub fn set_texture(&mut self, texture_id: ResourceId) {
        self.texture_id = texture_id;
    }

    pub fn texture(&self) -> ResourceId {
        self.texture_id
    }

    /// Native texture bound by the last successful [`apply_states`](Self::apply_states).
    pub fn native_texture(&self) -> Option<NativeTexture> {
        self.native_texture
    }

    fn parameters(&self) -> SamplerParameters {
        SamplerParameters {
            address: self.address,
            mag_filter: self.mag_filter,
            min_filter: self.min_filter,
            mip_filter: self.mip_filter,
            max_anisotropy: self.max_anisotropy,
            border_color: self.border_color,
        }
    }

    /// Resolves the texture and programs its sampling state.
    ///
    /// Leaves the resolved texture bound to its target.  When the texture is
    /// missing, the cached native handle is cleared and nothing is bound.
    pub fn apply_states<D: Device + ?Sized>(
        &mut self,
        device: &mut D,
        textures: &ResourceMap<Texture>,
    ) -> Result<NativeTexture, Error> {
        let Some(texture) = textures.get(self.texture_id) else {
            self.native_texture = None;
            return Err(Error::unknown(ResourceKind::Texture, self.texture_id));
        };
        let target = texture.target();
        device.bind_texture(target, Some(texture.native()));
        device.set_sampler_parameters(target, &self.parameters());
        self.native_texture = Some(texture.native());
        Ok(texture.native())
    }
}

impl Resource for Sampler {
    const KIND: ResourceKind = ResourceKind::Sampler;
    fn release<D: Device + ?Sized>(self, _device: &mut D) {}
}
