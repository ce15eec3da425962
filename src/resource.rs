// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Caller-assigned resource ids and the tables that own resources by id.
//!
//! Every GPU object the engine manages lives in exactly one [`ResourceMap`],
//! keyed by a [`ResourceId`] chosen by the command stream.  The stream picks
//! the id so that a single command can create an object and later commands
//! can refer to it without a round-trip back to the producer.
//!
//! Maps do not enforce referential integrity between kinds.  A sampler that
//! names a texture keeps doing so after the texture is destroyed; the engine
//! is responsible for dirtying state that may observe the missing entry.

use crate::device::Device;
use std::collections::HashMap;
use std::fmt::{Debug, Display};

/// Opaque, caller-assigned handle identifying one resource instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u32);

/// Reserved id that never names a resource.
pub const INVALID_RESOURCE: ResourceId = ResourceId(u32::MAX);

impl ResourceId {
    pub const fn is_valid(self) -> bool {
        self.0 != INVALID_RESOURCE.0
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            write!(f, "#invalid")
        }
    }
}

impl From<u32> for ResourceId {
    fn from(value: u32) -> Self {
        ResourceId(value)
    }
}

/// Names each table, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    VertexBuffer,
    IndexBuffer,
    VertexStruct,
    Texture,
    Sampler,
    Effect,
    EffectParam,
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResourceKind::VertexBuffer => "vertex buffer",
            ResourceKind::IndexBuffer => "index buffer",
            ResourceKind::VertexStruct => "vertex struct",
            ResourceKind::Texture => "texture",
            ResourceKind::Sampler => "sampler",
            ResourceKind::Effect => "effect",
            ResourceKind::EffectParam => "effect param",
        };
        f.write_str(s)
    }
}

/// An object owned by a [`ResourceMap`].
///
/// Native storage can only be freed through the device that created it, so
/// resources are released explicitly instead of through `Drop`.
pub trait Resource: Debug {
    const KIND: ResourceKind;

    /// Frees any native objects backing this resource.
    fn release<D: Device + ?Sized>(self, device: &mut D);
}

/// Id to object table with create/get/destroy/destroy-all semantics.
#[derive(Debug)]
pub struct ResourceMap<T> {
    entries: HashMap<ResourceId, T>,
}

impl<T> Default for ResourceMap<T> {
    fn default() -> Self {
        ResourceMap {
            entries: HashMap::new(),
        }
    }
}

impl<T: Resource> ResourceMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `object` at `id`, releasing whatever was there before.
    pub fn assign<D: Device + ?Sized>(&mut self, id: ResourceId, object: T, device: &mut D) {
        if let Some(previous) = self.entries.insert(id, object) {
            logwise::debuginternal_sync!(
                "replacing {kind} {id}",
                kind = logwise::privacy::LogIt(&T::KIND),
                id = id.0
            );
            previous.release(device);
        }
    }

    pub fn get(&self, id: ResourceId) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: ResourceId) -> Option<&mut T> {
        self.entries.get_mut(&id)
    }

    pub fn contains(&self, id: ResourceId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Removes and releases the entry at `id`.  Returns whether one existed.
    pub fn destroy<D: Device + ?Sized>(&mut self, id: ResourceId, device: &mut D) -> bool {
        match self.entries.remove(&id) {
            Some(object) => {
                object.release(device);
                true
            }
            None => false,
        }
    }

    /// Releases every entry.  Used at shutdown.
    pub fn destroy_all<D: Device + ?Sized>(&mut self, device: &mut D) {
        for (_, object) in self.entries.drain() {
            object.release(device);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, &T)> {
        self.entries.iter().map(|(id, object)| (*id, object))
    }
}
