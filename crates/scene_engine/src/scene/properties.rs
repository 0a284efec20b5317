//! Entity property bits
//!
//! Every entity carries an eight-bit [`Properties`] set. The bit positions are
//! a fixed contract shared with inspection tooling:
//!
//! | bit | property            | default |
//! |-----|---------------------|---------|
//! | 0   | `Dead`              | off     |
//! | 1   | `UpdateEnabled`     | on      |
//! | 2   | `RenderEnabled`     | on      |
//! | 3   | `Initialized`       | off     |
//! | 4   | `Dirty`             | on      |
//! | 5   | `InheritTransform`  | on      |
//! | 6   | `StretchX`          | off     |
//! | 7   | `StretchY`          | off     |

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::foundation::bits::Bits8;

/// Property set stored on every entity
pub type Properties = Bits8;

/// Named bit positions in [`Properties`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Property {
    /// Entity asked to be removed; the parent sweeps it on its next update
    Dead = 0,
    /// `update` runs hooks, actions and children
    UpdateEnabled = 1,
    /// `render` runs the render hook and children
    RenderEnabled = 2,
    /// Set by `init`, cleared when the entity is re-parented or destroyed
    Initialized = 3,
    /// Local transform changed since the world matrix was last computed
    Dirty = 4,
    /// World matrix is composed with the parent's
    InheritTransform = 5,
    /// Stretch horizontally to the render target
    StretchX = 6,
    /// Stretch vertically to the render target
    StretchY = 7,
}

impl Property {
    /// Every property in bit order
    pub const ALL: [Property; 8] = [
        Property::Dead,
        Property::UpdateEnabled,
        Property::RenderEnabled,
        Property::Initialized,
        Property::Dirty,
        Property::InheritTransform,
        Property::StretchX,
        Property::StretchY,
    ];

    /// Bit position of this property
    pub const fn position(self) -> usize {
        self as usize
    }

    /// Single-bit mask of this property
    pub const fn mask(self) -> u8 {
        1 << self as u8
    }
}

bitflags! {
    /// Mask view of [`Properties`], used for defaults and serialization
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct EntityFlags: u8 {
        /// See [`Property::Dead`]
        const DEAD = Property::Dead.mask();
        /// See [`Property::UpdateEnabled`]
        const UPDATE_ENABLED = Property::UpdateEnabled.mask();
        /// See [`Property::RenderEnabled`]
        const RENDER_ENABLED = Property::RenderEnabled.mask();
        /// See [`Property::Initialized`]
        const INITIALIZED = Property::Initialized.mask();
        /// See [`Property::Dirty`]
        const DIRTY = Property::Dirty.mask();
        /// See [`Property::InheritTransform`]
        const INHERIT_TRANSFORM = Property::InheritTransform.mask();
        /// See [`Property::StretchX`]
        const STRETCH_X = Property::StretchX.mask();
        /// See [`Property::StretchY`]
        const STRETCH_Y = Property::StretchY.mask();

        /// Property set of a freshly spawned entity
        const DEFAULT = Self::UPDATE_ENABLED.bits()
            | Self::RENDER_ENABLED.bits()
            | Self::DIRTY.bits()
            | Self::INHERIT_TRANSFORM.bits();
    }
}

impl From<Property> for EntityFlags {
    fn from(property: Property) -> Self {
        EntityFlags::from_bits_retain(property.mask())
    }
}

impl From<EntityFlags> for Properties {
    fn from(flags: EntityFlags) -> Self {
        Properties::from_bits(flags.bits())
    }
}

impl From<Properties> for EntityFlags {
    fn from(properties: Properties) -> Self {
        EntityFlags::from_bits_retain(properties.bits())
    }
}

/// Property set of a freshly spawned entity
pub fn default_properties() -> Properties {
    EntityFlags::DEFAULT.into()
}

/// Named accessors over [`Properties`]
pub trait PropertiesExt {
    /// Read a named property
    fn has(&self, property: Property) -> bool;
    /// Write a named property
    fn put(&mut self, property: Property, value: bool);
}

impl PropertiesExt for Properties {
    fn has(&self, property: Property) -> bool {
        self.get(property.position())
    }

    fn put(&mut self, property: Property, value: bool) {
        self.set(property.position(), value);
    }
}
