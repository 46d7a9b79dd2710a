//! Material property model
//!
//! A material is a map from a closed set of named slots to an optional typed
//! value. Slot names follow the host engine's standard shader.

use std::collections::BTreeMap;
use std::path::Path;

use rawmodel_core::Color;
use serde::{Deserialize, Serialize};

/// Material properties the exporter knows how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MaterialSlot {
    /// Blend mode; `1.0` means alpha cutout
    RenderingMode,
    /// Albedo texture
    MainTexture,
    /// Flat albedo color
    Color,
    /// Tangent-space normal map
    NormalMap,
    /// Metallic in R, smoothness in A
    MetallicGlossMap,
    Metallic,
    Glossiness,
}

impl MaterialSlot {
    pub const ALL: [MaterialSlot; 7] = [
        MaterialSlot::RenderingMode,
        MaterialSlot::MainTexture,
        MaterialSlot::Color,
        MaterialSlot::NormalMap,
        MaterialSlot::MetallicGlossMap,
        MaterialSlot::Metallic,
        MaterialSlot::Glossiness,
    ];

    /// Shader property name
    pub fn property_name(&self) -> &'static str {
        match self {
            MaterialSlot::RenderingMode => "_Mode",
            MaterialSlot::MainTexture => "_MainTex",
            MaterialSlot::Color => "_Color",
            MaterialSlot::NormalMap => "_BumpMap",
            MaterialSlot::MetallicGlossMap => "_MetallicGlossMap",
            MaterialSlot::Metallic => "_Metallic",
            MaterialSlot::Glossiness => "_Glossiness",
        }
    }

    pub fn from_property_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.property_name() == name)
    }
}

impl std::fmt::Display for MaterialSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.property_name())
    }
}

/// Reference to a texture asset, identified by its path relative to the
/// host's asset root
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextureRef {
    path: String,
}

impl TextureRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Asset path as written to the manifest
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.path)
    }
}

impl std::fmt::Display for TextureRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

/// Value stored in a material slot
///
/// A texture slot may exist without a bound texture (`Texture(None)`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Float(f32),
    Color(Color),
    Texture(Option<TextureRef>),
}

/// A material as a capability map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub name: String,
    properties: BTreeMap<MaterialSlot, PropertyValue>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, slot: MaterialSlot, value: PropertyValue) -> Self {
        self.set(slot, value);
        self
    }

    pub fn set(&mut self, slot: MaterialSlot, value: PropertyValue) {
        self.properties.insert(slot, value);
    }

    /// Whether the material exposes the slot at all
    pub fn has(&self, slot: MaterialSlot) -> bool {
        self.properties.contains_key(&slot)
    }

    pub fn float(&self, slot: MaterialSlot) -> Option<f32> {
        match self.properties.get(&slot) {
            Some(PropertyValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn color(&self, slot: MaterialSlot) -> Option<Color> {
        match self.properties.get(&slot) {
            Some(PropertyValue::Color(c)) => Some(*c),
            _ => None,
        }
    }

    /// The bound texture, if the slot exists and has one
    pub fn texture(&self, slot: MaterialSlot) -> Option<&TextureRef> {
        match self.properties.get(&slot) {
            Some(PropertyValue::Texture(Some(t))) => Some(t),
            _ => None,
        }
    }
}
