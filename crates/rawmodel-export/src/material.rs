//! Material descriptors and the property resolver
//!
//! Each manifest channel is either a constant or a texture reference. The
//! resolver fills every channel by probing material slots in a fixed order
//! and falling through to the next tier when a slot is absent.

use std::collections::BTreeSet;

use rawmodel_scene::{Material, MaterialSlot, TextureRef};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ROUGHNESS: f32 = 0.4;
pub const DEFAULT_METALLIC: f32 = 0.001;
pub const DEFAULT_DIFFUSE: [f32; 3] = [1.0, 1.0, 1.0];

/// Normal map sentinel; consumers treat any origin containing `*` as none
pub const NORMALMAP_DEFAULT: &str = "*default*";

/// `_Mode` value of the cutout blend mode
const ALPHA_TEST_MODE: f32 = 1.0;

/// Texture channel selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    R,
    G,
    B,
    A,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiffuseOrigin {
    Texture(String),
    Color([f32; 3]),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NormalmapOrigin {
    Texture(String),
    Default,
}

impl From<String> for NormalmapOrigin {
    fn from(s: String) -> Self {
        if s.is_empty() || s.contains('*') {
            NormalmapOrigin::Default
        } else {
            NormalmapOrigin::Texture(s)
        }
    }
}

impl From<NormalmapOrigin> for String {
    fn from(origin: NormalmapOrigin) -> Self {
        match origin {
            NormalmapOrigin::Texture(path) => path,
            NormalmapOrigin::Default => NORMALMAP_DEFAULT.to_string(),
        }
    }
}

/// Roughness, either constant or read from a texture channel
///
/// `inverted` means the channel stores glossiness (`roughness = 1 - value`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoughnessOrigin {
    Constant(f32),
    Texture {
        filename: String,
        channel: Channel,
        #[serde(default)]
        inverted: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetallicOrigin {
    Constant(f32),
    Texture { filename: String, channel: Channel },
}

/// Per-submesh material description written to the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDescriptor {
    pub alpha_testing: bool,
    pub diffuse_origin: DiffuseOrigin,
    pub normalmap_origin: NormalmapOrigin,
    pub roughness_origin: RoughnessOrigin,
    pub metallic_origin: MetallicOrigin,
}

impl Default for MaterialDescriptor {
    /// Descriptor for submeshes without a bound material
    fn default() -> Self {
        Self {
            alpha_testing: false,
            diffuse_origin: DiffuseOrigin::Color(DEFAULT_DIFFUSE),
            normalmap_origin: NormalmapOrigin::Default,
            roughness_origin: RoughnessOrigin::Constant(DEFAULT_ROUGHNESS),
            metallic_origin: MetallicOrigin::Constant(DEFAULT_METALLIC),
        }
    }
}

/// Deduplicated set of textures referenced by an export, in path order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferencedTextures {
    textures: BTreeSet<TextureRef>,
}

impl ReferencedTextures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the texture was not yet recorded
    pub fn insert(&mut self, texture: TextureRef) -> bool {
        self.textures.insert(texture)
    }

    pub fn contains(&self, texture: &TextureRef) -> bool {
        self.textures.contains(texture)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextureRef> {
        self.textures.iter()
    }
}

impl<'a> IntoIterator for &'a ReferencedTextures {
    type Item = &'a TextureRef;
    type IntoIter = std::collections::btree_set::Iter<'a, TextureRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.textures.iter()
    }
}

/// Turns materials into descriptors and records every texture it references
#[derive(Debug, Default)]
pub struct MaterialResolver {
    textures: ReferencedTextures,
}

impl MaterialResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, material: &Material) -> MaterialDescriptor {
        let alpha_testing = material.float(MaterialSlot::RenderingMode) == Some(ALPHA_TEST_MODE);

        let diffuse_origin = if let Some(texture) = material.texture(MaterialSlot::MainTexture) {
            DiffuseOrigin::Texture(self.record(texture))
        } else if let Some(color) = material.color(MaterialSlot::Color) {
            DiffuseOrigin::Color(color.to_rgb())
        } else {
            DiffuseOrigin::Color(DEFAULT_DIFFUSE)
        };

        let normalmap_origin = match material.texture(MaterialSlot::NormalMap) {
            Some(texture) => NormalmapOrigin::Texture(self.record(texture)),
            None => NormalmapOrigin::Default,
        };

        let (roughness_origin, metallic_origin) = self.resolve_metallic_roughness(material);

        MaterialDescriptor {
            alpha_testing,
            diffuse_origin,
            normalmap_origin,
            roughness_origin,
            metallic_origin,
        }
    }

    fn resolve_metallic_roughness(&mut self, material: &Material) -> (RoughnessOrigin, MetallicOrigin) {
        if let Some(texture) = material.texture(MaterialSlot::MetallicGlossMap) {
            // metallic in R, smoothness in A
            let filename = self.record(texture);
            return (
                RoughnessOrigin::Texture {
                    filename: filename.clone(),
                    channel: Channel::A,
                    inverted: true,
                },
                MetallicOrigin::Texture {
                    filename,
                    channel: Channel::R,
                },
            );
        }

        match (
            material.float(MaterialSlot::Metallic),
            material.float(MaterialSlot::Glossiness),
        ) {
            (Some(metallic), Some(glossiness)) => (
                RoughnessOrigin::Constant(1.0 - glossiness),
                MetallicOrigin::Constant(metallic),
            ),
            _ => (
                RoughnessOrigin::Constant(DEFAULT_ROUGHNESS),
                MetallicOrigin::Constant(DEFAULT_METALLIC),
            ),
        }
    }

    fn record(&mut self, texture: &TextureRef) -> String {
        self.textures.insert(texture.clone());
        texture.path().to_string()
    }

    pub fn textures(&self) -> &ReferencedTextures {
        &self.textures
    }

    pub fn into_textures(self) -> ReferencedTextures {
        self.textures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rawmodel_core::Color;
    use rawmodel_scene::PropertyValue;
    use serde_json::json;

    fn texture(path: &str) -> PropertyValue {
        PropertyValue::Texture(Some(TextureRef::new(path)))
    }

    #[test]
    fn test_empty_material_matches_fallback() {
        let mut resolver = MaterialResolver::new();
        let descriptor = resolver.resolve(&Material::new("empty"));

        assert_eq!(descriptor, MaterialDescriptor::default());
        assert!(resolver.textures().is_empty());
    }

    #[test]
    fn test_alpha_testing_requires_cutout_mode() {
        let mut resolver = MaterialResolver::new();
        let cutout = Material::new("a").with(MaterialSlot::RenderingMode, PropertyValue::Float(1.0));
        let fade = Material::new("b").with(MaterialSlot::RenderingMode, PropertyValue::Float(2.0));

        assert!(resolver.resolve(&cutout).alpha_testing);
        assert!(!resolver.resolve(&fade).alpha_testing);
    }

    #[test]
    fn test_diffuse_tiers() {
        let mut resolver = MaterialResolver::new();

        let textured = Material::new("t")
            .with(MaterialSlot::MainTexture, texture("Assets/albedo.png"))
            .with(MaterialSlot::Color, PropertyValue::Color(Color::rgb(1.0, 0.0, 0.0)));
        assert_eq!(
            resolver.resolve(&textured).diffuse_origin,
            DiffuseOrigin::Texture("Assets/albedo.png".into())
        );

        // an unbound texture slot falls through to the color
        let unbound = Material::new("u")
            .with(MaterialSlot::MainTexture, PropertyValue::Texture(None))
            .with(MaterialSlot::Color, PropertyValue::Color(Color::rgb(0.0, 0.5, 0.0)));
        assert_eq!(resolver.resolve(&unbound).diffuse_origin, DiffuseOrigin::Color([0.0, 0.5, 0.0]));

        assert_eq!(
            resolver.resolve(&Material::new("none")).diffuse_origin,
            DiffuseOrigin::Color([1.0, 1.0, 1.0])
        );
    }

    #[test]
    fn test_metallic_gloss_map_uses_channels() {
        let mut resolver = MaterialResolver::new();
        let material = Material::new("m")
            .with(MaterialSlot::MetallicGlossMap, texture("Assets/mg.png"))
            .with(MaterialSlot::Metallic, PropertyValue::Float(0.9))
            .with(MaterialSlot::Glossiness, PropertyValue::Float(0.1));

        let descriptor = resolver.resolve(&material);
        assert_eq!(
            descriptor.roughness_origin,
            RoughnessOrigin::Texture { filename: "Assets/mg.png".into(), channel: Channel::A, inverted: true }
        );
        assert_eq!(
            descriptor.metallic_origin,
            MetallicOrigin::Texture { filename: "Assets/mg.png".into(), channel: Channel::R }
        );
        assert_eq!(resolver.textures().len(), 1);
    }

    #[test]
    fn test_scalar_metallic_needs_both_properties() {
        let mut resolver = MaterialResolver::new();
        let both = Material::new("b")
            .with(MaterialSlot::Metallic, PropertyValue::Float(0.5))
            .with(MaterialSlot::Glossiness, PropertyValue::Float(0.75));
        let only_metallic = Material::new("m").with(MaterialSlot::Metallic, PropertyValue::Float(0.5));

        let d = resolver.resolve(&both);
        assert_eq!(d.roughness_origin, RoughnessOrigin::Constant(0.25));
        assert_eq!(d.metallic_origin, MetallicOrigin::Constant(0.5));

        let d = resolver.resolve(&only_metallic);
        assert_eq!(d.roughness_origin, RoughnessOrigin::Constant(DEFAULT_ROUGHNESS));
        assert_eq!(d.metallic_origin, MetallicOrigin::Constant(DEFAULT_METALLIC));
    }

    #[test]
    fn test_textures_are_deduplicated() {
        let mut resolver = MaterialResolver::new();
        let material = Material::new("m")
            .with(MaterialSlot::MainTexture, texture("Assets/a.png"))
            .with(MaterialSlot::NormalMap, texture("Assets/n.png"));

        resolver.resolve(&material);
        resolver.resolve(&material);

        let paths: Vec<_> = resolver.textures().iter().map(|t| t.path().to_string()).collect();
        assert_eq!(paths, vec!["Assets/a.png", "Assets/n.png"]);
    }

    #[test]
    fn test_descriptor_json_shape() {
        let descriptor = MaterialDescriptor {
            roughness_origin: RoughnessOrigin::Texture {
                filename: "mg.png".into(),
                channel: Channel::A,
                inverted: true,
            },
            metallic_origin: MetallicOrigin::Constant(0.5),
            ..MaterialDescriptor::default()
        };

        assert_eq!(
            serde_json::to_value(&descriptor).unwrap(),
            json!({
                "alphaTesting": false,
                "diffuseOrigin": [1.0, 1.0, 1.0],
                "normalmapOrigin": "*default*",
                "roughnessOrigin": { "filename": "mg.png", "channel": "a", "inverted": true },
                "metallicOrigin": 0.5,
            })
        );
    }
}
