use crate::{
    bone::Bone,
    display::DisplayFrame,
    material::Material,
    morph::Morph,
    physics::{Joint, RigidBody},
    vertex::Vertex,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf16le,
    Utf8,
}

/// Byte width of the indices of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexWidth {
    Size1,
    Size2,
    Size4,
}

impl IndexWidth {
    pub fn bytes(self) -> usize {
        match self {
            IndexWidth::Size1 => 1,
            IndexWidth::Size2 => 2,
            IndexWidth::Size4 => 4,
        }
    }
}

/// Encoding settings from the file header, shared by every section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelConfig {
    pub text_encoding: TextEncoding,
    pub additional_uv_count: usize,
    pub vertex_index_width: IndexWidth,
    pub texture_index_width: IndexWidth,
    pub material_index_width: IndexWidth,
    pub bone_index_width: IndexWidth,
    pub morph_index_width: IndexWidth,
    pub rigid_body_index_width: IndexWidth,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    pub name_en: String,
    pub comment: String,
    pub comment_en: String,
}

/// Vertex indices of one triangle.
pub type Face = [u32; 3];

/// A decoded PMX model. Every table index stored in the model refers to one
/// of the vectors below.
#[derive(Debug, Clone)]
pub struct ModelAsset {
    pub config: ModelConfig,
    pub info: ModelInfo,
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
    /// Texture paths, relative to the model file.
    pub textures: Vec<String>,
    pub materials: Vec<Material>,
    pub bones: Vec<Bone>,
    pub morphs: Vec<Morph>,
    pub display_frames: Vec<DisplayFrame>,
    pub rigid_bodies: Vec<RigidBody>,
    pub joints: Vec<Joint>,
}

impl ModelAsset {
    /// Faces drawn with the material at `material`.
    pub fn triangles_of(&self, material: usize) -> Option<&[Face]> {
        let material = self.materials.get(material)?;
        self.faces.get(material.triangles())
    }

    pub fn texture_path(&self, index: usize) -> Option<&str> {
        self.textures.get(index).map(String::as_str)
    }

    pub fn bone_by_name(&self, name: &str) -> Option<(usize, &Bone)> {
        self.bones
            .iter()
            .enumerate()
            .find(|(_, bone)| bone.name == name)
    }

    pub fn morph_by_name(&self, name: &str) -> Option<(usize, &Morph)> {
        self.morphs
            .iter()
            .enumerate()
            .find(|(_, morph)| morph.name == name)
    }
}
