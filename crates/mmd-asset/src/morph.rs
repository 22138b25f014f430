use glam::{Quat, Vec3, Vec4};

/// Panel the morph is listed under in editors. Grouping only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphCategory {
    Face,
    LeftEye,
    RightEye,
    Mouth,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphType {
    Group,
    Vertex,
    Bone,
    Uv,
    AdditionalUv1,
    AdditionalUv2,
    AdditionalUv3,
    AdditionalUv4,
    Material,
    Flip,
    Impulse,
}

impl MorphType {
    /// UV channel affected by a UV morph: 0 for the base UV, 1 to 4 for the
    /// additional UV sets.
    pub fn uv_channel(self) -> Option<usize> {
        match self {
            MorphType::Uv => Some(0),
            MorphType::AdditionalUv1 => Some(1),
            MorphType::AdditionalUv2 => Some(2),
            MorphType::AdditionalUv3 => Some(3),
            MorphType::AdditionalUv4 => Some(4),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupOffset {
    pub morph: Option<usize>,
    pub rate: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexOffset {
    pub vertex: u32,
    pub translation: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneOffset {
    pub bone: Option<usize>,
    pub translation: Vec3,
    pub rotation: Quat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvOffset {
    pub vertex: u32,
    pub delta: Vec4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialTarget {
    All,
    Material(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialMorphMethod {
    Multiply,
    Add,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialOffset {
    pub target: MaterialTarget,
    pub method: MaterialMorphMethod,
    pub diffuse_color: Vec4,
    pub specular_color: Vec3,
    pub specular_power: f32,
    pub ambient_color: Vec3,
    pub edge_color: Vec4,
    pub edge_size: f32,
    pub texture_factor: Vec4,
    pub sphere_texture_factor: Vec4,
    pub toon_texture_factor: Vec4,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpulseOffset {
    pub rigid_body: Option<usize>,
    pub local: bool,
    pub velocity: Vec3,
    pub torque: Vec3,
}

/// Offset records of a morph. Group and flip morphs share the group record,
/// all UV morph types share the UV record.
#[derive(Debug, Clone, PartialEq)]
pub enum MorphOffsets {
    Group(Vec<GroupOffset>),
    Vertex(Vec<VertexOffset>),
    Bone(Vec<BoneOffset>),
    Uv(Vec<UvOffset>),
    Material(Vec<MaterialOffset>),
    Impulse(Vec<ImpulseOffset>),
}

impl MorphOffsets {
    pub fn len(&self) -> usize {
        match self {
            MorphOffsets::Group(offsets) => offsets.len(),
            MorphOffsets::Vertex(offsets) => offsets.len(),
            MorphOffsets::Bone(offsets) => offsets.len(),
            MorphOffsets::Uv(offsets) => offsets.len(),
            MorphOffsets::Material(offsets) => offsets.len(),
            MorphOffsets::Impulse(offsets) => offsets.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Morph {
    pub name: String,
    pub name_en: String,
    pub category: MorphCategory,
    pub morph_type: MorphType,
    pub offsets: MorphOffsets,
}
