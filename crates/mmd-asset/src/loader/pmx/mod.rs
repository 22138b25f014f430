use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    io::{self, Cursor, ErrorKind, Read, Seek},
};

use binrw::BinRead;
use format::{
    PmxBone, PmxDisplayFrame, PmxFile, PmxFormatError, PmxGlobals, PmxIndex, PmxIndexType,
    PmxJoint, PmxMaterial, PmxMorph, PmxMorphOffsetData, PmxRigidbody, PmxTextEncoding,
    PmxToonReference, PmxVertex, PmxWeightDeform,
};
use glam::{Quat, Vec2, Vec3, Vec4};
use log::{debug, trace, warn};

use crate::{
    archive::Archive,
    bone::{AppendTransform, Bone, BoneConnection, Ik, IkAngleLimit, IkLink, LocalAxes},
    display::{DisplayElement, DisplayFrame},
    material::{Material, SphereBlendMode, ToonReference},
    model::{Face, IndexWidth, ModelAsset, ModelConfig, ModelInfo, TextEncoding},
    morph::{
        BoneOffset, GroupOffset, ImpulseOffset, MaterialMorphMethod, MaterialOffset,
        MaterialTarget, Morph, MorphCategory, MorphOffsets, MorphType, UvOffset, VertexOffset,
    },
    physics::{Joint, RigidBody, RigidBodyMode, RigidBodyShape},
    vertex::{SkinWeight, Vertex},
};

use super::AssetLoadParams;

mod format;
#[cfg(test)]
mod testing;

#[derive(Debug)]
pub enum PmxError {
    /// The file does not start with `"PMX "`.
    MagicMismatch { pos: u64 },
    UnsupportedVersion(f32),
    /// Header or section layout values outside what PMX 2.0 allows.
    InvalidConfig { pos: u64, detail: String },
    TruncatedInput,
    InvalidLength { pos: u64, length: i64 },
    /// A tag or flag byte with no defined meaning.
    UnknownVariant { pos: u64, detail: String },
    UnsupportedFeature { pos: Option<u64>, feature: String },
    NoSurfaceLeft { expected: usize, actual: usize },
    Io(io::Error),
    Archive(Box<dyn Error + Send + Sync>),
    ModelNotFound(String),
    Format(binrw::Error),
}

impl Display for PmxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PmxError::MagicMismatch { pos } => write!(f, "Not a PMX file (at {:#x})", pos),
            PmxError::UnsupportedVersion(version) => {
                write!(f, "Unsupported PMX version: {}", version)
            }
            PmxError::InvalidConfig { pos, detail } => write!(f, "{} (at {:#x})", detail, pos),
            PmxError::TruncatedInput => write!(f, "Unexpected end of file"),
            PmxError::InvalidLength { pos, length } => {
                write!(f, "Invalid length {} (at {:#x})", length, pos)
            }
            PmxError::UnknownVariant { pos, detail } => write!(f, "{} (at {:#x})", detail, pos),
            PmxError::UnsupportedFeature {
                pos: Some(pos),
                feature,
            } => write!(f, "Unsupported feature: {} (at {:#x})", feature, pos),
            PmxError::UnsupportedFeature { pos: None, feature } => {
                write!(f, "Unsupported feature: {}", feature)
            }
            PmxError::NoSurfaceLeft { expected, actual } => write!(
                f,
                "Want to read {} surfaces for material, but only {} left",
                expected, actual
            ),
            PmxError::Io(io) => Display::fmt(io, f),
            PmxError::Archive(archive) => Display::fmt(archive, f),
            PmxError::ModelNotFound(file_name) => {
                write!(f, "File {} not found in bundle", file_name)
            }
            PmxError::Format(format) => Display::fmt(format, f),
        }
    }
}

impl Error for PmxError {}

impl From<io::Error> for PmxError {
    fn from(value: io::Error) -> Self {
        if value.kind() == ErrorKind::UnexpectedEof {
            PmxError::TruncatedInput
        } else {
            PmxError::Io(value)
        }
    }
}

impl PmxError {
    fn from_format(pos: u64, err: &PmxFormatError) -> Self {
        match err {
            PmxFormatError::UnsupportedVersion(version) => PmxError::UnsupportedVersion(*version),
            PmxFormatError::BadTextEncoding(_)
            | PmxFormatError::BadIndexSize(_)
            | PmxFormatError::BadAdditionalVec4Count(_)
            | PmxFormatError::BadSurfacesCount(_) => PmxError::InvalidConfig {
                pos,
                detail: err.to_string(),
            },
            PmxFormatError::BadTextLength(length) | PmxFormatError::BadCount(length) => {
                PmxError::InvalidLength {
                    pos,
                    length: i64::from(*length),
                }
            }
            PmxFormatError::BadTag { .. }
            | PmxFormatError::BadDrawingFlags(_)
            | PmxFormatError::BadBoolean(_) => PmxError::UnknownVariant {
                pos,
                detail: err.to_string(),
            },
            PmxFormatError::UnsupportedJoint(_) => PmxError::UnsupportedFeature {
                pos: Some(pos),
                feature: err.to_string(),
            },
        }
    }

    fn classify(err: &binrw::Error) -> Option<Self> {
        let root = err.root_cause();
        Some(match root {
            binrw::Error::BadMagic { pos, .. } => PmxError::MagicMismatch { pos: *pos },
            binrw::Error::Io(io) if io.kind() == ErrorKind::UnexpectedEof => {
                PmxError::TruncatedInput
            }
            binrw::Error::Io(io) => PmxError::Io(io::Error::new(io.kind(), io.to_string())),
            binrw::Error::NoVariantMatch { pos } => PmxError::UnknownVariant {
                pos: *pos,
                detail: String::from("Unknown enum tag"),
            },
            binrw::Error::Custom { pos, .. } => {
                PmxError::from_format(*pos, root.custom_err::<PmxFormatError>()?)
            }
            _ => return None,
        })
    }
}

impl From<binrw::Error> for PmxError {
    fn from(value: binrw::Error) -> Self {
        Self::classify(&value).unwrap_or(Self::Format(value))
    }
}

impl From<PmxTextEncoding> for TextEncoding {
    fn from(value: PmxTextEncoding) -> Self {
        match value {
            PmxTextEncoding::Utf16le => TextEncoding::Utf16le,
            PmxTextEncoding::Utf8 => TextEncoding::Utf8,
        }
    }
}

impl From<PmxIndexType> for IndexWidth {
    fn from(value: PmxIndexType) -> Self {
        match value {
            PmxIndexType::Byte => IndexWidth::Size1,
            PmxIndexType::Short => IndexWidth::Size2,
            PmxIndexType::Int => IndexWidth::Size4,
        }
    }
}

impl From<PmxGlobals> for ModelConfig {
    fn from(value: PmxGlobals) -> Self {
        Self {
            text_encoding: value.text_encoding.into(),
            additional_uv_count: usize::from(value.additional_vec4_count),
            vertex_index_width: value.vertex_index_type.into(),
            texture_index_width: value.texture_index_type.into(),
            material_index_width: value.material_index_type.into(),
            bone_index_width: value.bone_index_type.into(),
            morph_index_width: value.morph_index_type.into(),
            rigid_body_index_width: value.rigidbody_index_type.into(),
        }
    }
}

/// Resolves an index that must point inside a table of `len` entries.
fn resolve(index: PmxIndex, len: usize, kind: &str) -> Option<usize> {
    let resolved = index.get()?;
    if resolved < len {
        Some(resolved)
    } else {
        warn!(
            "{} index {} out of range ({} entries), treated as none",
            kind, resolved, len
        );
        None
    }
}

struct PmxLoader {
    file: PmxFile,
}

impl PmxLoader {
    fn new(file: PmxFile) -> Self {
        Self { file }
    }

    fn load_vertex(vertex: &PmxVertex) -> Vertex {
        let skin = match vertex.weight_deform {
            PmxWeightDeform::Bdef1 { bone_index } => SkinWeight::Bdef1 {
                bone: bone_index.get(),
            },
            PmxWeightDeform::Bdef2 {
                bone_index_1,
                bone_index_2,
                bone_weight_1,
            } => SkinWeight::Bdef2 {
                bones: [bone_index_1.get(), bone_index_2.get()],
                weight: bone_weight_1,
            },
            PmxWeightDeform::Bdef4 {
                bone_index,
                bone_weight,
            } => SkinWeight::Bdef4 {
                bones: bone_index.map(PmxIndex::get),
                weights: bone_weight,
            },
            PmxWeightDeform::Sdef {
                bone_index_1,
                bone_index_2,
                bone_weight_1,
                c,
                r0,
                r1,
            } => SkinWeight::Sdef {
                bones: [bone_index_1.get(), bone_index_2.get()],
                weight: bone_weight_1,
                c: c.into(),
                r0: r0.into(),
                r1: r1.into(),
            },
            PmxWeightDeform::Qdef {
                bone_index,
                bone_weight,
            } => SkinWeight::Qdef {
                bones: bone_index.map(PmxIndex::get),
                weights: bone_weight,
            },
        };
        Vertex {
            position: vertex.position.into(),
            normal: vertex.normal.into(),
            uv: Vec2::from(vertex.uv),
            additional_uv: vertex
                .additional_vec4
                .iter()
                .copied()
                .map(Vec4::from)
                .collect(),
            skin,
            edge_scale: vertex.edge_scale,
        }
    }

    fn load_faces(&self) -> Vec<Face> {
        self.file
            .surfaces
            .chunks_exact(3)
            .map(|face| [face[0].0, face[1].0, face[2].0])
            .collect()
    }

    fn load_material(&self, material: &PmxMaterial, surface_offset: usize) -> Material {
        trace!("Material {:?}", material.material_name_local.0);
        let textures = self.file.textures.len();
        let toon = match material.toon_reference {
            PmxToonReference::Texture { index } => resolve(index, textures, "Toon texture")
                .map_or(ToonReference::None, ToonReference::Texture),
            PmxToonReference::Internal { index } => ToonReference::from_shared_slot(index),
        };
        Material {
            name: material.material_name_local.0.clone(),
            name_en: material.material_name_universal.0.clone(),
            diffuse_color: material.diffuse_color.into(),
            specular_color: material.specular_color.into(),
            specular_power: material.specular_strength,
            ambient_color: material.ambient_color.into(),
            draw_flags: material.drawing_flags,
            edge_color: material.edge_color.into(),
            edge_size: material.edge_scale,
            texture: resolve(material.texture_index, textures, "Texture"),
            sphere_texture: resolve(material.environment_index, textures, "Sphere texture"),
            sphere_blend_mode: match material.environment_blend_mode {
                format::PmxEnvironmentBlendMode::Disabled => SphereBlendMode::Disabled,
                format::PmxEnvironmentBlendMode::Multiply => SphereBlendMode::Multiply,
                format::PmxEnvironmentBlendMode::Additive => SphereBlendMode::Additive,
                format::PmxEnvironmentBlendMode::AdditionalVec4 => SphereBlendMode::SubTexture,
            },
            toon,
            memo: material.meta_data.0.clone(),
            surface_offset,
            surface_count: material.surface_count as usize,
        }
    }

    /// Splits the shared index array between materials, in material order.
    fn load_materials(&self) -> Result<Vec<Material>, PmxError> {
        let mut surfaces_left = self.file.surfaces.len();
        let mut surface_offset = 0;
        let mut materials = Vec::with_capacity(self.file.materials.len());
        for material in &self.file.materials {
            let surface_count = material.surface_count as usize;
            if surfaces_left < surface_count {
                return Err(PmxError::NoSurfaceLeft {
                    expected: surface_count,
                    actual: surfaces_left,
                });
            }
            materials.push(self.load_material(material, surface_offset));
            surface_offset += surface_count;
            surfaces_left -= surface_count;
        }
        if surfaces_left > 0 {
            debug!("{} surfaces not assigned to any material", surfaces_left);
        }
        Ok(materials)
    }

    fn load_bone(&self, bone: &PmxBone) -> Bone {
        trace!("Bone {:?}", bone.bone_name_local.0);
        let connection = match (bone.tail_index, bone.tail_position) {
            (Some(index), _) => BoneConnection::Bone(index.get()),
            (None, Some(offset)) => BoneConnection::Offset(offset.into()),
            (None, None) => BoneConnection::Offset(Vec3::ZERO),
        };
        let ik = bone.ik.as_ref().map(|ik| Ik {
            target: ik.target_index.get(),
            iterations: ik.loop_count,
            angle_limit: ik.limit_radian,
            links: ik
                .links
                .iter()
                .map(|link| IkLink {
                    bone: link.bone_index.get(),
                    limit: link.limits.as_ref().map(|limits| IkAngleLimit {
                        min: limits.limit_min.into(),
                        max: limits.limit_max.into(),
                    }),
                })
                .collect(),
        });
        Bone {
            name: bone.bone_name_local.0.clone(),
            name_en: bone.bone_name_universal.0.clone(),
            position: bone.position.into(),
            parent: resolve(bone.parent_bone_index, self.file.bones.len(), "Parent bone"),
            transform_level: bone.layer,
            flags: bone.flags,
            connection,
            append: bone
                .inherit_parent
                .as_ref()
                .map(|inherit| AppendTransform {
                    bone: inherit.inherit_parent_index.get(),
                    ratio: inherit.inherit_parent_influence,
                }),
            fixed_axis: bone.axis_direction.map(Vec3::from),
            local_axes: bone
                .local_coordinate
                .map(|[x, z]| LocalAxes::from_raw(x.into(), z.into())),
            external_parent_key: bone.external_parent_key,
            ik,
        }
    }

    fn load_morph(&self, morph: &PmxMorph) -> Morph {
        trace!(
            "Morph {:?}: {:?}",
            morph.morph_name_local.0,
            morph.morph_type
        );
        let materials = self.file.materials.len();
        let offsets = match &morph.offset_data {
            PmxMorphOffsetData::Group(items) => MorphOffsets::Group(
                items
                    .iter()
                    .map(|item| GroupOffset {
                        morph: item.morph_index.get(),
                        rate: item.influence,
                    })
                    .collect(),
            ),
            PmxMorphOffsetData::Vertex(items) => MorphOffsets::Vertex(
                items
                    .iter()
                    .map(|item| VertexOffset {
                        vertex: item.vertex_index.0,
                        translation: item.translation.into(),
                    })
                    .collect(),
            ),
            PmxMorphOffsetData::Bone(items) => MorphOffsets::Bone(
                items
                    .iter()
                    .map(|item| BoneOffset {
                        bone: item.bone_index.get(),
                        translation: item.translation.into(),
                        rotation: Quat::from_array(item.rotation),
                    })
                    .collect(),
            ),
            PmxMorphOffsetData::Uv(items) => MorphOffsets::Uv(
                items
                    .iter()
                    .map(|item| UvOffset {
                        vertex: item.vertex_index.0,
                        delta: item.floats.into(),
                    })
                    .collect(),
            ),
            PmxMorphOffsetData::Material(items) => MorphOffsets::Material(
                items
                    .iter()
                    .map(|item| MaterialOffset {
                        // -1 and anything past the material table address every material
                        target: match item.material_index.get() {
                            Some(index) if index < materials => MaterialTarget::Material(index),
                            _ => MaterialTarget::All,
                        },
                        method: match item.method {
                            format::PmxMaterialMorphMethod::Multiply => {
                                MaterialMorphMethod::Multiply
                            }
                            format::PmxMaterialMorphMethod::Additive => MaterialMorphMethod::Add,
                        },
                        diffuse_color: item.diffuse.into(),
                        specular_color: item.specular.into(),
                        specular_power: item.specularity,
                        ambient_color: item.ambient.into(),
                        edge_color: item.edge_color.into(),
                        edge_size: item.edge_size,
                        texture_factor: item.texture_tint.into(),
                        sphere_texture_factor: item.environment_tint.into(),
                        toon_texture_factor: item.toon_tint.into(),
                    })
                    .collect(),
            ),
            PmxMorphOffsetData::Impulse(items) => MorphOffsets::Impulse(
                items
                    .iter()
                    .map(|item| ImpulseOffset {
                        rigid_body: item.rigidbody_index.get(),
                        local: item.local_flag,
                        velocity: item.movement_speed.into(),
                        torque: item.rotation_torque.into(),
                    })
                    .collect(),
            ),
        };
        Morph {
            name: morph.morph_name_local.0.clone(),
            name_en: morph.morph_name_universal.0.clone(),
            category: match morph.panel_type {
                format::PmxMorphPanelType::Face => MorphCategory::Face,
                format::PmxMorphPanelType::LeftEye => MorphCategory::LeftEye,
                format::PmxMorphPanelType::RightEye => MorphCategory::RightEye,
                format::PmxMorphPanelType::Mouth => MorphCategory::Mouth,
                format::PmxMorphPanelType::Other => MorphCategory::Other,
            },
            morph_type: match morph.morph_type {
                format::PmxMorphType::Group => MorphType::Group,
                format::PmxMorphType::Vertex => MorphType::Vertex,
                format::PmxMorphType::Bone => MorphType::Bone,
                format::PmxMorphType::Uv => MorphType::Uv,
                format::PmxMorphType::UvExt1 => MorphType::AdditionalUv1,
                format::PmxMorphType::UvExt2 => MorphType::AdditionalUv2,
                format::PmxMorphType::UvExt3 => MorphType::AdditionalUv3,
                format::PmxMorphType::UvExt4 => MorphType::AdditionalUv4,
                format::PmxMorphType::Material => MorphType::Material,
                format::PmxMorphType::Flip => MorphType::Flip,
                format::PmxMorphType::Impulse => MorphType::Impulse,
            },
            offsets,
        }
    }

    fn load_display_frame(frame: &PmxDisplayFrame) -> DisplayFrame {
        DisplayFrame {
            name: frame.display_name_local.0.clone(),
            name_en: frame.display_name_universal.0.clone(),
            special: frame.special_frame,
            elements: frame
                .frames
                .iter()
                .map(|item| match item.frame_type {
                    format::PmxFrameType::Bone => DisplayElement::Bone(item.index.get()),
                    format::PmxFrameType::Morph => DisplayElement::Morph(item.index.get()),
                })
                .collect(),
        }
    }

    fn load_rigid_body(rigidbody: &PmxRigidbody) -> RigidBody {
        RigidBody {
            name: rigidbody.rigidbody_name_local.0.clone(),
            name_en: rigidbody.rigidbody_name_universal.0.clone(),
            bone: rigidbody.related_bone_index.get(),
            group: rigidbody.group_id,
            non_collision_mask: rigidbody.no_collision_group,
            shape: match rigidbody.shape {
                format::PmxShapeType::Sphere => RigidBodyShape::Sphere,
                format::PmxShapeType::Box => RigidBodyShape::Box,
                format::PmxShapeType::Capsule => RigidBodyShape::Capsule,
            },
            size: rigidbody.shape_size.into(),
            position: rigidbody.shape_position.into(),
            rotation: rigidbody.shape_rotation.into(),
            mass: rigidbody.mass,
            linear_damping: rigidbody.move_attenuation,
            angular_damping: rigidbody.rotation_damping,
            restitution: rigidbody.repulsion,
            friction: rigidbody.friction_force,
            mode: match rigidbody.physics_mode {
                format::PmxPhysicsMode::FollowBone => RigidBodyMode::Kinematic,
                format::PmxPhysicsMode::Physics => RigidBodyMode::Dynamic,
                format::PmxPhysicsMode::PhysicsAndBone => RigidBodyMode::DynamicWithBone,
            },
        }
    }

    fn load_joint(joint: &PmxJoint) -> Joint {
        Joint {
            name: joint.joint_name_local.0.clone(),
            name_en: joint.joint_name_universal.0.clone(),
            rigid_bodies: [joint.rigidbody_index_a.get(), joint.rigidbody_index_b.get()],
            position: joint.position.into(),
            rotation: joint.rotation.into(),
            position_min: joint.position_minimum.into(),
            position_max: joint.position_maximum.into(),
            rotation_min: joint.rotation_minimum.into(),
            rotation_max: joint.rotation_maximum.into(),
            position_spring: joint.position_spring.into(),
            rotation_spring: joint.rotation_spring.into(),
        }
    }

    fn load_file(self) -> Result<ModelAsset, PmxError> {
        let file = &self.file;
        debug!(
            "PMX {:?}: {} vertices, {} surfaces, {} textures, {} materials",
            file.header.model_name_local.0,
            file.vertices.len(),
            file.surfaces.len(),
            file.textures.len(),
            file.materials.len()
        );
        debug!(
            "{} bones, {} morphs, {} display frames, {} rigid bodies, {} joints",
            file.bones.len(),
            file.morphs.len(),
            file.display_frames.len(),
            file.rigidbodies.len(),
            file.joints.len()
        );

        let materials = self.load_materials()?;
        Ok(ModelAsset {
            config: file.header.globals.into(),
            info: ModelInfo {
                name: file.header.model_name_local.0.clone(),
                name_en: file.header.model_name_universal.0.clone(),
                comment: file.header.comments_local.0.clone(),
                comment_en: file.header.comments_universal.0.clone(),
            },
            vertices: file.vertices.iter().map(Self::load_vertex).collect(),
            faces: self.load_faces(),
            textures: file.textures.iter().map(|text| text.0.clone()).collect(),
            materials,
            bones: file.bones.iter().map(|bone| self.load_bone(bone)).collect(),
            morphs: file.morphs.iter().map(|morph| self.load_morph(morph)).collect(),
            display_frames: file
                .display_frames
                .iter()
                .map(Self::load_display_frame)
                .collect(),
            rigid_bodies: file.rigidbodies.iter().map(Self::load_rigid_body).collect(),
            joints: file.joints.iter().map(Self::load_joint).collect(),
        })
    }
}

/// Decodes a complete PMX 2.0 file held in memory.
pub fn decode(bytes: &[u8]) -> Result<ModelAsset, PmxError> {
    read(&mut Cursor::new(bytes))
}

/// Decodes a PMX 2.0 file from a stream positioned at its first byte.
pub fn read<R: Read + Seek>(reader: &mut R) -> Result<ModelAsset, PmxError> {
    let file = PmxFile::read(reader)?;
    PmxLoader::new(file).load_file()
}

/// Decodes the model file of a bundle, named after
/// [`AssetLoadParams::bundle_model_filename`].
pub fn load_bundle<T, A: Archive<T>>(
    bundle: &mut A,
    params: &AssetLoadParams,
) -> Result<ModelAsset, PmxError> {
    let file_name = params.bundle_model_filename("pmx");
    let file = bundle
        .by_path(&file_name)
        .map_err(|err| PmxError::Archive(Box::new(err)))?
        .ok_or_else(|| PmxError::ModelNotFound(file_name))?;
    decode(&file)
}

#[cfg(test)]
pub(crate) mod test {
    use glam::{Quat, Vec3, Vec4};

    use super::{decode, testing::PmxWriter, testing::SECTION_COUNT, PmxError};
    use crate::{
        bone::BoneConnection,
        display::DisplayElement,
        material::{SphereBlendMode, ToonReference},
        model::{IndexWidth, TextEncoding},
        morph::{
            BoneOffset, ImpulseOffset, MaterialMorphMethod, MaterialTarget, MorphCategory,
            MorphOffsets, MorphType, UvOffset, VertexOffset,
        },
        physics::{RigidBodyMode, RigidBodyShape},
        vertex::SkinWeight,
    };

    pub(crate) fn empty_model() -> Vec<u8> {
        let mut writer = PmxWriter::default();
        writer.header().empty_sections(SECTION_COUNT);
        writer.into_bytes()
    }

    fn sample_model() -> Vec<u8> {
        let mut writer = PmxWriter::default()
            .with_index_sizes([1, 1, 1, 2, 2, 1])
            .with_additional_vec4(1);
        writer.header();

        writer.i32(3);
        for position in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            writer
                .floats(&position)
                .floats(&[0.0, 0.0, -1.0])
                .floats(&[0.5, 0.5])
                .floats(&[1.0, 2.0, 3.0, 4.0])
                .u8(1)
                .bone_index(0)
                .bone_index(1)
                .f32(0.25)
                .f32(1.0);
        }
        writer
            .i32(3)
            .vertex_index(0)
            .vertex_index(1)
            .vertex_index(2);
        writer.i32(2).text("tex/body.png").text("tex/toon.bmp");
        writer.i32(1).material("body", 0, (1, 0), 3);
        writer.i32(2).plain_bone("root", 5).plain_bone("child", 0);

        writer.i32(2);
        writer
            .text("smile")
            .text("")
            .u8(3)
            .u8(8)
            .i32(1)
            .material_index(-1)
            .u8(1)
            .floats(&[0.5; 28]);
        writer
            .text("all")
            .text("")
            .u8(4)
            .u8(0)
            .i32(1)
            .morph_index(0)
            .f32(0.5);

        writer
            .i32(1)
            .text("Root")
            .text("Root")
            .u8(1)
            .i32(2)
            .u8(0)
            .bone_index(0)
            .u8(1)
            .morph_index(1);

        writer
            .i32(1)
            .text("body")
            .text("")
            .bone_index(1)
            .u8(2)
            .u16(0xfffe)
            .u8(2)
            .floats(&[1.0, 2.0, 0.0])
            .floats(&[0.0; 6])
            .floats(&[1.0, 0.5, 0.5, 0.0, 0.5])
            .u8(1);

        writer
            .i32(1)
            .text("joint")
            .text("")
            .u8(0)
            .rigidbody_index(0)
            .rigidbody_index(-1)
            .floats(&[0.0; 24]);
        writer.into_bytes()
    }

    #[test]
    fn test_empty_model() {
        let model = decode(&empty_model()).unwrap();
        assert_eq!(model.info.name, "model");
        assert_eq!(model.info.name_en, "model_en");
        assert_eq!(model.info.comment, "comment");
        assert_eq!(model.info.comment_en, "comment_en");
        assert_eq!(model.config.text_encoding, TextEncoding::Utf8);
        assert_eq!(model.config.bone_index_width, IndexWidth::Size4);
        assert!(model.vertices.is_empty());
        assert!(model.faces.is_empty());
        assert!(model.textures.is_empty());
        assert!(model.materials.is_empty());
        assert!(model.bones.is_empty());
        assert!(model.morphs.is_empty());
        assert!(model.display_frames.is_empty());
        assert!(model.rigid_bodies.is_empty());
        assert!(model.joints.is_empty());
    }

    #[test]
    fn test_utf16_model() {
        let mut writer = PmxWriter::utf16();
        writer
            .raw(b"PMX ")
            .f32(2.0)
            .globals()
            .text("初音ミク")
            .text("Hatsune Miku")
            .text("")
            .text("")
            .empty_sections(SECTION_COUNT);
        let model = decode(writer.bytes()).unwrap();
        assert_eq!(model.config.text_encoding, TextEncoding::Utf16le);
        assert_eq!(model.info.name, "初音ミク");
        assert_eq!(model.info.name_en, "Hatsune Miku");
        assert_eq!(model.info.comment, "");
    }

    #[test]
    fn test_sample_model() {
        let model = decode(&sample_model()).unwrap();
        assert_eq!(model.config.additional_uv_count, 1);
        assert_eq!(model.config.vertex_index_width, IndexWidth::Size1);
        assert_eq!(model.config.bone_index_width, IndexWidth::Size2);

        assert_eq!(model.vertices.len(), 3);
        let vertex = &model.vertices[1];
        assert_eq!(vertex.position, Vec3::X);
        assert_eq!(vertex.additional_uv, vec![Vec4::new(1.0, 2.0, 3.0, 4.0)]);
        assert_eq!(
            vertex.skin,
            SkinWeight::Bdef2 {
                bones: [Some(0), Some(1)],
                weight: 0.25,
            }
        );
        assert_eq!(model.faces, vec![[0, 1, 2]]);
        assert_eq!(model.texture_path(1), Some("tex/toon.bmp"));

        let material = &model.materials[0];
        assert_eq!(material.name, "body");
        assert_eq!(material.texture, Some(0));
        assert_eq!(material.sphere_texture, None);
        assert_eq!(material.sphere_blend_mode, SphereBlendMode::Disabled);
        assert_eq!(material.toon, ToonReference::None);
        assert!(material.draw_flags.double_sided());
        assert!(!material.draw_flags.ground_shadow());
        assert!(material.draw_flags.draw_edge());
        assert_eq!(model.triangles_of(0), Some(&[[0, 1, 2]][..]));

        let (index, root) = model.bone_by_name("root").unwrap();
        assert_eq!(index, 0);
        assert_eq!(root.parent, None);
        assert_eq!(root.connection, BoneConnection::Offset(Vec3::Y));
        assert_eq!(model.bones[1].parent, Some(0));

        let (_, smile) = model.morph_by_name("smile").unwrap();
        assert_eq!(smile.category, MorphCategory::Mouth);
        assert_eq!(smile.morph_type, MorphType::Material);
        match &smile.offsets {
            MorphOffsets::Material(offsets) => {
                assert_eq!(offsets[0].target, MaterialTarget::All);
                assert_eq!(offsets[0].method, MaterialMorphMethod::Add);
                assert_eq!(offsets[0].toon_texture_factor, Vec4::splat(0.5));
            }
            other => panic!("unexpected offsets: {:?}", other),
        }
        let group = &model.morphs[1];
        assert_eq!(group.category, MorphCategory::Other);
        assert_eq!(group.offsets.len(), 1);

        let frame = &model.display_frames[0];
        assert!(frame.special);
        assert_eq!(
            frame.elements,
            vec![DisplayElement::Bone(Some(0)), DisplayElement::Morph(Some(1))]
        );

        let rigid_body = &model.rigid_bodies[0];
        assert_eq!(rigid_body.bone, Some(1));
        assert_eq!(rigid_body.group, 2);
        assert_eq!(rigid_body.non_collision_mask, 0xfffe);
        assert_eq!(rigid_body.shape, RigidBodyShape::Capsule);
        assert_eq!(rigid_body.mass, 1.0);
        assert_eq!(rigid_body.friction, 0.5);
        assert_eq!(rigid_body.mode, RigidBodyMode::Dynamic);

        assert_eq!(model.joints[0].rigid_bodies, [Some(0), None]);
    }

    #[test]
    fn test_morph_offset_records() {
        let mut writer = PmxWriter::default().with_index_sizes([2, 1, 1, 1, 1, 1]);
        writer.header().empty_sections(5).i32(4);
        writer
            .text("vertex")
            .text("")
            .u8(1)
            .u8(1)
            .i32(1)
            .vertex_index(65535)
            .floats(&[0.0, 0.5, 0.0]);
        writer
            .text("bone")
            .text("")
            .u8(4)
            .u8(2)
            .i32(1)
            .bone_index(0)
            .floats(&[0.0, 1.0, 0.0])
            .floats(&[0.0, 0.0, 0.0, 1.0]);
        writer
            .text("uv")
            .text("")
            .u8(4)
            .u8(5)
            .i32(1)
            .vertex_index(7)
            .floats(&[1.0, 2.0, 3.0, 4.0]);
        writer
            .text("impulse")
            .text("")
            .u8(4)
            .u8(10)
            .i32(1)
            .rigidbody_index(0)
            .u8(1)
            .floats(&[1.0, 2.0, 3.0])
            .floats(&[4.0, 5.0, 6.0]);
        writer.empty_sections(3);

        let model = decode(writer.bytes()).unwrap();
        assert_eq!(model.config.vertex_index_width.bytes(), 2);
        assert_eq!(model.morphs.len(), 4);

        let vertex = &model.morphs[0];
        assert_eq!(vertex.category, MorphCategory::LeftEye);
        assert_eq!(vertex.morph_type, MorphType::Vertex);
        assert_eq!(
            vertex.offsets,
            MorphOffsets::Vertex(vec![VertexOffset {
                vertex: 65535,
                translation: Vec3::new(0.0, 0.5, 0.0),
            }])
        );

        let bone = &model.morphs[1];
        assert_eq!(bone.morph_type, MorphType::Bone);
        assert_eq!(
            bone.offsets,
            MorphOffsets::Bone(vec![BoneOffset {
                bone: Some(0),
                translation: Vec3::Y,
                rotation: Quat::IDENTITY,
            }])
        );

        let uv = &model.morphs[2];
        assert_eq!(uv.morph_type, MorphType::AdditionalUv2);
        assert_eq!(uv.morph_type.uv_channel(), Some(2));
        assert_eq!(
            uv.offsets,
            MorphOffsets::Uv(vec![UvOffset {
                vertex: 7,
                delta: Vec4::new(1.0, 2.0, 3.0, 4.0),
            }])
        );

        let impulse = &model.morphs[3];
        assert_eq!(impulse.morph_type, MorphType::Impulse);
        assert_eq!(impulse.morph_type.uv_channel(), None);
        assert_eq!(
            impulse.offsets,
            MorphOffsets::Impulse(vec![ImpulseOffset {
                rigid_body: Some(0),
                local: true,
                velocity: Vec3::new(1.0, 2.0, 3.0),
                torque: Vec3::new(4.0, 5.0, 6.0),
            }])
        );
    }

    #[test]
    fn test_vertex_index_max_value() {
        let mut writer = PmxWriter::default().with_index_sizes([1, 4, 4, 4, 4, 4]);
        writer
            .header()
            .i32(0)
            .i32(3)
            .vertex_index(255)
            .vertex_index(255)
            .vertex_index(0)
            .empty_sections(SECTION_COUNT - 2);
        let model = decode(writer.bytes()).unwrap();
        assert_eq!(model.faces, vec![[255, 255, 0]]);
    }

    fn model_with_material(toon: (u8, i64), surface_count: i32) -> Vec<u8> {
        let mut writer = PmxWriter::default();
        writer
            .header()
            .i32(0)
            .i32(3)
            .vertex_index(0)
            .vertex_index(1)
            .vertex_index(2)
            .i32(2)
            .text("a.png")
            .text("toon.bmp")
            .i32(1)
            .material("material", 0, toon, surface_count)
            .empty_sections(5);
        writer.into_bytes()
    }

    #[test]
    fn test_toon_reference() {
        let toon = |toon| decode(&model_with_material(toon, 3)).unwrap().materials[0].toon;
        assert_eq!(toon((1, 0)), ToonReference::None);
        assert_eq!(toon((1, 1)), ToonReference::Shared { slot: 1 });
        assert_eq!(
            toon((1, 1)).shared_texture_name(),
            Some("toon01.bmp")
        );
        assert_eq!(toon((1, 10)).shared_texture_name(), Some("toon10.bmp"));
        assert_eq!(toon((0, 1)), ToonReference::Texture(1));
        assert_eq!(toon((0, -1)), ToonReference::None);
        assert_eq!(toon((0, 9)), ToonReference::None);
    }

    #[test]
    fn test_unknown_toon_selector() {
        let result = decode(&model_with_material((2, 0), 3));
        assert!(matches!(result, Err(PmxError::UnknownVariant { .. })));
    }

    #[test]
    fn test_no_surface_left() {
        let result = decode(&model_with_material((1, 0), 6));
        assert!(matches!(
            result,
            Err(PmxError::NoSurfaceLeft {
                expected: 6,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_material_surface_count_not_triangles() {
        let result = decode(&model_with_material((1, 0), 2));
        assert!(matches!(result, Err(PmxError::InvalidConfig { .. })));
    }

    #[test]
    fn test_face_count_not_triangles() {
        let mut writer = PmxWriter::default();
        writer.header().i32(0).i32(4);
        let result = decode(writer.bytes());
        assert!(matches!(result, Err(PmxError::InvalidConfig { .. })));
    }

    #[test]
    fn test_magic_mismatch() {
        let mut bytes = empty_model();
        bytes[..4].copy_from_slice(b"Pmd ");
        assert!(matches!(
            decode(&bytes),
            Err(PmxError::MagicMismatch { pos: 0 })
        ));
        assert!(matches!(decode(b"PM"), Err(PmxError::TruncatedInput)));
    }

    #[test]
    fn test_unsupported_version() {
        let mut writer = PmxWriter::default();
        writer.raw(b"PMX ").f32(2.1).globals();
        match decode(writer.bytes()) {
            Err(PmxError::UnsupportedVersion(version)) => assert!((version - 2.1).abs() < 1e-6),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_truncated_input() {
        let bytes = empty_model();
        for length in [8, 20, bytes.len() - 1] {
            assert!(matches!(
                decode(&bytes[..length]),
                Err(PmxError::TruncatedInput)
            ));
        }
    }

    #[test]
    fn test_bad_config() {
        let mut writer = PmxWriter::default().with_index_sizes([4, 4, 4, 3, 4, 4]);
        writer.header();
        assert!(matches!(
            decode(writer.bytes()),
            Err(PmxError::InvalidConfig { .. })
        ));

        let mut writer = PmxWriter::default().with_additional_vec4(5);
        writer.header();
        assert!(matches!(
            decode(writer.bytes()),
            Err(PmxError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_negative_count() {
        let mut writer = PmxWriter::default();
        writer.header().i32(-1);
        assert!(matches!(
            decode(writer.bytes()),
            Err(PmxError::InvalidLength { length: -1, .. })
        ));
    }

    #[test]
    fn test_unknown_skin_method() {
        let mut writer = PmxWriter::default();
        writer
            .header()
            .i32(1)
            .floats(&[0.0; 8])
            .u8(7)
            .bone_index(0);
        assert!(matches!(
            decode(writer.bytes()),
            Err(PmxError::UnknownVariant { .. })
        ));
    }

    #[test]
    fn test_bad_draw_flags() {
        let mut writer = PmxWriter::default();
        writer
            .header()
            .empty_sections(3)
            .i32(1)
            .text("material")
            .text("")
            .floats(&[1.0; 11])
            .u8(0b0010_0000);
        assert!(matches!(
            decode(writer.bytes()),
            Err(PmxError::UnknownVariant { .. })
        ));
    }

    #[test]
    fn test_unknown_morph_type() {
        let mut writer = PmxWriter::default();
        writer
            .header()
            .empty_sections(5)
            .i32(1)
            .text("morph")
            .text("")
            .u8(0)
            .u8(11)
            .i32(0);
        assert!(matches!(
            decode(writer.bytes()),
            Err(PmxError::UnknownVariant { .. })
        ));
    }

    fn model_with_joint(joint_type: u8) -> Vec<u8> {
        let mut writer = PmxWriter::default();
        writer
            .header()
            .empty_sections(SECTION_COUNT - 1)
            .i32(1)
            .text("joint")
            .text("")
            .u8(joint_type)
            .rigidbody_index(0)
            .rigidbody_index(1)
            .floats(&[0.0; 24]);
        writer.into_bytes()
    }

    #[test]
    fn test_joint_types() {
        assert_eq!(decode(&model_with_joint(0)).unwrap().joints.len(), 1);
        assert!(matches!(
            decode(&model_with_joint(1)),
            Err(PmxError::UnsupportedFeature { pos: Some(_), .. })
        ));
        assert!(matches!(
            decode(&model_with_joint(7)),
            Err(PmxError::UnknownVariant { .. })
        ));
    }

    #[cfg(feature = "zip")]
    #[test]
    fn test_load_bundle() {
        use super::load_bundle;
        use crate::{archive::zip::test::bundle, loader::AssetLoadParams};

        let model = sample_model();
        let mut archive = bundle(&[("model.pmx", model.as_slice()), ("tex/body.png", &b""[..])]);
        let asset = load_bundle(&mut archive, &AssetLoadParams::default()).unwrap();
        assert_eq!(asset.materials.len(), 1);

        let params = AssetLoadParams {
            bundle_model_name: String::from("other"),
            ..AssetLoadParams::default()
        };
        assert!(matches!(
            load_bundle(&mut archive, &params),
            Err(PmxError::ModelNotFound(name)) if name == "other.pmx"
        ));
    }
}
