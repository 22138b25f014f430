use std::{
    fmt::{self, Display, Formatter},
    io::{Read, Seek},
};

use binrw::{prelude::*, Endian};

use crate::{bone::BoneFlags, material::DrawFlags};

/// Longest text field accepted, in bytes.
pub const MAX_TEXT_LENGTH: i32 = 16 * 1024 * 1024;

const SUPPORTED_VERSION: f32 = 2.0;
const VERSION_TOLERANCE: f32 = 1e-4;

#[derive(Debug, Clone)]
pub enum PmxFormatError {
    UnsupportedVersion(f32),
    BadTextEncoding(u8),
    BadIndexSize(u8),
    BadAdditionalVec4Count(u8),
    BadTextLength(i32),
    BadCount(i32),
    BadSurfacesCount(i32),
    BadTag { kind: &'static str, tag: u8 },
    BadDrawingFlags(u8),
    BadBoolean(u8),
    UnsupportedJoint(PmxJointType),
}

impl Display for PmxFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PmxFormatError::UnsupportedVersion(version) => {
                write!(f, "Unsupported PMX version: {}", version)
            }
            PmxFormatError::BadTextEncoding(tag) => write!(f, "Bad text encoding: {}", tag),
            PmxFormatError::BadIndexSize(size) => write!(f, "Bad index size: {}", size),
            PmxFormatError::BadAdditionalVec4Count(count) => {
                write!(f, "Bad additional vec4 count: {}", count)
            }
            PmxFormatError::BadTextLength(length) => write!(f, "Bad text length: {}", length),
            PmxFormatError::BadCount(count) => write!(f, "Bad element count: {}", count),
            PmxFormatError::BadSurfacesCount(count) => {
                write!(f, "Surface count {} is not a multiple of 3", count)
            }
            PmxFormatError::BadTag { kind, tag } => write!(f, "Bad {} tag: {}", kind, tag),
            PmxFormatError::BadDrawingFlags(flags) => {
                write!(f, "Unknown drawing flags: {:#010b}", flags)
            }
            PmxFormatError::BadBoolean(value) => write!(f, "Bad boolean value: {}", value),
            PmxFormatError::UnsupportedJoint(joint_type) => {
                write!(f, "Unsupported joint type: {:?}", joint_type)
            }
        }
    }
}

fn format_error(pos: u64, err: PmxFormatError) -> binrw::Error {
    binrw::Error::Custom {
        pos,
        err: Box::new(err),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PmxText(pub String);

impl BinRead for PmxText {
    type Args<'a> = (PmxTextEncoding,);

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let pos = reader.stream_position()?;
        let length = i32::read_options(reader, endian, ())?;
        let bad_length = !(0..=MAX_TEXT_LENGTH).contains(&length)
            || (args.0 == PmxTextEncoding::Utf16le && length % 2 != 0);
        if bad_length {
            return Err(format_error(pos, PmxFormatError::BadTextLength(length)));
        }
        if length == 0 {
            return Ok(Self::default());
        }

        let mut bytes = vec![0u8; length as usize];
        reader.read_exact(&mut bytes)?;
        let text = match args.0 {
            PmxTextEncoding::Utf8 => String::from_utf8_lossy(&bytes).into_owned(),
            PmxTextEncoding::Utf16le => {
                let words: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|word| u16::from_le_bytes([word[0], word[1]]))
                    .collect();
                String::from_utf16_lossy(&words)
            }
        };
        Ok(Self(text))
    }
}

impl From<PmxText> for String {
    fn from(value: PmxText) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PmxTextEncoding {
    Utf16le,
    Utf8,
}

impl TryFrom<u8> for PmxTextEncoding {
    type Error = PmxFormatError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PmxTextEncoding::Utf16le),
            1 => Ok(PmxTextEncoding::Utf8),
            other => Err(PmxFormatError::BadTextEncoding(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PmxIndexType {
    Byte,
    Short,
    Int,
}

impl TryFrom<u8> for PmxIndexType {
    type Error = PmxFormatError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PmxIndexType::Byte),
            2 => Ok(PmxIndexType::Short),
            4 => Ok(PmxIndexType::Int),
            other => Err(PmxFormatError::BadIndexSize(other)),
        }
    }
}

/// Signed table index, widened from its stored size. Negative values
/// (normally -1) mean "no reference".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PmxIndex(pub i32);

impl PmxIndex {
    pub fn get(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl BinRead for PmxIndex {
    type Args<'a> = (PmxIndexType,);

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let index = match args.0 {
            PmxIndexType::Byte => i32::from(i8::read_options(reader, endian, ())?),
            PmxIndexType::Short => i32::from(i16::read_options(reader, endian, ())?),
            PmxIndexType::Int => i32::read_options(reader, endian, ())?,
        };
        Ok(Self(index))
    }
}

/// Vertex indices are unsigned for every size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PmxVertexIndex(pub u32);

impl BinRead for PmxVertexIndex {
    type Args<'a> = (PmxIndexType,);

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let index = match args.0 {
            PmxIndexType::Byte => u32::from(u8::read_options(reader, endian, ())?),
            PmxIndexType::Short => u32::from(u16::read_options(reader, endian, ())?),
            PmxIndexType::Int => u32::read_options(reader, endian, ())?,
        };
        Ok(Self(index))
    }
}

#[derive(Debug, Clone, Copy, BinRead)]
pub struct PmxGlobals {
    /// Always 8 in PMX 2.0, not used otherwise.
    pub globals_count: u8,
    #[br(try_map = |tag: u8| PmxTextEncoding::try_from(tag))]
    pub text_encoding: PmxTextEncoding,
    #[br(assert(
        additional_vec4_count <= 4,
        PmxFormatError::BadAdditionalVec4Count(additional_vec4_count)
    ))]
    pub additional_vec4_count: u8,
    #[br(try_map = |size: u8| PmxIndexType::try_from(size))]
    pub vertex_index_type: PmxIndexType,
    #[br(try_map = |size: u8| PmxIndexType::try_from(size))]
    pub texture_index_type: PmxIndexType,
    #[br(try_map = |size: u8| PmxIndexType::try_from(size))]
    pub material_index_type: PmxIndexType,
    #[br(try_map = |size: u8| PmxIndexType::try_from(size))]
    pub bone_index_type: PmxIndexType,
    #[br(try_map = |size: u8| PmxIndexType::try_from(size))]
    pub morph_index_type: PmxIndexType,
    #[br(try_map = |size: u8| PmxIndexType::try_from(size))]
    pub rigidbody_index_type: PmxIndexType,
}

#[derive(Debug, Clone, BinRead)]
pub struct PmxFileHeader {
    pub globals: PmxGlobals,
    #[br(args(globals.text_encoding))]
    pub model_name_local: PmxText,
    #[br(args(globals.text_encoding))]
    pub model_name_universal: PmxText,
    #[br(args(globals.text_encoding))]
    pub comments_local: PmxText,
    #[br(args(globals.text_encoding))]
    pub comments_universal: PmxText,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PmxWeightDeform {
    Bdef1 {
        bone_index: PmxIndex,
    },
    Bdef2 {
        bone_index_1: PmxIndex,
        bone_index_2: PmxIndex,
        bone_weight_1: f32,
    },
    Bdef4 {
        bone_index: [PmxIndex; 4],
        bone_weight: [f32; 4],
    },
    Sdef {
        bone_index_1: PmxIndex,
        bone_index_2: PmxIndex,
        bone_weight_1: f32,
        c: [f32; 3],
        r0: [f32; 3],
        r1: [f32; 3],
    },
    Qdef {
        bone_index: [PmxIndex; 4],
        bone_weight: [f32; 4],
    },
}

impl BinRead for PmxWeightDeform {
    type Args<'a> = (PmxIndexType,);

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let pos = reader.stream_position()?;
        let tag = u8::read_options(reader, endian, ())?;
        let bone = |reader: &mut R| PmxIndex::read_options(reader, endian, args);
        Ok(match tag {
            0 => PmxWeightDeform::Bdef1 {
                bone_index: bone(reader)?,
            },
            1 => PmxWeightDeform::Bdef2 {
                bone_index_1: bone(reader)?,
                bone_index_2: bone(reader)?,
                bone_weight_1: f32::read_options(reader, endian, ())?,
            },
            2 | 4 => {
                let bone_index = [bone(reader)?, bone(reader)?, bone(reader)?, bone(reader)?];
                let bone_weight = <[f32; 4]>::read_options(reader, endian, ())?;
                if tag == 2 {
                    PmxWeightDeform::Bdef4 {
                        bone_index,
                        bone_weight,
                    }
                } else {
                    PmxWeightDeform::Qdef {
                        bone_index,
                        bone_weight,
                    }
                }
            }
            3 => PmxWeightDeform::Sdef {
                bone_index_1: bone(reader)?,
                bone_index_2: bone(reader)?,
                bone_weight_1: f32::read_options(reader, endian, ())?,
                c: <[f32; 3]>::read_options(reader, endian, ())?,
                r0: <[f32; 3]>::read_options(reader, endian, ())?,
                r1: <[f32; 3]>::read_options(reader, endian, ())?,
            },
            tag => {
                return Err(format_error(
                    pos,
                    PmxFormatError::BadTag {
                        kind: "weight deform",
                        tag,
                    },
                ))
            }
        })
    }
}

#[derive(Debug, Clone, BinRead)]
#[br(import(globals: PmxGlobals))]
pub struct PmxVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    #[br(count = globals.additional_vec4_count as usize)]
    pub additional_vec4: Vec<[f32; 4]>,
    #[br(args(globals.bone_index_type))]
    pub weight_deform: PmxWeightDeform,
    pub edge_scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead)]
pub enum PmxEnvironmentBlendMode {
    #[br(magic = 0u8)]
    Disabled,
    #[br(magic = 1u8)]
    Multiply,
    #[br(magic = 2u8)]
    Additive,
    #[br(magic = 3u8)]
    AdditionalVec4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PmxToonReference {
    Texture { index: PmxIndex },
    Internal { index: u8 },
}

impl BinRead for PmxToonReference {
    type Args<'a> = (PmxIndexType,);

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let pos = reader.stream_position()?;
        match u8::read_options(reader, endian, ())? {
            0 => Ok(PmxToonReference::Texture {
                index: PmxIndex::read_options(reader, endian, args)?,
            }),
            1 => Ok(PmxToonReference::Internal {
                index: u8::read_options(reader, endian, ())?,
            }),
            tag => Err(format_error(
                pos,
                PmxFormatError::BadTag {
                    kind: "toon reference",
                    tag,
                },
            )),
        }
    }
}

#[derive(Debug, Clone, BinRead)]
#[br(import(globals: PmxGlobals))]
pub struct PmxMaterial {
    #[br(args(globals.text_encoding))]
    pub material_name_local: PmxText,
    #[br(args(globals.text_encoding))]
    pub material_name_universal: PmxText,
    pub diffuse_color: [f32; 4],
    pub specular_color: [f32; 3],
    pub specular_strength: f32,
    pub ambient_color: [f32; 3],
    #[br(
        map = |bits: u8| DrawFlags::from_bytes([bits]),
        assert(
            drawing_flags.is_modeled(),
            PmxFormatError::BadDrawingFlags(drawing_flags.into_bytes()[0])
        )
    )]
    pub drawing_flags: DrawFlags,
    pub edge_color: [f32; 4],
    pub edge_scale: f32,
    #[br(args(globals.texture_index_type))]
    pub texture_index: PmxIndex,
    #[br(args(globals.texture_index_type))]
    pub environment_index: PmxIndex,
    pub environment_blend_mode: PmxEnvironmentBlendMode,
    #[br(args(globals.texture_index_type))]
    pub toon_reference: PmxToonReference,
    #[br(args(globals.text_encoding))]
    pub meta_data: PmxText,
    #[br(
        assert(surface_count >= 0, PmxFormatError::BadCount(surface_count)),
        assert(
            surface_count % 3 == 0,
            PmxFormatError::BadSurfacesCount(surface_count)
        )
    )]
    pub surface_count: i32,
}

#[derive(Debug, Clone, BinRead)]
#[br(import(bone_index_type: PmxIndexType))]
pub struct PmxBoneInheritParent {
    #[br(args(bone_index_type))]
    pub inherit_parent_index: PmxIndex,
    pub inherit_parent_influence: f32,
}

#[derive(Debug, Clone, BinRead)]
pub struct PmxBoneIkLinkLimit {
    pub limit_min: [f32; 3],
    pub limit_max: [f32; 3],
}

#[derive(Debug, Clone, BinRead)]
#[br(import(bone_index_type: PmxIndexType))]
pub struct PmxBoneIkLink {
    #[br(args(bone_index_type))]
    pub bone_index: PmxIndex,
    #[br(map = |flag: u8| flag != 0)]
    pub has_limits: bool,
    #[br(if(has_limits))]
    pub limits: Option<PmxBoneIkLinkLimit>,
}

#[derive(Debug, Clone, BinRead)]
#[br(import(bone_index_type: PmxIndexType))]
pub struct PmxBoneIk {
    #[br(args(bone_index_type))]
    pub target_index: PmxIndex,
    pub loop_count: i32,
    pub limit_radian: f32,
    #[br(assert(link_count >= 0, PmxFormatError::BadCount(link_count)))]
    pub link_count: i32,
    #[br(args { count: link_count as usize, inner: (bone_index_type,) })]
    pub links: Vec<PmxBoneIkLink>,
}

#[derive(Debug, Clone, BinRead)]
#[br(import(globals: PmxGlobals))]
pub struct PmxBone {
    #[br(args(globals.text_encoding))]
    pub bone_name_local: PmxText,
    #[br(args(globals.text_encoding))]
    pub bone_name_universal: PmxText,
    pub position: [f32; 3],
    #[br(args(globals.bone_index_type))]
    pub parent_bone_index: PmxIndex,
    pub layer: i32,
    #[br(map = |bits: [u8; 2]| BoneFlags::from_bytes(bits))]
    pub flags: BoneFlags,
    #[br(if(flags.child_uses_index()), args(globals.bone_index_type))]
    pub tail_index: Option<PmxIndex>,
    #[br(if(!flags.child_uses_index()))]
    pub tail_position: Option<[f32; 3]>,
    #[br(
        if(flags.append_rotate() || flags.append_translate()),
        args(globals.bone_index_type)
    )]
    pub inherit_parent: Option<PmxBoneInheritParent>,
    #[br(if(flags.rotation_axis_fixed()))]
    pub axis_direction: Option<[f32; 3]>,
    #[br(if(flags.use_local_axis()))]
    pub local_coordinate: Option<[[f32; 3]; 2]>,
    #[br(if(flags.receive_external_transform()))]
    pub external_parent_key: Option<i32>,
    #[br(if(flags.has_ik()), args(globals.bone_index_type))]
    pub ik: Option<PmxBoneIk>,
}

#[derive(Debug, Clone, Copy, BinRead, PartialEq, Eq)]
pub enum PmxMorphPanelType {
    #[br(magic = 0u8)]
    Face,
    #[br(magic = 1u8)]
    LeftEye,
    #[br(magic = 2u8)]
    RightEye,
    #[br(magic = 3u8)]
    Mouth,
    #[br(magic = 4u8)]
    Other,
}

#[derive(Debug, Clone, Copy, BinRead, PartialEq, Eq)]
pub enum PmxMorphType {
    #[br(magic = 0u8)]
    Group,
    #[br(magic = 1u8)]
    Vertex,
    #[br(magic = 2u8)]
    Bone,
    #[br(magic = 3u8)]
    Uv,
    #[br(magic = 4u8)]
    UvExt1,
    #[br(magic = 5u8)]
    UvExt2,
    #[br(magic = 6u8)]
    UvExt3,
    #[br(magic = 7u8)]
    UvExt4,
    #[br(magic = 8u8)]
    Material,
    #[br(magic = 9u8)]
    Flip,
    #[br(magic = 10u8)]
    Impulse,
}

#[derive(Debug, Clone, BinRead)]
#[br(import(morph_index_type: PmxIndexType))]
pub struct PmxGroupMorphData {
    #[br(args(morph_index_type))]
    pub morph_index: PmxIndex,
    pub influence: f32,
}

#[derive(Debug, Clone, BinRead)]
#[br(import(vertex_index_type: PmxIndexType))]
pub struct PmxVertexMorphData {
    #[br(args(vertex_index_type))]
    pub vertex_index: PmxVertexIndex,
    pub translation: [f32; 3],
}

#[derive(Debug, Clone, BinRead)]
#[br(import(bone_index_type: PmxIndexType))]
pub struct PmxBoneMorphData {
    #[br(args(bone_index_type))]
    pub bone_index: PmxIndex,
    pub translation: [f32; 3],
    /// Quaternion, `[x, y, z, w]`.
    pub rotation: [f32; 4],
}

#[derive(Debug, Clone, BinRead)]
#[br(import(vertex_index_type: PmxIndexType))]
pub struct PmxUvMorphData {
    #[br(args(vertex_index_type))]
    pub vertex_index: PmxVertexIndex,
    pub floats: [f32; 4],
}

#[derive(Debug, Clone, Copy, BinRead, PartialEq, Eq)]
pub enum PmxMaterialMorphMethod {
    #[br(magic = 0u8)]
    Multiply,
    #[br(magic = 1u8)]
    Additive,
}

#[derive(Debug, Clone, BinRead)]
#[br(import(material_index_type: PmxIndexType))]
pub struct PmxMaterialMorphData {
    #[br(args(material_index_type))]
    pub material_index: PmxIndex,
    pub method: PmxMaterialMorphMethod,
    pub diffuse: [f32; 4],
    pub specular: [f32; 3],
    pub specularity: f32,
    pub ambient: [f32; 3],
    pub edge_color: [f32; 4],
    pub edge_size: f32,
    pub texture_tint: [f32; 4],
    pub environment_tint: [f32; 4],
    pub toon_tint: [f32; 4],
}

#[derive(Debug, Clone, BinRead)]
#[br(import(rigidbody_index_type: PmxIndexType))]
pub struct PmxImpulseMorphData {
    #[br(args(rigidbody_index_type))]
    pub rigidbody_index: PmxIndex,
    #[br(map = |flag: u8| flag != 0)]
    pub local_flag: bool,
    pub movement_speed: [f32; 3],
    pub rotation_torque: [f32; 3],
}

/// Offset list of one morph, the record kind is chosen by the morph type.
#[derive(Debug, Clone)]
pub enum PmxMorphOffsetData {
    Group(Vec<PmxGroupMorphData>),
    Vertex(Vec<PmxVertexMorphData>),
    Bone(Vec<PmxBoneMorphData>),
    Uv(Vec<PmxUvMorphData>),
    Material(Vec<PmxMaterialMorphData>),
    Impulse(Vec<PmxImpulseMorphData>),
}

fn read_records<T>(count: usize, mut read: impl FnMut() -> BinResult<T>) -> BinResult<Vec<T>> {
    (0..count).map(|_| read()).collect()
}

impl BinRead for PmxMorphOffsetData {
    type Args<'a> = (PmxGlobals, PmxMorphType, usize);

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let (globals, morph_type, count) = args;
        Ok(match morph_type {
            PmxMorphType::Group | PmxMorphType::Flip => {
                PmxMorphOffsetData::Group(read_records(count, || {
                    PmxGroupMorphData::read_options(reader, endian, (globals.morph_index_type,))
                })?)
            }
            PmxMorphType::Vertex => PmxMorphOffsetData::Vertex(read_records(count, || {
                PmxVertexMorphData::read_options(reader, endian, (globals.vertex_index_type,))
            })?),
            PmxMorphType::Bone => PmxMorphOffsetData::Bone(read_records(count, || {
                PmxBoneMorphData::read_options(reader, endian, (globals.bone_index_type,))
            })?),
            PmxMorphType::Uv
            | PmxMorphType::UvExt1
            | PmxMorphType::UvExt2
            | PmxMorphType::UvExt3
            | PmxMorphType::UvExt4 => PmxMorphOffsetData::Uv(read_records(count, || {
                PmxUvMorphData::read_options(reader, endian, (globals.vertex_index_type,))
            })?),
            PmxMorphType::Material => PmxMorphOffsetData::Material(read_records(count, || {
                PmxMaterialMorphData::read_options(reader, endian, (globals.material_index_type,))
            })?),
            PmxMorphType::Impulse => PmxMorphOffsetData::Impulse(read_records(count, || {
                PmxImpulseMorphData::read_options(
                    reader,
                    endian,
                    (globals.rigidbody_index_type,),
                )
            })?),
        })
    }
}

#[derive(Debug, Clone, BinRead)]
#[br(import(globals: PmxGlobals))]
pub struct PmxMorph {
    #[br(args(globals.text_encoding))]
    pub morph_name_local: PmxText,
    #[br(args(globals.text_encoding))]
    pub morph_name_universal: PmxText,
    pub panel_type: PmxMorphPanelType,
    pub morph_type: PmxMorphType,
    #[br(assert(offset_size >= 0, PmxFormatError::BadCount(offset_size)))]
    pub offset_size: i32,
    #[br(args(globals, morph_type, offset_size as usize))]
    pub offset_data: PmxMorphOffsetData,
}

#[derive(Debug, Clone, Copy, BinRead, PartialEq, Eq)]
pub enum PmxFrameType {
    #[br(magic = 0u8)]
    Bone,
    #[br(magic = 1u8)]
    Morph,
}

impl PmxFrameType {
    fn index_type(self, globals: &PmxGlobals) -> PmxIndexType {
        match self {
            PmxFrameType::Bone => globals.bone_index_type,
            PmxFrameType::Morph => globals.morph_index_type,
        }
    }
}

#[derive(Debug, Clone, BinRead)]
#[br(import(globals: PmxGlobals))]
pub struct PmxFrameItem {
    pub frame_type: PmxFrameType,
    #[br(args(frame_type.index_type(&globals)))]
    pub index: PmxIndex,
}

#[derive(Debug, Clone, BinRead)]
#[br(import(globals: PmxGlobals))]
pub struct PmxDisplayFrame {
    #[br(args(globals.text_encoding))]
    pub display_name_local: PmxText,
    #[br(args(globals.text_encoding))]
    pub display_name_universal: PmxText,
    #[br(try_map = |num: u8| match num { 0 => Ok(false), 1 => Ok(true), other => Err(PmxFormatError::BadBoolean(other)) })]
    pub special_frame: bool,
    #[br(assert(frame_count >= 0, PmxFormatError::BadCount(frame_count)))]
    pub frame_count: i32,
    #[br(args { count: frame_count as usize, inner: (globals,) })]
    pub frames: Vec<PmxFrameItem>,
}

#[derive(Debug, Clone, Copy, BinRead, PartialEq, Eq)]
pub enum PmxShapeType {
    #[br(magic = 0u8)]
    Sphere,
    #[br(magic = 1u8)]
    Box,
    #[br(magic = 2u8)]
    Capsule,
}

#[derive(Debug, Clone, Copy, BinRead, PartialEq, Eq)]
pub enum PmxPhysicsMode {
    #[br(magic = 0u8)]
    FollowBone,
    #[br(magic = 1u8)]
    Physics,
    #[br(magic = 2u8)]
    PhysicsAndBone,
}

#[derive(Debug, Clone, BinRead)]
#[br(import(globals: PmxGlobals))]
pub struct PmxRigidbody {
    #[br(args(globals.text_encoding))]
    pub rigidbody_name_local: PmxText,
    #[br(args(globals.text_encoding))]
    pub rigidbody_name_universal: PmxText,
    #[br(args(globals.bone_index_type))]
    pub related_bone_index: PmxIndex,
    pub group_id: u8,
    pub no_collision_group: u16,
    pub shape: PmxShapeType,
    pub shape_size: [f32; 3],
    pub shape_position: [f32; 3],
    pub shape_rotation: [f32; 3],
    pub mass: f32,
    pub move_attenuation: f32,
    pub rotation_damping: f32,
    pub repulsion: f32,
    pub friction_force: f32,
    pub physics_mode: PmxPhysicsMode,
}

#[derive(Debug, Clone, Copy, BinRead, PartialEq, Eq)]
pub enum PmxJointType {
    #[br(magic = 0u8)]
    Spring6dof,
    #[br(magic = 1u8)]
    SixDof,
    #[br(magic = 2u8)]
    P2p,
    #[br(magic = 3u8)]
    ConeTwist,
    #[br(magic = 4u8)]
    Slider,
    #[br(magic = 5u8)]
    Hinge,
}

#[derive(Debug, Clone, BinRead)]
#[br(import(globals: PmxGlobals))]
pub struct PmxJoint {
    #[br(args(globals.text_encoding))]
    pub joint_name_local: PmxText,
    #[br(args(globals.text_encoding))]
    pub joint_name_universal: PmxText,
    #[br(assert(
        joint_type == PmxJointType::Spring6dof,
        PmxFormatError::UnsupportedJoint(joint_type)
    ))]
    pub joint_type: PmxJointType,
    #[br(args(globals.rigidbody_index_type))]
    pub rigidbody_index_a: PmxIndex,
    #[br(args(globals.rigidbody_index_type))]
    pub rigidbody_index_b: PmxIndex,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub position_minimum: [f32; 3],
    pub position_maximum: [f32; 3],
    pub rotation_minimum: [f32; 3],
    pub rotation_maximum: [f32; 3],
    pub position_spring: [f32; 3],
    pub rotation_spring: [f32; 3],
}

#[derive(Debug, Clone, BinRead)]
#[br(little, magic = b"PMX ")]
pub struct PmxFile {
    #[br(assert(
        (version - SUPPORTED_VERSION).abs() <= VERSION_TOLERANCE,
        PmxFormatError::UnsupportedVersion(version)
    ))]
    pub version: f32,
    pub header: PmxFileHeader,
    #[br(assert(vertex_count >= 0, PmxFormatError::BadCount(vertex_count)))]
    pub vertex_count: i32,
    #[br(args { count: vertex_count as usize, inner: (header.globals,) })]
    pub vertices: Vec<PmxVertex>,
    #[br(
        assert(surfaces_count >= 0, PmxFormatError::BadCount(surfaces_count)),
        assert(
            surfaces_count % 3 == 0,
            PmxFormatError::BadSurfacesCount(surfaces_count)
        )
    )]
    pub surfaces_count: i32,
    #[br(args { count: surfaces_count as usize, inner: (header.globals.vertex_index_type,) })]
    pub surfaces: Vec<PmxVertexIndex>,
    #[br(assert(textures_count >= 0, PmxFormatError::BadCount(textures_count)))]
    pub textures_count: i32,
    #[br(args { count: textures_count as usize, inner: (header.globals.text_encoding,) })]
    pub textures: Vec<PmxText>,
    #[br(assert(material_count >= 0, PmxFormatError::BadCount(material_count)))]
    pub material_count: i32,
    #[br(args { count: material_count as usize, inner: (header.globals,) })]
    pub materials: Vec<PmxMaterial>,
    #[br(assert(bones_count >= 0, PmxFormatError::BadCount(bones_count)))]
    pub bones_count: i32,
    #[br(args { count: bones_count as usize, inner: (header.globals,) })]
    pub bones: Vec<PmxBone>,
    #[br(assert(morphs_count >= 0, PmxFormatError::BadCount(morphs_count)))]
    pub morphs_count: i32,
    #[br(args { count: morphs_count as usize, inner: (header.globals,) })]
    pub morphs: Vec<PmxMorph>,
    #[br(assert(display_frame_count >= 0, PmxFormatError::BadCount(display_frame_count)))]
    pub display_frame_count: i32,
    #[br(args { count: display_frame_count as usize, inner: (header.globals,) })]
    pub display_frames: Vec<PmxDisplayFrame>,
    #[br(assert(rigidbodies_count >= 0, PmxFormatError::BadCount(rigidbodies_count)))]
    pub rigidbodies_count: i32,
    #[br(args { count: rigidbodies_count as usize, inner: (header.globals,) })]
    pub rigidbodies: Vec<PmxRigidbody>,
    #[br(assert(joint_count >= 0, PmxFormatError::BadCount(joint_count)))]
    pub joint_count: i32,
    #[br(args { count: joint_count as usize, inner: (header.globals,) })]
    pub joints: Vec<PmxJoint>,
}
