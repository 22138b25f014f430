use glam::Vec3;
use modular_bitfield::prelude::*;

#[bitfield]
#[derive(Debug, Clone, Copy)]
pub struct BoneFlags {
    pub child_uses_index: bool,
    pub rotatable: bool,
    pub movable: bool,
    pub visible: bool,
    pub controllable: bool,
    pub has_ik: bool,
    #[skip]
    __: B1,
    pub append_local: bool,
    pub append_rotate: bool,
    pub append_translate: bool,
    pub rotation_axis_fixed: bool,
    pub use_local_axis: bool,
    pub post_physics: bool,
    pub receive_external_transform: bool,
    #[skip]
    __: B2,
}

/// Where the bone points to, used for display and for IK chain direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoneConnection {
    Bone(Option<usize>),
    Offset(Vec3),
}

/// Rotation and/or translation inherited from another bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppendTransform {
    pub bone: Option<usize>,
    pub ratio: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalAxes {
    pub x: Vec3,
    pub y: Vec3,
    pub z: Vec3,
}

impl LocalAxes {
    /// Builds an orthonormal basis from the X and Z axes stored in the file.
    ///
    /// Only X keeps its direction: Y is derived as `Z × X` and Z is then
    /// corrected to `X × Y`.
    pub fn from_raw(x: Vec3, z: Vec3) -> Self {
        let y = z.cross(x).normalize_or_zero();
        let z = x.cross(y).normalize_or_zero();
        Self {
            x: x.normalize_or_zero(),
            y,
            z,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IkAngleLimit {
    pub min: Vec3,
    pub max: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IkLink {
    pub bone: Option<usize>,
    pub limit: Option<IkAngleLimit>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ik {
    pub target: Option<usize>,
    pub iterations: i32,
    /// Maximum rotation per iteration, in radians.
    pub angle_limit: f32,
    pub links: Vec<IkLink>,
}

#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    pub name_en: String,
    pub position: Vec3,
    /// `None` for root bones and for parent indices outside the bone table.
    pub parent: Option<usize>,
    /// Bones are updated in ascending transform level order.
    pub transform_level: i32,
    pub flags: BoneFlags,
    pub connection: BoneConnection,
    pub append: Option<AppendTransform>,
    pub fixed_axis: Option<Vec3>,
    pub local_axes: Option<LocalAxes>,
    pub external_parent_key: Option<i32>,
    pub ik: Option<Ik>,
}
