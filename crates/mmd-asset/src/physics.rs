use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigidBodyShape {
    Sphere,
    Box,
    Capsule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigidBodyMode {
    /// Follows the related bone.
    Kinematic,
    /// Simulated, drives the related bone.
    Dynamic,
    /// Simulated rotation, position snapped to the related bone.
    DynamicWithBone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    pub name: String,
    pub name_en: String,
    pub bone: Option<usize>,
    pub group: u8,
    /// Bit `n` set means no collision with group `n`.
    pub non_collision_mask: u16,
    pub shape: RigidBodyShape,
    pub size: Vec3,
    pub position: Vec3,
    /// Euler angles in radians.
    pub rotation: Vec3,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub restitution: f32,
    pub friction: f32,
    pub mode: RigidBodyMode,
}

/// 6-DOF spring constraint between two rigid bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    pub name_en: String,
    pub rigid_bodies: [Option<usize>; 2],
    pub position: Vec3,
    pub rotation: Vec3,
    pub position_min: Vec3,
    pub position_max: Vec3,
    pub rotation_min: Vec3,
    pub rotation_max: Vec3,
    pub position_spring: Vec3,
    pub rotation_spring: Vec3,
}
