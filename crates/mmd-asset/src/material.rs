use std::ops::Range;

use glam::{Vec3, Vec4};
use modular_bitfield::prelude::*;

/// Built-in toon textures shipped with MikuMikuDance, addressed by shared
/// slot `1..=10`. Slot 0 means no toon texture.
pub const SHARED_TOON_TEXTURES: [&str; 10] = [
    "toon01.bmp",
    "toon02.bmp",
    "toon03.bmp",
    "toon04.bmp",
    "toon05.bmp",
    "toon06.bmp",
    "toon07.bmp",
    "toon08.bmp",
    "toon09.bmp",
    "toon10.bmp",
];

#[bitfield]
#[derive(Debug, Clone, Copy)]
pub struct DrawFlags {
    pub double_sided: bool,
    pub ground_shadow: bool,
    pub cast_self_shadow: bool,
    pub receive_self_shadow: bool,
    pub draw_edge: bool,
    reserved: B3,
}

impl DrawFlags {
    /// PMX 2.0 only defines the lower five bits.
    pub(crate) fn is_modeled(&self) -> bool {
        self.reserved() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SphereBlendMode {
    Disabled,
    Multiply,
    Additive,
    SubTexture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToonReference {
    None,
    /// One of [`SHARED_TOON_TEXTURES`], `slot` is in `1..=10`.
    Shared { slot: u8 },
    /// Index into the model's texture table.
    Texture(usize),
}

impl ToonReference {
    pub fn from_shared_slot(slot: u8) -> Self {
        if slot == 0 || usize::from(slot) > SHARED_TOON_TEXTURES.len() {
            ToonReference::None
        } else {
            ToonReference::Shared { slot }
        }
    }

    pub fn shared_texture_name(&self) -> Option<&'static str> {
        match *self {
            ToonReference::Shared { slot } => {
                SHARED_TOON_TEXTURES.get(usize::from(slot).checked_sub(1)?).copied()
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub name_en: String,
    pub diffuse_color: Vec4,
    pub specular_color: Vec3,
    pub specular_power: f32,
    pub ambient_color: Vec3,
    pub draw_flags: DrawFlags,
    pub edge_color: Vec4,
    pub edge_size: f32,
    pub texture: Option<usize>,
    pub sphere_texture: Option<usize>,
    pub sphere_blend_mode: SphereBlendMode,
    pub toon: ToonReference,
    pub memo: String,
    /// First triangle index of this material in the shared face array.
    pub surface_offset: usize,
    /// Number of triangle indices (three per face) drawn with this material.
    pub surface_count: usize,
}

impl Material {
    /// Range of faces drawn with this material.
    pub fn triangles(&self) -> Range<usize> {
        self.surface_offset / 3..(self.surface_offset + self.surface_count) / 3
    }
}
