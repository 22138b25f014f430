//! Decoder for PMX 2.0 models, the character format of MikuMikuDance.
//!
//! [`loader::pmx::decode`] turns the bytes of a `.pmx` file into a
//! [`model::ModelAsset`]. [`loader::load_path`] also accepts model bundles
//! packed as zip files.

pub mod archive;
pub mod bone;
pub mod display;
pub mod loader;
pub mod material;
pub mod model;
pub mod morph;
pub mod physics;
pub mod vertex;
