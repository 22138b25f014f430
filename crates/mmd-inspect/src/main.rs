//! mmd-inspect - print the content of a PMX model or model bundle

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use log::error;
use mmd_asset::{
    bone::BoneConnection,
    loader::{load_path, AssetLoadParams},
    material::ToonReference,
    model::ModelAsset,
    morph::MorphOffsets,
};

#[derive(Parser)]
#[command(name = "mmd-inspect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Model file (.pmx) or bundle (.zip)
    path: PathBuf,

    /// Name of the model file inside a bundle
    #[arg(long, default_value = "model")]
    model_name: String,

    /// Use the model name as is, without appending ".pmx"
    #[arg(long)]
    no_extension: bool,

    /// Print every entry of a section
    #[arg(long, value_parser = ["textures", "materials", "bones", "morphs", "frames", "physics"])]
    list: Vec<String>,
}

fn print_summary(model: &ModelAsset) {
    println!("Name:      {}", model.info.name);
    if !model.info.name_en.is_empty() {
        println!("Name (en): {}", model.info.name_en);
    }
    for line in model.info.comment.lines() {
        println!("  | {}", line);
    }
    println!(
        "Encoding: {:?}, additional UV: {}, vertex index bytes: {}",
        model.config.text_encoding,
        model.config.additional_uv_count,
        model.config.vertex_index_width.bytes()
    );
    println!("Vertices:       {}", model.vertices.len());
    println!("Faces:          {}", model.faces.len());
    println!("Textures:       {}", model.textures.len());
    println!("Materials:      {}", model.materials.len());
    println!("Bones:          {}", model.bones.len());
    println!("Morphs:         {}", model.morphs.len());
    println!("Display frames: {}", model.display_frames.len());
    println!("Rigid bodies:   {}", model.rigid_bodies.len());
    println!("Joints:         {}", model.joints.len());
}

fn print_materials(model: &ModelAsset) {
    for (index, material) in model.materials.iter().enumerate() {
        let texture = material
            .texture
            .and_then(|texture| model.texture_path(texture))
            .unwrap_or("-");
        let toon = match material.toon {
            ToonReference::None => String::from("-"),
            ToonReference::Shared { .. } => material
                .toon
                .shared_texture_name()
                .unwrap_or("-")
                .to_string(),
            ToonReference::Texture(texture) => {
                model.texture_path(texture).unwrap_or("-").to_string()
            }
        };
        println!(
            "{:4} {} faces={} texture={} toon={}",
            index,
            material.name,
            material.triangles().len(),
            texture,
            toon
        );
    }
}

fn print_bones(model: &ModelAsset) {
    for (index, bone) in model.bones.iter().enumerate() {
        let parent = bone
            .parent
            .and_then(|parent| model.bones.get(parent))
            .map_or("-", |parent| parent.name.as_str());
        let tail = match bone.connection {
            BoneConnection::Bone(Some(tail)) => format!("bone {}", tail),
            BoneConnection::Bone(None) => String::from("-"),
            BoneConnection::Offset(offset) => format!("{:?}", offset.to_array()),
        };
        let ik = bone
            .ik
            .as_ref()
            .map(|ik| format!(" ik(links={})", ik.links.len()))
            .unwrap_or_default();
        println!(
            "{:4} {} parent={} level={} tail={}{}",
            index, bone.name, parent, bone.transform_level, tail, ik
        );
    }
}

fn print_morphs(model: &ModelAsset) {
    for (index, morph) in model.morphs.iter().enumerate() {
        let kind = match morph.offsets {
            MorphOffsets::Group(_) => "group",
            MorphOffsets::Vertex(_) => "vertex",
            MorphOffsets::Bone(_) => "bone",
            MorphOffsets::Uv(_) => "uv",
            MorphOffsets::Material(_) => "material",
            MorphOffsets::Impulse(_) => "impulse",
        };
        let channel = morph
            .morph_type
            .uv_channel()
            .map(|channel| format!(" uv{}", channel))
            .unwrap_or_default();
        println!(
            "{:4} {} {:?} {:?} {}x{}{}",
            index,
            morph.name,
            morph.category,
            morph.morph_type,
            morph.offsets.len(),
            kind,
            channel
        );
    }
}

fn print_list(model: &ModelAsset, section: &str) {
    println!();
    match section {
        "textures" => {
            for (index, texture) in model.textures.iter().enumerate() {
                println!("{:4} {}", index, texture);
            }
        }
        "materials" => print_materials(model),
        "bones" => print_bones(model),
        "morphs" => print_morphs(model),
        "frames" => {
            for frame in &model.display_frames {
                println!("{} ({} elements)", frame.name, frame.elements.len());
            }
        }
        "physics" => {
            for body in &model.rigid_bodies {
                println!("{} {:?} {:?}", body.name, body.shape, body.mode);
            }
            for joint in &model.joints {
                println!("{} {:?}", joint.name, joint.rigid_bodies);
            }
        }
        _ => unreachable!(),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let params = AssetLoadParams {
        bundle_model_name: cli.model_name,
        bundle_model_extension: !cli.no_extension,
    };

    match load_path(&cli.path, &params) {
        Ok(model) => {
            print_summary(&model);
            for section in &cli.list {
                print_list(&model, section);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Failed to load {}: {}", cli.path.display(), err);
            ExitCode::FAILURE
        }
    }
}
