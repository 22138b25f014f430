use std::{ffi::OsStr, fs::File, io::BufReader, path::Path};

use log::info;

use crate::model::ModelAsset;

/// PMX 2.0 loader.
pub mod pmx;

use pmx::PmxError;

#[derive(Debug, Clone)]
pub struct AssetLoadParams {
    /// File name of the model inside a bundle.
    pub bundle_model_name: String,
    /// Append the format extension to `bundle_model_name`.
    pub bundle_model_extension: bool,
}

impl Default for AssetLoadParams {
    fn default() -> Self {
        Self {
            bundle_model_name: String::from("model"),
            bundle_model_extension: true,
        }
    }
}

impl AssetLoadParams {
    pub fn bundle_model_filename(&self, extension: &str) -> String {
        if self.bundle_model_extension {
            format!("{}.{}", self.bundle_model_name, extension)
        } else {
            self.bundle_model_name.clone()
        }
    }
}

/// Loads a model file, picking the decoder from the file extension.
///
/// `.pmx` files are decoded directly. With the `zip` feature, `.zip` bundles
/// are searched for the model file named by `params`.
pub fn load_path<P: AsRef<Path>>(
    path: P,
    params: &AssetLoadParams,
) -> Result<ModelAsset, PmxError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);
    info!("Loading model {}", path.display());
    match extension.as_deref() {
        Some("pmx") => {
            let mut reader = BufReader::new(File::open(path)?);
            pmx::read(&mut reader)
        }
        Some("pmd") => Err(PmxError::UnsupportedFeature {
            pos: None,
            feature: String::from("PMD model"),
        }),
        #[cfg(feature = "zip")]
        Some("zip") => {
            use crate::archive::Archive;

            let reader = BufReader::new(File::open(path)?);
            let mut bundle: zip::ZipArchive<_> =
                Archive::new(reader).map_err(|err| PmxError::Archive(Box::new(err)))?;
            pmx::load_bundle(&mut bundle, params)
        }
        extension => Err(PmxError::UnsupportedFeature {
            pos: None,
            feature: format!("file extension {:?}", extension.unwrap_or_default()),
        }),
    }
}
