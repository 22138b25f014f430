use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    io::{self, Read, Seek},
    path::{Path, PathBuf},
};

use zip::ZipArchive;

use super::Archive;

#[derive(Debug)]
pub enum ZipError {
    Zip(zip::result::ZipError),
    BadFileName(PathBuf),
    FileTooLarge(u64),
}

impl Display for ZipError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ZipError::Zip(error) => Display::fmt(error, f),
            ZipError::BadFileName(file_name) => {
                write!(f, "File name {} is not valid Unicode", file_name.display())
            }
            ZipError::FileTooLarge(size) => write!(f, "File size {} is too large", size),
        }
    }
}

impl Error for ZipError {}

impl From<zip::result::ZipError> for ZipError {
    fn from(value: zip::result::ZipError) -> Self {
        Self::Zip(value)
    }
}

impl From<io::Error> for ZipError {
    fn from(value: io::Error) -> Self {
        Self::Zip(zip::result::ZipError::Io(value))
    }
}

fn unpack<R: Read>(entry: &mut R, file_size: u64) -> Result<Vec<u8>, ZipError> {
    let capacity: usize = file_size
        .try_into()
        .map_err(|_| ZipError::FileTooLarge(file_size))?;
    let mut buffer = Vec::with_capacity(capacity);
    entry.read_to_end(&mut buffer)?;
    Ok(buffer)
}

impl<T: Read + Seek> Archive<T> for ZipArchive<T> {
    type Error = ZipError;

    fn new(stream: T) -> Result<Self, Self::Error> {
        Ok(ZipArchive::new(stream)?)
    }

    fn by_path<P: AsRef<Path>>(&mut self, name: P) -> Result<Option<Vec<u8>>, Self::Error> {
        let name = name
            .as_ref()
            .as_os_str()
            .to_str()
            .ok_or_else(|| ZipError::BadFileName(name.as_ref().to_path_buf()))?;
        match self.by_name(name) {
            Ok(mut entry) => {
                let file_size = entry.size();
                unpack(&mut entry, file_size).map(Some)
            }
            Err(zip::result::ZipError::FileNotFound) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }
}
