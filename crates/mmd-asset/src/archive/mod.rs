use std::{
    error::Error,
    io::{Read, Seek},
    path::Path,
};

#[cfg(feature = "zip")]
pub mod zip;

/// A bundle of files, such as a model distributed together with its textures.
pub trait Archive<T>: Sized {
    type Error: Error + Send + Sync + 'static;

    fn new(stream: T) -> Result<Self, Self::Error>
    where
        T: Read + Seek;

    /// Unpacks the file at `path`, or returns `None` if the bundle has no such file.
    fn by_path<P: AsRef<Path>>(&mut self, path: P) -> Result<Option<Vec<u8>>, Self::Error>;
}
