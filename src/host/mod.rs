//! Host collaborators: local filesystem, environment expansion, binary metadata.

pub mod env;
pub mod fs;
pub mod version;

pub use env::{Environment, FixedEnvironment, SystemEnvironment};
pub use fs::{FileSystem, LocalFileSystem};
