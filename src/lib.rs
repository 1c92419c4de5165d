//! PHP runtime configuration manager.
//!
//! - `ini`: lossless php.ini editing (directives and extensions)
//! - `server`: handler mappings, FastCGI applications and scope inheritance
//!   over a pluggable `ConfigurationStore`
//! - `registrar`: registering an interpreter with the web server and
//!   managing the active one's settings
//!
//! Host access (files, environment variables) goes through the traits in
//! `host`, so every component can run against a temporary directory.

pub mod config;
pub mod error;
pub mod host;
pub mod ini;
pub mod registrar;
pub mod server;

pub use config::ManagerConfig;
pub use error::{ErrorKind, ManagerError, Result};
pub use ini::IniDocument;
pub use registrar::{FastCgiRegistrar, Registration, RegistrationError, RegistrationStage};
pub use server::{ConfigurationStore, HandlerRegistry, Scope};
