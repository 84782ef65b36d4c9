//! Registry, domain model and tagged MessagePack codec for Minecraft mod
//! package metadata: providers, loaders, version families and content
//! digests, plus the `Mc` registry that tracks a current selection of each.

pub mod container;
pub mod digest;
pub mod env;
pub mod error;
pub mod mc;
pub mod mp;

pub use digest::{Algo, Digest};
pub use error::{McError, McpMpError};
pub use mc::{global, global_init, global_shutdown, Loader, LoaderId, Mc, Provider, ProviderId, VersionFamily};

#[cfg(test)]
mod tests;
