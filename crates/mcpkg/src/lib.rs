//! Facade crate: the registry/selection model and codec from `mcpkg-core`,
//! plus the network downloader from `mcpkg-net` behind the `net` feature
//! (on by default).

pub use mcpkg_core::*;

#[cfg(feature = "net")]
pub use mcpkg_net as net;
