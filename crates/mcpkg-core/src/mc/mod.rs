//! Registry and domain entities: providers, loaders, version families and
//! the `Mc` registry that ties them together with a current selection.

pub mod global;
pub mod loader;
pub mod provider;
pub mod registry;
pub mod version;

pub use global::{global, global_init, global_shutdown};
pub use loader::{Loader, LoaderFlags, LoaderId, LoaderOps};
pub use provider::{BaseUrl, Provider, ProviderFlags, ProviderId, ProviderOps};
pub use registry::{Mc, McFlags, DEFAULT_MC_VERSION};
pub use version::{Codename, VersionFamily};
