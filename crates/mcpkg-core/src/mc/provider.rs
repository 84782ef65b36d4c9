use std::borrow::Cow;

use bitflags::bitflags;

use crate::error::{McError, McpMpError};
use crate::mp::{Reader, Tag, Writer};

bitflags! {
    /// Advisory capability flags for a provider, read-only metadata about
    /// what the provider's API can do; not an access-control mechanism.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ProviderFlags: u32 {
        const ONLINE_REQUIRED = 1 << 0;
        const HAS_API          = 1 << 1;
        const PROVIDES_INDEX   = 1 << 2;
        const SUPPORTS_CLIENT  = 1 << 3;
        const SUPPORTS_SERVER  = 1 << 4;
        const SIGNED_METADATA  = 1 << 5;
    }
}

/// Stable numeric identity for a mod provider, kept as-is across wire
/// versions so packed data never needs renumbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Modrinth,
    CurseForge,
    Hangar,
    Local,
    Unknown,
}

impl ProviderId {
    fn to_wire(self) -> i32 {
        match self {
            ProviderId::Modrinth => 1,
            ProviderId::CurseForge => 2,
            ProviderId::Hangar => 3,
            ProviderId::Local => 4,
            ProviderId::Unknown => 0x7fff,
        }
    }

    fn from_wire(v: i32) -> Self {
        match v {
            1 => ProviderId::Modrinth,
            2 => ProviderId::CurseForge,
            3 => ProviderId::Hangar,
            4 => ProviderId::Local,
            _ => ProviderId::Unknown,
        }
    }
}

/// Either a compiled-in base URL or one the caller supplied at runtime.
///
/// This replaces the C struct's `base_url` raw pointer plus `owns_base_url`
/// flag: the two states ("points at a string literal" vs "points at a
/// heap-owned duplicate") become two variants of one type instead of a
/// pointer/flag pair a caller could desynchronize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseUrl {
    Static(&'static str),
    Owned(String),
}

impl BaseUrl {
    pub fn as_str(&self) -> &str {
        match self {
            BaseUrl::Static(s) => s,
            BaseUrl::Owned(s) => s,
        }
    }
}

/// Capabilities a provider implementation may supply beyond the built-in
/// template data. Built-in providers install none (`ops: None`), matching
/// the template table's `ops == NULL`.
pub trait ProviderOps: std::fmt::Debug {
    fn is_online(&self) -> Result<bool, McError> {
        Ok(false)
    }

    fn resolve_download_url(&self, project: &str, version: &str) -> Result<String, McError> {
        let _ = (project, version);
        Err(McError::Unsupported("resolve_download_url".into()))
    }

    fn fetch_packages_index(
        &self,
        mc_version: &str,
        loader: &str,
        dest_path: &std::path::Path,
    ) -> Result<(), McError> {
        let _ = (mc_version, loader, dest_path);
        Err(McError::Unsupported("fetch_packages_index".into()))
    }
}

#[derive(Debug)]
pub struct Provider {
    pub id: ProviderId,
    pub name: Cow<'static, str>,
    pub base_url: Option<BaseUrl>,
    pub online: bool,
    pub flags: ProviderFlags,
    pub ops: Option<Box<dyn ProviderOps + Send + Sync>>,
}

struct ProviderTemplate {
    id: ProviderId,
    name: &'static str,
    base_url: Option<&'static str>,
    online: bool,
    flags: ProviderFlags,
}

const PROVIDER_TABLE: &[ProviderTemplate] = &[
    ProviderTemplate {
        id: ProviderId::Modrinth,
        name: "modrinth",
        base_url: Some("https://api.modrinth.com"),
        online: true,
        flags: ProviderFlags::from_bits_truncate(
            ProviderFlags::ONLINE_REQUIRED.bits()
                | ProviderFlags::HAS_API.bits()
                | ProviderFlags::PROVIDES_INDEX.bits()
                | ProviderFlags::SUPPORTS_CLIENT.bits()
                | ProviderFlags::SUPPORTS_SERVER.bits(),
        ),
    },
    ProviderTemplate {
        id: ProviderId::CurseForge,
        name: "curseforge",
        base_url: Some("https://api.curseforge.com"),
        online: true,
        flags: ProviderFlags::from_bits_truncate(
            ProviderFlags::ONLINE_REQUIRED.bits()
                | ProviderFlags::HAS_API.bits()
                | ProviderFlags::PROVIDES_INDEX.bits()
                | ProviderFlags::SUPPORTS_CLIENT.bits()
                | ProviderFlags::SUPPORTS_SERVER.bits(),
        ),
    },
    ProviderTemplate {
        id: ProviderId::Hangar,
        name: "hangar",
        base_url: Some("https://hangar.papermc.io"),
        online: true,
        flags: ProviderFlags::from_bits_truncate(
            ProviderFlags::ONLINE_REQUIRED.bits()
                | ProviderFlags::HAS_API.bits()
                | ProviderFlags::SUPPORTS_SERVER.bits(),
        ),
    },
    ProviderTemplate {
        id: ProviderId::Local,
        name: "local",
        base_url: None,
        online: true,
        flags: ProviderFlags::from_bits_truncate(
            ProviderFlags::PROVIDES_INDEX.bits()
                | ProviderFlags::SUPPORTS_CLIENT.bits()
                | ProviderFlags::SUPPORTS_SERVER.bits(),
        ),
    },
];

fn find_template(id: ProviderId) -> Option<&'static ProviderTemplate> {
    PROVIDER_TABLE.iter().find(|t| t.id == id)
}

fn find_template_by_name(name: &str) -> Option<&'static ProviderTemplate> {
    PROVIDER_TABLE
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
}

impl Provider {
    /// Build a provider from its built-in template, or an `Unknown`
    /// provider with no capabilities if `id` has no template.
    pub fn make(id: ProviderId) -> Self {
        match find_template(id) {
            Some(t) => Provider {
                id: t.id,
                name: Cow::Borrowed(t.name),
                base_url: t.base_url.map(BaseUrl::Static),
                online: t.online,
                flags: t.flags,
                ops: None,
            },
            None => Provider {
                id: ProviderId::Unknown,
                name: Cow::Borrowed("unknown"),
                base_url: None,
                online: false,
                flags: ProviderFlags::empty(),
                ops: None,
            },
        }
    }

    pub fn from_name(name: &str) -> Self {
        match find_template_by_name(name) {
            Some(t) => Self::make(t.id),
            None => Self::make(ProviderId::Unknown),
        }
    }

    pub fn table() -> impl Iterator<Item = ProviderId> {
        PROVIDER_TABLE.iter().map(|t| t.id)
    }

    pub fn is_known(id: ProviderId) -> bool {
        find_template(id).is_some()
    }

    pub fn requires_network(&self) -> bool {
        self.flags.contains(ProviderFlags::ONLINE_REQUIRED)
    }

    pub fn is_online(&self) -> Result<bool, McError> {
        if let Some(ops) = &self.ops {
            return ops.is_online();
        }
        Ok(self.online)
    }

    pub fn set_base_url(&mut self, base_url: Option<String>) {
        self.base_url = base_url.map(BaseUrl::Owned);
    }

    pub fn write(&self, w: &mut Writer) -> Result<(), McpMpError> {
        w.map_begin(7)?;
        w.write_header(Tag::Provider.as_str(), Tag::Provider.version())?;
        w.kv_i32(2, self.id.to_wire())?;
        w.kv_str(3, &self.name)?;
        match &self.base_url {
            Some(u) => w.kv_str(4, u.as_str())?,
            None => w.kv_nil(4)?,
        }
        w.kv_i32(5, if self.online { 1 } else { 0 })?;
        w.kv_u32(6, self.flags.bits())?;
        Ok(())
    }

    /// Rebuilds from the built-in template for `id`, then overlays the
    /// wire's `base_url`/`online`/`flags`. The wire's `name` field is kept
    /// only as an advisory hint and is otherwise ignored, exactly as the
    /// original reader documents it.
    pub fn read(r: &Reader) -> Result<Self, McpMpError> {
        let version = r.expect_tag(Tag::Provider.as_str())?;
        if version < 1 {
            return Err(McpMpError::Parse("provider version must be >= 1".into()));
        }
        let id_wire = r
            .get_i64(2)?
            .ok_or_else(|| McpMpError::Parse("missing provider id".into()))?;
        let id = ProviderId::from_wire(id_wire as i32);

        let base_url = r.get_str_borrow(4)?.map(|s| s.to_owned());
        let online = r.get_i64(5)?.map(|v| v != 0).unwrap_or(false);
        let flags = r
            .get_u32(6)?
            .map(ProviderFlags::from_bits_truncate)
            .unwrap_or_else(ProviderFlags::empty);

        let mut out = Self::make(id);
        if let Some(u) = base_url {
            out.base_url = Some(BaseUrl::Owned(u));
        }
        out.online = online;
        out.flags = flags;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_name_maps_to_unknown_provider() {
        let p = Provider::from_name("not-a-real-provider");
        assert_eq!(p.id, ProviderId::Unknown);
    }

    #[test]
    fn built_in_templates_are_online_by_default() {
        for id in [
            ProviderId::Modrinth,
            ProviderId::CurseForge,
            ProviderId::Hangar,
            ProviderId::Local,
        ] {
            assert!(Provider::make(id).online, "{id:?} should be online");
        }
    }

    #[test]
    fn known_providers_are_known() {
        for id in [
            ProviderId::Modrinth,
            ProviderId::CurseForge,
            ProviderId::Hangar,
            ProviderId::Local,
        ] {
            assert!(Provider::is_known(id));
        }
        assert!(!Provider::is_known(ProviderId::Unknown));
    }

    #[test]
    fn round_trip_keeps_identity_and_drops_stale_name() {
        let mut p = Provider::make(ProviderId::Modrinth);
        p.online = true;
        p.set_base_url(Some("https://mirror.example".into()));

        let mut w = Writer::new();
        p.write(&mut w).unwrap();
        let bytes = w.finish();

        let r = Reader::new(&bytes).unwrap();
        let back = Provider::read(&r).unwrap();
        assert_eq!(back.id, ProviderId::Modrinth);
        assert!(back.online);
        assert_eq!(
            back.base_url.as_ref().map(BaseUrl::as_str),
            Some("https://mirror.example")
        );
        assert_eq!(back.name, "modrinth");
    }

    #[test]
    fn local_provider_has_no_base_url() {
        let p = Provider::make(ProviderId::Local);
        assert!(p.base_url.is_none());
        assert!(!p.requires_network());
    }
}
