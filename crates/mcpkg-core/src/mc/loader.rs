use std::borrow::Cow;

use bitflags::bitflags;

use crate::error::McpMpError;
use crate::mp::{Reader, Tag, Writer};

use super::provider::BaseUrl;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LoaderFlags: u32 {
        const SUPPORTS_CLIENT = 1 << 0;
        const SUPPORTS_SERVER = 1 << 1;
        const HAS_API          = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoaderId {
    Unknown,
    Vanilla,
    Forge,
    Fabric,
    Quilt,
    Paper,
    Purpur,
    Velocity,
}

impl LoaderId {
    fn to_wire(self) -> i32 {
        match self {
            LoaderId::Unknown => 0,
            LoaderId::Vanilla => 1,
            LoaderId::Forge => 2,
            LoaderId::Fabric => 3,
            LoaderId::Quilt => 4,
            LoaderId::Paper => 5,
            LoaderId::Purpur => 6,
            LoaderId::Velocity => 7,
        }
    }

    fn from_wire(v: i32) -> Self {
        match v {
            1 => LoaderId::Vanilla,
            2 => LoaderId::Forge,
            3 => LoaderId::Fabric,
            4 => LoaderId::Quilt,
            5 => LoaderId::Paper,
            6 => LoaderId::Purpur,
            7 => LoaderId::Velocity,
            _ => LoaderId::Unknown,
        }
    }
}

/// Loaders have no runtime default for online/offline behavior the way
/// providers do; any status check not backed by [`LoaderOps`] is reported
/// online, matching the C template's "no cached online field" comment.
pub trait LoaderOps: std::fmt::Debug {
    fn is_online(&self) -> bool {
        true
    }
}

#[derive(Debug)]
pub struct Loader {
    pub id: LoaderId,
    pub name: Cow<'static, str>,
    pub base_url: Option<BaseUrl>,
    pub flags: LoaderFlags,
    pub ops: Option<Box<dyn LoaderOps + Send + Sync>>,
}

struct LoaderTemplate {
    id: LoaderId,
    name: &'static str,
    flags: LoaderFlags,
}

const LOADER_TABLE: &[LoaderTemplate] = &[
    LoaderTemplate {
        id: LoaderId::Vanilla,
        name: "vanilla",
        flags: LoaderFlags::from_bits_truncate(
            LoaderFlags::SUPPORTS_CLIENT.bits() | LoaderFlags::SUPPORTS_SERVER.bits(),
        ),
    },
    LoaderTemplate {
        id: LoaderId::Forge,
        name: "forge",
        flags: LoaderFlags::from_bits_truncate(
            LoaderFlags::SUPPORTS_CLIENT.bits() | LoaderFlags::SUPPORTS_SERVER.bits(),
        ),
    },
    LoaderTemplate {
        id: LoaderId::Fabric,
        name: "fabric",
        flags: LoaderFlags::from_bits_truncate(
            LoaderFlags::SUPPORTS_CLIENT.bits() | LoaderFlags::SUPPORTS_SERVER.bits(),
        ),
    },
    LoaderTemplate {
        id: LoaderId::Quilt,
        name: "quilt",
        flags: LoaderFlags::from_bits_truncate(
            LoaderFlags::SUPPORTS_CLIENT.bits() | LoaderFlags::SUPPORTS_SERVER.bits(),
        ),
    },
    LoaderTemplate {
        id: LoaderId::Paper,
        name: "paper",
        flags: LoaderFlags::from_bits_truncate(
            LoaderFlags::SUPPORTS_SERVER.bits() | LoaderFlags::HAS_API.bits(),
        ),
    },
    LoaderTemplate {
        id: LoaderId::Purpur,
        name: "purpur",
        flags: LoaderFlags::SUPPORTS_SERVER,
    },
    LoaderTemplate {
        id: LoaderId::Velocity,
        name: "velocity",
        flags: LoaderFlags::from_bits_truncate(
            LoaderFlags::SUPPORTS_SERVER.bits() | LoaderFlags::HAS_API.bits(),
        ),
    },
];

fn find_template(id: LoaderId) -> Option<&'static LoaderTemplate> {
    LOADER_TABLE.iter().find(|t| t.id == id)
}

fn find_template_by_name(name: &str) -> Option<&'static LoaderTemplate> {
    LOADER_TABLE.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

impl Loader {
    pub fn make(id: LoaderId) -> Self {
        match find_template(id) {
            Some(t) => Loader {
                id: t.id,
                name: Cow::Borrowed(t.name),
                base_url: None,
                flags: t.flags,
                ops: None,
            },
            None => Loader {
                id: LoaderId::Unknown,
                name: Cow::Borrowed("unknown"),
                base_url: None,
                flags: LoaderFlags::empty(),
                ops: None,
            },
        }
    }

    pub fn from_name(name: &str) -> Self {
        match find_template_by_name(name) {
            Some(t) => Self::make(t.id),
            None => Self::make(LoaderId::Unknown),
        }
    }

    pub fn table() -> impl Iterator<Item = LoaderId> {
        LOADER_TABLE.iter().map(|t| t.id)
    }

    pub fn is_known(id: LoaderId) -> bool {
        find_template(id).is_some()
    }

    /// Loaders don't expose a remote API unless `HAS_API` is set; that flag
    /// doubles as the "requires network" signal, as in the original.
    pub fn requires_network(&self) -> bool {
        self.flags.contains(LoaderFlags::HAS_API)
    }

    pub fn is_online(&self) -> bool {
        match &self.ops {
            Some(ops) => ops.is_online(),
            None => true,
        }
    }

    pub fn set_base_url(&mut self, base_url: Option<String>) {
        self.base_url = base_url.map(BaseUrl::Owned);
    }

    pub fn write(&self, w: &mut Writer) -> Result<(), McpMpError> {
        w.map_begin(6)?;
        w.write_header(Tag::Loader.as_str(), Tag::Loader.version())?;
        w.kv_i32(2, self.id.to_wire())?;
        w.kv_str(3, &self.name)?;
        match &self.base_url {
            Some(u) => w.kv_str(4, u.as_str())?,
            None => w.kv_nil(4)?,
        }
        w.kv_u32(5, self.flags.bits())?;
        Ok(())
    }

    pub fn read(r: &Reader) -> Result<Self, McpMpError> {
        let version = r.expect_tag(Tag::Loader.as_str())?;
        if version < 1 {
            return Err(McpMpError::Parse("loader version must be >= 1".into()));
        }
        let id_wire = r
            .get_i64(2)?
            .ok_or_else(|| McpMpError::Parse("missing loader id".into()))?;
        let id = LoaderId::from_wire(id_wire as i32);

        let base_url = r.get_str_borrow(4)?.map(|s| s.to_owned());
        let flags = r
            .get_u32(5)?
            .map(LoaderFlags::from_bits_truncate)
            .unwrap_or_else(LoaderFlags::empty);

        let mut out = Self::make(id);
        if let Some(u) = base_url {
            out.base_url = Some(BaseUrl::Owned(u));
        }
        out.flags = flags;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_base_url_and_flags() {
        let mut l = Loader::make(LoaderId::Fabric);
        l.set_base_url(Some("https://meta.fabricmc.net".into()));

        let mut w = Writer::new();
        l.write(&mut w).unwrap();
        let bytes = w.finish();

        let r = Reader::new(&bytes).unwrap();
        let back = Loader::read(&r).unwrap();
        assert_eq!(back.id, LoaderId::Fabric);
        assert_eq!(
            back.base_url.as_ref().map(BaseUrl::as_str),
            Some("https://meta.fabricmc.net")
        );
        assert!(back.flags.contains(LoaderFlags::SUPPORTS_CLIENT));
    }

    #[test]
    fn paper_requires_network_purpur_does_not() {
        assert!(Loader::make(LoaderId::Paper).requires_network());
        assert!(!Loader::make(LoaderId::Purpur).requires_network());
    }
}
