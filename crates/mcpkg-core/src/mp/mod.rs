//! Tagged MessagePack codec: a small writer/reader pair built directly on
//! `rmp` (encoding) and `rmpv` (decoding) rather than `rmp-serde`, so that
//! every struct gets an int-keyed map with an explicit `{tag, version}`
//! header and schema-evolution-friendly optional fields, instead of a
//! derive-generated positional encoding.

pub mod reader;
pub mod writer;

pub use reader::Reader;
pub use writer::Writer;

/// Reserved key for the tag string, present in every header.
pub const TAG_KEY: i32 = 0;
/// Reserved key for the format version, present in every header.
pub const VER_KEY: i32 = 1;

/// Identifies one of the wire formats this crate reads and writes. Each
/// variant has exactly one tag string and current version, recorded once
/// in [`TAGS`] rather than as scattered `#define`-style constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Provider,
    Loader,
    VersionFamily,
    Digest,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Provider => "libmcpkg.mc.provider",
            Tag::Loader => "libmcpkg.mc.loader",
            Tag::VersionFamily => "libmcpkg.mc.version_family",
            Tag::Digest => "digest",
        }
    }

    pub fn version(self) -> i32 {
        match self {
            Tag::Provider => 1,
            Tag::Loader => 1,
            Tag::VersionFamily => 1,
            Tag::Digest => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_strings_are_distinct() {
        let tags = [Tag::Provider, Tag::Loader, Tag::VersionFamily, Tag::Digest];
        for (i, a) in tags.iter().enumerate() {
            for b in &tags[i + 1..] {
                assert_ne!(a.as_str(), b.as_str());
            }
        }
    }
}
