use rmpv::Value;

use crate::container::StringList;
use crate::error::McpMpError;

use super::{TAG_KEY, VER_KEY};

/// Reads a single top-level MessagePack map by int key, the counterpart to
/// [`super::Writer`]. Borrowed accessors (`get_str_borrow`, `get_bin_borrow`)
/// return slices tied to the `Reader`'s own buffer, so a caller cannot hold
/// one past the `Reader`'s lifetime — the borrow checker enforces what the C
/// reader could only document.
pub struct Reader {
    root: Value,
}

fn find_key(map: &Value, key: i32) -> Result<Option<Value>, McpMpError> {
    let entries = match map {
        Value::Map(entries) => entries,
        _ => return Err(McpMpError::Parse("expected a map".into())),
    };
    for (k, v) in entries {
        if let Some(ik) = k.as_i64() {
            if ik == key as i64 {
                return Ok(Some(v.clone()));
            }
        }
    }
    Ok(None)
}

impl Reader {
    pub fn new(buf: &[u8]) -> Result<Self, McpMpError> {
        let mut cursor = buf;
        let root = rmpv::decode::read_value(&mut cursor)?;
        Ok(Reader { root })
    }

    /// Verify the header's tag string matches `expected_tag` and return the
    /// stored version. An unknown or missing tag is a parse error.
    pub fn expect_tag(&self, expected_tag: &str) -> Result<i32, McpMpError> {
        let tag = find_key(&self.root, TAG_KEY)?
            .and_then(|v| v.as_str().map(str::to_owned))
            .ok_or_else(|| McpMpError::Parse("missing tag".into()))?;
        if tag != expected_tag {
            return Err(McpMpError::Parse(format!(
                "unexpected tag `{tag}`, wanted `{expected_tag}`"
            )));
        }
        let version = find_key(&self.root, VER_KEY)?
            .and_then(|v| v.as_i64())
            .ok_or_else(|| McpMpError::Parse("missing version".into()))?;
        Ok(version as i32)
    }

    pub fn get_i64(&self, key: i32) -> Result<Option<i64>, McpMpError> {
        Ok(find_key(&self.root, key)?.and_then(|v| v.as_i64()))
    }

    pub fn get_u64(&self, key: i32) -> Result<Option<u64>, McpMpError> {
        Ok(find_key(&self.root, key)?.and_then(|v| v.as_u64()))
    }

    pub fn get_u32(&self, key: i32) -> Result<Option<u32>, McpMpError> {
        Ok(find_key(&self.root, key)?
            .and_then(|v| v.as_u64())
            .map(|v| v as u32))
    }

    pub fn get_str_borrow(&self, key: i32) -> Result<Option<&str>, McpMpError> {
        let entries = match &self.root {
            Value::Map(entries) => entries,
            _ => return Err(McpMpError::Parse("expected a map".into())),
        };
        for (k, v) in entries {
            if k.as_i64() == Some(key as i64) {
                return Ok(Some(
                    v.as_str()
                        .ok_or_else(|| McpMpError::Parse("expected a string".into()))?,
                ));
            }
        }
        Ok(None)
    }

    pub fn get_bin_borrow(&self, key: i32) -> Result<Option<&[u8]>, McpMpError> {
        let entries = match &self.root {
            Value::Map(entries) => entries,
            _ => return Err(McpMpError::Parse("expected a map".into())),
        };
        for (k, v) in entries {
            if k.as_i64() == Some(key as i64) {
                return Ok(Some(
                    v.as_slice()
                        .ok_or_else(|| McpMpError::Parse("expected bin".into()))?,
                ));
            }
        }
        Ok(None)
    }

    pub fn get_strlist_dup(&self, key: i32) -> Result<Option<StringList>, McpMpError> {
        let val = match find_key(&self.root, key)? {
            Some(v) => v,
            None => return Ok(None),
        };
        let arr = val
            .as_array()
            .ok_or_else(|| McpMpError::Parse("expected an array".into()))?;
        let mut out = Vec::with_capacity(arr.len());
        for item in arr {
            let s = item
                .as_str()
                .ok_or_else(|| McpMpError::Parse("expected a string".into()))?;
            out.push(s.to_owned());
        }
        Ok(Some(out))
    }

    /// Fetch the sub-map stored at `key`, as a fresh [`Reader`] over the same
    /// underlying value (the C API calls this a nested map object; here it
    /// is simply another `Reader` since `rmpv::Value` owns its tree).
    pub fn get_map(&self, key: i32) -> Result<Option<Reader>, McpMpError> {
        match find_key(&self.root, key)? {
            Some(v @ Value::Map(_)) => Ok(Some(Reader { root: v })),
            Some(_) => Err(McpMpError::Parse("expected a map".into())),
            None => Ok(None),
        }
    }

    /// Borrow an array cursor over `key`'s value, reading elements
    /// on demand without allocating the whole array up front.
    pub fn get_array_cur(&self, key: i32) -> Result<Option<ArrayCursor<'_>>, McpMpError> {
        let entries = match &self.root {
            Value::Map(entries) => entries,
            _ => return Err(McpMpError::Parse("expected a map".into())),
        };
        for (k, v) in entries {
            if k.as_i64() == Some(key as i64) {
                let arr = v
                    .as_array()
                    .ok_or_else(|| McpMpError::Parse("expected an array".into()))?;
                return Ok(Some(ArrayCursor { items: arr }));
            }
        }
        Ok(None)
    }
}

/// Borrowed cursor over an array value, tied to the [`Reader`] it came from.
pub struct ArrayCursor<'a> {
    items: &'a [Value],
}

impl<'a> ArrayCursor<'a> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get_bin_borrow(&self, idx: usize) -> Result<&'a [u8], McpMpError> {
        self.items
            .get(idx)
            .ok_or_else(|| McpMpError::InvalidArgument(format!("array index {idx} out of range")))?
            .as_slice()
            .ok_or_else(|| McpMpError::Parse("expected bin".into()))
    }

    pub fn get_map(&self, idx: usize) -> Result<Reader, McpMpError> {
        let v = self
            .items
            .get(idx)
            .ok_or_else(|| McpMpError::InvalidArgument(format!("array index {idx} out of range")))?;
        match v {
            Value::Map(_) => Ok(Reader { root: v.clone() }),
            _ => Err(McpMpError::Parse("expected a map".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mp::Writer;

    #[test]
    fn missing_key_is_none_not_error() {
        let mut w = Writer::new();
        w.map_begin(2).unwrap();
        w.write_header("mc_provider", 1).unwrap();
        let bytes = w.finish();

        let r = Reader::new(&bytes).unwrap();
        assert_eq!(r.get_i64(99).unwrap(), None);
    }

    #[test]
    fn wrong_tag_is_parse_error() {
        let mut w = Writer::new();
        w.map_begin(2).unwrap();
        w.write_header("mc_loader", 1).unwrap();
        let bytes = w.finish();

        let r = Reader::new(&bytes).unwrap();
        assert!(r.expect_tag("mc_provider").is_err());
    }
}
