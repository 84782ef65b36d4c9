use rmp::encode;

use crate::container::StringList;
use crate::error::McpMpError;

use super::{TAG_KEY, VER_KEY};

/// Builds a single top-level MessagePack map, key by key, in the order
/// written. Mirrors the C writer's `McPkgMpWriter`: a map is opened with
/// [`Writer::map_begin`] declaring its exact key count up front (MessagePack
/// map headers carry their length, so the count must be known before the
/// first key is written), then filled with `kv_*` calls.
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Writer { buf: Vec::new() }
    }

    /// Open a map with `key_count` entries as the top-level value.
    pub fn map_begin(&mut self, key_count: u32) -> Result<(), McpMpError> {
        encode::write_map_len(&mut self.buf, key_count)?;
        Ok(())
    }

    /// Write the standard `{0: tag, 1: version}` header entries. Must be
    /// the first two entries written after [`Writer::map_begin`].
    pub fn write_header(&mut self, tag: &str, version: i32) -> Result<(), McpMpError> {
        self.kv_str(TAG_KEY, tag)?;
        self.kv_i32(VER_KEY, version)?;
        Ok(())
    }

    pub fn kv_i32(&mut self, key: i32, v: i32) -> Result<(), McpMpError> {
        encode::write_sint(&mut self.buf, key as i64)?;
        encode::write_sint(&mut self.buf, v as i64)?;
        Ok(())
    }

    pub fn kv_u32(&mut self, key: i32, v: u32) -> Result<(), McpMpError> {
        encode::write_sint(&mut self.buf, key as i64)?;
        encode::write_uint(&mut self.buf, v as u64)?;
        Ok(())
    }

    pub fn kv_i64(&mut self, key: i32, v: i64) -> Result<(), McpMpError> {
        encode::write_sint(&mut self.buf, key as i64)?;
        encode::write_sint(&mut self.buf, v)?;
        Ok(())
    }

    pub fn kv_str(&mut self, key: i32, v: &str) -> Result<(), McpMpError> {
        encode::write_sint(&mut self.buf, key as i64)?;
        encode::write_str(&mut self.buf, v)?;
        Ok(())
    }

    pub fn kv_bin(&mut self, key: i32, data: &[u8]) -> Result<(), McpMpError> {
        encode::write_sint(&mut self.buf, key as i64)?;
        encode::write_bin(&mut self.buf, data)?;
        Ok(())
    }

    pub fn kv_nil(&mut self, key: i32) -> Result<(), McpMpError> {
        encode::write_sint(&mut self.buf, key as i64)?;
        encode::write_nil(&mut self.buf)?;
        Ok(())
    }

    pub fn kv_strlist(&mut self, key: i32, list: &StringList) -> Result<(), McpMpError> {
        encode::write_sint(&mut self.buf, key as i64)?;
        encode::write_array_len(&mut self.buf, list.len() as u32)?;
        for s in list {
            encode::write_str(&mut self.buf, s)?;
        }
        Ok(())
    }

    /// Begin a nested map as the value for `key`.
    pub fn kv_map_begin(&mut self, key: i32, key_count: u32) -> Result<(), McpMpError> {
        encode::write_sint(&mut self.buf, key as i64)?;
        encode::write_map_len(&mut self.buf, key_count)?;
        Ok(())
    }

    /// Begin a nested array as the value for `key`.
    pub fn kv_array_begin(&mut self, key: i32, count: u32) -> Result<(), McpMpError> {
        encode::write_sint(&mut self.buf, key as i64)?;
        encode::write_array_len(&mut self.buf, count)?;
        Ok(())
    }

    /// Write a bare BIN value, used for array elements which carry no key.
    pub fn write_bin(&mut self, data: &[u8]) -> Result<(), McpMpError> {
        encode::write_bin(&mut self.buf, data)?;
        Ok(())
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mp::Reader;

    #[test]
    fn header_then_fields_round_trip() {
        let mut w = Writer::new();
        w.map_begin(3).unwrap();
        w.write_header("digest", 1).unwrap();
        w.kv_str(2, "deadbeef").unwrap();
        let bytes = w.finish();

        let r = Reader::new(&bytes).unwrap();
        let version = r.expect_tag("digest").unwrap();
        assert_eq!(version, 1);
        assert_eq!(r.get_str_borrow(2).unwrap(), Some("deadbeef"));
    }
}
