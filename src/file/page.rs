use crate::I32_SIZE;
use anyhow::Result;

/// Page is the in-memory image of one block.
///
/// Integers are stored big-endian. Byte slices and strings are stored with a
/// 4-byte length prefix:
///
/// ```text
/// ┌───┬───┬───┬───┬───┬───┬───┬───┬───┬───┐
/// │ 0 │ 0 │ 0 │ 5 │ h │ e │ l │ l │ o │...│
/// └───┴───┴───┴───┴───┴───┴───┴───┴───┴───┘
/// ┗━━━━━━━┳━━━━━━━┻━━━━━━━━┳━━━━━━━━━┛
///      length             data
/// ```
pub struct Page {
    data: Vec<u8>,
}

impl From<Vec<u8>> for Page {
    fn from(data: Vec<u8>) -> Self {
        Page { data }
    }
}

impl Page {
    pub fn new(block_size: i32) -> Page {
        Page {
            data: vec![0; block_size as usize],
        }
    }

    pub fn get_int(&self, offset: i32) -> i32 {
        let offset = offset as usize;
        let mut bytes = [0; I32_SIZE];
        bytes.copy_from_slice(&self.data[offset..offset + I32_SIZE]);
        i32::from_be_bytes(bytes)
    }

    pub fn set_int(&mut self, offset: i32, value: i32) {
        let offset = offset as usize;
        self.data[offset..offset + I32_SIZE].copy_from_slice(&value.to_be_bytes());
    }

    pub fn get_bytes(&self, offset: i32) -> &[u8] {
        let length = self.get_int(offset) as usize;
        let start = offset as usize + I32_SIZE;
        &self.data[start..start + length]
    }

    pub fn set_bytes(&mut self, offset: i32, bytes: &[u8]) {
        self.set_int(offset, bytes.len() as i32);
        let start = offset as usize + I32_SIZE;
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
    }

    pub fn get_string(&self, offset: i32) -> Result<String> {
        Ok(String::from_utf8(self.get_bytes(offset).to_vec())?)
    }

    pub fn set_string(&mut self, offset: i32, value: &str) {
        self.set_bytes(offset, value.as_bytes());
    }

    /// Bytes needed to store a string of the given length.
    pub fn max_length(str_len: i32) -> i32 {
        I32_SIZE as i32 + str_len
    }

    pub fn contents(&self) -> &[u8] {
        &self.data
    }

    pub fn contents_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}
