use std::fmt;

/// Longest code a tree over 256 symbols can produce.
pub const MAX_CODE_LEN: usize = 255;

/// A variable-length bit sequence, stored MSB-first.
///
/// Bits past `len` in the last byte are always zero, so two codes compare
/// equal exactly when they have the same bits and the same length.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Code {
    bytes: Vec<u8>,
    len: usize,
}

impl Code {
    pub fn new() -> Self {
        Code::default()
    }

    /// Rebuilds a code from its left-justified byte form, ignoring any
    /// padding bits. Returns `None` if `bytes` holds fewer than `len` bits.
    pub fn from_bytes(bytes: &[u8], len: usize) -> Option<Self> {
        let needed = len.div_ceil(8);
        if bytes.len() < needed || len > MAX_CODE_LEN {
            return None;
        }
        let mut bytes = bytes[..needed].to_vec();
        let tail = len % 8;
        if tail != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= 0xFF << (8 - tail);
            }
        }
        Some(Code { bytes, len })
    }

    pub fn push(&mut self, bit: bool) {
        assert!(self.len < MAX_CODE_LEN, "code longer than {MAX_CODE_LEN} bits");
        let offset = self.len % 8;
        if offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 1 << (7 - offset);
        }
        self.len += 1;
    }

    pub fn pop(&mut self) -> Option<bool> {
        if self.len == 0 {
            return None;
        }
        let bit = self.get(self.len - 1);
        self.len -= 1;
        let offset = self.len % 8;
        if offset == 0 {
            self.bytes.pop();
        } else {
            let last = self.bytes.len() - 1;
            self.bytes[last] &= !(1 << (7 - offset));
        }
        Some(bit)
    }

    /// Bit `i`, counting from the first bit pushed.
    pub fn get(&self, i: usize) -> bool {
        assert!(i < self.len, "bit index {i} out of range for length {}", self.len);
        (self.bytes[i / 8] >> (7 - i % 8)) & 1 == 1
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
        self.len = 0;
    }

    /// The code left-justified in `ceil(len / 8)` bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|i| self.get(i))
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len && (0..self.len).all(|i| self.get(i) == other.get(i))
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code({self})")
    }
}
