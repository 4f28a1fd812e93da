use std::io::{self, Read, Write};

use crate::code::Code;

pub(crate) const CHUNK: usize = 8192;

/// Packs bits MSB-first into bytes and forwards each full byte to `inner`.
pub struct BitWriter<W: Write> {
    inner: W,
    acc: u8,
    filled: u8,
    bytes_written: u64,
}

impl<W: Write> BitWriter<W> {
    pub fn new(inner: W) -> Self {
        BitWriter {
            inner,
            acc: 0,
            filled: 0,
            bytes_written: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        if bit {
            self.acc |= 1 << (7 - self.filled);
        }
        self.filled += 1;
        if self.filled == 8 {
            self.emit()?;
        }
        Ok(())
    }

    pub fn write_code(&mut self, code: &Code) -> io::Result<()> {
        for bit in code.bits() {
            self.write_bit(bit)?;
        }
        Ok(())
    }

    /// Flushes any partial byte, zero-padded in the low bits, and returns
    /// the sink with the number of bytes written through this writer.
    pub fn finish(mut self) -> io::Result<(W, u64)> {
        if self.filled > 0 {
            self.emit()?;
        }
        self.inner.flush()?;
        Ok((self.inner, self.bytes_written))
    }

    fn emit(&mut self) -> io::Result<()> {
        self.inner.write_all(&[self.acc])?;
        self.bytes_written += 1;
        self.acc = 0;
        self.filled = 0;
        Ok(())
    }
}

/// Yields the bits of `inner` MSB-first. Reads `inner` in `CHUNK`-sized
/// blocks, so an unbuffered source costs one `read` per block, not per byte.
pub struct BitReader<R: Read> {
    inner: R,
    buf: Box<[u8; CHUNK]>,
    pos: usize,
    filled: usize,
    remaining: u8,
    bytes_read: u64,
}

impl<R: Read> BitReader<R> {
    pub fn new(inner: R) -> Self {
        BitReader {
            inner,
            buf: Box::new([0; CHUNK]),
            pos: 0,
            filled: 0,
            remaining: 0,
            bytes_read: 0,
        }
    }

    /// Returns `None` once the input is exhausted.
    pub fn read_bit(&mut self) -> io::Result<Option<bool>> {
        if self.remaining == 0 {
            if self.pos + 1 >= self.filled {
                let n = read_chunk(&mut self.inner, &mut self.buf[..])?;
                if n == 0 {
                    return Ok(None);
                }
                self.filled = n;
                self.pos = 0;
            } else {
                self.pos += 1;
            }
            self.remaining = 8;
            self.bytes_read += 1;
        }
        self.remaining -= 1;
        Ok(Some((self.buf[self.pos] >> self.remaining) & 1 == 1))
    }

    /// Bytes whose bits have been handed out, not bytes pulled from `inner`.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

/// `read` that retries when interrupted by a signal.
pub(crate) fn read_chunk<R: Read>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match input.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}
