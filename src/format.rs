//! Header layout of a compressed file. All integers are big-endian.
//!
//! ```text
//! [u16 symbol count N]
//! N x { [u8 symbol] [u8 code length L] [ceil(L / 8) code bytes, MSB-first] }
//! [u64 total symbol count]
//! [packed bitstream]
//! ```

use std::io::{Read, Write};

use log::debug;

use crate::code::{Code, MAX_CODE_LEN};
use crate::error::{Error, Result};
use crate::huffman::CodeTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub table: CodeTable,
    /// Number of original bytes; the packed stream may end in padding.
    pub total_symbols: u64,
}

/// Size in bytes of the header written for `table`.
pub fn header_len(table: &CodeTable) -> u64 {
    let entries: u64 = table
        .iter()
        .map(|(_, code)| 2 + code.as_bytes().len() as u64)
        .sum();
    2 + entries + 8
}

pub fn write_header<W: Write>(out: &mut W, table: &CodeTable, total_symbols: u64) -> Result<u64> {
    let count = table.len() as u16;
    out.write_all(&count.to_be_bytes())?;
    for (symbol, code) in table.iter() {
        out.write_all(&[symbol, code.len() as u8])?;
        out.write_all(code.as_bytes())?;
    }
    out.write_all(&total_symbols.to_be_bytes())?;

    let len = header_len(table);
    debug!("Header written: {} symbols, {} bytes", count, len);
    Ok(len)
}

pub fn read_header<R: Read>(input: &mut R) -> Result<Header> {
    let count = u16::from_be_bytes(read_array(input)?) as usize;
    if count > 256 {
        return Err(Error::CorruptHeader(format!("{count} symbols declared")));
    }

    let mut table = CodeTable::new();
    for _ in 0..count {
        let [symbol, len]: [u8; 2] = read_array(input)?;
        let len = len as usize;
        if len == 0 {
            return Err(Error::CorruptHeader(format!(
                "zero-length code for symbol {symbol:#04x}"
            )));
        }
        debug_assert!(len <= MAX_CODE_LEN);
        let mut bytes = vec![0u8; len.div_ceil(8)];
        input.read_exact(&mut bytes).map_err(Error::from_read)?;
        let code = Code::from_bytes(&bytes, len)
            .ok_or_else(|| Error::CorruptHeader(format!("bad code for symbol {symbol:#04x}")))?;
        if table.insert(symbol, code).is_some() {
            return Err(Error::CorruptHeader(format!(
                "symbol {symbol:#04x} listed twice"
            )));
        }
    }

    let total_symbols = u64::from_be_bytes(read_array(input)?);
    if table.is_empty() && total_symbols > 0 {
        return Err(Error::EmptyAlphabet);
    }
    debug!(
        "Header read: {} symbols, {} total, {} bytes",
        count,
        total_symbols,
        header_len(&table)
    );
    Ok(Header {
        table,
        total_symbols,
    })
}

fn read_array<R: Read, const N: usize>(input: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    input.read_exact(&mut buf).map_err(Error::from_read)?;
    Ok(buf)
}
