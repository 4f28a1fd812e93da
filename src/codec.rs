use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::time::Instant;

use log::{debug, info, trace};

use crate::bitstream::{BitReader, BitWriter, CHUNK, read_chunk};
use crate::code::Code;
use crate::error::{Error, Result};
use crate::format::{self, header_len};
use crate::huffman::{CodeTable, FrequencyTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSummary {
    /// Distinct byte values in the input.
    pub symbols: usize,
    pub input_bytes: u64,
    pub header_bytes: u64,
    pub payload_bytes: u64,
}

impl EncodeSummary {
    pub fn output_bytes(&self) -> u64 {
        self.header_bytes + self.payload_bytes
    }

    /// Output size relative to input size; 0 for empty input.
    pub fn ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            return 0.0;
        }
        self.output_bytes() as f64 / self.input_bytes as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeSummary {
    pub symbols: usize,
    /// Header and packed bytes consumed; trailing input is not counted.
    pub input_bytes: u64,
    pub output_bytes: u64,
}

impl DecodeSummary {
    /// Input size relative to output size; 0 for empty output.
    pub fn ratio(&self) -> f64 {
        if self.output_bytes == 0 {
            return 0.0;
        }
        self.input_bytes as f64 / self.output_bytes as f64
    }
}

/// Writes compressed files for a fixed code table.
#[derive(Debug, Clone)]
pub struct Encoder {
    table: CodeTable,
}

impl Encoder {
    /// Accepts any table the decoder can read back: every code is
    /// non-empty and no two symbols share a code.
    pub fn new(table: CodeTable) -> Result<Self> {
        if let Some((symbol, _)) = table.iter().find(|(_, code)| code.is_empty()) {
            return Err(Error::EmptyCode(symbol));
        }
        table.reverse()?;
        Ok(Encoder { table })
    }

    /// Builds the code table for input with these counts. Empty input gets
    /// an empty table, which only encodes zero bytes.
    pub fn from_frequencies(frequencies: &FrequencyTable) -> Result<Self> {
        if frequencies.is_empty() {
            return Encoder::new(CodeTable::new());
        }
        Encoder::new(CodeTable::from_frequencies(frequencies)?)
    }

    pub fn table(&self) -> &CodeTable {
        &self.table
    }

    /// Writes the header followed by the packed codes of every byte of
    /// `input`, which must yield exactly `total` bytes.
    pub fn encode<R: Read, W: Write>(
        &self,
        mut input: R,
        output: &mut W,
        total: u64,
    ) -> Result<EncodeSummary> {
        let header_bytes = format::write_header(output, &self.table, total)?;

        let mut writer = BitWriter::new(&mut *output);
        let mut buf = [0u8; CHUNK];
        let mut seen = 0u64;
        loop {
            let n = read_chunk(&mut input, &mut buf)?;
            if n == 0 {
                break;
            }
            for &byte in &buf[..n] {
                let code = self.table.get(byte).ok_or(Error::UnknownSymbol(byte))?;
                writer.write_code(code)?;
            }
            seen += n as u64;
        }
        if seen != total {
            return Err(Error::InputChanged {
                expected: total,
                actual: seen,
            });
        }
        let (_, payload_bytes) = writer.finish()?;

        Ok(EncodeSummary {
            symbols: self.table.len(),
            input_bytes: total,
            header_bytes,
            payload_bytes,
        })
    }
}

/// Compresses `input` into `output`, reading the input twice: once to count
/// frequencies and once, after seeking back, to emit codes.
pub fn encode<R: Read + Seek, W: Write>(input: &mut R, output: &mut W) -> Result<EncodeSummary> {
    let start_time = Instant::now();
    let start = input.stream_position()?;

    let frequencies = FrequencyTable::from_reader(&mut *input)?;
    let total = frequencies.total();
    debug!(
        "Frequency pass: {} bytes, {} unique symbols",
        total,
        frequencies.distinct()
    );

    let encoder = Encoder::from_frequencies(&frequencies)?;

    input.seek(SeekFrom::Start(start))?;
    let summary = encoder.encode(&mut *input, output, total)?;

    info!(
        "Encoded {} bytes into {} ({} header + {} payload) in {:.2?}",
        summary.input_bytes,
        summary.output_bytes(),
        summary.header_bytes,
        summary.payload_bytes,
        start_time.elapsed()
    );
    Ok(summary)
}

/// Restores the original bytes of a compressed file. Bits after the last
/// declared symbol are padding and are not decoded. The packed stream is
/// read in blocks, so `input` need not be buffered.
pub fn decode<R: Read, W: Write>(input: &mut R, output: &mut W) -> Result<DecodeSummary> {
    let start_time = Instant::now();

    let header = format::read_header(input)?;
    let header_bytes = header_len(&header.table);
    let symbols = header.table.len();
    if header.total_symbols == 0 {
        debug!("Header declares no symbols; nothing to decode");
        return Ok(DecodeSummary {
            symbols,
            input_bytes: header_bytes,
            output_bytes: 0,
        });
    }

    let reverse = header.table.reverse()?;
    debug!(
        "Reverse lookup table created. Entries: {}, longest code: {} bits",
        reverse.len(),
        reverse.max_code_len()
    );

    let mut reader = BitReader::new(&mut *input);
    let mut candidate = Code::new();
    let mut remaining = header.total_symbols;
    let mut decoded = Vec::with_capacity(CHUNK);
    while remaining > 0 {
        if candidate.len() >= reverse.max_code_len() {
            return Err(Error::CorruptStream {
                bits: candidate.len(),
            });
        }
        let bit = reader.read_bit()?.ok_or(Error::TruncatedStream)?;
        candidate.push(bit);
        if let Some(symbol) = reverse.get(&candidate) {
            decoded.push(symbol);
            candidate.clear();
            remaining -= 1;
            if decoded.len() == CHUNK {
                output.write_all(&decoded)?;
                decoded.clear();
                trace!(
                    "Decoded {} of {} symbols",
                    header.total_symbols - remaining,
                    header.total_symbols
                );
            }
        }
    }
    output.write_all(&decoded)?;
    output.flush()?;

    let summary = DecodeSummary {
        symbols,
        input_bytes: header_bytes + reader.bytes_read(),
        output_bytes: header.total_symbols,
    };
    info!(
        "Decoded {} bytes from {} in {:.2?}",
        summary.output_bytes,
        summary.input_bytes,
        start_time.elapsed()
    );
    Ok(summary)
}

/// In-memory [`encode`].
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode(&mut Cursor::new(data), &mut out)?;
    Ok(out)
}

/// In-memory [`decode`].
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decode(&mut &data[..], &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> Code {
        let mut c = Code::new();
        for ch in s.chars() {
            c.push(ch == '1');
        }
        c
    }

    #[test]
    fn test_roundtrip() {
        let inputs: [&[u8]; 5] = [
            b"",
            b"a",
            b"ab",
            b"huffman coding in rust is fun!",
            b"this is an example for huffman encoding",
        ];
        for input in inputs {
            let packed = compress(input).unwrap();
            assert_eq!(decompress(&packed).unwrap(), input);
        }
    }

    #[test]
    fn test_empty_input() {
        let mut out = Vec::new();
        let summary = encode(&mut Cursor::new(Vec::new()), &mut out).unwrap();
        assert_eq!(out, vec![0; 10]);
        assert_eq!(summary.symbols, 0);
        assert_eq!(summary.payload_bytes, 0);
        assert_eq!(summary.ratio(), 0.0);

        // Trailing garbage after the header is never read.
        out.extend_from_slice(b"junk");
        let mut input = &out[..];
        let mut decoded = Vec::new();
        let summary = decode(&mut input, &mut decoded).unwrap();
        assert!(decoded.is_empty());
        assert_eq!(summary.input_bytes, 10);
        assert_eq!(input, b"junk");
    }

    #[test]
    fn test_single_symbol() {
        let input = vec![0x41u8; 1000];
        let packed = compress(&input).unwrap();

        let mut expected = vec![0, 1, 0x41, 1, 0x00];
        expected.extend_from_slice(&1000u64.to_be_bytes());
        expected.extend(std::iter::repeat_n(0u8, 125));
        assert_eq!(packed, expected);

        assert_eq!(decompress(&packed).unwrap(), input);
    }

    #[test]
    fn test_summary_sizes() {
        let input = b"abracadabra".repeat(20);
        let mut out = Vec::new();
        let summary = encode(&mut Cursor::new(&input), &mut out).unwrap();
        assert_eq!(summary.input_bytes, input.len() as u64);
        assert_eq!(summary.output_bytes(), out.len() as u64);
        assert_eq!(summary.symbols, 5);
        assert!(summary.ratio() < 1.0);

        let freq = FrequencyTable::from_bytes(&input);
        let bits = CodeTable::from_frequencies(&freq).unwrap().encoded_bits(&freq);
        assert_eq!(summary.payload_bytes, bits.div_ceil(8));

        let mut decoded = Vec::new();
        let summary = decode(&mut &out[..], &mut decoded).unwrap();
        assert_eq!(summary.output_bytes, input.len() as u64);
        assert_eq!(summary.input_bytes, out.len() as u64);
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_encode_from_offset() {
        let mut input = Cursor::new(b"skipHELLO".to_vec());
        input.set_position(4);
        let mut out = Vec::new();
        encode(&mut input, &mut out).unwrap();
        assert_eq!(decompress(&out).unwrap(), b"HELLO");
    }

    #[test]
    fn test_unknown_symbol() {
        let mut table = CodeTable::new();
        table.insert(b'a', code("0"));
        table.insert(b'b', code("1"));
        let encoder = Encoder::new(table).unwrap();
        let result = encoder.encode(&b"abc"[..], &mut Vec::new(), 3);
        assert!(matches!(result, Err(Error::UnknownSymbol(b'c'))));
    }

    #[test]
    fn test_rejects_empty_code() {
        let mut table = CodeTable::new();
        table.insert(b'a', Code::new());
        assert!(matches!(Encoder::new(table), Err(Error::EmptyCode(b'a'))));

        let mut table = CodeTable::new();
        table.insert(b'a', code("0"));
        table.insert(b'b', Code::new());
        assert!(matches!(Encoder::new(table), Err(Error::EmptyCode(b'b'))));
    }

    #[test]
    fn test_rejects_shared_code() {
        let mut table = CodeTable::new();
        table.insert(b'a', code("10"));
        table.insert(b'b', code("0"));
        table.insert(b'c', code("10"));
        assert!(matches!(
            Encoder::new(table),
            Err(Error::DuplicateCode {
                first: b'a',
                second: b'c'
            })
        ));
    }

    #[test]
    fn test_accepted_table_decodes() {
        let mut table = CodeTable::new();
        table.insert(b'a', code("0"));
        table.insert(b'b', code("10"));
        table.insert(b'c', code("11"));
        let encoder = Encoder::new(table).unwrap();
        let mut out = Vec::new();
        encoder.encode(&b"abcab"[..], &mut out, 5).unwrap();
        assert_eq!(decompress(&out).unwrap(), b"abcab");
    }

    #[test]
    fn test_empty_encoder() {
        let encoder = Encoder::from_frequencies(&FrequencyTable::new()).unwrap();
        assert!(encoder.table().is_empty());
        let result = encoder.encode(&b"x"[..], &mut Vec::new(), 1);
        assert!(matches!(result, Err(Error::UnknownSymbol(b'x'))));
    }

    #[test]
    fn test_input_changed() {
        let encoder = Encoder::from_frequencies(&FrequencyTable::from_bytes(b"ab")).unwrap();
        let result = encoder.encode(&b"abab"[..], &mut Vec::new(), 2);
        assert!(matches!(
            result,
            Err(Error::InputChanged {
                expected: 2,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_codes_longer_than_64_bits() {
        let mut a = Code::new();
        for _ in 0..100 {
            a.push(false);
        }
        let mut b = a.clone();
        a.push(false);
        b.push(true);
        let mut table = CodeTable::new();
        table.insert(b'a', a);
        table.insert(b'b', b);
        table.insert(b'c', code("1"));

        let input = b"abcbbaca";
        let encoder = Encoder::new(table).unwrap();
        let mut out = Vec::new();
        let summary = encoder.encode(&input[..], &mut out, input.len() as u64).unwrap();
        assert_eq!(summary.payload_bytes, (6 * 101 + 2u64).div_ceil(8));
        assert_eq!(decompress(&out).unwrap(), input);
    }

    #[test]
    fn test_truncated_payload() {
        let packed = compress(b"some bytes that need several packed bytes").unwrap();
        let cut = &packed[..packed.len() - 2];
        assert!(matches!(decompress(cut), Err(Error::TruncatedStream)));
    }

    #[test]
    fn test_unmatched_bits() {
        let mut data = vec![0, 2, b'a', 1, 0x00, b'b', 2, 0x80];
        data.extend_from_slice(&1u64.to_be_bytes());
        data.push(0b1100_0000);
        assert!(matches!(
            decompress(&data),
            Err(Error::CorruptStream { bits: 2 })
        ));
    }

    #[test]
    fn test_duplicate_code_in_header() {
        let mut data = vec![0, 2, b'a', 1, 0x00, b'b', 1, 0x00];
        data.extend_from_slice(&1u64.to_be_bytes());
        data.push(0x00);
        assert!(matches!(
            decompress(&data),
            Err(Error::DuplicateCode { .. })
        ));
    }
}
