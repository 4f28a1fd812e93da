//! # bytehuff
//!
//! Byte-oriented Huffman compression. A compressed file carries its own code
//! table, so it can be decoded without the original input.
//!
//! ```rust
//! let packed = bytehuff::compress(b"abracadabra")?;
//! assert_eq!(bytehuff::decompress(&packed)?, b"abracadabra");
//! # Ok::<(), bytehuff::Error>(())
//! ```

pub mod bitstream;
pub mod code;
pub mod codec;
pub mod error;
pub mod format;
pub mod heap;
pub mod huffman;

pub use code::{Code, MAX_CODE_LEN};
pub use codec::{DecodeSummary, EncodeSummary, Encoder, compress, decode, decompress, encode};
pub use error::{Error, Result};
pub use huffman::{CodeTable, FrequencyTable, HuffmanTree, Node, NodeRef, ReverseTable};
