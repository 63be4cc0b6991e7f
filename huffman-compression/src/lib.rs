//! Prefix-code compressor. [`compress`] turns bytes into a packed payload and a
//! text sidecar holding the codebook; [`decompress`] reverses it.
//!
//! ```
//! use huffman_compression::{compress, decompress, CodecConfig};
//!
//! let config = CodecConfig::default();
//! let compressed = compress(b"aaabbc", &config)?;
//! assert_eq!(compressed.payload, vec![0xfe, 0x80]);
//! assert_eq!(compressed.sidecar, "6#97:11;98:10;99:0;");
//!
//! let original = decompress(&compressed.payload, &compressed.sidecar, &config)?;
//! assert_eq!(original, b"aaabbc");
//! # Ok::<(), huffman_compression::CodecError>(())
//! ```

pub mod bits;
pub mod config;
pub mod encode_decode;
pub mod error;
pub mod frequency;
pub mod prefix_code_table;
pub mod sidecar;
pub mod tree;

pub use config::{CodecConfig, MergePolicy, SidecarFormat};
pub use encode_decode::{
    compress, compress_reader, compress_to_files, decompress, decompress_from_files,
    decompress_to_file, Compressed, CompressionSummary,
};
pub use error::{CodecError, Result};
pub use frequency::FrequencyTable;
pub use prefix_code_table::{generate_codes, Codebook};
pub use sidecar::Sidecar;
pub use tree::PrefixTree;
