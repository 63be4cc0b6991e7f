use std::{
    ffi::OsString,
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::{
    bits::{pack, padding_len, unpack},
    config::CodecConfig,
    error::{CodecError, Result},
    frequency::FrequencyTable,
    prefix_code_table::{generate_codes, Codebook},
    sidecar::Sidecar,
};

const PARTIAL_SUFFIX: &str = ".partial";

/// Output of one compression run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compressed {
    pub payload: Vec<u8>,
    pub sidecar: String,
    pub summary: CompressionSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionSummary {
    pub original_bytes: usize,
    pub distinct_symbols: usize,
    pub bit_count: usize,
    /// Zero bits appended to fill the last payload byte.
    pub padding_bits: usize,
    pub payload_bytes: usize,
}

impl CompressionSummary {
    /// Payload size relative to the input, `0.0` for empty input.
    pub fn ratio(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        self.payload_bytes as f64 / self.original_bytes as f64
    }
}

/// Translates every byte through `codebook` into a string of `'0'`/`'1'`.
/// Bytes without a code are skipped.
pub fn encode(input: &[u8], codebook: &Codebook) -> String {
    let mut bits = String::with_capacity(input.len() * codebook.max_code_len().max(1));
    let mut skipped = 0_usize;
    for &byte in input {
        match codebook.get(byte) {
            Some(code) => bits.push_str(code),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!("skipped {skipped} bytes that have no code");
    }
    bits
}

/// Decodes `sidecar.stop_count` symbols from the front of `payload`; any
/// bits left after that are padding and ignored.
pub fn decode(payload: &[u8], sidecar: &Sidecar) -> Result<Vec<u8>> {
    let expected = sidecar.stop_count;
    if expected == 0 {
        return Ok(Vec::new());
    }

    // every symbol takes at least one bit
    let mut output = Vec::with_capacity(expected.min(payload.len().saturating_mul(8)));
    let codes = sidecar.codebook.decoding_table();
    let max_code_len = sidecar.codebook.max_code_len();
    let mut candidate = String::with_capacity(max_code_len);
    for (position, bit) in unpack(payload).chars().enumerate() {
        candidate.push(bit);
        if let Some(&symbol) = codes.get(candidate.as_str()) {
            output.push(symbol);
            candidate.clear();
            if output.len() == expected {
                return Ok(output);
            }
        } else if candidate.len() >= max_code_len {
            return Err(CodecError::malformed(format!(
                "bitstream does not match codebook at bit {position}"
            )));
        }
    }

    Err(CodecError::PayloadTruncated {
        expected,
        decoded: output.len(),
    })
}

pub fn compress(input: &[u8], config: &CodecConfig) -> Result<Compressed> {
    let table = FrequencyTable::from_bytes(input);
    debug!(
        "frequency table has {} symbols over {} bytes",
        table.len(),
        table.total()
    );

    let codebook = generate_codes(&table, config.merge_policy);
    let bits = encode(input, &codebook);
    let bit_count = bits.len();
    let payload = pack(&bits)?;

    let sidecar = Sidecar::new(input.len(), codebook).serialize(config.sidecar_format)?;

    let summary = CompressionSummary {
        original_bytes: input.len(),
        distinct_symbols: table.len(),
        bit_count,
        padding_bits: padding_len(bit_count),
        payload_bytes: payload.len(),
    };
    debug!("{summary:?}");

    Ok(Compressed {
        payload,
        sidecar,
        summary,
    })
}

pub fn decompress(payload: &[u8], sidecar: &str, config: &CodecConfig) -> Result<Vec<u8>> {
    let sidecar = Sidecar::deserialize(sidecar, config.sidecar_format)?;
    debug!(
        "decoding {} symbols with {} codes from {} payload bytes",
        sidecar.stop_count,
        sidecar.codebook.len(),
        payload.len()
    );
    decode(payload, &sidecar)
}

/// Buffers the whole source and compresses it.
pub fn compress_reader<R: Read>(mut reader: R, config: &CodecConfig) -> Result<Compressed> {
    let mut input = Vec::new();
    reader
        .read_to_end(&mut input)
        .map_err(CodecError::SourceUnreadable)?;
    compress(&input, config)
}

/// Compresses `reader` into a payload file and a sidecar file. Neither file is
/// touched unless both artifacts were computed.
pub fn compress_to_files<R: Read>(
    reader: R,
    payload_path: impl AsRef<Path>,
    sidecar_path: impl AsRef<Path>,
    config: &CodecConfig,
) -> Result<CompressionSummary> {
    let compressed = compress_reader(reader, config)?;
    write_all_or_nothing(&[
        (payload_path.as_ref(), compressed.payload.as_slice()),
        (sidecar_path.as_ref(), compressed.sidecar.as_bytes()),
    ])?;

    info!(
        "compressed {} bytes into {} ({} bytes)",
        compressed.summary.original_bytes,
        payload_path.as_ref().display(),
        compressed.summary.payload_bytes
    );
    Ok(compressed.summary)
}

/// Decompresses a payload/sidecar pair and writes the result to `writer`.
/// Returns the number of bytes written.
pub fn decompress_from_files<W: Write>(
    payload_path: impl AsRef<Path>,
    sidecar_path: impl AsRef<Path>,
    mut writer: W,
    config: &CodecConfig,
) -> Result<usize> {
    let payload = fs::read(payload_path.as_ref()).map_err(CodecError::PayloadUnreadable)?;
    let sidecar = fs::read(sidecar_path.as_ref()).map_err(CodecError::SidecarUnreadable)?;
    let sidecar = String::from_utf8(sidecar)
        .map_err(|err| CodecError::malformed(format!("sidecar is not valid UTF-8: {err}")))?;

    let output = decompress(&payload, &sidecar, config)?;

    writer.write_all(&output).map_err(CodecError::SinkUnwritable)?;
    writer.flush().map_err(CodecError::SinkUnwritable)?;

    info!(
        "decompressed {} into {} bytes",
        payload_path.as_ref().display(),
        output.len()
    );
    Ok(output.len())
}

/// Decompresses a payload/sidecar pair into `output_path`. The file only
/// appears once the whole output has been written.
pub fn decompress_to_file(
    payload_path: impl AsRef<Path>,
    sidecar_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &CodecConfig,
) -> Result<usize> {
    let mut output = Vec::new();
    decompress_from_files(payload_path, sidecar_path, &mut output, config)?;
    write_all_or_nothing(&[(output_path.as_ref(), output.as_slice())])?;
    Ok(output.len())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

fn discard(paths: &[PathBuf]) {
    for path in paths {
        if let Err(err) = fs::remove_file(path) {
            warn!("failed to remove {}: {err}", path.display());
        }
    }
}

/// Stages every artifact next to its destination, then renames them all into
/// place. Staged files are removed if any step fails.
fn write_all_or_nothing(artifacts: &[(&Path, &[u8])]) -> Result<()> {
    let mut staged = Vec::with_capacity(artifacts.len());
    for (path, contents) in artifacts {
        let partial = partial_path(path);
        if let Err(err) = fs::write(&partial, contents) {
            // a failed write may still have created the file
            if partial.exists() {
                staged.push(partial);
            }
            discard(&staged);
            return Err(CodecError::SinkUnwritable(err));
        }
        staged.push(partial);
    }

    for (index, (path, _)) in artifacts.iter().enumerate() {
        if let Err(err) = fs::rename(&staged[index], path) {
            discard(&staged[index..]);
            return Err(CodecError::SinkUnwritable(err));
        }
    }
    Ok(())
}
