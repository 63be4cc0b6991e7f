use clap::ValueEnum;

/// How the prefix tree picks the next two nodes to merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MergePolicy {
    /// Always merge the first two nodes of the working sequence and append
    /// the parent to the end. Code lengths are not minimal.
    #[default]
    Legacy,
    /// Always merge the two lightest nodes (classic Huffman).
    MinRedundancy,
}

/// Encoding used for the codebook entries inside the sidecar file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SidecarFormat {
    /// `<symbol>:<code>;` entries with the symbol written in decimal.
    #[default]
    Escaped,
    /// Symbol and code written back to back. Cannot represent the symbols
    /// `'0'` and `'1'`.
    Legacy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodecConfig {
    pub merge_policy: MergePolicy,
    pub sidecar_format: SidecarFormat,
}

impl CodecConfig {
    pub fn new(merge_policy: MergePolicy, sidecar_format: SidecarFormat) -> Self {
        Self {
            merge_policy,
            sidecar_format,
        }
    }
}
