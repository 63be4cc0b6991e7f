//! Text file stored next to the payload: the number of symbols to decode,
//! a `#`, then the codebook.
//!
//! Two entry encodings exist. [`SidecarFormat::Escaped`] writes
//! `<symbol>:<code>;` with the symbol in decimal, so every byte value can be a
//! key. [`SidecarFormat::Legacy`] writes the symbol character followed directly
//! by its code; any character other than `0`/`1` starts a new entry.

use std::fmt::Write;

use crate::{
    config::SidecarFormat,
    error::{CodecError, Result},
    prefix_code_table::Codebook,
};

const COUNT_DELIMITER: char = '#';
const SYMBOL_DELIMITER: char = ':';
const ENTRY_TERMINATOR: char = ';';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sidecar {
    /// Original input length in bytes.
    pub stop_count: usize,
    pub codebook: Codebook,
}

impl Sidecar {
    pub fn new(stop_count: usize, codebook: Codebook) -> Self {
        Self {
            stop_count,
            codebook,
        }
    }

    pub fn serialize(&self, format: SidecarFormat) -> Result<String> {
        let mut out = format!("{}{COUNT_DELIMITER}", self.stop_count);
        match format {
            SidecarFormat::Escaped => {
                for (symbol, code) in self.codebook.iter() {
                    let _ = write!(out, "{symbol}{SYMBOL_DELIMITER}{code}{ENTRY_TERMINATOR}");
                }
            }
            SidecarFormat::Legacy => {
                for (symbol, code) in self.codebook.iter() {
                    if is_code_char(char::from(symbol)) {
                        return Err(CodecError::UnsupportedSymbol(symbol));
                    }
                    out.push(char::from(symbol));
                    out.push_str(code);
                }
            }
        }
        Ok(out)
    }

    pub fn deserialize(text: &str, format: SidecarFormat) -> Result<Self> {
        let (count, entries) = text
            .split_once(COUNT_DELIMITER)
            .ok_or_else(|| CodecError::malformed(format!("missing '{COUNT_DELIMITER}' delimiter")))?;
        if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::malformed(format!(
                "stop count {count:?} is not a decimal number"
            )));
        }
        let stop_count = count
            .parse::<usize>()
            .map_err(|err| CodecError::malformed(format!("invalid stop count {count:?}: {err}")))?;

        let codebook = match format {
            SidecarFormat::Escaped => parse_escaped(entries)?,
            SidecarFormat::Legacy => parse_legacy(entries)?,
        };

        if !codebook.is_prefix_free() {
            return Err(CodecError::malformed("codebook is not prefix-free"));
        }

        Ok(Sidecar {
            stop_count,
            codebook,
        })
    }
}

fn is_code_char(ch: char) -> bool {
    matches!(ch, '0' | '1')
}

fn validate_code(symbol: u8, code: &str) -> Result<()> {
    if code.is_empty() {
        return Err(CodecError::malformed(format!("symbol {symbol} has an empty code")));
    }
    if let Some(ch) = code.chars().find(|&ch| !is_code_char(ch)) {
        return Err(CodecError::malformed(format!(
            "code for symbol {symbol} contains {ch:?}"
        )));
    }
    Ok(())
}

fn insert_unique(codebook: &mut Codebook, symbol: u8, code: String) -> Result<()> {
    if codebook.insert(symbol, code).is_some() {
        return Err(CodecError::malformed(format!("symbol {symbol} appears twice")));
    }
    Ok(())
}

fn parse_escaped(entries: &str) -> Result<Codebook> {
    // tolerate a trailing newline added by an editor
    let entries = entries.trim_end();
    if !entries.is_empty() && !entries.ends_with(ENTRY_TERMINATOR) {
        return Err(CodecError::malformed(format!(
            "last entry is not terminated by '{ENTRY_TERMINATOR}'"
        )));
    }

    let mut codebook = Codebook::new();
    for (index, entry) in entries.split_terminator(ENTRY_TERMINATOR).enumerate() {
        let (symbol, code) = entry.split_once(SYMBOL_DELIMITER).ok_or_else(|| {
            CodecError::malformed(format!("entry {index} ({entry:?}) has no '{SYMBOL_DELIMITER}'"))
        })?;
        let symbol = symbol
            .parse::<u8>()
            .map_err(|err| CodecError::malformed(format!("entry {index} has symbol {symbol:?}: {err}")))?;
        validate_code(symbol, code)?;
        insert_unique(&mut codebook, symbol, code.to_owned())?;
    }
    Ok(codebook)
}

fn parse_legacy(entries: &str) -> Result<Codebook> {
    let mut pairs: Vec<(u8, String)> = Vec::new();
    for ch in entries.chars() {
        if is_code_char(ch) {
            let (_, code) = pairs
                .last_mut()
                .ok_or_else(|| CodecError::malformed("code bits before the first symbol"))?;
            code.push(ch);
        } else {
            let symbol = u8::try_from(u32::from(ch))
                .map_err(|_| CodecError::malformed(format!("{ch:?} is not a single-byte symbol")))?;
            pairs.push((symbol, String::new()));
        }
    }

    let mut codebook = Codebook::new();
    for (symbol, code) in pairs {
        validate_code(symbol, &code)?;
        insert_unique(&mut codebook, symbol, code)?;
    }
    Ok(codebook)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::Sidecar;
    use crate::{config::SidecarFormat, error::CodecError, prefix_code_table::Codebook};

    fn scenario() -> Sidecar {
        let codebook = [(b'a', "11"), (b'b', "10"), (b'c', "0")]
            .into_iter()
            .map(|(symbol, code)| (symbol, code.to_owned()))
            .collect();
        Sidecar::new(6, codebook)
    }

    #[rstest]
    #[case(SidecarFormat::Escaped, "6#97:11;98:10;99:0;")]
    #[case(SidecarFormat::Legacy, "6#a11b10c0")]
    fn test_serialize(#[case] format: SidecarFormat, #[case] expected: &str) {
        assert_eq!(scenario().serialize(format).unwrap(), expected);
        assert_eq!(Sidecar::deserialize(expected, format).unwrap(), scenario());
    }

    #[rstest]
    #[case(SidecarFormat::Escaped)]
    #[case(SidecarFormat::Legacy)]
    fn test_empty_codebook(#[case] format: SidecarFormat) {
        let sidecar = Sidecar::new(0, Codebook::new());
        let text = sidecar.serialize(format).unwrap();
        assert_eq!(text, "0#");
        assert_eq!(Sidecar::deserialize(&text, format).unwrap(), sidecar);
    }

    #[test]
    fn test_escaped_handles_every_byte() {
        let codebook: Codebook = [(b'#', "0"), (b'0', "10"), (b';', "110"), (0xff, "111")]
            .into_iter()
            .map(|(symbol, code)| (symbol, code.to_owned()))
            .collect();
        let sidecar = Sidecar::new(9, codebook);

        let text = sidecar.serialize(SidecarFormat::Escaped).unwrap();
        assert_eq!(text, "9#35:0;48:10;59:110;255:111;");
        assert_eq!(Sidecar::deserialize(&text, SidecarFormat::Escaped).unwrap(), sidecar);
    }

    #[test]
    fn test_escaped_tolerates_trailing_newline() {
        let parsed = Sidecar::deserialize("6#97:11;98:10;99:0;\n", SidecarFormat::Escaped).unwrap();
        assert_eq!(parsed, scenario());
    }

    #[test]
    fn test_legacy_reads_non_ascii_and_delimiters() {
        let parsed = Sidecar::deserialize("3#\u{e9}1#0", SidecarFormat::Legacy).unwrap();
        assert_eq!(parsed.stop_count, 3);
        assert_eq!(parsed.codebook.get(0xe9), Some("1"));
        assert_eq!(parsed.codebook.get(b'#'), Some("0"));
    }

    #[rstest]
    #[case(b'0')]
    #[case(b'1')]
    fn test_legacy_cannot_write_code_characters(#[case] symbol: u8) {
        let mut codebook = Codebook::new();
        codebook.insert(symbol, "0");
        codebook.insert(b'z', "1");
        let err = Sidecar::new(2, codebook)
            .serialize(SidecarFormat::Legacy)
            .unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedSymbol(s) if s == symbol));
    }

    #[rstest]
    #[case("97:11;", SidecarFormat::Escaped)]
    #[case("x#97:11;", SidecarFormat::Escaped)]
    #[case("-1#", SidecarFormat::Escaped)]
    #[case("+6#97:11;98:10;99:0;", SidecarFormat::Escaped)]
    #[case(" 6#97:11;98:10;99:0;", SidecarFormat::Escaped)]
    #[case("99999999999999999999999#", SidecarFormat::Escaped)]
    #[case("+6#a11b10c0", SidecarFormat::Legacy)]
    #[case("#97:1;", SidecarFormat::Escaped)]
    #[case("2#97:11", SidecarFormat::Escaped)]
    #[case("2#97-11;", SidecarFormat::Escaped)]
    #[case("2#300:1;", SidecarFormat::Escaped)]
    #[case("2#97:;", SidecarFormat::Escaped)]
    #[case("2#97:12;", SidecarFormat::Escaped)]
    #[case("2#97:1;97:0;", SidecarFormat::Escaped)]
    #[case("2#97:1;98:10;", SidecarFormat::Escaped)]
    #[case("2#;", SidecarFormat::Escaped)]
    #[case("a1b0", SidecarFormat::Legacy)]
    #[case("2#1a0", SidecarFormat::Legacy)]
    #[case("2#ab0", SidecarFormat::Legacy)]
    #[case("2#a1a0", SidecarFormat::Legacy)]
    #[case("2#\u{263a}1a0", SidecarFormat::Legacy)]
    #[case("2#a1b10", SidecarFormat::Legacy)]
    fn test_malformed(#[case] text: &str, #[case] format: SidecarFormat) {
        let err = Sidecar::deserialize(text, format).unwrap_err();
        assert!(matches!(err, CodecError::SidecarMalformed(_)), "{err}");
    }
}
