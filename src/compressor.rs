use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::bitvec::{self, BitVec, BitView};
use crate::error::{Error, Result};
use crate::options::{CodecOptions, Framing, OverwritePolicy, UnknownSymbolPolicy};
use crate::table::CodeTable;


/// Character written in place of an undecodable bit run.
pub const UNKNOWN_PLACEHOLDER: char = '?';


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {

    Symbol(char),
    /// A run of bits longer than any code that matched nothing.
    Unknown,

}


#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedText(Vec<Decoded>);

impl DecodedText {

    pub fn len(&self) -> usize {
        self.0.len()
    }


    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }


    pub fn as_slice(&self) -> &[Decoded] {
        &self.0
    }


    /// The decoded symbols, leaving out undecodable runs.
    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().filter_map(|d| match d {
            Decoded::Symbol(ch) => Some(*ch),
            Decoded::Unknown => None
        })
    }


    pub fn unknown_count(&self) -> usize {
        self.0.iter().filter(|d| **d == Decoded::Unknown).count()
    }

}

impl fmt::Display for DecodedText {

    /// Writes the text with [`UNKNOWN_PLACEHOLDER`] for undecodable runs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;

        for d in &self.0 {
            f.write_char(match d {
                Decoded::Symbol(ch) => *ch,
                Decoded::Unknown => UNKNOWN_PLACEHOLDER
            })?;
        }
        Ok(())
    }

}

impl FromIterator<Decoded> for DecodedText {
    fn from_iter<I: IntoIterator<Item = Decoded>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {

    Written,
    /// The file existed and the overwrite policy declined.
    Skipped,

}


/// Encodes and decodes text with a fixed code table.
#[derive(Debug, Clone)]
pub struct Compressor {

    table: CodeTable<char>,
    reverse: HashMap<BitVec, char>,
    max_code_len: usize,
    options: CodecOptions

}

impl Compressor {

    /// Fails if two symbols share a code.
    pub fn new(table: CodeTable<char>, options: CodecOptions) -> Result<Self> {

        let mut reverse = HashMap::with_capacity(table.len());

        for (&symbol, code) in &table {
            if let Some(first) = reverse.insert(code.clone(), symbol) {
                return Err(Error::DuplicateCode { code: code.to_string(), first, second: symbol });
            }
        }

        if !table.is_prefix_free() {
            log::warn!("Code table is not prefix-free, decoding will favour shorter codes");
        }

        Ok(Self {
            max_code_len: table.max_code_len(),
            table,
            reverse,
            options
        })
    }


    pub fn from_table_file(path: impl AsRef<Path>, options: CodecOptions) -> Result<Self> {
        Self::new(CodeTable::load(path)?, options)
    }


    pub const fn table(&self) -> &CodeTable<char> {
        &self.table
    }


    /// Concatenates the codes of every symbol of `text`.
    pub fn encode_bits(&self, text: &str) -> Result<BitVec> {

        let mut encoded = BitVec::new();
        let mut skipped = 0_usize;

        for ch in text.chars() {
            match self.table.get(&ch) {

                Some(code) => encoded.extend_from_bits(&code.as_bit_view()),

                None => match self.options.unknown_symbols {
                    UnknownSymbolPolicy::Skip => skipped += 1,
                    UnknownSymbolPolicy::Fail => return Err(Error::UnknownSymbol(ch))
                }
            }
        }

        if skipped != 0 {
            log::debug!("Skipped {skipped} symbols without a code");
        }

        Ok(encoded)
    }


    /// Encodes `text` into the packed artifact.
    pub fn encode(&self, text: &str) -> Result<Box<[u8]>> {

        let bits = self.encode_bits(text)?;

        let bytes = match self.options.framing {
            Framing::Raw => bitvec::pack(&bits.as_bit_view()),
            Framing::PaddingHeader => bits.serialize()
        };

        log::debug!("Encoded {} symbols into {} bits ({} bytes)", text.chars().count(), bits.len_bits(), bytes.len());

        Ok(bytes)
    }


    /// Greedy decoding: bits accumulate until they equal a code. A run longer
    /// than the longest code becomes [`Decoded::Unknown`] and is discarded.
    /// Bits left over at the end that complete no code are dropped.
    pub fn decode_bits(&self, bits: &BitView) -> DecodedText {

        let mut decoded = Vec::new();
        let mut candidate = BitVec::new();

        for bit in bits.iter_bits() {

            candidate.append_bit(bit);

            if let Some(&symbol) = self.reverse.get(&candidate) {
                decoded.push(Decoded::Symbol(symbol));
                candidate.clear();
            } else if candidate.len_bits() > self.max_code_len {
                decoded.push(Decoded::Unknown);
                candidate.clear();
            }
        }

        if !candidate.is_empty() {
            log::trace!("{} trailing bits decode to nothing", candidate.len_bits());
        }

        let decoded = DecodedText(decoded);

        let unknown = decoded.unknown_count();
        if unknown != 0 {
            log::warn!("{unknown} bit runs matched no code");
        }

        decoded
    }


    /// Decodes a packed artifact.
    ///
    /// With [`Framing::Raw`] the last decoded character is always removed,
    /// since the zero padding usually decodes to one spurious symbol. This is
    /// only exact when it does.
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodedText> {

        match self.options.framing {

            Framing::Raw => {
                let mut decoded = self.decode_bits(&bitvec::unpack(bytes).as_bit_view());
                decoded.0.pop();
                Ok(decoded)
            },

            Framing::PaddingHeader => {
                let bits = BitVec::deserialize(bytes)?;
                Ok(self.decode_bits(&bits.as_bit_view()))
            }
        }
    }


    /// Encodes `text` and writes it to `path` if `overwrite` allows it.
    pub fn compress_to_file(&self, text: &str, path: impl AsRef<Path>, overwrite: &mut OverwritePolicy) -> Result<WriteOutcome> {

        let path = path.as_ref();

        let bytes = self.encode(text)?;

        write_checked(path, &bytes, overwrite)
    }


    /// Decodes the artifact at `src` and writes the text to `dst` if
    /// `overwrite` allows it. The decoded text is returned either way.
    pub fn decompress_file(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>, overwrite: &mut OverwritePolicy) -> Result<DecodedText> {

        let src = src.as_ref();

        let bytes = fs::read(src)
            .map_err(|e| Error::io(src, e))?;

        let decoded = self.decode(&bytes)?;

        write_checked(dst.as_ref(), decoded.to_string().as_bytes(), overwrite)?;

        Ok(decoded)
    }

}


fn write_checked(path: &Path, contents: &[u8], overwrite: &mut OverwritePolicy) -> Result<WriteOutcome> {

    if !overwrite.allows(path) {
        log::info!("Not overwriting {}", path.display());
        return Ok(WriteOutcome::Skipped);
    }

    fs::write(path, contents)
        .map_err(|e| Error::io(path, e))?;

    log::info!("Wrote {} bytes to {}", contents.len(), path.display());

    Ok(WriteOutcome::Written)
}


#[cfg(test)]
mod tests {

    use std::env;
    use std::path::PathBuf;

    use super::*;
    use crate::tree::HuffmanTree;


    const TEXT: &str = "It is a truth universally acknowledged, that a single man in possession\n\
                        of a good fortune, must be in want of a wife.\n";


    fn table(entries: &[(char, &str)]) -> CodeTable<char> {
        entries.iter()
            .map(|(ch, code)| (*ch, code.parse().unwrap()))
            .collect()
    }


    fn abc() -> Compressor {
        // a=1 c=00 b=01, as built from {a:5, b:2, c:1}
        Compressor::new(table(&[('a', "1"), ('b', "01"), ('c', "00")]), CodecOptions::default()).unwrap()
    }


    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("static_huffman_{}_{}", std::process::id(), name))
    }


    #[test]
    fn raw_round_trip_drops_padding_symbol() {

        let compressor = abc();

        let packed = compressor.encode("abc").unwrap();

        // 1 01 00 + 000 padding
        assert_eq!(*packed, [0b1010_0000]);

        assert_eq!(compressor.decode(&packed).unwrap().to_string(), "abc");
    }


    #[test]
    fn raw_round_trip_loses_last_symbol_without_padding() {

        let compressor = abc();

        let packed = compressor.encode("aaaaaaaa").unwrap();

        assert_eq!(*packed, [0xFF]);
        assert_eq!(compressor.decode(&packed).unwrap().to_string(), "aaaaaaa");
    }


    #[test]
    fn framed_round_trip_is_exact() {

        let codes = HuffmanTree::from_text(TEXT.chars()).unwrap().codes();
        let compressor = Compressor::new(codes, CodecOptions::framed()).unwrap();

        for text in [TEXT, "a", "", "wife"] {

            let packed = compressor.encode(text).unwrap();
            let decoded = compressor.decode(&packed).unwrap();

            assert_eq!(decoded.to_string(), text);
            assert_eq!(decoded.unknown_count(), 0);
        }
    }


    #[test]
    fn raw_round_trip_of_longer_text() {

        let codes = HuffmanTree::from_text(TEXT.chars()).unwrap().codes();
        let compressor = Compressor::new(codes, CodecOptions::default()).unwrap();

        let decoded = compressor.decode(&compressor.encode(TEXT).unwrap()).unwrap().to_string();

        // Whatever the padding decoded to, everything before the last character survives
        assert!(decoded.starts_with(&TEXT[..TEXT.len() - 1]));
    }


    #[test]
    fn undecodable_runs_become_unknown() {

        let compressor = Compressor::new(table(&[('a', "0"), ('b', "10")]), CodecOptions::default()).unwrap();

        let bits: BitVec = "0101110".parse().unwrap();
        let decoded = compressor.decode_bits(&bits.as_bit_view());

        assert_eq!(
            decoded.as_slice(),
            [Decoded::Symbol('a'), Decoded::Symbol('b'), Decoded::Unknown, Decoded::Symbol('a')]
        );
        assert_eq!(decoded.to_string(), "ab?a");
        assert_eq!(decoded.symbols().collect::<String>(), "aba");
        assert_eq!(decoded.unknown_count(), 1);
    }


    #[test]
    fn unknown_symbols_on_encode() {

        let lenient = abc();
        let strict = Compressor::new(
            lenient.table().clone(),
            CodecOptions::default().with_unknown_symbols(UnknownSymbolPolicy::Fail)
        ).unwrap();

        assert_eq!(lenient.encode_bits("azb").unwrap().to_string(), "101");
        assert!(matches!(strict.encode("azb"), Err(Error::UnknownSymbol('z'))));
    }


    #[test]
    fn duplicate_codes_are_rejected() {

        let res = Compressor::new(table(&[('a', "1"), ('b', "0"), ('c', "1")]), CodecOptions::default());

        assert!(matches!(
            res,
            Err(Error::DuplicateCode { first: 'a', second: 'c', .. })
        ));
    }


    #[test]
    fn empty_table_encodes_nothing() {

        let compressor = Compressor::new(CodeTable::new(), CodecOptions::default()).unwrap();

        let packed = compressor.encode("xxxx").unwrap();

        assert!(packed.is_empty());
        assert!(compressor.decode(&packed).unwrap().is_empty());
    }


    #[test]
    fn framed_decode_rejects_empty_input() {

        let compressor = Compressor::new(table(&[('a', "0"), ('b', "10"), ('c', "11")]), CodecOptions::framed()).unwrap();

        assert!(matches!(compressor.decode(&[]), Err(Error::MissingHeader)));
    }


    #[test]
    fn files_respect_overwrite_policy() {

        let table_path = temp_path("table.txt");
        let packed_path = temp_path("packed.bin");
        let text_path = temp_path("decoded.txt");

        HuffmanTree::from_text(TEXT.chars()).unwrap().codes().save(&table_path).unwrap();
        let compressor = Compressor::from_table_file(&table_path, CodecOptions::framed()).unwrap();

        assert_eq!(
            compressor.compress_to_file(TEXT, &packed_path, &mut OverwritePolicy::Never).unwrap(),
            WriteOutcome::Written
        );
        let first = fs::read(&packed_path).unwrap();

        assert_eq!(
            compressor.compress_to_file("a wife", &packed_path, &mut OverwritePolicy::Never).unwrap(),
            WriteOutcome::Skipped
        );
        assert_eq!(fs::read(&packed_path).unwrap(), first);

        let decoded = compressor.decompress_file(&packed_path, &text_path, &mut OverwritePolicy::Always).unwrap();
        assert_eq!(decoded.to_string(), TEXT);
        assert_eq!(fs::read_to_string(&text_path).unwrap(), TEXT);

        let mut declined = OverwritePolicy::ask(|_| false);
        compressor.compress_to_file("a wife", &packed_path, &mut OverwritePolicy::Always).unwrap();
        let decoded = compressor.decompress_file(&packed_path, &text_path, &mut declined).unwrap();
        assert_eq!(decoded.to_string(), "a wife");
        assert_eq!(fs::read_to_string(&text_path).unwrap(), TEXT);

        for path in [table_path, packed_path, text_path] {
            fs::remove_file(path).unwrap();
        }
    }


    #[test]
    fn missing_artifact() {

        let compressor = abc();

        let res = compressor.decompress_file(
            temp_path("missing.bin"),
            temp_path("never_written.txt"),
            &mut OverwritePolicy::Always
        );

        assert!(matches!(res, Err(Error::Io { .. })));
    }

}
