//! Static Huffman coding for text.
//!
//! A [`HuffmanTree`] built from symbol counts yields a [`CodeTable`], which is
//! saved as a text file and later loaded by a [`Compressor`] to pack text
//! into bytes and back.

mod bitvec;
mod compressor;
mod error;
mod frequency;
mod options;
mod table;
mod tree;

pub use bitvec::{least_bytes_repr_for_bits, pack, unpack, BitIterator, BitVec, BitView};
pub use compressor::{Compressor, Decoded, DecodedText, WriteOutcome, UNKNOWN_PLACEHOLDER};
pub use error::{Error, Result, TableLineError};
pub use frequency::FrequencyTable;
pub use options::{CodecOptions, Framing, OverwritePolicy, UnknownSymbolPolicy};
pub use table::CodeTable;
pub use tree::{derive_codes, HuffmanTree, Node, MIN_DISTINCT_SYMBOLS};


/// Counts the characters of `text` and derives their codes.
///
/// The table is empty when `text` has fewer than [`MIN_DISTINCT_SYMBOLS`]
/// distinct characters.
pub fn build_code_table(text: &str) -> CodeTable<char> {

    let frequencies = FrequencyTable::count(text.chars());
    log::debug!("Counted {} characters, {} distinct", frequencies.total(), frequencies.len());
    log::trace!("Frequencies: {:?}", frequencies);

    match HuffmanTree::build(&frequencies) {

        Some(tree) => {
            log::trace!("Huffman tree: {:?}", tree);
            tree.codes()
        },

        None => CodeTable::new()
    }
}
