use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};


/// A growable sequence of bits, stored most-significant bit first.
///
/// Padding bits in the last byte are always zero, so two vectors holding the
/// same bits compare and hash equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BitVec {

    /// The actual raw bits
    raw_data: Vec<u8>,
    /// How many bits of padding the last byte contains.
    /// Padding bits have no meaning
    last_byte_padding: u8

}

impl BitVec {

    pub fn new() -> Self {
        Self {
            raw_data: Vec::new(),
            last_byte_padding: 0
        }
    }


    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            raw_data: Vec::with_capacity(least_bytes_repr_for_bits(capacity)),
            last_byte_padding: 0
        }
    }


    pub fn len_bits(&self) -> usize {
        self.raw_data.len() * 8 - self.last_byte_padding as usize
    }


    pub fn is_empty(&self) -> bool {
        self.raw_data.is_empty()
    }


    pub fn least_len_bytes(&self) -> usize {
        self.raw_data.len()
    }


    pub fn append_bit(&mut self, bit: bool) {

        if self.last_byte_padding == 0 {

            self.raw_data.push((bit as u8) << 7);
            self.last_byte_padding = 7;

        } else if let Some(last_byte) = self.raw_data.last_mut() {

            *last_byte |= (bit as u8) << (self.last_byte_padding - 1);

            self.last_byte_padding -= 1;
        }
    }


    /// Returns a copy of `self` with `bit` appended.
    pub fn with_bit(&self, bit: bool) -> Self {
        let mut res = self.clone();
        res.append_bit(bit);
        res
    }


    pub fn extend_from_bits(&mut self, bit_view: &BitView) {

        if self.last_byte_padding == 0 {

            // The bits are aligned, so this is valid

            self.raw_data.extend_from_slice(bit_view.raw_data);
            self.last_byte_padding = bit_view.last_byte_padding;

            // A view over foreign bytes may carry garbage in its padding
            if let Some(last_byte) = self.raw_data.last_mut() {
                *last_byte &= padding_mask(self.last_byte_padding);
            }

        } else {

            for bit in bit_view.iter_bits() {
                self.append_bit(bit)
            }

        }
    }


    pub fn clear(&mut self) {
        self.raw_data.clear();
        self.last_byte_padding = 0;
    }


    pub fn as_bit_view(&self) -> BitView {
        BitView {
            raw_data: &self.raw_data,
            last_byte_padding: self.last_byte_padding
        }
    }


    pub fn iter_bits(&self) -> BitIterator {
        BitIterator {
            bits: self.as_bit_view(),
            i: 0,
        }
    }


    pub fn from_bool_slice(bools: &[bool]) -> Self {

        let mut res = Self::with_capacity(bools.len());

        for &b in bools {
            res.append_bit(b)
        }

        res
    }


    pub fn to_bool_slice(&self) -> Box<[bool]>{
        self.iter_bits()
            .collect()
    }


    /// Serializes the bits behind a one-byte header holding the padding
    /// length of the last byte.
    pub fn serialize(&self) -> Box<[u8]> {

        let mut buf = Vec::with_capacity(1 + self.least_len_bytes());

        buf.push(self.last_byte_padding);

        buf.extend_from_slice(&self.raw_data);

        buf.into_boxed_slice()
    }


    pub fn deserialize(input: &[u8]) -> Result<Self> {

        let (&last_byte_padding, raw_data) = input.split_first()
            .ok_or(Error::MissingHeader)?;

        if last_byte_padding > 7 || (raw_data.is_empty() && last_byte_padding != 0) {
            return Err(Error::InvalidPadding(last_byte_padding));
        }

        let mut res = Self {
            raw_data: raw_data.to_vec(),
            last_byte_padding
        };

        if let Some(last_byte) = res.raw_data.last_mut() {
            *last_byte &= padding_mask(last_byte_padding);
        }

        Ok(res)
    }

}


impl fmt::Display for BitVec {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter_bits() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }

}


impl FromStr for BitVec {
    type Err = Error;

    /// Parses a string of '0' and '1' characters.
    fn from_str(s: &str) -> Result<Self> {

        let mut res = Self::with_capacity(s.len());

        for ch in s.chars() {
            match ch {
                '0' => res.append_bit(false),
                '1' => res.append_bit(true),
                other => return Err(Error::InvalidBit(other))
            }
        }

        Ok(res)
    }
}


pub const fn least_bytes_repr_for_bits(bit_count: usize) -> usize {
    bit_count / 8 + (bit_count % 8 != 0) as usize
}


/// Keeps the meaningful high bits of a byte followed by `padding` zero bits.
const fn padding_mask(padding: u8) -> u8 {
    ((0xFF_u16 << padding) & 0xFF) as u8
}


/// Packs bits into bytes, most-significant bit first, zero-padding the last
/// byte. The output carries no length information.
pub fn pack(bits: &BitView) -> Box<[u8]> {

    let mut bytes = bits.raw_data.to_vec();

    if let Some(last_byte) = bytes.last_mut() {
        *last_byte &= padding_mask(bits.last_byte_padding);
    }

    bytes.into_boxed_slice()
}


/// Expands every byte into 8 bits, most-significant bit first.
pub fn unpack(bytes: &[u8]) -> BitVec {
    BitVec {
        raw_data: bytes.to_vec(),
        last_byte_padding: 0
    }
}


#[derive(Clone)]
pub struct BitView<'a> {

    pub(super) raw_data: &'a [u8],
    pub(super) last_byte_padding: u8

}

impl<'a> BitView<'a> {

    pub fn iter_bits(&'a self) -> BitIterator<'a> {
        BitIterator {
            bits: self.clone(),
            i: 0
        }
    }


    pub fn len_bits(&self) -> usize {
        (self.raw_data.len() * 8).saturating_sub(self.last_byte_padding as usize)
    }

}


pub struct BitIterator<'a> {

    bits: BitView<'a>,
    i: usize

}

impl<'a> Iterator for BitIterator<'a> {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {

        if self.i >= self.bits.len_bits() {
            return None;
        }

        let byte = self.bits.raw_data[self.i / 8];

        let bit_in_byte_i = (self.i % 8) as u8;

        self.i += 1;

        Some(
            (byte & (1_u8 << (7 - bit_in_byte_i))) != 0
        )
    }
}
