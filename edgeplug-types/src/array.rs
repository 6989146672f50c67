//! Packed representations for the Sparkplug array datatypes.
//!
//! Numeric arrays are flat little-endian buffers with no length prefix (the
//! element count is the byte length divided by the element width). Boolean
//! arrays are bit packed behind a 4-byte little-endian count. String arrays
//! are NUL terminated UTF-8 strings.

use std::string::FromUtf8Error;

use paste::paste;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FromBytesError {
    #[error("invalid packed array format")]
    InvalidFormat,
    #[error("invalid packed array size")]
    InvalidSize,
    #[error("string array element decoding error {0}")]
    BadStringElement(#[from] FromUtf8Error),
}

macro_rules! define_numeric_packing {
    ($ty:ty) => {
        paste! {
            pub fn [<pack_ $ty _array>](values: Vec<$ty>) -> Vec<u8> {
                let mut out = Vec::with_capacity(values.len() * size_of::<$ty>());
                values.into_iter().for_each(|x| out.extend(x.to_le_bytes()));
                out
            }

            pub fn [<unpack_ $ty _array>](bytes: Vec<u8>) -> Result<Vec<$ty>, FromBytesError> {
                let width = std::mem::size_of::<$ty>();
                let len = bytes.len();
                if len % width != 0 {
                    return Err(FromBytesError::InvalidFormat);
                }
                let mut out = Vec::with_capacity(len / width);
                bytes.chunks_exact(width).for_each(|x| {
                    out.push(<$ty>::from_le_bytes(x.try_into().unwrap()));
                });
                Ok(out)
            }
        }
    };
}

define_numeric_packing!(i8);
define_numeric_packing!(i16);
define_numeric_packing!(i32);
define_numeric_packing!(u16);
define_numeric_packing!(u32);
define_numeric_packing!(f32);
define_numeric_packing!(f64);

fn pack_byte_with_bools(bools: &[bool]) -> u8 {
    bools
        .iter()
        .enumerate()
        .fold(0u8, |acc, (i, b)| acc | ((*b as u8) << (7 - i)))
}

/// Bit-packed bytes preceded by a 4-byte integer holding the total number of
/// boolean values. Bit `7 - i % 8` of each byte carries element `i`.
pub fn pack_bool_array(values: Vec<bool>) -> Vec<u8> {
    let count = values.len() as u32;
    let packed_len = count.div_ceil(8) as usize;
    let mut out = Vec::with_capacity(size_of::<u32>() + packed_len);
    out.extend(count.to_le_bytes());

    let chunks = values.chunks_exact(8);
    let remainder = chunks.remainder();
    chunks
        .into_iter()
        .for_each(|chunk| out.push(pack_byte_with_bools(chunk)));
    if !remainder.is_empty() {
        out.push(pack_byte_with_bools(remainder));
    }
    out
}

pub fn unpack_bool_array(bytes: Vec<u8>) -> Result<Vec<bool>, FromBytesError> {
    if bytes.len() < 4 {
        return Err(FromBytesError::InvalidSize);
    }
    let count = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let packed = &bytes[4..];
    if packed.len() < count.div_ceil(8) {
        return Err(FromBytesError::InvalidFormat);
    }

    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let mask = 1u8 << (7 - i % 8);
        out.push((packed[i / 8] & mask) != 0);
    }
    Ok(out)
}

/// Each element as its UTF-8 bytes followed by a single NUL terminator
pub fn pack_string_array(values: Vec<String>) -> Vec<u8> {
    let buffer_len = values.iter().fold(0usize, |len, s| len + s.len()) + values.len();
    let mut out = Vec::with_capacity(buffer_len);
    values.into_iter().for_each(|s| {
        out.extend(s.into_bytes());
        out.push(0x0);
    });
    out
}

pub fn unpack_string_array(bytes: Vec<u8>) -> Result<Vec<String>, FromBytesError> {
    match bytes.last() {
        Some(last) if *last != 0 => return Err(FromBytesError::InvalidFormat),
        Some(_) => (),
        None => return Ok(Vec::new()),
    }

    let mut out = Vec::new();
    let mut split = bytes.split(|x| *x == 0).peekable();
    while let Some(element) = split.next() {
        /* the terminator of the final element leaves one empty trailing split */
        if split.peek().is_none() {
            break;
        }
        out.push(String::from_utf8(element.into())?);
    }
    Ok(out)
}
