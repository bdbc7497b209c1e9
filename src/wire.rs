//! Little-endian primitives shared by the board and world codecs.
//!
//! Strings are Pascal-style: one length byte followed by a fixed-size
//! field. Reads tolerate a stored length larger than the field by clamping.

use std::io::{Read, Write};

use crate::error::FormatResult;

pub(crate) fn read_u8<R: Read>(r: &mut R) -> FormatResult<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub(crate) fn read_bool<R: Read>(r: &mut R) -> FormatResult<bool> {
    Ok(read_u8(r)? != 0)
}

pub(crate) fn read_i16<R: Read>(r: &mut R) -> FormatResult<i16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(i16::from_le_bytes(buf))
}

pub(crate) fn read_u16<R: Read>(r: &mut R) -> FormatResult<u16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

pub(crate) fn read_bytes<R: Read>(r: &mut R, len: usize) -> FormatResult<Vec<u8>> {
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

pub(crate) fn skip<R: Read>(r: &mut R, len: usize) -> FormatResult<()> {
    read_bytes(r, len).map(|_| ())
}

/// Reads a length byte plus a `capacity`-byte field.
pub(crate) fn read_pstring<R: Read>(r: &mut R, capacity: usize) -> FormatResult<String> {
    let len = usize::from(read_u8(r)?).min(capacity);
    let field = read_bytes(r, capacity)?;
    Ok(bytes_to_string(&field[..len]))
}

/// One char per byte, the inverse of [`string_bytes`].
pub(crate) fn bytes_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

pub(crate) fn write_u8<W: Write>(w: &mut W, value: u8) -> FormatResult<()> {
    w.write_all(&[value])?;
    Ok(())
}

pub(crate) fn write_bool<W: Write>(w: &mut W, value: bool) -> FormatResult<()> {
    write_u8(w, u8::from(value))
}

pub(crate) fn write_i16<W: Write>(w: &mut W, value: i16) -> FormatResult<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub(crate) fn write_u16<W: Write>(w: &mut W, value: u16) -> FormatResult<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub(crate) fn write_zeros<W: Write>(w: &mut W, len: usize) -> FormatResult<()> {
    w.write_all(&vec![0u8; len])?;
    Ok(())
}

/// Writes a length byte plus a `capacity`-byte field, truncating long values.
pub(crate) fn write_pstring<W: Write>(w: &mut W, value: &str, capacity: usize) -> FormatResult<()> {
    let bytes = string_bytes(value);
    let len = bytes.len().min(capacity);
    write_u8(w, len as u8)?;
    w.write_all(&bytes[..len])?;
    write_zeros(w, capacity - len)
}

/// Strings hold one byte per char; code points above 0xFF are replaced with `?`.
pub(crate) fn string_bytes(value: &str) -> Vec<u8> {
    value
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
