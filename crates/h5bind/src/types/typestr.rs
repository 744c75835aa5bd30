//! numpy-style type strings (`<i4`, `>f8`, `|b1`, `|S10`, ...).
//!
//! Codes: `i` signed, `u` unsigned, `f` float, `b` boolean, `S` fixed ASCII string,
//! `U` fixed UTF-8 string (width in bytes), `V` raw bytes, `O` object (variable-length
//! strings and sequences, references). The prefix is the byte order: `<` little,
//! `>` big, `|` not applicable, `=` native.

use crate::error::{Error, ErrorKind, Result};
use crate::types::descriptor::{
    ByteOrder, FloatSize, IntSize, StringEncoding, StringPadding, TypeDescriptor,
};

fn order_char(order: ByteOrder) -> char {
    match order {
        ByteOrder::LittleEndian => '<',
        ByteOrder::BigEndian => '>',
    }
}

fn numeric(order: ByteOrder, code: char, size: usize) -> String {
    let prefix = if size == 1 { '|' } else { order_char(order) };
    format!("{prefix}{code}{size}")
}

impl TypeDescriptor {
    /// The numpy typestr of this descriptor.
    ///
    /// Types without a numpy scalar equivalent (compound, array, opaque) map to
    /// `|V<size>`; variable-length types and references map to `|O`. Only the simple
    /// kinds survive [`from_typestr`](Self::from_typestr) unchanged.
    pub fn typestr(&self) -> String {
        match self {
            TypeDescriptor::Integer { size, order } => numeric(*order, 'i', *size as usize),
            TypeDescriptor::Unsigned { size, order } => numeric(*order, 'u', *size as usize),
            TypeDescriptor::Float { size, order } => numeric(*order, 'f', *size as usize),
            TypeDescriptor::Boolean => "|b1".into(),
            TypeDescriptor::Enum(e) => {
                numeric(e.order, if e.signed { 'i' } else { 'u' }, e.size as usize)
            }
            TypeDescriptor::FixedString { size, encoding: StringEncoding::Ascii, .. } => {
                format!("|S{size}")
            }
            TypeDescriptor::FixedString { size, encoding: StringEncoding::Utf8, .. } => {
                format!("|U{size}")
            }
            TypeDescriptor::VarLenString { .. }
            | TypeDescriptor::VarLenArray(_)
            | TypeDescriptor::Reference(_) => "|O".into(),
            TypeDescriptor::Compound(_)
            | TypeDescriptor::FixedArray(..)
            | TypeDescriptor::Opaque { .. } => format!("|V{}", self.size()),
        }
    }

    /// Parse a numpy typestr.
    ///
    /// Fixed strings are null-padded. `O` parses as a variable-length UTF-8 string and
    /// `V<n>` as an untagged opaque type.
    pub fn from_typestr(typestr: &str) -> Result<Self> {
        let mut chars = typestr.chars();
        let (order, rest) = match chars.next() {
            Some('<') => (Some(ByteOrder::LittleEndian), chars.as_str()),
            Some('>') => (Some(ByteOrder::BigEndian), chars.as_str()),
            Some('=') => (Some(ByteOrder::NATIVE), chars.as_str()),
            Some('|') => (None, chars.as_str()),
            _ => (None, typestr),
        };
        let mut rest_chars = rest.chars();
        let Some(code) = rest_chars.next() else {
            fail!(UnsupportedType, "empty typestr: {typestr:?}");
        };
        let digits = rest_chars.as_str();
        let width = if digits.is_empty() {
            None
        } else {
            match digits.parse::<usize>() {
                Ok(n) => Some(n),
                Err(_) => fail!(UnsupportedType, "invalid width in typestr: {typestr:?}"),
            }
        };
        let order = order.unwrap_or(ByteOrder::NATIVE);
        let unsupported = || {
            Error::binding(ErrorKind::UnsupportedType, format!("unsupported typestr: {typestr:?}"))
        };
        let int_size = || width.and_then(IntSize::from_int).ok_or_else(unsupported);
        Ok(match code {
            'i' => TypeDescriptor::Integer { size: int_size()?, order },
            'u' => TypeDescriptor::Unsigned { size: int_size()?, order },
            'f' => {
                let size = width.and_then(FloatSize::from_int).ok_or_else(unsupported)?;
                TypeDescriptor::Float { size, order }
            }
            'b' if width == Some(1) => TypeDescriptor::Boolean,
            'S' | 'a' | 'U' => {
                let size = width.filter(|&n| n > 0).ok_or_else(unsupported)?;
                let encoding = if code == 'U' { StringEncoding::Utf8 } else { StringEncoding::Ascii };
                TypeDescriptor::FixedString { size, encoding, padding: StringPadding::NullPad }
            }
            'V' => {
                let size = width.filter(|&n| n > 0).ok_or_else(unsupported)?;
                TypeDescriptor::Opaque { size, tag: String::new() }
            }
            'O' if width.is_none() || width == Some(8) => {
                TypeDescriptor::VarLenString { encoding: StringEncoding::Utf8 }
            }
            _ => return Err(unsupported()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_round_trip() {
        for s in ["<i4", ">i8", "|i1", "<u2", "|u1", "<f4", ">f8", "|b1", "|S10", "|U7", "|V16"] {
            let ty = TypeDescriptor::from_typestr(s).unwrap();
            assert_eq!(ty.typestr(), s, "{s}");
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            TypeDescriptor::from_typestr(">i2").unwrap(),
            TypeDescriptor::Integer { size: IntSize::U2, order: ByteOrder::BigEndian }
        );
        assert_eq!(TypeDescriptor::from_typestr("=f8").unwrap(), TypeDescriptor::float(FloatSize::U8));
        assert_eq!(TypeDescriptor::from_typestr("i4").unwrap(), TypeDescriptor::int(IntSize::U4));
        assert_eq!(
            TypeDescriptor::from_typestr("|O").unwrap(),
            TypeDescriptor::VarLenString { encoding: StringEncoding::Utf8 }
        );
    }

    #[test]
    fn test_unsupported() {
        for s in ["", "<", "<c8", "<f2", "<i3", "|b2", "|S0", "<ix", "|M8"] {
            let err = TypeDescriptor::from_typestr(s).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedType, "{s}");
        }
    }
}
