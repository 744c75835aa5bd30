//! Host-side type descriptors.
//!
//! A [`TypeDescriptor`] is the host's view of a native datatype. It carries exactly
//! the information needed to rebuild the native type: widths, byte order, field names
//! and offsets, string encoding and padding.

use std::fmt;
use std::mem;

use crate::sys::hobj_ref_t;
use crate::sys::H5R_DSET_REG_REF_BUF_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntSize {
    U1 = 1,
    U2 = 2,
    U4 = 4,
    U8 = 8,
}

impl IntSize {
    pub const fn from_int(size: usize) -> Option<Self> {
        match size {
            1 => Some(IntSize::U1),
            2 => Some(IntSize::U2),
            4 => Some(IntSize::U4),
            8 => Some(IntSize::U8),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FloatSize {
    U4 = 4,
    U8 = 8,
}

impl FloatSize {
    pub const fn from_int(size: usize) -> Option<Self> {
        match size {
            4 => Some(FloatSize::U4),
            8 => Some(FloatSize::U8),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    pub const NATIVE: ByteOrder =
        if cfg!(target_endian = "big") { ByteOrder::BigEndian } else { ByteOrder::LittleEndian };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StringEncoding {
    Ascii,
    Utf8,
}

/// How a fixed-length string fills its unused bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StringPadding {
    /// Terminated by a NUL, which takes one byte of the width.
    NullTerm,
    NullPad,
    SpacePad,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Object,
    Region,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumMember {
    pub name: String,
    /// Member value, sign-extended (signed bases) or zero-extended to 64 bits.
    pub value: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumType {
    pub size: IntSize,
    pub signed: bool,
    pub order: ByteOrder,
    pub members: Vec<EnumMember>,
}

impl EnumType {
    /// The native type `bool` maps to: a signed native-order byte with
    /// `{FALSE = 0, TRUE = 1}`.
    pub fn boolean() -> Self {
        Self {
            size: IntSize::U1,
            signed: true,
            order: ByteOrder::NATIVE,
            members: vec![
                EnumMember { name: "FALSE".into(), value: 0 },
                EnumMember { name: "TRUE".into(), value: 1 },
            ],
        }
    }

    /// `true` only for the exact shape of [`EnumType::boolean`]; any other
    /// enum, however close, stays an enum.
    pub fn is_boolean(&self) -> bool {
        *self == Self::boolean()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompoundField {
    pub name: String,
    pub offset: usize,
    pub ty: TypeDescriptor,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompoundType {
    pub fields: Vec<CompoundField>,
    pub size: usize,
}

impl CompoundType {
    /// Lay out `fields` back to back with no padding.
    pub fn packed<S: Into<String>>(fields: impl IntoIterator<Item = (S, TypeDescriptor)>) -> Self {
        let mut offset = 0;
        let fields: Vec<CompoundField> = fields
            .into_iter()
            .map(|(name, ty)| {
                let field = CompoundField { name: name.into(), offset, ty };
                offset += field.ty.size();
                field
            })
            .collect();
        Self { fields, size: offset }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Integer { size: IntSize, order: ByteOrder },
    Unsigned { size: IntSize, order: ByteOrder },
    Float { size: FloatSize, order: ByteOrder },
    Boolean,
    Enum(EnumType),
    Compound(CompoundType),
    FixedArray(Box<TypeDescriptor>, Vec<usize>),
    VarLenArray(Box<TypeDescriptor>),
    FixedString { size: usize, encoding: StringEncoding, padding: StringPadding },
    VarLenString { encoding: StringEncoding },
    Opaque { size: usize, tag: String },
    Reference(ReferenceKind),
}

impl TypeDescriptor {
    pub const fn int(size: IntSize) -> Self {
        TypeDescriptor::Integer { size, order: ByteOrder::NATIVE }
    }

    pub const fn uint(size: IntSize) -> Self {
        TypeDescriptor::Unsigned { size, order: ByteOrder::NATIVE }
    }

    pub const fn float(size: FloatSize) -> Self {
        TypeDescriptor::Float { size, order: ByteOrder::NATIVE }
    }

    /// Size of one element in memory, in bytes.
    pub fn size(&self) -> usize {
        match self {
            TypeDescriptor::Integer { size, .. } | TypeDescriptor::Unsigned { size, .. } => {
                *size as usize
            }
            TypeDescriptor::Float { size, .. } => *size as usize,
            TypeDescriptor::Boolean => 1,
            TypeDescriptor::Enum(e) => e.size as usize,
            TypeDescriptor::Compound(c) => c.size,
            TypeDescriptor::FixedArray(ty, dims) => ty.size() * dims.iter().product::<usize>(),
            TypeDescriptor::VarLenArray(_) => mem::size_of::<usize>() + mem::size_of::<*const u8>(),
            TypeDescriptor::FixedString { size, .. } => *size,
            TypeDescriptor::VarLenString { .. } => mem::size_of::<*const u8>(),
            TypeDescriptor::Opaque { size, .. } => *size,
            TypeDescriptor::Reference(ReferenceKind::Object) => mem::size_of::<hobj_ref_t>(),
            TypeDescriptor::Reference(ReferenceKind::Region) => H5R_DSET_REG_REF_BUF_SIZE,
        }
    }

    /// True when the type, or any nested member, is a variable-length sequence.
    pub fn has_vlen_sequence(&self) -> bool {
        match self {
            TypeDescriptor::VarLenArray(_) => true,
            TypeDescriptor::Compound(c) => c.fields.iter().any(|f| f.ty.has_vlen_sequence()),
            TypeDescriptor::FixedArray(ty, _) => ty.has_vlen_sequence(),
            _ => false,
        }
    }

    /// True when the type holds any variable-length data (strings or sequences).
    pub fn is_variable_len(&self) -> bool {
        match self {
            TypeDescriptor::VarLenArray(_) | TypeDescriptor::VarLenString { .. } => true,
            TypeDescriptor::Compound(c) => c.fields.iter().any(|f| f.ty.is_variable_len()),
            TypeDescriptor::FixedArray(ty, _) => ty.is_variable_len(),
            _ => false,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeDescriptor::Boolean => f.write_str("bool"),
            TypeDescriptor::Enum(e) => write!(f, "enum ({} members)", e.members.len()),
            TypeDescriptor::Compound(c) => {
                f.write_str("{")?;
                for (i, field) in c.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {} @{}", field.name, field.ty, field.offset)?;
                }
                f.write_str("}")
            }
            TypeDescriptor::FixedArray(ty, dims) => write!(f, "[{ty}; {dims:?}]"),
            TypeDescriptor::VarLenArray(ty) => write!(f, "[{ty}]"),
            TypeDescriptor::VarLenString { encoding } => write!(f, "varlen {encoding:?} string"),
            TypeDescriptor::FixedString { size, encoding, padding } => {
                write!(f, "{encoding:?} string ({size} bytes, {padding:?})")
            }
            TypeDescriptor::Opaque { size, tag } => write!(f, "opaque {size} bytes {tag:?}"),
            TypeDescriptor::Reference(kind) => write!(f, "{kind:?} reference"),
            _ => f.write_str(&self.typestr()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(TypeDescriptor::int(IntSize::U4).size(), 4);
        assert_eq!(TypeDescriptor::Boolean.size(), 1);
        let arr = TypeDescriptor::FixedArray(Box::new(TypeDescriptor::float(FloatSize::U8)), vec![2, 3]);
        assert_eq!(arr.size(), 48);
        assert_eq!(TypeDescriptor::Reference(ReferenceKind::Object).size(), 8);
        assert_eq!(TypeDescriptor::Reference(ReferenceKind::Region).size(), 12);
    }

    #[test]
    fn test_packed_compound() {
        let c = CompoundType::packed([
            ("a", TypeDescriptor::int(IntSize::U1)),
            ("b", TypeDescriptor::float(FloatSize::U8)),
        ]);
        assert_eq!(c.size, 9);
        assert_eq!(c.fields[1].offset, 1);
    }

    #[test]
    fn test_variable_len() {
        let v = TypeDescriptor::VarLenArray(Box::new(TypeDescriptor::int(IntSize::U2)));
        assert!(v.has_vlen_sequence());
        let s = TypeDescriptor::VarLenString { encoding: StringEncoding::Utf8 };
        assert!(s.is_variable_len());
        assert!(!s.has_vlen_sequence());
        let c = CompoundType::packed([("s", s)]);
        assert!(TypeDescriptor::Compound(c).is_variable_len());
    }

    #[test]
    fn test_boolean_enum_shape() {
        let e = EnumType::boolean();
        assert!(e.is_boolean());
        assert!(!EnumType { size: IntSize::U2, ..e.clone() }.is_boolean());
        assert!(!EnumType { signed: false, ..e.clone() }.is_boolean());
        let swapped = match ByteOrder::NATIVE {
            ByteOrder::LittleEndian => ByteOrder::BigEndian,
            _ => ByteOrder::LittleEndian,
        };
        assert!(!EnumType { order: swapped, ..e.clone() }.is_boolean());
        let lower = EnumType {
            members: vec![
                EnumMember { name: "false".into(), value: 0 },
                EnumMember { name: "true".into(), value: 1 },
            ],
            ..e
        };
        assert!(!lower.is_boolean());
    }
}
