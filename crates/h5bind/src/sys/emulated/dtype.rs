//! Datatype model and the predefined type table.

use serde::{Deserialize, Serialize};

use super::ids::make_id;
use crate::sys::h5i::H5I_DATATYPE;
use crate::sys::h5r::H5R_DSET_REG_REF_BUF_SIZE;
use crate::sys::h5t::*;
use crate::sys::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum Order {
    Le,
    Be,
}

impl Order {
    pub const NATIVE: Order = if cfg!(target_endian = "big") { Order::Be } else { Order::Le };

    pub fn raw(self) -> H5T_order_t {
        match self {
            Order::Le => H5T_ORDER_LE,
            Order::Be => H5T_ORDER_BE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum StrSize {
    Fixed(usize),
    Variable,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Member {
    pub name: String,
    pub offset: usize,
    pub ty: NativeType,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct EnumMember {
    pub name: String,
    pub value: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum NativeType {
    Integer { size: usize, order: Order, signed: bool },
    Float { size: usize, order: Order },
    Bitfield { size: usize, order: Order },
    Time { size: usize, order: Order },
    String { size: StrSize, cset: i32, pad: i32 },
    Opaque { size: usize, tag: String },
    Compound { size: usize, members: Vec<Member> },
    Enum { base: Box<NativeType>, members: Vec<EnumMember> },
    Array { base: Box<NativeType>, dims: Vec<u64> },
    VarLen { base: Box<NativeType> },
    Reference { region: bool },
}

pub(crate) const POINTER_SIZE: usize = std::mem::size_of::<*mut c_char>();
/// `hvl_t`: a length followed by a pointer.
pub(crate) const HVL_SIZE: usize = std::mem::size_of::<usize>() + POINTER_SIZE;

impl NativeType {
    pub fn size(&self) -> usize {
        match self {
            NativeType::Integer { size, .. }
            | NativeType::Float { size, .. }
            | NativeType::Bitfield { size, .. }
            | NativeType::Time { size, .. }
            | NativeType::Opaque { size, .. }
            | NativeType::Compound { size, .. } => *size,
            NativeType::String { size: StrSize::Fixed(n), .. } => *n,
            NativeType::String { size: StrSize::Variable, .. } => POINTER_SIZE,
            NativeType::Enum { base, .. } => base.size(),
            NativeType::Array { base, dims } => {
                base.size() * dims.iter().product::<u64>() as usize
            }
            NativeType::VarLen { .. } => HVL_SIZE,
            NativeType::Reference { region: false } => std::mem::size_of::<haddr_t>(),
            NativeType::Reference { region: true } => H5R_DSET_REG_REF_BUF_SIZE,
        }
    }

    pub fn class(&self) -> H5T_class_t {
        match self {
            NativeType::Integer { .. } => H5T_INTEGER,
            NativeType::Float { .. } => H5T_FLOAT,
            NativeType::Bitfield { .. } => H5T_BITFIELD,
            NativeType::Time { .. } => H5T_TIME,
            NativeType::String { .. } => H5T_STRING,
            NativeType::Opaque { .. } => H5T_OPAQUE,
            NativeType::Compound { .. } => H5T_COMPOUND,
            NativeType::Enum { .. } => H5T_ENUM,
            NativeType::Array { .. } => H5T_ARRAY,
            NativeType::VarLen { .. } => H5T_VLEN,
            NativeType::Reference { .. } => H5T_REFERENCE,
        }
    }

    pub fn order(&self) -> H5T_order_t {
        match self {
            NativeType::Integer { order, .. }
            | NativeType::Float { order, .. }
            | NativeType::Bitfield { order, .. }
            | NativeType::Time { order, .. } => order.raw(),
            NativeType::Enum { base, .. } | NativeType::Array { base, .. } => base.order(),
            _ => H5T_ORDER_NONE,
        }
    }

    /// True when the type (or any nested member) holds variable-length data.
    pub fn has_vlen(&self) -> bool {
        match self {
            NativeType::String { size: StrSize::Variable, .. } | NativeType::VarLen { .. } => true,
            NativeType::Compound { members, .. } => members.iter().any(|m| m.ty.has_vlen()),
            NativeType::Array { base, .. } | NativeType::Enum { base, .. } => base.has_vlen(),
            _ => false,
        }
    }

    fn int(size: usize, signed: bool) -> Self {
        NativeType::Integer { size, order: Order::NATIVE, signed }
    }

    fn float(size: usize) -> Self {
        NativeType::Float { size, order: Order::NATIVE }
    }
}

macro_rules! predefined_types {
    ($($name:ident = $serial:expr => $ty:expr,)+) => {
        $(pub(crate) const $name: hid_t = make_id(H5I_DATATYPE, $serial);)+

        /// Look up a predefined (immutable) datatype by id.
        pub(crate) fn predefined(id: hid_t) -> Option<NativeType> {
            $(if id == $name {
                return Some($ty);
            })+
            None
        }
    };
}

predefined_types! {
    NATIVE_INT8 = 1 => NativeType::int(1, true),
    NATIVE_INT16 = 2 => NativeType::int(2, true),
    NATIVE_INT32 = 3 => NativeType::int(4, true),
    NATIVE_INT64 = 4 => NativeType::int(8, true),
    NATIVE_UINT8 = 5 => NativeType::int(1, false),
    NATIVE_UINT16 = 6 => NativeType::int(2, false),
    NATIVE_UINT32 = 7 => NativeType::int(4, false),
    NATIVE_UINT64 = 8 => NativeType::int(8, false),
    NATIVE_FLOAT = 9 => NativeType::float(4),
    NATIVE_DOUBLE = 10 => NativeType::float(8),
    C_S1 = 11 => NativeType::String { size: StrSize::Fixed(1), cset: H5T_CSET_ASCII as i32, pad: H5T_STR_NULLTERM as i32 },
    STD_REF_OBJ = 12 => NativeType::Reference { region: false },
    STD_REF_DSETREG = 13 => NativeType::Reference { region: true },
    STD_B8LE = 14 => NativeType::Bitfield { size: 1, order: Order::Le },
    UNIX_D32LE = 15 => NativeType::Time { size: 4, order: Order::Le },
    STD_I32BE = 16 => NativeType::Integer { size: 4, order: Order::Be, signed: true },
    IEEE_F64BE = 17 => NativeType::Float { size: 8, order: Order::Be },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(predefined(NATIVE_INT32).map(|t| t.size()), Some(4));
        let arr = NativeType::Array { base: Box::new(NativeType::int(2, true)), dims: vec![2, 3] };
        assert_eq!(arr.size(), 12);
        let vstr = NativeType::String { size: StrSize::Variable, cset: 1, pad: 0 };
        assert_eq!(vstr.size(), POINTER_SIZE);
        assert!(vstr.has_vlen());
    }

    #[test]
    fn test_predefined_lookup() {
        assert_eq!(predefined(NATIVE_DOUBLE), Some(NativeType::float(8)));
        assert_eq!(predefined(make_id(H5I_DATATYPE, 999)), None);
    }
}
