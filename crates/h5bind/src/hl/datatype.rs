//! HDF5 Datatype handle and the native side of the type bridge.

use std::fmt;

use crate::class::ObjectClass;
use crate::error::{Error, ErrorKind, Result};
use crate::globals::*;
use crate::handle::{IdKind, ObjectId};
use crate::sys::{
    c_int, c_uint, hid_t, size_t, H5T_class_t, H5T_cset_t, H5T_order_t, H5T_str_t, H5Tarray_create2,
    H5Tcopy, H5Tcreate, H5Tenum_create, H5Tenum_insert, H5Tequal, H5Tget_array_dims2,
    H5Tget_array_ndims, H5Tget_class, H5Tget_cset, H5Tget_member_name, H5Tget_member_offset,
    H5Tget_member_type, H5Tget_member_value, H5Tget_nmembers, H5Tget_order, H5Tget_sign,
    H5Tget_size, H5Tget_strpad, H5Tget_super, H5Tget_tag, H5Tinsert, H5Tis_variable_str,
    H5Tset_cset, H5Tset_order, H5Tset_size, H5Tset_strpad, H5Tset_tag, H5Tvlen_create,
    H5T_COMPOUND, H5T_OPAQUE, H5T_SGN_2, H5T_VARIABLE,
};
use crate::types::{
    ByteOrder, CompoundField, CompoundType, EnumMember, EnumType, FloatSize, H5Type, IntSize,
    ReferenceKind, StringEncoding, StringPadding, TypeDescriptor,
};
use crate::util::{hsize_dims, take_h5_string, to_cstring, usize_dims};

/// An HDF5 datatype handle.
#[derive(Clone)]
pub struct Datatype(ObjectId);

impl ObjectClass for Datatype {
    const NAME: &'static str = "datatype";
    const VALID_KINDS: &'static [IdKind] = &[IdKind::Datatype];

    fn from_object_id(id: ObjectId) -> Result<Self> {
        Ok(Self(id))
    }

    fn id(&self) -> &ObjectId {
        &self.0
    }

    fn short_repr(&self) -> Option<String> {
        self.to_descriptor().ok().map(|desc| desc.to_string())
    }
}

impl fmt::Debug for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.debug_fmt(f)
    }
}

impl PartialEq for Datatype {
    fn eq(&self, other: &Self) -> bool {
        h5call!(H5Tequal(self.raw(), other.raw())).is_ok_and(|equal| equal > 0)
    }
}

fn native_order(order: ByteOrder) -> H5T_order_t {
    match order {
        ByteOrder::LittleEndian => H5T_order_t::H5T_ORDER_LE,
        ByteOrder::BigEndian => H5T_order_t::H5T_ORDER_BE,
    }
}

fn native_cset(encoding: StringEncoding) -> H5T_cset_t {
    match encoding {
        StringEncoding::Ascii => H5T_cset_t::H5T_CSET_ASCII,
        StringEncoding::Utf8 => H5T_cset_t::H5T_CSET_UTF8,
    }
}

fn native_strpad(padding: StringPadding) -> H5T_str_t {
    match padding {
        StringPadding::NullTerm => H5T_str_t::H5T_STR_NULLTERM,
        StringPadding::NullPad => H5T_str_t::H5T_STR_NULLPAD,
        StringPadding::SpacePad => H5T_str_t::H5T_STR_SPACEPAD,
    }
}

fn int_global(size: IntSize, signed: bool) -> hid_t {
    match (size, signed) {
        (IntSize::U1, true) => H5T_NATIVE_INT8(),
        (IntSize::U2, true) => H5T_NATIVE_INT16(),
        (IntSize::U4, true) => H5T_NATIVE_INT32(),
        (IntSize::U8, true) => H5T_NATIVE_INT64(),
        (IntSize::U1, false) => H5T_NATIVE_UINT8(),
        (IntSize::U2, false) => H5T_NATIVE_UINT16(),
        (IntSize::U4, false) => H5T_NATIVE_UINT32(),
        (IntSize::U8, false) => H5T_NATIVE_UINT64(),
    }
}

/// Low `size` bytes of `value`, laid out in `order`.
fn encode_enum_value(value: u64, size: IntSize, order: ByteOrder) -> Vec<u8> {
    let n = size as usize;
    match order {
        ByteOrder::LittleEndian => value.to_le_bytes()[..n].to_vec(),
        ByteOrder::BigEndian => value.to_be_bytes()[8 - n..].to_vec(),
    }
}

fn decode_enum_value(bytes: &[u8], signed: bool, order: ByteOrder) -> u64 {
    let n = bytes.len();
    let mut buf = [0_u8; 8];
    let value = match order {
        ByteOrder::LittleEndian => {
            buf[..n].copy_from_slice(bytes);
            u64::from_le_bytes(buf)
        }
        ByteOrder::BigEndian => {
            buf[8 - n..].copy_from_slice(bytes);
            u64::from_be_bytes(buf)
        }
    };
    let shift = 64 - 8 * n as u32;
    if signed && shift > 0 {
        (((value << shift) as i64) >> shift) as u64
    } else {
        value
    }
}

impl Datatype {
    pub(crate) fn from_raw(id: hid_t) -> Result<Self> {
        Ok(Self(ObjectId::from_owned(IdKind::Datatype, id)?))
    }

    pub(crate) fn raw(&self) -> hid_t {
        self.0.raw()
    }

    /// A private, mutable copy of `id` (predefined types are immutable).
    fn copy_of(id: hid_t) -> Result<Self> {
        Self::from_raw(h5try!(H5Tcopy(id)))
    }

    /// Native datatype of the host type `T`.
    pub fn of<T: H5Type>() -> Result<Self> {
        Self::from_descriptor(&T::type_descriptor())
    }

    /// Build the native datatype from a numpy typestr such as `<i4` or `|S10`.
    pub fn from_typestr(typestr: &str) -> Result<Self> {
        Self::from_descriptor(&TypeDescriptor::from_typestr(typestr)?)
    }

    /// Size of one element in bytes.
    pub fn size(&self) -> Result<usize> {
        self.0.ensure_valid()?;
        Ok(h5lock!(H5Tget_size(self.raw())))
    }

    /// Native class of the datatype.
    pub fn class(&self) -> Result<H5T_class_t> {
        Ok(H5T_class_t::from_raw(h5try!(H5Tget_class(self.raw()))))
    }

    pub fn is_variable_str(&self) -> Result<bool> {
        Ok(h5try!(H5Tis_variable_str(self.raw())) > 0)
    }

    /// Build a native datatype equivalent to `desc`.
    pub fn from_descriptor(desc: &TypeDescriptor) -> Result<Self> {
        let dtype = match desc {
            TypeDescriptor::Integer { size, order } => Self::atomic(int_global(*size, true), *order),
            TypeDescriptor::Unsigned { size, order } => {
                Self::atomic(int_global(*size, false), *order)
            }
            TypeDescriptor::Float { size, order } => {
                let base = match size {
                    FloatSize::U4 => H5T_NATIVE_FLOAT(),
                    FloatSize::U8 => H5T_NATIVE_DOUBLE(),
                };
                Self::atomic(base, *order)
            }
            TypeDescriptor::Boolean => Self::build_enum(&EnumType::boolean()),
            TypeDescriptor::Enum(e) => Self::build_enum(e),
            TypeDescriptor::Compound(c) => Self::build_compound(c),
            TypeDescriptor::FixedArray(ty, dims) => {
                ensure!(!dims.is_empty(), UnsupportedType, "array type without dimensions");
                let base = Self::from_descriptor(ty)?;
                let dims = hsize_dims(dims);
                Self::from_raw(h5try!(H5Tarray_create2(
                    base.raw(),
                    dims.len() as c_uint,
                    dims.as_ptr()
                )))
            }
            TypeDescriptor::VarLenArray(ty) => {
                let base = Self::from_descriptor(ty)?;
                Self::from_raw(h5try!(H5Tvlen_create(base.raw())))
            }
            TypeDescriptor::FixedString { size, encoding, padding } => {
                ensure!(*size > 0, UnsupportedType, "zero-width fixed string");
                Self::build_string(*size, *encoding, *padding)
            }
            TypeDescriptor::VarLenString { encoding } => {
                Self::build_string(H5T_VARIABLE, *encoding, StringPadding::NullTerm)
            }
            TypeDescriptor::Opaque { size, tag } => {
                ensure!(*size > 0, UnsupportedType, "zero-size opaque type");
                let dtype = Self::from_raw(h5try!(H5Tcreate(H5T_OPAQUE, *size)))?;
                if !tag.is_empty() {
                    let tag = to_cstring(tag.as_str())?;
                    h5try!(H5Tset_tag(dtype.raw(), tag.as_ptr()));
                }
                Ok(dtype)
            }
            TypeDescriptor::Reference(ReferenceKind::Object) => Self::copy_of(H5T_STD_REF_OBJ()),
            TypeDescriptor::Reference(ReferenceKind::Region) => {
                Self::copy_of(H5T_STD_REF_DSETREG())
            }
        }?;
        tracing::trace!(id = dtype.raw(), %desc, "built datatype");
        Ok(dtype)
    }

    fn atomic(base: hid_t, order: ByteOrder) -> Result<Self> {
        let dtype = Self::copy_of(base)?;
        if order != ByteOrder::NATIVE {
            h5try!(H5Tset_order(dtype.raw(), native_order(order)));
        }
        Ok(dtype)
    }

    fn build_string(size: size_t, encoding: StringEncoding, padding: StringPadding) -> Result<Self> {
        let dtype = Self::copy_of(H5T_C_S1())?;
        h5try!(H5Tset_size(dtype.raw(), size));
        h5try!(H5Tset_cset(dtype.raw(), native_cset(encoding)));
        h5try!(H5Tset_strpad(dtype.raw(), native_strpad(padding)));
        Ok(dtype)
    }

    fn build_enum(e: &EnumType) -> Result<Self> {
        let base = Self::atomic(int_global(e.size, e.signed), e.order)?;
        let dtype = Self::from_raw(h5try!(H5Tenum_create(base.raw())))?;
        for member in &e.members {
            let name = to_cstring(member.name.as_str())?;
            let value = encode_enum_value(member.value, e.size, e.order);
            h5try!(H5Tenum_insert(dtype.raw(), name.as_ptr(), value.as_ptr().cast()));
        }
        Ok(dtype)
    }

    fn build_compound(c: &CompoundType) -> Result<Self> {
        ensure!(c.size > 0, UnsupportedType, "zero-size compound type");
        let dtype = Self::from_raw(h5try!(H5Tcreate(H5T_COMPOUND, c.size)))?;
        for field in &c.fields {
            let member = Self::from_descriptor(&field.ty)?;
            let name = to_cstring(field.name.as_str())?;
            h5try!(H5Tinsert(dtype.raw(), name.as_ptr(), field.offset, member.raw()));
        }
        Ok(dtype)
    }

    /// Describe the native datatype on the host side.
    pub fn to_descriptor(&self) -> Result<TypeDescriptor> {
        self.0.ensure_valid()?;
        describe(self.raw())
    }
}

fn byte_order(id: hid_t) -> Result<ByteOrder> {
    match H5T_order_t::from_raw(h5try!(H5Tget_order(id))) {
        H5T_order_t::H5T_ORDER_LE => Ok(ByteOrder::LittleEndian),
        H5T_order_t::H5T_ORDER_BE => Ok(ByteOrder::BigEndian),
        other => fail!(UnsupportedType, "unsupported byte order: {other:?}"),
    }
}

fn is_signed(id: hid_t) -> Result<bool> {
    Ok(h5try!(H5Tget_sign(id)) == H5T_SGN_2 as c_int)
}

fn int_size(size: usize) -> Result<IntSize> {
    match IntSize::from_int(size) {
        Some(size) => Ok(size),
        None => fail!(UnsupportedType, "unsupported integer width: {size} bytes"),
    }
}

fn member_name(id: hid_t, idx: c_uint) -> Result<String> {
    let name = h5try!(H5Tget_member_name(id, idx));
    Ok(h5lock!(take_h5_string(name)).unwrap_or_default())
}

fn describe(id: hid_t) -> Result<TypeDescriptor> {
    let class = H5T_class_t::from_raw(h5try!(H5Tget_class(id)));
    let size = h5lock!(H5Tget_size(id));
    Ok(match class {
        H5T_class_t::H5T_INTEGER => {
            let (size, order) = (int_size(size)?, byte_order(id)?);
            if is_signed(id)? {
                TypeDescriptor::Integer { size, order }
            } else {
                TypeDescriptor::Unsigned { size, order }
            }
        }
        H5T_class_t::H5T_FLOAT => match FloatSize::from_int(size) {
            Some(size) => TypeDescriptor::Float { size, order: byte_order(id)? },
            None => fail!(UnsupportedType, "unsupported float width: {size} bytes"),
        },
        H5T_class_t::H5T_STRING => {
            let utf8 = h5try!(H5Tget_cset(id)) == H5T_cset_t::H5T_CSET_UTF8 as c_int;
            let encoding = if utf8 { StringEncoding::Utf8 } else { StringEncoding::Ascii };
            if h5try!(H5Tis_variable_str(id)) > 0 {
                TypeDescriptor::VarLenString { encoding }
            } else {
                let padding = match h5try!(H5Tget_strpad(id)) {
                    x if x == H5T_str_t::H5T_STR_NULLTERM as c_int => StringPadding::NullTerm,
                    x if x == H5T_str_t::H5T_STR_NULLPAD as c_int => StringPadding::NullPad,
                    x if x == H5T_str_t::H5T_STR_SPACEPAD as c_int => StringPadding::SpacePad,
                    x => fail!(UnsupportedType, "unsupported string padding: {x}"),
                };
                TypeDescriptor::FixedString { size, encoding, padding }
            }
        }
        H5T_class_t::H5T_OPAQUE => {
            let tag = h5try!(H5Tget_tag(id));
            TypeDescriptor::Opaque { size, tag: h5lock!(take_h5_string(tag)).unwrap_or_default() }
        }
        H5T_class_t::H5T_COMPOUND => {
            let n = h5try!(H5Tget_nmembers(id)) as c_uint;
            let mut fields = Vec::with_capacity(n as usize);
            for i in 0..n {
                let name = member_name(id, i)?;
                let offset = h5lock!(H5Tget_member_offset(id, i));
                let member = Datatype::from_raw(h5try!(H5Tget_member_type(id, i)))?;
                let ty = describe(member.raw()).map_err(|err| {
                    Error::binding(
                        ErrorKind::TypeMismatch,
                        format!("compound field {name:?} cannot be bridged: {err}"),
                    )
                })?;
                fields.push(CompoundField { name, offset, ty });
            }
            TypeDescriptor::Compound(CompoundType { fields, size })
        }
        H5T_class_t::H5T_ENUM => {
            let base = Datatype::from_raw(h5try!(H5Tget_super(id)))?;
            let signed = is_signed(base.raw())?;
            let order = byte_order(base.raw())?;
            let width = int_size(size)?;
            let n = h5try!(H5Tget_nmembers(id)) as c_uint;
            let mut members = Vec::with_capacity(n as usize);
            for i in 0..n {
                let name = member_name(id, i)?;
                let mut raw = [0_u8; 8];
                h5try!(H5Tget_member_value(id, i, raw.as_mut_ptr().cast()));
                let value = decode_enum_value(&raw[..size], signed, order);
                members.push(EnumMember { name, value });
            }
            let e = EnumType { size: width, signed, order, members };
            if e.is_boolean() {
                TypeDescriptor::Boolean
            } else {
                TypeDescriptor::Enum(e)
            }
        }
        H5T_class_t::H5T_ARRAY => {
            let ndims = h5try!(H5Tget_array_ndims(id));
            let mut dims = vec![0; ndims as usize];
            h5try!(H5Tget_array_dims2(id, dims.as_mut_ptr()));
            let base = Datatype::from_raw(h5try!(H5Tget_super(id)))?;
            TypeDescriptor::FixedArray(Box::new(describe(base.raw())?), usize_dims(&dims))
        }
        H5T_class_t::H5T_VLEN => {
            let base = Datatype::from_raw(h5try!(H5Tget_super(id)))?;
            TypeDescriptor::VarLenArray(Box::new(describe(base.raw())?))
        }
        H5T_class_t::H5T_REFERENCE => {
            if h5try!(H5Tequal(id, H5T_STD_REF_OBJ())) > 0 {
                TypeDescriptor::Reference(ReferenceKind::Object)
            } else if h5try!(H5Tequal(id, H5T_STD_REF_DSETREG())) > 0 {
                TypeDescriptor::Reference(ReferenceKind::Region)
            } else {
                fail!(UnsupportedType, "unsupported reference type ({size} bytes)")
            }
        }
        other => fail!(UnsupportedType, "datatype class {other:?} has no host equivalent"),
    })
}

#[cfg(all(test, feature = "emulated"))]
mod tests {
    use super::*;
    use crate::types::FixedAscii;

    fn round_trip(desc: TypeDescriptor) {
        let dtype = Datatype::from_descriptor(&desc).unwrap();
        assert_eq!(dtype.to_descriptor().unwrap(), desc);
        assert_eq!(dtype.size().unwrap(), desc.size());
        let again = Datatype::from_descriptor(&dtype.to_descriptor().unwrap()).unwrap();
        assert_eq!(again, dtype);
    }

    #[test]
    fn test_atomic_round_trip() {
        for size in [IntSize::U1, IntSize::U2, IntSize::U4, IntSize::U8] {
            for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
                round_trip(TypeDescriptor::Integer { size, order });
                round_trip(TypeDescriptor::Unsigned { size, order });
            }
        }
        round_trip(TypeDescriptor::float(FloatSize::U4));
        round_trip(TypeDescriptor::Float { size: FloatSize::U8, order: ByteOrder::BigEndian });
        round_trip(TypeDescriptor::Boolean);
    }

    #[test]
    fn test_big_endian_matches_predefined() {
        let desc = TypeDescriptor::Integer { size: IntSize::U4, order: ByteOrder::BigEndian };
        let ours = Datatype::from_descriptor(&desc).unwrap();
        let predefined = Datatype::copy_of(H5T_STD_I32BE()).unwrap();
        assert_eq!(ours, predefined);
        assert_ne!(ours, Datatype::of::<i32>().unwrap());
    }

    #[test]
    fn test_compound_keeps_fields() {
        let inner = CompoundType::packed([
            ("x", TypeDescriptor::float(FloatSize::U4)),
            ("flag", TypeDescriptor::Boolean),
        ]);
        let outer = CompoundType {
            fields: vec![
                CompoundField { name: "id".into(), offset: 0, ty: TypeDescriptor::uint(IntSize::U8) },
                CompoundField { name: "pos".into(), offset: 12, ty: TypeDescriptor::Compound(inner) },
                CompoundField {
                    name: "tag".into(),
                    offset: 20,
                    ty: FixedAscii::<4>::type_descriptor(),
                },
            ],
            size: 24,
        };
        round_trip(TypeDescriptor::Compound(outer));
    }

    #[test]
    fn test_derived_round_trip() {
        let e = EnumType {
            size: IntSize::U2,
            signed: true,
            order: ByteOrder::BigEndian,
            members: vec![
                EnumMember { name: "LOW".into(), value: (-1_i64) as u64 },
                EnumMember { name: "HIGH".into(), value: 300 },
            ],
        };
        round_trip(TypeDescriptor::Enum(e));
        let flags = EnumType {
            size: IntSize::U1,
            signed: false,
            order: ByteOrder::NATIVE,
            members: vec![
                EnumMember { name: "false".into(), value: 0 },
                EnumMember { name: "true".into(), value: 1 },
            ],
        };
        round_trip(TypeDescriptor::Enum(flags.clone()));
        round_trip(TypeDescriptor::Enum(EnumType { signed: true, ..flags }));
        round_trip(<[[u16; 3]; 2]>::type_descriptor());
        round_trip(TypeDescriptor::VarLenArray(Box::new(TypeDescriptor::int(IntSize::U4))));
        round_trip(TypeDescriptor::FixedString {
            size: 7,
            encoding: StringEncoding::Utf8,
            padding: StringPadding::SpacePad,
        });
        round_trip(TypeDescriptor::VarLenString { encoding: StringEncoding::Ascii });
        round_trip(TypeDescriptor::Opaque { size: 5, tag: "blob".into() });
        round_trip(TypeDescriptor::Reference(ReferenceKind::Object));
        round_trip(TypeDescriptor::Reference(ReferenceKind::Region));
    }

    #[test]
    fn test_unsupported_classes() {
        let bits = Datatype::copy_of(H5T_STD_B8LE()).unwrap();
        assert_eq!(bits.to_descriptor().unwrap_err().kind(), ErrorKind::UnsupportedType);
        let time = Datatype::copy_of(H5T_UNIX_D32LE()).unwrap();
        assert_eq!(time.to_descriptor().unwrap_err().kind(), ErrorKind::UnsupportedType);
    }

    #[test]
    fn test_bad_compound_field_is_named() {
        let compound = Datatype::from_raw(h5call!(H5Tcreate(H5T_COMPOUND, 5)).unwrap()).unwrap();
        let name = to_cstring("stamp").unwrap();
        h5call!(H5Tinsert(compound.raw(), name.as_ptr(), 1, H5T_UNIX_D32LE())).unwrap();
        let err = compound.to_descriptor().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert!(err.to_string().contains("stamp"));
    }

    #[test]
    fn test_enum_value_bytes() {
        assert_eq!(encode_enum_value(0x0102, IntSize::U2, ByteOrder::BigEndian), vec![1, 2]);
        assert_eq!(encode_enum_value(0x0102, IntSize::U2, ByteOrder::LittleEndian), vec![2, 1]);
        assert_eq!(decode_enum_value(&[0xff], true, ByteOrder::LittleEndian), u64::MAX);
        assert_eq!(decode_enum_value(&[0xff], false, ByteOrder::LittleEndian), 0xff);
        assert_eq!(decode_enum_value(&[0, 0, 1, 0], true, ByteOrder::BigEndian), 256);
    }
}
