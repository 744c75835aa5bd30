//! Datatypes.

use std::ptr;

use super::dtype::{predefined, EnumMember, Member, NativeType, Order, StrSize};
use super::engine::{api, cstr, slice, Engine};
use super::errors::Fault;
use super::ids::Payload;
use super::store::ObjectBody;
use crate::sys::h5i::H5I_INVALID_HID;
use crate::sys::h5t::*;
use crate::sys::types::*;

/// Datatype of a datatype, dataset, or attribute id.
fn type_of(engine: &Engine, id: hid_t) -> Result<NativeType, Fault> {
    if predefined(id).is_some() {
        return engine.datatype(id);
    }
    match engine.payload(id)? {
        Payload::Datatype(ty) => Ok(ty.clone()),
        Payload::Dataset(obj) => match &engine.object(obj)?.body {
            ObjectBody::Dataset(dset) => Ok(dset.dtype.clone()),
            _ => bail!(Args, BadType, "not a dataset"),
        },
        _ => bail!(Args, BadType, "ID {id:#x} is not a datatype"),
    }
}

pub unsafe extern "C" fn H5Tcopy(type_id: hid_t) -> hid_t {
    api("H5Tcopy", "unable to copy datatype", H5I_INVALID_HID, |engine| {
        let ty = type_of(engine, type_id)?;
        Ok(engine.register(Payload::Datatype(ty)))
    })
}

pub unsafe extern "C" fn H5Tclose(type_id: hid_t) -> herr_t {
    api("H5Tclose", "not a datatype", -1, |engine| {
        if predefined(type_id).is_some() {
            bail!(Args, BadValue, "immutable datatype");
        }
        engine.datatype(type_id)?;
        engine.dec_ref(type_id)?;
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Tequal(type1_id: hid_t, type2_id: hid_t) -> htri_t {
    api("H5Tequal", "can't compare datatypes", -1, |engine| {
        Ok((engine.datatype(type1_id)? == engine.datatype(type2_id)?) as htri_t)
    })
}

pub unsafe extern "C" fn H5Tget_class(type_id: hid_t) -> c_int {
    api("H5Tget_class", "not a datatype", H5T_NO_CLASS as c_int, |engine| {
        Ok(engine.datatype(type_id)?.class() as c_int)
    })
}

pub unsafe extern "C" fn H5Tget_size(type_id: hid_t) -> size_t {
    api("H5Tget_size", "not a datatype", 0, |engine| Ok(engine.datatype(type_id)?.size()))
}

pub unsafe extern "C" fn H5Tset_size(type_id: hid_t, size: size_t) -> herr_t {
    api("H5Tset_size", "unable to set size for datatype", -1, |engine| {
        if size == 0 {
            bail!(Args, BadValue, "size must be positive");
        }
        match engine.datatype_mut(type_id)? {
            NativeType::String { size: current, .. } => {
                *current = if size == H5T_VARIABLE { StrSize::Variable } else { StrSize::Fixed(size) };
            }
            NativeType::Opaque { size: current, .. } if size != H5T_VARIABLE => *current = size,
            NativeType::Compound { size: current, members } if size != H5T_VARIABLE => {
                let end = members.iter().map(|m| m.offset + m.ty.size()).max().unwrap_or(0);
                if size < end {
                    bail!(Datatype, BadValue, "size {size} is smaller than the compound members");
                }
                *current = size;
            }
            _ => bail!(Datatype, Unsupported, "can't change the size of this datatype"),
        }
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Tget_order(type_id: hid_t) -> c_int {
    api("H5Tget_order", "can't get order for specified datatype", H5T_ORDER_ERROR as c_int, |engine| {
        Ok(engine.datatype(type_id)?.order() as c_int)
    })
}

pub unsafe extern "C" fn H5Tset_order(type_id: hid_t, order: H5T_order_t) -> herr_t {
    api("H5Tset_order", "can't set order", -1, |engine| {
        let new = match order {
            H5T_ORDER_LE => Order::Le,
            H5T_ORDER_BE => Order::Be,
            _ => bail!(Args, BadValue, "illegal byte order {order:?}"),
        };
        fn apply(ty: &mut NativeType, new: Order) -> Result<(), Fault> {
            match ty {
                NativeType::Integer { order, .. }
                | NativeType::Float { order, .. }
                | NativeType::Bitfield { order, .. }
                | NativeType::Time { order, .. } => {
                    *order = new;
                    Ok(())
                }
                NativeType::Enum { base, .. } => apply(base, new),
                _ => bail!(Datatype, Unsupported, "byte order is not defined for this class"),
            }
        }
        apply(engine.datatype_mut(type_id)?, new)?;
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Tget_sign(type_id: hid_t) -> c_int {
    api("H5Tget_sign", "can't get sign", H5T_SGN_ERROR as c_int, |engine| {
        match engine.datatype(type_id)? {
            NativeType::Integer { signed: true, .. } => Ok(H5T_SGN_2 as c_int),
            NativeType::Integer { signed: false, .. } => Ok(H5T_SGN_NONE as c_int),
            _ => bail!(Args, BadType, "operation not defined for datatype class"),
        }
    })
}

pub unsafe extern "C" fn H5Tcreate(type_: H5T_class_t, size: size_t) -> hid_t {
    api("H5Tcreate", "unable to create type", H5I_INVALID_HID, |engine| {
        if size == 0 {
            bail!(Args, BadValue, "size must be positive");
        }
        let ty = match type_ {
            H5T_COMPOUND => NativeType::Compound { size, members: Vec::new() },
            H5T_OPAQUE => NativeType::Opaque { size, tag: String::new() },
            H5T_STRING => NativeType::String {
                size: if size == H5T_VARIABLE { StrSize::Variable } else { StrSize::Fixed(size) },
                cset: H5T_CSET_ASCII as i32,
                pad: H5T_STR_NULLTERM as i32,
            },
            H5T_ENUM if matches!(size, 1 | 2 | 4 | 8) => NativeType::Enum {
                base: Box::new(NativeType::Integer { size, order: Order::NATIVE, signed: true }),
                members: Vec::new(),
            },
            _ => bail!(Datatype, Unsupported, "unable to create datatype of class {type_:?}"),
        };
        Ok(engine.register(Payload::Datatype(ty)))
    })
}

pub unsafe extern "C" fn H5Tinsert(parent_id: hid_t, name: *const c_char, offset: size_t, member_id: hid_t) -> herr_t {
    api("H5Tinsert", "unable to insert member", -1, |engine| {
        let name = cstr(name)?;
        let member = engine.datatype(member_id)?;
        let NativeType::Compound { size, members } = engine.datatype_mut(parent_id)? else {
            bail!(Args, BadType, "not a compound datatype");
        };
        if members.iter().any(|m| m.name == name) {
            bail!(Datatype, CantInsert, "member name '{name}' is not unique");
        }
        if offset + member.size() > *size {
            bail!(Args, BadValue, "member '{name}' extends past end of compound type");
        }
        members.push(Member { name: name.to_owned(), offset, ty: member });
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Tget_nmembers(type_id: hid_t) -> c_int {
    api("H5Tget_nmembers", "cannot return member number", -1, |engine| {
        match engine.datatype(type_id)? {
            NativeType::Compound { members, .. } => Ok(members.len() as c_int),
            NativeType::Enum { members, .. } => Ok(members.len() as c_int),
            _ => bail!(Args, BadType, "operation not supported for type class"),
        }
    })
}

fn member_name(ty: &NativeType, idx: c_uint) -> Result<String, Fault> {
    let name = match ty {
        NativeType::Compound { members, .. } => members.get(idx as usize).map(|m| m.name.clone()),
        NativeType::Enum { members, .. } => members.get(idx as usize).map(|m| m.name.clone()),
        _ => bail!(Args, BadType, "operation not supported for type class"),
    };
    name.ok_or_else(|| fault!(Args, BadRange, "member index {idx} out of range"))
}

pub unsafe extern "C" fn H5Tget_member_name(type_id: hid_t, membno: c_uint) -> *mut c_char {
    api("H5Tget_member_name", "unable to get member name", ptr::null_mut(), |engine| {
        let name = member_name(&engine.datatype(type_id)?, membno)?;
        Ok(engine.alloc_string(&name))
    })
}

fn compound_member(ty: NativeType, idx: c_uint) -> Result<Member, Fault> {
    match ty {
        NativeType::Compound { mut members, .. } if (idx as usize) < members.len() => {
            Ok(members.swap_remove(idx as usize))
        }
        NativeType::Compound { .. } => bail!(Args, BadRange, "member index {idx} out of range"),
        _ => bail!(Args, BadType, "not a compound datatype"),
    }
}

pub unsafe extern "C" fn H5Tget_member_offset(type_id: hid_t, membno: c_uint) -> size_t {
    api("H5Tget_member_offset", "unable to get member offset", 0, |engine| {
        Ok(compound_member(engine.datatype(type_id)?, membno)?.offset)
    })
}

pub unsafe extern "C" fn H5Tget_member_type(type_id: hid_t, membno: c_uint) -> hid_t {
    api("H5Tget_member_type", "unable to get member type", H5I_INVALID_HID, |engine| {
        let member = compound_member(engine.datatype(type_id)?, membno)?;
        Ok(engine.register(Payload::Datatype(member.ty)))
    })
}

pub unsafe extern "C" fn H5Tget_member_value(type_id: hid_t, membno: c_uint, value: *mut c_void) -> herr_t {
    api("H5Tget_member_value", "unable to get member value", -1, |engine| {
        let NativeType::Enum { members, .. } = engine.datatype(type_id)? else {
            bail!(Args, BadType, "not an enumeration datatype");
        };
        let member = members
            .get(membno as usize)
            .ok_or_else(|| fault!(Args, BadRange, "member index {membno} out of range"))?;
        if value.is_null() {
            bail!(Args, BadValue, "null value buffer");
        }
        ptr::copy_nonoverlapping(member.value.as_ptr(), value as *mut u8, member.value.len());
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Tenum_create(base_id: hid_t) -> hid_t {
    api("H5Tenum_create", "unable to create enum type", H5I_INVALID_HID, |engine| {
        let base = engine.datatype(base_id)?;
        if !matches!(base, NativeType::Integer { .. }) {
            bail!(Args, BadType, "enumeration base must be an integer type");
        }
        Ok(engine.register(Payload::Datatype(NativeType::Enum { base: Box::new(base), members: Vec::new() })))
    })
}

pub unsafe extern "C" fn H5Tenum_insert(type_id: hid_t, name: *const c_char, value: *const c_void) -> herr_t {
    api("H5Tenum_insert", "unable to insert new enumeration member", -1, |engine| {
        let name = cstr(name)?;
        let NativeType::Enum { base, members } = engine.datatype_mut(type_id)? else {
            bail!(Args, BadType, "not an enumeration datatype");
        };
        let value = slice(value as *const u8, base.size())?.to_vec();
        if members.iter().any(|m| m.name == name) {
            bail!(Datatype, CantInsert, "duplicate name '{name}'");
        }
        if members.iter().any(|m| m.value == value) {
            bail!(Datatype, CantInsert, "duplicate value for '{name}'");
        }
        members.push(EnumMember { name: name.to_owned(), value });
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Tarray_create2(base_id: hid_t, ndims: c_uint, dim: *const hsize_t) -> hid_t {
    api("H5Tarray_create2", "unable to create array type", H5I_INVALID_HID, |engine| {
        if ndims == 0 || ndims as usize > 32 {
            bail!(Args, BadRange, "invalid number of array dimensions {ndims}");
        }
        let dims = slice(dim, ndims as usize)?.to_vec();
        if dims.contains(&0) {
            bail!(Args, BadValue, "zero-sized array dimension");
        }
        let base = engine.datatype(base_id)?;
        Ok(engine.register(Payload::Datatype(NativeType::Array { base: Box::new(base), dims })))
    })
}

fn array_dims(ty: NativeType) -> Result<Vec<u64>, Fault> {
    match ty {
        NativeType::Array { dims, .. } => Ok(dims),
        _ => bail!(Args, BadType, "not an array datatype"),
    }
}

pub unsafe extern "C" fn H5Tget_array_ndims(type_id: hid_t) -> c_int {
    api("H5Tget_array_ndims", "unable to get array rank", -1, |engine| {
        Ok(array_dims(engine.datatype(type_id)?)?.len() as c_int)
    })
}

pub unsafe extern "C" fn H5Tget_array_dims2(type_id: hid_t, dims: *mut hsize_t) -> c_int {
    api("H5Tget_array_dims2", "unable to get array dimensions", -1, |engine| {
        let shape = array_dims(engine.datatype(type_id)?)?;
        if !dims.is_null() {
            ptr::copy_nonoverlapping(shape.as_ptr(), dims, shape.len());
        }
        Ok(shape.len() as c_int)
    })
}

pub unsafe extern "C" fn H5Tvlen_create(base_id: hid_t) -> hid_t {
    api("H5Tvlen_create", "unable to create vlen type", H5I_INVALID_HID, |engine| {
        let base = engine.datatype(base_id)?;
        Ok(engine.register(Payload::Datatype(NativeType::VarLen { base: Box::new(base) })))
    })
}

pub unsafe extern "C" fn H5Tget_super(type_id: hid_t) -> hid_t {
    api("H5Tget_super", "not a derived data type", H5I_INVALID_HID, |engine| {
        let base = match engine.datatype(type_id)? {
            NativeType::Enum { base, .. } | NativeType::Array { base, .. } | NativeType::VarLen { base } => *base,
            _ => bail!(Args, BadType, "not a derived data type"),
        };
        Ok(engine.register(Payload::Datatype(base)))
    })
}

pub unsafe extern "C" fn H5Tis_variable_str(type_id: hid_t) -> htri_t {
    api("H5Tis_variable_str", "can't determine if datatype is VL string", -1, |engine| {
        let ty = engine.datatype(type_id)?;
        Ok(matches!(ty, NativeType::String { size: StrSize::Variable, .. }) as htri_t)
    })
}

fn string_props(ty: NativeType) -> Result<(i32, i32), Fault> {
    match ty {
        NativeType::String { cset, pad, .. } => Ok((cset, pad)),
        _ => bail!(Args, BadType, "operation not defined for datatype class"),
    }
}

pub unsafe extern "C" fn H5Tget_cset(type_id: hid_t) -> c_int {
    api("H5Tget_cset", "can't get character set", H5T_CSET_ERROR as c_int, |engine| {
        Ok(string_props(engine.datatype(type_id)?)?.0)
    })
}

pub unsafe extern "C" fn H5Tget_strpad(type_id: hid_t) -> c_int {
    api("H5Tget_strpad", "can't get string padding", H5T_STR_ERROR as c_int, |engine| {
        Ok(string_props(engine.datatype(type_id)?)?.1)
    })
}

pub unsafe extern "C" fn H5Tset_cset(type_id: hid_t, cset: H5T_cset_t) -> herr_t {
    api("H5Tset_cset", "can't set character set", -1, |engine| {
        if !matches!(cset, H5T_CSET_ASCII | H5T_CSET_UTF8) {
            bail!(Args, BadValue, "illegal character set type");
        }
        match engine.datatype_mut(type_id)? {
            NativeType::String { cset: current, .. } => *current = cset as i32,
            _ => bail!(Args, BadType, "operation not defined for datatype class"),
        }
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Tset_strpad(type_id: hid_t, strpad: H5T_str_t) -> herr_t {
    api("H5Tset_strpad", "can't set string padding", -1, |engine| {
        if !matches!(strpad, H5T_STR_NULLTERM | H5T_STR_NULLPAD | H5T_STR_SPACEPAD) {
            bail!(Args, BadValue, "illegal string padding type");
        }
        match engine.datatype_mut(type_id)? {
            NativeType::String { pad, .. } => *pad = strpad as i32,
            _ => bail!(Args, BadType, "operation not defined for datatype class"),
        }
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Tset_tag(type_id: hid_t, tag: *const c_char) -> herr_t {
    api("H5Tset_tag", "can't set opaque tag", -1, |engine| {
        let tag = cstr(tag)?;
        if tag.len() >= H5T_OPAQUE_TAG_MAX {
            bail!(Args, BadValue, "opaque tag too long");
        }
        match engine.datatype_mut(type_id)? {
            NativeType::Opaque { tag: current, .. } => *current = tag.to_owned(),
            _ => bail!(Args, BadType, "not an opaque data type"),
        }
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Tget_tag(type_id: hid_t) -> *mut c_char {
    api("H5Tget_tag", "can't get opaque tag", ptr::null_mut(), |engine| {
        match engine.datatype(type_id)? {
            NativeType::Opaque { tag, .. } => Ok(engine.alloc_string(&tag)),
            _ => bail!(Args, BadType, "operation not defined for data type class"),
        }
    })
}
