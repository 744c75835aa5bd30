//! Property lists and the filter registry.

use std::collections::HashSet;
use std::ptr;

use super::convert::{check_convertible, Conv, Direction};
use super::engine::{api, copy_name, put, slice, Engine};
use super::errors::Fault;
use super::ids::Payload;
use super::plist::{filter_name, DatasetCreate, FillValue, FilterEntry, Plist, PlistClass};
use crate::sys::h5d::*;
use crate::sys::h5f::*;
use crate::sys::h5i::H5I_INVALID_HID;
use crate::sys::h5z::*;
use crate::sys::types::*;

pub unsafe extern "C" fn H5Pcreate(cls_id: hid_t) -> hid_t {
    api("H5Pcreate", "unable to create property list", H5I_INVALID_HID, |engine| {
        let class = PlistClass::from_id(cls_id)
            .ok_or_else(|| fault!(Args, BadType, "not a property list class"))?;
        Ok(engine.register(Payload::PropList(Plist::new(class))))
    })
}

fn plist_of(engine: &Engine, id: hid_t) -> Result<Plist, Fault> {
    match engine.payload(id)? {
        Payload::PropList(plist) => Ok(plist.clone()),
        _ => bail!(Args, BadType, "not a property list"),
    }
}

pub unsafe extern "C" fn H5Pclose(plist_id: hid_t) -> herr_t {
    api("H5Pclose", "can't close", -1, |engine| {
        plist_of(engine, plist_id)?;
        engine.dec_ref(plist_id)?;
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Pcopy(plist_id: hid_t) -> hid_t {
    api("H5Pcopy", "can't copy property list", H5I_INVALID_HID, |engine| {
        let plist = plist_of(engine, plist_id)?;
        Ok(engine.register(Payload::PropList(plist)))
    })
}

/// Class of a list. Class ids are predefined, so the result needs no close.
pub unsafe extern "C" fn H5Pget_class(plist_id: hid_t) -> hid_t {
    api("H5Pget_class", "unable to query class of property list", H5I_INVALID_HID, |engine| {
        Ok(plist_of(engine, plist_id)?.class().id())
    })
}

pub unsafe extern "C" fn H5Pclose_class(cls_id: hid_t) -> herr_t {
    api("H5Pclose_class", "can't close", -1, |_| {
        PlistClass::from_id(cls_id).ok_or_else(|| fault!(Args, BadType, "not a property list class"))?;
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Pequal(id1: hid_t, id2: hid_t) -> htri_t {
    api("H5Pequal", "can't compare property lists", -1, |engine| {
        if let (Some(a), Some(b)) = (PlistClass::from_id(id1), PlistClass::from_id(id2)) {
            return Ok((a == b) as htri_t);
        }
        Ok((plist_of(engine, id1)? == plist_of(engine, id2)?) as htri_t)
    })
}

fn dcpl_mut(engine: &mut Engine, id: hid_t) -> Result<&mut DatasetCreate, Fault> {
    match engine.plist_mut(id)? {
        Plist::DatasetCreate(dcpl) => Ok(dcpl),
        other => bail!(Plist, BadType, "{} list is not a dataset creation list", other.class().name()),
    }
}

fn dcpl_of(engine: &Engine, id: hid_t) -> Result<DatasetCreate, Fault> {
    match plist_of(engine, id)? {
        Plist::DatasetCreate(dcpl) => Ok(dcpl),
        other => bail!(Plist, BadType, "{} list is not a dataset creation list", other.class().name()),
    }
}

pub unsafe extern "C" fn H5Pset_chunk(plist_id: hid_t, ndims: c_int, dim: *const hsize_t) -> herr_t {
    api("H5Pset_chunk", "can't set chunk dimensions", -1, |engine| {
        if ndims <= 0 || ndims > 32 {
            bail!(Args, BadRange, "chunk dimensionality must be positive and at most 32");
        }
        let dims = slice(dim, ndims as usize)?.to_vec();
        if dims.contains(&0) {
            bail!(Args, BadValue, "all chunk dimensions must be positive");
        }
        let dcpl = dcpl_mut(engine, plist_id)?;
        dcpl.chunk = Some(dims);
        dcpl.layout = H5D_CHUNKED as i32;
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Pget_chunk(plist_id: hid_t, max_ndims: c_int, dim: *mut hsize_t) -> c_int {
    api("H5Pget_chunk", "can't get chunk dimensions", -1, |engine| {
        let dcpl = dcpl_of(engine, plist_id)?;
        let Some(chunk) = dcpl.chunk.filter(|_| dcpl.layout == H5D_CHUNKED as i32) else {
            bail!(Args, BadType, "not a chunked storage layout");
        };
        if !dim.is_null() {
            let n = chunk.len().min(max_ndims.max(0) as usize);
            ptr::copy_nonoverlapping(chunk.as_ptr(), dim, n);
        }
        Ok(chunk.len() as c_int)
    })
}

pub unsafe extern "C" fn H5Pset_layout(plist_id: hid_t, layout: H5D_layout_t) -> herr_t {
    api("H5Pset_layout", "can't set layout", -1, |engine| {
        if !matches!(layout, H5D_COMPACT | H5D_CONTIGUOUS | H5D_CHUNKED) {
            bail!(Args, BadValue, "unsupported layout {layout:?}");
        }
        dcpl_mut(engine, plist_id)?.layout = layout as i32;
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Pget_layout(plist_id: hid_t) -> c_int {
    api("H5Pget_layout", "can't get layout", H5D_LAYOUT_ERROR as c_int, |engine| {
        Ok(dcpl_of(engine, plist_id)?.layout)
    })
}

fn push_filter(engine: &mut Engine, plist_id: hid_t, entry: FilterEntry) -> Result<herr_t, Fault> {
    let dcpl = dcpl_mut(engine, plist_id)?;
    dcpl.filters.retain(|f| f.id != entry.id);
    dcpl.filters.push(entry);
    Ok(0)
}

pub unsafe extern "C" fn H5Pset_deflate(plist_id: hid_t, level: c_uint) -> herr_t {
    api("H5Pset_deflate", "can't add deflate filter", -1, |engine| {
        if level > 9 {
            bail!(Args, BadValue, "invalid deflate level {level}");
        }
        let entry = FilterEntry { id: H5Z_FILTER_DEFLATE, flags: H5Z_FLAG_OPTIONAL, cd_values: vec![level] };
        push_filter(engine, plist_id, entry)
    })
}

pub unsafe extern "C" fn H5Pset_shuffle(plist_id: hid_t) -> herr_t {
    api("H5Pset_shuffle", "can't add shuffle filter", -1, |engine| {
        let entry = FilterEntry { id: H5Z_FILTER_SHUFFLE, flags: H5Z_FLAG_OPTIONAL, cd_values: Vec::new() };
        push_filter(engine, plist_id, entry)
    })
}

pub unsafe extern "C" fn H5Pset_fletcher32(plist_id: hid_t) -> herr_t {
    api("H5Pset_fletcher32", "can't add fletcher32 filter", -1, |engine| {
        let entry = FilterEntry { id: H5Z_FILTER_FLETCHER32, flags: H5Z_FLAG_MANDATORY, cd_values: Vec::new() };
        push_filter(engine, plist_id, entry)
    })
}

pub unsafe extern "C" fn H5Pget_nfilters(plist_id: hid_t) -> c_int {
    api("H5Pget_nfilters", "can't get filter count", -1, |engine| {
        Ok(dcpl_of(engine, plist_id)?.filters.len() as c_int)
    })
}

/// Describes the `idx`-th filter. `cd_nelmts` is the capacity of
/// `cd_values` on entry and the number of client values on return.
pub unsafe extern "C" fn H5Pget_filter2(
    plist_id: hid_t,
    idx: c_uint,
    flags: *mut c_uint,
    cd_nelmts: *mut size_t,
    cd_values: *mut c_uint,
    namelen: size_t,
    name: *mut c_char,
    filter_config: *mut c_uint,
) -> H5Z_filter_t {
    api("H5Pget_filter2", "can't get filter info", H5Z_FILTER_ERROR, |engine| {
        let dcpl = dcpl_of(engine, plist_id)?;
        let filter = dcpl
            .filters
            .get(idx as usize)
            .ok_or_else(|| fault!(Args, BadValue, "filter number {idx} is invalid"))?;
        put(flags, filter.flags);
        if !cd_nelmts.is_null() {
            let room = *cd_nelmts;
            if !cd_values.is_null() {
                let n = room.min(filter.cd_values.len());
                ptr::copy_nonoverlapping(filter.cd_values.as_ptr(), cd_values, n);
            }
            *cd_nelmts = filter.cd_values.len();
        }
        copy_name(filter_name(filter.id).unwrap_or(""), name, namelen);
        put(filter_config, filter_config_flags(filter.id));
        Ok(filter.id)
    })
}

fn filter_config_flags(id: H5Z_filter_t) -> c_uint {
    if filter_name(id).is_some() {
        H5Z_FILTER_CONFIG_ENCODE_ENABLED | H5Z_FILTER_CONFIG_DECODE_ENABLED
    } else {
        0
    }
}

/// Sets the fill value from an element of `type_id`; a null `value` unsets it.
pub unsafe extern "C" fn H5Pset_fill_value(plist_id: hid_t, type_id: hid_t, value: *const c_void) -> herr_t {
    api("H5Pset_fill_value", "can't set fill value", -1, |engine| {
        if value.is_null() {
            dcpl_mut(engine, plist_id)?.fill = None;
            return Ok(0);
        }
        let ty = engine.datatype(type_id)?;
        if ty.has_vlen() {
            bail!(Plist, Unsupported, "fill values with variable-length data are not supported");
        }
        let bytes = slice(value as *const u8, ty.size())?.to_vec();
        dcpl_mut(engine, plist_id)?.fill = Some(FillValue { ty, bytes });
        Ok(0)
    })
}

/// Fill value converted to `type_id`; zeros when none is set.
pub unsafe extern "C" fn H5Pget_fill_value(plist_id: hid_t, type_id: hid_t, value: *mut c_void) -> herr_t {
    api("H5Pget_fill_value", "can't get fill value", -1, |engine| {
        let dcpl = dcpl_of(engine, plist_id)?;
        let ty = engine.datatype(type_id)?;
        let mut out = vec![0u8; ty.size()];
        if let Some(fill) = &dcpl.fill {
            check_convertible(&fill.ty, &ty)?;
            let (mut heap, mut allocations) = (Vec::new(), HashSet::new());
            let mut conv = Conv { dir: Direction::Write, heap: &mut heap, allocations: &mut allocations };
            conv.run(&fill.ty, &fill.bytes, &ty, &mut out)?;
        }
        if value.is_null() {
            bail!(Args, BadValue, "no fill value output buffer");
        }
        ptr::copy_nonoverlapping(out.as_ptr(), value as *mut u8, out.len());
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Pset_fclose_degree(plist_id: hid_t, degree: H5F_close_degree_t) -> herr_t {
    api("H5Pset_fclose_degree", "can't set file close degree", -1, |engine| {
        match engine.plist_mut(plist_id)? {
            Plist::FileAccess { degree: current } => *current = degree,
            other => bail!(Plist, BadType, "{} list is not a file access list", other.class().name()),
        }
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Pget_fclose_degree(plist_id: hid_t, degree: *mut c_int) -> herr_t {
    api("H5Pget_fclose_degree", "can't get file close degree", -1, |engine| {
        match plist_of(engine, plist_id)? {
            Plist::FileAccess { degree: current } => put(degree, current as c_int),
            other => bail!(Plist, BadType, "{} list is not a file access list", other.class().name()),
        }
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Pset_userblock(plist_id: hid_t, size: hsize_t) -> herr_t {
    api("H5Pset_userblock", "can't set userblock", -1, |engine| {
        if size != 0 && (size < 512 || !size.is_power_of_two()) {
            bail!(Args, BadValue, "userblock size must be > file address size and a power of 2");
        }
        match engine.plist_mut(plist_id)? {
            Plist::FileCreate { userblock } => *userblock = size,
            other => bail!(Plist, BadType, "{} list is not a file creation list", other.class().name()),
        }
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Pget_userblock(plist_id: hid_t, size: *mut hsize_t) -> herr_t {
    api("H5Pget_userblock", "can't get userblock", -1, |engine| {
        match plist_of(engine, plist_id)? {
            Plist::FileCreate { userblock } => put(size, userblock),
            other => bail!(Plist, BadType, "{} list is not a file creation list", other.class().name()),
        }
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Pset_create_intermediate_group(plist_id: hid_t, crt_intmd: c_uint) -> herr_t {
    api("H5Pset_create_intermediate_group", "can't set intermediate group creation flag", -1, |engine| {
        match engine.plist_mut(plist_id)? {
            Plist::LinkCreate { intermediate } => *intermediate = crt_intmd != 0,
            other => bail!(Plist, BadType, "{} list is not a link creation list", other.class().name()),
        }
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Pget_create_intermediate_group(plist_id: hid_t, crt_intmd: *mut c_uint) -> herr_t {
    api("H5Pget_create_intermediate_group", "can't get intermediate group creation flag", -1, |engine| {
        match plist_of(engine, plist_id)? {
            Plist::LinkCreate { intermediate } => put(crt_intmd, intermediate as c_uint),
            other => bail!(Plist, BadType, "{} list is not a link creation list", other.class().name()),
        }
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Pset_buffer(plist_id: hid_t, size: size_t, _tconv: *mut c_void, _bkg: *mut c_void) -> herr_t {
    api("H5Pset_buffer", "can't set buffer size", -1, |engine| {
        if size == 0 {
            bail!(Args, BadValue, "buffer size must not be zero");
        }
        match engine.plist_mut(plist_id)? {
            Plist::DatasetXfer { buffer } => *buffer = size,
            other => bail!(Plist, BadType, "{} list is not a transfer list", other.class().name()),
        }
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Pget_buffer(plist_id: hid_t, tconv: *mut *mut c_void, bkg: *mut *mut c_void) -> size_t {
    api("H5Pget_buffer", "can't get buffer size", 0, |engine| {
        put(tconv, ptr::null_mut());
        put(bkg, ptr::null_mut());
        match plist_of(engine, plist_id)? {
            Plist::DatasetXfer { buffer } => Ok(buffer),
            other => bail!(Plist, BadType, "{} list is not a transfer list", other.class().name()),
        }
    })
}

pub unsafe extern "C" fn H5Zfilter_avail(id: H5Z_filter_t) -> htri_t {
    api("H5Zfilter_avail", "unable to check filter availability", -1, |_| {
        if !(0..=H5Z_FILTER_MAX).contains(&id) {
            bail!(Args, BadRange, "invalid filter identification number {id}");
        }
        Ok(filter_name(id).is_some() as htri_t)
    })
}

pub unsafe extern "C" fn H5Zget_filter_info(filter: H5Z_filter_t, filter_config_flags_out: *mut c_uint) -> herr_t {
    api("H5Zget_filter_info", "can't get filter info", -1, |_| {
        if filter_name(filter).is_none() {
            bail!(Pline, NotFound, "filter {filter} is not registered");
        }
        put(filter_config_flags_out, filter_config_flags(filter));
        Ok(0)
    })
}
