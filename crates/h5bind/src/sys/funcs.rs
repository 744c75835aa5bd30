//! Native function entry points.
//!
//! Two backends are supported:
//! - `runtime-loading` feature: `libhdf5` is opened at run time with `libloading` and
//!   every function is resolved once into a table. Takes precedence when both
//!   features are enabled.
//! - `emulated` feature (default): the in-process engine in [`super::emulated`]
//!   provides the same functions with the same signatures.

#![allow(non_snake_case)]

// =============================================================================
// Emulated mode
// =============================================================================
#[cfg(feature = "emulated")]
mod emulated_impl {
    pub use crate::sys::emulated::*;

    /// Check if the library is initialized (always true for the emulated engine).
    pub fn is_initialized() -> bool {
        true
    }

    /// Get the library path (not applicable for the emulated engine).
    pub fn library_path() -> Option<String> {
        None
    }
}

#[cfg(feature = "emulated")]
pub use emulated_impl::*;

// =============================================================================
// Runtime-loading mode
// =============================================================================
#[cfg(all(feature = "runtime-loading", not(feature = "emulated")))]
mod runtime_impl {
    use std::sync::OnceLock;

    use libloading::Library;
    use parking_lot::Mutex;

    use crate::error::LoadError;
    use crate::sys::h5::*;
    use crate::sys::h5d::*;
    use crate::sys::h5e::*;
    use crate::sys::h5f::*;
    use crate::sys::h5g::*;
    use crate::sys::h5l::*;
    use crate::sys::h5r::*;
    use crate::sys::h5s::*;
    use crate::sys::h5t::*;
    use crate::sys::h5z::*;
    use crate::sys::types::*;

    struct LibState {
        _lib: Library,
        path: String,
        funcs: Functions,
    }

    // SAFETY: Functions contain only function pointers which are Send + Sync
    unsafe impl Send for LibState {}
    unsafe impl Sync for LibState {}

    static LIB: OnceLock<LibState> = OnceLock::new();
    static INIT_LOCK: Mutex<()> = Mutex::new(());

    /// Load the HDF5 library from the given path.
    pub fn load_library(path: &str) -> crate::Result<()> {
        if let Some(state) = LIB.get() {
            if state.path == path {
                return Ok(());
            }
            return Err(crate::Error::AlreadyInitialized(state.path.clone()));
        }

        let _guard = INIT_LOCK.lock();

        // Double-check after acquiring lock
        if let Some(state) = LIB.get() {
            if state.path == path {
                return Ok(());
            }
            return Err(crate::Error::AlreadyInitialized(state.path.clone()));
        }

        let lib = unsafe { Library::new(path) }.map_err(|e| crate::Error::LibraryLoad {
            path: path.to_string(),
            source: LoadError(e.to_string()),
        })?;
        let funcs = unsafe { Functions::load(&lib, path)? };

        unsafe {
            (funcs.H5dont_atexit)();
            if (funcs.H5open)() < 0 {
                return Err(crate::Error::LibraryLoad {
                    path: path.to_string(),
                    source: LoadError("H5open failed".into()),
                });
            }
        }
        tracing::debug!(path, "loaded HDF5 library");

        let _ = LIB.set(LibState {
            _lib: lib,
            path: path.to_string(),
            funcs,
        });
        Ok(())
    }

    /// Check if the library is initialized.
    pub fn is_initialized() -> bool {
        LIB.get().is_some()
    }

    /// Get the library path.
    pub fn library_path() -> Option<String> {
        LIB.get().map(|s| s.path.clone())
    }

    /// Get a reference to the loaded library (for loading global ids).
    pub fn get_library() -> Option<&'static Library> {
        LIB.get().map(|s| &s._lib)
    }

    fn funcs() -> &'static Functions {
        match LIB.get() {
            Some(state) => &state.funcs,
            None => panic!("HDF5 library not loaded; call h5bind::init() first"),
        }
    }

    /// Resolve the first of `names` the library exports.
    unsafe fn symbol<T: Copy>(lib: &Library, path: &str, names: &[&str]) -> crate::Result<T> {
        let mut last = String::new();
        for name in names {
            match lib.get::<T>(name.as_bytes()) {
                Ok(sym) => return Ok(*sym),
                Err(e) => last = e.to_string(),
            }
        }
        Err(crate::Error::LibraryLoad {
            path: path.to_string(),
            source: LoadError(format!("missing symbol {}: {last}", names.join(" / "))),
        })
    }

    macro_rules! native_functions {
        (@symbols $name:ident) => { &[stringify!($name)] };
        (@symbols $name:ident $($sym:literal)+) => { &[$($sym),+] };
        ($(
            fn $name:ident($($arg:ident: $ty:ty),* $(,)?) -> $ret:ty $(= $($sym:literal)|+)?;
        )+) => {
            /// HDF5 function pointers.
            pub struct Functions {
                $(pub $name: unsafe extern "C" fn($($ty),*) -> $ret,)+
            }

            impl Functions {
                unsafe fn load(lib: &Library, path: &str) -> crate::Result<Self> {
                    Ok(Self {
                        $($name: symbol(lib, path, native_functions!(@symbols $name $($($sym)+)?))?,)+
                    })
                }
            }

            $(
                pub unsafe fn $name($($arg: $ty),*) -> $ret {
                    (funcs().$name)($($arg),*)
                }
            )+
        };
    }

    native_functions! {
        // H5 - General library functions
        fn H5open() -> herr_t;
        fn H5close() -> herr_t;
        fn H5dont_atexit() -> herr_t;
        fn H5get_libversion(majnum: *mut c_uint, minnum: *mut c_uint, relnum: *mut c_uint) -> herr_t;
        fn H5free_memory(mem: *mut c_void) -> herr_t;

        // H5I - Identifiers
        fn H5Iget_type(id: hid_t) -> c_int;
        fn H5Iis_valid(id: hid_t) -> htri_t;
        fn H5Iinc_ref(id: hid_t) -> c_int;
        fn H5Idec_ref(id: hid_t) -> c_int;
        fn H5Iget_ref(id: hid_t) -> c_int;
        fn H5Iget_file_id(id: hid_t) -> hid_t;
        fn H5Iget_name(id: hid_t, name: *mut c_char, size: size_t) -> ssize_t;

        // H5E - Error stacks
        fn H5Eget_current_stack() -> hid_t;
        fn H5Eclose_stack(estack: hid_t) -> herr_t;
        fn H5Eget_num(estack: hid_t) -> ssize_t;
        fn H5Ewalk2(estack: hid_t, direction: H5E_direction_t, func: H5E_walk2_t, client_data: *mut c_void) -> herr_t;
        fn H5Eget_msg(msg_id: hid_t, type_: *mut c_int, msg: *mut c_char, size: size_t) -> ssize_t;
        fn H5Eset_auto2(estack: hid_t, func: H5E_auto2_t, client_data: *mut c_void) -> herr_t;
        fn H5Eclear2(estack: hid_t) -> herr_t;

        // H5F - Files
        fn H5Fcreate(filename: *const c_char, flags: c_uint, fcpl_id: hid_t, fapl_id: hid_t) -> hid_t;
        fn H5Fopen(filename: *const c_char, flags: c_uint, fapl_id: hid_t) -> hid_t;
        fn H5Fclose(file_id: hid_t) -> herr_t;
        fn H5Fflush(object_id: hid_t, scope: H5F_scope_t) -> herr_t;
        fn H5Fget_name(obj_id: hid_t, name: *mut c_char, size: size_t) -> ssize_t;
        fn H5Fget_intent(file_id: hid_t, intent: *mut c_uint) -> herr_t;
        fn H5Fget_obj_count(file_id: hid_t, types: c_uint) -> ssize_t;
        fn H5Fget_obj_ids(file_id: hid_t, types: c_uint, max_objs: size_t, obj_id_list: *mut hid_t) -> ssize_t;
        fn H5Fis_hdf5(filename: *const c_char) -> htri_t;
        fn H5Fget_create_plist(file_id: hid_t) -> hid_t;
        fn H5Fget_access_plist(file_id: hid_t) -> hid_t;

        // H5G / H5L / H5O - Groups, links and objects
        fn H5Gcreate2(loc_id: hid_t, name: *const c_char, lcpl_id: hid_t, gcpl_id: hid_t, gapl_id: hid_t) -> hid_t;
        fn H5Gopen2(loc_id: hid_t, name: *const c_char, gapl_id: hid_t) -> hid_t;
        fn H5Gclose(group_id: hid_t) -> herr_t;
        fn H5Gget_info(loc_id: hid_t, ginfo: *mut H5G_info_t) -> herr_t;
        fn H5Lexists(loc_id: hid_t, name: *const c_char, lapl_id: hid_t) -> htri_t;
        fn H5Ldelete(loc_id: hid_t, name: *const c_char, lapl_id: hid_t) -> herr_t;
        fn H5Lmove(src_loc: hid_t, src_name: *const c_char, dst_loc: hid_t, dst_name: *const c_char, lcpl_id: hid_t, lapl_id: hid_t) -> herr_t;
        fn H5Lcreate_hard(cur_loc: hid_t, cur_name: *const c_char, dst_loc: hid_t, dst_name: *const c_char, lcpl_id: hid_t, lapl_id: hid_t) -> herr_t;
        fn H5Literate(grp_id: hid_t, idx_type: H5_index_t, order: H5_iter_order_t, idx: *mut hsize_t, op: H5L_iterate_t, op_data: *mut c_void) -> herr_t
            = "H5Literate2" | "H5Literate";
        fn H5Oopen(loc_id: hid_t, name: *const c_char, lapl_id: hid_t) -> hid_t;
        fn H5Oclose(object_id: hid_t) -> herr_t;

        // H5D - Datasets
        fn H5Dcreate2(loc_id: hid_t, name: *const c_char, type_id: hid_t, space_id: hid_t, lcpl_id: hid_t, dcpl_id: hid_t, dapl_id: hid_t) -> hid_t;
        fn H5Dopen2(loc_id: hid_t, name: *const c_char, dapl_id: hid_t) -> hid_t;
        fn H5Dclose(dset_id: hid_t) -> herr_t;
        fn H5Dread(dset_id: hid_t, mem_type_id: hid_t, mem_space_id: hid_t, file_space_id: hid_t, plist_id: hid_t, buf: *mut c_void) -> herr_t;
        fn H5Dwrite(dset_id: hid_t, mem_type_id: hid_t, mem_space_id: hid_t, file_space_id: hid_t, plist_id: hid_t, buf: *const c_void) -> herr_t;
        fn H5Dget_space(dset_id: hid_t) -> hid_t;
        fn H5Dget_type(dset_id: hid_t) -> hid_t;
        fn H5Dget_create_plist(dset_id: hid_t) -> hid_t;
        fn H5Dset_extent(dset_id: hid_t, size: *const hsize_t) -> herr_t;
        fn H5Dget_storage_size(dset_id: hid_t) -> hsize_t;

        // H5A - Attributes
        fn H5Acreate2(loc_id: hid_t, attr_name: *const c_char, type_id: hid_t, space_id: hid_t, acpl_id: hid_t, aapl_id: hid_t) -> hid_t;
        fn H5Aopen(obj_id: hid_t, attr_name: *const c_char, aapl_id: hid_t) -> hid_t;
        fn H5Aopen_by_idx(loc_id: hid_t, obj_name: *const c_char, idx_type: H5_index_t, order: H5_iter_order_t, n: hsize_t, aapl_id: hid_t, lapl_id: hid_t) -> hid_t;
        fn H5Aclose(attr_id: hid_t) -> herr_t;
        fn H5Aread(attr_id: hid_t, type_id: hid_t, buf: *mut c_void) -> herr_t;
        fn H5Awrite(attr_id: hid_t, type_id: hid_t, buf: *const c_void) -> herr_t;
        fn H5Aget_space(attr_id: hid_t) -> hid_t;
        fn H5Aget_type(attr_id: hid_t) -> hid_t;
        fn H5Aget_name(attr_id: hid_t, buf_size: size_t, buf: *mut c_char) -> ssize_t;
        fn H5Aexists(obj_id: hid_t, attr_name: *const c_char) -> htri_t;
        fn H5Adelete(loc_id: hid_t, name: *const c_char) -> herr_t;
        fn H5Aget_num_attrs(loc_id: hid_t) -> c_int;

        // H5S - Dataspaces
        fn H5Screate(type_: H5S_class_t) -> hid_t;
        fn H5Screate_simple(rank: c_int, dims: *const hsize_t, maxdims: *const hsize_t) -> hid_t;
        fn H5Scopy(space_id: hid_t) -> hid_t;
        fn H5Sclose(space_id: hid_t) -> herr_t;
        fn H5Sget_simple_extent_ndims(space_id: hid_t) -> c_int;
        fn H5Sget_simple_extent_dims(space_id: hid_t, dims: *mut hsize_t, maxdims: *mut hsize_t) -> c_int;
        fn H5Sget_simple_extent_npoints(space_id: hid_t) -> hssize_t;
        fn H5Sget_simple_extent_type(space_id: hid_t) -> c_int;
        fn H5Sset_extent_simple(space_id: hid_t, rank: c_int, dims: *const hsize_t, max: *const hsize_t) -> herr_t;
        fn H5Sselect_all(space_id: hid_t) -> herr_t;
        fn H5Sselect_none(space_id: hid_t) -> herr_t;
        fn H5Sselect_hyperslab(space_id: hid_t, op: H5S_seloper_t, start: *const hsize_t, stride: *const hsize_t, count: *const hsize_t, block: *const hsize_t) -> herr_t;
        fn H5Sselect_elements(space_id: hid_t, op: H5S_seloper_t, num_elem: size_t, coord: *const hsize_t) -> herr_t;
        fn H5Sget_select_npoints(space_id: hid_t) -> hssize_t;
        fn H5Sget_select_type(space_id: hid_t) -> c_int;
        fn H5Sselect_valid(space_id: hid_t) -> htri_t;
        fn H5Sget_select_bounds(space_id: hid_t, start: *mut hsize_t, end: *mut hsize_t) -> herr_t;

        // H5T - Datatypes
        fn H5Tcopy(type_id: hid_t) -> hid_t;
        fn H5Tclose(type_id: hid_t) -> herr_t;
        fn H5Tequal(type1_id: hid_t, type2_id: hid_t) -> htri_t;
        fn H5Tget_class(type_id: hid_t) -> c_int;
        fn H5Tget_size(type_id: hid_t) -> size_t;
        fn H5Tset_size(type_id: hid_t, size: size_t) -> herr_t;
        fn H5Tget_order(type_id: hid_t) -> c_int;
        fn H5Tset_order(type_id: hid_t, order: H5T_order_t) -> herr_t;
        fn H5Tget_sign(type_id: hid_t) -> c_int;
        fn H5Tcreate(type_: H5T_class_t, size: size_t) -> hid_t;
        fn H5Tinsert(parent_id: hid_t, name: *const c_char, offset: size_t, member_id: hid_t) -> herr_t;
        fn H5Tget_nmembers(type_id: hid_t) -> c_int;
        fn H5Tget_member_name(type_id: hid_t, membno: c_uint) -> *mut c_char;
        fn H5Tget_member_offset(type_id: hid_t, membno: c_uint) -> size_t;
        fn H5Tget_member_type(type_id: hid_t, membno: c_uint) -> hid_t;
        fn H5Tget_member_value(type_id: hid_t, membno: c_uint, value: *mut c_void) -> herr_t;
        fn H5Tenum_create(base_id: hid_t) -> hid_t;
        fn H5Tenum_insert(type_id: hid_t, name: *const c_char, value: *const c_void) -> herr_t;
        fn H5Tarray_create2(base_id: hid_t, ndims: c_uint, dim: *const hsize_t) -> hid_t;
        fn H5Tget_array_ndims(type_id: hid_t) -> c_int;
        fn H5Tget_array_dims2(type_id: hid_t, dims: *mut hsize_t) -> c_int;
        fn H5Tvlen_create(base_id: hid_t) -> hid_t;
        fn H5Tget_super(type_id: hid_t) -> hid_t;
        fn H5Tis_variable_str(type_id: hid_t) -> htri_t;
        fn H5Tget_cset(type_id: hid_t) -> c_int;
        fn H5Tget_strpad(type_id: hid_t) -> c_int;
        fn H5Tset_cset(type_id: hid_t, cset: H5T_cset_t) -> herr_t;
        fn H5Tset_strpad(type_id: hid_t, strpad: H5T_str_t) -> herr_t;
        fn H5Tset_tag(type_id: hid_t, tag: *const c_char) -> herr_t;
        fn H5Tget_tag(type_id: hid_t) -> *mut c_char;

        // H5P / H5Z - Property lists and filters
        fn H5Pcreate(cls_id: hid_t) -> hid_t;
        fn H5Pclose(plist_id: hid_t) -> herr_t;
        fn H5Pcopy(plist_id: hid_t) -> hid_t;
        fn H5Pget_class(plist_id: hid_t) -> hid_t;
        fn H5Pclose_class(cls_id: hid_t) -> herr_t;
        fn H5Pequal(id1: hid_t, id2: hid_t) -> htri_t;
        fn H5Pset_chunk(plist_id: hid_t, ndims: c_int, dim: *const hsize_t) -> herr_t;
        fn H5Pget_chunk(plist_id: hid_t, max_ndims: c_int, dim: *mut hsize_t) -> c_int;
        fn H5Pset_layout(plist_id: hid_t, layout: H5D_layout_t) -> herr_t;
        fn H5Pget_layout(plist_id: hid_t) -> c_int;
        fn H5Pset_deflate(plist_id: hid_t, level: c_uint) -> herr_t;
        fn H5Pset_shuffle(plist_id: hid_t) -> herr_t;
        fn H5Pset_fletcher32(plist_id: hid_t) -> herr_t;
        fn H5Pget_nfilters(plist_id: hid_t) -> c_int;
        fn H5Pget_filter2(plist_id: hid_t, idx: c_uint, flags: *mut c_uint, cd_nelmts: *mut size_t, cd_values: *mut c_uint, namelen: size_t, name: *mut c_char, filter_config: *mut c_uint) -> H5Z_filter_t;
        fn H5Pset_fill_value(plist_id: hid_t, type_id: hid_t, value: *const c_void) -> herr_t;
        fn H5Pget_fill_value(plist_id: hid_t, type_id: hid_t, value: *mut c_void) -> herr_t;
        fn H5Pset_fclose_degree(plist_id: hid_t, degree: H5F_close_degree_t) -> herr_t;
        fn H5Pget_fclose_degree(plist_id: hid_t, degree: *mut c_int) -> herr_t;
        fn H5Pset_userblock(plist_id: hid_t, size: hsize_t) -> herr_t;
        fn H5Pget_userblock(plist_id: hid_t, size: *mut hsize_t) -> herr_t;
        fn H5Pset_create_intermediate_group(plist_id: hid_t, crt_intmd: c_uint) -> herr_t;
        fn H5Pget_create_intermediate_group(plist_id: hid_t, crt_intmd: *mut c_uint) -> herr_t;
        fn H5Pset_buffer(plist_id: hid_t, size: size_t, tconv: *mut c_void, bkg: *mut c_void) -> herr_t;
        fn H5Pget_buffer(plist_id: hid_t, tconv: *mut *mut c_void, bkg: *mut *mut c_void) -> size_t;
        fn H5Zfilter_avail(id: H5Z_filter_t) -> htri_t;
        fn H5Zget_filter_info(filter: H5Z_filter_t, filter_config_flags: *mut c_uint) -> herr_t;

        // H5R - References
        fn H5Rcreate(ref_: *mut c_void, loc_id: hid_t, name: *const c_char, ref_type: H5R_type_t, space_id: hid_t) -> herr_t;
        fn H5Rdereference2(obj_id: hid_t, oapl_id: hid_t, ref_type: H5R_type_t, ref_: *const c_void) -> hid_t;
        fn H5Rget_obj_type2(id: hid_t, ref_type: H5R_type_t, ref_: *const c_void, obj_type: *mut c_int) -> herr_t;
    }
}

#[cfg(all(feature = "runtime-loading", not(feature = "emulated")))]
pub use runtime_impl::*;

#[cfg(not(any(feature = "emulated", feature = "runtime-loading")))]
compile_error!("Either 'emulated' or 'runtime-loading' feature must be enabled");
