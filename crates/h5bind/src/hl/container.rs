//! Whole-container element transfer shared by datasets and attributes.

use std::ffi::CString;
use std::{mem, ptr, slice};

use crate::class::ObjectClass;
use crate::error::Result;
use crate::hl::dataspace::Dataspace;
use crate::hl::datatype::Datatype;
use crate::sys::{c_char, c_void};
use crate::types::string::{fixed_capacity, unpadded};
use crate::types::{
    decode_fixed, encode_fixed, CompoundType, H5Type, StringEncoding, StringError, TypeDescriptor,
};
use crate::util::{take_h5_string, to_cstring};

/// An object holding an array of elements: a dataset or an attribute.
pub(crate) trait Container: ObjectClass {
    fn stored_space(&self) -> Result<Dataspace>;

    fn stored_type(&self) -> Result<Datatype>;

    /// Convert every stored element into `buf`, laid out as `mem_type`.
    ///
    /// # Safety
    ///
    /// `buf` must have room for `stored_space().size()` elements of `mem_type`.
    unsafe fn read_into(&self, mem_type: &Datatype, buf: *mut c_void) -> Result<()>;

    /// # Safety
    ///
    /// `buf` must hold `stored_space().size()` elements of `mem_type`.
    unsafe fn write_from(&self, mem_type: &Datatype, buf: *const c_void) -> Result<()>;
}

pub(crate) fn ensure_no_vlen_sequence(desc: &TypeDescriptor) -> Result<()> {
    ensure!(
        !desc.has_vlen_sequence(),
        Unsupported,
        "variable-length sequence types are not supported: {desc}"
    );
    Ok(())
}

fn has_fixed_string(desc: &TypeDescriptor) -> bool {
    match desc {
        TypeDescriptor::FixedString { .. } => true,
        TypeDescriptor::FixedArray(ty, _) => has_fixed_string(ty),
        TypeDescriptor::Compound(c) => c.fields.iter().any(|f| has_fixed_string(&f.ty)),
        _ => false,
    }
}

fn stored_field<'a>(stored: &'a CompoundType, name: &str) -> Option<&'a TypeDescriptor> {
    stored.fields.iter().find(|f| f.name == name).map(|f| &f.ty)
}

/// Check one element at `ptr`, laid out as `mem`, against the stored type.
///
/// # Safety
///
/// `ptr` must point to a valid element of type `mem`.
unsafe fn check_element(ptr: *const u8, mem: &TypeDescriptor, stored: &TypeDescriptor) -> Result<()> {
    match (mem, stored) {
        (
            TypeDescriptor::FixedString { size, padding, .. },
            TypeDescriptor::FixedString { size: to, padding: to_padding, .. },
        ) => {
            let len = unpadded(unsafe { slice::from_raw_parts(ptr, *size) }, *padding).len();
            let capacity = fixed_capacity(*to, *to_padding);
            if len > capacity {
                return Err(StringError::InsufficientCapacity { len, capacity }.into());
            }
            Ok(())
        }
        (TypeDescriptor::FixedArray(ty, dims), TypeDescriptor::FixedArray(to, _)) => {
            let step = ty.size();
            (0..dims.iter().product::<usize>())
                .try_for_each(|i| unsafe { check_element(ptr.add(i * step), ty, to) })
        }
        (TypeDescriptor::Compound(c), TypeDescriptor::Compound(to)) => {
            c.fields.iter().try_for_each(|field| match stored_field(to, &field.name) {
                Some(to) => unsafe { check_element(ptr.add(field.offset), &field.ty, to) },
                None => Ok(()),
            })
        }
        _ => Ok(()),
    }
}

/// Fail with `StringTooLong` when a fixed string in `data` does not fit the
/// stored string it converts into; the library would cut it short.
pub(crate) fn ensure_strings_fit<T: H5Type>(data: &[T], stored: &Datatype) -> Result<()> {
    let desc = T::type_descriptor();
    if !has_fixed_string(&desc) {
        return Ok(());
    }
    let stored = stored.to_descriptor()?;
    let base = data.as_ptr().cast::<u8>();
    (0..data.len())
        .try_for_each(|i| unsafe { check_element(base.add(i * mem::size_of::<T>()), &desc, &stored) })
}

fn element_count<C: Container>(container: &C) -> Result<usize> {
    container.id().ensure_valid()?;
    container.stored_space()?.size()
}

pub(crate) fn read_vec<C: Container, T: H5Type>(container: &C) -> Result<Vec<T>> {
    let desc = T::type_descriptor();
    ensure_no_vlen_sequence(&desc)?;
    ensure_no_vlen_sequence(&container.stored_type()?.to_descriptor()?)?;
    let n = element_count(container)?;
    let mem_type = Datatype::from_descriptor(&desc)?;
    tracing::trace!(id = container.id().raw(), elements = n, "read");
    let mut buf: Vec<T> = Vec::with_capacity(n);
    unsafe {
        container.read_into(&mem_type, buf.as_mut_ptr().cast())?;
        buf.set_len(n);
    }
    Ok(buf)
}

pub(crate) fn read_scalar<C: Container, T: H5Type>(container: &C) -> Result<T> {
    let n = element_count(container)?;
    ensure!(n == 1, TypeMismatch, "expected a single element, found {n}");
    match read_vec::<C, T>(container)?.pop() {
        Some(value) => Ok(value),
        None => fail!(Internal, "scalar read returned no element"),
    }
}

pub(crate) fn write_slice<C: Container, T: H5Type>(container: &C, data: &[T]) -> Result<()> {
    let desc = T::type_descriptor();
    ensure_no_vlen_sequence(&desc)?;
    let n = element_count(container)?;
    ensure!(data.len() == n, TypeMismatch, "expected {n} elements, got {}", data.len());
    ensure_strings_fit(data, &container.stored_type()?)?;
    let mem_type = Datatype::from_descriptor(&desc)?;
    tracing::trace!(id = container.id().raw(), elements = n, "write");
    unsafe { container.write_from(&mem_type, data.as_ptr().cast()) }
}

pub(crate) fn read_strings<C: Container>(container: &C) -> Result<Vec<String>> {
    let stored = container.stored_type()?;
    let n = element_count(container)?;
    match stored.to_descriptor()? {
        TypeDescriptor::FixedString { size, padding, .. } => {
            let mut buf = vec![0_u8; n * size];
            unsafe { container.read_into(&stored, buf.as_mut_ptr().cast())? };
            Ok(buf.chunks_exact(size.max(1)).map(|bytes| decode_fixed(bytes, padding)).collect())
        }
        TypeDescriptor::VarLenString { encoding } => {
            let mem_type = Datatype::from_descriptor(&TypeDescriptor::VarLenString { encoding })?;
            let mut ptrs: Vec<*mut c_char> = vec![ptr::null_mut(); n];
            unsafe { container.read_into(&mem_type, ptrs.as_mut_ptr().cast())? };
            // Library-owned strings, released as they are copied out.
            Ok(h5lock!(ptrs
                .into_iter()
                .map(|ptr| take_h5_string(ptr).unwrap_or_default())
                .collect()))
        }
        other => fail!(TypeMismatch, "expected a string type, found {other}"),
    }
}

pub(crate) fn write_strings<C: Container, S: AsRef<str>>(container: &C, values: &[S]) -> Result<()> {
    let stored = container.stored_type()?;
    let n = element_count(container)?;
    ensure!(values.len() == n, TypeMismatch, "expected {n} strings, got {}", values.len());
    match stored.to_descriptor()? {
        TypeDescriptor::FixedString { size, encoding, padding } => {
            let mut buf = Vec::with_capacity(n * size);
            for value in values {
                buf.extend(encode_fixed(value.as_ref(), size, padding, encoding)?);
            }
            unsafe { container.write_from(&stored, buf.as_ptr().cast()) }
        }
        TypeDescriptor::VarLenString { encoding } => {
            let owned = values
                .iter()
                .map(|value| {
                    let value = value.as_ref();
                    ensure!(
                        encoding == StringEncoding::Utf8 || value.is_ascii(),
                        TypeMismatch,
                        "non-ASCII value {value:?} for an ASCII string type"
                    );
                    to_cstring(value)
                })
                .collect::<Result<Vec<CString>>>()?;
            let ptrs: Vec<*const c_char> = owned.iter().map(|s| s.as_ptr()).collect();
            let mem_type = Datatype::from_descriptor(&TypeDescriptor::VarLenString { encoding })?;
            unsafe { container.write_from(&mem_type, ptrs.as_ptr().cast()) }
        }
        other => fail!(TypeMismatch, "expected a string type, found {other}"),
    }
}
