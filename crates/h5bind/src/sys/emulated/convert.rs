//! Element conversion between memory and file representations.

use std::collections::HashSet;
use std::ffi::{CStr, CString};

use super::dtype::{EnumMember, NativeType, Order, StrSize, POINTER_SIZE};
use super::errors::Fault;
use crate::sys::h5t::*;
use crate::sys::types::c_char;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    /// Memory buffer into file storage.
    Write,
    /// File storage into a memory buffer.
    Read,
}

/// Conversion context: the file heap backing variable-length strings and the
/// set of engine-owned allocations handed out to callers.
pub(crate) struct Conv<'a> {
    pub dir: Direction,
    pub heap: &'a mut Vec<Vec<u8>>,
    pub allocations: &'a mut HashSet<usize>,
}

/// Checks that a conversion path exists, without touching any data.
pub(crate) fn check_convertible(src: &NativeType, dst: &NativeType) -> Result<(), Fault> {
    use NativeType::*;
    match (src, dst) {
        (Integer { .. } | Float { .. }, Integer { .. } | Float { .. }) => {
            for ty in [src, dst] {
                if let Float { size, .. } = ty {
                    if *size != 4 && *size != 8 {
                        bail!(Datatype, CantConvert, "unsupported floating-point size {size}");
                    }
                }
                if ty.size() > 16 {
                    bail!(Datatype, CantConvert, "unsupported integer size {}", ty.size());
                }
            }
            Ok(())
        }
        (Bitfield { .. }, Bitfield { .. }) | (Time { .. }, Time { .. }) => Ok(()),
        (String { size: StrSize::Variable, .. }, String { size: StrSize::Variable, .. })
        | (String { size: StrSize::Fixed(_), .. }, String { size: StrSize::Fixed(_), .. }) => Ok(()),
        (String { .. }, String { .. }) => {
            bail!(Datatype, CantConvert, "can't convert between fixed and variable-length strings")
        }
        (Opaque { size: a, tag: ta }, Opaque { size: b, tag: tb }) => {
            if a != b || ta != tb {
                bail!(Datatype, CantConvert, "opaque types differ");
            }
            Ok(())
        }
        (Reference { region: a }, Reference { region: b }) if a == b => Ok(()),
        (Enum { members: sm, .. }, Enum { members: dm, .. }) => {
            if sm.iter().any(|s| !dm.iter().any(|d| d.name == s.name)) {
                bail!(Datatype, CantConvert, "enumeration members do not match");
            }
            Ok(())
        }
        (Compound { members: sm, .. }, Compound { members: dm, .. }) => {
            for d in dm {
                if let Some(s) = sm.iter().find(|s| s.name == d.name) {
                    check_convertible(&s.ty, &d.ty)?;
                }
            }
            Ok(())
        }
        (Array { base: sb, dims: sd }, Array { base: db, dims: dd }) => {
            if sd.iter().product::<u64>() != dd.iter().product::<u64>() {
                bail!(Datatype, CantConvert, "array types have different element counts");
            }
            check_convertible(sb, db)
        }
        (VarLen { .. }, VarLen { .. }) => {
            bail!(Datatype, Unsupported, "variable-length sequences are not supported")
        }
        _ => bail!(
            Datatype,
            CantConvert,
            "no conversion path between class {:?} and {:?}",
            src.class(),
            dst.class()
        ),
    }
}

impl Conv<'_> {
    /// Converts a run of elements; `dst` provides background values for
    /// compound members absent from the source type.
    pub fn run(
        &mut self,
        src_ty: &NativeType,
        src: &[u8],
        dst_ty: &NativeType,
        dst: &mut [u8],
    ) -> Result<(), Fault> {
        let (ss, ds) = (src_ty.size(), dst_ty.size());
        for (s, d) in src.chunks_exact(ss).zip(dst.chunks_exact_mut(ds)) {
            self.element(src_ty, s, dst_ty, d)?;
        }
        Ok(())
    }

    /// Converts the elements at `src_offsets` into the slots at `dst_offsets`,
    /// both counted in elements of their own type.
    pub fn scatter(
        &mut self,
        src_ty: &NativeType,
        src: &[u8],
        src_offsets: &[u64],
        dst_ty: &NativeType,
        dst: &mut [u8],
        dst_offsets: &[u64],
    ) -> Result<(), Fault> {
        let (ss, ds) = (src_ty.size(), dst_ty.size());
        for (&s, &d) in src_offsets.iter().zip(dst_offsets) {
            let (s, d) = (s as usize * ss, d as usize * ds);
            self.element(src_ty, &src[s..s + ss], dst_ty, &mut dst[d..d + ds])?;
        }
        Ok(())
    }

    fn element(&mut self, src_ty: &NativeType, src: &[u8], dst_ty: &NativeType, dst: &mut [u8]) -> Result<(), Fault> {
        use NativeType::*;
        if src_ty == dst_ty && !src_ty.has_vlen() {
            dst.copy_from_slice(src);
            return Ok(());
        }
        match (src_ty, dst_ty) {
            (Integer { .. } | Float { .. }, Integer { .. } | Float { .. }) => {
                convert_number(src_ty, src, dst_ty, dst);
                Ok(())
            }
            (Bitfield { order: so, .. }, Bitfield { order: dor, .. })
            | (Time { order: so, .. }, Time { order: dor, .. }) => {
                let value = read_uint(src, *so);
                write_uint(dst, *dor, value);
                Ok(())
            }
            (String { size: StrSize::Fixed(_), .. }, String { size: StrSize::Fixed(_), pad, .. }) => {
                let text = fixed_text(src_ty, src);
                fill_fixed(dst, text, *pad);
                Ok(())
            }
            (String { size: StrSize::Variable, .. }, String { size: StrSize::Variable, .. }) => {
                self.vlen_string(src, dst)
            }
            (Opaque { .. }, Opaque { .. }) | (Reference { .. }, Reference { .. }) => {
                dst.copy_from_slice(src);
                Ok(())
            }
            (Enum { members: sm, .. }, Enum { members: dm, .. }) => {
                let name = enum_name(sm, src).ok_or_else(|| {
                    fault!(Datatype, CantConvert, "value {src:?} is not a member of the source enumeration")
                })?;
                let target = dm.iter().find(|m| m.name == name).ok_or_else(|| {
                    fault!(Datatype, CantConvert, "no destination member named {name:?}")
                })?;
                dst.copy_from_slice(&target.value);
                Ok(())
            }
            (Compound { members: sm, .. }, Compound { members: dm, .. }) => {
                for d in dm {
                    if let Some(s) = sm.iter().find(|s| s.name == d.name) {
                        let sub_src = &src[s.offset..s.offset + s.ty.size()];
                        let sub_dst = &mut dst[d.offset..d.offset + d.ty.size()];
                        self.element(&s.ty, sub_src, &d.ty, sub_dst)?;
                    }
                }
                Ok(())
            }
            (Array { base: sb, .. }, Array { base: db, .. }) => self.run(sb, src, db, dst),
            _ => {
                check_convertible(src_ty, dst_ty)?;
                bail!(Datatype, CantConvert, "conversion not implemented")
            }
        }
    }

    fn vlen_string(&mut self, src: &[u8], dst: &mut [u8]) -> Result<(), Fault> {
        let slot = read_slot(src);
        match self.dir {
            Direction::Write => {
                let stored = if slot == 0 {
                    0
                } else {
                    // SAFETY: variable-length string slots in memory buffers hold
                    // either NULL or a pointer to a NUL-terminated string.
                    let text = unsafe { CStr::from_ptr(slot as *const c_char) };
                    self.heap.push(text.to_bytes().to_vec());
                    self.heap.len()
                };
                write_slot(dst, stored);
            }
            Direction::Read => {
                let ptr = if slot == 0 {
                    0
                } else {
                    let bytes = self
                        .heap
                        .get(slot - 1)
                        .ok_or_else(|| fault!(Storage, ReadError, "dangling heap index {slot}"))?;
                    let text = CString::new(bytes.clone())
                        .map_err(|_| fault!(Datatype, CantConvert, "stored string contains NUL"))?;
                    let raw = text.into_raw() as usize;
                    self.allocations.insert(raw);
                    raw
                };
                write_slot(dst, ptr);
            }
        }
        Ok(())
    }
}

fn read_slot(bytes: &[u8]) -> usize {
    let mut raw = [0u8; POINTER_SIZE];
    raw.copy_from_slice(&bytes[..POINTER_SIZE]);
    usize::from_ne_bytes(raw)
}

fn write_slot(bytes: &mut [u8], value: usize) {
    bytes[..POINTER_SIZE].copy_from_slice(&value.to_ne_bytes());
}

fn enum_name<'m>(members: &'m [EnumMember], value: &[u8]) -> Option<&'m str> {
    members.iter().find(|m| m.value == value).map(|m| m.name.as_str())
}

/// Text of a fixed-length string element with its padding removed.
pub(crate) fn fixed_text<'b>(ty: &NativeType, bytes: &'b [u8]) -> &'b [u8] {
    let pad = match ty {
        NativeType::String { pad, .. } => *pad,
        _ => H5T_STR_NULLPAD as i32,
    };
    if pad == H5T_STR_SPACEPAD as i32 {
        let end = bytes.iter().rposition(|&b| b != b' ' && b != 0).map_or(0, |i| i + 1);
        &bytes[..end]
    } else {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        &bytes[..end]
    }
}

fn fill_fixed(dst: &mut [u8], text: &[u8], pad: i32) {
    let room = if pad == H5T_STR_NULLTERM as i32 { dst.len().saturating_sub(1) } else { dst.len() };
    let n = text.len().min(room);
    dst[..n].copy_from_slice(&text[..n]);
    let filler = if pad == H5T_STR_SPACEPAD as i32 { b' ' } else { 0 };
    for b in &mut dst[n..] {
        *b = filler;
    }
}

fn ordered(bytes: &[u8], order: Order) -> Vec<u8> {
    let mut le = bytes.to_vec();
    if order == Order::Be {
        le.reverse();
    }
    le
}

fn read_uint(bytes: &[u8], order: Order) -> u128 {
    ordered(bytes, order).iter().rev().fold(0u128, |acc, &b| (acc << 8) | b as u128)
}

fn write_uint(dst: &mut [u8], order: Order, value: u128) {
    let n = dst.len();
    let le = value.to_le_bytes();
    dst.copy_from_slice(&le[..n]);
    if order == Order::Be {
        dst.reverse();
    }
}

enum Number {
    Int(i128),
    Float(f64),
}

fn read_number(ty: &NativeType, bytes: &[u8]) -> Number {
    match ty {
        NativeType::Integer { size, order, signed } => {
            let raw = read_uint(bytes, *order);
            let bits = (*size * 8) as u32;
            if *signed && bits < 128 && raw >> (bits - 1) & 1 == 1 {
                Number::Int((raw | (!0u128 << bits)) as i128)
            } else {
                Number::Int(raw as i128)
            }
        }
        NativeType::Float { size: 4, order } => {
            let le = ordered(bytes, *order);
            Number::Float(f32::from_le_bytes([le[0], le[1], le[2], le[3]]) as f64)
        }
        NativeType::Float { order, .. } => {
            let le = ordered(bytes, *order);
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&le[..8]);
            Number::Float(f64::from_le_bytes(raw))
        }
        _ => Number::Int(0),
    }
}

fn int_range(size: usize, signed: bool) -> (i128, i128) {
    let bits = (size * 8).min(127) as u32;
    if signed {
        (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
    } else {
        (0, (1i128 << bits) - 1)
    }
}

/// Numeric conversion with saturation on overflow, matching the library's
/// hard conversion paths.
fn convert_number(src_ty: &NativeType, src: &[u8], dst_ty: &NativeType, dst: &mut [u8]) {
    let value = read_number(src_ty, src);
    match dst_ty {
        NativeType::Integer { size, order, signed } => {
            let (lo, hi) = int_range(*size, *signed);
            let v = match value {
                Number::Int(v) => v.clamp(lo, hi),
                Number::Float(f) if f.is_nan() => 0,
                Number::Float(f) => (f.trunc().clamp(lo as f64, hi as f64)) as i128,
            };
            write_uint(dst, *order, v as u128);
        }
        NativeType::Float { size, order } => {
            let f = match value {
                Number::Int(v) => v as f64,
                Number::Float(f) => f,
            };
            let mut le = if *size == 4 { (f as f32).to_le_bytes().to_vec() } else { f.to_le_bytes().to_vec() };
            if *order == Order::Be {
                le.reverse();
            }
            dst.copy_from_slice(&le);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conv<'a>(dir: Direction, heap: &'a mut Vec<Vec<u8>>, allocations: &'a mut HashSet<usize>) -> Conv<'a> {
        Conv { dir, heap, allocations }
    }

    #[test]
    fn test_integer_saturation_and_order() {
        let i32le = NativeType::Integer { size: 4, order: Order::Le, signed: true };
        let u8t = NativeType::Integer { size: 1, order: Order::Le, signed: false };
        let i16be = NativeType::Integer { size: 2, order: Order::Be, signed: true };
        let (mut heap, mut allocs) = (Vec::new(), HashSet::new());
        let mut c = conv(Direction::Write, &mut heap, &mut allocs);

        let src: Vec<u8> = [-5i32, 300, 7].iter().flat_map(|v| v.to_le_bytes()).collect();
        let mut dst = vec![0u8; 3];
        c.run(&i32le, &src, &u8t, &mut dst).unwrap();
        assert_eq!(dst, vec![0, 255, 7]);

        let mut be = vec![0u8; 6];
        c.run(&i32le, &src, &i16be, &mut be).unwrap();
        assert_eq!(&be[..2], &(-5i16).to_be_bytes());
    }

    #[test]
    fn test_float_to_int_truncates() {
        let f64le = NativeType::Float { size: 8, order: Order::Le };
        let i8t = NativeType::Integer { size: 1, order: Order::Le, signed: true };
        let (mut heap, mut allocs) = (Vec::new(), HashSet::new());
        let mut c = conv(Direction::Write, &mut heap, &mut allocs);
        let src: Vec<u8> = [2.9f64, -1000.0, f64::NAN].iter().flat_map(|v| v.to_le_bytes()).collect();
        let mut dst = vec![0u8; 3];
        c.run(&f64le, &src, &i8t, &mut dst).unwrap();
        assert_eq!(dst, vec![2, (-128i8) as u8, 0]);
    }

    #[test]
    fn test_fixed_string_padding() {
        let nullterm = NativeType::String { size: StrSize::Fixed(4), cset: 0, pad: H5T_STR_NULLTERM as i32 };
        let spacepad = NativeType::String { size: StrSize::Fixed(6), cset: 0, pad: H5T_STR_SPACEPAD as i32 };
        let (mut heap, mut allocs) = (Vec::new(), HashSet::new());
        let mut c = conv(Direction::Write, &mut heap, &mut allocs);
        let mut dst = vec![0u8; 6];
        c.run(&nullterm, b"abc\0", &spacepad, &mut dst).unwrap();
        assert_eq!(&dst, b"abc   ");
        let mut back = vec![0u8; 4];
        c.run(&spacepad, b"abcdef", &nullterm, &mut back).unwrap();
        assert_eq!(&back, b"abc\0");
    }

    #[test]
    fn test_vlen_string_round_trip_through_heap() {
        let vstr = NativeType::String { size: StrSize::Variable, cset: 1, pad: 0 };
        let (mut heap, mut allocs) = (Vec::new(), HashSet::new());
        let text = CString::new("héllo").unwrap();
        let mut src = vec![0u8; POINTER_SIZE * 2];
        write_slot(&mut src, text.as_ptr() as usize);

        let mut stored = vec![0u8; POINTER_SIZE * 2];
        conv(Direction::Write, &mut heap, &mut allocs).run(&vstr, &src, &vstr, &mut stored).unwrap();
        assert_eq!(heap, vec!["héllo".as_bytes().to_vec()]);
        assert_eq!(read_slot(&stored[POINTER_SIZE..]), 0);

        let mut out = vec![0u8; POINTER_SIZE * 2];
        conv(Direction::Read, &mut heap, &mut allocs).run(&vstr, &stored, &vstr, &mut out).unwrap();
        let ptr = read_slot(&out);
        assert!(allocs.contains(&ptr));
        let back = unsafe { CString::from_raw(ptr as *mut c_char) };
        assert_eq!(back.to_str().unwrap(), "héllo");
        assert_eq!(read_slot(&out[POINTER_SIZE..]), 0);
    }

    #[test]
    fn test_incompatible_classes() {
        let int = NativeType::Integer { size: 4, order: Order::Le, signed: true };
        let s = NativeType::String { size: StrSize::Fixed(4), cset: 0, pad: 0 };
        let err = check_convertible(&int, &s).unwrap_err();
        assert_eq!(err.minor, super::super::errors::Minor::CantConvert);
    }
}
