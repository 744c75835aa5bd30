//! Host types with a native memory layout.

use crate::types::descriptor::{FloatSize, IntSize, StringEncoding, StringPadding, TypeDescriptor};
use crate::types::string::{FixedAscii, FixedUnicode};

/// A type whose in-memory layout is exactly the one its descriptor describes.
///
/// # Safety
///
/// `type_descriptor()` must describe the size, alignment-independent layout and byte
/// order of `Self` exactly; buffers of `Self` are handed to the library as raw bytes.
pub unsafe trait H5Type: 'static + Sized + Copy {
    fn type_descriptor() -> TypeDescriptor;
}

macro_rules! impl_h5type {
    ($ty:ty, $variant:ident, $size:expr) => {
        unsafe impl H5Type for $ty {
            #[inline]
            fn type_descriptor() -> TypeDescriptor {
                TypeDescriptor::$variant($size)
            }
        }
    };
}

impl_h5type!(i8, int, IntSize::U1);
impl_h5type!(i16, int, IntSize::U2);
impl_h5type!(i32, int, IntSize::U4);
impl_h5type!(i64, int, IntSize::U8);
impl_h5type!(u8, uint, IntSize::U1);
impl_h5type!(u16, uint, IntSize::U2);
impl_h5type!(u32, uint, IntSize::U4);
impl_h5type!(u64, uint, IntSize::U8);
impl_h5type!(f32, float, FloatSize::U4);
impl_h5type!(f64, float, FloatSize::U8);

#[cfg(target_pointer_width = "32")]
impl_h5type!(isize, int, IntSize::U4);
#[cfg(target_pointer_width = "32")]
impl_h5type!(usize, uint, IntSize::U4);
#[cfg(target_pointer_width = "64")]
impl_h5type!(isize, int, IntSize::U8);
#[cfg(target_pointer_width = "64")]
impl_h5type!(usize, uint, IntSize::U8);

unsafe impl H5Type for bool {
    #[inline]
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Boolean
    }
}

unsafe impl<T: H5Type, const N: usize> H5Type for [T; N] {
    #[inline]
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::FixedArray(Box::new(T::type_descriptor()), vec![N])
    }
}

unsafe impl<const N: usize> H5Type for FixedAscii<N> {
    #[inline]
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::FixedString {
            size: N,
            encoding: StringEncoding::Ascii,
            padding: StringPadding::NullPad,
        }
    }
}

unsafe impl<const N: usize> H5Type for FixedUnicode<N> {
    #[inline]
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::FixedString {
            size: N,
            encoding: StringEncoding::Utf8,
            padding: StringPadding::NullPad,
        }
    }
}

#[cfg(feature = "complex")]
mod complex {
    use num_complex::Complex;

    use super::*;
    use crate::types::descriptor::CompoundType;

    macro_rules! impl_complex {
        ($float:ty) => {
            unsafe impl H5Type for Complex<$float> {
                fn type_descriptor() -> TypeDescriptor {
                    let part = <$float as H5Type>::type_descriptor();
                    let ty = CompoundType::packed([("r", part.clone()), ("i", part)]);
                    debug_assert_eq!(ty.size, std::mem::size_of::<Complex<$float>>());
                    TypeDescriptor::Compound(ty)
                }
            }
        };
    }

    impl_complex!(f32);
    impl_complex!(f64);
}

#[cfg(test)]
mod tests {
    use std::mem;

    use super::*;

    #[test]
    fn test_primitive_descriptors() {
        assert_eq!(i32::type_descriptor(), TypeDescriptor::int(IntSize::U4));
        assert_eq!(u8::type_descriptor(), TypeDescriptor::uint(IntSize::U1));
        assert_eq!(f64::type_descriptor(), TypeDescriptor::float(FloatSize::U8));
        assert_eq!(bool::type_descriptor(), TypeDescriptor::Boolean);
        assert_eq!(usize::type_descriptor().size(), mem::size_of::<usize>());
    }

    #[test]
    fn test_sizes_match_layout() {
        assert_eq!(<[[u16; 3]; 2]>::type_descriptor().size(), mem::size_of::<[[u16; 3]; 2]>());
        assert_eq!(FixedAscii::<7>::type_descriptor().size(), 7);
        assert_eq!(FixedUnicode::<5>::type_descriptor().typestr(), "|U5");
    }

    #[cfg(feature = "complex")]
    #[test]
    fn test_complex_descriptor() {
        use num_complex::Complex64;
        let TypeDescriptor::Compound(c) = Complex64::type_descriptor() else {
            panic!("expected a compound");
        };
        assert_eq!(c.fields[1].name, "i");
        assert_eq!(c.fields[1].offset, 8);
    }
}
