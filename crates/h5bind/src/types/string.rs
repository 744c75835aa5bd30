//! Fixed-length string values and their byte encoding.

use std::borrow::{Borrow, Cow};
use std::error::Error as StdError;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, Index, RangeFull};
use std::str::{self, FromStr};

use ascii::{AsAsciiStr, AsAsciiStrError, AsciiStr};

use crate::error::{Error, ErrorKind, Result};
use crate::types::descriptor::{StringEncoding, StringPadding};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum StringError {
    InternalNull,
    InsufficientCapacity { len: usize, capacity: usize },
    AsciiError(AsAsciiStrError),
}

impl From<AsAsciiStrError> for StringError {
    fn from(err: AsAsciiStrError) -> Self {
        Self::AsciiError(err)
    }
}

impl StdError for StringError {}

impl fmt::Display for StringError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StringError::InternalNull => write!(f, "string error: string with internal null"),
            StringError::InsufficientCapacity { len, capacity } => write!(
                f,
                "string error: {len} bytes do not fit in a fixed string of {capacity} bytes"
            ),
            StringError::AsciiError(err) => write!(f, "string error: {err}"),
        }
    }
}

impl From<StringError> for Error {
    fn from(err: StringError) -> Self {
        let kind = match err {
            StringError::InternalNull => ErrorKind::Unsupported,
            StringError::InsufficientCapacity { .. } => ErrorKind::StringTooLong,
            StringError::AsciiError(_) => ErrorKind::TypeMismatch,
        };
        Error::binding(kind, err.to_string())
    }
}

/// Longest value, in bytes, a fixed string of `size` bytes can hold.
pub fn fixed_capacity(size: usize, padding: StringPadding) -> usize {
    match padding {
        StringPadding::NullTerm => size.saturating_sub(1),
        StringPadding::NullPad | StringPadding::SpacePad => size,
    }
}

/// Encode `value` into exactly `size` bytes.
///
/// Values that do not fit fail with `StringTooLong`; nothing is truncated.
pub fn encode_fixed(
    value: &str,
    size: usize,
    padding: StringPadding,
    encoding: StringEncoding,
) -> Result<Vec<u8>> {
    let bytes = value.as_bytes();
    if bytes.contains(&0) {
        return Err(StringError::InternalNull.into());
    }
    if encoding == StringEncoding::Ascii {
        AsciiStr::from_ascii(bytes).map_err(StringError::from)?;
    }
    let capacity = fixed_capacity(size, padding);
    if bytes.len() > capacity {
        return Err(StringError::InsufficientCapacity { len: bytes.len(), capacity }.into());
    }
    let fill = if padding == StringPadding::SpacePad { b' ' } else { 0 };
    let mut out = vec![fill; size];
    out[..bytes.len()].copy_from_slice(bytes);
    Ok(out)
}

/// Decode a fixed string element, stripping its padding.
///
/// Never fails: invalid UTF-8 is replaced.
pub fn decode_fixed(bytes: &[u8], padding: StringPadding) -> String {
    String::from_utf8_lossy(unpadded(bytes, padding)).into_owned()
}

/// The value bytes of a fixed string element, without its padding.
pub(crate) fn unpadded(bytes: &[u8], padding: StringPadding) -> &[u8] {
    match padding {
        StringPadding::NullTerm | StringPadding::NullPad => {
            let end = bytes.iter().position(|&c| c == 0).unwrap_or(bytes.len());
            &bytes[..end]
        }
        StringPadding::SpacePad => {
            let end = bytes.iter().rposition(|&c| c != b' ' && c != 0).map_or(0, |i| i + 1);
            &bytes[..end]
        }
    }
}

/// Longest valid UTF-8 prefix of `bytes`.
fn utf8_prefix(bytes: &[u8]) -> &str {
    match str::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default(),
    }
}

macro_rules! impl_string_eq {
    ($lhs:ty, $rhs:ty) => {
        impl<'a, const N: usize> PartialEq<$rhs> for $lhs {
            #[inline]
            fn eq(&self, other: &$rhs) -> bool {
                PartialEq::eq(&self[..], &other[..])
            }
        }

        impl<'a, const N: usize> PartialEq<$lhs> for $rhs {
            #[inline]
            fn eq(&self, other: &$lhs) -> bool {
                PartialEq::eq(&self[..], &other[..])
            }
        }
    };
}

macro_rules! impl_string_traits {
    ($ty:ty) => {
        impl<const N: usize> fmt::Debug for $ty {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                self.as_str().fmt(f)
            }
        }

        impl<const N: usize> fmt::Display for $ty {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                self.as_str().fmt(f)
            }
        }

        impl<const N: usize> Hash for $ty {
            #[inline]
            fn hash<H: Hasher>(&self, hasher: &mut H) {
                Hash::hash(&self.as_bytes(), hasher)
            }
        }

        impl<const N: usize> Default for $ty {
            #[inline]
            fn default() -> Self {
                Self::new()
            }
        }

        impl<const N: usize> Deref for $ty {
            type Target = str;

            #[inline]
            fn deref(&self) -> &str {
                self.as_str()
            }
        }

        impl<const N: usize> Borrow<str> for $ty {
            #[inline]
            fn borrow(&self) -> &str {
                self
            }
        }

        impl<const N: usize> AsRef<str> for $ty {
            #[inline]
            fn as_ref(&self) -> &str {
                self
            }
        }

        impl<const N: usize> AsRef<[u8]> for $ty {
            #[inline]
            fn as_ref(&self) -> &[u8] {
                self.as_bytes()
            }
        }

        impl<const N: usize> Index<RangeFull> for $ty {
            type Output = str;

            #[inline]
            fn index(&self, _: RangeFull) -> &str {
                self
            }
        }

        impl<const N: usize> PartialEq for $ty {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                PartialEq::eq(&self[..], &other[..])
            }
        }

        impl<const N: usize> Eq for $ty {}

        impl_string_eq!($ty, str);
        impl_string_eq!($ty, &'a str);
        impl_string_eq!($ty, String);
        impl_string_eq!($ty, Cow<'a, str>);

        impl<const N: usize> From<$ty> for String {
            #[inline]
            fn from(s: $ty) -> String {
                s.as_str().to_owned()
            }
        }

        impl<const N: usize> $ty {
            #[inline]
            pub const fn new() -> Self {
                Self { buf: [0; N] }
            }

            fn from_bytes(bytes: &[u8]) -> Self {
                let mut buf = [0; N];
                let len = bytes.len().min(N);
                buf[..len].copy_from_slice(&bytes[..len]);
                Self { buf }
            }

            #[inline]
            pub const fn capacity() -> usize {
                N
            }

            /// Bytes up to the first NUL.
            #[inline]
            pub fn as_bytes(&self) -> &[u8] {
                let end = self.buf.iter().position(|&c| c == 0).unwrap_or(N);
                &self.buf[..end]
            }

            #[inline]
            pub fn len(&self) -> usize {
                self.as_bytes().len()
            }

            #[inline]
            pub fn is_empty(&self) -> bool {
                self.buf.first().map_or(true, |&c| c == 0)
            }

            #[inline]
            pub fn as_ptr(&self) -> *const u8 {
                self.buf.as_ptr()
            }

            /// The stored text; bytes that are not valid UTF-8 end it early.
            #[inline]
            pub fn as_str(&self) -> &str {
                utf8_prefix(self.as_bytes())
            }
        }
    };
}

/// ASCII string stored inline in `N` null-padded bytes.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct FixedAscii<const N: usize> {
    buf: [u8; N],
}

impl_string_traits!(FixedAscii<N>);

impl<const N: usize> FixedAscii<N> {
    pub fn from_ascii<B: ?Sized + AsRef<[u8]>>(bytes: &B) -> Result<Self, StringError> {
        let bytes = bytes.as_ref();
        if bytes.contains(&0) {
            return Err(StringError::InternalNull);
        }
        if bytes.len() > N {
            return Err(StringError::InsufficientCapacity { len: bytes.len(), capacity: N });
        }
        let s = AsciiStr::from_ascii(bytes)?;
        Ok(Self::from_bytes(s.as_bytes()))
    }
}

impl<const N: usize> AsAsciiStr for FixedAscii<N> {
    type Inner = u8;

    #[inline]
    fn slice_ascii<R>(&self, range: R) -> Result<&AsciiStr, AsAsciiStrError>
    where
        R: std::slice::SliceIndex<[u8], Output = [u8]>,
    {
        self.as_bytes().slice_ascii(range)
    }

    #[inline]
    fn as_ascii_str(&self) -> Result<&AsciiStr, AsAsciiStrError> {
        AsciiStr::from_ascii(self.as_bytes())
    }

    #[inline]
    unsafe fn as_ascii_str_unchecked(&self) -> &AsciiStr {
        unsafe { AsciiStr::from_ascii_unchecked(self.as_bytes()) }
    }
}

/// UTF-8 string stored inline in `N` null-padded bytes.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct FixedUnicode<const N: usize> {
    buf: [u8; N],
}

impl_string_traits!(FixedUnicode<N>);

impl<const N: usize> FromStr for FixedUnicode<N> {
    type Err = StringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('\0') {
            return Err(StringError::InternalNull);
        }
        if s.len() > N {
            return Err(StringError::InsufficientCapacity { len: s.len(), capacity: N });
        }
        Ok(Self::from_bytes(s.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_ascii() {
        let s = FixedAscii::<6>::from_ascii("abc").unwrap();
        assert_eq!(s, "abc");
        assert_eq!(s.len(), 3);
        assert_eq!(FixedAscii::<6>::capacity(), 6);
        assert!(FixedAscii::<4>::new().is_empty());
        assert_eq!(
            FixedAscii::<2>::from_ascii("abc").unwrap_err(),
            StringError::InsufficientCapacity { len: 3, capacity: 2 }
        );
        assert!(matches!(FixedAscii::<4>::from_ascii("é"), Err(StringError::AsciiError(_))));
        assert_eq!(FixedAscii::<4>::from_ascii("a\0").unwrap_err(), StringError::InternalNull);
    }

    #[test]
    fn test_fixed_unicode() {
        let s: FixedUnicode<8> = "héllo".parse().unwrap();
        assert_eq!(s.as_str(), "héllo");
        assert_eq!(s.len(), 6);
        assert!("ééééé".parse::<FixedUnicode<8>>().is_err());
        assert_eq!(String::from(s), "héllo");
    }

    #[test]
    fn test_encode_fixed_padding() {
        let nt = encode_fixed("ab", 4, StringPadding::NullTerm, StringEncoding::Ascii).unwrap();
        assert_eq!(nt, b"ab\0\0");
        let sp = encode_fixed("ab", 4, StringPadding::SpacePad, StringEncoding::Ascii).unwrap();
        assert_eq!(sp, b"ab  ");
        let full = encode_fixed("abcd", 4, StringPadding::NullPad, StringEncoding::Ascii).unwrap();
        assert_eq!(full, b"abcd");
    }

    #[test]
    fn test_encode_fixed_never_truncates() {
        let err = encode_fixed("abcd", 4, StringPadding::NullTerm, StringEncoding::Ascii).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StringTooLong);
        let err = encode_fixed("abcde", 4, StringPadding::SpacePad, StringEncoding::Utf8).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StringTooLong);
        let err = encode_fixed("é", 4, StringPadding::NullPad, StringEncoding::Ascii).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        let err = encode_fixed("a\0", 4, StringPadding::NullPad, StringEncoding::Ascii).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_decode_fixed() {
        assert_eq!(decode_fixed(b"ab\0cd", StringPadding::NullTerm), "ab");
        assert_eq!(decode_fixed(b"ab\0\0", StringPadding::NullPad), "ab");
        assert_eq!(decode_fixed(b"a b  ", StringPadding::SpacePad), "a b");
        assert_eq!(decode_fixed(b"abcd", StringPadding::NullPad), "abcd");
        assert_eq!(decode_fixed(b"\xffa\0", StringPadding::NullPad), "\u{fffd}a");
    }
}
