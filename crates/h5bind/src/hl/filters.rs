//! Filter pipeline entries and the filter registry (H5Z).

use std::fmt;

use crate::error::Result;
use crate::sys::{
    c_uint, H5Z_filter_t, H5Zfilter_avail, H5Zget_filter_info, H5Z_FILTER_CONFIG_DECODE_ENABLED,
    H5Z_FILTER_CONFIG_ENCODE_ENABLED, H5Z_FILTER_DEFLATE, H5Z_FILTER_FLETCHER32, H5Z_FILTER_NBIT,
    H5Z_FILTER_SCALEOFFSET, H5Z_FILTER_SHUFFLE, H5Z_FILTER_SZIP,
};

/// One stage of a dataset's filter pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Filter {
    /// zlib compression with a level in `0..=9`.
    Deflate(u8),
    Shuffle,
    Fletcher32,
    Szip,
    NBit,
    ScaleOffset,
    /// Any other registered filter id.
    User(H5Z_filter_t),
}

impl Filter {
    pub fn id(&self) -> H5Z_filter_t {
        match self {
            Filter::Deflate(_) => H5Z_FILTER_DEFLATE,
            Filter::Shuffle => H5Z_FILTER_SHUFFLE,
            Filter::Fletcher32 => H5Z_FILTER_FLETCHER32,
            Filter::Szip => H5Z_FILTER_SZIP,
            Filter::NBit => H5Z_FILTER_NBIT,
            Filter::ScaleOffset => H5Z_FILTER_SCALEOFFSET,
            Filter::User(id) => *id,
        }
    }

    /// Pipeline entry as reported by `H5Pget_filter2`.
    pub(crate) fn from_raw(id: H5Z_filter_t, cd_values: &[c_uint]) -> Self {
        match id {
            H5Z_FILTER_DEFLATE => Filter::Deflate(cd_values.first().map_or(0, |&level| level as u8)),
            H5Z_FILTER_SHUFFLE => Filter::Shuffle,
            H5Z_FILTER_FLETCHER32 => Filter::Fletcher32,
            H5Z_FILTER_SZIP => Filter::Szip,
            H5Z_FILTER_NBIT => Filter::NBit,
            H5Z_FILTER_SCALEOFFSET => Filter::ScaleOffset,
            other => Filter::User(other),
        }
    }

    /// `true` if the library can apply this filter.
    pub fn is_available(&self) -> Result<bool> {
        filter_available(self.id())
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Filter::Deflate(level) => write!(f, "deflate({level})"),
            Filter::Shuffle => f.write_str("shuffle"),
            Filter::Fletcher32 => f.write_str("fletcher32"),
            Filter::Szip => f.write_str("szip"),
            Filter::NBit => f.write_str("nbit"),
            Filter::ScaleOffset => f.write_str("scaleoffset"),
            Filter::User(id) => write!(f, "filter #{id}"),
        }
    }
}

/// What a registered filter can do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterInfo {
    pub encode: bool,
    pub decode: bool,
}

/// `true` if filter `id` is registered. Ids outside `0..=65535` fail with `Unsupported`.
pub fn filter_available(id: H5Z_filter_t) -> Result<bool> {
    Ok(h5try!(H5Zfilter_avail(id)) > 0)
}

/// Encode/decode capabilities of a registered filter; `NotFound` if it is not registered.
pub fn filter_info(id: H5Z_filter_t) -> Result<FilterInfo> {
    let mut flags: c_uint = 0;
    h5try!(H5Zget_filter_info(id, &mut flags));
    Ok(FilterInfo {
        encode: flags & H5Z_FILTER_CONFIG_ENCODE_ENABLED != 0,
        decode: flags & H5Z_FILTER_CONFIG_DECODE_ENABLED != 0,
    })
}

#[cfg(all(test, feature = "emulated"))]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_builtin_filters_available() {
        assert!(Filter::Deflate(4).is_available().unwrap());
        assert!(Filter::Shuffle.is_available().unwrap());
        assert!(!Filter::User(32000).is_available().unwrap());
        let info = filter_info(H5Z_FILTER_FLETCHER32).unwrap();
        assert_eq!(info, FilterInfo { encode: true, decode: true });
    }

    #[test]
    fn test_filter_errors() {
        assert_eq!(filter_available(70_000).unwrap_err().kind(), ErrorKind::Unsupported);
        assert_eq!(filter_info(32000).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_from_raw() {
        assert_eq!(Filter::from_raw(H5Z_FILTER_DEFLATE, &[7]), Filter::Deflate(7));
        assert_eq!(Filter::from_raw(307, &[]), Filter::User(307));
        assert_eq!(Filter::Deflate(7).to_string(), "deflate(7)");
    }
}
