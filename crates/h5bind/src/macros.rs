//! Macros for HDF5 operations.

#![allow(unused_macros)]

/// Return a binding error of the given `ErrorKind` variant.
macro_rules! fail {
    ($kind:ident, $($arg:tt)*) => (
        return Err($crate::error::Error::binding(
            $crate::error::ErrorKind::$kind,
            format!($($arg)*),
        ))
    );
}

macro_rules! ensure {
    ($expr:expr, $kind:ident, $($arg:tt)*) => (
        if !($expr) {
            fail!($kind, $($arg)*);
        }
    );
}

/// Run code containing HDF5 calls in a closure synchronized by a global reentrant mutex.
#[macro_export]
#[doc(hidden)]
macro_rules! h5lock {
    ($expr:expr) => {{
        #[allow(clippy::redundant_closure)]
        #[allow(unused_unsafe)]
        unsafe {
            $crate::sync(|| $expr)
        }
    }};
}

/// Convert result of an HDF5 call to `Result` (guarded by a global reentrant mutex).
///
/// The error stack is captured inside the same critical section as the call.
#[macro_export]
#[doc(hidden)]
macro_rules! h5call {
    ($expr:expr) => {
        $crate::h5lock!($crate::error::h5check($expr))
    };
}

/// `h5try!(..)` is a convenience shortcut for `h5call!(..)?`.
#[macro_export]
#[doc(hidden)]
macro_rules! h5try {
    ($expr:expr) => {
        match $crate::h5call!($expr) {
            Ok(value) => value,
            Err(err) => return Err(From::from(err)),
        }
    };
}
