//! Error helpers for the engine internals.

/// Build a [`Fault`](super::errors::Fault) at the call site.
macro_rules! fault {
    ($maj:ident, $min:ident, $($arg:tt)+) => {
        $crate::sys::emulated::errors::Fault {
            major: $crate::sys::emulated::errors::Major::$maj,
            minor: $crate::sys::emulated::errors::Minor::$min,
            origin: module_path!(),
            file: file!(),
            line: line!(),
            desc: format!($($arg)+),
        }
    };
}

macro_rules! bail {
    ($($arg:tt)+) => {
        return Err(fault!($($arg)+))
    };
}
