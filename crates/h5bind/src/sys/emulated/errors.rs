//! Per-thread error stack and the message catalogue.

use std::cell::RefCell;
use std::ffi::CString;

use parking_lot::Mutex;

use super::ids::make_id;
use crate::sys::h5e::H5E_auto2_t;
use crate::sys::h5i::{H5I_ERROR_CLASS, H5I_ERROR_MSG};
use crate::sys::types::*;

pub(crate) const ERROR_CLASS_ID: hid_t = make_id(H5I_ERROR_CLASS, 1);
const MINOR_BASE: i64 = 128;

macro_rules! catalogue {
    ($name:ident, $base:expr, { $($variant:ident => $text:expr,)+ }) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub(crate) enum $name {
            $($variant,)+
        }

        impl $name {
            pub(crate) const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub(crate) const fn id(self) -> hid_t {
                make_id(H5I_ERROR_MSG, $base + 1 + self as i64)
            }

            pub(crate) fn text(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            pub(crate) fn from_id(id: hid_t) -> Option<Self> {
                Self::ALL.iter().copied().find(|m| m.id() == id)
            }
        }
    };
}

catalogue!(Major, 0, {
    Args => "Invalid arguments to routine",
    Resource => "Resource unavailable",
    Internal => "Internal error (too specific to document in detail)",
    File => "File accessibility",
    Io => "Low-level I/O",
    Func => "Function entry/exit",
    Id => "Object ID",
    Storage => "Data storage",
    Sym => "Symbol table",
    Link => "Links",
    Ohdr => "Object header",
    Dataset => "Dataset",
    Dataspace => "Dataspace",
    Datatype => "Datatype",
    Attr => "Attribute",
    Plist => "Property lists",
    Reference => "References",
    Pline => "Data filters",
    Vfl => "Virtual File Layer",
});

catalogue!(Minor, MINOR_BASE, {
    NotFound => "Object not found",
    Exists => "Object already exists",
    AlreadyExists => "Object already exists",
    FileExists => "File already exists",
    FileOpen => "File already open",
    CantOpenFile => "Unable to open file",
    CantCloseFile => "Unable to close file",
    NotHdf5 => "Not an HDF5 file",
    ReadError => "Read failed",
    WriteError => "Write failed",
    SeekError => "Seek failed",
    Truncated => "File has been truncated",
    BadId => "Unable to find ID information (already closed?)",
    BadType => "Inappropriate type",
    BadValue => "Bad value",
    BadRange => "Out of range",
    CantConvert => "Can't convert datatypes",
    Unsupported => "Feature is unsupported",
    CantGet => "Can't get value",
    CantSet => "Can't set value",
    CantInit => "Unable to initialize object",
    CantCreate => "Unable to create file",
    CantOpenObj => "Can't open object",
    CantClose => "Can't close object",
    CantInsert => "Unable to insert object",
    CantDelete => "Can't delete message",
    CantCopy => "Unable to copy object",
    CantMove => "Can't move object",
    CantFree => "Unable to free object",
    CantDec => "Unable to decrement reference count",
    CantNext => "Can't move to next iterator location",
    CantFlush => "Unable to flush data from cache",
});

/// Error raised inside the engine, turned into stack records at the API boundary.
#[derive(Debug)]
pub(crate) struct Fault {
    pub major: Major,
    pub minor: Minor,
    pub origin: &'static str,
    pub file: &'static str,
    pub line: u32,
    pub desc: String,
}

#[derive(Clone, Debug)]
pub(crate) struct ErrorRecord {
    pub major: Major,
    pub minor: Minor,
    pub func: CString,
    pub file: CString,
    pub line: u32,
    pub desc: CString,
}

impl ErrorRecord {
    fn new(major: Major, minor: Minor, func: &str, file: &str, line: u32, desc: &str) -> Self {
        Self {
            major,
            minor,
            func: cstring_lossy(func),
            file: cstring_lossy(file),
            line,
            desc: cstring_lossy(desc),
        }
    }
}

fn cstring_lossy(s: &str) -> CString {
    CString::new(s.replace('\0', " ")).unwrap_or_default()
}

thread_local! {
    static STACK: RefCell<Vec<ErrorRecord>> = const { RefCell::new(Vec::new()) };
}

/// Automatic reporting hook installed with `H5Eset_auto2`.
#[derive(Clone, Copy)]
enum AutoReport {
    Print,
    Disabled,
    Custom(unsafe extern "C" fn(hid_t, *mut c_void) -> herr_t, usize),
}

static AUTO_REPORT: Mutex<AutoReport> = Mutex::new(AutoReport::Print);

pub(crate) fn clear() {
    STACK.with(|s| s.borrow_mut().clear());
}

pub(crate) fn take() -> Vec<ErrorRecord> {
    STACK.with(|s| std::mem::take(&mut *s.borrow_mut()))
}

pub(crate) fn snapshot() -> Vec<ErrorRecord> {
    STACK.with(|s| s.borrow().clone())
}

/// Push the fault (innermost) and the API frame on top of it, then run the
/// automatic report hook.
pub(crate) fn report(api: &'static str, summary: &str, fault: Fault) {
    let inner = ErrorRecord::new(
        fault.major,
        fault.minor,
        fault.origin,
        fault.file,
        fault.line,
        &fault.desc,
    );
    let outer = ErrorRecord::new(fault.major, fault.minor, api, file!(), line!(), summary);
    STACK.with(|s| {
        let mut stack = s.borrow_mut();
        stack.push(inner);
        stack.push(outer);
    });
    let hook = *AUTO_REPORT.lock();
    match hook {
        AutoReport::Disabled => {}
        AutoReport::Print => print_current(),
        AutoReport::Custom(func, data) => unsafe {
            func(crate::sys::h5e::H5E_DEFAULT, data as *mut c_void);
        },
    }
}

fn print_current() {
    let records = snapshot();
    let thread = std::thread::current();
    eprintln!(
        "HDF5-DIAG: Error detected in h5bind emulated engine, thread {:?}:",
        thread.id()
    );
    for (n, rec) in records.iter().rev().enumerate() {
        eprintln!(
            "  #{n:03}: {} line {} in {}(): {}",
            rec.file.to_string_lossy(),
            rec.line,
            rec.func.to_string_lossy(),
            rec.desc.to_string_lossy()
        );
        eprintln!("    major: {}", rec.major.text());
        eprintln!("    minor: {}", rec.minor.text());
    }
}

pub(crate) fn set_auto(func: H5E_auto2_t, data: *mut c_void) {
    *AUTO_REPORT.lock() = match func {
        None => AutoReport::Disabled,
        Some(func) => AutoReport::Custom(func, data as usize),
    };
}

pub(crate) fn message(id: hid_t) -> Option<(bool, &'static str)> {
    if let Some(major) = Major::from_id(id) {
        return Some((true, major.text()));
    }
    Minor::from_id(id).map(|minor| (false, minor.text()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_ids_are_distinct() {
        let mut ids: Vec<hid_t> = Major::ALL.iter().map(|m| m.id()).collect();
        ids.extend(Minor::ALL.iter().map(|m| m.id()));
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_message_lookup() {
        assert_eq!(message(Minor::NotFound.id()), Some((false, "Object not found")));
        assert_eq!(message(Major::File.id()), Some((true, "File accessibility")));
        assert_eq!(message(ERROR_CLASS_ID), None);
    }
}
