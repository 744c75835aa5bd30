//! Error handling.
//!
//! Every fallible native return goes through [`h5check`]. A failure code drains the
//! calling thread's HDF5 error stack into an [`ErrorStack`] and classifies it into a
//! closed [`ErrorKind`].

use std::fmt;
use std::panic::Location;
use std::ptr;

use crate::globals::*;
use crate::sys::{
    c_char, c_uint, c_void, herr_t, hid_t, H5E_error2_t, H5Eclose_stack, H5Eget_current_stack,
    H5Eget_msg, H5Ewalk2, H5E_WALK_DOWNWARD,
};
use crate::util::{get_h5_str, string_from_cstr};

/// The closed set of failure categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidHandle,
    NotFound,
    AlreadyExists,
    TypeMismatch,
    UnsupportedType,
    StringTooLong,
    IoFailure,
    Unsupported,
    Internal,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 9] = [
        ErrorKind::InvalidHandle,
        ErrorKind::NotFound,
        ErrorKind::AlreadyExists,
        ErrorKind::TypeMismatch,
        ErrorKind::UnsupportedType,
        ErrorKind::StringTooLong,
        ErrorKind::IoFailure,
        ErrorKind::Unsupported,
        ErrorKind::Internal,
    ];

    /// Stable integer code, used by the C API.
    pub const fn code(self) -> i32 {
        match self {
            ErrorKind::InvalidHandle => 1,
            ErrorKind::NotFound => 2,
            ErrorKind::AlreadyExists => 3,
            ErrorKind::TypeMismatch => 4,
            ErrorKind::UnsupportedType => 5,
            ErrorKind::StringTooLong => 6,
            ErrorKind::IoFailure => 7,
            ErrorKind::Unsupported => 8,
            ErrorKind::Internal => 9,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    pub const fn name(self) -> &'static str {
        match self {
            ErrorKind::InvalidHandle => "InvalidHandle",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::AlreadyExists => "AlreadyExists",
            ErrorKind::TypeMismatch => "TypeMismatch",
            ErrorKind::UnsupportedType => "UnsupportedType",
            ErrorKind::StringTooLong => "StringTooLong",
            ErrorKind::IoFailure => "IoFailure",
            ErrorKind::Unsupported => "Unsupported",
            ErrorKind::Internal => "Internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of a captured native error stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorFrame {
    pub func: String,
    pub file: String,
    pub line: u32,
    pub desc: String,
    pub major: String,
    pub minor: String,
}

impl fmt::Display for ErrorFrame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}(): {} ({}:{}; major: {}; minor: {})",
            self.func, self.desc, self.file, self.line, self.major, self.minor
        )
    }
}

/// A captured error stack, outermost frame first.
///
/// Frame 0 is the API function the binding called; the last frame is where the
/// failure was first detected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorStack {
    frames: Vec<ErrorFrame>,
}

impl ErrorStack {
    pub fn frames(&self) -> &[ErrorFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn outermost(&self) -> Option<&ErrorFrame> {
        self.frames.first()
    }

    pub fn innermost(&self) -> Option<&ErrorFrame> {
        self.frames.last()
    }

    /// Description of the innermost frame.
    pub fn description(&self) -> &str {
        self.innermost().map_or("", |frame| frame.desc.as_str())
    }
}

impl fmt::Display for ErrorStack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.description())?;
        for (i, frame) in self.frames.iter().enumerate() {
            write!(f, "\n  #{i:03}: {frame}")?;
        }
        Ok(())
    }
}

/// Failure to open a shared library or resolve one of its symbols.
#[derive(thiserror::Error, Clone, Debug)]
#[error("{0}")]
pub struct LoadError(pub String);

#[derive(thiserror::Error, Clone, Debug)]
pub enum Error {
    /// A native call failed; `stack` holds the drained error stack.
    #[error("{kind}: {stack}")]
    Native { kind: ErrorKind, stack: ErrorStack },

    /// A precondition checked by the binding itself.
    #[error("{kind}: {message}")]
    Binding { kind: ErrorKind, message: String },

    #[error("failed to load HDF5 library from {path}: {source}")]
    LibraryLoad { path: String, source: LoadError },

    #[error("HDF5 library already initialized from {0}")]
    AlreadyInitialized(String),
}

pub type Result<T, E = Error> = ::std::result::Result<T, E>;

impl Error {
    pub fn binding(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error::Binding { kind, message: message.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Native { kind, .. } | Error::Binding { kind, .. } => *kind,
            Error::LibraryLoad { .. } | Error::AlreadyInitialized(_) => ErrorKind::Internal,
        }
    }

    /// Native frames, if the error came from the library.
    pub fn stack(&self) -> Option<&ErrorStack> {
        match self {
            Error::Native { stack, .. } => Some(stack),
            _ => None,
        }
    }

    /// Drain the calling thread's error stack.
    ///
    /// Must run under the global lock, right after the failing call.
    fn capture(at: &'static Location<'static>) -> Self {
        let raw = drain_stack();
        let (kind, stack) = if raw.is_empty() {
            let frame = ErrorFrame {
                func: "h5bind".into(),
                file: at.file().into(),
                line: at.line(),
                desc: "native call failed without an error record".into(),
                major: String::new(),
                minor: String::new(),
            };
            (ErrorKind::Internal, ErrorStack { frames: vec![frame] })
        } else {
            let kind = classify(&raw);
            let frames = raw.into_iter().map(|r| r.frame).collect();
            (kind, ErrorStack { frames })
        };
        tracing::debug!(kind = %kind, frames = stack.len(), "captured native error");
        Error::Native { kind, stack }
    }
}

struct RawFrame {
    frame: ErrorFrame,
    major: hid_t,
    minor: hid_t,
}

fn message_text(msg_id: hid_t) -> String {
    unsafe { get_h5_str(|buf: *mut c_char, size| H5Eget_msg(msg_id, ptr::null_mut(), buf, size)) }
        .unwrap_or_default()
}

unsafe extern "C" fn collect_frame(
    _n: c_uint, err_desc: *const H5E_error2_t, client_data: *mut c_void,
) -> herr_t {
    let frames = unsafe { &mut *client_data.cast::<Vec<RawFrame>>() };
    if let Some(err) = unsafe { err_desc.as_ref() } {
        frames.push(RawFrame {
            frame: ErrorFrame {
                func: unsafe { string_from_cstr(err.func_name) },
                file: unsafe { string_from_cstr(err.file_name) },
                line: err.line,
                desc: unsafe { string_from_cstr(err.desc) },
                major: message_text(err.maj_num),
                minor: message_text(err.min_num),
            },
            major: err.maj_num,
            minor: err.min_num,
        });
    }
    0
}

/// Copy, clear and walk the current stack outermost-first.
fn drain_stack() -> Vec<RawFrame> {
    let mut frames: Vec<RawFrame> = Vec::new();
    unsafe {
        let stack_id = H5Eget_current_stack();
        if stack_id < 0 {
            return frames;
        }
        H5Ewalk2(
            stack_id,
            H5E_WALK_DOWNWARD,
            Some(collect_frame),
            (&mut frames as *mut Vec<RawFrame>).cast(),
        );
        H5Eclose_stack(stack_id);
    }
    frames
}

fn minor_kind(major: hid_t, minor: hid_t) -> Option<ErrorKind> {
    let is = |ids: &[hid_t]| ids.contains(&minor);
    if is(&[H5E_NOTFOUND()]) {
        Some(ErrorKind::NotFound)
    } else if is(&[H5E_EXISTS(), H5E_ALREADYEXISTS(), H5E_FILEEXISTS()]) {
        Some(ErrorKind::AlreadyExists)
    } else if is(&[H5E_BADID()]) || (is(&[H5E_CANTGET()]) && major == H5E_ID()) {
        Some(ErrorKind::InvalidHandle)
    } else if is(&[H5E_BADTYPE(), H5E_CANTCONVERT()]) {
        Some(ErrorKind::TypeMismatch)
    } else if is(&[H5E_UNSUPPORTED(), H5E_BADRANGE(), H5E_BADVALUE()]) {
        Some(ErrorKind::Unsupported)
    } else if is(&[
        H5E_CANTOPENFILE(),
        H5E_READERROR(),
        H5E_WRITEERROR(),
        H5E_SEEKERROR(),
        H5E_CANTCLOSEFILE(),
        H5E_FILEOPEN(),
        H5E_TRUNCATED(),
        H5E_NOTHDF5(),
    ]) {
        Some(ErrorKind::IoFailure)
    } else {
        None
    }
}

fn major_kind(major: hid_t) -> Option<ErrorKind> {
    [H5E_IO(), H5E_FILE(), H5E_VFL()]
        .contains(&major)
        .then_some(ErrorKind::IoFailure)
}

/// Innermost-first: the first specific minor code wins, then the first major fallback.
fn classify(frames: &[RawFrame]) -> ErrorKind {
    frames
        .iter()
        .rev()
        .find_map(|f| minor_kind(f.major, f.minor))
        .or_else(|| frames.iter().rev().find_map(|f| major_kind(f.major)))
        .unwrap_or(ErrorKind::Internal)
}

/// Native return types whose negative (or null) value signals failure.
pub trait H5ErrorCode: Copy {
    fn is_err_code(value: Self) -> bool;
}

impl H5ErrorCode for hid_t {
    fn is_err_code(value: Self) -> bool {
        value < 0
    }
}

impl H5ErrorCode for herr_t {
    fn is_err_code(value: Self) -> bool {
        value < 0
    }
}

impl H5ErrorCode for isize {
    fn is_err_code(value: Self) -> bool {
        value < 0
    }
}

impl<T> H5ErrorCode for *mut T {
    fn is_err_code(value: Self) -> bool {
        value.is_null()
    }
}

/// Turn a native return value into a `Result`, capturing the error stack on failure.
#[track_caller]
pub fn h5check<T: H5ErrorCode>(value: T) -> Result<T> {
    if H5ErrorCode::is_err_code(value) {
        Err(Error::capture(Location::caller()))
    } else {
        Ok(value)
    }
}

#[cfg(all(test, feature = "emulated"))]
mod tests {
    use super::*;
    use crate::sys::{H5Eget_num, H5Iget_ref, H5E_DEFAULT};

    #[test]
    fn test_error_kind_codes_round_trip() {
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ErrorKind::from_code(0), None);
        assert_eq!(ErrorKind::IoFailure.to_string(), "IoFailure");
    }

    #[test]
    fn test_h5check_passes_success() {
        assert_eq!(h5check(3_i64).unwrap(), 3);
        assert_eq!(h5check(0_i32).unwrap(), 0);
    }

    #[test]
    fn test_bad_id_classifies_as_invalid_handle() {
        let err = h5call!(unsafe { H5Iget_ref(0x7fff_ffff) }).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidHandle);
        let stack = err.stack().unwrap();
        assert!(!stack.is_empty());
        assert_eq!(stack.outermost().unwrap().func, "H5Iget_ref");
        assert!(!stack.description().is_empty());
    }

    #[test]
    fn test_stack_is_drained() {
        let remaining = h5lock!({
            let _ = h5check(H5Iget_ref(-5));
            H5Eget_num(H5E_DEFAULT)
        });
        assert_eq!(remaining, 0);
    }

    #[test]
    fn test_display_lists_frames() {
        let err = h5call!(unsafe { H5Iget_ref(0x7fff_ffff) }).unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("InvalidHandle: "));
        assert!(text.contains("#000: H5Iget_ref()"));
    }

    #[test]
    fn test_binding_error_has_no_stack() {
        let err = Error::binding(ErrorKind::NotFound, "no such group: 'a'");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.stack().is_none());
        assert_eq!(err.to_string(), "NotFound: no such group: 'a'");
    }
}
