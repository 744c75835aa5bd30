//! Process-wide configuration.
//!
//! Settings come from the environment (`H5BIND_HDF5_LIB`, `H5BIND_CLOSE_DEGREE`,
//! `H5BIND_ERROR_PRINT`) or are built by hand, and take effect with [`Config::apply`].

use std::env;
use std::path::PathBuf;
use std::ptr;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::Result;
use crate::hl::plist::CloseDegree;
use crate::sys::{
    c_uint, c_void, herr_t, hid_t, H5E_auto2_t, H5E_error2_t, H5Eget_msg, H5Eset_auto2, H5Ewalk2,
    H5E_WALK_DOWNWARD, H5E_DEFAULT,
};
use crate::util::{get_h5_str, string_from_cstr};

pub const ENV_LIBRARY_PATH: &str = "H5BIND_HDF5_LIB";
pub const ENV_CLOSE_DEGREE: &str = "H5BIND_CLOSE_DEGREE";
pub const ENV_ERROR_PRINT: &str = "H5BIND_ERROR_PRINT";

static DEFAULT_DEGREE: AtomicU8 = AtomicU8::new(CloseDegree::Strong as u8);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Shared library to load (runtime-loading only).
    pub library_path: Option<PathBuf>,
    /// Close degree of files opened without an explicit one.
    pub close_degree: CloseDegree,
    /// Keep the library's automatic error printing to stderr.
    pub error_auto_print: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { library_path: None, close_degree: CloseDegree::Strong, error_auto_print: false }
    }
}

impl Config {
    /// Read the configuration from the environment; unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = env::var_os(ENV_LIBRARY_PATH).filter(|p| !p.is_empty()) {
            config.library_path = Some(PathBuf::from(path));
        }
        if let Ok(degree) = env::var(ENV_CLOSE_DEGREE) {
            config.close_degree = degree.parse()?;
        }
        if let Ok(flag) = env::var(ENV_ERROR_PRINT) {
            config.error_auto_print = parse_flag(&flag)?;
        }
        Ok(config)
    }

    pub fn apply(&self) -> Result<()> {
        if let Some(path) = &self.library_path {
            let Some(path) = path.to_str() else {
                fail!(Unsupported, "library path is not valid UTF-8: {}", path.display());
            };
            crate::library::init(path)?;
        }
        DEFAULT_DEGREE.store(self.close_degree as u8, Ordering::Release);
        set_error_auto_print(self.error_auto_print)?;
        tracing::debug!(
            close_degree = ?self.close_degree,
            error_auto_print = self.error_auto_print,
            "applied configuration"
        );
        Ok(())
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => fail!(Unsupported, "invalid value for {ENV_ERROR_PRINT}: {other:?}"),
    }
}

/// Close degree used by files opened without an explicit one.
pub fn default_close_degree() -> CloseDegree {
    match DEFAULT_DEGREE.load(Ordering::Acquire) {
        x if x == CloseDegree::Weak as u8 => CloseDegree::Weak,
        x if x == CloseDegree::Semi as u8 => CloseDegree::Semi,
        _ => CloseDegree::Strong,
    }
}

unsafe extern "C" fn print_frame(
    n: c_uint, err_desc: *const H5E_error2_t, _client_data: *mut c_void,
) -> herr_t {
    let Some(err) = (unsafe { err_desc.as_ref() }) else {
        return 0;
    };
    let text = |id: hid_t| {
        unsafe { get_h5_str(|buf, size| H5Eget_msg(id, ptr::null_mut(), buf, size)) }
            .unwrap_or_default()
    };
    unsafe {
        eprintln!(
            "  #{n:03}: {} line {} in {}(): {}\n    major: {}\n    minor: {}",
            string_from_cstr(err.file_name),
            err.line,
            string_from_cstr(err.func_name),
            string_from_cstr(err.desc),
            text(err.maj_num),
            text(err.min_num),
        );
    }
    0
}

unsafe extern "C" fn print_error_stack(estack: hid_t, _client_data: *mut c_void) -> herr_t {
    eprintln!("HDF5-DIAG: Error detected in thread {:?}:", std::thread::current().id());
    unsafe { H5Ewalk2(estack, H5E_WALK_DOWNWARD, Some(print_frame), ptr::null_mut()) }
}

/// Print (or stop printing) every native error to stderr as it is raised.
///
/// Errors are returned as `Err` either way.
pub fn set_error_auto_print(enabled: bool) -> Result<()> {
    let func: H5E_auto2_t = if enabled { Some(print_error_stack) } else { None };
    h5call!(H5Eset_auto2(H5E_DEFAULT, func, ptr::null_mut())).map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1").unwrap());
        assert!(parse_flag(" TRUE ").unwrap());
        assert!(!parse_flag("off").unwrap());
        assert!(parse_flag("maybe").is_err());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.close_degree, CloseDegree::Strong);
        assert!(!config.error_auto_print);
        assert!(config.library_path.is_none());
    }
}
