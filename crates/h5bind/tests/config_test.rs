//! Process-wide configuration. Kept in its own test binary since it changes
//! defaults every other test relies on.

mod common;

use std::env;

use h5bind::config::{
    default_close_degree, ENV_CLOSE_DEGREE, ENV_ERROR_PRINT, ENV_LIBRARY_PATH,
};
use h5bind::{CloseDegree, Config, ErrorKind, File};

#[test]
fn test_config_from_env_and_apply() {
    if !common::ensure_hdf5_init() {
        return;
    }
    let saved_lib = env::var_os(ENV_LIBRARY_PATH);
    env::remove_var(ENV_LIBRARY_PATH);
    env::set_var(ENV_CLOSE_DEGREE, "bogus");
    assert_eq!(Config::from_env().unwrap_err().kind(), ErrorKind::Unsupported);

    env::set_var(ENV_CLOSE_DEGREE, "Semi");
    env::set_var(ENV_ERROR_PRINT, "no");
    let config = Config::from_env().unwrap();
    assert_eq!(
        config,
        Config { library_path: None, close_degree: CloseDegree::Semi, error_auto_print: false }
    );
    env::remove_var(ENV_CLOSE_DEGREE);
    env::remove_var(ENV_ERROR_PRINT);
    if let Some(lib) = saved_lib {
        env::set_var(ENV_LIBRARY_PATH, lib);
    }

    assert_eq!(default_close_degree(), CloseDegree::Strong);
    config.apply().unwrap();
    assert_eq!(default_close_degree(), CloseDegree::Semi);

    let (_dir, path) = common::scratch("semi-default.h5");
    let file = File::create(&path).unwrap();
    assert_eq!(file.access_plist().unwrap().fclose_degree().unwrap(), CloseDegree::Semi);
    let group = file.create_group("g").unwrap();
    assert_eq!(file.close().unwrap_err().kind(), ErrorKind::IoFailure);
    drop(group);
    file.close().unwrap();

    Config::default().apply().unwrap();
    assert_eq!(default_close_degree(), CloseDegree::Strong);
}
