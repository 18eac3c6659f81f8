use crate::error::PgxResult;
use log;
use std::{
    ffi::OsString,
    fmt::Display,
    path::{Path, PathBuf},
    sync::Once,
};

pub type Result<T> = PgxResult<T>;

#[allow(unused)]
static INIT_LOG: Once = Once::new();

#[allow(unused)]
pub fn init_logger() {
    INIT_LOG.call_once(|| {
        env_logger::builder()
            .filter_level(log::LevelFilter::Trace)
            .is_test(true)
            .init();
    });
}

pub fn handle_error_and_exit(err: impl Display) -> ! {
    log::error!("{err}");
    std::process::exit(1);
}

/// Appends `.ext` to the full file name, e.g. `a.vcf.gz` -> `a.vcf.gz.tbi`.
pub fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Drops the last two extensions, e.g. `x.pgx_regions.vcf.gz` -> `x.pgx_regions`.
pub fn strip_two_extensions(path: &Path) -> PathBuf {
    let once = path.with_extension("");
    once.with_extension("")
}

/// Builds `<stem>.<suffix>.vcf.gz` next to `path`, where stem is `path` minus `.vcf.gz`.
pub fn derive_vcf_path(path: &Path, suffix: &str) -> PathBuf {
    append_extension(&strip_two_extensions(path), &format!("{suffix}.vcf.gz"))
}
