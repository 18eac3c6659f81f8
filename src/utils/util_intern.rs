use super::util::Result;

pub fn readable_size(bytes: u64) -> (f64, &'static str) {
    let units: [(f64, &'static str); 5] = [
        (1.0, "B"),
        (1024.0, "KiB"),
        (1024.0 * 1024.0, "MiB"),
        (1024.0 * 1024.0 * 1024.0, "GiB"),
        (1024.0 * 1024.0 * 1024.0 * 1024.0, "TiB"),
    ];

    let value = bytes as f64;
    let mut unit = units[0];
    for next in units.iter().skip(1) {
        if value >= next.0 {
            unit = *next;
        } else {
            break;
        }
    }

    (value / unit.0, unit.1)
}

#[cfg(target_os = "macos")]
pub fn peak_memory_usage() -> Result<u64> {
    unsafe {
        let mut rusage: libc::rusage = std::mem::zeroed();
        let retval = libc::getrusage(libc::RUSAGE_SELF, &mut rusage as *mut _);
        match retval {
            0 => Ok(rusage.ru_maxrss as u64),
            _ => Err(crate::pgx_error!("libc::getrusage call failed")),
        }
    }
}

#[cfg(not(target_os = "macos"))]
pub fn peak_memory_usage() -> Result<u64> {
    Err(crate::pgx_error!(
        "No peak_memory_usage implementation for this OS"
    ))
}
