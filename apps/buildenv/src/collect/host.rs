//! Host identity: operating system, machine, primary address, boot time.

use buildenv_core::{DateTime, Document, Value};
use crate::collect::network::primary_address;
use sysinfo::{Networks, System};

/// Operating system and machine identity.
///
/// Fields the platform cannot report are stored as null.
pub fn host_information() -> Document {
    let mut info = Document::new();
    info.insert("system", System::name());
    info.insert("node_name", System::host_name());
    info.insert("release", System::os_version());
    info.insert("version", System::long_os_version());
    info.insert("kernel_version", System::kernel_version());
    info.insert("machine", Value::from(System::cpu_arch()));

    let primary = primary_address(&Networks::new_with_refreshed_list());
    info.insert("ip_address", primary.as_ref().map(|(addr, _)| addr.to_string()));
    info.insert("mac_address", primary.map(|(_, mac)| mac));

    let boot_secs = System::boot_time();
    info.insert("boot_time", boot_datetime(boot_secs));
    info.insert("boot_time_sec", boot_secs);
    info.insert("uptime_sec", System::uptime());

    tracing::debug!(
        system = ?System::name(),
        node = ?System::host_name(),
        boot_secs,
        "host information"
    );
    info
}

/// Boot time in seconds since the epoch as a store date.
fn boot_datetime(secs: u64) -> DateTime {
    DateTime::from_millis(i64::try_from(secs.saturating_mul(1000)).unwrap_or(i64::MAX))
}
