use crate::collect::{Collector, format_percent, format_size};
use buildenv_core::{BuildEnvError, Document, Value};
use sysinfo::Disks;

pub struct DiskCollector {
    disks: Disks,
}

impl DiskCollector {
    pub fn new() -> Self {
        Self {
            disks: Disks::new_with_refreshed_list(),
        }
    }
}

impl Default for DiskCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for DiskCollector {
    fn name(&self) -> &str {
        "disk"
    }

    fn collect(&mut self) -> Result<Value, BuildEnvError> {
        self.disks.refresh();

        let mut partitions = Vec::new();
        for disk in self.disks.iter() {
            let total = disk.total_space();
            let free = disk.available_space();
            let used = total.saturating_sub(free);

            let mut partition = Document::new();
            partition.insert("device", disk.name().to_string_lossy().to_string());
            partition.insert("mountpoint", disk.mount_point().to_string_lossy().to_string());
            partition.insert("fstype", disk.file_system().to_string_lossy().to_string());
            partition.insert("removable", disk.is_removable());
            partition.insert("total_size", format_size(total));
            partition.insert("used", format_size(used));
            partition.insert("free", format_size(free));
            partition.insert("percentage", format_percent(used, total));

            tracing::debug!(mount = %disk.mount_point().display(), total, used, "disk");
            partitions.push(partition);
        }

        let mut info = Document::new();
        info.insert("partitions", partitions);
        Ok(Value::Document(info))
    }
}
