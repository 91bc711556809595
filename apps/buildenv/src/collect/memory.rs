use crate::collect::{Collector, format_percent, format_size};
use buildenv_core::{BuildEnvError, Document, Value};
use sysinfo::System;

pub struct MemoryCollector {
    system: System,
}

impl MemoryCollector {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for MemoryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for MemoryCollector {
    fn name(&self) -> &str {
        "memory"
    }

    fn collect(&mut self) -> Result<Value, BuildEnvError> {
        self.system.refresh_memory();

        let total = self.system.total_memory();
        let used = self.system.used_memory();
        let available = self.system.available_memory();

        let mut info = Document::new();
        info.insert("total", format_size(total));
        info.insert("available", format_size(available));
        info.insert("used", format_size(used));
        info.insert("percentage", format_percent(used, total));
        info.insert("total_bytes", total);

        // Swap
        let swap_total = self.system.total_swap();
        let swap_used = self.system.used_swap();
        let mut swap = Document::new();
        swap.insert("total", format_size(swap_total));
        swap.insert("free", format_size(self.system.free_swap()));
        swap.insert("used", format_size(swap_used));
        swap.insert("percentage", format_percent(swap_used, swap_total));
        info.insert("swap", swap);

        tracing::debug!(total, used, available, swap_total, swap_used, "memory");
        Ok(Value::Document(info))
    }
}
