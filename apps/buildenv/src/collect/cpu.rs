use crate::collect::Collector;
use buildenv_core::{BuildEnvError, Document, Value};
use sysinfo::{MINIMUM_CPU_UPDATE_INTERVAL, System};

pub struct CpuCollector {
    system: System,
}

impl CpuCollector {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        Self { system }
    }
}

impl Default for CpuCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for CpuCollector {
    fn name(&self) -> &str {
        "cpu"
    }

    fn collect(&mut self) -> Result<Value, BuildEnvError> {
        // Usage is a delta between two refreshes.
        std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
        self.system.refresh_cpu_all();

        let cpus = self.system.cpus();
        let mut info = Document::new();
        info.insert("cores_physical", self.system.physical_core_count());
        info.insert("cores_total", cpus.len());
        info.insert("processor_raw", cpus.first().map(|cpu| cpu.brand().to_string()));
        info.insert(
            "frequency_current",
            cpus.first().map(|cpu| format!("{}Mhz", cpu.frequency())),
        );

        for (i, cpu) in cpus.iter().enumerate() {
            tracing::debug!(core = i, usage = cpu.cpu_usage(), "cpu usage");
            info.insert(format!("core_usage_{i}"), format!("{:.1}%", cpu.cpu_usage()));
        }
        info.insert(
            "core_usage_all",
            format!("{:.1}%", self.system.global_cpu_usage()),
        );

        Ok(Value::Document(info))
    }
}
