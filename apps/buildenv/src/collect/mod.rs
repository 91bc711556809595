//! Producers of build-environment documents.
//!
//! Each [`Collector`] gathers one section of the system information
//! document (host, CPU, memory, disk, network, environment, software) and
//! returns it as a generic [`Document`]. The workspace walker is separate
//! because it depends on the working directory rather than the host.

pub mod cpu;
pub mod disk;
pub mod environment;
pub mod host;
pub mod memory;
pub mod network;
pub mod size;
pub mod workspace;

use buildenv_core::{BuildEnvError, DateTime, Document, Value};

pub use size::{format_percent, format_size};
pub use workspace::{DEFAULT_FILTER, WorkspaceWalker};

/// A host information collector.
///
/// Collectors hold their `sysinfo` handles so a long-lived caller can
/// refresh instead of rebuilding them.
pub trait Collector {
    /// Section name; the key the section is stored under.
    fn name(&self) -> &str;

    /// Gather the section.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying system query fails.
    fn collect(&mut self) -> Result<Value, BuildEnvError>;
}

/// Host information collectors in document order.
pub fn default_collectors() -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(cpu::CpuCollector::new()),
        Box::new(memory::MemoryCollector::new()),
        Box::new(disk::DiskCollector::new()),
        Box::new(network::NetworkCollector::new()),
        Box::new(environment::EnvironmentCollector),
        Box::new(environment::SoftwareCollector),
    ]
}

/// Build the system information section.
///
/// Host identity fields sit at the top level; every collector adds one
/// nested section under its name.
pub fn system_information() -> Result<Document, BuildEnvError> {
    tracing::info!("Collecting system information");
    let mut info = host::host_information();

    for mut collector in default_collectors() {
        let section = collector.collect()?;
        tracing::debug!(section = collector.name(), "collected");
        info.insert(collector.name(), section);
    }
    Ok(info)
}

/// What to put into a collected document.
#[derive(Debug, Clone, Default)]
pub struct CollectRequest {
    /// Gather host information.
    pub system_information: bool,
    /// List the workspace, if set.
    pub workspace: Option<WorkspaceWalker>,
}

/// Assemble the top-level build environment document.
///
/// Both sections are always present; a section that was not requested is
/// an empty document.
pub fn build_environment(request: &CollectRequest) -> Result<Document, BuildEnvError> {
    let system = if request.system_information {
        system_information()?
    } else {
        Document::new()
    };

    let workspace = match &request.workspace {
        Some(walker) => walker.walk()?,
        None => Document::new(),
    };

    let mut doc = Document::new();
    doc.insert("system_information", system);
    doc.insert("workspace_information", workspace);
    doc.insert("collected_at", DateTime::now());
    Ok(doc)
}
