//! Process environment and installed software.

use crate::collect::Collector;
use buildenv_core::{BuildEnvError, Document, Value};

/// Environment variables of the collecting process.
///
/// Stored as a list of single-key documents, sorted by name.
pub struct EnvironmentCollector;

impl Collector for EnvironmentCollector {
    fn name(&self) -> &str {
        "environment_parameter"
    }

    fn collect(&mut self) -> Result<Value, BuildEnvError> {
        let mut vars: Vec<(String, String)> = std::env::vars_os()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    v.to_string_lossy().into_owned(),
                )
            })
            .collect();
        vars.sort();

        tracing::debug!(count = vars.len(), "environment variables");
        Ok(Value::from(
            vars.into_iter()
                .map(|(k, v)| [(k, v)].into_iter().collect::<Document>())
                .collect::<Vec<_>>(),
        ))
    }
}

/// Installed software names.
///
/// Only Windows exposes a product list (through `wmic`); other platforms
/// report an empty list.
pub struct SoftwareCollector;

impl Collector for SoftwareCollector {
    fn name(&self) -> &str {
        "software"
    }

    fn collect(&mut self) -> Result<Value, BuildEnvError> {
        let names = installed_software()?;
        tracing::debug!(count = names.len(), "installed software");
        Ok(Value::from(names))
    }
}

#[cfg(windows)]
fn installed_software() -> Result<Vec<String>, BuildEnvError> {
    let output = std::process::Command::new("wmic")
        .args(["product", "get", "name"])
        .output()
        .map_err(|e| BuildEnvError::IoError(format!("wmic: {}", e)))?;
    Ok(parse_product_names(&String::from_utf8_lossy(&output.stdout)))
}

#[cfg(not(windows))]
fn installed_software() -> Result<Vec<String>, BuildEnvError> {
    Ok(Vec::new())
}

/// Parse `wmic product get name` output: one name per line after a
/// `Name` header, blank lines ignored.
pub fn parse_product_names(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != "Name")
        .map(str::to_string)
        .collect()
}
