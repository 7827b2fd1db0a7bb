use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::reference::builtin::builtin_dataset;
use crate::reference::schema::ReferenceData;
use crate::reference::Catalog;

/// Loads reference tables from a JSON or TOML file, or the built-in set
/// when no path is given. Validation failures surface as
/// [`crate::reference::ConfigurationError`] in the error chain.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let data = match path {
        Some(path) => read_reference_file(path)?,
        None => builtin_dataset(),
    };
    let source = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "builtin".to_string());
    let catalog = Catalog::new(data)
        .with_context(|| format!("reference data from {source} is invalid"))?;
    info!(
        source = %source,
        version = catalog.version(),
        fingerprint = &catalog.fingerprint()[..12],
        "reference catalog loaded"
    );
    Ok(catalog)
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false)
}

fn read_reference_file(path: &Path) -> Result<ReferenceData> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading reference data: {}", path.display()))?;
    let data = if is_toml(path) {
        toml::from_str(&raw)
            .with_context(|| format!("failed parsing TOML reference data: {}", path.display()))?
    } else {
        serde_json::from_str(&raw)
            .with_context(|| format!("failed parsing JSON reference data: {}", path.display()))?
    };
    debug!(path = %path.display(), bytes = raw.len(), "reference file read");
    Ok(data)
}

/// Writes the built-in tables as a starting point for a custom reference
/// file: TOML for a `.toml` path, pretty JSON otherwise.
pub fn export_builtin(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let data = builtin_dataset();
    let rendered = if is_toml(path) {
        toml::to_string_pretty(&data).context("failed serializing reference data as TOML")?
    } else {
        serde_json::to_string_pretty(&data)?
    };
    fs::write(path, rendered)
        .with_context(|| format!("failed writing reference data: {}", path.display()))?;
    info!(path = %path.display(), "built-in reference data exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ConfigurationError;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("pricing-navigator-{}-{name}", std::process::id()))
    }

    #[test]
    fn exported_builtin_reloads_with_same_fingerprint() {
        let builtin = load_catalog(None).unwrap();
        for name in ["reference.json", "reference.toml"] {
            let path = temp_path(name);
            export_builtin(&path).unwrap();
            let loaded = load_catalog(Some(&path)).unwrap();
            assert_eq!(loaded.fingerprint(), builtin.fingerprint(), "{name}");
            let _ = fs::remove_file(path);
        }
    }

    #[test]
    fn toml_export_is_toml() {
        let path = temp_path("format.toml");
        export_builtin(&path).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(!raw.trim_start().starts_with('{'));
        assert!(raw.contains("[[archetypes]]"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn invalid_file_reports_configuration_error() {
        let mut data = builtin_dataset();
        data.criteria[0].weight = 0.9;
        let path = temp_path("broken.json");
        fs::write(&path, serde_json::to_string(&data).unwrap()).unwrap();
        let err = load_catalog(Some(&path)).unwrap_err();
        assert!(err.downcast_ref::<ConfigurationError>().is_some());
        let _ = fs::remove_file(path);
    }
}
