//! Command implementations
//!
//! Each command works on whole snapshot files: load, transform, save. The
//! formatting functions return strings so they can be tested without a
//! terminal.

use anyhow::{Context, Result};
use meridian_core::{serialization, JoinSemilattice, NamespaceId, NodeId};
use meridian_metadata::{FieldUpdate, NameLookup, NamespaceDirectory, NamespaceField, NamespaceInit};
use serde_json::json;
use std::io::Write;
use std::path::Path;

/// Read a snapshot file.
pub fn load(path: &Path) -> Result<NamespaceDirectory> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    serialization::from_json(&text).with_context(|| format!("parsing snapshot {}", path.display()))
}

/// Read a snapshot file, or start empty if there is none.
pub fn load_or_empty(path: &Path) -> Result<NamespaceDirectory> {
    if path.exists() {
        load(path)
    } else {
        tracing::info!(path = %path.display(), "Starting new snapshot");
        Ok(NamespaceDirectory::new())
    }
}

/// Write a snapshot file.
///
/// The snapshot goes to a temporary file beside `path` that is then renamed
/// over it, so readers see the old snapshot or the new one.
pub fn save(path: &Path, directory: &NamespaceDirectory) -> Result<()> {
    let text = serialization::to_json(directory)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;
    tmp.write_all(text.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .with_context(|| format!("writing snapshot {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("replacing snapshot {}", path.display()))?;
    Ok(())
}

/// Every namespace with its liveness and field versions, as JSON.
pub fn show(directory: &NamespaceDirectory) -> Result<String> {
    let namespaces = directory
        .iter()
        .map(|(id, entry)| -> Result<serde_json::Value> {
            let status = match entry.is_deleted() {
                Ok(false) => "present",
                Ok(true) => "deleted",
                Err(_) => "conflicted",
            };
            Ok(json!({
                "id": id,
                "status": status,
                "fields": entry.value().field_views()?,
            }))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(serde_json::to_string_pretty(&namespaces)?)
}

pub fn lookup(directory: &NamespaceDirectory, name: &str) -> String {
    match directory.get_namespace_by_name(name) {
        NameLookup::Found(id, _) => id.to_string(),
        NameLookup::NotFound => format!("no namespace named `{name}`"),
        NameLookup::Unknown => {
            format!("cannot resolve `{name}`: unresolved conflicts or duplicate names (see `meridian conflicts`)")
        }
    }
}

pub fn conflicts(directory: &NamespaceDirectory) -> String {
    let issues = directory.conflicts();
    if issues.is_empty() {
        return "no conflicts".to_string();
    }
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn merge(a: &NamespaceDirectory, b: &NamespaceDirectory) -> NamespaceDirectory {
    a.join(b)
}

pub fn create(
    directory: &NamespaceDirectory,
    node: NodeId,
    name: &str,
    port: u16,
    primary_key: &str,
) -> (NamespaceId, NamespaceDirectory) {
    let init = NamespaceInit::new(name)
        .with_port(port)
        .with_primary_key(primary_key);
    directory.create_namespace(node, init)
}

/// Write `field` of a live namespace from a JSON literal.
pub fn set(
    directory: &NamespaceDirectory,
    node: NodeId,
    id: NamespaceId,
    field: &str,
    value: &str,
) -> Result<NamespaceDirectory> {
    let field: NamespaceField = field.parse()?;
    let value: serde_json::Value =
        serde_json::from_str(value).with_context(|| format!("`{value}` is not valid JSON"))?;
    let update = FieldUpdate::from_json(field, value)?;
    Ok(directory.update_namespace(id, node, update)?)
}
