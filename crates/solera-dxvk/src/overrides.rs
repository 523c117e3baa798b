use crate::DxvkError;
use solera_prefix::Prefix;
use std::fs;
use tracing::{debug, info};

/// DLL base names the patch set replaces, in both system directories.
pub const OVERRIDE_DLLS: [&str; 4] = ["d3d9", "d3d10core", "d3d11", "dxgi"];

/// Fixed enumeration order for removal: directory outer, DLL name inner.
const TARGET_DIRS: [&str; 2] = ["syswow64", "system32"];

/// Merge the override set into a `WINEDLLOVERRIDES` value.
///
/// Appends to an existing directive rather than replacing it, and never
/// duplicates an entry: a DLL the existing value already configures is left
/// as configured.
pub fn override_directive(existing: Option<&str>) -> String {
    let mut entries: Vec<String> = existing
        .into_iter()
        .flat_map(|s| s.split(';'))
        .filter(|part| !part.is_empty())
        .map(str::to_owned)
        .collect();

    for dll in OVERRIDE_DLLS {
        let configured = entries
            .iter()
            .any(|e| e.strip_prefix(dll).is_some_and(|rest| rest.starts_with('=')));
        if !configured {
            entries.push(format!("{dll}=n"));
        }
    }

    entries.join(";")
}

/// Mark the override DLLs as native for every process subsequently spawned in
/// the prefix.
///
/// Set once before any patched process is spawned and never unset; only DLL
/// removal from disk plus a prefix reboot reverts the behavior. An existing
/// directive, whether already recorded on the prefix or inherited from the
/// ambient environment, is merged into rather than replaced.
pub fn set_overrides(prefix: &Prefix) {
    info!("enabling DXVK DLL overrides");
    let existing = prefix
        .env_var("WINEDLLOVERRIDES")
        .or_else(|| std::env::var("WINEDLLOVERRIDES").ok());
    prefix.set_env_var("WINEDLLOVERRIDES", override_directive(existing.as_deref()));
}

/// Delete every overridden DLL from the prefix, then reboot it so Wine
/// restores the built-in implementations.
///
/// Deletion stops at the first error: earlier targets stay deleted, later
/// targets stay untouched, and no reboot is attempted.
pub fn remove(prefix: &Prefix) -> Result<(), DxvkError> {
    info!("removing all overridden DXVK DLLs");

    for dir in TARGET_DIRS {
        for dll in OVERRIDE_DLLS {
            let path = prefix
                .root()
                .join("drive_c")
                .join("windows")
                .join(dir)
                .join(format!("{dll}.dll"));

            debug!("removing DLL {}", path.display());
            fs::remove_file(&path)?;
        }
    }

    prefix.reboot()?;
    Ok(())
}
