use std::fs;
use std::time::Duration;
use tracing::{debug, info};

/// Capability to ask whether a process with an exact name is running.
///
/// Polling against this table is the only session-boundary signal available:
/// the launcher re-execs into a differently named client process, so the
/// launcher's own exit means nothing.
pub trait ProcessTable: Send + Sync {
    fn exists(&self, name: &str) -> bool;
}

/// `ProcessTable` over `/proc/<pid>/comm`.
///
/// Comm names are truncated by the kernel to 15 bytes, which is why companion
/// process names are matched against their truncated forms.
#[derive(Debug, Default)]
pub struct ProcProcessTable;

impl ProcessTable for ProcProcessTable {
    fn exists(&self, name: &str) -> bool {
        let Ok(entries) = fs::read_dir("/proc") else {
            return false;
        };
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            if !file_name.to_string_lossy().bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            if let Ok(comm) = fs::read_to_string(entry.path().join("comm")) {
                if comm.trim_end() == name {
                    return true;
                }
            }
        }
        false
    }
}

/// Block until the named companion process appears, then until it disappears.
///
/// `cancelled` is checked on every poll tick; when it turns true the wait is
/// abandoned and `false` is returned. Returns `true` when the session was
/// observed to end on its own. Callers kill the prefix unconditionally
/// afterwards either way.
pub fn wait_for_companion(
    table: &dyn ProcessTable,
    name: &str,
    interval: Duration,
    cancelled: &dyn Fn() -> bool,
) -> bool {
    debug!("waiting for companion process '{name}' to appear");
    while !table.exists(name) {
        if cancelled() {
            info!("companion wait for '{name}' cancelled before start");
            return false;
        }
        std::thread::sleep(interval);
    }

    info!("companion process '{name}' observed, waiting for session to end");
    while table.exists(name) {
        if cancelled() {
            info!("companion wait for '{name}' cancelled mid-session");
            return false;
        }
        std::thread::sleep(interval);
    }

    info!("companion process '{name}' has exited");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedProcessTable;

    const TICK: Duration = Duration::from_millis(1);

    #[test]
    fn waits_for_start_then_end() {
        let table = ScriptedProcessTable::new([false, false, true, true, false]);
        assert!(wait_for_companion(&table, "RobloxStudioBet", TICK, &|| false));
    }

    #[test]
    fn companion_already_running_waits_for_end_only() {
        let table = ScriptedProcessTable::new([true, false]);
        assert!(wait_for_companion(&table, "RobloxStudioBet", TICK, &|| false));
    }

    #[test]
    fn cancellation_aborts_before_start() {
        let table = ScriptedProcessTable::new([false]);
        assert!(!wait_for_companion(&table, "RobloxStudioBet", TICK, &|| true));
    }

    #[test]
    fn cancellation_aborts_mid_session() {
        let table = ScriptedProcessTable::new([true]);
        assert!(!wait_for_companion(&table, "RobloxStudioBet", TICK, &|| true));
    }

    #[test]
    fn proc_table_does_not_match_absent_name() {
        // No process on the host can carry this name (comm is 15 bytes max,
        // so a longer name never matches anything).
        assert!(!ProcProcessTable.exists("solera-test-process-that-cannot-exist"));
    }
}
