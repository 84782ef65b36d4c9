use std::sync::{Mutex, OnceLock};

use tracing::debug;

use super::registry::Mc;

/// Optional process-wide registry. `Mc` itself carries no internal
/// synchronization; this wrapper is the thin, opt-in layer a caller reaches
/// for only if it actually wants one shared instance instead of owning its
/// own `Mc`.
static SINGLETON: OnceLock<Mutex<Option<Mc>>> = OnceLock::new();

fn cell() -> &'static Mutex<Option<Mc>> {
    SINGLETON.get_or_init(|| Mutex::new(None))
}

/// Lazily create the singleton if it does not exist yet. Safe to call more
/// than once; later calls are no-ops.
pub fn global_init() {
    let mut guard = cell().lock().unwrap_or_else(|e| e.into_inner());
    if guard.is_none() {
        debug!("initializing global Mc registry singleton");
        *guard = Some(Mc::new());
    }
}

/// Borrow the singleton's mutex. The inner `Option` is `None` until
/// [`global_init`] has been called at least once.
pub fn global() -> &'static Mutex<Option<Mc>> {
    cell()
}

/// Drop the singleton, if any.
pub fn global_shutdown() {
    let mut guard = cell().lock().unwrap_or_else(|e| e.into_inner());
    if guard.is_some() {
        debug!("shutting down global Mc registry singleton");
    }
    *guard = None;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_then_shutdown_round_trips() {
        global_shutdown();
        assert!(global().lock().unwrap().is_none());

        global_init();
        assert!(global().lock().unwrap().is_some());

        global_init();
        assert!(global().lock().unwrap().is_some());

        global_shutdown();
        assert!(global().lock().unwrap().is_none());
    }
}
