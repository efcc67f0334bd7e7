//! Process-wide logger bootstrap.
//!
//! Library code only talks to the `log` facade. Binaries call
//! [`init_logging`] once at startup to route records to stderr.

use std::sync::{Mutex, PoisonError};

use flexi_logger::{FlexiLoggerError, Logger, LoggerHandle, WriteMode};

static LOGGER: Mutex<Option<LoggerHandle>> = Mutex::new(None);

/// Start logging to stderr at `level` (any `log` filter string, e.g.
/// `"info"` or `"kbrpc::rpc=debug"`).
///
/// Later calls are no-ops and keep the first level.
pub fn init_logging(level: &str) -> Result<(), FlexiLoggerError> {
    let mut slot = LOGGER.lock().unwrap_or_else(PoisonError::into_inner);
    if slot.is_some() {
        return Ok(());
    }
    let handle = Logger::try_with_str(level)?
        .log_to_stderr()
        .write_mode(WriteMode::Direct)
        .format(flexi_logger::detailed_format)
        .start()?;
    *slot = Some(handle);
    drop(slot);
    log::debug!("logging initialised at '{}'", level);
    Ok(())
}
