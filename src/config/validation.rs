//! Configuration validation functions.

use super::Config;

/// Reject settings the relay cannot start with.
///
/// [`super::load`] only warns about these; `main` calls this again and
/// exits non-zero on error.
pub fn validate_config(config: &Config) -> anyhow::Result<()> {
    if config.server.worker_threads == 0 {
        anyhow::bail!(
            "server.worker_threads must be at least 1 \
             (set TETRIS_RELAY__SERVER__WORKER_THREADS)"
        );
    }

    if config.server.recv_timeout_ms == 0 {
        anyhow::bail!(
            "server.recv_timeout_ms must be greater than 0; \
             a zero timeout would spin the receive loop"
        );
    }

    config.bind_addr()?;

    if config.logging.enable_file_logging {
        if config.logging.dir.trim().is_empty() {
            anyhow::bail!("logging.dir must not be empty when file logging is enabled");
        }
        if config.logging.filename.trim().is_empty() {
            anyhow::bail!("logging.filename must not be empty when file logging is enabled");
        }
    }

    if config.port == 0 {
        eprintln!("WARNING: port is 0; the relay will bind an ephemeral port clients cannot guess");
    }

    Ok(())
}
