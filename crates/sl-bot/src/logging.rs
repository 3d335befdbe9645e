use std::fs::OpenOptions;
use std::path::Path;

/// Initialize `env_logger`, filtered by `RUST_LOG`.
///
/// With a log file, records are appended to it instead of stderr; `serve`
/// owns stdout for the wire protocol either way.
pub fn init_logging(log_file: Option<&Path>) -> Result<(), String> {
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(path) = log_file {
        let output = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| format!("failed to open log file {}: {e}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(output)));
    }
    builder
        .try_init()
        .map_err(|e| format!("failed to initialize logging: {e}"))
}
