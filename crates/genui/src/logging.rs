use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;

/// Location of the terminal UI log: `<cache_dir>/genui/terminal-ui.log`
pub fn terminal_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("genui")
        .join("terminal-ui.log")
}

pub fn setup_logging_to_stderr(verbose_level: u8) {
    setup_logging_with_file(verbose_level, None);
}

pub fn setup_logging_for_terminal_ui(verbose_level: u8) {
    // Log lines would otherwise interleave with the rendered conversation
    let log_file_path = terminal_log_path();
    if let Some(parent) = log_file_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    setup_logging_with_file(verbose_level, Some(log_file_path));
}

/// `RUST_LOG` wins; otherwise the `-v` count picks the filter
pub fn filter_directives(verbose_level: u8) -> &'static str {
    match verbose_level {
        0 => "warn,genui=info,agent_client=info",
        1 => "info,genui=debug,agent_client=debug",
        _ => "debug,genui=trace,agent_client=trace",
    }
}

fn setup_logging_with_file(verbose_level: u8, log_file: Option<PathBuf>) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        tracing_subscriber::EnvFilter::new(filter_directives(verbose_level))
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_level(true);

    let file = log_file.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!(
                    "Warning: Could not open log file {}: {e}, logging to stderr",
                    path.display()
                );
                None
            }
        }
    });

    match file {
        Some(file) => subscriber
            .with_ansi(false)
            .with_writer(move || -> Box<dyn io::Write + Send> {
                match file.try_clone() {
                    Ok(handle) => Box::new(handle),
                    Err(_) => Box::new(io::stderr()),
                }
            })
            .init(),
        None => subscriber.with_writer(io::stderr).init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_maps_to_filters() {
        assert_eq!(filter_directives(0), "warn,genui=info,agent_client=info");
        assert!(filter_directives(1).contains("genui=debug"));
        assert_eq!(filter_directives(2), filter_directives(7));
    }

    #[test]
    fn test_terminal_log_path() {
        let path = terminal_log_path();
        assert!(path.ends_with("genui/terminal-ui.log"));
    }
}
