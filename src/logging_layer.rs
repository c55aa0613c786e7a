use std::str::FromStr;

use env_logger::Builder;

const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

fn level_from_env(value: Option<String>) -> (log::LevelFilter, Option<String>) {
    match value {
        None => (log::LevelFilter::Info, None),
        Some(value) => match log::LevelFilter::from_str(value.trim()) {
            Ok(level) => (level, None),
            Err(_) => (log::LevelFilter::Info, Some(value)),
        },
    }
}

/// Logs to stderr at the level named in LOG_LEVEL (info when unset). Calling it twice is harmless.
pub fn initialize_logging_layer() {
    let (level, unknown) = level_from_env(std::env::var(LOG_LEVEL_ENV).ok());
    let mut builder = Builder::new();
    builder.filter_level(level);

    if builder.try_init().is_ok() {
        log::info!("Initialized the logger at level {}", level);
    }
    if let Some(value) = unknown {
        log::warn!("Unknown {} \"{}\", using info", LOG_LEVEL_ENV, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_env() {
        assert_eq!(level_from_env(None), (log::LevelFilter::Info, None));
        assert_eq!(level_from_env(Some("TRACE".to_string())).0, log::LevelFilter::Trace);
        assert_eq!(level_from_env(Some("off".to_string())).0, log::LevelFilter::Off);
        let (level, unknown) = level_from_env(Some("loud".to_string()));
        assert_eq!(level, log::LevelFilter::Info);
        assert_eq!(unknown, Some("loud".to_string()));
    }
}
