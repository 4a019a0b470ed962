//! Logger installation.
//!
//! Everything in the crate logs through the `log` facade. In the browser the
//! records go to the devtools console; native builds (tests, tools) use
//! `env_logger`.

use std::sync::Once;

use log::LevelFilter;

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: LevelFilter,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
        }
    }
}

static INIT: Once = Once::new();

/// Installs the global logger once; later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        install(config.level);
        log::debug!("logging initialized");
    });
}

#[cfg(target_arch = "wasm32")]
fn install(level: LevelFilter) {
    static LOGGER: console::ConsoleLogger = console::ConsoleLogger;
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn install(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    if let Ok(filter) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filter);
    } else {
        builder.filter_level(level);
    }
    // Another logger may already be installed by the embedding binary.
    let _ = builder.try_init();
}

#[cfg(target_arch = "wasm32")]
mod console {
    use log::{Level, Log, Metadata, Record};
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = console, js_name = log)]
        fn log_str(s: &str);
        #[wasm_bindgen(js_namespace = console, js_name = warn)]
        fn warn_str(s: &str);
        #[wasm_bindgen(js_namespace = console, js_name = error)]
        fn error_str(s: &str);
    }

    pub(super) struct ConsoleLogger;

    impl Log for ConsoleLogger {
        fn enabled(&self, metadata: &Metadata<'_>) -> bool {
            metadata.level() <= log::max_level()
        }

        fn log(&self, record: &Record<'_>) {
            if !self.enabled(record.metadata()) {
                return;
            }
            let line = format!("[{}] {}: {}", record.level(), record.target(), record.args());
            match record.level() {
                Level::Error => error_str(&line),
                Level::Warn => warn_str(&line),
                _ => log_str(&line),
            }
        }

        fn flush(&self) {}
    }
}
