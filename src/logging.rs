use log::LevelFilter;

/// `log` backend writing to the browser console
#[cfg(target_arch = "wasm32")]
pub struct ConsoleLogger;

#[cfg(target_arch = "wasm32")]
static LOGGER: ConsoleLogger = ConsoleLogger;

#[cfg(target_arch = "wasm32")]
impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        use log::Level;

        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}: {}", record.level(), record.target(), record.args());
        let value = wasm_bindgen::JsValue::from_str(&line);
        match record.level() {
            Level::Error => web_sys::console::error_1(&value),
            Level::Warn => web_sys::console::warn_1(&value),
            Level::Info => web_sys::console::info_1(&value),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&value),
        }
    }

    fn flush(&self) {}
}

/// Install the console logger; later calls only change the level
#[cfg(target_arch = "wasm32")]
pub fn init(level: LevelFilter) {
    // set_logger fails once a logger is installed, which is fine
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

/// Install `env_logger` on stderr; later calls only change the level
#[cfg(not(target_arch = "wasm32"))]
pub fn init(level: LevelFilter) {
    // the global max level does the filtering so it can be changed after install
    let _ = env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Trace)
        .try_init();
    log::set_max_level(level);
}

/// Parse "off", "error", "warn", "info", "debug" or "trace" (any case)
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    level.trim().parse().ok()
}
