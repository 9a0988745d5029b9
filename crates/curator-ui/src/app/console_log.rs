//! Browser console destination for `tracing` events.

use gloo::console;
use tracing::Level;
use tracing::level_filters::LevelFilter;

use crate::core::logging::{LineSink, subscriber};

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ConsoleSink;

impl LineSink for ConsoleSink {
    fn write_line(&self, level: Level, line: &str) {
        if level == Level::ERROR {
            console::error!(line);
        } else if level == Level::WARN {
            console::warn!(line);
        } else if level == Level::INFO {
            console::info!(line);
        } else {
            console::debug!(line);
        }
    }
}

/// Install the console subscriber once per page.
pub(crate) fn init(max_level: LevelFilter) {
    if tracing::subscriber::set_global_default(subscriber(ConsoleSink, max_level)).is_err() {
        console::warn!("tracing subscriber already installed");
    }
}
