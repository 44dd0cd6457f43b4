//! Built-in formatter plugins, registered at process startup ahead of any
//! caller-supplied extensions (§4.6).

mod heading;
mod tables;
mod trim;

use std::sync::Arc;

pub use heading::StripHeadingFooting;
pub use tables::TableFormatter;
pub use trim::TrimTrailingWhitespace;

use crate::registry::PluginRegistryBuilder;

/// Registers every built-in plugin onto a [`PluginRegistryBuilder`].
pub fn register_all(builder: PluginRegistryBuilder) -> PluginRegistryBuilder {
    builder
        .line_formatter(Arc::new(TrimTrailingWhitespace::new()))
        .multiline_formatter(Arc::new(TableFormatter::new()))
        .preprocessor(Arc::new(StripHeadingFooting::new()))
}
