//! Configuration snapshot adapter.

mod static_config_view;

pub use static_config_view::{ConfigDocument, ConfigError, StaticConfigView};
