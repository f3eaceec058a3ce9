pub mod toml_loader;

pub use toml_loader::{load_config, load_layout};
