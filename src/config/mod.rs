//! Report configuration: file format, precedence and textual specs.

pub mod column_spec;
pub mod loader;

pub use column_spec::{parse_default, ColumnSpec, FieldRef};
pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, CliOverrides, ConfigError,
    ConfigFile, OutputFormat, ResolvedConfig,
};
