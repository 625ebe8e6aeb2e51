mod persistence;

pub use persistence::{REQUIRED_COLUMNS, load_config, load_foods, read_foods, write_report};
