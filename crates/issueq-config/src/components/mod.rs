//! Component configurations

mod fields;
mod logging;

pub use fields::FieldsConfig;
pub use logging::LoggingConfig;
