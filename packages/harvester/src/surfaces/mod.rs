//! Surface implementations.

pub mod webdriver;

pub use webdriver::{WebDriverConfig, WebDriverSurface};
