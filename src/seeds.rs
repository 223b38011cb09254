//! Built-in page definitions that guarantee the binary is useful without external config.

use crate::config::{PageConfig, PageError};

const QUESTIONNAIRE_TOML: &str = include_str!("../pages/questionnaire.toml");
const RESULTS_TOML: &str = include_str!("../pages/results.toml");
const COMPARISON_TOML: &str = include_str!("../pages/comparison.toml");

/// Names accepted by `builtin_page`.
pub const BUILTIN_PAGES: [&str; 3] = ["questionnaire", "results", "comparison"];

/// Parse one of the embedded pages by name.
pub fn builtin_page(name: &str) -> Result<PageConfig, PageError> {
  let src = match name {
    "questionnaire" => QUESTIONNAIRE_TOML,
    "results" => RESULTS_TOML,
    "comparison" => COMPARISON_TOML,
    other => return Err(PageError::UnknownPage(other.to_string())),
  };
  PageConfig::from_toml_str(src)
}
