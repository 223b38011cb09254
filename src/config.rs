//! Page definitions: the contract the page-rendering layer hands to the controllers, loaded from TOML.
//!
//! A definition describes which elements exist on a page (questionnaire form, BMI helper, results
//! view, impact bars, tabs, print trigger) and the literal strings shown to the user.
//! See `PageConfig` for the expected schema and `pages/*.toml` for complete examples.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use crate::domain::{ChoiceOption, QuestionKind};
use crate::seeds;

#[derive(Debug, Error)]
pub enum PageError {
  #[error("failed to read page config {path}: {source}")]
  Io { path: String, source: std::io::Error },
  #[error("failed to parse page config: {0}")]
  Parse(#[from] toml::de::Error),
  #[error("unknown built-in page: {0}")]
  UnknownPage(String),
  #[error("duplicate question id: {0}")]
  DuplicateQuestion(String),
  #[error("choice question has no options: {0}")]
  EmptyChoice(String),
  #[error("duplicate tab target: {0}")]
  DuplicateTab(String),
  #[error("more than one tab is marked active")]
  MultipleActiveTabs,
  #[error("BMI helper needs a single-choice question named {0}")]
  BmiQuestion(String),
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct PageConfig {
  #[serde(default)] pub title: String,
  #[serde(default)] pub messages: Messages,
  #[serde(default)] pub form: Option<FormCfg>,
  #[serde(default)] pub bmi_helper: Option<BmiHelperCfg>,
  #[serde(default)] pub results: Option<ResultsCfg>,
  #[serde(default)] pub impact_bars: Vec<ImpactBarCfg>,
  #[serde(default)] pub tabs: Vec<TabCfg>,
  #[serde(default)] pub print_trigger: bool,
}

/// Literal user-facing strings. `{answered}` and `{total}` are filled in.
#[derive(Clone, Debug, Deserialize)]
pub struct Messages {
  pub incomplete: String,
}

impl Default for Messages {
  fn default() -> Self {
    Self {
      incomplete: "Por favor responde todas las preguntas. Has respondido {answered} de {total} preguntas.".into(),
    }
  }
}

/// The questionnaire form and its chrome. Chrome elements default to present.
#[derive(Clone, Debug, Deserialize)]
pub struct FormCfg {
  #[serde(default = "present")] pub progress_bar: bool,
  #[serde(default = "present")] pub submit_button: bool,
  #[serde(default = "present")] pub loading_overlay: bool,
  #[serde(default)] pub categories: Vec<CategoryCfg>,
  #[serde(default)] pub questions: Vec<QuestionCfg>,
}

fn present() -> bool { true }

#[derive(Clone, Debug, Deserialize)]
pub struct CategoryCfg {
  pub id: String,
  #[serde(default)] pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  pub id: String,
  #[serde(default)] pub text: String,
  #[serde(rename = "type")] pub kind: QuestionKind,
  #[serde(default)] pub category: Option<String>,
  #[serde(default)] pub min: Option<f64>,
  #[serde(default)] pub max: Option<f64>,
  #[serde(default)] pub options: Vec<ChoiceOption>,
  /// Tooltip text; questions with help get a toolkit tooltip at load.
  #[serde(default)] pub help: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BmiHelperCfg {
  #[serde(default = "default_bmi_question")] pub question: String,
  #[serde(default = "default_height_field")] pub height_field: String,
  #[serde(default = "default_weight_field")] pub weight_field: String,
  #[serde(default = "default_bmi_result")] pub result: String,
}

fn default_bmi_question() -> String { "bmi".into() }
fn default_height_field() -> String { "height-input".into() }
fn default_weight_field() -> String { "weight-input".into() }
fn default_bmi_result() -> String { "bmi-result".into() }

impl Default for BmiHelperCfg {
  fn default() -> Self {
    Self {
      question: default_bmi_question(),
      height_field: default_height_field(),
      weight_field: default_weight_field(),
      result: default_bmi_result(),
    }
  }
}

/// Results container; `animated` lists the ids flagged for entry animation, in document order.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct ResultsCfg {
  #[serde(default)] pub animated: Vec<String>,
}

/// Impact bar as rendered by the server: `value` is the raw `data-value` attribute.
#[derive(Clone, Debug, Deserialize)]
pub struct ImpactBarCfg {
  pub category: String,
  pub value: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TabCfg {
  /// Shared key of the tab and its panel, e.g. `#base-case`.
  pub target: String,
  #[serde(default)] pub label: String,
  #[serde(default)] pub active: bool,
}

impl PageConfig {
  pub fn from_toml_str(s: &str) -> Result<Self, PageError> {
    Ok(toml::from_str::<PageConfig>(s)?)
  }

  pub fn from_path(path: &Path) -> Result<Self, PageError> {
    let s = std::fs::read_to_string(path).map_err(|source| PageError::Io {
      path: path.display().to_string(),
      source,
    })?;
    Self::from_toml_str(&s)
  }

  /// Structural checks the controllers rely on at runtime.
  pub fn validate(&self) -> Result<(), PageError> {
    if let Some(form) = &self.form {
      let mut seen = HashSet::new();
      for q in &form.questions {
        if !seen.insert(q.id.as_str()) {
          return Err(PageError::DuplicateQuestion(q.id.clone()));
        }
        if q.kind == QuestionKind::SingleChoice && q.options.is_empty() {
          return Err(PageError::EmptyChoice(q.id.clone()));
        }
      }
      if let Some(bmi) = &self.bmi_helper {
        let ok = form
          .questions
          .iter()
          .any(|q| q.id == bmi.question && q.kind == QuestionKind::SingleChoice);
        if !ok {
          return Err(PageError::BmiQuestion(bmi.question.clone()));
        }
      }
    }

    let mut targets = HashSet::new();
    for t in &self.tabs {
      if !targets.insert(t.target.as_str()) {
        return Err(PageError::DuplicateTab(t.target.clone()));
      }
    }
    if self.tabs.iter().filter(|t| t.active).count() > 1 {
      return Err(PageError::MultipleActiveTabs);
    }
    Ok(())
  }
}

/// Resolve the page definition from the environment.
///
///   PAGE_CONFIG_PATH : path to a TOML page definition (wins when set)
///   PAGE             : built-in page name (questionnaire | results | comparison), default questionnaire
pub fn load_page_config_from_env() -> Result<PageConfig, PageError> {
  if let Ok(path) = std::env::var("PAGE_CONFIG_PATH") {
    return match PageConfig::from_path(Path::new(&path)) {
      Ok(cfg) => {
        info!(target: "questionnaire", %path, "Loaded page config (TOML)");
        Ok(cfg)
      }
      Err(e) => {
        error!(target: "questionnaire", %path, error = %e, "Failed to load page config");
        Err(e)
      }
    };
  }
  let name = std::env::var("PAGE").unwrap_or_else(|_| "questionnaire".into());
  let cfg = seeds::builtin_page(&name)?;
  info!(target: "questionnaire", page = %name, "Using built-in page");
  Ok(cfg)
}
