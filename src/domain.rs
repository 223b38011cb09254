//! Domain models for the questionnaire pages: question kinds and answers, BMI categories,
//! impact bands, submit styles and the derived progress state.

use serde::{Deserialize, Serialize};

/// Input kind as declared by the page markup (`data-input-type`).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
  #[serde(alias = "number")]
  Numeric,
  #[serde(alias = "choice")]
  SingleChoice,
}

/// One selectable answer of a single-choice question.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChoiceOption {
  pub value: String,
  #[serde(default)] pub text: String,
  #[serde(default)] pub impact: f64,
}

/// Answer slot of a question, fixed to its kind when the question is registered.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionInput {
  Numeric {
    /// Sanitized value: either a valid floating-point literal or empty.
    value: String,
    min: Option<f64>,
    max: Option<f64>,
  },
  SingleChoice {
    options: Vec<ChoiceOption>,
    /// Index into `options`; a radio group has at most one checked input.
    checked: Option<usize>,
  },
}

impl QuestionInput {
  pub fn kind(&self) -> QuestionKind {
    match self {
      QuestionInput::Numeric { .. } => QuestionKind::Numeric,
      QuestionInput::SingleChoice { .. } => QuestionKind::SingleChoice,
    }
  }

  pub fn is_answered(&self) -> bool {
    match self {
      QuestionInput::Numeric { value, .. } => !value.is_empty(),
      QuestionInput::SingleChoice { checked, .. } => checked.is_some(),
    }
  }

  /// Value of the checked option, if any.
  pub fn checked_value(&self) -> Option<&str> {
    match self {
      QuestionInput::SingleChoice { options, checked: Some(i) } => options.get(*i).map(|o| o.value.as_str()),
      _ => None,
    }
  }
}

/// BMI classification with half-open thresholds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
  Underweight,
  Normal,
  Overweight,
  #[serde(rename = "obese_1")] Obese1,
  #[serde(rename = "obese_2")] Obese2,
  #[serde(rename = "obese_3")] Obese3,
}

impl BmiCategory {
  /// The option value this category selects in the BMI question.
  pub fn as_value(&self) -> &'static str {
    match self {
      BmiCategory::Underweight => "underweight",
      BmiCategory::Normal => "normal",
      BmiCategory::Overweight => "overweight",
      BmiCategory::Obese1 => "obese_1",
      BmiCategory::Obese2 => "obese_2",
      BmiCategory::Obese3 => "obese_3",
    }
  }
}

/// Severity band of an impact bar. Zero belongs to the unfavorable side.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImpactBand {
  StronglyFavorable,
  MildlyFavorable,
  MildlyUnfavorable,
  StronglyUnfavorable,
}

impl ImpactBand {
  pub fn css_class(&self) -> &'static str {
    match self {
      ImpactBand::StronglyFavorable => "bg-success",
      ImpactBand::MildlyFavorable => "bg-info",
      ImpactBand::MildlyUnfavorable => "bg-warning",
      ImpactBand::StronglyUnfavorable => "bg-danger",
    }
  }
}

/// Visual state of the submit control; the two classes never coexist.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
  Primary,
  #[default]
  Secondary,
}

impl ButtonStyle {
  pub fn css_class(&self) -> &'static str {
    match self {
      ButtonStyle::Primary => "btn-primary",
      ButtonStyle::Secondary => "btn-secondary",
    }
  }
}

/// Derived completion state. Never stored; recomputed from the page on demand.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct ProgressState {
  pub answered: usize,
  pub total: usize,
}

impl ProgressState {
  pub fn new(answered: usize, total: usize) -> Self {
    Self { answered: answered.min(total), total }
  }

  /// Rounded percentage in [0, 100]. An empty form reads 0%.
  pub fn percent(&self) -> u8 {
    if self.total == 0 {
      return 0;
    }
    (self.answered as f64 / self.total as f64 * 100.0).round() as u8
  }

  /// Submit gate. An empty form keeps the gate closed.
  pub fn is_complete(&self) -> bool {
    self.total > 0 && self.answered == self.total
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn percent_rounds_to_nearest() {
    assert_eq!(ProgressState::new(2, 3).percent(), 67);
    assert_eq!(ProgressState::new(1, 3).percent(), 33);
    assert_eq!(ProgressState::new(1, 8).percent(), 13);
    assert_eq!(ProgressState::new(3, 3).percent(), 100);
  }

  #[test]
  fn empty_form_reads_zero_and_stays_closed() {
    let p = ProgressState::new(0, 0);
    assert_eq!(p.percent(), 0);
    assert!(!p.is_complete());
  }

  #[test]
  fn answered_is_capped_by_total() {
    let p = ProgressState::new(5, 3);
    assert_eq!(p.answered, 3);
    assert!(p.is_complete());
  }

  #[test]
  fn numeric_answered_iff_non_empty() {
    let mut q = QuestionInput::Numeric { value: String::new(), min: None, max: None };
    assert!(!q.is_answered());
    if let QuestionInput::Numeric { value, .. } = &mut q {
      *value = "42".into();
    }
    assert!(q.is_answered());
    assert_eq!(q.kind(), QuestionKind::Numeric);
  }

  #[test]
  fn kind_accepts_markup_spelling() {
    let k: QuestionKind = serde_json::from_str("\"choice\"").unwrap();
    assert_eq!(k, QuestionKind::SingleChoice);
    let k: QuestionKind = serde_json::from_str("\"number\"").unwrap();
    assert_eq!(k, QuestionKind::Numeric);
  }
}
