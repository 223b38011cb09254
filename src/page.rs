//! The document: an explicit, injectable model of the page the rendering layer produced.
//!
//! `Page` owns every element role the components read or write:
//!   - the questionnaire form (sections of question cards, progress bar, submit button, loading overlay)
//!   - free-standing numeric fields and the BMI result slot
//!   - the results view (animated sections) and its impact bars
//!   - comparison tabs and their panels
//!   - the viewport (scroll requests) and the location fragment
//!
//! Optional elements are `Option`s; components tolerate their absence.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::config::{PageConfig, PageError, QuestionCfg};
use crate::domain::{ButtonStyle, QuestionInput, QuestionKind};
use crate::protocol::Target;
use crate::util::sanitize_number;

#[derive(Clone, Debug, Serialize)]
pub struct Page {
    pub title: String,
    pub form: Option<FormView>,
    pub fields: BTreeMap<String, Field>,
    pub bmi_result: Option<TextSlot>,
    pub results: Option<ResultsView>,
    pub impact_bars: Vec<ImpactBar>,
    pub tabs: Vec<Tab>,
    pub panels: Vec<TabPanel>,
    pub print_trigger: bool,
    /// Element ids carrying a toolkit tooltip, in document order.
    pub tooltips: Vec<String>,
    pub viewport: Viewport,
    pub location_hash: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FormView {
    pub sections: Vec<Section>,
    pub progress: Option<ProgressIndicator>,
    pub submit: Option<SubmitControl>,
    pub loading_overlay: Option<LoadingOverlay>,
    /// Set when a submission was not cancelled.
    pub submitted: bool,
    #[serde(skip)]
    pub incomplete_message: String,
}

/// A category block; cards inside it are siblings.
#[derive(Clone, Debug, Serialize)]
pub struct Section {
    pub category: String,
    pub name: String,
    pub cards: Vec<QuestionCard>,
}

#[derive(Clone, Debug, Serialize)]
pub struct QuestionCard {
    pub id: String,
    pub text: String,
    pub input: QuestionInput,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ProgressIndicator {
    pub width: String,
    pub aria_valuenow: u8,
    pub text: String,
}

impl Default for ProgressIndicator {
    fn default() -> Self {
        Self { width: "0%".into(), aria_valuenow: 0, text: "0%".into() }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SubmitControl {
    pub disabled: bool,
    pub style: ButtonStyle,
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self { disabled: true, style: ButtonStyle::Secondary }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LoadingOverlay {
    pub hidden: bool,
}

#[derive(Clone, Debug, Serialize, Default, PartialEq)]
pub struct Field {
    pub value: String,
}

#[derive(Clone, Debug, Serialize, Default, PartialEq)]
pub struct TextSlot {
    pub id: String,
    pub text: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResultsView {
    pub animated: Vec<AnimatedElement>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AnimatedElement {
    pub id: String,
    /// `animate-fade-in` applied.
    pub revealed: bool,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ImpactBar {
    pub category: String,
    /// Raw `data-value` attribute.
    pub value: String,
    pub width: Option<String>,
    pub class: Option<&'static str>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Tab {
    pub target: String,
    pub label: String,
    pub active: bool,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TabPanel {
    pub id: String,
    pub hidden: bool,
}

#[derive(Clone, Debug, Serialize, Default)]
pub struct Viewport {
    /// Elements brought to the vertical center, oldest first.
    pub scrolled_to: Vec<String>,
}

impl Page {
    /// Build the document the rendering layer would emit for `cfg`.
    #[instrument(level = "debug", skip_all, fields(title = %cfg.title))]
    pub fn render(cfg: &PageConfig) -> Result<Self, PageError> {
        cfg.validate()?;

        let mut tooltips: Vec<String> = Vec::new();
        let form = cfg.form.as_ref().map(|f| {
            let mut sections: Vec<Section> = if f.categories.is_empty() {
                vec![Section { category: String::new(), name: String::new(), cards: Vec::new() }]
            } else {
                f.categories
                    .iter()
                    .map(|c| Section { category: c.id.clone(), name: c.name.clone(), cards: Vec::new() })
                    .collect()
            };
            for q in &f.questions {
                let section = if f.categories.is_empty() {
                    sections.first_mut()
                } else {
                    let cat = q.category.as_deref().unwrap_or_default();
                    sections.iter_mut().find(|s| s.category == cat)
                };
                match section {
                    Some(s) => s.cards.push(card_from_cfg(q)),
                    None => {
                        warn!(target: "page", id = %q.id, category = ?q.category, "Question has no rendered category; not shown");
                    }
                }
            }
            tooltips = sections
                .iter()
                .flat_map(|s| s.cards.iter())
                .filter(|c| f.questions.iter().any(|q| q.id == c.id && q.help.is_some()))
                .map(|c| c.id.clone())
                .collect();
            FormView {
                sections,
                progress: f.progress_bar.then(ProgressIndicator::default),
                submit: f.submit_button.then(SubmitControl::default),
                loading_overlay: f.loading_overlay.then_some(LoadingOverlay { hidden: true }),
                submitted: false,
                incomplete_message: cfg.messages.incomplete.clone(),
            }
        });

        let mut fields = BTreeMap::new();
        let mut bmi_result = None;
        if let Some(b) = &cfg.bmi_helper {
            fields.insert(b.height_field.clone(), Field::default());
            fields.insert(b.weight_field.clone(), Field::default());
            bmi_result = Some(TextSlot { id: b.result.clone(), text: String::new() });
        }

        let results = cfg.results.as_ref().map(|r| ResultsView {
            animated: r
                .animated
                .iter()
                .map(|id| AnimatedElement { id: id.clone(), revealed: false })
                .collect(),
        });

        let impact_bars = cfg
            .impact_bars
            .iter()
            .map(|b| ImpactBar { category: b.category.clone(), value: b.value.clone(), width: None, class: None })
            .collect();

        let tabs = cfg
            .tabs
            .iter()
            .map(|t| Tab { target: t.target.clone(), label: t.label.clone(), active: t.active })
            .collect();
        let panels = cfg
            .tabs
            .iter()
            .map(|t| TabPanel { id: panel_id(&t.target).to_string(), hidden: !t.active })
            .collect();

        let page = Self {
            title: cfg.title.clone(),
            form,
            fields,
            bmi_result,
            results,
            impact_bars,
            tabs,
            panels,
            print_trigger: cfg.print_trigger,
            tooltips,
            viewport: Viewport::default(),
            location_hash: None,
        };
        debug!(target: "page", questions = page.questions().count(), fields = page.fields.len(), tabs = page.tabs.len(), "Page rendered");
        Ok(page)
    }

    /// Every question card in document order.
    pub fn questions(&self) -> impl Iterator<Item = &QuestionCard> {
        self.form.iter().flat_map(|f| f.sections.iter()).flat_map(|s| s.cards.iter())
    }

    pub fn question(&self, id: &str) -> Option<&QuestionCard> {
        self.questions().find(|c| c.id == id)
    }

    pub fn question_mut(&mut self, id: &str) -> Option<&mut QuestionCard> {
        self.form
            .iter_mut()
            .flat_map(|f| f.sections.iter_mut())
            .flat_map(|s| s.cards.iter_mut())
            .find(|c| c.id == id)
    }

    /// The card immediately after `id` within the same section, if any.
    pub fn next_sibling_question(&self, id: &str) -> Option<&QuestionCard> {
        let form = self.form.as_ref()?;
        form.sections.iter().find_map(|s| {
            let pos = s.cards.iter().position(|c| c.id == id)?;
            s.cards.get(pos + 1)
        })
    }

    /// Resolve an input name to what it targets: a numeric or choice question, or a free field.
    pub fn resolve_input(&self, name: &str) -> Option<Target> {
        if self.question(name).is_some() {
            Some(Target::Question(name.to_string()))
        } else if self.fields.contains_key(name) {
            Some(Target::Field(name.to_string()))
        } else {
            None
        }
    }

    /// Current value of a numeric input.
    pub fn input_value(&self, target: &Target) -> Option<&str> {
        match target {
            Target::Field(name) => self.fields.get(name).map(|f| f.value.as_str()),
            Target::Question(id) => match &self.question(id)?.input {
                QuestionInput::Numeric { value, .. } => Some(value.as_str()),
                QuestionInput::SingleChoice { .. } => None,
            },
        }
    }

    /// Write a numeric input with number-field sanitization. False if the target is not numeric.
    pub fn set_input_value(&mut self, target: &Target, raw: &str) -> bool {
        let clean = sanitize_number(raw);
        match target {
            Target::Field(name) => match self.fields.get_mut(name) {
                Some(f) => {
                    f.value = clean;
                    true
                }
                None => false,
            },
            Target::Question(id) => match self.question_mut(id).map(|c| &mut c.input) {
                Some(QuestionInput::Numeric { value, .. }) => {
                    *value = clean;
                    true
                }
                _ => false,
            },
        }
    }

    /// Check the option with `value` in a single-choice question. False if no such option exists.
    pub fn check_option(&mut self, question: &str, value: &str) -> bool {
        match self.question_mut(question).map(|c| &mut c.input) {
            Some(QuestionInput::SingleChoice { options, checked }) => {
                match options.iter().position(|o| o.value == value) {
                    Some(i) => {
                        *checked = Some(i);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    /// Remove a question card from the document. Pending work targeting it becomes a no-op.
    pub fn detach_question(&mut self, id: &str) -> bool {
        let Some(form) = self.form.as_mut() else { return false };
        for s in &mut form.sections {
            if let Some(pos) = s.cards.iter().position(|c| c.id == id) {
                s.cards.remove(pos);
                return true;
            }
        }
        false
    }

    /// Smooth-scroll `id` to the vertical center. False if the element is gone.
    pub fn scroll_into_view(&mut self, id: &str) -> bool {
        if self.question(id).is_none() {
            return false;
        }
        self.viewport.scrolled_to.push(id.to_string());
        true
    }

    /// Apply the fade-in class to an animated results element. False if the element is gone.
    pub fn reveal(&mut self, id: &str) -> bool {
        let Some(results) = self.results.as_mut() else { return false };
        match results.animated.iter_mut().find(|a| a.id == id) {
            Some(a) => {
                a.revealed = true;
                true
            }
            None => false,
        }
    }
}

/// Panel ids are tab targets without the fragment marker.
pub fn panel_id(target: &str) -> &str {
    target.trim_start_matches('#')
}

fn card_from_cfg(q: &QuestionCfg) -> QuestionCard {
    let input = match q.kind {
        QuestionKind::Numeric => QuestionInput::Numeric { value: String::new(), min: q.min, max: q.max },
        QuestionKind::SingleChoice => QuestionInput::SingleChoice { options: q.options.clone(), checked: None },
    };
    QuestionCard { id: q.id.clone(), text: q.text.clone(), input }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Page {
        let cfg = PageConfig::from_toml_str(
            r#"
            [bmi_helper]
            [form]
            [[form.categories]]
            id = "a"
            [[form.categories]]
            id = "b"
            [[form.questions]]
            id = "age"
            type = "number"
            category = "a"
            help = "years"
            [[form.questions]]
            id = "sex"
            type = "choice"
            category = "a"
            options = [{ value = "male" }, { value = "female" }]
            [[form.questions]]
            id = "bmi"
            type = "choice"
            category = "b"
            options = [{ value = "normal" }]
            [[form.questions]]
            id = "orphan"
            type = "number"
            category = "nowhere"
            "#,
        )
        .unwrap();
        Page::render(&cfg).unwrap()
    }

    #[test]
    fn cards_are_grouped_by_category_in_order() {
        let p = page();
        let ids: Vec<_> = p.questions().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["age", "sex", "bmi"]);
        assert_eq!(p.tooltips, ["age"]);
    }

    #[test]
    fn siblings_stay_inside_a_section() {
        let p = page();
        assert_eq!(p.next_sibling_question("age").map(|c| c.id.as_str()), Some("sex"));
        assert!(p.next_sibling_question("sex").is_none());
        assert!(p.next_sibling_question("bmi").is_none());
    }

    #[test]
    fn number_inputs_are_sanitized() {
        let mut p = page();
        let age = Target::Question("age".into());
        assert!(p.set_input_value(&age, "45"));
        assert_eq!(p.input_value(&age), Some("45"));
        assert!(p.set_input_value(&age, "forty"));
        assert_eq!(p.input_value(&age), Some(""));
        assert!(!p.set_input_value(&Target::Question("sex".into()), "1"));
    }

    #[test]
    fn resolve_input_distinguishes_questions_and_fields() {
        let p = page();
        assert_eq!(p.resolve_input("age"), Some(Target::Question("age".into())));
        assert_eq!(p.resolve_input("height-input"), Some(Target::Field("height-input".into())));
        assert_eq!(p.resolve_input("nope"), None);
    }

    #[test]
    fn check_option_rejects_unknown_values() {
        let mut p = page();
        assert!(p.check_option("sex", "female"));
        assert_eq!(p.question("sex").unwrap().input.checked_value(), Some("female"));
        assert!(!p.check_option("sex", "other"));
        assert!(!p.check_option("age", "male"));
    }

    #[test]
    fn scrolling_to_a_detached_card_is_a_noop() {
        let mut p = page();
        assert!(p.scroll_into_view("sex"));
        assert!(p.detach_question("sex"));
        assert!(!p.scroll_into_view("sex"));
        assert_eq!(p.viewport.scrolled_to, ["sex"]);
    }

    #[test]
    fn chrome_starts_at_zero_and_disabled() {
        let p = page();
        let form = p.form.as_ref().unwrap();
        assert_eq!(form.progress, Some(ProgressIndicator::default()));
        assert_eq!(form.submit, Some(SubmitControl { disabled: true, style: ButtonStyle::Secondary }));
        assert_eq!(form.loading_overlay, Some(LoadingOverlay { hidden: true }));
    }
}
