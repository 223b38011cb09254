//! Form completion tracking: tally, progress projection, submission interception and navigation assist.
//!
//! The controller keeps no answer state of its own. Every pass re-reads the page, so the progress
//! indicator and the submit gate can never drift from the true answered count.

use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::domain::{ButtonStyle, ProgressState, QuestionKind};
use crate::page::Page;
use crate::protocol::{DeferredAction, Effect, Notice, Reaction, Target};
use crate::scheduler::TaskKey;
use crate::util::fill_template;

/// Delay between answering a single-choice question and scrolling to the next card.
pub const SCROLL_DELAY: Duration = Duration::from_millis(300);

#[derive(Clone, Debug)]
pub struct FormProgressController {
  total: usize,
}

impl FormProgressController {
  /// Attach to the page's questionnaire form. The question set is fixed from here on.
  pub fn attach(page: &Page) -> Option<Self> {
    page.form.as_ref()?;
    let total = page.questions().count();
    info!(target: "questionnaire", total, "Form progress controller attached");
    Some(Self { total })
  }

  pub fn total(&self) -> usize {
    self.total
  }

  /// Fresh full pass over every question card.
  pub fn count_answered(&self, page: &Page) -> usize {
    let count = page.questions().filter(|c| c.input.is_answered()).count();
    debug!(target: "questionnaire", answered = count, total = self.total, "Answered questions tallied");
    count
  }

  pub fn progress(&self, page: &Page) -> ProgressState {
    ProgressState::new(self.count_answered(page), self.total)
  }

  /// Project the tally onto the progress indicator and the submit control.
  #[instrument(level = "debug", skip_all)]
  pub fn update_progress(&self, page: &mut Page) -> ProgressState {
    let state = self.progress(page);
    let percent = state.percent();
    let complete = state.is_complete();

    let Some(form) = page.form.as_mut() else { return state };
    match form.progress.as_mut() {
      Some(bar) => {
        bar.width = format!("{}%", percent);
        bar.aria_valuenow = percent;
        bar.text = format!("{}%", percent);
      }
      None => warn!(target: "questionnaire", "Progress indicator not found"),
    }
    match form.submit.as_mut() {
      Some(button) => {
        button.disabled = !complete;
        button.style = if complete { ButtonStyle::Primary } else { ButtonStyle::Secondary };
      }
      None => warn!(target: "questionnaire", "Submit control not found"),
    }
    state
  }

  /// `change` on any form input: recompute, then assist navigation for answered choice questions.
  #[instrument(level = "debug", skip(self, page, reaction))]
  pub fn on_change(&self, page: &mut Page, target: &Target, reaction: &mut Reaction) {
    let state = self.update_progress(page);
    reaction.push(Effect::Notify(progress_notice(&state)));

    if let Target::Question(id) = target {
      self.assist_navigation(page, id, reaction);
    }
  }

  /// Schedule a scroll to the card right after `id`, when that sibling is a question.
  fn assist_navigation(&self, page: &Page, id: &str, reaction: &mut Reaction) {
    let Some(card) = page.question(id) else { return };
    if card.input.kind() != QuestionKind::SingleChoice || !card.input.is_answered() {
      return;
    }
    if let Some(next) = page.next_sibling_question(id) {
      debug!(target: "questionnaire", from = %id, to = %next.id, "Scheduling scroll to next question");
      reaction.push(Effect::Schedule {
        key: TaskKey::Scroll(next.id.clone()),
        delay: SCROLL_DELAY,
        action: DeferredAction::ScrollIntoView { element: next.id.clone() },
      });
    }
  }

  /// `submit` on the form: block incomplete submissions, otherwise reveal the loading overlay.
  #[instrument(level = "info", skip_all)]
  pub fn on_submit(&self, page: &mut Page, reaction: &mut Reaction) {
    info!(target: "questionnaire", "Form submission started");
    let state = self.progress(page);

    if !state.is_complete() {
      reaction.prevent_default();
      let template = page.form.as_ref().map(|f| f.incomplete_message.as_str()).unwrap_or_default();
      let message = fill_template(
        template,
        &[("answered", &state.answered.to_string()), ("total", &state.total.to_string())],
      );
      info!(target: "questionnaire", answered = state.answered, total = state.total, "Submission blocked: form incomplete");
      reaction.push(Effect::Alert(message));
      return;
    }

    info!(target: "questionnaire", "All questions answered; submission proceeds");
    match page.form.as_mut().and_then(|f| f.loading_overlay.as_mut()) {
      Some(overlay) => {
        overlay.hidden = false;
        info!(target: "questionnaire", "Loading indicator shown");
      }
      None => info!(target: "questionnaire", "Loading indicator element not found"),
    }
  }
}

pub fn progress_notice(state: &ProgressState) -> Notice {
  Notice::Progress {
    answered: state.answered,
    total: state.total,
    percent: state.percent(),
    submit_enabled: state.is_complete(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::PageConfig;

  fn three_questions(extra: &str) -> Page {
    let src = format!(
      r#"
      [form]
      {extra}
      [[form.questions]]
      id = "age"
      type = "number"
      [[form.questions]]
      id = "sleep"
      type = "choice"
      options = [{{ value = "7-8" }}, {{ value = "<5" }}]
      [[form.questions]]
      id = "diet"
      type = "choice"
      options = [{{ value = "good" }}]
      "#
    );
    Page::render(&PageConfig::from_toml_str(&src).unwrap()).unwrap()
  }

  #[test]
  fn attach_needs_a_form() {
    let page = Page::render(&PageConfig::default()).unwrap();
    assert!(FormProgressController::attach(&page).is_none());
  }

  #[test]
  fn two_of_three_reads_67_percent_and_keeps_submit_disabled() {
    let mut page = three_questions("");
    let ctl = FormProgressController::attach(&page).unwrap();
    page.set_input_value(&Target::Question("age".into()), "45");
    page.check_option("sleep", "7-8");

    let state = ctl.update_progress(&mut page);
    assert_eq!(state, ProgressState::new(2, 3));
    let form = page.form.as_ref().unwrap();
    let bar = form.progress.as_ref().unwrap();
    assert_eq!((bar.width.as_str(), bar.aria_valuenow, bar.text.as_str()), ("67%", 67, "67%"));
    let button = form.submit.as_ref().unwrap();
    assert!(button.disabled);
    assert_eq!(button.style, ButtonStyle::Secondary);
  }

  #[test]
  fn completing_the_form_enables_submit() {
    let mut page = three_questions("");
    let ctl = FormProgressController::attach(&page).unwrap();
    page.set_input_value(&Target::Question("age".into()), "45");
    page.check_option("sleep", "7-8");
    page.check_option("diet", "good");

    ctl.update_progress(&mut page);
    let form = page.form.as_ref().unwrap();
    assert_eq!(form.progress.as_ref().unwrap().width, "100%");
    assert!(!form.submit.as_ref().unwrap().disabled);
    assert_eq!(form.submit.as_ref().unwrap().style, ButtonStyle::Primary);
  }

  #[test]
  fn clearing_a_numeric_answer_reopens_the_gate() {
    let mut page = three_questions("");
    let ctl = FormProgressController::attach(&page).unwrap();
    let age = Target::Question("age".into());
    page.set_input_value(&age, "45");
    page.check_option("sleep", "7-8");
    page.check_option("diet", "good");
    assert!(ctl.update_progress(&mut page).is_complete());

    page.set_input_value(&age, "");
    assert!(!ctl.update_progress(&mut page).is_complete());
    assert!(page.form.as_ref().unwrap().submit.as_ref().unwrap().disabled);
  }

  #[test]
  fn missing_chrome_is_tolerated() {
    let mut page = three_questions("progress_bar = false\nsubmit_button = false");
    let ctl = FormProgressController::attach(&page).unwrap();
    page.check_option("diet", "good");
    assert_eq!(ctl.update_progress(&mut page).answered, 1);
  }

  #[test]
  fn incomplete_submit_is_cancelled_with_a_message() {
    let mut page = three_questions("");
    let ctl = FormProgressController::attach(&page).unwrap();
    page.check_option("sleep", "<5");

    let mut r = Reaction::default();
    ctl.on_submit(&mut page, &mut r);
    assert!(r.default_prevented);
    match r.effects.as_slice() {
      [Effect::Alert(msg)] => assert!(msg.contains("1 de 3"), "{msg}"),
      other => panic!("unexpected effects: {other:?}"),
    }
    assert!(page.form.as_ref().unwrap().loading_overlay.as_ref().unwrap().hidden);
  }

  #[test]
  fn complete_submit_shows_the_loading_overlay() {
    let mut page = three_questions("");
    let ctl = FormProgressController::attach(&page).unwrap();
    page.set_input_value(&Target::Question("age".into()), "45");
    page.check_option("sleep", "<5");
    page.check_option("diet", "good");

    let mut r = Reaction::default();
    ctl.on_submit(&mut page, &mut r);
    assert!(!r.default_prevented);
    assert!(r.effects.is_empty());
    assert!(!page.form.as_ref().unwrap().loading_overlay.as_ref().unwrap().hidden);
  }

  #[test]
  fn complete_submit_without_overlay_still_proceeds() {
    let mut page = three_questions("loading_overlay = false");
    let ctl = FormProgressController::attach(&page).unwrap();
    page.set_input_value(&Target::Question("age".into()), "45");
    page.check_option("sleep", "<5");
    page.check_option("diet", "good");

    let mut r = Reaction::default();
    ctl.on_submit(&mut page, &mut r);
    assert!(!r.default_prevented);
  }

  #[test]
  fn empty_form_blocks_submission() {
    let mut page = Page::render(&PageConfig::from_toml_str("[form]").unwrap()).unwrap();
    let ctl = FormProgressController::attach(&page).unwrap();
    assert_eq!(ctl.update_progress(&mut page).percent(), 0);
    let mut r = Reaction::default();
    ctl.on_submit(&mut page, &mut r);
    assert!(r.default_prevented);
  }

  #[test]
  fn answering_a_choice_schedules_a_scroll_to_the_next_card() {
    let mut page = three_questions("");
    let ctl = FormProgressController::attach(&page).unwrap();
    page.check_option("sleep", "7-8");

    let mut r = Reaction::default();
    ctl.on_change(&mut page, &Target::Question("sleep".into()), &mut r);
    let scheduled: Vec<_> = r
      .effects
      .iter()
      .filter_map(|e| match e {
        Effect::Schedule { key, delay, action } => Some((key.clone(), *delay, action.clone())),
        _ => None,
      })
      .collect();
    assert_eq!(
      scheduled,
      [(
        TaskKey::Scroll("diet".into()),
        SCROLL_DELAY,
        DeferredAction::ScrollIntoView { element: "diet".into() }
      )]
    );
  }

  #[test]
  fn numeric_answers_and_last_cards_do_not_scroll() {
    let mut page = three_questions("");
    let ctl = FormProgressController::attach(&page).unwrap();
    page.set_input_value(&Target::Question("age".into()), "45");
    page.check_option("diet", "good");

    for id in ["age", "diet"] {
      let mut r = Reaction::default();
      ctl.on_change(&mut page, &Target::Question(id.into()), &mut r);
      assert!(r.effects.iter().all(|e| !matches!(e, Effect::Schedule { .. })), "{id}");
    }
  }
}
