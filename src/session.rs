//! Page session: the thin adapter between user actions and the page components.
//!
//! This module owns:
//!   - the document (`Arc<Mutex<Page>>`), shared with deferred tasks
//!   - the attached components (form progress, BMI bridge, tab switcher)
//!   - the scheduler for deferred work (navigation scrolls, results reveals)
//!   - the UI toolkit collaborator (alerts, native print, tooltips)
//!
//! Each action is translated into DOM events. Each event runs its listeners to completion, then its
//! native default action (unless cancelled), then the effects the listeners requested. Synthetic
//! events requested by a listener are delivered before the action returns.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::bmi::BmiBridge;
use crate::config::{PageConfig, PageError};
use crate::impact;
use crate::page::Page;
use crate::progress::{progress_notice, FormProgressController};
use crate::protocol::{DeferredAction, DomEvent, Effect, Notice, Reaction, Target, UserAction};
use crate::results;
use crate::scheduler::Scheduler;
use crate::tabs::TabSwitcher;
use crate::util::trunc_for_log;

/// Platform services the page delegates to.
pub trait UiToolkit: Send {
    /// Blocking user-facing message.
    fn alert(&mut self, message: &str);
    /// Native print dialog.
    fn print(&mut self);
    fn attach_tooltip(&mut self, element: &str);
}

/// Toolkit that records what it was asked to do. Used headless.
#[derive(Clone, Debug, Default)]
pub struct RecordingToolkit {
    pub alerts: Vec<String>,
    pub prints: usize,
    pub tooltips: Vec<String>,
}

impl UiToolkit for RecordingToolkit {
    fn alert(&mut self, message: &str) {
        info!(target: "page", %message, "Alert shown");
        self.alerts.push(message.to_string());
    }

    fn print(&mut self) {
        info!(target: "page", "Print dialog opened");
        self.prints += 1;
    }

    fn attach_tooltip(&mut self, element: &str) {
        debug!(target: "page", %element, "Tooltip attached");
        self.tooltips.push(element.to_string());
    }
}

pub struct PageSession<T: UiToolkit = RecordingToolkit> {
    id: Uuid,
    page: Arc<Mutex<Page>>,
    form: Option<FormProgressController>,
    bmi: Option<BmiBridge>,
    tabs: Option<TabSwitcher>,
    scheduler: Scheduler,
    toolkit: T,
}

impl<T: UiToolkit> PageSession<T> {
    /// Render the page, attach every component whose elements are present and run the load pass.
    /// Returns the notices of the load pass.
    #[instrument(level = "info", skip_all, fields(title = %cfg.title))]
    pub async fn load(cfg: &PageConfig, toolkit: T) -> Result<(Self, Vec<Notice>), PageError> {
        let mut page = Page::render(cfg)?;
        let form = FormProgressController::attach(&page);
        let bmi = cfg.bmi_helper.as_ref().and_then(|b| BmiBridge::attach(&page, b));
        let tabs = TabSwitcher::attach(&page);

        let mut reaction = Reaction::default();
        for el in &page.tooltips {
            reaction.push(Effect::AttachTooltip(el.clone()));
        }
        if let Some(ctl) = &form {
            let state = ctl.update_progress(&mut page);
            reaction.push(Effect::Notify(progress_notice(&state)));
        }
        results::schedule_entry_animation(&page, &mut reaction);
        impact::render_all(&mut page);

        let id = Uuid::new_v4();
        info!(
            target: "page",
            session = %id,
            form = form.is_some(),
            bmi_helper = bmi.is_some(),
            tabs = tabs.is_some(),
            "Page loaded"
        );

        let mut session = Self {
            id,
            page: Arc::new(Mutex::new(page)),
            form,
            bmi,
            tabs,
            scheduler: Scheduler::new(),
            toolkit,
        };
        let mut notices = Vec::new();
        let page = session.page.clone();
        let mut page = page.lock().await;
        session.apply(&mut page, reaction, &mut notices);
        drop(page);
        Ok((session, notices))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Shared handle to the document, for inspection or for the rendering layer to mutate it.
    pub fn page(&self) -> Arc<Mutex<Page>> {
        self.page.clone()
    }

    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    /// Perform one user action and return what the page reported.
    #[instrument(level = "info", skip(self), fields(session = %self.id))]
    pub async fn perform(&mut self, action: UserAction) -> Vec<Notice> {
        let mut notices = Vec::new();
        match action {
            UserAction::Wait { ms } => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                return notices;
            }
            UserAction::Snapshot => {
                notices.push(Notice::Snapshot { page: Box::new(self.snapshot().await) });
                return notices;
            }
            _ => {}
        }

        let page = self.page.clone();
        let mut page = page.lock().await;
        let events = match self.translate(&mut page, action) {
            Ok(events) => events,
            Err(message) => {
                warn!(target: "page", %message, "Action rejected");
                notices.push(Notice::Error { message });
                return notices;
            }
        };
        for event in events {
            self.process(&mut page, event, &mut notices);
        }
        notices
    }

    /// Wait for every deferred task scheduled so far.
    pub async fn settle(&mut self) {
        self.scheduler.settle().await;
    }

    pub async fn snapshot(&self) -> Page {
        self.page.lock().await.clone()
    }

    /// Page unload: abort pending work and hand back the final document.
    pub async fn close(mut self) -> Page {
        self.scheduler.shutdown();
        info!(target: "page", session = %self.id, "Page closed");
        self.snapshot().await
    }

    /// Apply the action's direct DOM mutation and list the events it fires.
    fn translate(&self, page: &mut Page, action: UserAction) -> Result<Vec<DomEvent>, String> {
        match action {
            UserAction::Type { input, value } => {
                let target = numeric_target(page, &input)?;
                debug!(target: "page", %input, value = %trunc_for_log(&value, 32), "Typing");
                page.set_input_value(&target, &value);
                Ok(vec![DomEvent::Input(target)])
            }
            UserAction::Commit { input } => {
                let target = page.resolve_input(&input).ok_or_else(|| format!("Unknown input: {}", input))?;
                Ok(vec![DomEvent::Change(target)])
            }
            UserAction::Fill { input, value } => {
                let target = numeric_target(page, &input)?;
                page.set_input_value(&target, &value);
                Ok(vec![DomEvent::Input(target.clone()), DomEvent::Change(target)])
            }
            UserAction::Choose { question, value } => {
                let already = page
                    .question(&question)
                    .and_then(|q| q.input.checked_value())
                    .is_some_and(|v| v == value);
                if already {
                    // re-clicking a checked radio fires no change
                    debug!(target: "page", %question, %value, "Option already checked");
                    return Ok(Vec::new());
                }
                if !page.check_option(&question, &value) {
                    return Err(format!("No option {} in question {}", value, question));
                }
                Ok(vec![DomEvent::Change(Target::Question(question))])
            }
            UserAction::Submit => {
                if page.form.is_none() {
                    return Err("No form on this page".into());
                }
                Ok(vec![DomEvent::Submit])
            }
            UserAction::ClickTab { target } => Ok(vec![DomEvent::ClickTab(target)]),
            UserAction::Print => {
                if !page.print_trigger {
                    return Err("No print trigger on this page".into());
                }
                Ok(vec![DomEvent::ClickPrint])
            }
            UserAction::Wait { .. } | UserAction::Snapshot => Ok(Vec::new()),
        }
    }

    /// Listeners, then the native default, then the requested effects.
    fn process(&mut self, page: &mut Page, event: DomEvent, notices: &mut Vec<Notice>) {
        let mut reaction = Reaction::default();
        match &event {
            DomEvent::Input(target) => {
                if let Some(bmi) = &self.bmi {
                    bmi.on_input(page, target, &mut reaction);
                }
            }
            DomEvent::Change(target) => {
                if let Some(form) = &self.form {
                    form.on_change(page, target, &mut reaction);
                }
            }
            DomEvent::Submit => {
                if let Some(form) = &self.form {
                    form.on_submit(page, &mut reaction);
                }
            }
            DomEvent::ClickTab(target) => {
                if let Some(tabs) = &self.tabs {
                    tabs.activate(page, target, &mut reaction);
                }
            }
            DomEvent::ClickPrint => results::on_print(page, &mut reaction),
        }

        if !reaction.default_prevented {
            match &event {
                DomEvent::Submit => {
                    if let Some(form) = page.form.as_mut() {
                        form.submitted = true;
                    }
                    info!(target: "page", "Form submitted");
                    notices.push(Notice::Submitted);
                }
                DomEvent::ClickTab(target) => page.location_hash = Some(target.clone()),
                _ => {}
            }
        }

        self.apply(page, reaction, notices);
    }

    fn apply(&mut self, page: &mut Page, reaction: Reaction, notices: &mut Vec<Notice>) {
        for effect in reaction.effects {
            match effect {
                Effect::Dispatch(event) => self.process(page, event, notices),
                Effect::Schedule { key, delay, action } => {
                    let page = self.page.clone();
                    self.scheduler.schedule(key, delay, run_deferred(page, action));
                }
                Effect::Alert(message) => {
                    self.toolkit.alert(&message);
                    notices.push(Notice::Alert { message });
                }
                Effect::Print => {
                    self.toolkit.print();
                    notices.push(Notice::Printed);
                }
                Effect::AttachTooltip(element) => self.toolkit.attach_tooltip(&element),
                Effect::Notify(notice) => notices.push(notice),
            }
        }
    }
}

fn numeric_target(page: &Page, input: &str) -> Result<Target, String> {
    let target = page.resolve_input(input).ok_or_else(|| format!("Unknown input: {}", input))?;
    if page.input_value(&target).is_none() {
        return Err(format!("Input {} does not take typed values", input));
    }
    Ok(target)
}

/// Deferred work runs against whatever the page looks like when it fires.
async fn run_deferred(page: Arc<Mutex<Page>>, action: DeferredAction) {
    let mut page = page.lock().await;
    match action {
        DeferredAction::ScrollIntoView { element } => {
            if page.scroll_into_view(&element) {
                debug!(target: "page", %element, "Scrolled into view");
            } else {
                debug!(target: "page", %element, "Scroll target gone; skipped");
            }
        }
        DeferredAction::Reveal { element } => {
            if !page.reveal(&element) {
                debug!(target: "page", %element, "Reveal target gone; skipped");
            }
        }
    }
}
