//! Public protocol structs: user actions in, notices out (serde ready), plus the internal event and
//! effect types the page components exchange with the session.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::BmiCategory;
use crate::page::Page;
use crate::scheduler::TaskKey;

/// Actions a user (or a replayed script) performs on the page. One JSON object per line.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserAction {
    /// Type into an input: sets its value and fires `input`.
    Type { input: String, value: String },
    /// Leave an input: fires `change`.
    Commit { input: String },
    /// Type then leave.
    Fill { input: String, value: String },
    /// Click a radio option of a single-choice question.
    Choose { question: String, value: String },
    Submit,
    ClickTab { target: String },
    Print,
    /// Let time pass before the next action.
    Wait { ms: u64 },
    Snapshot,
}

/// Which input an event targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Target {
    /// The input (or radio group) of a question card, named by the question id.
    Question(String),
    /// A free-standing numeric input such as the BMI helper's height field.
    Field(String),
}

impl Target {
    pub fn id(&self) -> &str {
        match self {
            Target::Question(id) | Target::Field(id) => id,
        }
    }
}

/// Events as listeners observe them.
#[derive(Debug, Clone, PartialEq)]
pub enum DomEvent {
    Input(Target),
    Change(Target),
    Submit,
    ClickTab(String),
    ClickPrint,
}

/// Work a component asks to run later against the page.
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredAction {
    ScrollIntoView { element: String },
    Reveal { element: String },
}

/// Side effects a listener requests; the session carries them out after the listener returns.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Synthetic event, delivered before the current dispatch completes.
    Dispatch(DomEvent),
    Schedule {
        key: TaskKey,
        delay: Duration,
        action: DeferredAction,
    },
    Alert(String),
    Print,
    AttachTooltip(String),
    Notify(Notice),
}

/// What the listeners of one event asked for.
#[derive(Debug, Default)]
pub struct Reaction {
    pub effects: Vec<Effect>,
    pub default_prevented: bool,
}

impl Reaction {
    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

/// Messages the session reports back, one JSON object per line.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    Progress {
        answered: usize,
        total: usize,
        percent: u8,
        submit_enabled: bool,
    },
    Alert {
        message: String,
    },
    Submitted,
    Bmi {
        value: String,
        category: BmiCategory,
    },
    TabActivated {
        target: String,
    },
    Printed,
    Snapshot {
        page: Box<Page>,
    },
    Error {
        message: String,
    },
}
