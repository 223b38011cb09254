//! Questionnaire pages, headless.
//!
//! The questionnaire, results and comparison pages of the biological-age calculator, modelled as an
//! explicit document (`page::Page`) plus the components that react to user events on it:
//!   - `progress`: answered-question tally, progress bar, submit gate, submission check, auto-scroll
//!   - `bmi`: BMI computed from height and weight, written back as the BMI answer
//!   - `impact`: category impact bars
//!   - `tabs`: comparison tabs
//!   - `results`: entry animation and print trigger
//!
//! `session::PageSession` wires them to a page and drives events through them.

pub mod bmi;
pub mod config;
pub mod domain;
pub mod impact;
pub mod page;
pub mod progress;
pub mod protocol;
pub mod results;
pub mod scheduler;
pub mod seeds;
pub mod session;
pub mod tabs;
pub mod telemetry;
pub mod util;
