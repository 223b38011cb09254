//! BMI helper: derives the BMI question's answer from the height and weight fields.
//!
//! The bridge writes one way only. It checks the matching option and dispatches a synthetic `change`
//! on the BMI question, so progress, the submit gate and navigation assist react exactly as if the
//! user had clicked the option.

use tracing::{debug, instrument, warn};

use crate::config::BmiHelperCfg;
use crate::domain::BmiCategory;
use crate::page::Page;
use crate::protocol::{DomEvent, Effect, Notice, Reaction, Target};
use crate::util::{format_one_decimal, parse_positive};

/// `weight / (height_m)^2` with height in centimetres. None unless both are positive.
pub fn bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if !(weight_kg > 0.0 && height_cm > 0.0) {
        return None;
    }
    let height_m = height_cm / 100.0;
    Some(weight_kg / (height_m * height_m))
}

/// Half-open thresholds: <18.5, [18.5,25), [25,30), [30,35), [35,40), >=40.
pub fn classify(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else if bmi < 35.0 {
        BmiCategory::Obese1
    } else if bmi < 40.0 {
        BmiCategory::Obese2
    } else {
        BmiCategory::Obese3
    }
}

#[derive(Clone, Debug)]
pub struct BmiBridge {
    question: String,
    height_field: String,
    weight_field: String,
}

impl BmiBridge {
    /// Attach when the height field, the weight field and the result slot are all on the page.
    pub fn attach(page: &Page, cfg: &BmiHelperCfg) -> Option<Self> {
        let present = page.fields.contains_key(&cfg.height_field)
            && page.fields.contains_key(&cfg.weight_field)
            && page.bmi_result.as_ref().is_some_and(|slot| slot.id == cfg.result);
        if !present {
            return None;
        }
        Some(Self {
            question: cfg.question.clone(),
            height_field: cfg.height_field.clone(),
            weight_field: cfg.weight_field.clone(),
        })
    }

    pub fn listens_to(&self, target: &Target) -> bool {
        matches!(target, Target::Field(name) if *name == self.height_field || *name == self.weight_field)
    }

    /// `input` on height or weight: recompute; leave everything untouched on unusable values.
    #[instrument(level = "debug", skip(self, page, reaction))]
    pub fn on_input(&self, page: &mut Page, target: &Target, reaction: &mut Reaction) {
        if !self.listens_to(target) {
            return;
        }
        let height = self.read(page, &self.height_field);
        let weight = self.read(page, &self.weight_field);
        let Some(value) = height.zip(weight).and_then(|(h, w)| bmi(w, h)) else {
            debug!(target: "questionnaire", "BMI inputs incomplete; keeping previous value");
            return;
        };

        let shown = format_one_decimal(value);
        let category = classify(value);
        if let Some(slot) = page.bmi_result.as_mut() {
            slot.text = shown.clone();
        }
        reaction.push(Effect::Notify(Notice::Bmi { value: shown, category }));

        if page.check_option(&self.question, category.as_value()) {
            reaction.push(Effect::Dispatch(DomEvent::Change(Target::Question(self.question.clone()))));
        } else {
            warn!(target: "questionnaire", question = %self.question, option = category.as_value(), "BMI option not found");
        }
    }

    fn read(&self, page: &Page, field: &str) -> Option<f64> {
        page.fields.get(field).and_then(|f| parse_positive(&f.value))
    }
}
