//! Category impact bars on the results page.
//!
//! Rendering is a pure function of the bar's value: running it twice gives the same page.

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::ImpactBand;
use crate::page::Page;

/// Largest impact magnitude a category can reach, on either side.
pub const MAX_IMPACT: f64 = 5.0;

#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct ImpactStyle {
    /// Width in percent; 50 is neutral.
    pub width_percent: f64,
    pub band: ImpactBand,
}

/// Map a signed impact to its bar width and band (first match wins, 0 is unfavorable).
pub fn render_impact(value: f64) -> ImpactStyle {
    let v = value.clamp(-MAX_IMPACT, MAX_IMPACT);
    let band = if v <= -2.0 {
        ImpactBand::StronglyFavorable
    } else if v < 0.0 {
        ImpactBand::MildlyFavorable
    } else if v < 2.0 {
        ImpactBand::MildlyUnfavorable
    } else {
        ImpactBand::StronglyUnfavorable
    };
    ImpactStyle { width_percent: 50.0 + v / MAX_IMPACT * 50.0, band }
}

/// Style every impact bar on the page. Returns how many were rendered.
pub fn render_all(page: &mut Page) -> usize {
    let mut rendered = 0;
    for bar in &mut page.impact_bars {
        let value = match bar.value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                warn!(target: "page", category = %bar.category, value = %bar.value, "Impact bar value unparsable; skipped");
                continue;
            }
        };
        let style = render_impact(value);
        bar.width = Some(format!("{}%", style.width_percent));
        bar.class = Some(style.band.css_class());
        rendered += 1;
    }
    debug!(target: "page", rendered, "Impact bars rendered");
    rendered
}
