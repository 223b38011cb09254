//! Comparison tabs: exclusive selection over (tab, panel) pairs sharing a target key.

use tracing::{info, instrument, warn};

use crate::page::{panel_id, Page};
use crate::protocol::{Effect, Notice, Reaction};

#[derive(Clone, Debug, Default)]
pub struct TabSwitcher;

impl TabSwitcher {
    pub fn attach(page: &Page) -> Option<Self> {
        (!page.tabs.is_empty()).then_some(TabSwitcher)
    }

    /// Click on a tab: it becomes the only active tab and its panel the only visible one.
    /// The click's native navigation is always cancelled.
    #[instrument(level = "info", skip(self, page, reaction))]
    pub fn activate(&self, page: &mut Page, target: &str, reaction: &mut Reaction) {
        reaction.prevent_default();
        if !page.tabs.iter().any(|t| t.target == target) {
            warn!(target: "page", %target, "No tab for target; ignoring click");
            return;
        }

        for tab in &mut page.tabs {
            tab.active = tab.target == target;
        }
        let id = panel_id(target);
        for panel in &mut page.panels {
            panel.hidden = panel.id != id;
        }
        info!(target: "page", %target, "Tab activated");
        reaction.push(Effect::Notify(Notice::TabActivated { target: target.to_string() }));
    }
}
