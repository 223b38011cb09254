//! Results view: staggered entry animation and the print trigger.

use std::time::Duration;

use tracing::{debug, info};

use crate::page::Page;
use crate::protocol::{DeferredAction, Effect, Reaction};
use crate::scheduler::TaskKey;

/// Gap between consecutive reveals.
pub const REVEAL_STEP: Duration = Duration::from_millis(100);

/// Schedule the fade-in of every animated element, `REVEAL_STEP * index` apart.
pub fn schedule_entry_animation(page: &Page, reaction: &mut Reaction) {
    let Some(results) = page.results.as_ref() else { return };
    for (index, el) in results.animated.iter().enumerate() {
        reaction.push(Effect::Schedule {
            key: TaskKey::Reveal(el.id.clone()),
            delay: REVEAL_STEP * index as u32,
            action: DeferredAction::Reveal { element: el.id.clone() },
        });
    }
    debug!(target: "page", elements = results.animated.len(), "Entry animation scheduled");
}

/// Click on the print trigger. No-op when the page has none.
pub fn on_print(page: &Page, reaction: &mut Reaction) {
    if page.print_trigger {
        info!(target: "page", "Print requested");
        reaction.push(Effect::Print);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;

    #[test]
    fn reveals_are_staggered_in_document_order() {
        let cfg = PageConfig::from_toml_str(
            r#"
            [results]
            animated = ["summary", "chart", "tips"]
            "#,
        )
        .unwrap();
        let page = Page::render(&cfg).unwrap();
        let mut r = Reaction::default();
        schedule_entry_animation(&page, &mut r);

        let plan: Vec<_> = r
            .effects
            .iter()
            .map(|e| match e {
                Effect::Schedule { key: TaskKey::Reveal(id), delay, .. } => (id.as_str(), delay.as_millis()),
                other => panic!("unexpected effect {other:?}"),
            })
            .collect();
        assert_eq!(plan, [("summary", 0), ("chart", 100), ("tips", 200)]);
    }

    #[test]
    fn no_results_container_no_animation() {
        let page = Page::render(&PageConfig::default()).unwrap();
        let mut r = Reaction::default();
        schedule_entry_animation(&page, &mut r);
        assert!(r.effects.is_empty());
    }

    #[test]
    fn print_needs_a_trigger() {
        let mut page = Page::render(&PageConfig::default()).unwrap();
        let mut r = Reaction::default();
        on_print(&page, &mut r);
        assert!(r.effects.is_empty());

        page.print_trigger = true;
        on_print(&page, &mut r);
        assert!(matches!(r.effects.as_slice(), [Effect::Print]));
    }
}
