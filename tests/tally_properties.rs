use proptest::collection::vec;
use proptest::prelude::*;

use questionnaire_page::config::PageConfig;
use questionnaire_page::domain::ButtonStyle;
use questionnaire_page::page::Page;
use questionnaire_page::progress::FormProgressController;
use questionnaire_page::protocol::Target;

/// Form whose even-indexed questions are single-choice and odd ones numeric.
fn mixed_form(n: usize) -> Page {
    let mut src = String::from("[form]\n");
    for i in 0..n {
        if i % 2 == 0 {
            src.push_str(&format!(
                "[[form.questions]]\nid = \"q{i}\"\ntype = \"choice\"\noptions = [{{ value = \"a\" }}, {{ value = \"b\" }}]\n"
            ));
        } else {
            src.push_str(&format!("[[form.questions]]\nid = \"q{i}\"\ntype = \"number\"\n"));
        }
    }
    Page::render(&PageConfig::from_toml_str(&src).unwrap()).unwrap()
}

fn answer(page: &mut Page, i: usize) {
    let id = format!("q{i}");
    if i % 2 == 0 {
        assert!(page.check_option(&id, "b"));
    } else {
        assert!(page.set_input_value(&Target::Question(id), "12.5"));
    }
}

fn answered_plan() -> impl Strategy<Value = (usize, Vec<usize>)> {
    (1usize..16).prop_flat_map(|n| {
        (Just(n), vec(any::<bool>(), n)).prop_flat_map(|(n, mask)| {
            let chosen: Vec<usize> = (0..n).filter(|i| mask[*i]).collect();
            (Just(n), Just(chosen).prop_shuffle())
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn tally_matches_the_answered_subset_in_any_order((n, order) in answered_plan()) {
        let mut page = mixed_form(n);
        let ctl = FormProgressController::attach(&page).unwrap();
        prop_assert_eq!(ctl.total(), n);

        for (step, i) in order.iter().enumerate() {
            answer(&mut page, *i);
            let state = ctl.update_progress(&mut page);
            prop_assert_eq!(state.answered, step + 1);

            // the gate follows the tally after every single change
            let submit = page.form.as_ref().unwrap().submit.clone().unwrap();
            prop_assert_eq!(submit.disabled, state.answered != n);
            prop_assert_eq!(submit.style == ButtonStyle::Primary, state.answered == n);
            prop_assert!(state.percent() <= 100);
        }
        prop_assert_eq!(ctl.count_answered(&page), order.len());
    }

    #[test]
    fn re_answering_does_not_inflate_the_tally(n in 1usize..10, repeats in 1usize..4) {
        let mut page = mixed_form(n);
        let ctl = FormProgressController::attach(&page).unwrap();
        for _ in 0..repeats {
            answer(&mut page, 0);
        }
        prop_assert_eq!(ctl.count_answered(&page), 1);
    }
}
