use chrono::{Days, NaiveDate, Weekday};
use proptest::prelude::*;
use sprintboard_core::{
    CadenceRule, DateWindow, OccurrenceOverride, Task, TaskStatus, clear_from, generate,
};

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 11, 20).unwrap()
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..400).prop_map(|n| base() + Days::new(n))
}

fn arb_weekday() -> impl Strategy<Value = Weekday> {
    (0u8..7).prop_map(|n| Weekday::try_from(n).unwrap())
}

fn arb_rule() -> impl Strategy<Value = CadenceRule> {
    prop_oneof![
        Just(CadenceRule::daily()),
        prop::collection::vec(arb_weekday(), 0..4).prop_map(CadenceRule::weekly),
        (-1i64..10, arb_date()).prop_map(|(n, anchor)| CadenceRule::every_n_days(n, anchor)),
    ]
}

fn arb_task() -> impl Strategy<Value = Task> {
    (arb_rule(), prop::collection::vec(arb_date(), 0..6)).prop_map(|(rule, dates)| {
        let mut t = Task::new("p", "prop").with_status(TaskStatus::Todo).with_cadence(rule);
        for date in dates {
            t.overrides.set(date, OccurrenceOverride::edited(Some(TaskStatus::Done), None));
        }
        t
    })
}

fn arb_window() -> impl Strategy<Value = DateWindow> {
    (arb_date(), 0u64..60).prop_map(|(start, len)| DateWindow::new(start, start + Days::new(len)).unwrap())
}

proptest! {
    #[test]
    fn generate_is_deterministic(task in arb_task(), w in arb_window()) {
        prop_assert_eq!(generate(&task, &w), generate(&task, &w));
    }

    #[test]
    fn generated_dates_ascend_within_window(task in arb_task(), w in arb_window()) {
        let out = generate(&task, &w);
        for pair in out.windows(2) {
            prop_assert!(pair[0].date() < pair[1].date());
        }
        for i in &out {
            prop_assert!(w.contains(i.date()));
            prop_assert!(task.cadence.as_ref().unwrap().occurs_on(i.date()));
        }
    }

    #[test]
    fn clear_from_keeps_only_earlier(task in arb_task(), from in arb_date()) {
        let kept = clear_from(&task.overrides, Some(from));
        prop_assert!(kept.dates().all(|d| d < from));
        let expected = task.overrides.dates().filter(|d| *d < from).count();
        prop_assert_eq!(kept.len(), expected);
    }
}
