use std::collections::HashSet;

use pretty_assertions::assert_eq;
use uuid::Uuid;

use hrms_be::database::models::{DayStatusKind, HalfDayPeriod, LeaveType};
use hrms_be::services::date_rules::select_active_rule;
use hrms_be::services::day_status::{classify, summarize};
use hrms_be::services::duration::{calculate, half_day_amount, DurationOptions};
use hrms_be::services::overlap::ranges_overlap;

mod common;
use common::{approved_leave, custom_rule, date, half_day_request, holiday_on, standard_rule};

#[test]
fn weekend_always_wins_over_holiday() {
    // 2025-06-07 is a Saturday and also a configured holiday.
    let d = date(2025, 6, 7);
    let holiday = holiday_on(d, "Midsummer");
    let status = classify(d, &standard_rule(), Some(&holiday), None);

    assert_eq!(status.status, DayStatusKind::Weekend);
    assert!(!status.attendance_required);
}

#[test]
fn holiday_wins_over_approved_leave_for_the_same_employee() {
    let employee = Uuid::new_v4();
    let d = date(2025, 12, 25);
    let holiday = holiday_on(d, "Christmas Day");
    let leave = approved_leave(employee, date(2025, 12, 22), date(2025, 12, 31), LeaveType::Annual);

    let status = classify(d, &standard_rule(), Some(&holiday), Some(&leave));
    assert_eq!(status.status, DayStatusKind::Holiday);
    assert_eq!(status.detail.as_deref(), Some("Christmas Day"));
}

#[test]
fn saturday_under_a_sat_sun_rule_is_weekend_regardless_of_other_data() {
    // Scenario: 2026-01-03 falls on a Saturday.
    let rule = custom_rule(
        "Five-day week",
        date(2026, 1, 1),
        None,
        vec![1, 2, 3, 4, 5],
        vec![0, 6],
        false,
    );
    let d = date(2026, 1, 3);
    let holiday = holiday_on(d, "New Year Holiday");
    let leave = approved_leave(Uuid::new_v4(), d, d, LeaveType::Personal);

    let status = classify(d, &rule, Some(&holiday), Some(&leave));
    assert_eq!(status.status, DayStatusKind::Weekend);
    assert_eq!(status.day_of_week, 6);
    assert_eq!(status.day_name, "Saturday");
}

#[test]
fn friday_saturday_weekend_rule_makes_sunday_a_working_day() {
    let rule = custom_rule(
        "Gulf week",
        date(2025, 1, 1),
        None,
        vec![0, 1, 2, 3, 4],
        vec![5, 6],
        false,
    );

    // 2025-06-08 is a Sunday, 2025-06-06 a Friday.
    let sunday = classify(date(2025, 6, 8), &rule, None, None);
    assert_eq!(sunday.status, DayStatusKind::Working);
    assert!(sunday.attendance_required);

    let friday = classify(date(2025, 6, 6), &rule, None, None);
    assert_eq!(friday.status, DayStatusKind::Weekend);
}

#[test]
fn past_dates_keep_the_rule_that_governed_them() {
    // The Gulf-week rule expired at the end of 2024; the current default is
    // a Sat/Sun weekend. A 2024 Friday must still resolve as weekend.
    let rules = vec![
        custom_rule(
            "Gulf week",
            date(2024, 1, 1),
            Some(date(2024, 12, 31)),
            vec![0, 1, 2, 3, 4],
            vec![5, 6],
            false,
        ),
        custom_rule(
            "Standard week",
            date(2025, 1, 1),
            None,
            vec![1, 2, 3, 4, 5],
            vec![0, 6],
            true,
        ),
    ];

    // 2024-06-07 was a Friday.
    let old = select_active_rule(&rules, date(2024, 6, 7));
    assert_eq!(old.name, "Gulf week");
    assert!(old.is_weekend_date(date(2024, 6, 7)));

    // 2025-06-06, also a Friday, falls under the new rule and is working.
    let new = select_active_rule(&rules, date(2025, 6, 6));
    assert_eq!(new.name, "Standard week");
    assert!(new.is_working_date(date(2025, 6, 6)));
}

#[test]
fn duration_partition_follows_the_rule_in_force_per_date() {
    // Weekend definition flips mid-range: Sat/Sun until June 30th, Fri/Sat
    // from July 1st.
    let rules = vec![
        custom_rule(
            "First half",
            date(2025, 1, 1),
            Some(date(2025, 6, 30)),
            vec![1, 2, 3, 4, 5],
            vec![0, 6],
            false,
        ),
        custom_rule(
            "Second half",
            date(2025, 7, 1),
            None,
            vec![0, 1, 2, 3, 4],
            vec![5, 6],
            false,
        ),
    ];
    let is_weekend =
        |d| select_active_rule(&rules, d).is_weekend_date(d);

    // Sat Jun 28 .. Fri Jul 4: Sat 28 + Sun 29 weekend under the old rule,
    // Fri Jul 4 weekend under the new one.
    let duration = calculate(
        date(2025, 6, 28),
        date(2025, 7, 4),
        DurationOptions {
            exclude_weekends: true,
            ..Default::default()
        },
        is_weekend,
        &HashSet::new(),
    )
    .unwrap();

    assert_eq!(duration.total_days, common::days(7));
    assert_eq!(duration.weekend_days, common::days(3));
    assert_eq!(duration.working_days, common::days(4));
}

#[test]
fn half_day_duration_and_attendance_label() {
    let employee = Uuid::new_v4();
    let request = half_day_request(
        employee,
        date(2025, 3, 10),
        LeaveType::Sick,
        HalfDayPeriod::Morning,
    );

    let duration = calculate(
        request.start_date,
        request.end_date,
        DurationOptions::calendar(true),
        |_| false,
        &HashSet::new(),
    )
    .unwrap();
    assert_eq!(duration.total_days, half_day_amount());

    let reason = request.attendance_reason();
    assert!(reason.contains("Half day (morning half)"), "got: {reason}");
    assert!(reason.starts_with("Sick leave"));
}

#[test]
fn full_day_attendance_label_is_the_plain_type_label() {
    let request = approved_leave(
        Uuid::new_v4(),
        date(2025, 3, 10),
        date(2025, 3, 12),
        LeaveType::Emergency,
    );
    assert_eq!(request.attendance_reason(), "Emergency leave");
}

#[test]
fn monthly_summary_counts_match_the_day_walk() {
    let rule = standard_rule();
    let employee = Uuid::new_v4();
    let holiday = holiday_on(date(2025, 9, 1), "Labor Day");
    let leave = approved_leave(employee, date(2025, 9, 2), date(2025, 9, 3), LeaveType::Annual);

    let statuses: Vec<_> = date(2025, 9, 1)
        .iter_days()
        .take_while(|d| *d <= date(2025, 9, 30))
        .map(|d| {
            let h = (d == holiday.date).then_some(&holiday);
            let l = (leave.start_date <= d && d <= leave.end_date).then_some(&leave);
            classify(d, &rule, h, l)
        })
        .collect();

    let summary = summarize(2025, 9, &statuses);
    assert_eq!(summary.total_days, 30);
    assert_eq!(summary.weekend_days, 8);
    assert_eq!(summary.holiday_days, 1);
    assert_eq!(summary.leave_days, 2);
    assert_eq!(summary.working_days, 19);
    assert_eq!(summary.attendance_required_days, 19);
}

#[test]
fn overlap_predicate_is_symmetric() {
    let a = (date(2025, 3, 10), date(2025, 3, 14));
    let b = (date(2025, 3, 13), date(2025, 3, 20));

    assert!(ranges_overlap(a.0, a.1, b.0, b.1));
    assert!(ranges_overlap(b.0, b.1, a.0, a.1));

    let c = (date(2025, 4, 1), date(2025, 4, 2));
    assert!(!ranges_overlap(a.0, a.1, c.0, c.1));
    assert!(!ranges_overlap(c.0, c.1, a.0, a.1));
}
