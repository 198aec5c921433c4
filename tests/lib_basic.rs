#![forbid(unsafe_code)]
use planning_garde::{
    calendar::{CalendarError, HolidayCalendar, HolidayOverrides},
    generate_schedule,
    model::{Nurse, WorkType},
    Cell, NurseRegistry, RuleSet, SchedError, Scheduler,
};

fn small_registry() -> NurseRegistry {
    let mut r = NurseRegistry::new();
    r.add(Nurse::new(1, "Alice", WorkType::FullRotation).with_charge()).unwrap();
    r.add(Nurse::new(2, "Bora", WorkType::FullRotation).with_charge()).unwrap();
    r.add(Nurse::new(3, "Chloé", WorkType::NightOnly).with_charge()).unwrap();
    r.add(Nurse::new(4, "Dami", WorkType::DayOnly)).unwrap();
    r.add(Nurse::new(5, "Eun", WorkType::EveningOnly)).unwrap();
    r
}

#[test]
fn create_and_generate_basic() {
    let registry = small_registry();
    let outcome = generate_schedule(&registry, 2025, 3, &HolidayOverrides::none()).unwrap();

    let table = &outcome.table;
    assert_eq!(table.days(), 31);
    assert_eq!(table.rows().len(), 5);
    for row in table.rows() {
        assert_eq!(row.cells().len(), 31);
    }
    assert!(table.rows().iter().any(|r| r.cells().iter().any(Cell::is_working)));
}

#[test]
fn rows_follow_priority_order() {
    let mut registry = NurseRegistry::new();
    registry.add(Nurse::new(30, "Late", WorkType::FullRotation).with_charge()).unwrap();
    registry.add(Nurse::new(10, "Early", WorkType::FullRotation).with_charge()).unwrap();
    registry.add(Nurse::new(20, "Middle", WorkType::FullRotation)).unwrap();

    let scheduler = Scheduler::new(RuleSet::default(), HolidayCalendar::new());
    let outcome = scheduler
        .generate(&registry, 2026, 2, &HolidayOverrides::none())
        .unwrap();
    let names: Vec<&str> = outcome.table.rows().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Early", "Middle", "Late"]);
    assert_eq!(outcome.table.header()[..4], ["employee_id", "name", "1", "2"]);
}

#[test]
fn single_charge_nurse_is_fatal() {
    let mut registry = NurseRegistry::new();
    registry.add(Nurse::new(1, "Solo", WorkType::FullRotation).with_charge()).unwrap();
    for i in 2..8 {
        registry.add(Nurse::new(i, format!("N{i}"), WorkType::FullRotation)).unwrap();
    }

    let err = generate_schedule(&registry, 2025, 3, &HolidayOverrides::none()).unwrap_err();
    assert_eq!(
        err,
        SchedError::InsufficientChargeNurses {
            found: 1,
            required: 2
        }
    );
}

#[test]
fn empty_roster_is_fatal() {
    let err = generate_schedule(&NurseRegistry::new(), 2025, 3, &HolidayOverrides::none()).unwrap_err();
    assert_eq!(err, SchedError::EmptyRoster);
}

#[test]
fn invalid_month_is_fatal() {
    let err = generate_schedule(&small_registry(), 2025, 13, &HolidayOverrides::none()).unwrap_err();
    assert_eq!(
        err,
        SchedError::Calendar(CalendarError::InvalidMonth {
            year: 2025,
            month: 13
        })
    );
}

#[test]
fn invalid_rules_are_fatal() {
    let rules = RuleSet {
        max_consecutive_days: 0,
        ..RuleSet::default()
    };
    let scheduler = Scheduler::new(rules, HolidayCalendar::new());
    let err = scheduler
        .generate(&small_registry(), 2025, 3, &HolidayOverrides::none())
        .unwrap_err();
    assert!(matches!(err, SchedError::InvalidRules(_)));
}
