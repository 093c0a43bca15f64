//! Read-side views over a small hand-built factory.

use candyfab_core::{
    assistant::{Answer, Assistant, TextGenerator, UNREACHABLE_REPLY},
    catalog::{Catalog, FaultProfile},
    error::{FabError, FabResult},
    report,
    store::{AlarmRow, FactoryStore, ProductionRunRow, SensorRow},
    types::{DateRange, MachineId},
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::cell::RefCell;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).expect("valid date")
}

fn at(d: u32, h: u32) -> NaiveDateTime {
    day(d).and_hms_opt(h, 0, 0).expect("valid time")
}

fn may(from: u32, to: u32) -> DateRange {
    DateRange::new(day(from), day(to)).expect("ordered range")
}

struct Factory {
    store:  FactoryStore,
    gummy:  MachineId,
    sparks: MachineId,
    idle:   MachineId,
}

fn run(
    store: &FactoryStore,
    machine_id: MachineId,
    product_id: i64,
    d: u32,
    hours: i64,
    produced: i64,
    scrapped: i64,
) {
    store
        .insert_production_run(&ProductionRunRow {
            log_id: None,
            machine_id,
            product_id,
            start_time: at(d, 0),
            duration_hours: hours,
            produced_kg: produced,
            scrapped_kg: scrapped,
        })
        .unwrap();
}

fn alarm(
    store: &FactoryStore,
    machine_id: MachineId,
    fault: FaultProfile,
    start: NaiveDateTime,
    minutes: i64,
    vibration: f64,
) {
    let spec = fault.alarm();
    let alarm_id = store
        .insert_alarm(&AlarmRow {
            alarm_id: None,
            machine_id,
            code: spec.code.into(),
            description: spec.description.into(),
            start_time: start,
            end_time: start + Duration::minutes(minutes),
            duration_minutes: minutes,
        })
        .unwrap();
    store
        .insert_sensor_reading(&SensorRow {
            sensor_id: None,
            machine_id,
            sensor_type: "Vibration".into(),
            value: vibration,
            alarm_id: Some(alarm_id),
            timestamp: start,
        })
        .unwrap();
}

/// Two departments, three machines, two products.
fn factory() -> Factory {
    let store = FactoryStore::in_memory().unwrap();
    store.migrate().unwrap();
    let catalog = Catalog::standard();

    let mixing = store.insert_department("Mixing").unwrap();
    let packing = store.insert_department("Packing").unwrap();
    let gummy_product = store.insert_product(&catalog.products[0]).unwrap();
    let sparks_product = store.insert_product(&catalog.products[3]).unwrap();
    let gummy = store.insert_machine(mixing, "Machine_1_1").unwrap();
    let sparks = store.insert_machine(packing, "Machine_2_1").unwrap();
    let idle = store.insert_machine(packing, "Machine_2_2").unwrap();

    run(&store, gummy, gummy_product, 1, 10, 7_840, 160);
    run(&store, gummy, gummy_product, 2, 5, 3_960, 40);
    run(&store, sparks, sparks_product, 2, 10, 11_000, 1_000);
    // Outside the May 1..=3 window.
    run(&store, sparks, sparks_product, 4, 8, 9_000, 600);

    alarm(&store, gummy, FaultProfile::MotorOverload, at(1, 3), 30, 7.5);
    alarm(&store, gummy, FaultProfile::MotorOverload, at(2, 2), 30, 9.0);
    alarm(&store, sparks, FaultProfile::DustBlockage, at(2, 6), 120, 12.25);
    alarm(&store, sparks, FaultProfile::DustBlockage, at(4, 1), 45, 6.0);

    Factory {
        store,
        gummy,
        sparks,
        idle,
    }
}

#[test]
fn aggregates_respect_the_date_window() {
    let f = factory();
    let range = may(1, 3);

    let causes = f.store.top_alarm_causes(&range, 10).unwrap();
    assert_eq!(causes.len(), 2);
    assert_eq!(causes[0].name, "Motor overload (hard material)");
    assert_eq!(causes[0].total, 2);
    assert_eq!(causes[1].total, 1);

    let downtime = f.store.alarm_downtime_by_cause(&range, 10).unwrap();
    assert_eq!(downtime[0].name, "Photocell blocked (dust)");
    assert_eq!(downtime[0].total, 120);

    let by_product = f.store.production_by_product(&range, 10).unwrap();
    assert_eq!(by_product[0].name, "Chewy Gummy Men");
    assert_eq!(by_product[0].total, 11_800);
    assert_eq!(by_product[1].total, 11_000);

    let by_machine = f.store.production_by_machine(&range, 10).unwrap();
    assert_eq!(by_machine[0].name, "Machine_1_1");
    assert_eq!(by_machine[0].scrapped_kg, 200);
}

#[test]
fn last_day_of_window_is_inclusive() {
    let f = factory();
    assert_eq!(f.store.top_alarm_causes(&may(4, 4), 10).unwrap()[0].total, 1);
    assert!(f.store.top_alarm_causes(&may(5, 31), 10).unwrap().is_empty());
}

#[test]
fn alarm_report_lists_days_newest_first() {
    let f = factory();
    let view = report::alarm_report(&f.store, &may(1, 31)).unwrap();
    let days: Vec<_> = view.trend.iter().map(|d| (d.day, d.count)).collect();
    assert_eq!(days, vec![(day(4), 1), (day(2), 2), (day(1), 1)]);
    assert_eq!(view.total_alarms(), 4);
}

#[test]
fn oee_board_skips_idle_machines() {
    let f = factory();
    let board = report::oee_board(&f.store, &may(1, 3)).unwrap();
    assert_eq!(board.len(), 2);
    assert!(board.iter().all(|m| m.machine_id != f.idle));

    let gummy = board.iter().find(|m| m.machine_id == f.gummy).unwrap();
    assert_eq!(gummy.department, "Mixing");
    // 15 h = 900 min, 60 alarm minutes; 11 800 good of 12 000.
    let expected = 900.0 / 960.0 * (11_800.0 / 12_000.0) * 0.9 * 100.0;
    assert!((gummy.figures.oee - expected).abs() < 1e-9);
}

#[test]
fn machine_detail_joins_readings_and_rejects_unknown_ids() {
    let f = factory();
    let detail = report::machine_detail(&f.store, f.sparks, &may(1, 31)).unwrap();
    assert_eq!(detail.name, "Machine_2_1");
    assert_eq!(detail.readings.len(), 2);
    assert_eq!(detail.readings[0].start_time, at(4, 1));
    assert_eq!(detail.readings[1].value, 12.25);

    assert!(matches!(
        report::machine_detail(&f.store, 999, &may(1, 31)),
        Err(FabError::UnknownMachine { machine_id: 999 })
    ));
}

#[test]
fn machine_directory_names_departments() {
    let f = factory();
    let directory = f.store.machine_directory().unwrap();
    assert_eq!(directory.len(), 3);
    assert_eq!(directory[2].department, "Packing");
}

// ── Assistant ──────────────────────────────────────────────────────

/// Records prompts and replies with a canned answer.
#[derive(Default)]
struct Scripted {
    prompts: RefCell<Vec<String>>,
}

impl TextGenerator for Scripted {
    fn generate(&self, prompt: &str) -> FabResult<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        Ok("Line 2 needs attention.".into())
    }
}

struct Offline;

impl TextGenerator for Offline {
    fn generate(&self, _prompt: &str) -> FabResult<String> {
        Err(FabError::Config("connection refused".into()))
    }
}

#[test]
fn ranking_question_is_answered_with_a_table() {
    let f = factory();
    let generator = Scripted::default();
    let assistant = Assistant::new(&f.store, &generator);

    let answer = assistant.ask("What are the most common alarms?", &may(1, 3)).unwrap();
    let Answer::Table { title, table } = answer else {
        panic!("expected a table");
    };
    assert_eq!(title, "Top alarm causes");
    assert_eq!(table.rows[0], vec!["Motor overload (hard material)".to_string(), "2".into()]);
    assert!(generator.prompts.borrow().is_empty());
}

#[test]
fn narrative_prompt_carries_requested_context() {
    let f = factory();
    let generator = Scripted::default();
    let assistant = Assistant::new(&f.store, &generator);

    let answer = assistant.ask("How is scrap in Packing?", &may(1, 3)).unwrap();
    assert_eq!(answer, Answer::Text { text: "Line 2 needs attention.".into() });

    let prompts = generator.prompts.borrow();
    let prompt = &prompts[0];
    assert!(prompt.contains("MACHINE LIST:"));
    assert!(prompt.contains("PRODUCTION DATA (kg):"));
    assert!(prompt.contains("TOP ALARMS:"));
    assert!(prompt.contains("Question: How is scrap in Packing?"));
    assert!(prompt.contains("Machine_2_2"));
}

#[test]
fn plain_question_gets_only_alarm_context() {
    let f = factory();
    let generator = Scripted::default();
    let assistant = Assistant::new(&f.store, &generator);

    assistant.ask("Give me a status update", &may(1, 3)).unwrap();
    let prompts = generator.prompts.borrow();
    let prompt = &prompts[0];
    assert!(!prompt.contains("MACHINE LIST:"));
    assert!(!prompt.contains("PRODUCTION DATA"));
    assert!(prompt.contains("TOP ALARMS:"));
}

#[test]
fn generator_failure_becomes_a_fixed_reply() {
    let f = factory();
    let assistant = Assistant::new(&f.store, &Offline);
    let answer = assistant.ask("Give me a status update", &may(1, 3)).unwrap();
    assert_eq!(answer, Answer::Text { text: UNREACHABLE_REPLY.into() });
}

#[test]
fn machine_analysis_uses_latest_readings_or_says_none() {
    let f = factory();
    let generator = Scripted::default();
    let assistant = Assistant::new(&f.store, &generator);

    assistant.analyse_machine(f.gummy, "Why?", &may(1, 31)).unwrap();
    assistant.analyse_machine(f.idle, "Why?", &may(1, 31)).unwrap();

    let prompts = generator.prompts.borrow();
    assert!(prompts[0].starts_with("Analyse Machine_1_1."));
    assert!(prompts[0].contains("Motor overload"));
    assert!(prompts[1].contains("No alarms."));

    assert!(matches!(
        assistant.analyse_machine(404, "Why?", &may(1, 31)),
        Err(FabError::UnknownMachine { machine_id: 404 })
    ));
}
