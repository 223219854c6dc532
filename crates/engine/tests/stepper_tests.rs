use codeviz_common::{ExecutionStep, Trace};
use codeviz_engine::{StepperState, SteppingController};
use tracing::info;

fn table_trace() -> Trace {
    vec![
        ExecutionStep::new(1, "Code initialization").with_variable("n", "3", "int"),
        ExecutionStep::new(4, "First iteration of outer loop")
            .with_variable("n", "3", "int")
            .with_variable("i", "1", "int")
            .with_output("Table of 1:"),
        ExecutionStep::new(6, "Inner loop calculation")
            .with_variable("i", "1", "int")
            .with_variable("j", "1", "int")
            .with_output("1 x 1 = 1"),
    ]
    .into()
}

#[test]
fn test_walkthrough() {
    codeviz_common::logging::ensure_test_logging(None);
    info!("Running test");
    let mut stepper = SteppingController::new();
    assert_eq!(stepper.state(), StepperState::Empty);

    stepper.reset(table_trace());
    assert_eq!(stepper.position(), Some(0));

    stepper.next();
    stepper.next();
    stepper.next();
    assert_eq!(stepper.position(), Some(2));

    stepper.next();
    assert_eq!(stepper.position(), Some(2));
    assert_eq!(stepper.current_step().and_then(|s| s.output.as_deref()), Some("1 x 1 = 1"));

    stepper.reset(table_trace());
    stepper.previous();
    assert_eq!(stepper.position(), Some(0));
}

#[test]
fn test_reset_to_empty_trace() {
    codeviz_common::logging::ensure_test_logging(None);
    info!("Running test");
    let mut stepper = SteppingController::with_trace(table_trace());
    stepper.reset(Trace::new());
    assert_eq!(stepper.state(), StepperState::Empty);
    assert!(stepper.current_step().is_none());
}

#[test]
fn test_position_always_in_bounds() {
    codeviz_common::logging::ensure_test_logging(None);
    info!("Running test");
    let mut stepper = SteppingController::with_trace(table_trace());
    for round in 0..20 {
        if round % 3 == 0 {
            stepper.previous();
        } else {
            stepper.next();
        }
        let pos = stepper.position().unwrap();
        assert!(pos < stepper.len());
    }
}
