use std::io::Write;

use stride::kernel::exercise::{CompletionDriver, Equipment, ExerciseId, ExerciseSpec};
use stride::kernel::lifecycle::Phase;
use stride::kernel::scheduler::Signal;
use stride::kernel::state::SessionSnapshot;
use stride::plan::{ExerciseSupplier, PlanFollower, PlanStep, WorkoutPlan};
use stride::SessionConfig;

fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("stride-{}-{}", std::process::id(), name));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn test_plan_parses_with_defaults() {
    let path = temp_file(
        "plan.json",
        r#"{
            "name": "Legs",
            "exercises": [
                { "id": "wall-sit", "duration_secs": 45 },
                { "id": "goblet-squat", "name": "Goblet squat", "sets": 4,
                  "rest_secs": 90, "weight": 20.0, "equipment": "kettlebell" }
            ]
        }"#,
    );
    let plan = WorkoutPlan::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(plan.name, "Legs");
    let wall_sit = &plan.exercises[0];
    assert_eq!(wall_sit.driver(), CompletionDriver::Timer);
    assert_eq!(wall_sit.sets, 1);
    assert_eq!(wall_sit.equipment, Equipment::Bodyweight);
    assert_eq!(wall_sit.label(), "wall-sit");

    let squat = &plan.exercises[1];
    assert_eq!(squat.driver(), CompletionDriver::Sets);
    assert_eq!(squat.equipment, Equipment::Kettlebell);
    assert_eq!(squat.label(), "Goblet squat");
}

#[test]
fn test_empty_plan_is_rejected() {
    let path = temp_file("empty.json", r#"{ "exercises": [] }"#);
    let result = WorkoutPlan::load(&path);
    std::fs::remove_file(&path).ok();
    assert!(result.is_err());
}

#[test]
fn test_supplier_walks_the_plan_once() {
    let mut plan = WorkoutPlan::new(
        "pair",
        vec![ExerciseSpec::timed("plank", 30), ExerciseSpec::reps("rows", 3)],
    );
    assert_eq!(plan.current().unwrap().id.0, "plank");
    assert_eq!(plan.advance().unwrap().id.0, "rows");
    assert!(plan.advance().is_none());
    assert!(plan.current().is_none());
}

#[test]
fn test_zero_duration_is_rep_based() {
    let spec = ExerciseSpec {
        duration_secs: Some(0),
        ..ExerciseSpec::reps("curl", 3)
    };
    assert_eq!(spec.driver(), CompletionDriver::Sets);
}

#[test]
fn test_partial_config_keeps_defaults() {
    let path = temp_file("config.json", r#"{ "struggle": { "threshold": 120.0 }, "frame_len": 512 }"#);
    let config = SessionConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.struggle.threshold, 120.0);
    assert_eq!(config.struggle.release_threshold, None);
    assert_eq!(config.frame_len, 512);
    assert_eq!(config.clock_period_ms, 1000);
    assert_eq!(config, SessionConfig { struggle: config.struggle, frame_len: 512, ..SessionConfig::default() });
}

fn circuit() -> PlanFollower<WorkoutPlan> {
    PlanFollower::new(WorkoutPlan::new(
        "circuit",
        vec![
            ExerciseSpec::timed("plank", 30),
            ExerciseSpec::reps("rows", 3),
            ExerciseSpec::timed("wall-sit", 45),
        ],
    ))
}

fn state(id: &str, phase: Phase) -> Signal {
    Signal::State(SessionSnapshot {
        exercise: Some(ExerciseId::new(id)),
        phase,
        ..SessionSnapshot::default()
    })
}

fn done(id: &str) -> Signal {
    Signal::ExerciseCompleted(ExerciseId::new(id))
}

fn loaded(step: Option<PlanStep>) -> Option<String> {
    match step {
        Some(PlanStep::Load(spec)) | Some(PlanStep::Skip(Some(spec))) => Some(spec.id.0),
        _ => None,
    }
}

#[test]
fn test_follower_advances_once_per_completion() {
    let mut follower = circuit();
    assert_eq!(follower.current().unwrap().id.0, "plank");

    assert_eq!(follower.observe(&state("plank", Phase::Running)), None);
    assert_eq!(loaded(follower.observe(&done("plank"))).as_deref(), Some("rows"));
    assert_eq!(follower.observe(&state("plank", Phase::Completed)), None);
    assert_eq!(follower.current().unwrap().id.0, "rows");
}

#[test]
fn test_skip_only_taken_on_an_active_exercise() {
    let mut follower = circuit();
    // Nothing running yet.
    assert_eq!(follower.skip(), None);

    follower.observe(&state("plank", Phase::Paused));
    assert_eq!(loaded(follower.skip()).as_deref(), Some("rows"));
    assert_eq!(follower.current().unwrap().id.0, "rows");
}

#[test]
fn test_skip_dropped_by_a_racing_completion_does_not_lose_an_exercise() {
    let mut follower = circuit();
    follower.observe(&state("plank", Phase::Running));

    // The skip is decided while plank is still shown as running...
    assert_eq!(loaded(follower.skip()).as_deref(), Some("rows"));
    // ...but the session had already completed plank and ignored it.
    assert_eq!(loaded(follower.observe(&done("plank"))).as_deref(), Some("rows"));
    assert_eq!(follower.current().unwrap().id.0, "rows");
}

#[test]
fn test_skip_after_the_plan_finished_is_ignored() {
    let mut follower = PlanFollower::new(WorkoutPlan::new(
        "single",
        vec![ExerciseSpec::reps("rows", 3)],
    ));
    follower.observe(&state("rows", Phase::Running));
    assert_eq!(follower.observe(&done("rows")), Some(PlanStep::Finished));
    follower.observe(&state("rows", Phase::Completed));

    assert_eq!(follower.skip(), None);
    assert_eq!(follower.skip(), None);
    assert!(follower.current().is_none());
}

#[test]
fn test_skip_past_the_last_exercise_asks_for_idle() {
    let mut follower = PlanFollower::new(WorkoutPlan::new(
        "single",
        vec![ExerciseSpec::reps("rows", 3)],
    ));
    follower.observe(&state("rows", Phase::Running));
    assert_eq!(follower.skip(), Some(PlanStep::Skip(None)));
}
