mod common;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Receiver;
use tokio::time::{self, Instant};

use common::{MemoryRecorder, ScriptedSource};
use stride::audio::AudioSource;
use stride::error::SessionError;
use stride::kernel::audio::monitor::StruggleEdge;
use stride::kernel::exercise::{ExerciseId, ExerciseSpec};
use stride::kernel::lifecycle::Phase;
use stride::kernel::scheduler::Signal;
use stride::summary::Biometrics;
use stride::{SessionConfig, SessionRuntime};

/// Collects signals, stamped with their arrival time, up to and including the
/// first one matching `done`.
async fn recv_until(
    signals: &mut Receiver<Signal>,
    mut done: impl FnMut(&Signal) -> bool,
) -> Vec<(Instant, Signal)> {
    let mut seen = Vec::new();
    loop {
        let signal = time::timeout(Duration::from_secs(300), signals.recv())
            .await
            .expect("timed out waiting for signal")
            .expect("signal channel closed");
        let finished = done(&signal);
        seen.push((Instant::now(), signal));
        if finished {
            return seen;
        }
    }
}

fn remaining_of(signal: &Signal) -> Option<Option<u32>> {
    match signal {
        Signal::State(state) => Some(state.remaining_seconds),
        _ => None,
    }
}

fn completed(signal: &Signal) -> bool {
    matches!(signal, Signal::ExerciseCompleted(_))
}

#[tokio::test(start_paused = true)]
async fn test_timed_exercise_counts_down_once_per_second() {
    let recorder = MemoryRecorder::default();
    let (handle, mut signals, _session) = SessionRuntime::spawn(
        SessionConfig::default(),
        Arc::new(ScriptedSource::silent()),
        Box::new(recorder),
    );

    let start = Instant::now();
    handle.load_exercise(ExerciseSpec::timed("plank", 3)).await.unwrap();
    let seen = recv_until(&mut signals, completed).await;

    let countdown: Vec<(u64, u32)> = seen
        .iter()
        .filter_map(|(at, signal)| match remaining_of(signal) {
            Some(Some(secs)) if secs < 3 => Some(((*at - start).as_secs(), secs)),
            _ => None,
        })
        .collect();
    assert_eq!(countdown, vec![(1, 2), (2, 1)]);

    let (finished_at, signal) = seen.last().unwrap();
    assert_eq!(signal, &Signal::ExerciseCompleted(ExerciseId::new("plank")));
    assert_eq!((*finished_at - start).as_secs(), 3);

    // Final snapshot follows the completion signal.
    let tail = recv_until(&mut signals, |s| matches!(s, Signal::State(_))).await;
    match &tail[0].1 {
        Signal::State(state) => {
            assert_eq!(state.remaining_seconds, Some(0));
            assert_eq!(state.phase, Phase::Completed);
        }
        other => panic!("expected state, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_pause_keeps_the_sub_second_phase() {
    let (handle, mut signals, _session) = SessionRuntime::spawn(
        SessionConfig::default(),
        Arc::new(ScriptedSource::silent()),
        Box::new(MemoryRecorder::default()),
    );

    handle.load_exercise(ExerciseSpec::timed("wall-sit", 5)).await.unwrap();
    time::sleep(Duration::from_millis(1500)).await;
    handle.toggle_pause().await.unwrap();

    let paused = recv_until(&mut signals, |s| matches!(s, Signal::State(st) if st.is_paused)).await;
    assert!(paused
        .iter()
        .any(|(_, s)| remaining_of(s) == Some(Some(4))));

    // A long pause grants no extra ticks.
    time::sleep(Duration::from_secs(10)).await;
    let resumed = Instant::now();
    handle.toggle_pause().await.unwrap();

    let seen = recv_until(&mut signals, |s| remaining_of(s) == Some(Some(3))).await;
    let (tick_at, _) = seen.last().unwrap();
    let gap = *tick_at - resumed;
    assert!(
        gap >= Duration::from_millis(450) && gap <= Duration::from_millis(550),
        "first tick after resume came {:?} later",
        gap
    );
    assert!(seen.iter().all(|(_, s)| remaining_of(s) != Some(Some(2))));
}

#[tokio::test(start_paused = true)]
async fn test_missing_microphone_warns_once_and_timer_still_runs() {
    let source = ScriptedSource::refusing();
    let counters = Arc::clone(&source.counters);
    let (handle, mut signals, _session) = SessionRuntime::spawn(
        SessionConfig::default(),
        Arc::new(source),
        Box::new(MemoryRecorder::default()),
    );

    handle.load_exercise(ExerciseSpec::timed("plank", 3)).await.unwrap();
    time::sleep(Duration::from_millis(1500)).await;
    handle.pause().await.unwrap();
    handle.resume().await.unwrap();

    let seen = recv_until(&mut signals, completed).await;
    let warnings = seen
        .iter()
        .filter(|(_, s)| matches!(s, Signal::DeviceWarning(_)))
        .count();
    assert_eq!(warnings, 1);
    assert!(seen.iter().all(|(_, s)| !matches!(s, Signal::Struggle(_))));
    assert_eq!(counters.acquired(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_loud_frames_raise_and_clear_struggle() {
    let source = ScriptedSource::levels(&[10.0, 20.0, 200.0, 210.0, 190.0, 10.0, 5.0]);
    let (handle, mut signals, session) = SessionRuntime::spawn(
        SessionConfig::default(),
        Arc::new(source),
        Box::new(MemoryRecorder::default()),
    );

    handle.load_exercise(ExerciseSpec::reps("deadlift", 5)).await.unwrap();
    let seen = recv_until(&mut signals, |s| {
        matches!(s, Signal::Struggle(StruggleEdge::Resolved))
    })
    .await;

    let edges: Vec<StruggleEdge> = seen
        .iter()
        .filter_map(|(_, s)| match s {
            Signal::Struggle(edge) => Some(*edge),
            _ => None,
        })
        .collect();
    assert_eq!(edges, vec![StruggleEdge::Detected, StruggleEdge::Resolved]);
    assert!(seen
        .iter()
        .any(|(_, s)| matches!(s, Signal::State(st) if st.struggle_active)));

    handle.end_session(Biometrics::default()).await.unwrap();
    let summary = session.await.unwrap().expect("summary recorded");
    assert_eq!(summary.struggle_episodes, 1);
}

#[tokio::test(start_paused = true)]
async fn test_end_session_records_summary() {
    let recorder = MemoryRecorder::default();
    let summaries = Arc::clone(&recorder.summaries);
    let (handle, mut signals, session) = SessionRuntime::spawn(
        SessionConfig::default(),
        Arc::new(ScriptedSource::silent()),
        Box::new(recorder),
    );

    handle.load_exercise(ExerciseSpec::timed("sprint", 2)).await.unwrap();
    recv_until(&mut signals, completed).await;
    handle.load_exercise(ExerciseSpec::timed("plank", 60)).await.unwrap();
    time::sleep(Duration::from_secs(5)).await;

    let biometrics = Biometrics {
        heart_rate_bpm: Some(142),
        calories_kcal: Some(85),
        oxygen_saturation_pct: Some(97),
    };
    handle.end_session(biometrics).await.unwrap();
    recv_until(&mut signals, |s| matches!(s, Signal::SessionEnded)).await;

    let summary = session.await.unwrap().expect("summary recorded");
    assert_eq!(summary.biometrics, biometrics);
    assert_eq!(summary.exercises_completed, 1);
    assert!(summary.elapsed >= Duration::from_secs(7));
    assert!(summary.elapsed < Duration::from_secs(8));

    let recorded = summaries.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0], summary);
    drop(recorded);

    // The session is gone; further commands are refused.
    assert!(matches!(
        handle.load_exercise(ExerciseSpec::timed("extra", 10)).await,
        Err(SessionError::Closed)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_the_handle_releases_the_device() {
    let source = ScriptedSource::silent();
    let counters = Arc::clone(&source.counters);
    let source: Arc<dyn AudioSource> = Arc::new(source);
    let (handle, _signals, session) = SessionRuntime::spawn(
        SessionConfig::default(),
        source,
        Box::new(MemoryRecorder::default()),
    );

    handle.load_exercise(ExerciseSpec::reps("rows", 3)).await.unwrap();
    time::sleep(Duration::from_millis(200)).await;
    assert_eq!(counters.acquired(), 1);
    assert_eq!(counters.released(), 0);

    drop(handle);
    let summary = session.await.unwrap();
    assert!(summary.is_none());

    time::sleep(Duration::from_millis(100)).await;
    assert_eq!(counters.released(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_pause_hands_the_device_back() {
    let source = ScriptedSource::silent();
    let counters = Arc::clone(&source.counters);
    let (handle, _signals, _session) = SessionRuntime::spawn(
        SessionConfig::default(),
        Arc::new(source),
        Box::new(MemoryRecorder::default()),
    );

    handle.load_exercise(ExerciseSpec::timed("plank", 30)).await.unwrap();
    time::sleep(Duration::from_millis(200)).await;
    handle.pause().await.unwrap();
    time::sleep(Duration::from_millis(200)).await;
    assert_eq!(counters.acquired(), 1);
    assert_eq!(counters.released(), 1);

    handle.resume().await.unwrap();
    time::sleep(Duration::from_millis(200)).await;
    assert_eq!(counters.acquired(), 2);
    assert_eq!(counters.released(), 1);
}
