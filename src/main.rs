use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use stride::audio::{AudioSource, MicrophoneSource, NoAudio, WavReplaySource};
use stride::kernel::audio::monitor::StruggleEdge;
use stride::kernel::scheduler::Signal;
use stride::kernel::state::SessionSnapshot;
use stride::plan::{PlanFollower, PlanStep, WorkoutPlan};
use stride::summary::{Biometrics, JsonFileRecorder, LogRecorder, SummaryRecorder};
use stride::{SessionConfig, SessionRuntime};

#[derive(Debug, Default)]
struct Args {
    plan: Option<PathBuf>,
    config: Option<PathBuf>,
    wav: Option<PathBuf>,
    summary: Option<PathBuf>,
    no_audio: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(flag) = iter.next() {
        let mut value = || iter.next().with_context(|| format!("{} needs a value", flag));
        match flag.as_str() {
            "--plan" => args.plan = Some(value()?.into()),
            "--config" => args.config = Some(value()?.into()),
            "--wav" => args.wav = Some(value()?.into()),
            "--summary" => args.summary = Some(value()?.into()),
            "--no-audio" => args.no_audio = true,
            other => bail!(
                "unknown argument '{}'\nusage: stride [--plan FILE] [--config FILE] [--wav FILE | --no-audio] [--summary FILE]",
                other
            ),
        }
    }
    Ok(args)
}

fn parse_biometrics<'a>(mut parts: impl Iterator<Item = &'a str>) -> Biometrics {
    Biometrics {
        heart_rate_bpm: parts.next().and_then(|v| v.parse().ok()),
        calories_kcal: parts.next().and_then(|v| v.parse().ok()),
        oxygen_saturation_pct: parts.next().and_then(|v| v.parse().ok()),
    }
}

fn print_state(state: &SessionSnapshot) {
    let exercise = state
        .exercise
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".into());
    let progress = match state.remaining_seconds {
        Some(secs) => format!("{}s left", secs),
        None => format!("set {}/{}", state.current_set, state.target_sets),
    };
    println!(
        "[{:?}] {} | {}{}{}",
        state.phase,
        exercise,
        progress,
        if state.is_paused { " | paused" } else { "" },
        if state.struggle_active { " | struggling" } else { "" },
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    let plan = match &args.plan {
        Some(path) => WorkoutPlan::load(path)?,
        None => WorkoutPlan::sample(),
    };

    let source: Arc<dyn AudioSource> = if args.no_audio {
        Arc::new(NoAudio)
    } else if let Some(path) = &args.wav {
        Arc::new(WavReplaySource::new(path, config.frame_len))
    } else {
        Arc::new(MicrophoneSource::new(config.frame_len))
    };
    let recorder: Box<dyn SummaryRecorder> = match &args.summary {
        Some(path) => Box::new(JsonFileRecorder::new(path)),
        None => Box::new(LogRecorder),
    };

    tracing::info!("Starting plan '{}' ({} exercises)", plan.name, plan.exercises.len());
    let (handle, mut signals, session) = SessionRuntime::spawn(config, source, recorder);

    let mut follower = PlanFollower::new(plan);
    let first = follower.current().cloned().context("plan is empty")?;
    handle.load_exercise(first).await?;

    // Plan commands are forwarded in order, off the presenter, so a full
    // session queue can't stall rendering.
    let (step_tx, mut step_rx) = mpsc::unbounded_channel::<PlanStep>();
    let forwarder = {
        let handle = handle.clone();
        tokio::spawn(async move {
            while let Some(step) = step_rx.recv().await {
                let result = match step {
                    PlanStep::Load(spec) => handle.load_exercise(spec).await,
                    PlanStep::Skip(next) => handle.skip(next).await,
                    PlanStep::Finished => Ok(()),
                };
                if result.is_err() {
                    break;
                }
            }
        })
    };

    // Presentation side: render signals. It alone moves the plan cursor.
    let (skip_tx, mut skip_rx) = mpsc::channel::<()>(8);
    let presenter = tokio::spawn(async move {
        let mut skips_open = true;
        loop {
            let step = tokio::select! {
                signal = signals.recv() => {
                    let Some(signal) = signal else { break };
                    let step = follower.observe(&signal);
                    match signal {
                        Signal::State(state) => print_state(&state),
                        Signal::ExerciseCompleted(id) => println!("Done: {}", id),
                        Signal::Struggle(StruggleEdge::Detected) => println!("!! Struggle detected"),
                        Signal::Struggle(StruggleEdge::Resolved) => println!("Struggle cleared"),
                        Signal::DeviceWarning(e) => {
                            println!("Warning: {} (struggle detection off, 'r' retries)", e)
                        }
                        Signal::SessionEnded => break,
                    }
                    step
                }
                request = skip_rx.recv(), if skips_open => {
                    if request.is_none() {
                        skips_open = false;
                        continue;
                    }
                    let step = follower.skip();
                    if step.is_none() {
                        println!("Nothing to skip right now");
                    }
                    step
                }
            };

            match &step {
                Some(PlanStep::Load(spec)) => println!("Next up: {}", spec.label()),
                Some(PlanStep::Skip(Some(spec))) => println!("Skipping to {}", spec.label()),
                Some(PlanStep::Skip(None)) => println!("Skipped the last exercise"),
                Some(PlanStep::Finished) => println!("Plan finished. Type 'q' to end the session."),
                None => {}
            }
            if let Some(step) = step {
                let _ = step_tx.send(step);
            }
        }
    });

    println!("Commands: p pause/resume | s set done | n next | r retry mic | q [hr] [kcal] [spo2] end");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ended = false;
    while let Some(line) = lines.next_line().await? {
        let mut parts = line.split_whitespace();
        let result = match parts.next() {
            Some("p") => handle.toggle_pause().await,
            Some("s") => handle.complete_set().await,
            Some("n") => {
                let _ = skip_tx.send(()).await;
                Ok(())
            }
            Some("r") => handle.retry_sampling().await,
            Some("q") => {
                ended = true;
                handle.end_session(parse_biometrics(parts)).await
            }
            Some(other) => {
                println!("Unknown command '{}'", other);
                Ok(())
            }
            None => Ok(()),
        };
        if let Err(e) = result {
            tracing::error!("{}", e);
            break;
        }
        if ended {
            break;
        }
    }

    if !ended {
        // Stdin closed: end with no readings.
        let _ = handle.end_session(Biometrics::default()).await;
    }
    drop(handle);
    drop(skip_tx);

    let summary = session.await.context("session task panicked")?;
    let _ = presenter.await;
    let _ = forwarder.await;
    if let Some(summary) = summary {
        println!(
            "Session {} finished in {}s: {} exercises, {} struggle episodes",
            summary.session_id,
            summary.elapsed.as_secs(),
            summary.exercises_completed,
            summary.struggle_episodes
        );
    }
    Ok(())
}
