use tokio::sync::mpsc;

use crate::error::SessionError;
use crate::kernel::event::{Command, Event};
use crate::kernel::exercise::ExerciseSpec;
use crate::summary::Biometrics;

/// Command side of a running session, for the presentation layer and plan
/// supplier. Cheap to clone; the session stops once every clone is dropped.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Event>,
}

impl SessionHandle {
    pub(crate) fn new(tx: mpsc::Sender<Event>) -> Self {
        Self { tx }
    }

    pub async fn send(&self, command: Command) -> Result<(), SessionError> {
        self.tx
            .send(Event::Command(command))
            .await
            .map_err(|_| SessionError::Closed)
    }

    pub async fn load_exercise(&self, spec: ExerciseSpec) -> Result<(), SessionError> {
        self.send(Command::Load(spec)).await
    }

    pub async fn toggle_pause(&self) -> Result<(), SessionError> {
        self.send(Command::TogglePause).await
    }

    pub async fn pause(&self) -> Result<(), SessionError> {
        self.send(Command::Pause).await
    }

    pub async fn resume(&self) -> Result<(), SessionError> {
        self.send(Command::Resume).await
    }

    pub async fn complete_set(&self) -> Result<(), SessionError> {
        self.send(Command::CompleteSet).await
    }

    pub async fn skip(&self, next: Option<ExerciseSpec>) -> Result<(), SessionError> {
        self.send(Command::Skip(next)).await
    }

    pub async fn retry_sampling(&self) -> Result<(), SessionError> {
        self.send(Command::RetrySampling).await
    }

    pub async fn end_session(&self, biometrics: Biometrics) -> Result<(), SessionError> {
        self.send(Command::End(biometrics)).await
    }
}
