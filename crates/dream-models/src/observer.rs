//! Optional observer notified as pipeline stages progress.

use serde::{Deserialize, Serialize};

/// Pipeline stage, used as context in observer events and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Submit,
    Poll,
    Extend,
    Download,
    Process,
    Thumbnail,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Submit => "submit",
            Stage::Poll => "poll",
            Stage::Extend => "extend",
            Stage::Download => "download",
            Stage::Process => "process",
            Stage::Thumbnail => "thumbnail",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Receives stage events.
///
/// Observers only see events. Whether one is attached never changes what a
/// stage returns.
pub trait StageObserver: Send + Sync {
    fn info(&self, stage: Stage, message: &str);

    fn error(&self, stage: Stage, message: &str);
}

/// Forward an info event if an observer is attached.
pub fn notify_info(observer: Option<&dyn StageObserver>, stage: Stage, message: &str) {
    if let Some(observer) = observer {
        observer.info(stage, message);
    }
}

/// Forward an error event if an observer is attached.
pub fn notify_error(observer: Option<&dyn StageObserver>, stage: Stage, message: &str) {
    if let Some(observer) = observer {
        observer.error(stage, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl StageObserver for Recorder {
        fn info(&self, stage: Stage, message: &str) {
            self.0.lock().unwrap().push(format!("info:{stage}:{message}"));
        }

        fn error(&self, stage: Stage, message: &str) {
            self.0.lock().unwrap().push(format!("error:{stage}:{message}"));
        }
    }

    #[test]
    fn test_notify_with_and_without_observer() {
        let recorder = Recorder::default();
        notify_info(Some(&recorder), Stage::Submit, "sent");
        notify_error(Some(&recorder), Stage::Poll, "failed");
        notify_error(None, Stage::Poll, "dropped");

        let events = recorder.0.lock().unwrap();
        assert_eq!(*events, vec!["info:submit:sent", "error:poll:failed"]);
    }
}
