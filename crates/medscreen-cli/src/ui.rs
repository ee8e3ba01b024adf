use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use medscreen::engine::progress::{Progress, ProgressCallback};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::warn;

#[derive(Debug)]
pub enum UiEvent {
    Progress(Progress),
    Log(String),
}

/// Draws one spinner or bar per running stage from events received on a channel.
pub struct UiManager {
    mp: Arc<MultiProgress>,
    state: BarState,
    event_receiver: mpsc::Receiver<UiEvent>,
    shutdown_receiver: watch::Receiver<bool>,
    _sentinel_bar: ProgressBar,
}

#[derive(Default)]
struct BarState {
    active_bar: Option<ProgressBar>,
    base_message: String,
}

impl UiManager {
    pub fn new() -> (Self, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (event_sender, event_receiver) = mpsc::channel(1024);
        let (shutdown_sender, shutdown_receiver) = watch::channel(false);
        let mp = Arc::new(MultiProgress::new());
        mp.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
        let _sentinel_bar = mp.add(ProgressBar::hidden());
        let manager = Self {
            mp,
            state: BarState::default(),
            event_receiver,
            shutdown_receiver,
            _sentinel_bar,
        };

        (manager, event_sender, shutdown_sender)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.event_receiver.recv() => {
                    self.handle_event(event);
                }
                result = self.shutdown_receiver.changed() => {
                    if result.is_err() || *self.shutdown_receiver.borrow() {
                        break;
                    }
                }
            }
        }
        // Drain whatever arrived before shutdown so the last stage is still printed.
        while let Ok(event) = self.event_receiver.try_recv() {
            self.handle_event(event);
        }
        self._sentinel_bar.finish_and_clear();
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(msg) => {
                self.mp.println(msg).ok();
            }
            UiEvent::Progress(progress) => self.handle_progress(progress),
        }
    }

    fn handle_progress(&mut self, progress: Progress) {
        match progress {
            Progress::PhaseStart { name, index, total } => {
                if let Some(bar) = self.state.active_bar.take() {
                    bar.finish_and_clear();
                }

                let label = format!("[{}/{}] {}", index + 1, total, name);
                let pb = self.mp.add(ProgressBar::new_spinner());
                pb.enable_steady_tick(Duration::from_millis(80));
                pb.set_style(Self::spinner_style());
                pb.set_message(label.clone());

                self.state.active_bar = Some(pb);
                self.state.base_message = label;
            }
            Progress::PhaseFinish => {
                if let Some(bar) = self.state.active_bar.take() {
                    bar.finish_and_clear();
                }

                let final_message = format!("✓ {}", self.state.base_message);
                self.mp.println(final_message).ok();

                self.state.base_message.clear();
            }
            Progress::TaskStart { total_steps } => {
                if let Some(bar) = self.state.active_bar.as_ref() {
                    bar.set_style(Self::bar_style());
                    bar.set_length(total_steps);
                    bar.set_position(0);
                    bar.disable_steady_tick();
                }
            }
            Progress::TaskIncrement => {
                if let Some(bar) = self.state.active_bar.as_ref() {
                    bar.inc(1);
                }
            }
            Progress::TaskFinish => {
                if let Some(bar) = self.state.active_bar.as_ref() {
                    bar.finish();
                }
            }
            Progress::Message(msg) => {
                self.mp.println(format!("  {}", msg)).ok();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<30} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("━╸ ")
    }
}

/// Forwards engine progress events into the UI channel.
#[derive(Clone)]
pub struct CliProgressHandler {
    sender: mpsc::Sender<UiEvent>,
}

impl CliProgressHandler {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let sender = self.sender.clone();
        Box::new(move |progress: Progress| {
            if let Err(e) = sender.try_send(UiEvent::Progress(progress)) {
                warn!("Failed to send progress update to UI channel: {}", e);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_manager() -> (UiManager, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (manager, sender, shutdown) = UiManager::new();
        manager.mp.set_draw_target(ProgressDrawTarget::hidden());
        (manager, sender, shutdown)
    }

    fn phase(name: &'static str, index: usize, total: usize) -> UiEvent {
        UiEvent::Progress(Progress::PhaseStart { name, index, total })
    }

    #[test]
    fn phase_start_shows_stage_position() {
        let (mut manager, _, _) = setup_manager();
        assert!(manager.state.active_bar.is_none());

        manager.handle_event(phase("pains", 1, 3));

        let bar = manager.state.active_bar.as_ref().unwrap();
        assert_eq!(bar.message(), "[2/3] pains");
        assert_eq!(manager.state.base_message, "[2/3] pains");
    }

    #[test]
    fn next_phase_replaces_existing_bar() {
        let (mut manager, _, _) = setup_manager();
        manager.handle_event(phase("rules", 0, 2));
        manager.handle_event(phase("groups", 1, 2));

        let bar = manager.state.active_bar.as_ref().unwrap();
        assert_eq!(bar.message(), "[2/2] groups");
    }

    #[test]
    fn phase_finish_clears_active_bar() {
        let (mut manager, _, _) = setup_manager();
        manager.handle_event(phase("complexity", 0, 1));
        manager.handle_event(UiEvent::Progress(Progress::PhaseFinish));

        assert!(manager.state.active_bar.is_none());
        assert!(manager.state.base_message.is_empty());
    }

    #[test]
    fn task_events_drive_the_bar() {
        let (mut manager, _, _) = setup_manager();
        manager.handle_event(phase("lilly", 0, 1));
        manager.handle_event(UiEvent::Progress(Progress::TaskStart { total_steps: 50 }));
        {
            let bar = manager.state.active_bar.as_ref().unwrap();
            assert_eq!(bar.length(), Some(50));
            assert_eq!(bar.position(), 0);
        }

        for _ in 0..3 {
            manager.handle_event(UiEvent::Progress(Progress::TaskIncrement));
        }
        assert_eq!(manager.state.active_bar.as_ref().unwrap().position(), 3);

        manager.handle_event(UiEvent::Progress(Progress::TaskFinish));
        assert!(manager.state.active_bar.as_ref().unwrap().is_finished());
    }

    #[test]
    fn task_events_without_a_phase_are_ignored() {
        let (mut manager, _, _) = setup_manager();
        manager.handle_event(UiEvent::Progress(Progress::TaskIncrement));
        manager.handle_event(UiEvent::Progress(Progress::Message("note".into())));
        manager.handle_event(UiEvent::Log("log line".into()));
        assert!(manager.state.active_bar.is_none());
    }

    #[tokio::test]
    async fn progress_handler_forwards_events() {
        let (sender, mut receiver) = mpsc::channel(1);
        let handler = CliProgressHandler::new(sender);
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "nibr",
            index: 0,
            total: 1,
        });

        match receiver.recv().await {
            Some(UiEvent::Progress(Progress::PhaseStart { name, .. })) => assert_eq!(name, "nibr"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn run_exits_on_shutdown() {
        let (manager, sender, shutdown) = setup_manager();
        let handle = tokio::spawn(manager.run());
        sender.send(phase("rules", 0, 1)).await.unwrap();
        shutdown.send(true).unwrap();
        handle.await.unwrap();
    }
}
