use indicatif::{ProgressBar, ProgressStyle};
use stager_pipeline::{Phase, ProgressEvent, ProgressSnapshot, ProgressTracker};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-")
}

/// Terminal view of the update run: a spinner while checking, a bar per phase after that.
pub struct ProgressView {
    tracker: ProgressTracker,
    bar: ProgressBar,
    shown: Option<Phase>,
}

impl ProgressView {
    pub fn new(bar: ProgressBar) -> Self {
        Self {
            tracker: ProgressTracker::new(),
            bar,
            shown: None,
        }
    }

    pub fn stderr() -> Self {
        Self::new(ProgressBar::new(0))
    }

    pub fn hidden() -> Self {
        Self::new(ProgressBar::hidden())
    }

    pub fn apply(&mut self, event: ProgressEvent) {
        self.tracker.update(event);
        let snap = self.tracker.get_snapshot();

        if snap.phase != self.shown {
            self.shown = snap.phase;
            if snap.visible {
                self.bar.disable_steady_tick();
                self.bar.set_style(bar_style());
            } else {
                self.bar.set_style(spinner_style());
                self.bar.enable_steady_tick(Duration::from_millis(100));
            }
            self.bar.set_message(snap.label);
        }

        if snap.visible {
            self.bar.set_length(snap.total);
            self.bar.set_position(snap.completed);
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.tracker.get_snapshot()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Render events until the sender side goes away. Returns the last state shown.
pub async fn drive(
    mut rx: UnboundedReceiver<ProgressEvent>,
    mut view: ProgressView,
) -> ProgressSnapshot {
    while let Some(ev) = rx.recv().await {
        view.apply(ev);
    }
    view.finish();
    view.snapshot()
}
