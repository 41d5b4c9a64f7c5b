use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Checking,
    Downloading,
    Installing,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Checking => "Checking for updates...",
            Phase::Downloading => "Downloading updates...",
            Phase::Installing => "Installing updates...",
        }
    }

    /// Checking has no known item count, so it is shown as a status line only.
    pub fn shows_progress(self) -> bool {
        !matches!(self, Phase::Checking)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    PhaseStarted { phase: Phase, total: u64 },
    ItemDone { phase: Phase },
    PhaseFinished { phase: Phase },
}

/// Optional event channel threaded through the core. Sends never fail the caller.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    tx: Option<&'a UnboundedSender<ProgressEvent>>,
}

impl<'a> Progress<'a> {
    pub fn new(tx: Option<&'a UnboundedSender<ProgressEvent>>) -> Self {
        Self { tx }
    }

    pub fn none() -> Self {
        Self { tx: None }
    }

    fn send(&self, event: ProgressEvent) {
        if let Some(tx) = self.tx {
            let _ = tx.send(event);
        }
    }

    pub fn started(&self, phase: Phase, total: usize) {
        self.send(ProgressEvent::PhaseStarted {
            phase,
            total: total as u64,
        });
    }

    pub fn item_done(&self, phase: Phase) {
        self.send(ProgressEvent::ItemDone { phase });
    }

    pub fn finished(&self, phase: Phase) {
        self.send(ProgressEvent::PhaseFinished { phase });
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub phase: Option<Phase>,
    pub label: &'static str,
    pub visible: bool,
    pub completed: u64,
    pub total: u64,
}

/// Folds progress events into the state a presentation layer displays.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    phase: Option<Phase>,
    visible: bool,
    completed: u64,
    total: u64,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::PhaseStarted { phase, total } => {
                self.phase = Some(phase);
                self.visible = phase.shows_progress();
                self.completed = 0;
                self.total = total;
            }
            ProgressEvent::ItemDone { phase } => {
                if self.phase == Some(phase) {
                    self.completed += 1;
                }
            }
            ProgressEvent::PhaseFinished { phase } => {
                if self.phase == Some(phase) {
                    self.visible = false;
                }
            }
        }
    }

    pub fn get_snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            phase: self.phase,
            label: self.phase.map(Phase::label).unwrap_or_default(),
            visible: self.visible,
            completed: self.completed,
            total: self.total,
        }
    }
}
