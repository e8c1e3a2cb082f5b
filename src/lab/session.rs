//! Lab session
//!
//! Owns one simulation, the trial book and the analysis sheet. The host calls
//! `on_frame` from its animation callback and `flush_persistence` at frame
//! boundaries; nothing in here blocks on the store.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::analysis::{AnalysisEntries, AnalysisField};
use super::entry::{EntryRules, parse_entry};
use super::error::LabError;
use super::progress::{ProgressTracker, Section, SectionScores, SectionStatusMap};
use super::recorder::commit_to_trial;
use super::trial::{EntryField, Trial, TrialBook};
use super::validation::{FieldStatus, ValidationEngine};
use crate::persistence::{LabStatePatch, LabStore, PersistedLabState, SubscriptionId};
use crate::settings::LabSettings;
use crate::sim::{
    Command, CollisionMode, FrameClock, RandomSource, SeededRandom, SimPhase, SimulationState,
    TickReport, advance, apply_command,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// Transient message for the student (toast)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Payload handed to the grader on submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub trials: Vec<Trial>,
    pub analysis: AnalysisEntries,
    pub section_status: SectionStatusMap,
    pub scores: SectionScores,
}

type Inbox = Rc<RefCell<Vec<PersistedLabState>>>;

/// Local edits the store has not acknowledged yet.
///
/// Deliveries never overwrite these; they clear once a save succeeds.
#[derive(Debug, Default)]
struct PendingEdits {
    trials: BTreeSet<(CollisionMode, u32)>,
    analysis: bool,
    scores: bool,
}

impl PendingEdits {
    fn is_empty(&self) -> bool {
        self.trials.is_empty() && !self.analysis && !self.scores
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

pub struct LabSession {
    settings: LabSettings,
    state: SimulationState,
    rng: Box<dyn RandomSource>,
    clock: FrameClock,
    book: TrialBook,
    analysis: AnalysisEntries,
    tracker: ProgressTracker,
    sections: SectionStatusMap,
    scores: SectionScores,
    store: Option<(Box<dyn LabStore>, SubscriptionId)>,
    inbox: Inbox,
    outbox: Option<LabStatePatch>,
    pending: PendingEdits,
    notifications: Vec<Notification>,
}

impl std::fmt::Debug for LabSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabSession")
            .field("phase", &self.state.phase)
            .field("frame", &self.state.frame_counter)
            .field("sections", &self.sections)
            .field("has_store", &self.store.is_some())
            .finish()
    }
}

impl LabSession {
    /// New session seeded from the settings
    pub fn new(settings: LabSettings) -> Self {
        let rng = SeededRandom::new(settings.seed);
        log::info!("Lab session seeded with {}", rng.seed());
        Self::with_random(settings, Box::new(rng))
    }

    /// New session drawing run noise and restitution from `rng`
    pub fn with_random(settings: LabSettings, rng: Box<dyn RandomSource>) -> Self {
        let settings = settings.sanitized();
        let state = SimulationState::new(settings.layout(), settings.launch());
        let book = TrialBook::new();
        let analysis = AnalysisEntries::default();
        let tracker = ProgressTracker::new(ValidationEngine::default());
        let sections = tracker.all(&book, &analysis);
        Self {
            settings,
            state,
            rng,
            clock: FrameClock::new(),
            book,
            analysis,
            tracker,
            sections,
            scores: SectionScores::new(),
            store: None,
            inbox: Rc::new(RefCell::new(Vec::new())),
            outbox: None,
            pending: PendingEdits::default(),
            notifications: Vec::new(),
        }
    }

    // === Read-only views for rendering / UI ===

    pub fn settings(&self) -> &LabSettings {
        &self.settings
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn trials(&self) -> &TrialBook {
        &self.book
    }

    pub fn trial(&self, mode: CollisionMode, number: u32) -> Option<&Trial> {
        self.book.get(mode, number)
    }

    pub fn analysis(&self) -> &AnalysisEntries {
        &self.analysis
    }

    pub fn section_status(&self) -> &SectionStatusMap {
        &self.sections
    }

    pub fn scores(&self) -> &SectionScores {
        &self.scores
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    // === Commands ===

    pub fn start(&mut self) -> bool {
        self.command(Command::Start)
    }

    pub fn stop(&mut self) -> bool {
        self.command(Command::Stop)
    }

    pub fn reset(&mut self) -> bool {
        self.command(Command::Reset)
    }

    pub fn set_mode(&mut self, mode: CollisionMode) -> bool {
        self.command(Command::SetMode(mode))
    }

    pub fn set_launch_angle(&mut self, angle_deg: f64) -> bool {
        self.command(Command::SetLaunchAngle(angle_deg))
    }

    pub fn set_launch_speed(&mut self, speed: f64) -> bool {
        self.command(Command::SetLaunchSpeed(speed))
    }

    fn command(&mut self, command: Command) -> bool {
        let changed = apply_command(&mut self.state, command, self.rng.as_mut());
        if changed {
            if matches!(command, Command::Stop | Command::Reset) {
                self.clock.clear();
            }
            self.queue_simulation();
        }
        changed
    }

    // === Frame loop ===

    /// Run the ticks due for `elapsed` seconds of wall time
    pub fn on_frame(&mut self, elapsed: f64) -> u32 {
        if !self.state.is_running() {
            self.clock.clear();
            return 0;
        }
        let steps = self.clock.advance_frame(elapsed);
        let mut ran = 0;
        for _ in 0..steps {
            if !self.state.is_running() {
                break;
            }
            self.tick();
            ran += 1;
        }
        ran
    }

    /// Advance exactly one tick
    pub fn tick(&mut self) -> TickReport {
        let report = advance(&mut self.state, self.rng.as_mut());
        if report.first_collision || report.settled {
            self.queue_simulation();
        }
        report
    }

    // === Trials ===

    /// Record the current collision into trial `number` of its collision type
    pub fn commit_to_trial(&mut self, number: u32) -> Result<(), LabError> {
        match commit_to_trial(&mut self.state, &mut self.book, number) {
            Ok(_) => {
                let mode = self.state.capture.map_or(self.state.launch.mode, |c| c.mode);
                self.pending.trials.insert((mode, number));
                self.refresh_sections();
                self.queue(LabStatePatch {
                    trials: Some(self.book.trials.clone()),
                    simulation: Some(self.state.clone()),
                    section_status: Some(self.sections.clone()),
                    ..Default::default()
                });
                Ok(())
            }
            Err(e) => {
                log::warn!("Commit to trial {number} rejected: {e}");
                self.notifications.push(Notification::warning(e.to_string()));
                Err(e)
            }
        }
    }

    /// Type `text` into a trial field. Invalid text is ignored (returns false).
    pub fn enter_value(
        &mut self,
        mode: CollisionMode,
        number: u32,
        field: EntryField,
        text: &str,
    ) -> bool {
        let Some(value) = parse_entry(text, &EntryRules::measurement()) else {
            return false;
        };
        self.set_trial_entry(mode, number, field, Some(value))
    }

    pub fn clear_value(&mut self, mode: CollisionMode, number: u32, field: EntryField) -> bool {
        self.set_trial_entry(mode, number, field, None)
    }

    fn set_trial_entry(
        &mut self,
        mode: CollisionMode,
        number: u32,
        field: EntryField,
        value: Option<f64>,
    ) -> bool {
        let Some(trial) = self.book.get_mut(mode, number) else {
            return false;
        };
        if !trial.has_field(field) {
            return false;
        }
        trial.entries.set(field, value);
        self.pending.trials.insert((mode, number));
        self.refresh_sections();
        self.queue(LabStatePatch {
            trials: Some(self.book.trials.clone()),
            section_status: Some(self.sections.clone()),
            ..Default::default()
        });
        true
    }

    pub fn field_status(&self, mode: CollisionMode, number: u32, field: EntryField) -> FieldStatus {
        match self.book.get(mode, number) {
            Some(trial) => trial.status(field, &self.tracker.engine),
            None => FieldStatus::Empty,
        }
    }

    // === Analysis ===

    pub fn enter_analysis(&mut self, field: AnalysisField, text: &str) -> bool {
        let Some(value) = parse_entry(text, &EntryRules::measurement()) else {
            return false;
        };
        self.set_analysis_entry(field, Some(value))
    }

    pub fn clear_analysis(&mut self, field: AnalysisField) -> bool {
        self.set_analysis_entry(field, None)
    }

    fn set_analysis_entry(&mut self, field: AnalysisField, value: Option<f64>) -> bool {
        if !AnalysisEntries::has_field(field) {
            return false;
        }
        self.analysis.set(field, value);
        self.pending.analysis = true;
        self.refresh_sections();
        self.queue(LabStatePatch {
            analysis: Some(self.analysis),
            section_status: Some(self.sections.clone()),
            ..Default::default()
        });
        true
    }

    pub fn analysis_status(&self, field: AnalysisField) -> FieldStatus {
        self.analysis.status(field, &self.book, &self.tracker.engine)
    }

    fn refresh_sections(&mut self) {
        self.sections = self.tracker.all(&self.book, &self.analysis);
    }

    // === Scores ===

    /// Award points for a section. Text outside `0..=max_section_points` or
    /// with more than one decimal is ignored (returns false).
    pub fn award_points(&mut self, section: Section, text: &str) -> bool {
        let rules = EntryRules::points(self.settings.max_section_points);
        let Some(points) = parse_entry(text, &rules) else {
            return false;
        };
        self.set_score(section, Some(points));
        true
    }

    pub fn clear_points(&mut self, section: Section) -> bool {
        if !self.scores.contains_key(&section) {
            return false;
        }
        self.set_score(section, None);
        true
    }

    fn set_score(&mut self, section: Section, points: Option<f64>) {
        match points {
            Some(points) => self.scores.insert(section, points),
            None => self.scores.remove(&section),
        };
        self.pending.scores = true;
        self.queue(LabStatePatch {
            scores: Some(self.scores.clone()),
            ..Default::default()
        });
    }

    // === Persistence ===

    /// Attach a store; its initial load is applied on the next flush.
    ///
    /// Edits made while detached are queued so the store catches up.
    pub fn connect_store(&mut self, mut store: Box<dyn LabStore>) {
        self.disconnect_store();
        let inbox = Rc::clone(&self.inbox);
        let id = store.subscribe(Box::new(move |doc: &PersistedLabState| {
            inbox.borrow_mut().push(doc.clone());
        }));
        self.store = Some((store, id));
        if !self.pending.is_empty() {
            self.queue(LabStatePatch {
                trials: Some(self.book.trials.clone()),
                analysis: Some(self.analysis),
                section_status: Some(self.sections.clone()),
                scores: Some(self.scores.clone()),
                ..Default::default()
            });
        }
    }

    /// Detach and return the store, if any
    pub fn disconnect_store(&mut self) -> Option<Box<dyn LabStore>> {
        let (mut store, id) = self.store.take()?;
        store.unsubscribe(id);
        Some(store)
    }

    pub fn store(&self) -> Option<&dyn LabStore> {
        self.store.as_ref().map(|(store, _)| store.as_ref())
    }

    /// Full document for the store
    pub fn persisted_state(&self) -> PersistedLabState {
        PersistedLabState {
            trials: self.book.trials.clone(),
            analysis: self.analysis,
            simulation: Some(self.state.clone()),
            section_status: self.sections.clone(),
            scores: self.scores.clone(),
            ..PersistedLabState::default()
        }
    }

    /// Merge a delivered document into the session.
    ///
    /// Trials, analysis entries and scores with unsaved local edits are kept;
    /// everything else takes the stored value. The simulation restores only
    /// into an untouched idle session.
    pub fn apply_loaded(&mut self, doc: PersistedLabState) {
        let mut restored = 0;
        for loaded in doc.trials {
            if self.pending.trials.contains(&(loaded.mode, loaded.number)) {
                continue;
            }
            if let Some(slot) = self.book.get_mut(loaded.mode, loaded.number) {
                if loaded.is_committed() {
                    restored += 1;
                }
                *slot = loaded;
            }
        }
        if !self.pending.analysis {
            self.analysis = doc.analysis;
        }
        if !self.pending.scores {
            self.scores = doc.scores;
        }

        let untouched = self.state.phase == SimPhase::Idle && self.state.frame_counter == 0;
        if let Some(mut simulation) = doc.simulation.filter(|_| untouched) {
            // No animation handle survives a reload
            if simulation.is_running() {
                simulation.phase = SimPhase::Stopped;
            }
            self.state = simulation;
        }

        // Status is derived, never trusted from the document
        self.refresh_sections();
        log::info!("Applied stored lab state ({restored} committed trials)");
        if restored > 0 {
            self.notifications.push(Notification::info(format!(
                "Restored {restored} recorded trial(s)"
            )));
        }
    }

    /// Merge pending deliveries, then send queued saves.
    ///
    /// The outgoing patch is rebuilt from the merged state so the store ends
    /// up with both the delivered and the local data. Save failures become
    /// notifications; in-memory state stays as is.
    pub fn flush_persistence(&mut self) {
        let delivered: Vec<PersistedLabState> = self.inbox.borrow_mut().drain(..).collect();
        let merged = !delivered.is_empty();
        for doc in delivered {
            self.apply_loaded(doc);
        }
        if merged {
            self.refresh_outbox();
        }

        let Some(patch) = self.outbox.take() else {
            return;
        };
        let Some((store, _)) = self.store.as_mut() else {
            return;
        };
        match store.save(patch) {
            Ok(()) => self.pending.clear(),
            Err(e) => {
                log::warn!("Saving lab state failed: {e}");
                self.notifications
                    .push(Notification::error(format!("Could not save your lab data: {e}")));
            }
        }
    }

    /// Bring queued fields up to date with the in-memory state
    fn refresh_outbox(&mut self) {
        let Some(patch) = self.outbox.as_mut() else {
            return;
        };
        if patch.trials.is_some() {
            patch.trials = Some(self.book.trials.clone());
        }
        if patch.analysis.is_some() {
            patch.analysis = Some(self.analysis);
        }
        if patch.scores.is_some() {
            patch.scores = Some(self.scores.clone());
        }
        if patch.section_status.is_some() {
            patch.section_status = Some(self.sections.clone());
        }
    }

    /// Drain pending notifications for display
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn queue(&mut self, patch: LabStatePatch) {
        if self.store.is_none() {
            return;
        }
        match self.outbox.as_mut() {
            Some(pending) => pending.merge(patch),
            None => self.outbox = Some(patch),
        }
    }

    fn queue_simulation(&mut self) {
        self.queue(LabStatePatch {
            simulation: Some(self.state.clone()),
            ..Default::default()
        });
    }

    // === Grading ===

    pub fn submission(&self) -> Submission {
        Submission {
            trials: self.book.trials.clone(),
            analysis: self.analysis,
            section_status: self.sections.clone(),
            scores: self.scores.clone(),
        }
    }
}
