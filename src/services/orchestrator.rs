//! Submission orchestration
//!
//! Drives one submission attempt end to end:
//! validate → upload every tile image in slot order → (best-effort snapshot)
//! → build the summary document → upload it → write the hand-off fields →
//! re-issue the form submit so the host's own handler can finish.
//!
//! The same submit event reaches us twice. The first pass is intercepted and
//! runs the uploads; the second (re-issued) pass is let through untouched.
//! That is modelled as an explicit [`SubmitLatch`] instead of a loose flag.
//!
//! At most one attempt runs at a time. The guard is taken synchronously in
//! [`Orchestrator::handle_submit`] and released on every exit path of
//! [`Orchestrator::run`], or by the [`SubmissionTicket`] when the attempt is
//! dropped half way.

use crate::config::AppConfig;
use crate::models::{HandOffFields, SessionIdentity, SubmissionDocument, TileUpload};
use crate::services::field_registry::{FieldId, FieldRegistry};
use crate::services::progress::{ProgressEvent, StatusLine};
use crate::services::validation::{self, Problem};
use memory_media::{
    compose_snapshot, upload_json, ContentDescriptor, MediaFile, MediaUploader, UploadError,
    UploadOptions, UploadResult,
};
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

const SUMMARY_FILENAME: &str = "memories.json";

/// Where the flow currently is. Everything except `Idle` counts as "uploading".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    UploadingTiles { current: usize, total: usize },
    BuildingSummary,
    UploadingSummary,
    HandingOff,
}

/// Which pass of the submit event comes next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitLatch {
    AwaitingFirstPass,
    /// Uploads are done, the next submit belongs to the host
    AwaitingSecondPass,
}

/// What the submit handler must do with the event
#[derive(Debug)]
pub enum SubmitDecision {
    /// Prevent the default action and drive [`Orchestrator::run`] with the ticket
    Intercept(SubmissionTicket),
    /// Leave the event alone so the host's handler runs
    PassThrough,
    /// Another attempt is running; prevent the default and do nothing else
    Busy,
}

/// Mutable orchestration state, one per form
#[derive(Debug)]
pub struct OrchestratorContext {
    phase: Phase,
    latch: SubmitLatch,
    session: Option<SessionIdentity>,
    attempt: u64,
}

impl OrchestratorContext {
    pub fn new(session: Option<SessionIdentity>) -> Self {
        Self {
            phase: Phase::Idle,
            latch: SubmitLatch::AwaitingFirstPass,
            session,
            attempt: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn latch(&self) -> SubmitLatch {
        self.latch
    }

    pub fn session(&self) -> Option<&SessionIdentity> {
        self.session.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        self.phase != Phase::Idle
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            log::debug!("Submission phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    /// Back to a fresh first pass. Any attempt still in flight becomes stale.
    fn reset(&mut self) {
        self.set_phase(Phase::Idle);
        self.latch = SubmitLatch::AwaitingFirstPass;
        self.attempt += 1;
    }
}

/// Proof that the guard was taken for one attempt.
///
/// Dropping it without finishing (panic, cancelled task) releases the guard.
#[derive(Debug)]
pub struct SubmissionTicket {
    attempt: u64,
    context: Rc<RefCell<OrchestratorContext>>,
}

impl Drop for SubmissionTicket {
    fn drop(&mut self) {
        if let Ok(mut ctx) = self.context.try_borrow_mut() {
            if ctx.attempt == self.attempt && ctx.is_uploading() {
                log::warn!("Submission attempt {} dropped mid-flight", self.attempt);
                ctx.set_phase(Phase::Idle);
                ctx.latch = SubmitLatch::AwaitingFirstPass;
            }
        }
    }
}

/// Which upload failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget {
    Tile(u8),
    Summary,
}

/// Ways an attempt can end without a hand-off
#[derive(Debug)]
pub enum SubmissionError {
    /// Field problems; nothing touched the network
    Validation(Vec<Problem>),
    /// Cloud name or preset missing
    Configuration,
    Upload {
        target: UploadTarget,
        source: UploadError,
    },
    /// The page was reset while this attempt was running
    Superseded,
    Unexpected(String),
}

impl std::fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionError::Validation(problems) => {
                write!(f, "{} field(s) need attention", problems.len())
            }
            SubmissionError::Configuration => write!(f, "Upload configuration missing"),
            SubmissionError::Upload {
                target: UploadTarget::Tile(slot),
                source,
            } => write!(f, "Upload failed for Memory {}: {}", slot, source),
            SubmissionError::Upload {
                target: UploadTarget::Summary,
                source,
            } => write!(f, "Upload failed for memories JSON: {}", source),
            SubmissionError::Superseded => write!(f, "Submission superseded by a page reset"),
            SubmissionError::Unexpected(msg) => write!(f, "Unexpected error: {}", msg),
        }
    }
}

impl std::error::Error for SubmissionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmissionError::Upload { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl SubmissionError {
    /// Status line shown to the user
    pub fn event(&self) -> ProgressEvent {
        match self {
            SubmissionError::Validation(problems) => ProgressEvent::ValidationFailed {
                problems: problems.len(),
            },
            SubmissionError::Configuration => ProgressEvent::ConfigMissing,
            SubmissionError::Upload {
                target: UploadTarget::Tile(slot),
                source,
            } => ProgressEvent::Failed {
                message: if source.is_timeout() {
                    format!("Upload timed out for Memory {}.", slot)
                } else {
                    format!("Upload failed for Memory {}.", slot)
                },
            },
            SubmissionError::Upload {
                target: UploadTarget::Summary,
                ..
            } => ProgressEvent::Failed {
                message: "Upload failed for memories JSON.".to_string(),
            },
            SubmissionError::Superseded | SubmissionError::Unexpected(_) => ProgressEvent::Failed {
                message: "Something went wrong while uploading your memories.".to_string(),
            },
        }
    }
}

/// The page side of the flow: field state, status line, re-issuing submit
pub trait SubmitHost {
    /// Snapshot of the current field state
    fn fields(&self) -> FieldRegistry;

    fn update_fields<F>(&mut self, update: F)
    where
        F: FnOnce(&mut FieldRegistry);

    fn show_status(&mut self, status: StatusLine);

    /// Scroll to the first invalid field
    fn focus_field(&mut self, _field: FieldId) {}

    /// Fire the form's native submit again
    fn request_submit(&mut self);
}

/// Drives submissions for one form
pub struct Orchestrator<U, H> {
    uploader: Rc<U>,
    host: H,
    config: Rc<AppConfig>,
    context: Rc<RefCell<OrchestratorContext>>,
}

impl<U, H: Clone> Clone for Orchestrator<U, H> {
    fn clone(&self) -> Self {
        Self {
            uploader: self.uploader.clone(),
            host: self.host.clone(),
            config: self.config.clone(),
            context: self.context.clone(),
        }
    }
}

impl<U, H> Orchestrator<U, H>
where
    U: MediaUploader,
    H: SubmitHost + Clone,
{
    pub fn new(
        uploader: Rc<U>,
        host: H,
        config: AppConfig,
        session: Option<SessionIdentity>,
    ) -> Self {
        Self {
            uploader,
            host,
            config: Rc::new(config),
            context: Rc::new(RefCell::new(OrchestratorContext::new(session))),
        }
    }

    pub fn phase(&self) -> Phase {
        self.context.borrow().phase()
    }

    pub fn latch(&self) -> SubmitLatch {
        self.context.borrow().latch()
    }

    pub fn is_uploading(&self) -> bool {
        self.context.borrow().is_uploading()
    }

    /// Entry point for every submit event. Synchronous so the guard is taken
    /// before anything can suspend.
    pub fn handle_submit(&self) -> SubmitDecision {
        let mut ctx = self.context.borrow_mut();

        if ctx.latch == SubmitLatch::AwaitingSecondPass {
            ctx.latch = SubmitLatch::AwaitingFirstPass;
            log::info!("Second submit pass, handing over to the host form");
            return SubmitDecision::PassThrough;
        }

        if ctx.is_uploading() {
            drop(ctx);
            log::warn!("Submit ignored, an upload is already in progress");
            self.host
                .clone()
                .show_status(ProgressEvent::AlreadyInProgress.render());
            return SubmitDecision::Busy;
        }

        ctx.attempt += 1;
        ctx.set_phase(Phase::Validating);
        SubmitDecision::Intercept(SubmissionTicket {
            attempt: ctx.attempt,
            context: self.context.clone(),
        })
    }

    /// A resumed page (back navigation, bfcache restore) must never believe
    /// an upload is still running.
    pub fn on_page_resume(&self) {
        log::info!("Page resumed, resetting submission state");
        self.context.borrow_mut().reset();
        self.host.clone().update_fields(|f| f.set_disabled(false));
    }

    /// Runs one intercepted attempt. On success the hand-off fields are
    /// written, the latch is armed and the submit is re-issued.
    pub async fn run(&self, ticket: SubmissionTicket) -> Result<HandOffFields, SubmissionError> {
        let mut host = self.host.clone();
        host.show_status(StatusLine::empty());

        let result = self.drive(&mut host, ticket.attempt).await;

        let current = {
            let mut ctx = self.context.borrow_mut();
            let current = ctx.attempt == ticket.attempt;
            if current {
                ctx.set_phase(Phase::Idle);
                ctx.latch = match result {
                    Ok(_) => SubmitLatch::AwaitingSecondPass,
                    Err(_) => SubmitLatch::AwaitingFirstPass,
                };
            }
            current
        };
        drop(ticket);

        // A newer attempt owns the fields and the status line now
        if !current {
            log::warn!("Submission finished after a page reset, discarding result");
            return Err(SubmissionError::Superseded);
        }
        host.update_fields(|f| f.set_disabled(false));

        match result {
            Ok(fields) => {
                host.request_submit();
                Ok(fields)
            }
            Err(err) => {
                match &err {
                    SubmissionError::Validation(problems) => {
                        log::info!("Submission blocked by {} problem(s)", problems.len());
                    }
                    SubmissionError::Upload { source, .. } => match source.http_status() {
                        Some(status) => log::error!("Submission failed (HTTP {}): {}", status, err),
                        None => log::error!("Submission failed: {}", err),
                    },
                    other => log::error!("Submission failed: {}", other),
                }
                host.show_status(err.event().render());
                Err(err)
            }
        }
    }

    async fn drive(&self, host: &mut H, attempt: u64) -> Result<HandOffFields, SubmissionError> {
        if !self.config.is_upload_configured() {
            return Err(SubmissionError::Configuration);
        }

        // Validating
        let fields = host.fields();
        let verdict = validation::validate(&fields, &self.config.rules);
        if !verdict.is_ok() {
            host.update_fields(|f| f.apply_problems(&verdict.problems));
            if let Some(first) = verdict.first_invalid() {
                host.focus_field(first);
            }
            return Err(SubmissionError::Validation(verdict.problems));
        }
        host.update_fields(|f| {
            f.clear_errors();
            f.set_disabled(true);
        });

        let session = self.context.borrow().session().cloned();
        let session_tag = session.as_ref().map(|s| s.as_str().to_string());
        let tags = |base: &str| -> Vec<String> {
            std::iter::once(base.to_string())
                .chain(session_tag.clone())
                .collect()
        };

        // UploadingTiles, strictly one after another
        let total = fields.tiles().len();
        let mut uploads = Vec::with_capacity(total);
        host.show_status(
            ProgressEvent::TileUploaded {
                completed: 0,
                total,
            }
            .render(),
        );

        for (index, tile) in fields.tiles().iter().enumerate() {
            self.advance(
                attempt,
                Phase::UploadingTiles {
                    current: index + 1,
                    total,
                },
            )?;

            let file = tile.image.clone().ok_or_else(|| {
                SubmissionError::Unexpected(format!("Memory {} lost its image", tile.slot))
            })?;
            let options = UploadOptions::image(&self.config.folders.images)
                .with_tags(tags(&self.config.tags.image))
                .with_context(tile.upload_context());

            log::info!("Uploading memory {}/{} (slot {})", index + 1, total, tile.slot);
            let descriptor = self
                .bounded(self.uploader.upload(&file, &options))
                .await
                .map_err(|source| SubmissionError::Upload {
                    target: UploadTarget::Tile(tile.slot),
                    source,
                })?;
            self.ensure_current(attempt)?;

            uploads.push(TileUpload::new(tile, descriptor));
            host.show_status(
                ProgressEvent::TileUploaded {
                    completed: index + 1,
                    total,
                }
                .render(),
            );
        }

        // BuildingSummary
        self.advance(attempt, Phase::BuildingSummary)?;
        let snapshot = if self.config.snapshot_enabled {
            self.upload_snapshot(&fields, tags(&self.config.tags.snapshot))
                .await
        } else {
            None
        };
        let document =
            SubmissionDocument::build(session.as_ref(), fields.gift(), uploads, snapshot.as_ref());

        // UploadingSummary
        self.advance(attempt, Phase::UploadingSummary)?;
        host.show_status(ProgressEvent::UploadingSummary.render());
        let options = UploadOptions::raw(&self.config.folders.json)
            .with_tags(tags(&self.config.tags.json))
            .with_filename(SUMMARY_FILENAME);
        let summary = self
            .bounded(upload_json(self.uploader.as_ref(), &document, options))
            .await
            .map_err(|source| SubmissionError::Upload {
                target: UploadTarget::Summary,
                source,
            })?;
        self.ensure_current(attempt)?;
        log::info!("Summary uploaded as {}", summary.public_id);

        // HandingOff
        self.advance(attempt, Phase::HandingOff)?;
        let hand_off = HandOffFields::new(session.as_ref(), &summary, snapshot.as_ref());
        let written = hand_off.clone();
        host.update_fields(move |f| f.set_hand_off(written));
        host.show_status(ProgressEvent::HandingOff.render());

        Ok(hand_off)
    }

    /// Best-effort: any failure is logged and the flow goes on without it
    async fn upload_snapshot(
        &self,
        fields: &FieldRegistry,
        tags: Vec<String>,
    ) -> Option<ContentDescriptor> {
        let images: Vec<MediaFile> = fields
            .tiles()
            .iter()
            .filter_map(|t| t.image.clone())
            .collect();

        let file = match compose_snapshot(&images) {
            Ok(file) => file,
            Err(e) => {
                log::warn!("Snapshot skipped: {}", e);
                return None;
            }
        };

        let options = UploadOptions::image(&self.config.folders.snapshots).with_tags(tags);
        match self.bounded(self.uploader.upload(&file, &options)).await {
            Ok(descriptor) => Some(descriptor),
            Err(e) => {
                log::warn!("Snapshot upload failed: {}", e);
                None
            }
        }
    }

    /// Fails once a page reset made this attempt stale. Checked after every
    /// await, before the attempt touches the host again.
    fn ensure_current(&self, attempt: u64) -> Result<(), SubmissionError> {
        if self.context.borrow().attempt != attempt {
            return Err(SubmissionError::Superseded);
        }
        Ok(())
    }

    /// Moves to `phase` unless this attempt is stale
    fn advance(&self, attempt: u64, phase: Phase) -> Result<(), SubmissionError> {
        self.ensure_current(attempt)?;
        self.context.borrow_mut().set_phase(phase);
        Ok(())
    }

    /// Puts the configured upper bound on a single upload
    async fn bounded<F>(&self, upload: F) -> UploadResult<ContentDescriptor>
    where
        F: Future<Output = UploadResult<ContentDescriptor>>,
    {
        #[cfg(not(target_arch = "wasm32"))]
        {
            tokio::time::timeout(self.config.upload_timeout(), upload)
                .await
                .map_err(|_| UploadError::TimedOut)?
        }
        // No tokio timer in the browser; the request itself carries no deadline there.
        #[cfg(target_arch = "wasm32")]
        {
            upload.await
        }
    }
}
