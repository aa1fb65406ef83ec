//! Stage-ordered composition session.

use crate::models::DeviceId;
use crate::publish::{Dispatcher, PublishOutcome};
use crate::sources::DocumentStore;

use super::action::Action;
use super::errors::{CompositionError, CompositionResult};
use super::reducer::{reduce, CompositionRules, Draft};
use super::stage::Stage;

/// One operator session: the draft, the current wizard stage, and the
/// dispatcher that publishes the result.
///
/// Actions are only accepted in their own stage. Going back never discards
/// the draft; a successful publish resets it.
pub struct Composer<S> {
    draft: Draft,
    stage: Stage,
    rules: CompositionRules,
    dispatcher: Dispatcher<S>,
    last_failed: Vec<DeviceId>,
}

impl<S: DocumentStore> Composer<S> {
    pub fn new(dispatcher: Dispatcher<S>) -> Self {
        Self::with_rules(dispatcher, CompositionRules::default())
    }

    pub fn with_rules(dispatcher: Dispatcher<S>, rules: CompositionRules) -> Self {
        Self {
            draft: Draft::new(),
            stage: Stage::Layout,
            rules,
            dispatcher,
            last_failed: Vec::new(),
        }
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn rules(&self) -> &CompositionRules {
        &self.rules
    }

    pub fn dispatcher(&self) -> &Dispatcher<S> {
        &self.dispatcher
    }

    /// Devices whose write failed in the last publish attempt.
    pub fn last_failed(&self) -> &[DeviceId] {
        &self.last_failed
    }

    /// Operator-facing position, e.g. "Step 2 of 3: Content".
    pub fn progress(&self) -> String {
        let step = self.stage.index().min(Stage::STEPS - 1) + 1;
        format!("Step {} of {}: {}", step, Stage::STEPS, self.stage.title())
    }

    /// Apply a non-submitting action to the draft.
    ///
    /// `Submit` is accepted here but publishes nothing; use [`dispatch`]
    /// or [`submit`] to publish.
    ///
    /// [`dispatch`]: Composer::dispatch
    /// [`submit`]: Composer::submit
    pub fn apply(&mut self, action: Action) -> CompositionResult<()> {
        if action.stage() != self.stage {
            return Err(CompositionError::WrongStage {
                action: action.name(),
                stage: self.stage,
            });
        }
        if matches!(action, Action::Submit) {
            return Err(CompositionError::SubmitNotApplied);
        }
        tracing::debug!(action = action.name(), stage = %self.stage, "Applying action");
        let next = reduce(&self.draft, &action, &self.rules)?;
        // A retry must resend what failed, not a later edit.
        if !self.last_failed.is_empty() && next.config != self.draft.config {
            tracing::debug!(devices = self.last_failed.len(), "Draft edited, dropping retry set");
            self.last_failed.clear();
        }
        self.draft = next;
        Ok(())
    }

    /// Apply an action, publishing when it is `Submit`.
    pub async fn dispatch(&mut self, action: Action) -> CompositionResult<Option<PublishOutcome>> {
        match action {
            Action::Submit => self.submit().await.map(Some),
            other => self.apply(other).map(|()| None),
        }
    }

    /// Move to the next stage. Leaving `Targets` is only possible by
    /// submitting.
    pub fn next(&mut self) -> CompositionResult<Stage> {
        let next = self
            .stage
            .next()
            .ok_or(CompositionError::CannotAdvance(self.stage))?;
        self.stage = next;
        Ok(next)
    }

    /// Return to an earlier (or the current) stage with the draft intact.
    pub fn back_to(&mut self, target: Stage) -> CompositionResult<()> {
        if target == Stage::Submitted || target.index() > self.stage.index() {
            return Err(CompositionError::NotVisited {
                target,
                current: self.stage,
            });
        }
        self.stage = target;
        Ok(())
    }

    /// Step back once.
    pub fn back(&mut self) -> CompositionResult<Stage> {
        let previous = self.stage.previous().ok_or(CompositionError::NotVisited {
            target: self.stage,
            current: self.stage,
        })?;
        self.stage = previous;
        Ok(previous)
    }

    /// Publish the draft to its targets.
    ///
    /// On success the session resets. A validation failure returns the
    /// operator to the stage that can fix it; write failures leave them on
    /// the target stage with the failed devices recorded for
    /// [`retry_failed`](Composer::retry_failed).
    pub async fn submit(&mut self) -> CompositionResult<PublishOutcome> {
        if self.stage != Stage::Targets {
            return Err(CompositionError::WrongStage {
                action: Action::Submit.name(),
                stage: self.stage,
            });
        }
        self.stage = Stage::Submitted;

        let config = self.draft.config.clone();
        let targets = self.draft.targets.clone();
        let outcome = self.dispatcher.publish(&config, &targets).await;
        self.settle(&outcome);
        Ok(outcome)
    }

    /// Publish the draft again, only to devices that failed last time.
    pub async fn retry_failed(&mut self) -> CompositionResult<PublishOutcome> {
        if self.last_failed.is_empty() {
            return Err(CompositionError::NothingToRetry);
        }
        if self.stage != Stage::Targets {
            return Err(CompositionError::WrongStage {
                action: "RetryFailed",
                stage: self.stage,
            });
        }
        self.stage = Stage::Submitted;

        let config = self.draft.config.clone();
        let targets = self.last_failed.iter().cloned().collect();
        tracing::info!(devices = self.last_failed.len(), "Retrying failed devices");
        let outcome = self.dispatcher.publish(&config, &targets).await;
        self.settle(&outcome);
        Ok(outcome)
    }

    /// Discard the draft and start over.
    pub fn reset(&mut self) {
        self.draft = Draft::new();
        self.stage = Stage::Layout;
        self.last_failed.clear();
    }

    fn settle(&mut self, outcome: &PublishOutcome) {
        match outcome {
            PublishOutcome::Published { devices } => {
                tracing::info!(devices = devices.len(), "Composition published");
                self.reset();
            }
            PublishOutcome::ValidationFailed(error) => {
                self.stage = if error.concerns_content() {
                    Stage::Content
                } else {
                    Stage::Targets
                };
            }
            PublishOutcome::PartialFailure { .. } | PublishOutcome::Failed { .. } => {
                self.stage = Stage::Targets;
                self.last_failed = outcome.failed_ids();
            }
        }
    }
}
