use crate::logic::{validate, ValidationError, ValidationOptions};
use crate::model::{AttributeDefinition, DataType, Id, Scope, ValueBody};
use std::time::{Duration, Instant};

/// How long the transient "saved" indicator is shown before the row reverts
/// to idle.
pub const SAVED_COOLDOWN: Duration = Duration::from_millis(2000);

/// Per-edit lifecycle: `idle -> editing -> saving -> {saved -> idle | error
/// -> editing}`.
#[derive(Debug, Clone, PartialEq)]
pub enum EditState {
    Idle,
    Editing {
        draft: ValueBody,
        error: Option<String>,
    },
    Saving {
        draft: ValueBody,
    },
    Saved {
        since: Instant,
    },
}

/// State machine for one in-flight attribute edit. This is the UI-host
/// facing half of the save path: the host feeds input through `set_draft`,
/// `submit` gates on validation and yields the payload to hand to
/// `AttributeEditor::save_value`, and the save outcome is reported back
/// through `mark_saved`/`mark_error`.
#[derive(Debug, Clone)]
pub struct EditSession {
    pub attribute_id: Id,
    pub scope: Scope,
    /// Whether the attribute had a stored value when the session started.
    /// On cancel of a fresh add, the stub row shown for the edit is removed.
    pub had_stored_value: bool,
    state: EditState,
}

impl EditSession {
    pub fn new(attribute_id: Id, scope: Scope, had_stored_value: bool) -> Self {
        Self {
            attribute_id,
            scope,
            had_stored_value,
            state: EditState::Idle,
        }
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    /// User clicked "add": seed a fresh draft for the data type.
    pub fn begin(&mut self, data_type: DataType) {
        self.state = EditState::Editing {
            draft: ValueBody::draft(data_type),
            error: None,
        };
    }

    /// User clicked "edit" on an existing value.
    pub fn begin_with(&mut self, body: ValueBody) {
        self.state = EditState::Editing {
            draft: body,
            error: None,
        };
    }

    /// User keeps typing: replace the draft, clearing any stale error.
    pub fn set_draft(&mut self, body: ValueBody) {
        if let EditState::Editing { .. } = self.state {
            self.state = EditState::Editing {
                draft: body,
                error: None,
            };
        }
    }

    /// User submits. Client-side validation must pass before the transition
    /// to saving; otherwise the session stays in editing with the error
    /// attached inline. Returns the (possibly normalized) payload to send.
    pub fn submit(
        &mut self,
        def: &AttributeDefinition,
        options: &ValidationOptions,
    ) -> Result<ValueBody, ValidationError> {
        let draft = match &self.state {
            EditState::Editing { draft, .. } => draft.clone(),
            _ => {
                return Err(ValidationError::MandatoryMissing {
                    attribute: self.attribute_id.clone(),
                })
            }
        };
        match validate(def, &draft, options) {
            Ok(validated) => {
                self.state = EditState::Saving {
                    draft: validated.clone(),
                };
                Ok(validated)
            }
            Err(e) => {
                self.state = EditState::Editing {
                    draft,
                    error: Some(e.to_string()),
                };
                Err(e)
            }
        }
    }

    /// Server accepted. The saved indicator shows until the cool-down
    /// elapses.
    pub fn mark_saved(&mut self, now: Instant) {
        if matches!(self.state, EditState::Saving { .. }) {
            self.state = EditState::Saved { since: now };
            self.had_stored_value = true;
        }
    }

    /// Server rejected: back to editing with the message attached so the
    /// user can retry.
    pub fn mark_error(&mut self, message: impl Into<String>) {
        if let EditState::Saving { draft } = &self.state {
            self.state = EditState::Editing {
                draft: draft.clone(),
                error: Some(message.into()),
            };
        }
    }

    /// Discard the draft. Returns true when the stub row created to show
    /// the edit should also be removed (the attribute had no stored value).
    pub fn cancel(&mut self) -> bool {
        self.state = EditState::Idle;
        !self.had_stored_value
    }

    /// Advance time-driven transitions: saved reverts to idle after the
    /// cool-down window.
    pub fn tick(&mut self, now: Instant) {
        if let EditState::Saved { since } = self.state {
            if now.duration_since(since) >= SAVED_COOLDOWN {
                self.state = EditState::Idle;
            }
        }
    }
}
