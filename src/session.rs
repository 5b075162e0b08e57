//! Live validation state for one form session.
//!
//! The host owns time. Each change goes through [`ValidationEngine::on_change`]
//! with the current instant, and the host calls [`ValidationEngine::poll`] from
//! its event loop. Only the trailing change of a burst is validated:
//!
//! ```text
//! Idle ──on_change──▶ Debouncing ──poll (deadline passed)──▶ Idle
//!                       │   ▲
//!                       └───┘ on_change replaces the pending snapshot
//! ```
//!
//! [`ValidationEngine::validate_with_dependencies`] runs immediately and does
//! not touch the pending run.

use crate::enums::DebouncePhase;
use crate::types::{
    FieldValidation, FormData, ValidationOptions, ValidationSchema, ValidationState,
};
use crate::validate::{validate_all, validate_field};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

#[derive(Clone, Debug)]
struct PendingRun {
    data: FormData,
    due: Instant,
}

/// Error, warning and touched-field state of one form session.
#[derive(Clone, Debug)]
pub struct ValidationEngine {
    schema: ValidationSchema,
    options: ValidationOptions,
    errors: BTreeMap<String, String>,
    warnings: BTreeMap<String, String>,
    touched: BTreeSet<String>,
    pending: Option<PendingRun>,
}

impl ValidationEngine {
    pub fn new(schema: ValidationSchema) -> Self {
        ValidationEngine::with_options(schema, ValidationOptions::default())
    }

    pub fn with_options(schema: ValidationSchema, options: ValidationOptions) -> Self {
        ValidationEngine {
            schema,
            options,
            errors: BTreeMap::new(),
            warnings: BTreeMap::new(),
            touched: BTreeSet::new(),
            pending: None,
        }
    }

    pub fn schema(&self) -> &ValidationSchema {
        &self.schema
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Validates every schema field and replaces the live maps wholesale.
    pub fn validate_all(&mut self, data: &FormData) -> ValidationState {
        let state = validate_all(&self.schema, data, &self.options);
        self.errors = state.errors.clone();
        self.warnings = state.warnings.clone();
        tracing::debug!(
            fields = self.schema.fields.len(),
            errors = self.errors.len(),
            "validated form"
        );
        state
    }

    // ─── Debounce ───────────────────────────────────────────────────────────

    /// Schedules validation of `data` one debounce window after `now`,
    /// replacing any pending run.
    pub fn on_change(&mut self, data: &FormData, now: Instant) {
        if !self.options.validate_on_change {
            return;
        }
        if self.pending.is_some() {
            tracing::trace!("replacing pending validation");
        }
        self.pending = Some(PendingRun {
            data: data.clone(),
            due: now + self.options.debounce,
        });
    }

    /// Runs the pending validation if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<ValidationState> {
        match &self.pending {
            Some(run) if now >= run.due => {}
            _ => return None,
        }
        let run = self.pending.take()?;
        Some(self.validate_all(&run.data))
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|run| run.due)
    }

    pub fn phase(&self) -> DebouncePhase {
        if self.pending.is_some() {
            DebouncePhase::Debouncing
        } else {
            DebouncePhase::Idle
        }
    }

    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    // ─── Dependency propagation ─────────────────────────────────────────────

    /// Re-validates `changed` and every field declaring it in `dependsOn`,
    /// merging only those results into the live maps.
    pub fn validate_with_dependencies(
        &mut self,
        changed: &str,
        data: &FormData,
    ) -> ValidationState {
        let mut targets: Vec<String> = Vec::new();
        if self.schema.get(changed).is_some() {
            targets.push(changed.to_string());
        }
        targets.extend(
            self.schema
                .dependents_of(changed)
                .filter(|name| *name != changed)
                .map(str::to_string),
        );

        for field in &targets {
            let Some(rule) = self.schema.get(field) else {
                continue;
            };
            let result = validate_field(field, rule, data, &self.options);
            match result.error {
                Some(error) => {
                    self.errors.insert(field.clone(), error);
                }
                None => {
                    self.errors.remove(field);
                }
            }
            match result.warning {
                Some(warning) => {
                    self.warnings.insert(field.clone(), warning);
                }
                None => {
                    self.warnings.remove(field);
                }
            }
        }

        tracing::debug!(changed, revalidated = targets.len(), "validated dependents");
        self.validation_state()
    }

    // ─── Touched fields and per-field queries ───────────────────────────────

    pub fn touch_field(&mut self, field: &str) {
        self.touched.insert(field.to_string());
    }

    /// Marks every schema field as touched, e.g. on a submit attempt.
    pub fn touch_all(&mut self) {
        self.touched.extend(self.schema.fields.keys().cloned());
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    pub fn get_field_validation(&self, field: &str) -> FieldValidation {
        let error = self.errors.get(field).cloned();
        let warning = self.warnings.get(field).cloned();
        let is_touched = self.is_touched(field);
        FieldValidation {
            is_valid: error.is_none(),
            show_error: is_touched && error.is_some(),
            show_warning: is_touched && warning.is_some(),
            error,
            warning,
            is_touched,
        }
    }

    /// Drops the live error and warning of one field without re-validating.
    pub fn clear_field_validation(&mut self, field: &str) {
        self.errors.remove(field);
        self.warnings.remove(field);
    }

    /// Clears errors, warnings, touched fields and any pending run.
    pub fn reset(&mut self) {
        self.errors.clear();
        self.warnings.clear();
        self.touched.clear();
        self.pending = None;
    }

    /// Aggregate of the live maps.
    pub fn validation_state(&self) -> ValidationState {
        ValidationState {
            is_valid: self.errors.is_empty(),
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
            field_validation: self
                .schema
                .fields
                .keys()
                .map(|name| (name.clone(), !self.errors.contains_key(name)))
                .collect(),
        }
    }
}
