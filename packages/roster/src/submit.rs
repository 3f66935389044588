//! Registration submitter: draft → validation → single store insert.
//!
//! [`Submitter::submit`] runs the whole flow against a store. Reactive UIs that
//! cannot hold a borrow of their state across an await use the two halves instead:
//! [`Submitter::begin`] before the store call and [`Submitter::finish`] after it.

use crate::draft::{Draft, Field};
use crate::error::{StoreError, SubmitError};
use crate::models::{NewRegistration, Registration};
use crate::store::RegistrationStore;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Submitter {
    draft: Draft,
    in_flight: bool,
}

/// Clears the in-flight flag when dropped, including on cancellation.
struct InFlight<'a>(&'a mut bool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

impl Submitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.draft.set(field, value);
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Validate the draft and mark a submission as started.
    ///
    /// Returns the payload to send. Nothing is marked in flight on error.
    pub fn begin(&mut self) -> Result<NewRegistration, SubmitError> {
        if self.in_flight {
            return Err(SubmitError::Busy);
        }
        let registration = self.draft.validate()?;
        self.in_flight = true;
        Ok(registration)
    }

    /// Record the store's answer for a submission started with [`Submitter::begin`].
    ///
    /// Clears the draft on success and keeps it on failure. The in-flight flag is
    /// reset either way.
    pub fn finish(
        &mut self,
        outcome: Result<Registration, StoreError>,
    ) -> Result<Registration, SubmitError> {
        self.in_flight = false;
        self.settle(outcome)
    }

    /// Validate, insert and settle in one go.
    pub async fn submit<S: RegistrationStore>(
        &mut self,
        store: &S,
    ) -> Result<Registration, SubmitError> {
        let registration = self.begin()?;
        let outcome = {
            let _guard = InFlight(&mut self.in_flight);
            store.create(registration).await
        };
        self.settle(outcome)
    }

    fn settle(
        &mut self,
        outcome: Result<Registration, StoreError>,
    ) -> Result<Registration, SubmitError> {
        match outcome {
            Ok(record) => {
                tracing::info!(id = %record.id, "registration created");
                self.draft.clear();
                Ok(record)
            }
            Err(err) => {
                tracing::warn!(error = %err, "registration rejected");
                Err(err.into())
            }
        }
    }
}
