use crate::errors::ClientError;

/// Loading and error status shared by every form.
///
/// Mutated only through [`FormState::begin`] and the resulting
/// [`LoadingGuard`], plus [`FormState::reject`] for local validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    loading: bool,
    error: Option<String>,
}

impl FormState {
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The current user-facing error, if the last operation failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Marks a submission as started and clears the previous error.
    ///
    /// The loading flag is cleared when the guard is resolved or dropped, so
    /// abandoning the pending future still leaves the form re-submittable.
    pub fn begin(&mut self) -> LoadingGuard<'_> {
        self.loading = true;
        self.error = None;
        LoadingGuard { state: self }
    }

    /// Records a failure that happened before any request was sent.
    pub fn reject(&mut self, err: ClientError) -> ClientError {
        tracing::debug!("Submission rejected: {}", err);
        self.loading = false;
        self.error = Some(err.user_message());
        err
    }
}

/// Holds a form in the loading state until resolved.
#[must_use = "dropping the guard immediately ends the loading state"]
pub struct LoadingGuard<'a> {
    state: &'a mut FormState,
}

impl LoadingGuard<'_> {
    pub fn succeed(self) {}

    /// Stores the error's user message, replacing any earlier one.
    pub fn fail(self, err: ClientError) -> ClientError {
        self.state.error = Some(err.user_message());
        err
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_sets_loading_and_clears_error() {
        let mut state = FormState::default();
        state.reject(ClientError::Validation("Please enter both names.".to_string()));
        assert_eq!(state.error(), Some("Please enter both names."));

        let guard = state.begin();
        drop(guard);

        assert!(!state.is_loading());
        assert!(state.error().is_none());
    }

    #[test]
    fn test_guard_holds_loading() {
        let mut state = FormState::default();
        {
            let guard = state.begin();
            assert!(guard.state.loading);
            guard.succeed();
        }
        assert!(!state.is_loading());
    }

    #[test]
    fn test_fail_records_message_and_clears_loading() {
        let mut state = FormState::default();
        let err = state
            .begin()
            .fail(ClientError::Request("Failed to load notes.".to_string()));

        assert!(err.is_request());
        assert!(!state.is_loading());
        assert_eq!(state.error(), Some("Failed to load notes."));
    }
}
