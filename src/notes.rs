use crate::api_client::MatchApiClient;
use crate::errors::ClientError;
use crate::form_state::FormState;
use crate::models::Note;
use crate::validation::{require_non_blank, MISSING_NOTE_TEXT};

pub const NOTES_LOAD_FAILED: &str = "Failed to load notes.";
pub const NOTE_ADD_FAILED: &str = "Failed to add note.";
pub const NOTE_DELETE_FAILED: &str = "Failed to delete note.";

/// Local copy of the Notes Service collection.
///
/// Kept in server order. Adds and deletes patch the local list instead of
/// re-fetching it; failures leave it untouched.
pub struct NotesCache {
    client: MatchApiClient,
    state: FormState,
    notes: Vec<Note>,
}

impl NotesCache {
    pub fn new(client: MatchApiClient) -> Self {
        Self {
            client,
            state: FormState::default(),
            notes: Vec::new(),
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Replaces the local list with the server's current one.
    pub async fn load(&mut self) -> Result<&[Note], ClientError> {
        let guard = self.state.begin();
        match self.client.list_notes().await {
            Ok(notes) => {
                tracing::info!("Loaded {} notes", notes.len());
                self.notes = notes;
                guard.succeed();
                Ok(self.notes.as_slice())
            }
            Err(e) => {
                tracing::error!("Failed to load notes: {}", e);
                Err(guard.fail(ClientError::Request(NOTES_LOAD_FAILED.to_string())))
            }
        }
    }

    /// Creates a note and appends the server's copy. Blank text never leaves the client.
    pub async fn add(&mut self, text: &str) -> Result<Note, ClientError> {
        let text = match require_non_blank(text, MISSING_NOTE_TEXT) {
            Ok(text) => text,
            Err(e) => return Err(self.state.reject(e)),
        };

        let guard = self.state.begin();
        match self.client.create_note(text).await {
            Ok(note) => {
                self.notes.push(note.clone());
                guard.succeed();
                Ok(note)
            }
            Err(e) => {
                tracing::error!("Failed to add note: {}", e);
                Err(guard.fail(ClientError::Request(NOTE_ADD_FAILED.to_string())))
            }
        }
    }

    /// Deletes a note on the server, then drops it from the local list.
    pub async fn delete(&mut self, id: i64) -> Result<(), ClientError> {
        let guard = self.state.begin();
        match self.client.delete_note(id).await {
            Ok(()) => {
                let before = self.notes.len();
                self.notes.retain(|note| note.id != id);
                if self.notes.len() == before {
                    tracing::warn!("Deleted note {} was not in the local cache", id);
                }
                guard.succeed();
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to delete note {}: {}", id, e);
                Err(guard.fail(ClientError::Request(NOTE_DELETE_FAILED.to_string())))
            }
        }
    }
}
