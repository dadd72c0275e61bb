//! The upload state machine.
//!
//! [`UploadState`] is owned by one widget instance. The host drives it
//! with four inputs:
//!
//! - [`UploadState::begin_drop`] when files are dropped or picked,
//! - [`UploadState::complete_read`] when the file read finishes,
//! - [`UploadState::remove`] when the removal control is activated,
//! - [`UploadState::reconcile`] when the externally owned value changes.
//!
//! Methods that should be reported to the change handler return the
//! value to report; everything else only updates local state.

use tracing::{debug, warn};

use crate::data_uri;
use crate::selection::Selection;
use crate::types::{FileMeta, ImageMime, UploadConfig, UploadError};

/// Whether an image is currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No image selected.
    Empty,
    /// An image is encoded and displayed.
    Present,
}

/// Handle for one in-flight file read.
///
/// Returned by [`UploadState::begin_drop`] and handed back to
/// [`UploadState::complete_read`]. Only the most recently issued
/// ticket is honoured.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "the read result must be passed to `complete_read`"]
pub struct ReadTicket {
    id: u64,
    /// Name of the file being read.
    pub name: String,
    /// Format the bytes will be labelled with.
    pub mime: ImageMime,
}

/// Local state of a single-image upload widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadState {
    config: UploadConfig,
    encoded: Option<String>,
    issue: Option<UploadError>,
    pending: Option<u64>,
    next_ticket: u64,
    picker_generation: u64,
}

impl UploadState {
    /// Create state from the externally supplied initial value.
    ///
    /// An empty string is treated the same as no value.
    #[must_use]
    pub fn new(initial: Option<&str>, config: UploadConfig) -> Self {
        Self {
            config,
            encoded: non_empty(initial),
            issue: None,
            pending: None,
            next_ticket: 0,
            picker_generation: 0,
        }
    }

    /// The configuration this state was created with.
    #[must_use]
    pub const fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// The current data-URI, if an image is present.
    #[must_use]
    pub fn encoded(&self) -> Option<&str> {
        self.encoded.as_deref()
    }

    /// Whether an image is present.
    #[must_use]
    pub const fn is_uploaded(&self) -> bool {
        self.encoded.is_some()
    }

    /// [`Phase::Present`] iff [`UploadState::is_uploaded`].
    #[must_use]
    pub const fn phase(&self) -> Phase {
        if self.is_uploaded() {
            Phase::Present
        } else {
            Phase::Empty
        }
    }

    /// The most recent condition worth showing the user, if any.
    #[must_use]
    pub const fn issue(&self) -> Option<&UploadError> {
        self.issue.as_ref()
    }

    /// Whether a file read has started and not yet completed.
    #[must_use]
    pub const fn is_reading(&self) -> bool {
        self.pending.is_some()
    }

    /// Counter bumped whenever the file input should be replaced.
    ///
    /// A file input keeps its selection and fires no `change` event
    /// when the same file is picked again, so the host keys the input
    /// on this value to remount it after each accepted selection and
    /// each removal.
    #[must_use]
    pub const fn picker_generation(&self) -> u64 {
        self.picker_generation
    }

    /// Whether activating the upload trigger should be blocked from
    /// opening the file picker.
    ///
    /// While an image is present the only way to choose another is to
    /// remove it first.
    #[must_use]
    pub const fn suppress_picker(&self) -> bool {
        self.is_uploaded()
    }

    /// Start handling a drop or picker selection.
    ///
    /// Returns `Ok(None)` without touching state when `disabled` is set.
    /// Otherwise the selection is narrowed to its first file and, if
    /// that file is acceptable, a read ticket is issued. Issuing a
    /// ticket supersedes any read still in flight. A surplus of files
    /// is recorded as the current issue but does not stop the read.
    ///
    /// # Errors
    ///
    /// Returns the [`Selection::from_files`] error when the selection is
    /// empty or the first file has an unaccepted type. The error is also
    /// recorded as the current issue; the displayed image is unchanged.
    pub fn begin_drop(
        &mut self,
        files: &[FileMeta],
        disabled: bool,
    ) -> Result<Option<ReadTicket>, UploadError> {
        if disabled {
            debug!(offered = files.len(), "drop ignored while disabled");
            return Ok(None);
        }

        let selection = match Selection::from_files(files, &self.config) {
            Ok(selection) => selection,
            Err(e) => {
                warn!(error = %e, "selection rejected");
                self.issue = Some(e.clone());
                return Err(e);
            }
        };

        self.issue = selection.surplus();
        if let Some(issue) = &self.issue {
            warn!(%issue, "extra files ignored");
        }

        let id = self.next_ticket;
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.picker_generation = self.picker_generation.wrapping_add(1);
        if let Some(previous) = self.pending.replace(id) {
            debug!(previous, id, "superseding in-flight read");
        }
        debug!(id, name = %selection.file.name, mime = %selection.mime, "read started");

        Ok(Some(ReadTicket {
            id,
            name: selection.file.name,
            mime: selection.mime,
        }))
    }

    /// Finish a read started by [`UploadState::begin_drop`].
    ///
    /// Returns the new data-URI to report to the change handler. Returns
    /// `None` when the ticket is stale (a newer drop, a removal, or a
    /// reconcile happened since), or when the read failed or produced no
    /// bytes; failures are recorded as the current issue.
    pub fn complete_read<E: std::fmt::Display>(
        &mut self,
        ticket: ReadTicket,
        result: Result<Vec<u8>, E>,
    ) -> Option<String> {
        if self.pending != Some(ticket.id) {
            debug!(id = ticket.id, "discarding stale read");
            return None;
        }
        self.pending = None;

        let bytes = match result {
            Ok(bytes) => bytes,
            Err(e) => {
                let err = UploadError::ReadFailed(format!("{}: {e}", ticket.name));
                warn!(error = %err, "read failed");
                self.issue = Some(err);
                return None;
            }
        };
        if bytes.is_empty() {
            warn!(name = %ticket.name, "read produced no bytes");
            self.issue = Some(UploadError::EmptyFile { name: ticket.name });
            return None;
        }

        let uri = data_uri::encode(ticket.mime, &bytes);
        debug!(id = ticket.id, bytes = bytes.len(), "image encoded");
        self.encoded = Some(uri.clone());
        Some(uri)
    }

    /// Clear the image.
    ///
    /// Returns `Some("")` to report to the change handler. When the
    /// state is already empty nothing is reported unless
    /// [`UploadConfig::notify_on_empty_removal`] is set. Any in-flight
    /// read is cancelled.
    pub fn remove(&mut self) -> Option<String> {
        let was_uploaded = self.encoded.take().is_some();
        self.picker_generation = self.picker_generation.wrapping_add(1);
        if self.pending.take().is_some() {
            debug!("in-flight read cancelled by removal");
        }
        self.issue = None;

        if was_uploaded || self.config.notify_on_empty_removal {
            debug!(was_uploaded, "image removed");
            Some(String::new())
        } else {
            None
        }
    }

    /// Reset local state from the externally owned value.
    ///
    /// The external value wins over anything local, including a read
    /// still in flight. Nothing is reported to the change handler: the
    /// caller already knows its own value.
    ///
    /// When the external value is the one already shown (the host
    /// echoing back a reported change) and no read is in flight, the
    /// current issue is kept.
    pub fn reconcile(&mut self, external: Option<&str>) {
        let external = non_empty(external);
        let overridden = self.pending.take().is_some();
        if overridden {
            debug!("in-flight read overridden by external value");
        }
        if self.encoded == external && !overridden {
            return;
        }
        debug!(present = external.is_some(), "reconciled from external value");
        self.encoded = external;
        self.issue = None;
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "data:image/png;base64,AAA";

    fn jpeg(name: &str) -> FileMeta {
        FileMeta::new(name, Some("image/jpeg".into()))
    }

    fn empty() -> UploadState {
        UploadState::new(None, UploadConfig::default())
    }

    /// Drop `files`, complete the read with `bytes`, and return the change.
    fn drop_and_read(state: &mut UploadState, files: &[FileMeta], bytes: &[u8]) -> Option<String> {
        let ticket = state.begin_drop(files, false).unwrap().unwrap();
        state.complete_read(ticket, Ok::<_, String>(bytes.to_vec()))
    }

    #[test]
    fn initial_phase_follows_initial_value() {
        assert_eq!(empty().phase(), Phase::Empty);
        assert_eq!(
            UploadState::new(Some(""), UploadConfig::default()).phase(),
            Phase::Empty
        );
        let state = UploadState::new(Some(SAMPLE), UploadConfig::default());
        assert_eq!(state.phase(), Phase::Present);
        assert_eq!(state.encoded(), Some(SAMPLE));
    }

    #[test]
    fn drop_from_empty_becomes_present() {
        let mut state = empty();
        let change = drop_and_read(&mut state, &[jpeg("a.jpg")], &[0xFF, 0xD8, 0xFF]);

        let uri = change.unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"), "got {uri}");
        assert_eq!(state.encoded(), Some(uri.as_str()));
        assert_eq!(state.phase(), Phase::Present);
        assert!(!state.is_reading());
        assert_eq!(state.issue(), None);
    }

    #[test]
    fn drop_over_present_replaces_image() {
        let mut state = UploadState::new(Some(SAMPLE), UploadConfig::default());
        let png = FileMeta::new("b.png", Some("image/png".into()));
        let change = drop_and_read(&mut state, &[png], &[1, 2, 3]).unwrap();
        assert_eq!(change, "data:image/png;base64,AQID");
        assert_eq!(state.encoded(), Some("data:image/png;base64,AQID"));
    }

    #[test]
    fn display_is_unchanged_while_reading() {
        let mut state = UploadState::new(Some(SAMPLE), UploadConfig::default());
        let ticket = state.begin_drop(&[jpeg("a.jpg")], false).unwrap().unwrap();
        assert!(state.is_reading());
        assert_eq!(state.encoded(), Some(SAMPLE));
        let _ = state.complete_read(ticket, Ok::<_, String>(vec![1]));
        assert!(!state.is_reading());
    }

    #[test]
    fn many_files_match_first_file_outcome() {
        let mut single = empty();
        let mut many = empty();
        let only = drop_and_read(&mut single, &[jpeg("a.jpg")], &[9, 9]);
        let first = drop_and_read(&mut many, &[jpeg("a.jpg"), jpeg("b.jpg")], &[9, 9]);

        assert_eq!(only, first);
        assert_eq!(single.encoded(), many.encoded());
        assert_eq!(
            many.issue(),
            Some(&UploadError::TooManyFiles { ignored: 1 })
        );
    }

    #[test]
    fn disabled_drop_changes_nothing() {
        let mut state = UploadState::new(Some(SAMPLE), UploadConfig::default());
        let before = state.clone();
        let ticket = state.begin_drop(&[jpeg("a.jpg")], true).unwrap();
        assert!(ticket.is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn unsupported_drop_is_rejected_and_recorded() {
        let mut state = UploadState::new(Some(SAMPLE), UploadConfig::default());
        let gif = FileMeta::new("a.gif", Some("image/gif".into()));
        let err = state.begin_drop(&[gif], false).unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType { .. }));
        assert_eq!(state.issue(), Some(&err));
        assert_eq!(state.encoded(), Some(SAMPLE));
        assert!(!state.is_reading());
    }

    #[test]
    fn read_failure_keeps_previous_image() {
        let mut state = UploadState::new(Some(SAMPLE), UploadConfig::default());
        let ticket = state.begin_drop(&[jpeg("a.jpg")], false).unwrap().unwrap();
        let change = state.complete_read(ticket, Err::<Vec<u8>, _>("permission denied"));

        assert_eq!(change, None);
        assert_eq!(state.encoded(), Some(SAMPLE));
        assert_eq!(
            state.issue(),
            Some(&UploadError::ReadFailed("a.jpg: permission denied".into()))
        );
    }

    #[test]
    fn empty_file_is_rejected() {
        let mut state = empty();
        let change = drop_and_read(&mut state, &[jpeg("zero.jpg")], &[]);
        assert_eq!(change, None);
        assert_eq!(state.phase(), Phase::Empty);
        assert_eq!(
            state.issue(),
            Some(&UploadError::EmptyFile {
                name: "zero.jpg".into()
            })
        );
    }

    #[test]
    fn newer_drop_supersedes_older_read() {
        let mut state = empty();
        let first = state.begin_drop(&[jpeg("a.jpg")], false).unwrap().unwrap();
        let second = state.begin_drop(&[jpeg("b.jpg")], false).unwrap().unwrap();

        assert_eq!(state.complete_read(first, Ok::<_, String>(vec![1])), None);
        assert_eq!(state.phase(), Phase::Empty);

        let change = state.complete_read(second, Ok::<_, String>(vec![2]));
        assert!(change.is_some());
        assert_eq!(state.encoded(), change.as_deref());
    }

    #[test]
    fn remove_from_present_reports_empty_string() {
        let mut state = UploadState::new(Some(SAMPLE), UploadConfig::default());
        assert_eq!(state.remove(), Some(String::new()));
        assert_eq!(state.phase(), Phase::Empty);
        assert_eq!(state.encoded(), None);
    }

    #[test]
    fn remove_when_empty_is_silent_by_default() {
        let mut state = empty();
        let before = state.clone();
        assert_eq!(state.remove(), None);
        assert_eq!(state, before);
    }

    #[test]
    fn remove_when_empty_can_still_notify() {
        let config = UploadConfig {
            notify_on_empty_removal: true,
            ..UploadConfig::default()
        };
        let mut state = UploadState::new(None, config);
        assert_eq!(state.remove(), Some(String::new()));
        assert_eq!(state.phase(), Phase::Empty);
    }

    #[test]
    fn remove_cancels_in_flight_read() {
        let mut state = UploadState::new(Some(SAMPLE), UploadConfig::default());
        let ticket = state.begin_drop(&[jpeg("a.jpg")], false).unwrap().unwrap();
        assert_eq!(state.remove(), Some(String::new()));
        assert_eq!(state.complete_read(ticket, Ok::<_, String>(vec![1])), None);
        assert_eq!(state.phase(), Phase::Empty);
    }

    #[test]
    fn reconcile_adopts_external_value() {
        let mut state = empty();
        state.reconcile(Some(SAMPLE));
        assert_eq!(state.phase(), Phase::Present);
        assert_eq!(state.encoded(), Some(SAMPLE));

        state.reconcile(Some(""));
        assert_eq!(state.phase(), Phase::Empty);
    }

    #[test]
    fn reconcile_overrides_in_flight_read() {
        let mut state = empty();
        let ticket = state.begin_drop(&[jpeg("a.jpg")], false).unwrap().unwrap();
        state.reconcile(Some(SAMPLE));

        assert_eq!(state.complete_read(ticket, Ok::<_, String>(vec![1])), None);
        assert_eq!(state.encoded(), Some(SAMPLE));
    }

    #[test]
    fn echoed_value_keeps_surplus_notice() {
        let mut state = empty();
        let uri = drop_and_read(&mut state, &[jpeg("a.jpg"), jpeg("b.jpg")], &[7]).unwrap();
        assert_eq!(
            state.issue(),
            Some(&UploadError::TooManyFiles { ignored: 1 })
        );

        state.reconcile(Some(&uri));
        assert_eq!(state.encoded(), Some(uri.as_str()));
        assert_eq!(
            state.issue(),
            Some(&UploadError::TooManyFiles { ignored: 1 })
        );
    }

    #[test]
    fn echoed_value_during_read_still_cancels_it() {
        let mut state = UploadState::new(Some(SAMPLE), UploadConfig::default());
        let ticket = state.begin_drop(&[jpeg("a.jpg"), jpeg("b.jpg")], false).unwrap().unwrap();
        state.reconcile(Some(SAMPLE));
        assert!(!state.is_reading());
        assert_eq!(state.issue(), None);
        assert_eq!(state.complete_read(ticket, Ok::<_, String>(vec![1])), None);
    }

    #[test]
    fn picker_is_replaced_after_selection_and_removal() {
        let mut state = empty();
        let start = state.picker_generation();

        let _ = drop_and_read(&mut state, &[jpeg("a.jpg")], &[1]);
        let after_pick = state.picker_generation();
        assert_ne!(after_pick, start);

        let _ = state.remove();
        let after_remove = state.picker_generation();
        assert_ne!(after_remove, after_pick);

        // Picking the same file again goes through a fresh input.
        let change = drop_and_read(&mut state, &[jpeg("a.jpg")], &[1]);
        assert!(change.is_some());
        assert_ne!(state.picker_generation(), after_remove);
    }

    #[test]
    fn rejected_or_disabled_selection_keeps_picker() {
        let mut state = empty();
        let start = state.picker_generation();
        let _ = state.begin_drop(&[jpeg("a.jpg")], true);
        let _ = state.begin_drop(&[FileMeta::new("a.gif", None)], false);
        assert_eq!(state.picker_generation(), start);
    }

    #[test]
    fn reconcile_to_new_value_clears_issue() {
        let mut state = empty();
        let _ = state.begin_drop(&[], false);
        assert_eq!(state.issue(), Some(&UploadError::NoFiles));
        state.reconcile(Some(SAMPLE));
        assert_eq!(state.issue(), None);
    }

    #[test]
    fn picker_is_suppressed_only_while_present() {
        let mut state = empty();
        assert!(!state.suppress_picker());
        state.reconcile(Some(SAMPLE));
        assert!(state.suppress_picker());
        let _ = state.remove();
        assert!(!state.suppress_picker());
    }
}
