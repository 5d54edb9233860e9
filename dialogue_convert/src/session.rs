//! Holder for the source, options and latest result of an interactive
//! conversion, where the source or options may change while a conversion is
//! still running.

use std::sync::{Mutex, MutexGuard, PoisonError};

use dialogue_data::DialogueDocument;
use log::debug;

use crate::{ConvertOptions, SourceDocument, convert_source};

/// Identifies one started conversion. Later tickets compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
struct SessionState {
    source: Option<SourceDocument>,
    options: ConvertOptions,
    issued: u64,
    latest: Option<DialogueDocument>,
}

/// Last-initiated-wins result slot.
///
/// Only the result of the most recently started conversion is accepted;
/// changing the source or options drops the stored result and turns every
/// in-flight ticket stale.
#[derive(Debug, Default)]
pub struct ConversionSession {
    state: Mutex<SessionState>,
}

impl ConversionSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a conversion. Any ticket issued earlier becomes stale.
    pub fn begin(&self) -> Ticket {
        let mut state = self.state();
        state.issued += 1;
        Ticket(state.issued)
    }

    /// Store `document` if `ticket` is still the newest one. Returns whether
    /// the result was accepted.
    pub fn finish(&self, ticket: Ticket, document: DialogueDocument) -> bool {
        let mut state = self.state();
        if ticket.0 != state.issued {
            debug!("discarding stale conversion #{} (latest is #{})", ticket.0, state.issued);
            return false;
        }
        state.latest = Some(document);
        true
    }

    /// The accepted result, if any.
    pub fn latest(&self) -> Option<DialogueDocument> {
        self.state().latest.clone()
    }

    pub fn options(&self) -> ConvertOptions {
        self.state().options
    }

    pub fn set_source(&self, source: SourceDocument) {
        let mut state = self.state();
        state.source = Some(source);
        Self::invalidate(&mut state);
    }

    pub fn set_options(&self, options: ConvertOptions) {
        let mut state = self.state();
        if state.options != options {
            state.options = options;
            Self::invalidate(&mut state);
        }
    }

    fn invalidate(state: &mut SessionState) {
        state.issued += 1;
        state.latest = None;
    }

    /// Convert the current source with the current options.
    ///
    /// The conversion itself runs without holding the lock. Returns the
    /// document when it was accepted, `None` when there is no source or a
    /// newer conversion (or a source/options change) overtook this one.
    pub fn run(&self) -> Option<DialogueDocument> {
        let (ticket, source, options) = {
            let mut state = self.state();
            let source = state.source.clone()?;
            state.issued += 1;
            (Ticket(state.issued), source, state.options)
        };
        let doc = convert_source(&source, &options);
        self.finish(ticket, doc.clone()).then_some(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn source(text: &str) -> SourceDocument {
        SourceDocument::parse(text).unwrap()
    }

    #[test]
    fn newest_ticket_wins() {
        let session = ConversionSession::new();
        let old = session.begin();
        let new = session.begin();
        assert!(old < new);
        assert!(session.finish(new, DialogueDocument::with_all_tiers()));
        assert!(!session.finish(old, DialogueDocument::default()));
        assert_eq!(session.latest(), Some(DialogueDocument::with_all_tiers()));
    }

    #[test]
    fn source_change_invalidates() {
        let session = ConversionSession::new();
        session.set_source(source(r#"{"Mon": "Hi!"}"#));
        let doc = session.run().unwrap();
        assert!(doc.line(0, "Hi!").is_some());

        let ticket = session.begin();
        session.set_source(source(r#"{"Tue": "Hey."}"#));
        assert!(session.latest().is_none());
        assert!(!session.finish(ticket, doc));
    }

    #[test]
    fn options_change_reconverts() {
        let session = ConversionSession::new();
        session.set_source(source(r#"{"Mon": "Hi!"}"#));
        assert_eq!(session.run().unwrap().line_count(), 1);
        session.set_options(ConvertOptions { expand_all: true });
        assert!(session.latest().is_none());
        assert_eq!(session.run().unwrap().line_count(), 11);
        assert!(session.options().expand_all);
    }

    #[test]
    fn run_without_source() {
        assert!(ConversionSession::new().run().is_none());
    }

    #[test]
    fn concurrent_runs_keep_one_result() {
        let session = Arc::new(ConversionSession::new());
        session.set_source(source(r#"{"Mon": "Hi!", "3": "Howdy"}"#));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let session = Arc::clone(&session);
                thread::spawn(move || session.run().is_some())
            })
            .collect();
        let accepted = handles.into_iter().map(|h| h.join().unwrap()).filter(|ok| *ok).count();
        assert!(accepted >= 1);
        let latest = session.latest().unwrap();
        assert_eq!(latest.default_line(3), Some("Howdy"));
    }
}
