//! Query/subject session store.
//!
//! A `Session` holds the last two sequences picked for comparison. It is an
//! ordinary owned value: the caller creates it, writes the slots, and passes
//! it to [`crate::align::align`].

use thiserror::Error;

/// Errors raised when reading an incomplete session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No query sequence set")]
    MissingQuery,

    #[error("No subject sequence set")]
    MissingSubject,
}

/// The two sequence slots used for pairwise comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    query: Option<String>,
    subject: Option<String>,
}

impl Session {
    /// Creates a session with both slots unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the query slot.
    pub fn set_query(&mut self, seq: impl Into<String>) {
        self.query = Some(seq.into());
    }

    /// Overwrites the subject slot.
    pub fn set_subject(&mut self, seq: impl Into<String>) {
        self.subject = Some(seq.into());
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Returns `(query, subject)`, or the first missing slot as an error.
    ///
    /// A slot explicitly set to the empty string counts as set.
    pub fn pair(&self) -> Result<(&str, &str), SessionError> {
        let query = self.query().ok_or(SessionError::MissingQuery)?;
        let subject = self.subject().ok_or(SessionError::MissingSubject)?;
        Ok((query, subject))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert_eq!(session.query(), None);
        assert_eq!(session.subject(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let mut session = Session::new();
        session.set_query("ACGT");
        session.set_query("TTTT");
        session.set_subject("GGGG");
        assert_eq!(session.query(), Some("TTTT"));
        assert_eq!(session.subject(), Some("GGGG"));
    }

    #[test]
    fn test_pair_requires_both_slots() {
        let mut session = Session::new();
        assert_eq!(session.pair(), Err(SessionError::MissingQuery));

        session.set_subject("GGGG");
        assert_eq!(session.pair(), Err(SessionError::MissingQuery));

        let mut session = Session::new();
        session.set_query("ACGT");
        assert_eq!(session.pair(), Err(SessionError::MissingSubject));

        session.set_subject("GGGG");
        assert_eq!(session.pair(), Ok(("ACGT", "GGGG")));
    }

    #[test]
    fn test_empty_string_counts_as_set() {
        let mut session = Session::new();
        session.set_query("");
        session.set_subject("");
        assert_eq!(session.pair(), Ok(("", "")));
    }
}
