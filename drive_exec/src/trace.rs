//! # Trace output
//!
//! Sequencer and feedback loop diagnostics are reported through a
//! [`TraceSink`] rather than scattered debug flags. The drive code only calls
//! the trait, what happens to the records is up to the sink.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, warn};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use util::{
    archive::{ArchiveError, Archiver},
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State of a sequencer at one tick.
#[derive(Debug, Clone, Serialize)]
pub struct StateTrace {
    pub elapsed_s: f64,
    pub sequencer: String,
    pub state: String,
    pub x: f64,
    pub y: f64,
    pub heading_deg: f64,
    pub target_heading_deg: f64,
}

/// State of one feedback loop at one tick.
#[derive(Debug, Clone, Serialize)]
pub struct PidTrace {
    pub elapsed_s: f64,
    pub axis: String,
    pub target: f64,
    pub input: f64,
    pub error: f64,
    pub output: f64,
    pub on_target: bool,
}

/// Writes traces through the `log` facade at debug level.
#[derive(Debug, Default)]
pub struct LogTraceSink;

/// Writes traces into two CSV archives in the session directory.
pub struct ArchiveTraceSink {
    states: Archiver,
    pids: Archiver,
}

/// Keeps every record in memory. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct RecordingTraceSink {
    states: Rc<RefCell<Vec<StateTrace>>>,
    pids: Rc<RefCell<Vec<PidTrace>>>,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Receiver of trace records.
pub trait TraceSink {
    fn state_info(&mut self, trace: &StateTrace);

    fn pid_info(&mut self, trace: &PidTrace);
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TraceSink for LogTraceSink {
    fn state_info(&mut self, t: &StateTrace) {
        debug!(
            "[{:8.3}] {}.{}: pose = ({:.2}, {:.2}, {:.1}), target heading = {:.1}",
            t.elapsed_s, t.sequencer, t.state, t.x, t.y, t.heading_deg, t.target_heading_deg
        );
    }

    fn pid_info(&mut self, t: &PidTrace) {
        debug!(
            "[{:8.3}] {}: target = {:.2}, input = {:.2}, error = {:.2}, output = {:.3}{}",
            t.elapsed_s,
            t.axis,
            t.target,
            t.input,
            t.error,
            t.output,
            if t.on_target { " (on target)" } else { "" }
        );
    }
}

impl ArchiveTraceSink {
    /// Create the sink, writing `state_trace.csv` and `pid_trace.csv` into the
    /// session archive.
    pub fn new(session: &Session) -> Result<Self, ArchiveError> {
        Ok(Self {
            states: Archiver::from_path(session, "state_trace.csv")?,
            pids: Archiver::from_path(session, "pid_trace.csv")?,
        })
    }
}

impl TraceSink for ArchiveTraceSink {
    fn state_info(&mut self, trace: &StateTrace) {
        if let Err(e) = self.states.serialise(trace) {
            warn!("Could not archive state trace: {}", e);
        }
    }

    fn pid_info(&mut self, trace: &PidTrace) {
        if let Err(e) = self.pids.serialise(trace) {
            warn!("Could not archive PID trace: {}", e);
        }
    }
}

impl RecordingTraceSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(&self) -> Vec<StateTrace> {
        self.states.borrow().clone()
    }

    pub fn pids(&self) -> Vec<PidTrace> {
        self.pids.borrow().clone()
    }

    /// States run by `sequencer`, with repeats of the same state collapsed.
    pub fn state_sequence(&self, sequencer: &str) -> Vec<String> {
        let mut seq: Vec<String> = Vec::new();
        for t in self.states.borrow().iter().filter(|t| t.sequencer == sequencer) {
            if seq.last() != Some(&t.state) {
                seq.push(t.state.clone());
            }
        }
        seq
    }
}

impl TraceSink for RecordingTraceSink {
    fn state_info(&mut self, trace: &StateTrace) {
        self.states.borrow_mut().push(trace.clone());
    }

    fn pid_info(&mut self, trace: &PidTrace) {
        self.pids.borrow_mut().push(trace.clone());
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn state(sequencer: &str, state: &str) -> StateTrace {
        StateTrace {
            elapsed_s: 0.0,
            sequencer: sequencer.to_string(),
            state: state.to_string(),
            x: 0.0,
            y: 0.0,
            heading_deg: 0.0,
            target_heading_deg: 0.0,
        }
    }

    #[test]
    fn test_recording_sequence() {
        let rec = RecordingTraceSink::new();
        let mut sink: Box<dyn TraceSink> = Box::new(rec.clone());

        for (seq, st) in [("a", "One"), ("a", "One"), ("b", "X"), ("a", "Two"), ("a", "One")].iter() {
            sink.state_info(&state(seq, st));
        }

        assert_eq!(rec.states().len(), 5);
        assert_eq!(rec.state_sequence("a"), vec!["One", "Two", "One"]);
        assert_eq!(rec.state_sequence("b"), vec!["X"]);
        assert!(rec.pids().is_empty());
    }
}
