//! Diagnostic sink for recoverable decode anomalies.
//!
//! Warnings never abort a decode (errors do). Decoders report through an
//! explicit [`DiagnosticSink`] collaborator instead of a process-global
//! logger, so callers decide whether anomalies are collected, logged or
//! dropped.

use std::fmt;

/// A recoverable anomaly encountered while decoding a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A chunk decoder returned without consuming its whole payload.
    LeftoverChunkBytes { chunk: u16, remaining: usize },
    /// A chunk type no decoder claims; its payload was discarded.
    UnknownChunk { chunk: u16 },
    /// A binary-safe archive field carried a type tag that disagrees with
    /// the requested read. The field was skipped.
    FieldTypeMismatch {
        key: String,
        expected: &'static str,
        found: u8,
    },
    /// An archived object of a class this library has no decoder for; the
    /// common fields were kept and the rest of the object skipped.
    UnknownObjectClass { class_name: String },
    /// An archived object was not fully consumed by its decoder; the
    /// remainder was skipped to the object end marker.
    LeftoverObjectFields { class_name: String },
    /// The declared soft-skin weight count disagrees with the number of
    /// weight records actually materialized.
    WeightCountMismatch { declared: usize, materialized: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::LeftoverChunkBytes { chunk, remaining } => {
                write!(f, "chunk {chunk:#06x}: {remaining} bytes left unconsumed")
            }
            Warning::UnknownChunk { chunk } => {
                write!(f, "unknown chunk type {chunk:#06x} skipped")
            }
            Warning::FieldTypeMismatch {
                key,
                expected,
                found,
            } => {
                write!(
                    f,
                    "field {key:?}: expected {expected}, found type tag {found:#04x}; skipped"
                )
            }
            Warning::UnknownObjectClass { class_name } => {
                write!(f, "unknown object class {class_name:?}")
            }
            Warning::LeftoverObjectFields { class_name } => {
                write!(f, "object {class_name:?} not fully consumed")
            }
            Warning::WeightCountMismatch {
                declared,
                materialized,
            } => {
                write!(
                    f,
                    "weight section declares {declared} entries, materialized {materialized}"
                )
            }
        }
    }
}

/// Receiver for [`Warning`]s.
pub trait DiagnosticSink {
    fn report(&mut self, warning: Warning);
}

/// Drops every warning.
#[derive(Debug, Default)]
pub struct Ignore;

impl DiagnosticSink for Ignore {
    fn report(&mut self, _warning: Warning) {}
}

/// Accumulates warnings for later inspection. Used by the test suite.
#[derive(Debug, Default)]
pub struct Collect {
    pub warnings: Vec<Warning>,
}

impl DiagnosticSink for Collect {
    fn report(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }
}

/// Forwards every warning to `tracing::warn!`.
#[derive(Debug, Default)]
pub struct Log;

impl DiagnosticSink for Log {
    fn report(&mut self, warning: Warning) {
        tracing::warn!("{warning}");
    }
}
