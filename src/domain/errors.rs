use thiserror::Error;

/// Errors the pipeline distinguishes for callers.
///
/// Transient source failures and malformed responses are contained inside
/// the source adapters (they degrade to empty results); only conditions a
/// direct caller must react to are modelled here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Instrument not found: {code}")]
    InstrumentNotFound { code: String },
}
