use thiserror::Error;

/// Hard failures out of the engine. Data-shape problems (unparseable prices,
/// missing attributes, empty captures) are absorbed as null fields or empty
/// results and never appear here; only collaborator-contract violations do.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid tile selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },
}
