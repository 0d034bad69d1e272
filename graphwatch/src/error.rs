use thiserror::Error;

/// All errors produced by this crate. See §7.
#[derive(Debug, Error)]
pub enum Error {
    /// `on`/`receiver` called on an object that has never been activated.
    #[error("object is not tracked: call reactive() on it (or an ancestor) first")]
    NotTracked,

    /// Activation attempted on a value the classifier does not recognize.
    /// Logged at `info` and skipped — not fatal. See §4.A, §7.
    #[error("unsupported type for activation: {0}")]
    UnsupportedType(&'static str),

    /// Bubble/reentrancy depth exceeded the configured limit. Aborts the
    /// current dispatch chain only; the mutation that triggered it already
    /// succeeded. See §5, §7.
    #[error("dispatch depth exceeded ({0})")]
    DispatchDepthExceeded(usize),

    /// An invalid glob or regex pattern was supplied to a filter.
    #[error("bad filter pattern: {0}")]
    BadPattern(String),
}

pub type Result<T> = std::result::Result<T, Error>;
