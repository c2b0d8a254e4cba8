use thiserror::Error;

pub type HxResult<T> = Result<T, HxError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HxError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: String, value: f64 },

    #[error("Unknown unit symbol: {symbol}")]
    UnknownUnit { symbol: String },
}
