use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("resource {name:?} must have a positive capacity")]
    ZeroCapacity { name: String },

    #[error("resource pool is full ({0} resources)")]
    TooManyResources(usize),
}

pub type EngineResult<T> = Result<T, EngineError>;
