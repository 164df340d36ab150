use thiserror::Error;
use tracing::error;

/// Error types for the compute module
///
/// Malformed payloads are not errors here: the normalizer degrades them to
/// typed defaults. These variants cover caller mistakes and local inputs.
#[derive(Error, Debug)]
pub enum ComputeError {
    /// The legacy forecast endpoint needs a vaccine name
    #[error("É obrigatório informar o nome da vacina (insumo_nome) para plotar o gráfico de previsão.")]
    MissingVaccine,

    /// Error reading a supply mapping file
    #[error("Mapping file error: {0}")]
    MappingFile(#[from] std::io::Error),

    /// Error parsing a supply mapping file
    #[error("Mapping parse error: {0}")]
    MappingParse(String),
}

impl From<serde_json::Error> for ComputeError {
    fn from(error: serde_json::Error) -> Self {
        let err = ComputeError::MappingParse(error.to_string());
        error!(?err, "Supply mapping file is not valid JSON");
        err
    }
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
