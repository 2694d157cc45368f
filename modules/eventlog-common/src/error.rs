use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0} environment variable is required")]
    MissingEnv(&'static str),
}
