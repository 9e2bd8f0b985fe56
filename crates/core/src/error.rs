use thiserror::Error;

#[derive(Debug, Error)]
pub enum InjectorError {
    #[error("read enable flag: {0}")]
    Flag(String),
    #[error("load card manifest: {0}")]
    CardManifest(String),
    #[error("load item manifest: {0}")]
    ItemManifest(String),
}
