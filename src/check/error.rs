/// Errors raised while evaluating a check plugin.
///
/// These abort the plugin they occur in; other plugins keep running.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The rule carries a parameter this plugin cannot honour.
    #[error("{parameter} is not supported by the {plugin} check")]
    UnsupportedParameter {
        plugin: &'static str,
        parameter: &'static str,
    },

    /// The rule parameters could not be decoded.
    #[error("invalid parameters for {plugin}: {source}")]
    InvalidParameters {
        plugin: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, CheckError>;
