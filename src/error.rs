use thiserror::Error;

#[derive(Debug, Error)]
pub enum HealthCheckError {
    #[error("unparseable timestamp {value:?}")]
    Format {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("{metric} value {value} is outside the 0-100 range")]
    Validation { metric: &'static str, value: f64 },
}
