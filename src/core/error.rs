use thiserror::Error;

/// Errors that abort a matching request before any candidate is scored
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("Invalid budget tier {ordinal} for {city}: {available} tiers available")]
    InvalidTier {
        city: String,
        ordinal: u32,
        available: usize,
    },

    #[error("No price data for city: {0}")]
    NoPriceDataForCity(String),

    #[error("Malformed price bands for {0}")]
    MalformedPriceBands(String),

    #[error("Invalid preference profile: {0}")]
    InvalidProfile(String),
}

impl MatchError {
    /// Whether the caller sent something wrong, as opposed to missing data
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MatchError::InvalidTier { .. } | MatchError::InvalidProfile(_)
        )
    }
}
