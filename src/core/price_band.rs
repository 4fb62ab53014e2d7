use crate::core::error::MatchError;
use crate::models::PriceBand;

/// Default number of budget tiers a city's rent span is split into
pub const DEFAULT_TIER_COUNT: usize = 5;

/// Ordered budget tiers for one city
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTierTable {
    city: String,
    bands: Vec<PriceBand>,
}

impl PriceTierTable {
    /// Build a table from explicit bands
    ///
    /// Every band must satisfy min <= max and the bands must be
    /// non-decreasing in both bounds.
    pub fn new(city: impl Into<String>, bands: Vec<PriceBand>) -> Result<Self, MatchError> {
        let city = city.into();

        if bands.is_empty() {
            return Err(MatchError::NoPriceDataForCity(city));
        }

        let well_formed = bands
            .iter()
            .all(|band| band.min_rent.is_finite() && band.max_rent.is_finite() && band.min_rent <= band.max_rent)
            && bands
                .windows(2)
                .all(|pair| pair[0].min_rent <= pair[1].min_rent && pair[0].max_rent <= pair[1].max_rent);

        if !well_formed {
            return Err(MatchError::MalformedPriceBands(city));
        }

        Ok(Self { city, bands })
    }

    /// Split the observed rent span of a city into `tier_count` contiguous
    /// equal-width bands. Boundaries are rounded to cents; the last band
    /// ends exactly at the observed maximum.
    pub fn equal_width(
        city: impl Into<String>,
        span: PriceBand,
        tier_count: usize,
    ) -> Result<Self, MatchError> {
        let city = city.into();

        if tier_count == 0 {
            return Err(MatchError::NoPriceDataForCity(city));
        }
        if !(span.min_rent.is_finite() && span.max_rent.is_finite()) || span.min_rent > span.max_rent {
            return Err(MatchError::MalformedPriceBands(city));
        }

        let width = (span.max_rent - span.min_rent) / tier_count as f64;
        let boundary = |index: usize| {
            if index == tier_count {
                span.max_rent
            } else {
                round_cents(span.min_rent + width * index as f64).min(span.max_rent)
            }
        };

        let bands = (0..tier_count)
            .map(|index| PriceBand {
                min_rent: boundary(index),
                max_rent: boundary(index + 1),
            })
            .collect();

        Self::new(city, bands)
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn bands(&self) -> &[PriceBand] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Look up a band by its 1-based tier ordinal
    pub fn band(&self, ordinal: u32) -> Result<PriceBand, MatchError> {
        (ordinal as usize)
            .checked_sub(1)
            .and_then(|index| self.bands.get(index))
            .copied()
            .ok_or_else(|| MatchError::InvalidTier {
                city: self.city.clone(),
                ordinal,
                available: self.bands.len(),
            })
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Turns a city's observed rent span and a budget tier into a price band
#[derive(Debug, Clone, Copy)]
pub struct PriceBandResolver {
    tier_count: usize,
}

impl PriceBandResolver {
    pub fn new(tier_count: usize) -> Self {
        Self { tier_count }
    }

    pub fn tier_count(&self) -> usize {
        self.tier_count
    }

    /// Tier table for a city; `span` is `None` when the city has no listings
    pub fn tiers(&self, city: &str, span: Option<PriceBand>) -> Result<PriceTierTable, MatchError> {
        let span = span.ok_or_else(|| MatchError::NoPriceDataForCity(city.to_string()))?;
        PriceTierTable::equal_width(city, span, self.tier_count)
    }

    /// Resolve a 1-based budget tier ordinal to its (min, max) rent band
    pub fn resolve(
        &self,
        city: &str,
        span: Option<PriceBand>,
        ordinal: u32,
    ) -> Result<PriceBand, MatchError> {
        self.tiers(city, span)?.band(ordinal)
    }
}

impl Default for PriceBandResolver {
    fn default() -> Self {
        Self::new(DEFAULT_TIER_COUNT)
    }
}
