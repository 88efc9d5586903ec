//! Payload validation shared by the client (before the network) and the
//! server (before the database).

use crate::view::Coordinates;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;

/// A payload field rejected by validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name must be at least {NAME_MIN_CHARS} characters long")]
    NameTooShort,
    #[error("Name must be at most {NAME_MAX_CHARS} characters long")]
    NameTooLong,
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
    #[error("play count cannot be negative")]
    NegativePlayCount,
    #[error("provide either courtId or checkinId, not both")]
    AmbiguousAssociation,
    #[error("Please select an image to upload.")]
    MissingImage,
    #[error("Please upload a valid image file (JPEG, PNG, or WebP) under 10MB.")]
    InvalidImage,
}

impl ValidationError {
    /// Wire name of the offending field, for inline display.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::NameTooShort | Self::NameTooLong => "name",
            Self::Latitude(_) => "latitude",
            Self::Longitude(_) => "longitude",
            Self::NegativePlayCount => "playCount",
            Self::AmbiguousAssociation => "courtId",
            Self::MissingImage | Self::InvalidImage => "image",
        }
    }
}

pub(crate) fn validate_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();
    if len < NAME_MIN_CHARS {
        return Err(ValidationError::NameTooShort);
    }
    if len > NAME_MAX_CHARS {
        return Err(ValidationError::NameTooLong);
    }
    Ok(())
}

pub(crate) fn validate_latitude(latitude: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&latitude) { Ok(()) } else { Err(ValidationError::Latitude(latitude)) }
}

pub(crate) fn validate_longitude(longitude: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&longitude) { Ok(()) } else { Err(ValidationError::Longitude(longitude)) }
}

impl Coordinates {
    /// Check the latitude/longitude ranges.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range component.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_latitude(self.latitude)?;
        validate_longitude(self.longitude)
    }
}
