//! Domain record replicated between client and server
//!
//! A `Record` describes one apartment listing. The server assigns `id` and
//! `created_at` and never changes them afterwards; `owner` is fixed at
//! creation to the login that created the record.

use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

/// View quality from the apartment, closed label set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum View {
    Street,
    Yard,
    Bad,
    Good,
    Terrible,
}

impl View {
    /// All values, for selection prompts
    pub const ALL: [View; 5] = [
        View::Street,
        View::Yard,
        View::Bad,
        View::Good,
        View::Terrible,
    ];
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            View::Street => "STREET",
            View::Yard => "YARD",
            View::Bad => "BAD",
            View::Good => "GOOD",
            View::Terrible => "TERRIBLE",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for View {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "STREET" => Ok(View::Street),
            "YARD" => Ok(View::Yard),
            "BAD" => Ok(View::Bad),
            "GOOD" => Ok(View::Good),
            "TERRIBLE" => Ok(View::Terrible),
            other => Err(CoreError::InvalidRecord(format!("unknown view {other:?}"))),
        }
    }
}

/// Transport availability near the apartment, closed label set.
/// Required on every record (non-null).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Transport {
    Few,
    None,
    Little,
    Normal,
    Enough,
}

impl Transport {
    /// All values, for selection prompts
    pub const ALL: [Transport; 5] = [
        Transport::Few,
        Transport::None,
        Transport::Little,
        Transport::Normal,
        Transport::Enough,
    ];
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Transport::Few => "FEW",
            Transport::None => "NONE",
            Transport::Little => "LITTLE",
            Transport::Normal => "NORMAL",
            Transport::Enough => "ENOUGH",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Transport {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "FEW" => Ok(Transport::Few),
            "NONE" => Ok(Transport::None),
            "LITTLE" => Ok(Transport::Little),
            "NORMAL" => Ok(Transport::Normal),
            "ENOUGH" => Ok(Transport::Enough),
            other => Err(CoreError::InvalidRecord(format!(
                "unknown transport {other:?}"
            ))),
        }
    }
}

/// Apartment coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    /// Must be > 0
    pub x: f32,
    /// Must be > 0
    pub y: i64,
}

/// Building the apartment belongs to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct House {
    pub name: Option<String>,
    /// Must be > 0
    pub year: i64,
    /// Must be > 0
    pub number_of_floors: i64,
    /// Must be > 0
    pub flats_per_floor: i32,
    /// Must be > 0
    pub number_of_lifts: i32,
}

/// One apartment listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// Server-assigned, unique, positive, immutable after creation.
    /// Locally-built records carry 0 until the server assigns the real id.
    pub id: i64,
    pub name: String,
    pub coordinates: Coordinates,
    /// Server-assigned creation timestamp, immutable
    pub created_at: DateTime<FixedOffset>,
    pub area: f32,
    pub number_of_rooms: i64,
    pub price: f32,
    pub view: View,
    pub transport: Transport,
    pub house: House,
    /// Login of the user who created the record; set once, never edited
    pub owner: String,
}

impl Record {
    /// Build a record for local submission. The server overwrites `id` and
    /// `created_at`; `owner` is stamped by the session before sending.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        coordinates: Coordinates,
        area: f32,
        number_of_rooms: i64,
        price: f32,
        view: View,
        transport: Transport,
        house: House,
    ) -> Self {
        Self {
            id: 0,
            name,
            coordinates,
            created_at: Local::now().fixed_offset(),
            area,
            number_of_rooms,
            price,
            view,
            transport,
            house,
            owner: String::new(),
        }
    }

    /// Check every field bound the server also enforces.
    ///
    /// Caller-side gate: invalid records fail fast instead of being sent.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::InvalidRecord("name must not be empty".into()));
        }
        Self::positive_f32(self.coordinates.x, "coordinate x")?;
        Self::positive_i64(self.coordinates.y, "coordinate y")?;
        Self::positive_f32(self.area, "area")?;
        Self::positive_i64(self.number_of_rooms, "number of rooms")?;
        Self::positive_f32(self.price, "price")?;
        Self::positive_i64(self.house.year, "house year")?;
        Self::positive_i64(self.house.number_of_floors, "number of floors")?;
        Self::positive_i32(self.house.flats_per_floor, "flats per floor")?;
        Self::positive_i32(self.house.number_of_lifts, "number of lifts")?;
        Ok(())
    }

    fn positive_f32(value: f32, field: &str) -> Result<()> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(CoreError::InvalidRecord(format!(
                "{field} must be greater than 0"
            )))
        }
    }

    fn positive_i64(value: i64, field: &str) -> Result<()> {
        if value > 0 {
            Ok(())
        } else {
            Err(CoreError::InvalidRecord(format!(
                "{field} must be greater than 0"
            )))
        }
    }

    fn positive_i32(value: i32, field: &str) -> Result<()> {
        if value > 0 {
            Ok(())
        } else {
            Err(CoreError::InvalidRecord(format!(
                "{field} must be greater than 0"
            )))
        }
    }
}
