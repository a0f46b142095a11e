//! Sector taxonomy and scoring tilt.
//!
//! Sectors follow the GICS level-1 breakdown. The rule scorer does not care
//! about the full taxonomy, only about a coarse tilt: financials, secular
//! growth, cyclicals, and everything else.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// GICS level-1 sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Sector {
    /// Information Technology
    #[display("Information Technology")]
    InformationTechnology,
    /// Health Care
    #[display("Health Care")]
    HealthCare,
    /// Financials
    #[display("Financials")]
    Financials,
    /// Consumer Discretionary
    #[display("Consumer Discretionary")]
    ConsumerDiscretionary,
    /// Communication Services
    #[display("Communication Services")]
    CommunicationServices,
    /// Industrials
    #[display("Industrials")]
    Industrials,
    /// Consumer Staples
    #[display("Consumer Staples")]
    ConsumerStaples,
    /// Energy
    #[display("Energy")]
    Energy,
    /// Utilities
    #[display("Utilities")]
    Utilities,
    /// Real Estate
    #[display("Real Estate")]
    RealEstate,
    /// Materials
    #[display("Materials")]
    Materials,
}

/// Coarse sector grouping used for scoring adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum SectorTilt {
    /// Banks, insurers, brokers.
    #[display("financial")]
    Financial,
    /// Secular growth sectors (technology, health care, communications).
    #[display("growth")]
    Growth,
    /// Commodity and capacity cyclicals.
    #[display("cyclical")]
    Cyclical,
    /// Everything else.
    #[display("neutral")]
    Neutral,
}

impl Sector {
    /// All sectors, in GICS code order.
    pub const fn all() -> [Self; 11] {
        [
            Self::Energy,
            Self::Materials,
            Self::Industrials,
            Self::ConsumerDiscretionary,
            Self::ConsumerStaples,
            Self::HealthCare,
            Self::Financials,
            Self::InformationTechnology,
            Self::CommunicationServices,
            Self::Utilities,
            Self::RealEstate,
        ]
    }

    /// Coarse tilt for rule-based scoring.
    pub const fn tilt(&self) -> SectorTilt {
        match self {
            Self::Financials => SectorTilt::Financial,
            Self::InformationTechnology | Self::HealthCare | Self::CommunicationServices => {
                SectorTilt::Growth
            }
            Self::Energy | Self::Materials | Self::Industrials => SectorTilt::Cyclical,
            Self::ConsumerDiscretionary
            | Self::ConsumerStaples
            | Self::Utilities
            | Self::RealEstate => SectorTilt::Neutral,
        }
    }
}
