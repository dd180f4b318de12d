//! Fixed lookup tables used while walking a snapshot.

use crate::model::ExtendedRuntime;

/// Index of the most recent interval in every extended runtime series.
pub const LATEST_INTERVAL: usize = 2;

/// An equipment mechanism reported in the extended runtime block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mechanism {
    /// Heat pump stage 1.
    HeatPump1,
    /// Heat pump stage 2.
    HeatPump2,
    /// Auxiliary heat stage 1.
    AuxHeat1,
    /// Auxiliary heat stage 2.
    AuxHeat2,
    /// Cooling stage 1.
    Cool1,
    /// Cooling stage 2.
    Cool2,
    /// Fan.
    Fan,
    /// Humidifier.
    Humidifier,
    /// Dehumidifier.
    Dehumidifier,
    /// Economizer.
    Economizer,
    /// Ventilator.
    Ventilator,
}

impl Mechanism {
    /// Every mechanism, in emission order.
    pub const ALL: [Self; 11] = [
        Self::HeatPump1,
        Self::HeatPump2,
        Self::AuxHeat1,
        Self::AuxHeat2,
        Self::Cool1,
        Self::Cool2,
        Self::Fan,
        Self::Humidifier,
        Self::Dehumidifier,
        Self::Economizer,
        Self::Ventilator,
    ];

    /// Field name in the extended runtime block.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::HeatPump1 => "heatPump1",
            Self::HeatPump2 => "heatPump2",
            Self::AuxHeat1 => "auxHeat1",
            Self::AuxHeat2 => "auxHeat2",
            Self::Cool1 => "cool1",
            Self::Cool2 => "cool2",
            Self::Fan => "fan",
            Self::Humidifier => "humidifier",
            Self::Dehumidifier => "dehumidifier",
            Self::Economizer => "economizer",
            Self::Ventilator => "ventilator",
        }
    }

    /// Logical stage name for the mechanism.
    #[must_use]
    pub const fn stage(self) -> &'static str {
        match self {
            Self::HeatPump1 => "heatStage1On",
            Self::HeatPump2 => "heatStage2On",
            Self::AuxHeat1 => "auxHeatStage1On",
            Self::AuxHeat2 => "auxHeatStage2On",
            Self::Cool1 => "coolStage1On",
            Self::Cool2 => "coolStage2On",
            Self::Fan => "fanOn",
            Self::Humidifier => "humidifierOn",
            Self::Dehumidifier => "dehumidifierOn",
            Self::Economizer => "economizerOn",
            Self::Ventilator => "ventilatorOn",
        }
    }

    /// Returns this mechanism's series from `extended`.
    #[must_use]
    pub fn series(self, extended: &ExtendedRuntime) -> &[i64] {
        match self {
            Self::HeatPump1 => &extended.heat_pump1,
            Self::HeatPump2 => &extended.heat_pump2,
            Self::AuxHeat1 => &extended.aux_heat1,
            Self::AuxHeat2 => &extended.aux_heat2,
            Self::Cool1 => &extended.cool1,
            Self::Cool2 => &extended.cool2,
            Self::Fan => &extended.fan,
            Self::Humidifier => &extended.humidifier,
            Self::Dehumidifier => &extended.dehumidifier,
            Self::Economizer => &extended.economizer,
            Self::Ventilator => &extended.ventilator,
        }
    }
}

/// Kind of a sensor capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityKind {
    /// Temperature in tenths of a degree.
    Temperature,
    /// Relative humidity in percent.
    Humidity,
    /// Occupancy as the literal `true` or `false`.
    Occupancy,
    /// Any other capability; informational only.
    Other(String),
}

impl From<&str> for CapabilityKind {
    fn from(s: &str) -> Self {
        match s {
            "temperature" => Self::Temperature,
            "humidity" => Self::Humidity,
            "occupancy" => Self::Occupancy,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Sky conditions indexed by the forecast `sky` field.
pub const SKY_CONDITIONS: [&str; 34] = [
    "UNDEFINED",
    "SUNNY",
    "CLEAR",
    "MOSTLY_SUNNY",
    "MOSTLY_CLEAR",
    "HAZY_SUNSHINE",
    "HAZE",
    "PASSING_CLOUDS",
    "MORE_SUN_THAN_CLOUDS",
    "SCATTERED_CLOUDS",
    "PARTLY_CLOUDY",
    "A_MIXTURE_OF_SUN_AND_CLOUDS",
    "HIGH_LEVEL_CLOUDS",
    "MORE_CLOUDS_THAN_SUN",
    "PARTLY_SUNNY",
    "BROKEN_CLOUDS",
    "MOSTLY_CLOUDY",
    "CLOUDY",
    "OVERCAST",
    "LOW_CLOUDS",
    "LIGHT_FOG",
    "FOG",
    "DENSE_FOG",
    "ICE_FOG",
    "SANDSTORM",
    "DUSTSTORM",
    "INCREASING_CLOUDINESS",
    "DECREASING_CLOUDINESS",
    "CLEARING_SKIES",
    "BREAKS_OF_SUN_LATE",
    "EARLY_FOG_FOLLOWED_BY_SUNNY_SKIES",
    "AFTERNOON_CLOUDS",
    "MORNING_CLOUDS",
    "SMOKE",
];

/// Resolves a sky index, returning `None` when it falls outside the table.
#[must_use]
pub fn sky_condition(index: i64) -> Option<&'static str> {
    usize::try_from(index)
        .ok()
        .and_then(|i| SKY_CONDITIONS.get(i))
        .copied()
}
