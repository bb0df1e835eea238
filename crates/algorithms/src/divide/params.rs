//! Run parameters for divide-stability analysis
//!
//! [`StabilityParams`] mirrors the user-facing configuration: a policy name
//! for base-level control and two optional thresholds, one of which the
//! chosen policy may require. [`StabilityParams::validate`] turns it into
//! [`ValidatedParams`], where the policy is a [`BaseLevel`] that carries its
//! threshold. Every check happens there, before any raster is touched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::hydrology::ChiParams;
use ridgeline_core::{Error, Result};

/// Base-level control policy names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseLevelKind {
    /// Keep channel cells at or above a fixed elevation
    Elevation,
    /// Keep channel cells draining at most a fixed area
    DrainArea,
    /// Keep channel cells at or above the highest outlet
    MaxOutElevation,
    /// Keep channel cells draining at most the area of the smallest outlet
    MinOutDrainArea,
}

impl BaseLevelKind {
    pub const ALL: [BaseLevelKind; 4] = [
        BaseLevelKind::Elevation,
        BaseLevelKind::DrainArea,
        BaseLevelKind::MaxOutElevation,
        BaseLevelKind::MinOutDrainArea,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BaseLevelKind::Elevation => "elevation",
            BaseLevelKind::DrainArea => "drain_area",
            BaseLevelKind::MaxOutElevation => "max_out_elevation",
            BaseLevelKind::MinOutDrainArea => "min_out_drain_area",
        }
    }
}

impl fmt::Display for BaseLevelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BaseLevelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase().replace('-', "_");
        BaseLevelKind::ALL
            .into_iter()
            .find(|k| k.name() == key)
            .ok_or_else(|| Error::InvalidParameter {
                name: "base_level_control",
                value: s.to_string(),
                reason: "expected elevation, drain_area, max_out_elevation or min_out_drain_area"
                    .into(),
            })
    }
}

/// A resolved base-level policy together with its threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BaseLevel {
    Elevation { min_elevation: f64 },
    DrainArea { max_drainage_area: f64 },
    MaxOutElevation,
    MinOutDrainArea,
}

impl BaseLevel {
    pub fn kind(&self) -> BaseLevelKind {
        match self {
            BaseLevel::Elevation { .. } => BaseLevelKind::Elevation,
            BaseLevel::DrainArea { .. } => BaseLevelKind::DrainArea,
            BaseLevel::MaxOutElevation => BaseLevelKind::MaxOutElevation,
            BaseLevel::MinOutDrainArea => BaseLevelKind::MinOutDrainArea,
        }
    }

    /// Resolve a policy name and the optional thresholds into a policy.
    ///
    /// Thresholds the policy does not use are ignored.
    pub fn resolve(
        kind: BaseLevelKind,
        min_elevation: Option<f64>,
        max_drainage_area: Option<f64>,
    ) -> Result<Self> {
        match kind {
            BaseLevelKind::Elevation => {
                let min_elevation = min_elevation.ok_or(Error::MissingParameter {
                    policy: kind.name(),
                    name: "min_elevation",
                })?;
                require_finite("min_elevation", min_elevation)?;
                Ok(BaseLevel::Elevation { min_elevation })
            }
            BaseLevelKind::DrainArea => {
                let max_drainage_area = max_drainage_area.ok_or(Error::MissingParameter {
                    policy: kind.name(),
                    name: "max_drainage_area",
                })?;
                require_positive("max_drainage_area", max_drainage_area)?;
                Ok(BaseLevel::DrainArea { max_drainage_area })
            }
            BaseLevelKind::MaxOutElevation => Ok(BaseLevel::MaxOutElevation),
            BaseLevelKind::MinOutDrainArea => Ok(BaseLevel::MinOutDrainArea),
        }
    }
}

/// User-facing parameters of a divide-stability run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityParams {
    /// Minimum drainage area of a channel cell (map units squared)
    pub min_channel_area: f64,
    /// Radius of the local relief window (map units)
    pub relief_radius: f64,
    /// Reference drainage area A0 of the chi transform (map units squared)
    pub reference_area: f64,
    /// Reference concavity θ of the chi transform
    pub reference_concavity: f64,
    /// Optional base-level control policy
    pub base_level_control: Option<BaseLevelKind>,
    /// Elevation floor for [`BaseLevelKind::Elevation`]
    pub min_elevation: Option<f64>,
    /// Drainage area ceiling for [`BaseLevelKind::DrainArea`]
    pub max_drainage_area: Option<f64>,
    /// Length of exported channel segments (map units).
    /// Defaults to ten cell sizes.
    pub segment_length: Option<f64>,
}

impl Default for StabilityParams {
    fn default() -> Self {
        Self {
            min_channel_area: 1e6,
            relief_radius: 500.0,
            reference_area: 1.0,
            reference_concavity: 0.5,
            base_level_control: None,
            min_elevation: None,
            max_drainage_area: None,
            segment_length: None,
        }
    }
}

/// Parameters after validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedParams {
    pub min_channel_area: f64,
    pub relief_radius: f64,
    pub chi: ChiParams,
    pub base_level: Option<BaseLevel>,
    pub segment_length: Option<f64>,
}

impl StabilityParams {
    /// Check every parameter and resolve the base-level policy.
    pub fn validate(&self) -> Result<ValidatedParams> {
        let base_level = self
            .base_level_control
            .map(|kind| BaseLevel::resolve(kind, self.min_elevation, self.max_drainage_area))
            .transpose()?;

        require_positive("min_channel_area", self.min_channel_area)?;
        require_positive("relief_radius", self.relief_radius)?;
        require_positive("reference_area", self.reference_area)?;
        require_finite("reference_concavity", self.reference_concavity)?;
        if let Some(len) = self.segment_length {
            require_positive("segment_length", len)?;
        }

        Ok(ValidatedParams {
            min_channel_area: self.min_channel_area,
            relief_radius: self.relief_radius,
            chi: ChiParams {
                reference_area: self.reference_area,
                concavity: self.reference_concavity,
            },
            base_level,
            segment_length: self.segment_length,
        })
    }
}

impl ValidatedParams {
    /// Hillslope length implied by the channel area threshold
    pub fn hillslope_length(&self) -> f64 {
        self.min_channel_area.sqrt()
    }
}

fn require_finite(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: "must be finite".into(),
        });
    }
    Ok(())
}

fn require_positive(name: &'static str, value: f64) -> Result<()> {
    require_finite(name, value)?;
    if value <= 0.0 {
        return Err(Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: "must be > 0".into(),
        });
    }
    Ok(())
}
