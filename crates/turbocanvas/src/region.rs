//! Region resolution
//!
//! Configured region strings are mapped through a small fixed table. The
//! lenient resolver used by the client falls back to [`DEFAULT_REGION`] for
//! anything it does not recognize; [`AwsRegion::from_str`] is the strict
//! alternative for callers that would rather fail.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::Error;

/// Region used when a configured region string is not in the table.
pub const DEFAULT_REGION: AwsRegion = AwsRegion::ApNortheast1;

/// Regions this client knows how to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AwsRegion {
    /// `us-east-1`
    UsEast1,
    /// `us-west-2`
    UsWest2,
    /// `ap-northeast-1`
    ApNortheast1,
    /// `eu-central-1`
    EuCentral1,
}

impl AwsRegion {
    /// Every supported region, in table order.
    pub const ALL: [AwsRegion; 4] = [
        AwsRegion::UsEast1,
        AwsRegion::UsWest2,
        AwsRegion::ApNortheast1,
        AwsRegion::EuCentral1,
    ];

    /// The region identifier used in credential scopes and hostnames.
    pub fn as_str(&self) -> &'static str {
        match self {
            AwsRegion::UsEast1 => "us-east-1",
            AwsRegion::UsWest2 => "us-west-2",
            AwsRegion::ApNortheast1 => "ap-northeast-1",
            AwsRegion::EuCentral1 => "eu-central-1",
        }
    }

    fn lookup(region: &str) -> Option<Self> {
        let region = region.trim();
        Self::ALL.into_iter().find(|r| r.as_str() == region)
    }
}

impl fmt::Display for AwsRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AwsRegion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| Error::Configuration(format!("unsupported region '{s}'")))
    }
}

/// Resolve a configured region string, falling back to [`DEFAULT_REGION`].
///
/// Unknown strings never fail; a warning is logged instead.
pub fn resolve_region(region: &str) -> AwsRegion {
    match AwsRegion::lookup(region) {
        Some(resolved) => resolved,
        None => {
            warn!(
                region = %region,
                fallback = %DEFAULT_REGION,
                "Unsupported region, using fallback"
            );
            DEFAULT_REGION
        }
    }
}
