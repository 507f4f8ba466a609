//! Supported cloud vendors

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Cloud vendor an operation or inventory belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    /// Tencent Cloud
    TCloud,
    /// Amazon Web Services
    Aws,
    /// Huawei Cloud
    HuaWei,
    /// Google Cloud Platform
    Gcp,
    /// Microsoft Azure
    Azure,
}

impl Vendor {
    pub const ALL: [Vendor; 5] = [
        Vendor::TCloud,
        Vendor::Aws,
        Vendor::HuaWei,
        Vendor::Gcp,
        Vendor::Azure,
    ];

    /// Stable lowercase name used in logs and config
    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::TCloud => "tcloud",
            Vendor::Aws => "aws",
            Vendor::HuaWei => "huawei",
            Vendor::Gcp => "gcp",
            Vendor::Azure => "azure",
        }
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Vendor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Vendor::ALL
            .into_iter()
            .find(|v| v.as_str() == lowered)
            .ok_or_else(|| format!("unknown vendor: {}", s))
    }
}
