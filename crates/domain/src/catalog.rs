//! The closed catalog of permissioned modules.
//!
//! Module names are a fixed vocabulary: permissions and role grants may only
//! reference modules listed here, and unknown names are rejected at the
//! string boundary. The wire names below are stable storage values.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use labrix_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::action::Action;

/// A permissioned area of the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleName {
    /// Landing dashboard and summary widgets.
    #[serde(rename = "Dashboard")]
    Dashboard,
    /// Material research workspace.
    #[serde(rename = "Material Research")]
    MaterialResearch,
    /// Constituent research workspace.
    #[serde(rename = "Constituent Research")]
    ConstituentResearch,
    /// Reference library.
    #[serde(rename = "Library")]
    Library,
    /// Warehouse locations and stock.
    #[serde(rename = "Warehouse")]
    Warehouse,
    /// Project tracking.
    #[serde(rename = "Projects")]
    Projects,
    /// Sample records.
    #[serde(rename = "Samples")]
    Samples,
    /// Inbound receiving.
    #[serde(rename = "Receiving")]
    Receiving,
    /// Outbound shipping.
    #[serde(rename = "Shipping")]
    Shipping,
    /// Laboratory test code definitions.
    #[serde(rename = "Test Codes")]
    TestCodes,
    /// Business partner directory.
    #[serde(rename = "Business Partners")]
    BusinessPartners,
    /// User administration.
    #[serde(rename = "Users")]
    Users,
    /// Role administration.
    #[serde(rename = "Roles")]
    Roles,
    /// Permission administration.
    #[serde(rename = "Permissions")]
    Permissions,
    /// Tenant settings.
    #[serde(rename = "Settings")]
    Settings,
    /// Sample submission intake.
    #[serde(rename = "Sample Submission")]
    SampleSubmission,
    /// Direct sample creation.
    #[serde(rename = "Create Sample")]
    CreateSample,
    /// Lab study planning.
    #[serde(rename = "Lab Studies")]
    LabStudies,
    /// Reporting.
    #[serde(rename = "Reports")]
    Reports,
    /// Instance inventory and movements.
    #[serde(rename = "Instances")]
    Instances,
}

impl ModuleName {
    /// Returns the stable storage value for this module.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::MaterialResearch => "Material Research",
            Self::ConstituentResearch => "Constituent Research",
            Self::Library => "Library",
            Self::Warehouse => "Warehouse",
            Self::Projects => "Projects",
            Self::Samples => "Samples",
            Self::Receiving => "Receiving",
            Self::Shipping => "Shipping",
            Self::TestCodes => "Test Codes",
            Self::BusinessPartners => "Business Partners",
            Self::Users => "Users",
            Self::Roles => "Roles",
            Self::Permissions => "Permissions",
            Self::Settings => "Settings",
            Self::SampleSubmission => "Sample Submission",
            Self::CreateSample => "Create Sample",
            Self::LabStudies => "Lab Studies",
            Self::Reports => "Reports",
            Self::Instances => "Instances",
        }
    }

    /// Returns every catalog module in catalog order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ModuleName] = &[
            ModuleName::Dashboard,
            ModuleName::MaterialResearch,
            ModuleName::ConstituentResearch,
            ModuleName::Library,
            ModuleName::Warehouse,
            ModuleName::Projects,
            ModuleName::Samples,
            ModuleName::Receiving,
            ModuleName::Shipping,
            ModuleName::TestCodes,
            ModuleName::BusinessPartners,
            ModuleName::Users,
            ModuleName::Roles,
            ModuleName::Permissions,
            ModuleName::Settings,
            ModuleName::SampleSubmission,
            ModuleName::CreateSample,
            ModuleName::LabStudies,
            ModuleName::Reports,
            ModuleName::Instances,
        ];

        ALL
    }

    /// Returns the actions every module offers unless a permission record
    /// widens or narrows them.
    #[must_use]
    pub fn default_actions() -> &'static [Action] {
        const DEFAULT: &[Action] = &[
            Action::Read,
            Action::Write,
            Action::Update,
            Action::Delete,
        ];

        DEFAULT
    }

    /// Parses a transport value into a module name.
    pub fn from_transport(value: &str) -> AppResult<Self> {
        Self::from_str(value)
    }
}

impl FromStr for ModuleName {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ModuleName::all()
            .iter()
            .find(|module| module.as_str() == value.trim())
            .copied()
            .ok_or_else(|| AppError::Validation(format!("unknown module '{value}'")))
    }
}

impl Display for ModuleName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}
