//! Singletons served by this admin.

use allbymyself::Singleton;
use serde::{Deserialize, Serialize};

/// Site-wide settings, created on first admin load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfiguration {
    pub site_name: String,
    pub contact_email: String,
    pub maintenance_mode: bool,
}

impl Default for SiteConfiguration {
    fn default() -> Self {
        Self {
            site_name: "Site".into(),
            contact_email: String::new(),
            maintenance_mode: false,
        }
    }
}

impl Singleton for SiteConfiguration {
    const TYPE_NAME: &'static str = "SiteConfiguration";
    const APP_LABEL: &'static str = "core";
}

/// Banner shown during maintenance. Only exists once someone creates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceBanner {
    pub message: String,
    pub dismissible: bool,
}

impl Singleton for MaintenanceBanner {
    const TYPE_NAME: &'static str = "MaintenanceBanner";
    const APP_LABEL: &'static str = "core";

    fn is_default_available() -> bool {
        false
    }
}
