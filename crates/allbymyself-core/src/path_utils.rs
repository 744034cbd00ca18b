//! Route names for admin URLs.

use crate::config::AdminConfig;
use crate::record::Singleton;

/// `<app>_<model>_<action>`, e.g. `core_siteconfiguration_change`.
pub fn get_path_name<T: Singleton>(action: &str) -> String {
    path_name(T::APP_LABEL, &T::model_name(), action)
}

/// Untyped form of [`get_path_name`].
pub fn path_name(app_label: &str, model_name: &str, action: &str) -> String {
    format!("{}_{}_{}", app_label, model_name, action)
}

/// Namespaced name used when reversing, e.g. `admin:core_siteconfiguration_change`.
pub fn admin_url_name<T: Singleton>(action: &str) -> String {
    format!("{}:{}", AdminConfig::URL_NAMESPACE, get_path_name::<T>(action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct SiteConfiguration;

    impl Singleton for SiteConfiguration {
        const TYPE_NAME: &'static str = "SiteConfiguration";
        const APP_LABEL: &'static str = "core";
    }

    #[test]
    fn test_path_names() {
        assert_eq!(
            get_path_name::<SiteConfiguration>("change"),
            "core_siteconfiguration_change"
        );
        assert_eq!(
            get_path_name::<SiteConfiguration>("history"),
            "core_siteconfiguration_history"
        );
        assert_eq!(
            admin_url_name::<SiteConfiguration>("change"),
            "admin:core_siteconfiguration_change"
        );
    }
}
