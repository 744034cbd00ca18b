//! Registry of model admins and their route tables.

use super::capfirst;
use super::routes::{resolve, AdminRoute, RouteMatch};
use super::{ModelAdmin, SingletonAdmin};
use crate::error::Result;
use crate::record::Singleton;
use crate::repository::SingletonRepository;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

struct Registration {
    admin: Arc<dyn ModelAdmin>,
    routes: Vec<AdminRoute>,
}

/// One row of the admin index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexEntry {
    pub app_label: String,
    pub model_name: String,
    pub name: String,
    pub admin_url: String,
    pub add_url: Option<String>,
}

/// The set of admins served under `/admin/`.
///
/// Route tables are built once, at registration, which is also when default
/// singletons get provisioned.
#[derive(Default)]
pub struct AdminSite {
    registry: Vec<Registration>,
}

impl AdminSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an admin and build its route table.
    pub fn register(&mut self, admin: Arc<dyn ModelAdmin>) -> Result<()> {
        let routes = admin.get_urls()?;
        info!(
            "Registered admin for {}.{} ({} routes)",
            admin.app_label(),
            admin.model_name(),
            routes.len()
        );
        self.registry.retain(|r| {
            !(r.admin.app_label() == admin.app_label() && r.admin.model_name() == admin.model_name())
        });
        self.registry.push(Registration { admin, routes });
        Ok(())
    }

    /// Register a [`SingletonAdmin`] for `T`.
    pub fn register_singleton<T: Singleton>(&mut self, repo: SingletonRepository<T>) -> Result<()> {
        self.register(Arc::new(SingletonAdmin::new(repo)))
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    fn find(&self, app_label: &str, model_name: &str) -> Option<&Registration> {
        self.registry
            .iter()
            .find(|r| r.admin.app_label() == app_label && r.admin.model_name() == model_name)
    }

    /// Route table of a registered model.
    pub fn routes(&self, app_label: &str, model_name: &str) -> Option<&[AdminRoute]> {
        self.find(app_label, model_name).map(|r| r.routes.as_slice())
    }

    /// Resolve `path` (relative to the model's base URL) to an admin and route.
    pub fn resolve(
        &self,
        app_label: &str,
        model_name: &str,
        path: &str,
    ) -> Option<(Arc<dyn ModelAdmin>, RouteMatch)> {
        let registration = self.find(app_label, model_name)?;
        let matched = resolve(&registration.routes, path)?;
        Some((Arc::clone(&registration.admin), matched))
    }

    /// Rows for the admin index page, sorted by app then model.
    pub fn index(&self) -> Result<Vec<IndexEntry>> {
        let mut entries = Vec::with_capacity(self.registry.len());
        for registration in &self.registry {
            let admin = &registration.admin;
            let admin_url = admin.base_url();
            let add_url = admin
                .has_add_permission()?
                .then(|| format!("{}add/", admin_url));
            entries.push(IndexEntry {
                app_label: admin.app_label().to_string(),
                model_name: admin.model_name(),
                name: capfirst(&admin.verbose_name_plural()),
                admin_url,
                add_url,
            });
        }
        entries.sort_by(|a, b| (&a.app_label, &a.model_name).cmp(&(&b.app_label, &b.model_name)));
        Ok(entries)
    }
}
