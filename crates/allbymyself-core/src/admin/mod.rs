//! Admin controllers.
//!
//! [`ModelAdmin`] is the object-safe surface an admin site dispatches to;
//! [`SingletonAdmin`] implements it with edit-in-place semantics. Views return
//! an [`AdminResponse`] (template + JSON context, or a redirect) and leave HTTP
//! to the hosting server.

mod response;
mod routes;
mod singleton;
mod site;

pub use response::{
    capfirst, escape_html, html_link, quote_path, AdminRequest, AdminResponse, Message,
    MessageLevel, RequestMethod, SubmitAction,
};
pub use routes::{default_model_routes, resolve, reverse, AdminRoute, AdminView, RouteMatch};
pub use singleton::SingletonAdmin;
pub use site::{AdminSite, IndexEntry};

use crate::config::AdminConfig;
use crate::error::Result;

/// A model's admin: permissions, route table and views.
pub trait ModelAdmin: Send + Sync {
    fn app_label(&self) -> &'static str;

    fn model_name(&self) -> String;

    fn verbose_name(&self) -> String;

    fn verbose_name_plural(&self) -> String {
        self.verbose_name()
    }

    fn has_add_permission(&self) -> Result<bool>;

    fn has_change_permission(&self) -> bool {
        true
    }

    fn has_view_permission(&self) -> bool {
        true
    }

    fn has_delete_permission(&self) -> bool;

    /// Ordered route table, matched first-to-last.
    fn get_urls(&self) -> Result<Vec<AdminRoute>>;

    fn changelist_view(&self, request: &AdminRequest) -> Result<AdminResponse>;

    fn add_view(&self, request: &AdminRequest) -> Result<AdminResponse>;

    fn change_view(&self, request: &AdminRequest, object_id: &str) -> Result<AdminResponse>;

    fn history_view(&self, request: &AdminRequest, object_id: &str) -> Result<AdminResponse>;

    fn delete_view(&self, request: &AdminRequest, object_id: &str) -> Result<AdminResponse>;

    /// `/admin/<app>/<model>/`.
    fn base_url(&self) -> String {
        format!(
            "{}/{}/{}/",
            AdminConfig::URL_PREFIX,
            self.app_label(),
            self.model_name()
        )
    }

    /// Run the view a resolved route points at.
    fn dispatch(&self, matched: &RouteMatch, request: &AdminRequest) -> Result<AdminResponse> {
        let object_id = matched.object_id.as_deref().unwrap_or_default();
        match matched.route.view {
            AdminView::Changelist => self.changelist_view(request),
            AdminView::Add => self.add_view(request),
            AdminView::Change => self.change_view(request, object_id),
            AdminView::History => self.history_view(request, object_id),
            AdminView::Delete => self.delete_view(request, object_id),
            AdminView::RedirectToChange => Ok(AdminResponse::redirect(format!(
                "{}{}/change/",
                self.base_url(),
                object_id
            ))),
        }
    }
}
