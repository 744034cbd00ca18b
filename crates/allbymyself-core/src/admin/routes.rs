//! Ordered admin route tables.
//!
//! Routes are matched first-to-last against the path below a model's base
//! URL, so anything placed ahead of the generic model routes shadows them.

use crate::path_utils::path_name;

const OBJECT_ID: &str = "<object_id>/";

/// The view a route dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminView {
    Changelist,
    Add,
    Change,
    History,
    Delete,
    /// `<id>/` redirects to `<id>/change/`.
    RedirectToChange,
}

/// One entry of a model admin's route table.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminRoute {
    /// Path below the model's base URL; may contain `<object_id>/`.
    pub pattern: String,
    pub view: AdminView,
    /// Object id passed to the view regardless of the matched path.
    pub object_id: Option<String>,
    /// Route name, used for reversing.
    pub name: Option<String>,
    /// Whether the view runs behind the admin authentication wrapper.
    pub admin_view: bool,
}

impl AdminRoute {
    pub fn new(pattern: impl Into<String>, view: AdminView) -> Self {
        Self {
            pattern: pattern.into(),
            view,
            object_id: None,
            name: None,
            admin_view: true,
        }
    }

    pub fn with_object_id(mut self, object_id: impl Into<String>) -> Self {
        self.object_id = Some(object_id.into());
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Match a path relative to the model's base URL.
    ///
    /// Returns the captured object id (if the pattern has one) on success.
    pub fn matches(&self, path: &str) -> Option<Option<String>> {
        match self.pattern.split_once(OBJECT_ID) {
            None => (self.pattern == path).then_some(None),
            Some((prefix, suffix)) => {
                let middle = path.strip_prefix(prefix)?.strip_suffix(suffix)?;
                let id = middle.strip_suffix('/')?;
                if id.is_empty() || id.contains('/') {
                    return None;
                }
                Some(Some(id.to_string()))
            }
        }
    }

    /// Build the relative path for this route.
    fn reverse(&self, object_id: Option<&str>) -> Option<String> {
        match self.pattern.split_once(OBJECT_ID) {
            None => Some(self.pattern.clone()),
            Some((prefix, suffix)) => {
                let id = object_id.or(self.object_id.as_deref())?;
                Some(format!("{}{}/{}", prefix, id, suffix))
            }
        }
    }
}

/// A resolved route and the object id its view receives.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch {
    pub route: AdminRoute,
    pub object_id: Option<String>,
}

/// The generic model-admin routes: changelist, add, history, delete, change.
pub fn default_model_routes(app_label: &str, model_name: &str) -> Vec<AdminRoute> {
    let name = |action: &str| path_name(app_label, model_name, action);
    vec![
        AdminRoute::new("", AdminView::Changelist).named(name("changelist")),
        AdminRoute::new("add/", AdminView::Add).named(name("add")),
        AdminRoute::new("<object_id>/history/", AdminView::History).named(name("history")),
        AdminRoute::new("<object_id>/delete/", AdminView::Delete).named(name("delete")),
        AdminRoute::new("<object_id>/change/", AdminView::Change).named(name("change")),
        AdminRoute::new("<object_id>/", AdminView::RedirectToChange),
    ]
}

/// First route matching `path`.
pub fn resolve(routes: &[AdminRoute], path: &str) -> Option<RouteMatch> {
    routes.iter().find_map(|route| {
        route.matches(path).map(|captured| RouteMatch {
            object_id: route.object_id.clone().or(captured),
            route: route.clone(),
        })
    })
}

/// Relative path of the first route called `name`.
pub fn reverse(routes: &[AdminRoute], name: &str, object_id: Option<&str>) -> Option<String> {
    routes
        .iter()
        .filter(|route| route.name.as_deref() == Some(name))
        .find_map(|route| route.reverse(object_id))
}
