//! Edit-in-place admin for singleton types.

use super::response::{capfirst, escape_html, html_link, AdminRequest, AdminResponse, Message, SubmitAction};
use super::routes::{default_model_routes, AdminRoute, AdminView};
use super::ModelAdmin;
use crate::config::{AdminConfig, SINGLETON_PK};
use crate::error::{Result, SingletonError};
use crate::path_utils::get_path_name;
use crate::record::{Record, Singleton};
use crate::repository::SingletonRepository;
use crate::store::{ActionFlag, NewLogEntry};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

/// Admin that never lists, adds a second row, or deletes.
///
/// The base URL edits the singleton directly. When the row is missing the
/// same endpoint runs the add flow, so creation and later edits share one URL.
pub struct SingletonAdmin<T: Singleton> {
    repo: SingletonRepository<T>,
}

impl<T: Singleton> SingletonAdmin<T> {
    pub fn new(repo: SingletonRepository<T>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &SingletonRepository<T> {
        &self.repo
    }

    /// Response after a successful add.
    ///
    /// A plain save goes back to the admin index with a success message;
    /// other submit buttons keep the generic behaviour.
    pub fn response_add(&self, request: &AdminRequest, obj: &Record<T>) -> AdminResponse {
        let link = html_link(&request.path, &obj.to_string());
        match request.submit_action() {
            SubmitAction::Save => {
                self.save_response(format!("{} was added successfully.", link))
            }
            action => self.default_post_save(request, action, &link, "added"),
        }
    }

    /// Response after a successful change. Same rules as [`response_add`](Self::response_add).
    pub fn response_change(&self, request: &AdminRequest, obj: &Record<T>) -> AdminResponse {
        let link = html_link(&request.path, &obj.to_string());
        match request.submit_action() {
            SubmitAction::Save => {
                self.save_response(format!("{} was changed successfully.", link))
            }
            action => self.default_post_save(request, action, &link, "changed"),
        }
    }

    fn save_response(&self, msg: String) -> AdminResponse {
        AdminResponse::redirect_with(AdminConfig::INDEX_URL, Message::success(msg))
    }

    fn default_post_save(
        &self,
        request: &AdminRequest,
        action: SubmitAction,
        link: &str,
        verb: &str,
    ) -> AdminResponse {
        let name = T::verbose_name();
        let done = format!("The {} \u{201c}{}\u{201d} was {} successfully.", name, link, verb);
        match action {
            SubmitAction::Continue => {
                let location = if verb == "added" {
                    format!("{}{}/change/", self.base_url(), SINGLETON_PK)
                } else {
                    request.path.clone()
                };
                AdminResponse::redirect_with(
                    location,
                    Message::success(format!("{} You may edit it again below.", done)),
                )
            }
            SubmitAction::AddAnother => {
                let location = if verb == "added" {
                    request.path.clone()
                } else {
                    format!("{}add/", self.base_url())
                };
                AdminResponse::redirect_with(
                    location,
                    Message::success(format!("{} You may add another {} below.", done, name)),
                )
            }
            SubmitAction::Save | SubmitAction::Unspecified => {
                AdminResponse::redirect_with(self.base_url(), Message::success(done))
            }
        }
    }

    fn does_not_exist_redirect(&self, object_id: &str) -> AdminResponse {
        let msg = format!(
            "{} with ID \u{201c}{}\u{201d} doesn\u{2019}t exist. Perhaps it was deleted?",
            capfirst(&T::verbose_name()),
            escape_html(object_id)
        );
        AdminResponse::redirect_with(AdminConfig::INDEX_URL, Message::warning(msg))
    }

    /// Overlay posted fields on `base`.
    ///
    /// Returns the new value and the names of the fields that changed.
    fn build_fields(base: &T, form: &Map<String, Value>) -> Result<(T, Vec<String>)> {
        let mut merged = serde_json::to_value(base)?;
        let object = merged
            .as_object_mut()
            .ok_or_else(|| SingletonError::Validation {
                field: "__all__".into(),
                message: format!("{} does not have named fields", T::TYPE_NAME),
            })?;

        let mut changed = Vec::new();
        for (key, value) in form {
            // fields skipped while unset are absent from `base`
            let differs = match object.get(key) {
                Some(previous) => previous != value,
                None => !value.is_null(),
            };
            if differs {
                changed.push(key.clone());
            }
            object.insert(key.clone(), value.clone());
        }

        let mut ignored = Vec::new();
        let fields = serde_ignored::deserialize(merged, |path| ignored.push(path.to_string()))
            .map_err(|e| SingletonError::Validation {
                field: "__all__".into(),
                message: e.to_string(),
            })?;

        if let Some(field) = ignored.into_iter().next() {
            return Err(SingletonError::Validation {
                field,
                message: "Unknown field.".into(),
            });
        }
        Ok((fields, changed))
    }

    fn render_change_form(
        &self,
        add: bool,
        fields: Value,
        errors: Option<(String, String)>,
    ) -> Result<AdminResponse> {
        let verbose = T::verbose_name();
        let title = if add {
            format!("Add {}", verbose)
        } else {
            format!("Change {}", verbose)
        };
        let has_add_permission = self.has_add_permission()?;
        let (object_id, original) = if add {
            (Value::Null, Value::Null)
        } else {
            (json!(SINGLETON_PK.to_string()), json!(T::TYPE_NAME))
        };

        let mut context = json!({
            "title": title,
            "add": add,
            "change": !add,
            "app_label": T::APP_LABEL,
            "model_name": T::model_name(),
            "verbose_name": verbose,
            "object_id": object_id,
            "original": original,
            "fields": fields,
            "errors": [],
            "has_add_permission": has_add_permission,
            "has_change_permission": self.has_change_permission(),
            "has_delete_permission": self.has_delete_permission(),
            "show_save_and_add_another": has_add_permission,
            "history_url": format!("{}history/", self.base_url()),
        });

        match errors {
            Some((field, message)) => {
                context["errors"] = json!([{ "field": field, "message": message }]);
                Ok(AdminResponse::Invalid {
                    template: AdminConfig::CHANGE_FORM_TEMPLATE,
                    context,
                })
            }
            None => Ok(AdminResponse::Render {
                template: AdminConfig::CHANGE_FORM_TEMPLATE,
                context,
            }),
        }
    }

    fn log_action(&self, obj: &Record<T>, flag: ActionFlag, message: String) -> Result<()> {
        self.repo.store().log_action(&NewLogEntry {
            model: T::label(),
            object_id: obj.pk.to_string(),
            object_repr: obj.to_string(),
            action_flag: flag,
            change_message: message,
        })
    }

    fn add_flow(&self, request: &AdminRequest) -> Result<AdminResponse> {
        let defaults = T::default();
        if !request.is_post() {
            return self.render_change_form(true, serde_json::to_value(&defaults)?, None);
        }

        let form = request.form_fields();
        let fields = match Self::build_fields(&defaults, &form) {
            Ok((fields, _)) => fields,
            Err(SingletonError::Validation { field, message }) => {
                let posted = Value::Object(form);
                return self.render_change_form(true, posted, Some((field, message)));
            }
            Err(e) => return Err(e),
        };

        let mut record = Record::new(fields);
        self.repo.save(&mut record)?;
        self.log_action(&record, ActionFlag::Addition, "Added.".into())?;
        info!(model = %T::label(), "Singleton added through admin");

        Ok(self.response_add(request, &record))
    }

    fn change_flow(&self, request: &AdminRequest, object_id: &str) -> Result<AdminResponse> {
        if object_id != SINGLETON_PK.to_string() {
            return Ok(self.does_not_exist_redirect(object_id));
        }
        let Some(mut record) = self.repo.load()? else {
            return Ok(self.does_not_exist_redirect(object_id));
        };

        if !request.is_post() {
            return self.render_change_form(false, serde_json::to_value(&record.fields)?, None);
        }

        let form = request.form_fields();
        let changed = match Self::build_fields(&record.fields, &form) {
            Ok((fields, changed)) => {
                record.fields = fields;
                changed
            }
            Err(SingletonError::Validation { field, message }) => {
                let mut posted = serde_json::to_value(&record.fields)?;
                if let Some(object) = posted.as_object_mut() {
                    object.extend(form);
                }
                return self.render_change_form(false, posted, Some((field, message)));
            }
            Err(e) => return Err(e),
        };

        self.repo.save(&mut record)?;
        let message = if changed.is_empty() {
            "No fields changed.".to_string()
        } else {
            format!("Changed {}.", changed.join(", "))
        };
        self.log_action(&record, ActionFlag::Change, message)?;
        info!(model = %T::label(), ?changed, "Singleton changed through admin");

        Ok(self.response_change(request, &record))
    }
}

impl<T: Singleton> ModelAdmin for SingletonAdmin<T> {
    fn app_label(&self) -> &'static str {
        T::APP_LABEL
    }

    fn model_name(&self) -> String {
        T::model_name()
    }

    fn verbose_name(&self) -> String {
        T::verbose_name()
    }

    fn verbose_name_plural(&self) -> String {
        T::verbose_name_plural()
    }

    /// No second row: adding is only allowed while the singleton is absent.
    fn has_add_permission(&self) -> Result<bool> {
        Ok(!self.repo.exists()?)
    }

    fn has_delete_permission(&self) -> bool {
        false
    }

    fn get_urls(&self) -> Result<Vec<AdminRoute>> {
        if self.repo.is_default_available() && !self.repo.exists()? {
            info!(model = %T::label(), "Provisioning default singleton");
            self.repo.get()?;
        }

        let object_id = SINGLETON_PK.to_string();
        let mut urls = vec![
            // base URL edits the singleton, skipping the changelist
            AdminRoute::new("", AdminView::Change)
                .with_object_id(object_id.clone())
                .named(get_path_name::<T>("change")),
            AdminRoute::new("history/", AdminView::History)
                .with_object_id(object_id)
                .named(get_path_name::<T>("history")),
        ];
        urls.extend(default_model_routes(T::APP_LABEL, &T::model_name()));

        Ok(urls)
    }

    fn changelist_view(&self, _request: &AdminRequest) -> Result<AdminResponse> {
        let results: Vec<Value> = self
            .repo
            .load()?
            .map(|record| serde_json::to_value(&record))
            .transpose()?
            .into_iter()
            .collect();
        let has_add_permission = self.has_add_permission()?;

        Ok(AdminResponse::Render {
            template: AdminConfig::CHANGE_LIST_TEMPLATE,
            context: json!({
                "title": format!("Select {} to change", T::verbose_name()),
                "result_count": results.len(),
                "results": results,
                "has_add_permission": has_add_permission,
            }),
        })
    }

    fn add_view(&self, request: &AdminRequest) -> Result<AdminResponse> {
        if !self.has_add_permission()? {
            return Err(SingletonError::PermissionDenied {
                action: "add".into(),
                model: T::verbose_name(),
            });
        }
        self.add_flow(request)
    }

    fn change_view(&self, request: &AdminRequest, object_id: &str) -> Result<AdminResponse> {
        if !self.repo.exists()? {
            debug!(model = %T::label(), "Singleton missing, serving add flow");
            return self.add_view(request);
        }
        self.change_flow(request, object_id)
    }

    fn history_view(&self, _request: &AdminRequest, object_id: &str) -> Result<AdminResponse> {
        if object_id != SINGLETON_PK.to_string() {
            return Ok(self.does_not_exist_redirect(object_id));
        }
        let Some(record) = self.repo.load()? else {
            return Ok(self.does_not_exist_redirect(object_id));
        };

        let action_list = self.repo.store().history(&T::label(), object_id)?;

        Ok(AdminResponse::Render {
            template: AdminConfig::OBJECT_HISTORY_TEMPLATE,
            context: json!({
                "title": format!("Change history: {}", record),
                "object_id": object_id,
                "object": record.to_string(),
                "module_name": capfirst(&T::verbose_name_plural()),
                "action_list": action_list,
                "change_url": self.base_url(),
            }),
        })
    }

    fn delete_view(&self, _request: &AdminRequest, _object_id: &str) -> Result<AdminResponse> {
        debug_assert!(!self.has_delete_permission());
        Err(SingletonError::PermissionDenied {
            action: "delete".into(),
            model: T::verbose_name(),
        })
    }
}
