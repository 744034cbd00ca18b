//! Admin requests, responses and user messages.

use crate::config::AdminConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

/// Which submit button a change form was posted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAction {
    /// "Save": return to the index.
    Save,
    /// "Save and continue editing".
    Continue,
    /// "Save and add another".
    AddAnother,
    /// Posted without any recognised button.
    Unspecified,
}

/// An admin request, stripped down to what the views need.
#[derive(Debug, Clone)]
pub struct AdminRequest {
    pub method: RequestMethod,
    /// Full request path, e.g. `/admin/core/siteconfiguration/`.
    pub path: String,
    /// Posted form fields. Empty for GET.
    pub post: Map<String, Value>,
}

impl AdminRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: RequestMethod::Get,
            path: path.into(),
            post: Map::new(),
        }
    }

    pub fn post(path: impl Into<String>, post: Map<String, Value>) -> Self {
        Self {
            method: RequestMethod::Post,
            path: path.into(),
            post,
        }
    }

    pub fn is_post(&self) -> bool {
        self.method == RequestMethod::Post
    }

    pub fn submit_action(&self) -> SubmitAction {
        if self.post.contains_key(AdminConfig::SAVE_KEY) {
            SubmitAction::Save
        } else if self.post.contains_key(AdminConfig::CONTINUE_KEY) {
            SubmitAction::Continue
        } else if self.post.contains_key(AdminConfig::ADD_ANOTHER_KEY) {
            SubmitAction::AddAnother
        } else {
            SubmitAction::Unspecified
        }
    }

    /// Posted fields minus submit buttons and the CSRF token.
    pub fn form_fields(&self) -> Map<String, Value> {
        self.post
            .iter()
            .filter(|(k, _)| {
                !matches!(
                    k.as_str(),
                    AdminConfig::SAVE_KEY
                        | AdminConfig::CONTINUE_KEY
                        | AdminConfig::ADD_ANOTHER_KEY
                        | AdminConfig::CSRF_KEY
                )
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A one-shot message shown on the next page the user sees.
///
/// `text` is HTML-safe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

impl Message {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            text: text.into(),
        }
    }
}

/// Outcome of an admin view.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminResponse {
    /// Render `template` with `context`.
    Render { template: &'static str, context: Value },
    /// Re-render a form whose data did not validate.
    Invalid { template: &'static str, context: Value },
    /// Redirect, optionally queueing a message.
    Redirect {
        location: String,
        message: Option<Message>,
    },
}

impl AdminResponse {
    pub fn redirect(location: impl Into<String>) -> Self {
        AdminResponse::Redirect {
            location: location.into(),
            message: None,
        }
    }

    pub fn redirect_with(location: impl Into<String>, message: Message) -> Self {
        AdminResponse::Redirect {
            location: location.into(),
            message: Some(message),
        }
    }
}

/// Escape text for inclusion in HTML.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a URL path, keeping `/` separators.
pub fn quote_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// `<a href="…">label</a>` with both parts made safe.
pub fn html_link(path: &str, label: &str) -> String {
    format!(
        "<a href=\"{}\">{}</a>",
        escape_html(&quote_path(path)),
        escape_html(label)
    )
}

/// Capitalize the first character, as headings and messages do.
pub fn capfirst(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
