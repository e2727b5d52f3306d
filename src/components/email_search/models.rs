use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields requested from the messages endpoint
pub const MESSAGE_FIELDS: &str =
    "subject,from,sender,toRecipients,receivedDateTime,isRead,hasAttachments,importance,body";

/// A message as returned by Graph, passed through untouched.
/// Normally a JSON object; any other element of `value` is kept as-is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailMessage(pub Value);

impl EmailMessage {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get("subject").and_then(|v| v.as_str())
    }

    pub fn received_date_time(&self) -> Option<&str> {
        self.get("receivedDateTime").and_then(|v| v.as_str())
    }

    pub fn is_read(&self) -> Option<bool> {
        self.get("isRead").and_then(|v| v.as_bool())
    }

    /// Sender address from `from.emailAddress.address`
    pub fn sender_address(&self) -> Option<&str> {
        self.get("from")
            .and_then(|f| f.get("emailAddress"))
            .and_then(|e| e.get("address"))
            .and_then(|a| a.as_str())
    }
}

fn default_folder() -> String {
    "inbox".to_string()
}

fn default_top() -> u32 {
    1
}

/// Arguments for the email search tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EmailSearchInput {
    /// Microsoft 365 formatted search query, e.g. `from:pilarp@contoso.com AND isread:false`
    #[serde(default)]
    pub search: Option<String>,
    /// Outlook email folder to search from
    #[serde(default = "default_folder")]
    pub email_folder: String,
    /// The number of emails to return
    #[serde(default = "default_top")]
    pub top: u32,
}

impl Default for EmailSearchInput {
    fn default() -> Self {
        Self {
            search: None,
            email_folder: default_folder(),
            top: default_top(),
        }
    }
}
