pub mod models;

pub use models::{EmailMessage, EmailSearchInput};

use super::credentials::{ConnectionType, CredentialProvider};
use super::graph::{into_values, GraphClient};
use super::{parse_input, Tool, ToolSpec};
use crate::error::{request_error, ToolResult};
use async_trait::async_trait;
use models::MESSAGE_FIELDS;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub const TOOL_NAME: &str = "ms365_email_search";

const DESCRIPTION: &str = r#"
Search user emails from Microsoft Outlook folder

Example search properties format:

Property,Examples
AttachmentNames,attachmentnames:annualreport.ppt OR attachmentnames:ppt OR attachmentnames:annual*
Bcc,bcc:pilarp@contoso.com OR bcc:pilarp OR bcc:Pilar Pinilla
Category,category:Red Category
Cc,cc:pilarp@contoso.com OR cc:pilarp OR cc:Pilar Pinilla
Folderid,folderid:4D6DD7F943C29041A65787E30F02AD1F00000000013A0000 OR folderid:4D6DD7F943C29041A65787E30F02AD1F00000000013A0000 AND from:garthf@contoso.com
From,from:pilarp@contoso.com OR from:pilarp OR from:Pilar Pinilla
HasAttachment,from:pilar@contoso.com AND hasAttachment:true OR hasAttachment:false
Importance,importance:high OR importance:medium OR importance:low
IsRead,isread:true OR isread:false
ItemClass,itemclass:ipm.externaldata.Facebook* AND subject:contoso OR itemclass:ipm.externaldata.Twitter* AND from:Ann Beebe AND Northwind Traders
Kind,kind:email OR kind:email OR kind:im OR kind:externaldata
Participants,participants:garthf@contoso.com OR participants:contoso.com
Received,received:2021-04-15 OR received>=2021-01-01 AND received<=2021-03-31
Recipients,recipients:garthf@contoso.com OR recipients:contoso.com
Sent,sent:2021-07-01 OR sent>=2021-06-01 AND sent<=2021-07-01
Size,size>26214400 OR size:1..1048567
Subject,subject:Quarterly Financials OR subject:northwind
To,to:annb@contoso.com OR to:annb OR to:Ann Beebe
"#;

/// Searches messages in an Outlook mail folder
#[derive(Clone)]
pub struct EmailSearchClient {
    graph: GraphClient,
    credentials: Arc<dyn CredentialProvider>,
    connection_id: String,
}

impl EmailSearchClient {
    pub fn new(
        graph: GraphClient,
        credentials: Arc<dyn CredentialProvider>,
        connection_id: &str,
    ) -> Self {
        Self {
            graph,
            credentials,
            connection_id: connection_id.to_string(),
        }
    }

    /// Messages endpoint for a folder; the folder name is percent-encoded as one path segment
    pub fn messages_url(&self, folder: &str) -> String {
        self.graph.endpoint(&format!(
            "me/mailFolders('{}')/messages",
            urlencoding::encode(folder)
        ))
    }

    /// Search one page of messages; only the first `top` results are returned
    pub async fn search(&self, input: &EmailSearchInput) -> ToolResult<Vec<EmailMessage>> {
        let query = build_query(input)?;
        let connection = self
            .credentials
            .connection(&self.connection_id, ConnectionType::OAuth2AuthCode)
            .await?;

        let url = self.messages_url(&input.email_folder);
        let body = self.graph.get_json(&url, &query, &connection).await?;

        let messages = into_values(body)
            .into_iter()
            .map(EmailMessage)
            .collect::<Vec<_>>();

        info!(
            "Found {} message(s) in folder {}",
            messages.len(),
            input.email_folder
        );
        Ok(messages)
    }
}

/// Query parameters for a message search
pub fn build_query(input: &EmailSearchInput) -> ToolResult<Vec<(&'static str, String)>> {
    if input.top == 0 {
        return Err(request_error("top must be a positive integer"));
    }
    if input.email_folder.trim().is_empty() {
        return Err(request_error("email_folder must not be empty"));
    }

    let search = input.search.as_deref().unwrap_or("");
    Ok(vec![
        ("$select", MESSAGE_FIELDS.to_string()),
        ("$top", input.top.to_string()),
        ("$search", format!("\"{}\"", search)),
        ("mailFolderId", input.email_folder.clone()),
    ])
}

#[async_trait]
impl Tool for EmailSearchClient {
    fn spec(&self) -> ToolSpec {
        ToolSpec::read_only(TOOL_NAME, DESCRIPTION)
            .expects(&self.connection_id, ConnectionType::OAuth2AuthCode)
            .with_input::<EmailSearchInput>()
    }

    async fn invoke(&self, args: Value) -> ToolResult<Value> {
        let input: EmailSearchInput = parse_input(args)?;
        let messages = self.search(&input).await?;
        Ok(serde_json::to_value(messages)?)
    }
}
