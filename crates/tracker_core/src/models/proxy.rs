//! Wire format shared by the proxy server and its clients.
//!
//! Every call is a `POST` carrying `{action, spreadsheetId?, sheetName?, data}`
//! and answered with the `{success, message?, data?, error?, details?}` envelope.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Fixed action vocabulary understood by the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetAction {
    Append,
    Update,
    Read,
    CreateSheet,
    Share,
}

impl SheetAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            SheetAction::Append => "append",
            SheetAction::Update => "update",
            SheetAction::Read => "read",
            SheetAction::CreateSheet => "create_sheet",
            SheetAction::Share => "share",
        }
    }

    /// Parse an action name; unknown names yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "append" => Some(SheetAction::Append),
            "update" => Some(SheetAction::Update),
            "read" => Some(SheetAction::Read),
            "create_sheet" => Some(SheetAction::CreateSheet),
            "share" => Some(SheetAction::Share),
            _ => None,
        }
    }
}

/// Request body sent to the proxy endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    #[serde(default)]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// `data` payload of the `append` action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendData {
    pub row_data: Vec<String>,
}

/// `data` payload of the `update` action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateData {
    pub creative_id: String,
    pub row_data: Vec<String>,
}

/// `data` payload of the `read` action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadData {
    #[serde(default)]
    pub range: Option<String>,
}

/// `data` payload of the `create_sheet` action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSheetData {
    pub title: String,
}

/// `data` payload of the `share` action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareData {
    pub emails: Vec<String>,
}

impl ProxyRequest {
    fn new(action: SheetAction, data: Value) -> Self {
        Self {
            action: action.as_str().to_string(),
            spreadsheet_id: None,
            sheet_name: None,
            data,
        }
    }

    fn targeting(mut self, spreadsheet_id: &str, sheet_name: Option<&str>) -> Self {
        self.spreadsheet_id = Some(spreadsheet_id.to_string());
        self.sheet_name = sheet_name.map(str::to_string);
        self
    }

    pub fn append(spreadsheet_id: &str, sheet_name: &str, row: Vec<String>) -> Self {
        Self::new(SheetAction::Append, json!(AppendData { row_data: row }))
            .targeting(spreadsheet_id, Some(sheet_name))
    }

    pub fn update(
        spreadsheet_id: &str,
        sheet_name: &str,
        creative_id: &str,
        row: Vec<String>,
    ) -> Self {
        let data = UpdateData {
            creative_id: creative_id.to_string(),
            row_data: row,
        };
        Self::new(SheetAction::Update, json!(data)).targeting(spreadsheet_id, Some(sheet_name))
    }

    pub fn read(spreadsheet_id: &str, sheet_name: &str, range: Option<&str>) -> Self {
        let data = ReadData {
            range: range.map(str::to_string),
        };
        Self::new(SheetAction::Read, json!(data)).targeting(spreadsheet_id, Some(sheet_name))
    }

    pub fn create_sheet(title: &str, sheet_name: &str) -> Self {
        let mut request = Self::new(
            SheetAction::CreateSheet,
            json!(CreateSheetData {
                title: title.to_string()
            }),
        );
        request.sheet_name = Some(sheet_name.to_string());
        request
    }

    pub fn share(spreadsheet_id: &str, emails: &[String]) -> Self {
        Self::new(
            SheetAction::Share,
            json!(ShareData {
                emails: emails.to_vec()
            }),
        )
        .targeting(spreadsheet_id, None)
    }
}

/// Response envelope returned by every proxy call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// 1-based row overwritten by an `update` that found its target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_number: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ProxyResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}
