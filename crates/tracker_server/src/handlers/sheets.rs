//! `POST /api/sheets` action dispatcher.

use crate::backend::SheetsBackend;
use crate::{error::ProxyError, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracker_core::constants::{DEFAULT_SHEET_NAME, SHEET_HEADER};
use tracker_core::models::proxy::{AppendData, CreateSheetData, ReadData, ShareData, UpdateData};
use tracker_core::models::{ProxyRequest, ProxyResponse, SheetAction};

fn payload<T: DeserializeOwned>(data: &Value) -> Result<T, ProxyError> {
    serde_json::from_value(data.clone()).map_err(|err| ProxyError::InvalidPayload(err.to_string()))
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, ProxyError> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ProxyError::InvalidPayload(format!("{} is required", name)))
}

fn spreadsheet_id(request: &ProxyRequest) -> Result<&str, ProxyError> {
    required(request.spreadsheet_id.as_deref(), "spreadsheetId")
}

fn sheet_name(request: &ProxyRequest) -> Result<&str, ProxyError> {
    required(request.sheet_name.as_deref(), "sheetName")
}

/// 1-based row whose first cell equals `creative_id`, skipping the header.
///
/// Lookup failures count as "not found" so the caller appends instead.
async fn find_row(
    backend: &SheetsBackend,
    spreadsheet_id: &str,
    sheet: &str,
    creative_id: &str,
) -> Option<usize> {
    match backend
        .get_values(spreadsheet_id, &format!("{}!A:A", sheet))
        .await
    {
        Ok(rows) => rows
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, row)| row.first().map(String::as_str) == Some(creative_id))
            .map(|(index, _)| index + 1),
        Err(err) => {
            tracing::warn!("Row lookup for '{}' failed: {}", creative_id, err);
            None
        }
    }
}

async fn append(backend: &SheetsBackend, request: &ProxyRequest) -> Result<ProxyResponse, ProxyError> {
    let AppendData { row_data } = payload(&request.data)?;
    let id = spreadsheet_id(request)?;
    let range = format!("{}!A:K", sheet_name(request)?);
    let data = backend.append_values(id, &range, vec![row_data]).await?;
    Ok(ProxyResponse::ok("Fila añadida correctamente").with_data(data))
}

async fn upsert(backend: &SheetsBackend, request: &ProxyRequest) -> Result<ProxyResponse, ProxyError> {
    let UpdateData {
        creative_id,
        row_data,
    } = payload(&request.data)?;
    let id = spreadsheet_id(request)?;
    let sheet = sheet_name(request)?;

    let Some(row_number) = find_row(backend, id, sheet, &creative_id).await else {
        let range = format!("{}!A:K", sheet);
        let data = backend.append_values(id, &range, vec![row_data]).await?;
        tracing::info!("Appended row for {}", creative_id);
        return Ok(ProxyResponse::ok("Fila creada (no existía previamente)").with_data(data));
    };

    let range = format!("{}!A{}:K{}", sheet, row_number, row_number);
    let data = backend.update_values(id, &range, vec![row_data]).await?;
    tracing::info!("Updated row {} for {}", row_number, creative_id);
    Ok(ProxyResponse {
        row_number: Some(row_number),
        ..ProxyResponse::ok("Fila actualizada correctamente").with_data(data)
    })
}

async fn read(backend: &SheetsBackend, request: &ProxyRequest) -> Result<ProxyResponse, ProxyError> {
    let ReadData { range } = if request.data.is_null() {
        ReadData::default()
    } else {
        payload(&request.data)?
    };
    let id = spreadsheet_id(request)?;
    let range = match range.filter(|range| !range.trim().is_empty()) {
        Some(range) => range,
        None => format!("{}!A:K", sheet_name(request)?),
    };
    let rows = backend.get_values(id, &range).await?;
    Ok(ProxyResponse {
        success: true,
        ..ProxyResponse::default()
    }
    .with_data(json!(rows)))
}

async fn create_sheet(backend: &SheetsBackend, request: &ProxyRequest) -> Result<ProxyResponse, ProxyError> {
    let CreateSheetData { title } = payload(&request.data)?;
    let sheet = request
        .sheet_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(DEFAULT_SHEET_NAME);

    let id = backend.create_spreadsheet(&title, sheet).await?;
    let header = SHEET_HEADER.iter().map(|cell| cell.to_string()).collect();
    backend
        .update_values(&id, &format!("{}!A1:K1", sheet), vec![header])
        .await?;
    tracing::info!("Created spreadsheet {} ('{}')", id, title);

    Ok(ProxyResponse {
        url: Some(format!("https://docs.google.com/spreadsheets/d/{}/edit", id)),
        spreadsheet_id: Some(id),
        ..ProxyResponse::ok("Google Sheet creado correctamente")
    })
}

async fn share(backend: &SheetsBackend, request: &ProxyRequest) -> Result<ProxyResponse, ProxyError> {
    let ShareData { emails } = payload(&request.data)?;
    let id = spreadsheet_id(request)?;
    backend.share_with(id, &emails).await?;
    Ok(ProxyResponse::ok(format!(
        "Sheet compartido con {} usuarios",
        emails.len()
    )))
}

/// Dispatch one proxy request.
///
/// # Errors
/// Unknown actions map to 400; every other failure maps to 500 with the
/// envelope's `error` and `details` set.
pub async fn handle(
    State(state): State<AppState>,
    body: Result<Json<ProxyRequest>, JsonRejection>,
) -> Result<Json<ProxyResponse>, ProxyError> {
    state.backend.ensure_ready()?;
    let Json(request) = body.map_err(|rejection| ProxyError::InvalidPayload(rejection.body_text()))?;
    tracing::info!(
        action = %request.action,
        spreadsheet_id = ?request.spreadsheet_id,
        sheet_name = ?request.sheet_name,
        "Sheets request"
    );

    let action = SheetAction::parse(&request.action)
        .ok_or_else(|| ProxyError::UnknownAction(request.action.clone()))?;
    let backend = state.backend.as_ref();
    let response = match action {
        SheetAction::Append => append(backend, &request).await?,
        SheetAction::Update => upsert(backend, &request).await?,
        SheetAction::Read => read(backend, &request).await?,
        SheetAction::CreateSheet => create_sheet(backend, &request).await?,
        SheetAction::Share => share(backend, &request).await?,
    };
    Ok(Json(response))
}

/// Plain `OPTIONS` requests get an empty 200.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
