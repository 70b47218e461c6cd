//! Shared fixtures for unit tests.

use crate::catalog::Catalog;
use crate::models::proxy::{CreateSheetData, ShareData, UpdateData};
use crate::models::{Creative, Persona, Phase, ProxyRequest, ProxyResponse, SheetAction};
use crate::sync::{SheetsProxy, SyncError};
use serde_json::json;
use std::sync::Mutex;

pub(crate) const SAMPLE_CATALOG: &str = r#"{
  "personas": {
    "P3": {
      "TOFU": {
        "copies": [
          {"id": "P3-TOFU-001", "headline": "A", "subline": "Trabaja desde el pueblo"},
          {"id": "P3-TOFU-002", "headline": "Tu coworking con vistas", "subline": "Fibra óptica y silencio"},
          {
            "id": "P3-TOFU-003",
            "headline": "Menos atasco, más vida",
            "subline": "Teletrabaja en Alcoy",
            "cta": "Descúbrelo",
            "visual_description": "Escritorio frente a la sierra",
            "visual_template": "TPL-03"
          }
        ]
      },
      "MOFU": {
        "copies": [
          {"id": "P3-MOFU-001", "headline": "Casas con despacho", "subline": "Visítalas"}
        ]
      }
    },
    "P5": {
      "TOFU": {
        "copies": [
          {"id": "P5-TOFU-001", "headline": "Vuelve a casa", "subline": "Tu pueblo te espera"}
        ]
      }
    }
  }
}"#;

pub(crate) fn sample_catalog() -> Catalog {
    Catalog::from_json(SAMPLE_CATALOG).expect("sample catalog")
}

pub(crate) fn custom_creative(id: &str, persona: Persona, phase: Phase, headline: &str) -> Creative {
    Creative {
        id: id.to_string(),
        persona,
        phase,
        headline: headline.to_string(),
        subline: String::new(),
        cta: None,
        visual_description: None,
        visual_template: None,
    }
}

/// In-process stand-in for the proxy with upsert semantics over one sheet.
#[derive(Default)]
pub(crate) struct FakeProxy {
    pub(crate) rows: Mutex<Vec<Vec<String>>>,
    pub(crate) requests: Mutex<Vec<ProxyRequest>>,
    pub(crate) fail_with: Mutex<Option<SyncError>>,
}

impl FakeProxy {
    pub(crate) fn failing(error: SyncError) -> Self {
        let proxy = Self::default();
        *proxy.fail_with.lock().expect("fail lock") = Some(error);
        proxy
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    pub(crate) fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().expect("rows lock").clone()
    }

    fn handle(&self, request: &ProxyRequest) -> ProxyResponse {
        let mut rows = self.rows.lock().expect("rows lock");
        match SheetAction::parse(&request.action) {
            Some(SheetAction::Update) => {
                let data: UpdateData = serde_json::from_value(request.data.clone()).expect("update data");
                let position = rows
                    .iter()
                    .position(|row| row.first() == Some(&data.creative_id));
                match position {
                    Some(index) => {
                        rows[index] = data.row_data;
                        ProxyResponse {
                            row_number: Some(index + 2),
                            ..ProxyResponse::ok("Fila actualizada correctamente")
                        }
                    }
                    None => {
                        rows.push(data.row_data);
                        ProxyResponse::ok("Fila creada (no existía previamente)")
                    }
                }
            }
            Some(SheetAction::CreateSheet) => {
                let data: CreateSheetData =
                    serde_json::from_value(request.data.clone()).expect("create data");
                ProxyResponse {
                    spreadsheet_id: Some(format!("fake-{}", data.title.len())),
                    url: Some("https://sheets.test/fake".to_string()),
                    ..ProxyResponse::ok("Google Sheet creado correctamente")
                }
            }
            Some(SheetAction::Share) => {
                let data: ShareData = serde_json::from_value(request.data.clone()).expect("share data");
                ProxyResponse::ok(format!("Sheet compartido con {} usuarios", data.emails.len()))
            }
            Some(SheetAction::Read) => ProxyResponse::ok("ok").with_data(json!(*rows)),
            Some(SheetAction::Append) | None => ProxyResponse::failure("unsupported"),
        }
    }
}

impl SheetsProxy for FakeProxy {
    async fn send(&self, request: ProxyRequest) -> Result<ProxyResponse, SyncError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        if let Some(error) = self.fail_with.lock().expect("fail lock").clone() {
            return Err(error);
        }
        Ok(self.handle(&request))
    }
}
