use axum::{ http::StatusCode, response::{ IntoResponse, Response }, Json };
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

#[derive(Debug, Error)]
pub enum ReportError {
	/// Rejected before any data access
	#[error("Invalid request: {0}")]
	InvalidRequest(String),

	#[error("Data access failed: {0:#}")]
	DataAccess(#[source] anyhow::Error),

	#[error("Encoding failed: {0}")]
	Encoding(String),
}

impl ReportError {
	pub fn status(&self) -> StatusCode {
		match self {
			ReportError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
			ReportError::DataAccess(_) | ReportError::Encoding(_) =>
				StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl From<csv::Error> for ReportError {
	fn from(e: csv::Error) -> Self {
		ReportError::Encoding(e.to_string())
	}
}

impl From<rust_xlsxwriter::XlsxError> for ReportError {
	fn from(e: rust_xlsxwriter::XlsxError) -> Self {
		ReportError::Encoding(e.to_string())
	}
}

impl From<serde_json::Error> for ReportError {
	fn from(e: serde_json::Error) -> Self {
		ReportError::Encoding(e.to_string())
	}
}

impl IntoResponse for ReportError {
	fn into_response(self) -> Response {
		let status = self.status();
		let body = match &self {
			ReportError::InvalidRequest(message) =>
				ErrorResponse {
					error: "invalid_request".to_string(),
					message: message.clone(),
				},
			_ => {
				error!("Report request failed: {}", self);
				ErrorResponse {
					error: "internal_error".to_string(),
					message: "Internal server error".to_string(),
				}
			}
		};

		(status, Json(body)).into_response()
	}
}
