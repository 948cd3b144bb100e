use axum::{
	http::{ header, HeaderValue, StatusCode },
	response::{ IntoResponse, Response },
};
use rust_xlsxwriter::{ ColNum, Format, RowNum, Workbook };
use serde::Deserialize;

use crate::{ error::ReportError, models::OrderLineReportRow };

pub const XLSX_CONTENT_TYPE: &str =
	"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const SHEET_NAME: &str = "orders";

/// Output formats the report endpoint accepts. Anything else fails to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
	#[default]
	Json,
	Csv,
	Excel,
}

impl ReportFormat {
	pub fn as_str(&self) -> &'static str {
		match self {
			ReportFormat::Json => "json",
			ReportFormat::Csv => "csv",
			ReportFormat::Excel => "excel",
		}
	}
}

/// An encoded report body plus the headers it is served with.
#[derive(Debug)]
pub struct EncodedReport {
	pub content_type: &'static str,
	/// `Content-Disposition` for formats downloaded as a file
	pub attachment: Option<HeaderValue>,
	pub body: Vec<u8>,
}

pub fn encode_report(
	format: ReportFormat,
	customer_id: i64,
	rows: &[OrderLineReportRow]
) -> Result<EncodedReport, ReportError> {
	match format {
		ReportFormat::Json =>
			Ok(EncodedReport {
				content_type: "application/json",
				attachment: None,
				body: encode_json(rows)?,
			}),
		ReportFormat::Csv =>
			Ok(EncodedReport {
				content_type: "text/csv",
				attachment: Some(attachment(&format!("customer_{}_orders.csv", customer_id))?),
				body: encode_csv(rows)?,
			}),
		ReportFormat::Excel =>
			Ok(EncodedReport {
				content_type: XLSX_CONTENT_TYPE,
				attachment: Some(attachment(&format!("customer_{}_orders.xlsx", customer_id))?),
				body: encode_xlsx(rows)?,
			}),
	}
}

pub fn attachment(filename: &str) -> Result<HeaderValue, ReportError> {
	HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename)).map_err(|e|
		ReportError::Encoding(format!("invalid attachment name {:?}: {}", filename, e))
	)
}

pub fn encode_json(rows: &[OrderLineReportRow]) -> Result<Vec<u8>, ReportError> {
	Ok(serde_json::to_vec(rows)?)
}

pub fn encode_csv(rows: &[OrderLineReportRow]) -> Result<Vec<u8>, ReportError> {
	// Header is written by hand so it is present even without data rows
	let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
	writer.write_record(OrderLineReportRow::COLUMNS)?;

	for row in rows {
		writer.serialize(row)?;
	}

	writer.into_inner().map_err(|e| ReportError::Encoding(e.to_string()))
}

pub fn encode_xlsx(rows: &[OrderLineReportRow]) -> Result<Vec<u8>, ReportError> {
	let mut workbook = Workbook::new();
	let header_format = Format::new().set_bold();

	let worksheet = workbook.add_worksheet();
	worksheet.set_name(SHEET_NAME)?;

	for (col, name) in OrderLineReportRow::COLUMNS.iter().enumerate() {
		worksheet.write_string_with_format(0, col as ColNum, *name, &header_format)?;
	}

	for (index, row) in rows.iter().enumerate() {
		let r = (index + 1) as RowNum;
		worksheet.write_number(r, 0, row.product_id as f64)?;
		worksheet.write_string(r, 1, row.order_date.format("%Y-%m-%d").to_string())?;
		worksheet.write_string(r, 2, row.product_description.as_str())?;
		worksheet.write_number(r, 3, row.quantity as f64)?;
		worksheet.write_number(r, 4, row.price)?;
		worksheet.write_number(r, 5, row.total_amount)?;
	}

	Ok(workbook.save_to_buffer()?)
}

impl IntoResponse for EncodedReport {
	fn into_response(self) -> Response {
		let mut response = (StatusCode::OK, self.body).into_response();
		let headers = response.headers_mut();
		headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(self.content_type));

		if let Some(value) = self.attachment {
			headers.insert(header::CONTENT_DISPOSITION, value);
		}

		response
	}
}
