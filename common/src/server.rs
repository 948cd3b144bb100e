use axum::{
	extract::{ rejection::QueryRejection, Query, State },
	routing::get,
	Json,
	Router,
};
use serde::Deserialize;
use serde_json::{ json, Value };
use std::{ net::SocketAddr, sync::Arc };
use tokio::net::TcpListener;
use anyhow::Result;
use tracing::info;

use crate::{
	encode::{ encode_report, EncodedReport, ReportFormat },
	error::ReportError,
	report::ReportSource,
};

// Shared state for the API
pub struct AppState<T: ReportSource + Send + Sync + 'static> {
	pub source: Arc<T>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerOrdersParams {
	pub customer_id: i64,
	#[serde(default)]
	pub format: ReportFormat,
}

pub fn router<T: ReportSource + Send + Sync + 'static>(source: T) -> Router {
	let state = Arc::new(AppState {
		source: Arc::new(source),
	});

	Router::new()
		.route("/health", get(health_handler))
		.route("/report/customer-orders", get(customer_orders_handler::<T>))
		.with_state(state)
}

// Run the API server with the provided report source
pub async fn run_server<T: ReportSource + Send + Sync + 'static>(
	source: T,
	addr: SocketAddr
) -> Result<()> {
	// Initialize tracing
	tracing_subscriber::fmt::init();

	info!("Serving reports from {}", source.source_name());
	let app = router(source);

	info!("Server listening on {}", addr);
	let listener = TcpListener::bind(addr).await?;
	axum::serve(listener, app).await?;

	Ok(())
}

async fn health_handler() -> Json<Value> {
	Json(json!({ "status": "ok" }))
}

async fn customer_orders_handler<T: ReportSource + Send + Sync + 'static>(
	State(state): State<Arc<AppState<T>>>,
	params: Result<Query<CustomerOrdersParams>, QueryRejection>
) -> Result<EncodedReport, ReportError> {
	// Validation happens before the source is touched
	let Query(params) = params.map_err(|rejection|
		ReportError::InvalidRequest(rejection.body_text())
	)?;

	info!(
		customer_id = params.customer_id,
		format = params.format.as_str(),
		"Customer orders report requested"
	);

	let rows = state.source.customer_orders(params.customer_id).await.map_err(ReportError::DataAccess)?;

	info!(customer_id = params.customer_id, rows = rows.len(), "Customer orders report built");
	encode_report(params.format, params.customer_id, &rows)
}
