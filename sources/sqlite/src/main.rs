use anyhow::Result;
use common::{ config::ServiceConfig, server::run_server };
use sources_sqlite::sqlite_source::SqliteReportSource;

#[tokio::main]
async fn main() -> Result<()> {
	println!("Starting customer orders report service");
	let config = ServiceConfig::from_env()?;

	let source = SqliteReportSource::new(config.sources, config.join_strategy);

	// Port 8050 unless REPORT_BIND_ADDR says otherwise
	run_server(source, config.bind_addr).await?;

	Ok(())
}
