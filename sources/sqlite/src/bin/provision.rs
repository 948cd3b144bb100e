use anyhow::Result;
use common::config::ProvisionConfig;
use sources_sqlite::provision::provision;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::fmt::init();

	let config = ProvisionConfig::from_env()?;
	info!(order_date = %config.order_date, "Provisioning customer, product, order and order line sources");

	provision(&config).await?;

	println!(
		"Created {}, {}, {}, {} with sample data.",
		config.sources.customers.display(),
		config.sources.products.display(),
		config.sources.orders.display(),
		config.sources.order_lines.display()
	);

	Ok(())
}
