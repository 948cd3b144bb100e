use anyhow::Result;
use chrono::NaiveDate;
use common::{
	config::{ ProvisionConfig, SourcesConfig },
	models::{ round_cents, Customer, Order, OrderLine, Product },
	report::SourceTables,
};
use rusqlite::{ params, Transaction };
use tokio_rusqlite::Connection as AsyncConnection;
use std::path::Path;
use tracing::info;

const CUSTOMERS_DDL: &str =
	"CREATE TABLE IF NOT EXISTS customers (
        customer_id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        address TEXT NOT NULL
    )";

const PRODUCTS_DDL: &str =
	"CREATE TABLE IF NOT EXISTS products (
        product_id INTEGER PRIMARY KEY,
        product_name TEXT NOT NULL,
        quantity INTEGER NOT NULL,
        price REAL NOT NULL
    )";

const ORDERS_DDL: &str =
	"CREATE TABLE IF NOT EXISTS orders (
        order_id INTEGER PRIMARY KEY,
        customer_id INTEGER NOT NULL,
        order_date TEXT NOT NULL,
        order_total REAL NOT NULL
    )";

const ORDER_LINES_DDL: &str =
	"CREATE TABLE IF NOT EXISTS order_lines (
        order_line_id INTEGER PRIMARY KEY,
        order_id INTEGER NOT NULL,
        product_id INTEGER NOT NULL,
        quantity INTEGER NOT NULL,
        line_total REAL NOT NULL
    )";

/// The fixed demo data set. Every order is dated `order_date`.
pub fn seed_tables(order_date: NaiveDate) -> SourceTables {
	let customers = vec![
		Customer {
			customer_id: 1,
			name: "Alice Adams".to_string(),
			address: "101 Main St, Springfield".to_string(),
		},
		Customer {
			customer_id: 2,
			name: "Bob Brown".to_string(),
			address: "202 Oak Ave, Shelbyville".to_string(),
		}
	];

	let products = vec![
		Product { product_id: 10, product_name: "Widget A".to_string(), quantity: 100, price: 9.99 },
		Product { product_id: 11, product_name: "Widget B".to_string(), quantity: 50, price: 19.5 },
		Product { product_id: 12, product_name: "Gadget C".to_string(), quantity: 20, price: 49.0 }
	];

	// (order_line_id, order_id, product_id, quantity)
	let lines: [(i64, i64, i64, i64); 4] = [
		(1, 1001, 10, 2),
		(2, 1001, 11, 1),
		(3, 1002, 12, 1),
		(4, 1003, 11, 2),
	];

	let order_lines: Vec<OrderLine> = lines
		.iter()
		.map(|&(order_line_id, order_id, product_id, quantity)| {
			let price = products
				.iter()
				.find(|p| p.product_id == product_id)
				.map(|p| p.price)
				.unwrap_or_default();

			OrderLine {
				order_line_id,
				order_id,
				product_id,
				quantity,
				line_total: round_cents((quantity as f64) * price),
			}
		})
		.collect();

	let orders: [(i64, i64); 3] = [
		(1001, 1),
		(1002, 1),
		(1003, 2),
	];

	let orders: Vec<Order> = orders
		.iter()
		.map(|&(order_id, customer_id)| {
			let total: f64 = order_lines
				.iter()
				.filter(|l| l.order_id == order_id)
				.map(|l| l.line_total)
				.sum();

			Order {
				order_id,
				customer_id,
				order_date,
				order_total: round_cents(total),
			}
		})
		.collect();

	SourceTables { customers, products, orders, order_lines }
}

/// Creates each source file and its table, then replaces its rows with `tables`.
pub async fn provision_sources(sources: &SourcesConfig, tables: &SourceTables) -> Result<()> {
	for (_, path) in sources.sources() {
		if let Some(dir) = path.parent() {
			if !dir.as_os_str().is_empty() && !dir.exists() {
				std::fs::create_dir_all(dir)?;
			}
		}
	}

	let customers = tables.customers.clone();
	load_source(&sources.customers, CUSTOMERS_DDL, "customers", move |tx| {
		for customer in &customers {
			tx.execute(
				"INSERT INTO customers (customer_id, name, address) VALUES (?, ?, ?)",
				params![customer.customer_id, customer.name, customer.address]
			)?;
		}
		Ok(customers.len())
	}).await?;

	let products = tables.products.clone();
	load_source(&sources.products, PRODUCTS_DDL, "products", move |tx| {
		for product in &products {
			tx.execute(
				"INSERT INTO products (product_id, product_name, quantity, price) VALUES (?, ?, ?, ?)",
				params![product.product_id, product.product_name, product.quantity, product.price]
			)?;
		}
		Ok(products.len())
	}).await?;

	let orders = tables.orders.clone();
	load_source(&sources.orders, ORDERS_DDL, "orders", move |tx| {
		for order in &orders {
			tx.execute(
				"INSERT INTO orders (order_id, customer_id, order_date, order_total) VALUES (?, ?, ?, ?)",
				params![order.order_id, order.customer_id, order.order_date, order.order_total]
			)?;
		}
		Ok(orders.len())
	}).await?;

	let order_lines = tables.order_lines.clone();
	load_source(&sources.order_lines, ORDER_LINES_DDL, "order_lines", move |tx| {
		for line in &order_lines {
			tx.execute(
				"INSERT INTO order_lines (order_line_id, order_id, product_id, quantity, line_total) VALUES (?, ?, ?, ?, ?)",
				params![line.order_line_id, line.order_id, line.product_id, line.quantity, line.line_total]
			)?;
		}
		Ok(order_lines.len())
	}).await?;

	Ok(())
}

/// Provisions the four sources with the seed data set.
pub async fn provision(config: &ProvisionConfig) -> Result<()> {
	provision_sources(&config.sources, &seed_tables(config.order_date)).await
}

// Schema, wipe and insert for one source, in a single transaction
async fn load_source<F>(path: &Path, ddl: &'static str, table: &'static str, insert: F) -> Result<()>
	where F: FnOnce(&Transaction<'_>) -> rusqlite::Result<usize> + Send + 'static
{
	let conn = AsyncConnection::open(path).await?;

	let inserted = conn.call(move |conn| {
		conn.execute(ddl, [])?;

		let tx = conn.transaction()?;
		tx.execute(&format!("DELETE FROM {}", table), [])?;
		let inserted = insert(&tx)?;
		tx.commit()?;

		Ok(inserted)
	}).await?;

	info!(table, rows = inserted, path = %path.display(), "Provisioned source");
	Ok(())
}
