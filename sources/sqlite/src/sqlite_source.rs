use anyhow::{ Context, Result };
use async_trait::async_trait;
use common::{
	config::{ JoinStrategy, SourcesConfig },
	models::{ Customer, Order, OrderLine, OrderLineReportRow, Product },
	report::{ join_customer_orders, ReportSource, SourceTables },
};
use rusqlite::{ OpenFlags, Row };
use tokio_rusqlite::Connection as AsyncConnection;
use std::path::Path;
use tracing::debug;

const CUSTOMER_ORDERS_SQL: &str =
	"
	SELECT p.product_id,
	       o.order_date,
	       p.product_name,
	       l.quantity,
	       p.price,
	       ROUND(l.quantity * p.price, 2)
	FROM cust.customers c
	JOIN ord.orders o ON o.customer_id = c.customer_id
	JOIN ol.order_lines l ON l.order_id = o.order_id
	JOIN prod.products p ON p.product_id = l.product_id
	WHERE c.customer_id = ?1
	ORDER BY o.order_date, p.product_id, l.order_line_id
";

/// Customer orders report over four SQLite files, one per entity.
pub struct SqliteReportSource {
	sources: SourcesConfig,
	strategy: JoinStrategy,
}

impl SqliteReportSource {
	pub fn new(sources: SourcesConfig, strategy: JoinStrategy) -> Self {
		Self { sources, strategy }
	}

	// Fresh in-memory session with the four sources attached read-only under their aliases
	async fn open_attached_session(&self) -> Result<AsyncConnection> {
		let conn = AsyncConnection::open_in_memory_with_flags(
			OpenFlags::SQLITE_OPEN_READ_WRITE |
				OpenFlags::SQLITE_OPEN_CREATE |
				OpenFlags::SQLITE_OPEN_URI |
				OpenFlags::SQLITE_OPEN_NO_MUTEX
		).await?;

		for (alias, path) in self.sources.sources() {
			let uri = read_only_uri(path);

			conn.call(move |conn| {
				conn.execute(&format!("ATTACH DATABASE ?1 AS {}", alias), [&uri])?;
				Ok(())
			}).await
				.with_context(|| format!("attaching {} source {}", alias, path.display()))?;
		}

		conn.call(|conn| {
			conn.execute_batch("PRAGMA query_only = ON")?;
			Ok(())
		}).await?;

		Ok(conn)
	}

	async fn query_attached(&self, customer_id: i64) -> Result<Vec<OrderLineReportRow>> {
		let conn = self.open_attached_session().await?;

		let rows = conn.call(move |conn| {
			let mut stmt = conn.prepare(CUSTOMER_ORDERS_SQL)?;

			let rows = stmt
				.query_map([customer_id], |row| {
					Ok(OrderLineReportRow {
						product_id: row.get(0)?,
						order_date: row.get(1)?,
						product_description: row.get(2)?,
						quantity: row.get(3)?,
						price: row.get(4)?,
						total_amount: row.get(5)?,
					})
				})?
				.collect::<Result<Vec<_>, _>>()?;

			Ok(rows)
		}).await?;

		Ok(rows)
	}

	async fn query_in_process(&self, customer_id: i64) -> Result<Vec<OrderLineReportRow>> {
		let tables = SourceTables {
			customers: read_table(
				&self.sources.customers,
				"SELECT customer_id, name, address FROM customers",
				customer_from_row
			).await?,
			products: read_table(
				&self.sources.products,
				"SELECT product_id, product_name, quantity, price FROM products",
				product_from_row
			).await?,
			orders: read_table(
				&self.sources.orders,
				"SELECT order_id, customer_id, order_date, order_total FROM orders",
				order_from_row
			).await?,
			order_lines: read_table(
				&self.sources.order_lines,
				"SELECT order_line_id, order_id, product_id, quantity, line_total FROM order_lines",
				order_line_from_row
			).await?,
		};

		debug!(
			customers = tables.customers.len(),
			products = tables.products.len(),
			orders = tables.orders.len(),
			order_lines = tables.order_lines.len(),
			"Read source tables"
		);

		Ok(join_customer_orders(&tables, customer_id))
	}
}

#[async_trait]
impl ReportSource for SqliteReportSource {
	async fn customer_orders(&self, customer_id: i64) -> Result<Vec<OrderLineReportRow>> {
		match self.strategy {
			JoinStrategy::Attached => self.query_attached(customer_id).await,
			JoinStrategy::InProcess => self.query_in_process(customer_id).await,
		}
	}

	fn source_name(&self) -> String {
		let strategy = match self.strategy {
			JoinStrategy::Attached => "attached",
			JoinStrategy::InProcess => "in-process",
		};
		format!("SQLite ({})", strategy)
	}
}

// `mode=ro` fails on a missing file instead of creating an empty one
fn read_only_uri(path: &Path) -> String {
	let escaped = path
		.to_string_lossy()
		.replace('%', "%25")
		.replace('?', "%3f")
		.replace('#', "%23");
	format!("file:{}?mode=ro", escaped)
}

// Reads a whole table from one source file on its own read-only connection
async fn read_table<T, F>(path: &Path, sql: &'static str, map: F) -> Result<Vec<T>>
	where T: Send + 'static, F: Fn(&Row<'_>) -> rusqlite::Result<T> + Send + 'static
{
	let conn = AsyncConnection::open_with_flags(
		path,
		OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX
	).await.with_context(|| format!("opening source {}", path.display()))?;

	let rows = conn.call(move |conn| {
		let mut stmt = conn.prepare(sql)?;
		let rows = stmt
			.query_map([], |row| map(row))?
			.collect::<Result<Vec<_>, _>>()?;

		Ok(rows)
	}).await
		.with_context(|| format!("reading source {}", path.display()))?;

	Ok(rows)
}

fn customer_from_row(row: &Row<'_>) -> rusqlite::Result<Customer> {
	Ok(Customer {
		customer_id: row.get(0)?,
		name: row.get(1)?,
		address: row.get(2)?,
	})
}

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
	Ok(Product {
		product_id: row.get(0)?,
		product_name: row.get(1)?,
		quantity: row.get(2)?,
		price: row.get(3)?,
	})
}

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<Order> {
	Ok(Order {
		order_id: row.get(0)?,
		customer_id: row.get(1)?,
		order_date: row.get(2)?,
		order_total: row.get(3)?,
	})
}

fn order_line_from_row(row: &Row<'_>) -> rusqlite::Result<OrderLine> {
	Ok(OrderLine {
		order_line_id: row.get(0)?,
		order_id: row.get(1)?,
		product_id: row.get(2)?,
		quantity: row.get(3)?,
		line_total: row.get(4)?,
	})
}
