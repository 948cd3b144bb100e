use std::collections::HashMap;
use async_trait::async_trait;
use anyhow::Result;

use crate::models::{ round_cents, Customer, Order, OrderLine, OrderLineReportRow, Product };

#[async_trait]
pub trait ReportSource {
	/// Report rows for one customer, ordered by order date, product id and order line id.
	///
	/// An unknown customer yields an empty vector. Any failure to reach or read
	/// one of the underlying sources is returned as an error, never as partial data.
	async fn customer_orders(&self, customer_id: i64) -> Result<Vec<OrderLineReportRow>>;

	/// Name used in logs
	fn source_name(&self) -> String;
}

/// Tables of the four sources, read independently of each other.
#[derive(Debug, Clone, Default)]
pub struct SourceTables {
	pub customers: Vec<Customer>,
	pub products: Vec<Product>,
	pub orders: Vec<Order>,
	pub order_lines: Vec<OrderLine>,
}

// Inner join of customer -> order -> order line -> product for one customer.
// Lines whose order or product cannot be resolved are dropped.
pub fn join_customer_orders(tables: &SourceTables, customer_id: i64) -> Vec<OrderLineReportRow> {
	if !tables.customers.iter().any(|c| c.customer_id == customer_id) {
		return Vec::new();
	}

	let orders: HashMap<i64, &Order> = tables.orders
		.iter()
		.filter(|o| o.customer_id == customer_id)
		.map(|o| (o.order_id, o))
		.collect();

	let products: HashMap<i64, &Product> = tables.products
		.iter()
		.map(|p| (p.product_id, p))
		.collect();

	let mut joined: Vec<(i64, OrderLineReportRow)> = tables.order_lines
		.iter()
		.filter_map(|line| {
			let order = orders.get(&line.order_id)?;
			let product = products.get(&line.product_id)?;

			Some((
				line.order_line_id,
				OrderLineReportRow {
					product_id: product.product_id,
					order_date: order.order_date,
					product_description: product.product_name.clone(),
					quantity: line.quantity,
					price: product.price,
					total_amount: round_cents((line.quantity as f64) * product.price),
				},
			))
		})
		.collect();

	joined.sort_by(|(a_line, a), (b_line, b)| {
		a.order_date
			.cmp(&b.order_date)
			.then(a.product_id.cmp(&b.product_id))
			.then(a_line.cmp(b_line))
	});

	joined
		.into_iter()
		.map(|(_, row)| row)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::NaiveDate;

	fn date(day: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
	}

	fn tables() -> SourceTables {
		SourceTables {
			customers: vec![
				Customer { customer_id: 1, name: "Alice Adams".into(), address: "101 Main St".into() },
				Customer { customer_id: 2, name: "Bob Brown".into(), address: "202 Oak Ave".into() }
			],
			products: vec![
				Product { product_id: 10, product_name: "Widget A".into(), quantity: 100, price: 9.99 },
				Product { product_id: 11, product_name: "Widget B".into(), quantity: 50, price: 19.5 },
				Product { product_id: 12, product_name: "Gadget C".into(), quantity: 20, price: 49.0 }
			],
			orders: vec![
				Order { order_id: 1001, customer_id: 1, order_date: date(2), order_total: 39.48 },
				Order { order_id: 1002, customer_id: 1, order_date: date(1), order_total: 49.0 },
				Order { order_id: 1003, customer_id: 2, order_date: date(1), order_total: 39.0 },
				// customer 3 does not exist
				Order { order_id: 1004, customer_id: 3, order_date: date(1), order_total: 9.99 }
			],
			order_lines: vec![
				OrderLine { order_line_id: 2, order_id: 1001, product_id: 11, quantity: 1, line_total: 19.5 },
				OrderLine { order_line_id: 1, order_id: 1001, product_id: 10, quantity: 2, line_total: 19.98 },
				OrderLine { order_line_id: 3, order_id: 1002, product_id: 12, quantity: 1, line_total: 49.0 },
				OrderLine { order_line_id: 4, order_id: 1003, product_id: 11, quantity: 2, line_total: 39.0 },
				OrderLine { order_line_id: 5, order_id: 1004, product_id: 10, quantity: 1, line_total: 9.99 },
				// dangling product
				OrderLine { order_line_id: 6, order_id: 1001, product_id: 99, quantity: 1, line_total: 1.0 }
			],
		}
	}

	#[test]
	fn joins_and_orders_by_date_then_product() {
		let rows = join_customer_orders(&tables(), 1);

		let keys: Vec<(NaiveDate, i64)> = rows
			.iter()
			.map(|r| (r.order_date, r.product_id))
			.collect();
		assert_eq!(keys, vec![(date(1), 12), (date(2), 10), (date(2), 11)]);

		let totals: Vec<f64> = rows
			.iter()
			.map(|r| r.total_amount)
			.collect();
		assert_eq!(totals, vec![49.0, 19.98, 19.5]);
	}

	#[test]
	fn uses_current_product_price_not_line_total() {
		let mut tables = tables();
		tables.products[1].price = 20.25;

		let rows = join_customer_orders(&tables, 2);
		assert_eq!(rows.len(), 1);
		assert_eq!(rows[0].price, 20.25);
		assert_eq!(rows[0].total_amount, 40.5);
	}

	#[test]
	fn unknown_customer_yields_no_rows() {
		assert!(join_customer_orders(&tables(), 999).is_empty());
		// orders exist for customer 3 but the customer record does not
		assert!(join_customer_orders(&tables(), 3).is_empty());
	}

	#[test]
	fn ties_fall_back_to_order_line_id() {
		let mut tables = tables();
		tables.order_lines.push(OrderLine {
			order_line_id: 0,
			order_id: 1001,
			product_id: 10,
			quantity: 3,
			line_total: 29.97,
		});

		let rows = join_customer_orders(&tables, 1);
		let quantities: Vec<i64> = rows
			.iter()
			.filter(|r| r.product_id == 10)
			.map(|r| r.quantity)
			.collect();
		assert_eq!(quantities, vec![3, 2]);
	}
}
