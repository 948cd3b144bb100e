use chrono::NaiveDate;
use rust_decimal::{ Decimal, RoundingStrategy };
use serde::{ Deserialize, Serialize };

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
	pub customer_id: i64,
	pub name: String,
	pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
	pub product_id: i64,
	pub product_name: String,
	/// Units in stock
	pub quantity: i64,
	pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
	pub order_id: i64,
	pub customer_id: i64,
	pub order_date: NaiveDate,
	pub order_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
	pub order_line_id: i64,
	pub order_id: i64,
	pub product_id: i64,
	pub quantity: i64,
	pub line_total: f64,
}

/// One denormalized line of the customer orders report.
///
/// Field order is the column order of every output format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineReportRow {
	pub product_id: i64,
	pub order_date: NaiveDate,
	pub product_description: String,
	pub quantity: i64,
	pub price: f64,
	pub total_amount: f64,
}

impl OrderLineReportRow {
	pub const COLUMNS: [&'static str; 6] = [
		"product_id",
		"order_date",
		"product_description",
		"quantity",
		"price",
		"total_amount",
	];
}

/// Rounds the exact binary value to two decimals, half away from zero, as
/// SQLite's ROUND(x, 2) does.
pub fn round_cents(value: f64) -> f64 {
	match Decimal::from_f64_retain(value) {
		Some(exact) => {
			let rounded = exact.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
			(rounded.mantissa() as f64) / 10f64.powi(rounded.scale() as i32)
		}
		// NaN, infinities and magnitudes beyond Decimal's range
		None => value,
	}
}
