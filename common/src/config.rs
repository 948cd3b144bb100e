use std::{ env, net::SocketAddr, path::PathBuf, str::FromStr };
use anyhow::{ anyhow, Context, Result };
use chrono::NaiveDate;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8050";
const DEFAULT_DATA_DIR: &str = "./data";

/// Location of each of the four independently stored sources.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcesConfig {
	pub customers: PathBuf,
	pub products: PathBuf,
	pub orders: PathBuf,
	pub order_lines: PathBuf,
}

impl SourcesConfig {
	/// Conventional file names under one directory
	pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
		let dir = dir.into();
		Self {
			customers: dir.join("customer.db"),
			products: dir.join("product.db"),
			orders: dir.join("order.db"),
			order_lines: dir.join("order_line.db"),
		}
	}

	pub fn from_env() -> Self {
		let defaults = Self::in_dir(DEFAULT_DATA_DIR);
		Self {
			customers: path_var("REPORT_CUSTOMER_DB", defaults.customers),
			products: path_var("REPORT_PRODUCT_DB", defaults.products),
			orders: path_var("REPORT_ORDER_DB", defaults.orders),
			order_lines: path_var("REPORT_ORDER_LINE_DB", defaults.order_lines),
		}
	}

	/// (alias, path) pairs in attach order
	pub fn sources(&self) -> [(&'static str, &PathBuf); 4] {
		[
			("cust", &self.customers),
			("prod", &self.products),
			("ord", &self.orders),
			("ol", &self.order_lines),
		]
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinStrategy {
	/// One SQL join over the four files attached to an in-memory session
	#[default]
	Attached,
	/// Each table read on its own and joined in memory
	InProcess,
}

impl FromStr for JoinStrategy {
	type Err = anyhow::Error;

	fn from_str(s: &str) -> Result<Self> {
		match s {
			"attached" => Ok(JoinStrategy::Attached),
			"in-process" => Ok(JoinStrategy::InProcess),
			other => Err(anyhow!("unknown join strategy '{}', expected attached or in-process", other)),
		}
	}
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
	pub bind_addr: SocketAddr,
	pub sources: SourcesConfig,
	pub join_strategy: JoinStrategy,
}

impl ServiceConfig {
	/// Reads the environment, after loading `.env` if one is present.
	pub fn from_env() -> Result<Self> {
		dotenvy::dotenv().ok();

		let bind_addr = env
			::var("REPORT_BIND_ADDR")
			.unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
			.parse::<SocketAddr>()
			.context("REPORT_BIND_ADDR is not a socket address")?;

		let join_strategy = match env::var("REPORT_JOIN_STRATEGY") {
			Ok(value) => value.parse::<JoinStrategy>()?,
			Err(_) => JoinStrategy::default(),
		};

		Ok(Self {
			bind_addr,
			sources: SourcesConfig::from_env(),
			join_strategy,
		})
	}
}

/// Settings for the provisioning run.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
	pub sources: SourcesConfig,
	/// Date stamped on every seeded order
	pub order_date: NaiveDate,
}

impl ProvisionConfig {
	pub fn from_env() -> Result<Self> {
		dotenvy::dotenv().ok();

		let order_date = match env::var("REPORT_SEED_DATE") {
			Ok(value) =>
				NaiveDate::parse_from_str(&value, "%Y-%m-%d").with_context(||
					format!("REPORT_SEED_DATE '{}' is not a YYYY-MM-DD date", value)
				)?,
			Err(_) => chrono::Local::now().date_naive(),
		};

		Ok(Self {
			sources: SourcesConfig::from_env(),
			order_date,
		})
	}
}

fn path_var(name: &str, default: PathBuf) -> PathBuf {
	env::var_os(name).map(PathBuf::from).unwrap_or(default)
}
