use std::{env, path, sync::Arc};

use civiroll::{AppBuilderOpts, AppState, routes};
use civiroll_core::{app::VERSION, pages::PageAccessPolicy};
use civiroll_directory_adapter_sqlite::DirectoryAdapterSqlite;
use tracing::info;

pub struct Config {
	pub db_dir: path::PathBuf,
	pub listen: String,
	pub session_secret: String,
}

impl Config {
	fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
		Ok(Config {
			db_dir: path::PathBuf::from(
				env::var("CIVIROLL_DB_DIR").unwrap_or_else(|_| "./data".to_string()),
			),
			listen: env::var("CIVIROLL_LISTEN").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
			session_secret: env::var("CIVIROLL_SESSION_SECRET")
				.map_err(|_| "CIVIROLL_SESSION_SECRET is not set")?,
		})
	}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_target(false)
		.init();
	info!("Civiroll v{}", VERSION);

	let config = Config::from_env()?;
	tokio::fs::create_dir_all(&config.db_dir).await?;

	let directory = Arc::new(DirectoryAdapterSqlite::new(config.db_dir.join("directory.db")).await?);

	let mut opts = AppBuilderOpts::new(&config.session_secret);
	opts.listen = config.listen.into();
	let app = AppState::build(directory, PageAccessPolicy::admin_defaults(), opts);

	let router =
		routes::init(app.clone()).layer(tower_http::trace::TraceLayer::new_for_http());
	let listener = tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await?;
	info!("Listening on {}", app.opts.listen);
	axum::serve(listener, router).await?;

	Ok(())
}

// vim: ts=4
