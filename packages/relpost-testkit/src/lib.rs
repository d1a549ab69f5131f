//! Scratch Postgres databases for tests that only run when `RELPOST_PG_DSN` is set.

mod error;

pub use error::{Error, Result};

use std::{env, future::Future, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::runtime::Builder;
use uuid::Uuid;

pub const DSN_ENV: &str = "RELPOST_PG_DSN";

/// Tried in order when a connection outside the scratch database is needed.
const MAINTENANCE_DATABASES: [&str; 2] = ["postgres", "template1"];

/// A uniquely named database, dropped on [`TestDatabase::drop_now`] or when the value goes away.
pub struct TestDatabase {
	name: String,
	dsn: String,
	maintenance: PgConnectOptions,
	dropped: bool,
}
impl TestDatabase {
	pub async fn create(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error(format!("Invalid {DSN_ENV}: {err}.")))?;
		let (maintenance, mut conn) = maintenance_connection(&base).await?;
		let name = format!("relpost_test_{}", Uuid::new_v4().simple());
		let sql = format!(r#"CREATE DATABASE "{name}""#);

		sqlx::query(&sql)
			.execute(&mut conn)
			.await
			.map_err(|err| Error(format!("Failed to create database {name}: {err}.")))?;

		let _ = conn.close().await;
		let dsn = base.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, maintenance, dropped: false })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub async fn drop_now(mut self) -> Result<()> {
		self.drop_database().await
	}

	async fn drop_database(&mut self) -> Result<()> {
		if !self.dropped {
			drop_database(&self.maintenance, &self.name).await?;

			self.dropped = true;
		}

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let name = self.name.clone();
		let maintenance = self.maintenance.clone();

		// The caller's runtime may be shutting down, so use a private one.
		thread::scope(|scope| {
			scope.spawn(move || {
				let outcome = Builder::new_current_thread()
					.enable_all()
					.build()
					.map_err(|err| Error(err.to_string()))
					.and_then(|runtime| runtime.block_on(drop_database(&maintenance, &name)));

				if let Err(err) = outcome {
					eprintln!("Failed to drop test database {name}: {err}");
				}
			});
		});
	}
}

pub fn dsn_from_env() -> Option<String> {
	env::var(DSN_ENV).ok().filter(|dsn| !dsn.trim().is_empty())
}

/// Runs `f` against a fresh database and drops it afterwards. A drop failure only surfaces when
/// `f` itself succeeded.
pub async fn with_database<F, Fut, T>(base_dsn: &str, f: F) -> Result<T>
where
	F: FnOnce(String) -> Fut,
	Fut: Future<Output = Result<T>>,
{
	let mut db = TestDatabase::create(base_dsn).await?;
	let outcome = f(db.dsn.clone()).await;
	let dropped = db.drop_database().await;

	match (outcome, dropped) {
		(Ok(_), Err(err)) => Err(err),
		(outcome, Err(err)) => {
			eprintln!("Failed to drop test database {}: {err}", db.name);

			outcome
		},
		(outcome, Ok(())) => outcome,
	}
}

async fn maintenance_connection(base: &PgConnectOptions) -> Result<(PgConnectOptions, PgConnection)> {
	let mut failures = Vec::new();

	for database in MAINTENANCE_DATABASES {
		let options = base.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => failures.push(format!("{database}: {err}")),
		}
	}

	Err(Error(format!("No maintenance database reachable ({}).", failures.join("; "))))
}

async fn drop_database(maintenance: &PgConnectOptions, name: &str) -> Result<()> {
	let mut conn = PgConnection::connect_with(maintenance)
		.await
		.map_err(|err| Error(format!("Failed to connect for dropping {name}: {err}.")))?;
	let sql = format!(r#"DROP DATABASE IF EXISTS "{name}" WITH (FORCE)"#);

	sqlx::query(&sql)
		.execute(&mut conn)
		.await
		.map_err(|err| Error(format!("Failed to drop database {name}: {err}.")))?;

	Ok(())
}
