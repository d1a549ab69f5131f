use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = relpost_api::Args::parse();

	relpost_api::run(args).await
}
