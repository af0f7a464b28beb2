use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = debrief_api::Args::parse();
	debrief_api::run(args).await
}
