use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = debrief_indexer::Args::parse();
	debrief_indexer::run(args).await
}
