use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = correlator::cli::Cli::parse();
    if let Err(e) = correlator::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
