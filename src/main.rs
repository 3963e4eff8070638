use clap::Parser;
use color_eyre::Result;
use room_client_config::Args;
use room_client_session::LiveKitConnector;
use room_client_tui::{
    init_errors,
    logging,
    App,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_errors()?;
    let args = Args::parse();
    logging::log_init(args.debug)?;

    App::new(args, LiveKitConnector::default())?.run().await
}
