use anyhow::Result;
use genui::cli::Args;
use genui::logging::{setup_logging_for_terminal_ui, setup_logging_to_stderr};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.log_stderr {
        setup_logging_to_stderr(args.verbose);
    } else {
        setup_logging_for_terminal_ui(args.verbose);
    }

    genui::app::run(args).await
}
