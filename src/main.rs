//! Promflat CLI entry point.

use promflat::cli::{self, Cli};
use promflat::core::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Execute the command
    cli::execute(cli).await
}
