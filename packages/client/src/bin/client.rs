//! Terminal chat client.
//!
//! Connects to a Hiroba chat server, answers the name prompt, then sends every
//! line typed on stdin. Start a line with `@name:` to message one client only.
//! Press Ctrl+C or Ctrl+D to exit.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-client
//! cargo run --bin hiroba-client -- --host 192.168.0.10 --port 3000
//! ```

use clap::Parser;

use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-client")]
#[command(about = "TCP chat client with broadcast and direct messages", long_about = None)]
struct Args {
    /// Chat server host
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Chat server port
    #[arg(short = 'p', long, default_value = "12345")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "warn");

    let args = Args::parse();

    match hiroba_client::run_client(&args.host, args.port).await {
        Ok(end) => println!("{}", end.message()),
        Err(e) => {
            tracing::debug!("Client error: {:?}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
