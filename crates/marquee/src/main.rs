use clap::{Parser, Subcommand};
use marquee::app::{self, StatusBoard};
use marquee::config;
use marquee::sys::runtime;
use marquee::sys::server::SOCKET_PATH;
use std::io::{Read, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;

#[derive(Parser, Debug)]
#[command(name = "marquee", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Run the daemon (default).
    Run,
    /// Send one command to a running daemon, e.g. `marquee send goto hero next`.
    Send {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// Write the default config file if none exists and print its path.
    InitConfig,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_daemon(),
        Commands::Send { words } => send_command(&shell_words::join(&words)),
        Commands::InitConfig => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn run_daemon() -> anyhow::Result<()> {
    let config = config::load_or_setup();
    let (tx, rx) = async_channel::bounded(32);
    let board = StatusBoard::default();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        // Start Background Services
        runtime::start_background_services(tx, board.clone());
        app::run(config, rx, board).await;
    });
    Ok(())
}

fn send_command(cmd: &str) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to marquee daemon at {}: {}. Is marquee running?",
            SOCKET_PATH,
            e
        )
    })?;

    writeln!(stream, "{}", cmd)?;
    stream.shutdown(Shutdown::Write)?;

    let mut answer = String::new();
    stream.read_to_string(&mut answer)?;
    print!("{}", answer);
    Ok(())
}
