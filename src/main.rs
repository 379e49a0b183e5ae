use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use log::info;
use native_fibonacci::{FibError, FibonacciPlugin, PluginConfig};

const HEARTBEAT: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "native-fibonacci")]
#[command(about = "Fast and long-running Fibonacci computations from a native plugin")]
#[command(version)]
struct Cli {
    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute F(N) on the current thread
    #[command(alias = "f")]
    Fib {
        #[arg(allow_negative_numbers = true)]
        n: i32,
    },

    /// Compute F(N) after the long-running delay, on a worker thread
    #[command(alias = "l")]
    LongRunning {
        #[arg(allow_negative_numbers = true)]
        n: i32,
    },

    Info,
}

fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn load_plugin(config: Option<&PathBuf>) -> Result<FibonacciPlugin, FibError> {
    match config {
        Some(path) => {
            let config = PluginConfig::load(path)?;
            FibonacciPlugin::with_config(&config)
        }
        None => Ok(FibonacciPlugin::new()),
    }
}

/// Keeps the main thread responsive while a worker runs the blocking call.
fn run_on_worker(plugin: FibonacciPlugin, n: i32) -> Result<i32, FibError> {
    let (tx, rx) = mpsc::channel();
    let worker = thread::spawn(move || {
        // The receiver only goes away if main has already exited.
        let _ = tx.send(plugin.fib_long_running(n));
    });

    let start = Instant::now();
    let result = loop {
        match rx.recv_timeout(HEARTBEAT) {
            Ok(result) => break result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                info!("Still waiting on worker ({}s)", start.elapsed().as_secs());
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                break Err(FibError::Library("worker thread exited early".to_string()));
            }
        }
    };

    if worker.join().is_err() {
        return Err(FibError::Library("worker thread panicked".to_string()));
    }
    result
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let plugin = match load_plugin(cli.config.as_ref()) {
        Ok(plugin) => plugin,
        Err(e) => {
            eprintln!("❌ Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Fib { n } => match plugin.fib(n) {
            Ok(value) => println!("{value}"),
            Err(e) => {
                eprintln!("❌ {e}");
                std::process::exit(1);
            }
        },

        Commands::LongRunning { n } => {
            if cli.verbose {
                println!(
                    "⏳ Running fib_long_running({n}) on a worker thread ({} ms delay)...",
                    plugin.info().long_running_delay_ms
                );
            }

            match run_on_worker(plugin, n) {
                Ok(value) => println!("{value}"),
                Err(e) => {
                    eprintln!("❌ {e}");
                    std::process::exit(1);
                }
            }
        }

        Commands::Info => {
            let info = plugin.info();
            println!("{} v{}", info.name, info.version);
            println!("Native Fibonacci plugin");
            println!();
            println!("Integer width: {} bits", info.integer_width);
            println!("Max n: {}", info.max_n);
            println!("Long-running delay: {} ms", info.long_running_delay_ms);
            println!();
            println!("Exports:");
            for symbol in &info.exports {
                println!("  {symbol}");
            }
        }
    }
}
