//! mirror_assistant: interactive entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mirror_assistant::app::run;
use mirror_assistant::{Args, AssistantConfig};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Mirror Assistant: gestures, faces and voice           ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let args = Args::parse();
    let cfg = match AssistantConfig::from_args(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level)),
        )
        .init();

    if args.quick {
        println!("  Quick-start: defaults, config file skipped\n");
    }
    println!("  Mode: keyboard simulation  (H in the window lists the keys)");
    println!("  Type a line and press Enter to talk to the assistant.");
    println!();
    println!("  Opening window…");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
