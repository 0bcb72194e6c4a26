//! DirectResponseRoute admission webhook.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────┐
//!                      │               ADMISSION WEBHOOK                │
//!                      │                                               │
//!  AdmissionReview     │  ┌────────┐   ┌─────────┐   ┌─────────────┐  │
//!  ────────────────────┼─▶│  net   │──▶│  http   │──▶│  admission  │  │
//!  (kube-apiserver)    │  │  tls   │   │ server  │   │ scheme +    │  │
//!                      │  └────────┘   └─────────┘   │ validation  │  │
//!                      │                             └──────┬──────┘  │
//!  verdict             │                                    │         │
//!  ◀───────────────────┼────────────────────────────────────┘         │
//!                      │                                               │
//!                      │  config (TOML + watcher) · observability ·    │
//!                      │  lifecycle (startup, signals, shutdown)       │
//!                      └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "direct-response")]
#[command(about = "Admission webhook for DirectResponseRoute resources", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Watched for changes.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    direct_response::lifecycle::startup::run(args.config.as_deref()).await
}
