use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "shiftgate",
    about = "Shiftgate: operational readiness and legitimacy governance for shift work",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute readiness for one (org, site, shift, date)
    Readiness {
        /// Organization identifier
        #[arg(long)]
        org: String,

        /// Site identifier
        #[arg(long)]
        site: String,

        /// Shift code (e.g. EARLY)
        #[arg(long)]
        shift: String,

        /// Shift date, ISO format
        #[arg(long)]
        date: String,

        /// Path to the dataset JSON
        #[arg(long, default_value = ".shiftgate/dataset.json")]
        data: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute readiness and freeze it into the snapshot ledger
    Freeze {
        /// Organization identifier
        #[arg(long)]
        org: String,

        /// Site identifier
        #[arg(long)]
        site: String,

        /// Shift code
        #[arg(long)]
        shift: String,

        /// Shift date, ISO format
        #[arg(long)]
        date: String,

        /// Path to the dataset JSON
        #[arg(long, default_value = ".shiftgate/dataset.json")]
        data: String,

        /// Path to the ledger JSONL
        #[arg(long, default_value = ".shiftgate/ledger.jsonl")]
        ledger: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify an organization's snapshot hash chain
    VerifyChain {
        /// Organization identifier
        #[arg(long)]
        org: String,

        /// Path to the ledger JSONL
        #[arg(long, default_value = ".shiftgate/ledger.jsonl")]
        ledger: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate a mutating action through the governance gate
    Gate {
        /// Action name (e.g. roster.publish)
        #[arg(long)]
        action: String,

        /// Action target; defaults to <site>/<shift>
        #[arg(long)]
        target: Option<String>,

        /// Acting principal recorded in the audit trail
        #[arg(long, default_value = "cli")]
        actor: String,

        /// Organization identifier
        #[arg(long)]
        org: String,

        /// Site identifier
        #[arg(long)]
        site: String,

        /// Shift code; omit for an org-scoped action
        #[arg(long)]
        shift: Option<String>,

        /// Shift date, ISO format; omit for an org-scoped action
        #[arg(long)]
        date: Option<String>,

        /// Path to the dataset JSON
        #[arg(long, default_value = ".shiftgate/dataset.json")]
        data: String,

        /// Path to the ledger JSONL
        #[arg(long, default_value = ".shiftgate/ledger.jsonl")]
        ledger: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify an execution token against the configured signing secret
    TokenVerify {
        /// Token blob (base64url envelope)
        token: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the readiness HTTP API
    Serve {
        /// Organization the server operates in
        #[arg(long)]
        org: String,

        /// Site the server operates in
        #[arg(long)]
        site: String,

        /// Actor recorded for gate checks made over HTTP
        #[arg(long, default_value = "http")]
        actor: String,

        /// Path to the dataset JSON
        #[arg(long, default_value = ".shiftgate/dataset.json")]
        data: String,

        /// Path to the ledger JSONL
        #[arg(long, default_value = ".shiftgate/ledger.jsonl")]
        ledger: String,

        /// Bind address
        #[arg(long, default_value = "127.0.0.1:8423")]
        bind: String,
    },
}
