//! `podctl transfer`: copy files to or from an existing pod.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::app::AppContext;
use crate::application::ports::RemoteExecutor;
use crate::application::services::pod_admin::{self, TransferDirection};
use crate::output::json;

/// Arguments for `podctl transfer`.
#[derive(Args)]
pub struct TransferArgs {
    /// Target pod
    pub pod_id: String,

    /// Source path (local, or remote with --download)
    pub src: String,

    /// Destination path (remote, or local with --download)
    pub dst: String,

    /// Copy from the pod to the local machine
    #[arg(long)]
    pub download: bool,

    /// Copy directories recursively (downloads only; uploads detect directories)
    #[arg(short, long)]
    pub recursive: bool,
}

impl TransferArgs {
    fn direction(&self) -> TransferDirection {
        if self.download {
            TransferDirection::Download {
                remote: self.src.clone(),
                local: PathBuf::from(&self.dst),
                recursive: self.recursive,
            }
        } else {
            TransferDirection::Upload {
                local: PathBuf::from(&self.src),
                remote: self.dst.clone(),
            }
        }
    }
}

/// Run `podctl transfer`.
///
/// # Errors
///
/// Returns an error if the pod has no SSH endpoint or the copy fails.
pub async fn run(
    app: &AppContext,
    executor: &impl RemoteExecutor,
    args: TransferArgs,
) -> Result<ExitCode> {
    app.output
        .info(&format!("Copying {} -> {}...", args.src, args.dst));
    pod_admin::transfer(executor, &args.pod_id, &args.direction()).await?;
    if app.is_json() {
        json::print(&serde_json::json!({
            "pod_id": args.pod_id,
            "src": args.src,
            "dst": args.dst,
            "download": args.download,
        }))?;
    } else {
        app.output.success("Transfer complete");
    }
    Ok(ExitCode::SUCCESS)
}
