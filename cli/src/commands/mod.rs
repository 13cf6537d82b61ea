//! Command implementations

pub mod config;
pub mod gpus;
pub mod kill;
pub mod managed;
pub mod pods;
pub mod preset;
pub mod run;
pub mod start;
pub mod stop;
pub mod transfer;
pub mod version;
pub mod whoami;

use clap::Args;

use crate::domain::ResourceOverrides;

/// Resource options shared by workload commands and `preset save`.
#[derive(Args, Debug, Clone, Default)]
pub struct ResourceArgs {
    /// GPU type id (see `podctl gpus`)
    #[arg(long)]
    pub gpu_type: Option<String>,

    /// Number of GPUs
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub gpu_count: Option<u32>,

    /// Container image
    #[arg(long)]
    pub image: Option<String>,

    /// Container disk size in GB
    #[arg(long = "container-disk", value_name = "GB", value_parser = clap::value_parser!(u32).range(1..))]
    pub container_disk_gb: Option<u32>,

    /// Persistent volume size in GB
    #[arg(long = "volume", value_name = "GB")]
    pub volume_gb: Option<u32>,

    /// Auto-terminate the pod after this many minutes
    #[arg(long = "timeout", value_name = "MINUTES", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_minutes: Option<u64>,

    /// Team to bill the pod to
    #[arg(long)]
    pub team_id: Option<String>,
}

impl ResourceArgs {
    /// The explicitly given options as a partial spec.
    #[must_use]
    pub fn overrides(&self) -> ResourceOverrides {
        ResourceOverrides {
            gpu_type: self.gpu_type.clone(),
            gpu_count: self.gpu_count,
            image: self.image.clone(),
            container_disk_gb: self.container_disk_gb,
            volume_gb: self.volume_gb,
            timeout_minutes: self.timeout_minutes,
            team_id: self.team_id.clone(),
        }
    }
}

/// Resource options plus an optional preset.
#[derive(Args, Debug, Clone, Default)]
pub struct SpecArgs {
    /// Named preset merged under the explicit options
    #[arg(long)]
    pub preset: Option<String>,

    #[command(flatten)]
    pub resources: ResourceArgs,
}
