//! Human-readable terminal renderer.

use std::collections::BTreeSet;
use std::path::Path;

use owo_colors::OwoColorize as _;

use crate::domain::config::mask_secret;
use crate::domain::pod::format_uptime;
use crate::domain::{GpuType, Pod, PodctlConfig, Presets, ResourceOverrides, UserInfo, WorkloadRun};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    pub fn render_version(&self, version: &str) {
        println!("podctl {version}");
    }

    /// Render the pod table.
    pub fn render_pods(&self, pods: &[Pod]) {
        if pods.is_empty() {
            self.ctx.info("No pods.");
            return;
        }
        println!(
            "  {}",
            format!(
                "{:<16} {:<24} {:<10} {:>4} {:>8} {:>10}",
                "ID", "NAME", "STATUS", "GPUS", "$/HR", "UPTIME"
            )
            .style(self.ctx.styles.bold)
        );
        for pod in pods {
            let status = format!("{:<10}", pod.desired_status.to_string());
            println!(
                "  {:<16} {:<24} {} {:>4} {:>8.3} {:>10}",
                pod.id,
                pod.name.as_deref().unwrap_or("-"),
                status.style(self.ctx.styles.status(&pod.desired_status)),
                pod.gpu_count,
                pod.cost_per_hr,
                format_uptime(pod.uptime_secs()),
            );
        }
    }

    /// Render one pod after a start or stop.
    pub fn render_pod(&self, verb: &str, pod: &Pod) {
        self.ctx
            .success(&format!("Pod {} {verb} ({})", pod.id, pod.desired_status));
    }

    pub fn render_gpus(&self, gpus: &[GpuType]) {
        println!(
            "  {}",
            format!("{:<36} {:<28} {:>6}", "ID", "NAME", "VRAM").style(self.ctx.styles.bold)
        );
        for gpu in gpus {
            println!(
                "  {:<36} {:<28} {:>4}GB",
                gpu.id, gpu.display_name, gpu.memory_in_gb
            );
        }
    }

    pub fn render_user(&self, user: &UserInfo) {
        self.ctx.kv("ID:        ", &user.id);
        self.ctx
            .kv("Email:     ", user.email.as_deref().unwrap_or("-"));
        self.ctx
            .kv("Balance:   ", &format!("${:.2}", user.client_balance));
        self.ctx.kv(
            "Spend/hr:  ",
            &format!("${:.3}", user.current_spend_per_hr),
        );
    }

    /// Render the current configuration with the API key masked.
    pub fn render_config(&self, config: &PodctlConfig, path: &Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        let key = config
            .api_key
            .as_deref()
            .map_or_else(|| "(not set)".to_string(), mask_secret);
        println!("  {:<20} {key}", "api_key:");
        println!("  {:<20} {}", "api_url:", config.api_url());
        self.render_overrides(&config.defaults);
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in ["PODCTL_HOME", "PODCTL_API_KEY", "NO_COLOR"] {
            let value = match std::env::var(var) {
                Ok(v) if var == "PODCTL_API_KEY" => mask_secret(&v),
                Ok(v) => v,
                Err(_) => "(not set)".to_string(),
            };
            println!("    {:<18} {value}", format!("{var}:"));
        }
        println!();
    }

    pub fn render_presets(&self, presets: &Presets) {
        if presets.is_empty() {
            self.ctx
                .info("No presets. Save one: podctl preset save <name> --gpu-type <type>");
            return;
        }
        for (name, overrides) in presets {
            println!("  {}", name.style(self.ctx.styles.bold));
            self.render_overrides(overrides);
        }
    }

    pub fn render_preset(&self, name: &str, overrides: &ResourceOverrides) {
        println!("  {}", name.style(self.ctx.styles.header));
        self.render_overrides(overrides);
    }

    fn render_overrides(&self, o: &ResourceOverrides) {
        let rows: [(&str, Option<String>); 7] = [
            ("gpu_type", o.gpu_type.clone()),
            ("gpu_count", o.gpu_count.map(|v| v.to_string())),
            ("image", o.image.clone()),
            ("container_disk_gb", o.container_disk_gb.map(|v| v.to_string())),
            ("volume_gb", o.volume_gb.map(|v| v.to_string())),
            ("timeout_minutes", o.timeout_minutes.map(|v| v.to_string())),
            ("team_id", o.team_id.clone()),
        ];
        for (key, value) in rows {
            if let Some(value) = value {
                println!("    {:<18} {value}", format!("{key}:").style(self.ctx.styles.dim));
            }
        }
    }

    pub fn render_managed(&self, ids: &BTreeSet<String>) {
        if ids.is_empty() {
            self.ctx.info("No managed pods.");
            return;
        }
        for id in ids {
            println!("  {id}");
        }
    }

    /// Render the outcome of `test` / `exec` / `shell`.
    pub fn render_workload(&self, run: &WorkloadRun) {
        let when = run.auto_termination_at.format("%Y-%m-%d %H:%M:%S UTC");
        if run.exit_code == 0 {
            self.ctx
                .success(&format!("Workload on pod {} finished", run.pod_id));
        } else {
            self.ctx.warn(&format!(
                "Workload on pod {} exited with code {}",
                run.pod_id, run.exit_code
            ));
        }
        self.ctx.kv("Auto-terminates at:", &when.to_string());
    }
}
