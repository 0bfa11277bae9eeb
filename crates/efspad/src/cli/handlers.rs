use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use efspadapp::api::EfsPadApi;
use efspadapp::commands::CmdResult;
use efspadapp::config::EfsPadConfig;
use efspadapp::invoker::InvocationRequest;
use efspadapp::store::fs_backend::FsBackend;

use super::logging;
use super::render;
use super::setup::{Cli, Commands};

struct AppContext {
    api: EfsPadApi<FsBackend>,
    config: EfsPadConfig,
    json: bool,
}

impl AppContext {
    fn mount_point(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.unwrap_or_else(|| self.config.mount_point.clone())
    }
}

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = EfsPadConfig::load(cli.config.as_deref())?;
    let ctx = AppContext {
        api: EfsPadApi::new(FsBackend::new(), config.budget()),
        config,
        json: cli.json,
    };

    let result = match cli.command {
        Commands::Run {
            desired,
            mount_point,
        } => handle_run(&ctx, desired, mount_point)?,
        Commands::Status { mount_point } => handle_status(&ctx, mount_point)?,
        Commands::Invoke { event, request } => handle_invoke(&ctx, event.into(), &request)?,
        Commands::Doctor {
            mount_point,
            max_age_mins,
        } => handle_doctor(&ctx, mount_point, max_age_mins)?,
        Commands::Config => return handle_config(&ctx),
    };

    render::print_result(&result, ctx.json)?;
    Ok(if result.failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn handle_run(
    ctx: &AppContext,
    desired: Option<String>,
    mount_point: Option<PathBuf>,
) -> Result<CmdResult> {
    let Some(desired) = desired.or_else(|| ctx.config.desired_padding.clone()) else {
        bail!("no target size: pass --desired or set desired_padding / EFSPAD_DESIRED_PADDING");
    };
    let mount_point = ctx.mount_point(mount_point);
    Ok(ctx.api.run(&mount_point, &desired)?)
}

fn handle_status(ctx: &AppContext, mount_point: Option<PathBuf>) -> Result<CmdResult> {
    Ok(ctx.api.status(&ctx.mount_point(mount_point))?)
}

fn handle_invoke(
    ctx: &AppContext,
    event: efspadapp::invoker::LifecycleEvent,
    source: &str,
) -> Result<CmdResult> {
    let body = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("reading request {source}"))?
    };
    let request = InvocationRequest::from_json(&body).context("parsing invocation request")?;
    Ok(ctx.api.invoke(event, &request)?)
}

fn handle_doctor(
    ctx: &AppContext,
    mount_point: Option<PathBuf>,
    max_age_mins: Option<u64>,
) -> Result<CmdResult> {
    let max_age = max_age_mins
        .map(|mins| Duration::from_secs(mins.saturating_mul(60)))
        .unwrap_or_else(|| ctx.config.temp_max_age());
    Ok(ctx.api.doctor(&ctx.mount_point(mount_point), max_age)?)
}

fn handle_config(ctx: &AppContext) -> Result<ExitCode> {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&ctx.config)?);
    } else {
        print!("{}", toml::to_string_pretty(&ctx.config)?);
    }
    Ok(ExitCode::SUCCESS)
}
