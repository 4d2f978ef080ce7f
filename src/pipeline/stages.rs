//! The three stages of a video: decode, acquire a cutlist, cut.

use super::context::RunContext;
use super::gate::{DecodeReport, JoinGate};
use crate::cutlist;
use crate::progress::ProgressHandle;
use gool_av::actions::{cut_command, decode_command, SplitSpec};
use gool_av::{write_diagnostics, ToolCommand, ToolOutput};
use gool_common::paths::remove_superseded;
use gool_common::{CutSpec, Item, ItemResult, Stage, VideoStatus};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Interval and step of the cutlist progress bar, which has no real progress to show.
const ACQUIRE_TICK: Duration = Duration::from_millis(500);
const ACQUIRE_STEP: u8 = 5;

/// Decode an encoded video. Videos past `Raw` are reported as they are.
pub async fn decode(ctx: &RunContext, item: &Item) -> DecodeReport {
    if item.status != VideoStatus::Raw {
        return DecodeReport {
            status: item.status,
            path: item.path.clone(),
            failure: None,
        };
    }

    let progress = ctx.progress.handle(&item.key, Stage::Decode);
    let mut report = DecodeReport {
        status: item.status,
        path: item.path.clone(),
        failure: None,
    };

    match run_decoder(ctx, item, &mut report.path, &progress).await {
        Ok(decoded) => {
            tracing::info!("Decoded {}", item.key);
            if ctx.cleanup {
                remove_superseded(&report.path);
            }
            report.status = VideoStatus::Decoded;
            report.path = decoded;
            progress.finish();
        }
        Err(reason) => {
            tracing::error!("Decoding {} failed: {}", item.key, reason);
            report.failure = Some(reason);
            progress.abandon();
        }
    }

    report
}

async fn run_decoder(
    ctx: &RunContext,
    item: &Item,
    path: &mut PathBuf,
    progress: &ProgressHandle,
) -> Result<PathBuf, String> {
    *path = prepare(ctx, &item.key, item.status, path, Stage::Decode)?;

    if !ctx.credentials.is_complete() {
        return Err("no OTR credentials configured".to_string());
    }
    let output = ctx
        .dirs
        .decoded_output(path)
        .ok_or_else(|| format!("cannot derive decoded name of {}", path.display()))?;

    let cmd = decode_command(&ctx.decoder, &ctx.credentials, path, &ctx.dirs.decoded);
    run_tool(ctx, &item.key, Stage::Decode, &cmd, progress).await?;

    Ok(output)
}

/// Fetch and select a cutlist. Never touches the video's status.
pub async fn acquire(ctx: &RunContext, item: &Item) -> Result<CutSpec, String> {
    let progress = ctx.progress.handle(&item.key, Stage::Acquire);

    let fetch = cutlist::acquire(ctx.cutlists.as_ref(), item);
    tokio::pin!(fetch);
    let mut ticker = tokio::time::interval(ACQUIRE_TICK);
    ticker.tick().await;

    let spec = loop {
        tokio::select! {
            spec = &mut fetch => break spec,
            _ = ticker.tick() => progress.nudge(ACQUIRE_STEP),
        }
    };

    match spec {
        Some(spec) => {
            progress.finish();
            Ok(spec)
        }
        None => {
            progress.abandon();
            Err("no usable cutlist".to_string())
        }
    }
}

/// Cut a video once both predecessors have reported through `gate`.
///
/// Skipped if either predecessor failed.
pub async fn apply(ctx: &RunContext, mut item: Item, gate: JoinGate) -> Item {
    let joined = gate.wait().await;

    match joined.decode {
        Some(report) => {
            item.status = report.status;
            item.path = report.path;
            if let Some(reason) = report.failure {
                item.result = ItemResult::Error(reason);
            }
        }
        None => item.result = ItemResult::Error("decoding ended without result".to_string()),
    }

    match joined.acquire {
        Some(Ok(spec)) => item.cut_spec = Some(spec),
        Some(Err(reason)) => fail_once(&mut item, reason),
        None => fail_once(
            &mut item,
            "cutlist acquisition ended without result".to_string(),
        ),
    }

    if item.result.is_error() {
        tracing::debug!("Not cutting {}", item.key);
        return item;
    }

    let progress = ctx.progress.handle(&item.key, Stage::Apply);
    match run_cutter(ctx, &mut item, &progress).await {
        Ok(output) => {
            tracing::info!("Cut {}", item.key);
            item.status = VideoStatus::Cut;
            item.path = output;
            item.result = ItemResult::Ok;
            progress.finish();
        }
        Err(reason) => {
            tracing::error!("Cutting {} failed: {}", item.key, reason);
            item.result = ItemResult::Error(reason);
            progress.abandon();
        }
    }

    item
}

fn fail_once(item: &mut Item, reason: String) {
    if !item.result.is_error() {
        item.result = ItemResult::Error(reason);
    }
}

async fn run_cutter(
    ctx: &RunContext,
    item: &mut Item,
    progress: &ProgressHandle,
) -> Result<PathBuf, String> {
    let spec = item
        .cut_spec
        .as_ref()
        .filter(|spec| spec.is_usable())
        .ok_or_else(|| "no usable cutlist attached".to_string())?;
    let split = SplitSpec::from_cut_spec(spec)
        .map_err(|e| gool_common::Error::from(e).to_string())?;

    item.path = prepare(ctx, &item.key, item.status, &item.path, Stage::Apply)?;
    let output = ctx.dirs.cut_output(&item.key);

    let cmd = cut_command(&ctx.mkvmerge, &item.path, &output, &split);
    run_tool(ctx, &item.key, Stage::Apply, &cmd, progress).await?;

    if ctx.cleanup {
        remove_superseded(&item.path);
    }
    Ok(output)
}

/// Move the video into its status directory and drop diagnostics of an earlier run.
fn prepare(
    ctx: &RunContext,
    key: &str,
    status: VideoStatus,
    path: &Path,
    stage: Stage,
) -> Result<PathBuf, String> {
    let path = ctx
        .dirs
        .relocate(path, status)
        .map_err(|e| format!("cannot move {}: {}", path.display(), e))?;

    if let Some(error_file) = ctx.dirs.error_file(key, stage) {
        if error_file.exists() {
            remove_superseded(&error_file);
        }
    }

    Ok(path)
}

/// Run a tool and persist its stderr if it fails.
async fn run_tool(
    ctx: &RunContext,
    key: &str,
    stage: Stage,
    cmd: &ToolCommand,
    progress: &ProgressHandle,
) -> Result<ToolOutput, String> {
    let output = ctx
        .tools
        .invoke(cmd, &|percent| progress.set(percent))
        .await
        .map_err(|e| gool_common::Error::from(e).to_string())?;

    if output.success {
        return Ok(output);
    }

    if let Some(error_file) = ctx.dirs.error_file(key, stage) {
        if let Err(e) = write_diagnostics(&error_file, &output.stderr) {
            tracing::error!("Cannot write {:?}: {}", error_file, e);
        }
    }
    Err(gool_common::Error::tool(cmd.program_name(), output.failure_message()).to_string())
}
