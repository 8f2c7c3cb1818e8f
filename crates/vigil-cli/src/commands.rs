use anyhow::Context;
use serde::Serialize;
use vigil_core::impls::{FileStatusStore, GcloudInstanceControl};
use vigil_core::ports::{Operation, SystemClock};
use vigil_core::{Config, Launcher, PollPolicy, StatusRecorder, Uptime, UptimeAggregator, YearMonth};

fn recorder(config: &Config) -> StatusRecorder<FileStatusStore, SystemClock> {
    StatusRecorder::new(FileStatusStore::new(&config.store_path), SystemClock)
}

fn launcher(
    config: &Config,
) -> anyhow::Result<Launcher<GcloudInstanceControl, FileStatusStore, SystemClock>> {
    let target = config
        .instance_target()
        .context("project, zone and instance are required to control the instance")?;
    Ok(Launcher::new(GcloudInstanceControl::new(target), recorder(config)))
}

pub async fn operate(
    config: &Config,
    op: Operation,
    wait: bool,
    poll: PollPolicy,
) -> anyhow::Result<()> {
    let launcher = launcher(config)?.with_poll_policy(poll);
    match launcher.operate(op, wait).await? {
        Some(snapshot) => println!("{snapshot}"),
        None => println!("accepted: [{op}]"),
    }
    Ok(())
}

pub async fn status(config: &Config) -> anyhow::Result<()> {
    let snapshot = launcher(config)?.status().await?;
    println!("{snapshot}");
    Ok(())
}

pub async fn record(config: &Config, status: Option<String>) -> anyhow::Result<()> {
    let stored = match status {
        Some(status) => recorder(config).record(status).await?,
        None => launcher(config)?.store_status().await?,
    };
    println!("recorded {} {} at {}", stored.id, stored.status(), stored.time());
    Ok(())
}

#[derive(Serialize)]
struct UptimeReport {
    #[serde(flatten)]
    uptime: Uptime,
    hours: u64,
    minutes: u64,
}

pub async fn uptime(config: &Config, month: Option<&str>, json: bool) -> anyhow::Result<()> {
    let aggregator = UptimeAggregator::new(FileStatusStore::new(&config.store_path), config.utc_offset);
    let month: YearMonth = match month {
        Some(month) => month.parse().with_context(|| format!("invalid --month {month:?}"))?,
        None => aggregator.current_month(&SystemClock),
    };

    let uptime = aggregator.uptime(month).await?;
    if json {
        let report = UptimeReport {
            uptime,
            hours: uptime.hours(),
            minutes: uptime.remainder_minutes(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("calculating uptime of {month}");
        println!("running time: {uptime}");
    }
    Ok(())
}
