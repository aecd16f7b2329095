use crate::config::{Cli, Command, EstimateArgs, ServeConfig, TrainArgs};
use crate::estimator::pricing::format_yen;
use crate::estimator::{Estimator, TierFactors};
use crate::responses::error_response;
use crate::router::handle;
use crate::state::AppState;
use anyhow::Context;
use astra::{Request, Response, Server};
use clap::Parser;

mod config;
mod domain;
mod errors;
mod estimator;
mod geos;
mod model;
mod responses;
mod router;
mod state;
mod templates;
mod training;

#[cfg(test)]
mod tests;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Serve(cfg) => serve(cfg),
        Command::Train(args) => train(args),
        Command::Estimate(args) => estimate(args),
    }
}

fn serve(cfg: ServeConfig) -> anyhow::Result<()> {
    // A missing or broken artifact does not stop the server; pages report it.
    let state = AppState::load(&cfg.artifact, cfg.tier_factors.as_deref());

    log::info!("Starting server at http://{}", cfg.addr);
    let server = Server::bind(&cfg.addr).max_workers(cfg.workers);

    server
        .serve(move |req, _info| respond(req, &state))
        .context("server ended with error")?;

    log::info!("Server shut down cleanly.");
    Ok(())
}

/// Route one request, rendering handler errors as pages.
fn respond(req: Request, state: &AppState) -> Response {
    let line = format!("{} {}", req.method(), req.uri().path());
    let resp = match handle(req, state) {
        Ok(resp) => resp,
        Err(err) => error_response(err),
    };
    log::debug!("{line} -> {}", resp.status());
    resp
}

fn train(args: TrainArgs) -> anyhow::Result<()> {
    let cfg = args.into_config().context("invalid training options")?;
    let summary = training::run(&cfg).context("training failed")?;

    println!(
        "Trained on {} listings ({} locations, {} columns) from {} file(s); wrote {}",
        summary.listings,
        summary.locations,
        summary.columns,
        summary.report.files_read,
        cfg.output.display()
    );
    if let Some(m) = summary.metrics {
        println!(
            "Hold-out ({} of {} rows scored): MAE {} RMSE {} R² {:.3}",
            m.n_scored,
            m.n_test,
            format_yen(m.mae.round() as i64),
            format_yen(m.rmse.round() as i64),
            m.r2
        );
    }
    Ok(())
}

fn estimate(args: EstimateArgs) -> anyhow::Result<()> {
    let mut estimator = Estimator::load(&args.artifact)
        .with_context(|| format!("cannot load model from {}", args.artifact.display()))?;
    if let Some(path) = &args.tier_factors {
        let factors = TierFactors::load(path).context("cannot load tier factors")?;
        estimator = estimator.with_tier_factors(factors);
    }

    let estimate = estimator.estimate(&args.input())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
        return Ok(());
    }

    println!("{}", estimate.location);
    println!("  estimate   {}", format_yen(estimate.base_price));
    for tier in &estimate.tiers {
        println!("  {:<18} {}", tier.tier.label(), format_yen(tier.price));
    }
    println!("  per m²     {}", format_yen(estimate.unit_price.round() as i64));
    Ok(())
}
