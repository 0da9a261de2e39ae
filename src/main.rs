// SPDX-License-Identifier: BSD-3-Clause
use std::io::{self, Write};

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use tracing_flame::FlameLayer;
use tracing_subscriber::{fmt, prelude::*};

use andersen::{analysis::oracle, graph::file::GraphFile, layers::RuleTimeLayer, pointer};

mod cli;

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

fn setup_global_subscriber() -> Result<impl Drop> {
    let filter_layer = tracing::level_filters::LevelFilter::TRACE;
    let fmt_layer = fmt::Layer::default().with_writer(io::stderr);
    let (flame_layer, guard) = FlameLayer::with_file("./tracing.folded")
        .context("Couldn't create ./tracing.folded")?;
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(flame_layer)
        .with(RuleTimeLayer::new("pointer_analysis"))
        .init();
    Ok(guard)
}

fn main() -> Result<()> {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    let args = cli::Args::parse();

    let _guard = if args.tracing {
        Some(setup_global_subscriber()?)
    } else {
        None
    };

    let graph_string = std::fs::read_to_string(&args.graph).with_context(|| {
        format!("Couldn't read constraint graph at {}", args.graph.display())
    })?;
    let file: GraphFile =
        serde_json::from_str(&graph_string).context("Couldn't deserialize constraint graph")?;
    let mut graph = file.graph().context("Malformed constraint graph")?;

    let expected = if args.check {
        Some(oracle::analysis(&graph))
    } else {
        None
    };

    let opts = pointer::Options {
        worklist: args.worklist.clone().into(),
        max_steps: args.max_steps,
    };
    let out = pointer::analysis(&mut graph, &opts)?;

    if !args.quiet {
        let mut stdout = io::stdout().lock();
        if args.json {
            serde_json::to_writer_pretty(&mut stdout, &file.named(&out.points_to))?;
            writeln!(stdout)?;
        } else {
            writeln!(stdout, "points_to")?;
            writeln!(stdout, "---------")?;
            file.dump(&out.points_to, &mut stdout)?;
        }
    }

    if args.metrics {
        let mut stdout = io::stdout().lock();
        let m = &out.metrics;
        writeln!(stdout)?;
        writeln!(stdout, "metrics")?;
        writeln!(stdout, "-------")?;
        writeln!(stdout, "worklist: {}", opts.worklist)?;
        writeln!(stdout, "steps: {}", m.steps)?;
        writeln!(stdout, "derived copy edges: {}", m.derived_copy_edges)?;
        writeln!(stdout, "edges: {}", m.edges)?;
        writeln!(stdout, "points-to pairs: {}", m.points_to_pairs)?;
        writeln!(stdout, "pointing nodes: {}", m.pointing_nodes)?;
    }

    if let pointer::Termination::StepLimit { pending } = out.termination {
        tracing::warn!(pending, "stopped before the fixed point, result is partial");
        if !args.allow_partial {
            return Err(anyhow!(
                "Stopped after {} steps with {pending} nodes pending; points-to sets are incomplete",
                out.metrics.steps
            ));
        }
    }

    if let Some(expected) = expected {
        if out.termination.is_complete() && expected != out.points_to {
            return Err(anyhow!("Worklist solver disagrees with the reference solver!"));
        }
    }

    Ok(())
}
