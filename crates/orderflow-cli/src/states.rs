//! # States Subcommand
//!
//! Prints the order lifecycle's transition table.

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use orderflow_state::{Lifecycle, Order, OrderState, StateMachine};

use crate::OutputFormat;

/// Arguments for the states subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct StatesArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct Edge {
    from: OrderState,
    to: OrderState,
}

/// Render the transition table.
pub fn render(format: OutputFormat) -> anyhow::Result<String> {
    let machine = StateMachine::<Order>::new();
    match format {
        OutputFormat::Json => {
            let edges: Vec<Edge> = machine
                .transitions()
                .iter()
                .map(|&(from, to)| Edge { from, to })
                .collect();
            serde_json::to_string_pretty(&edges).context("serializing transition table")
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for state in OrderState::ALL {
                match state.successor() {
                    Some(next) => out.push_str(&format!("{state} -> {next}\n")),
                    None => out.push_str(&format!("{state} (terminal)\n")),
                }
            }
            Ok(out)
        }
    }
}
