//! # Run Subcommand
//!
//! Creates one order, attaches the configured observers, applies each email
//! change in order, advances the lifecycle, and reports the outcome.

use std::rc::Rc;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tracing::info;

use orderflow_core::{OrderId, Timestamp};
use orderflow_state::{
    Observer, Order, OrderSnapshot, OrderState, SnapshotRecorder, StateMachine, TracingObserver,
    TransitionRecord,
};

use crate::config::{ObserverKind, OrderflowConfig};
use crate::OutputFormat;

/// Arguments for the run subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Email to set on the order. Repeatable; applied in order.
    #[arg(long = "email")]
    pub emails: Vec<String>,

    /// Number of lifecycle advances to apply after the email changes.
    #[arg(long, default_value_t = 0)]
    pub advance: usize,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// The order that was driven.
    pub order_id: OrderId,
    /// When it was created.
    pub created_at: Timestamp,
    /// Final stage label.
    pub final_state: String,
    /// Final email.
    pub email: Option<String>,
    /// Applied transitions.
    pub transitions: Vec<TransitionRecord<OrderState>>,
    /// Snapshots collected by the recorder, if one was attached.
    pub snapshots: Vec<OrderSnapshot>,
    /// Observers still attached when the run finished.
    pub observers: usize,
}

/// Execute a run against `config`.
pub fn execute(args: &RunArgs, config: &OrderflowConfig) -> anyhow::Result<RunReport> {
    let machine = StateMachine::<Order>::new();
    let mut order = machine.create_initial();

    // Registrations are weak; these handles keep the observers alive.
    let mut attached: Vec<Rc<dyn Observer<OrderSnapshot>>> = Vec::new();
    let mut recorder = None;
    for kind in &config.observers {
        match kind {
            ObserverKind::Tracing => {
                let observer = Rc::new(TracingObserver::new("tracing"));
                order.attach(&observer);
                attached.push(observer);
            }
            ObserverKind::Recorder => {
                let observer = Rc::new(SnapshotRecorder::<OrderSnapshot>::new("recorder"));
                order.attach(&observer);
                recorder = Some(Rc::clone(&observer));
                attached.push(observer);
            }
        }
    }
    info!(order_id = %order.id(), observers = order.observer_count(), "order created");

    let emails = config.initial_email.iter().chain(args.emails.iter());
    for email in emails {
        order
            .change_email(email.as_str())
            .with_context(|| format!("changing email to {email}"))?;
    }

    for _ in 0..args.advance {
        if machine.advance(&mut order).is_none() {
            info!(order_id = %order.id(), state = %order.state(), "order already terminal");
            break;
        }
    }

    let report = RunReport {
        order_id: order.id(),
        created_at: order.created_at(),
        final_state: machine.describe(&order).to_string(),
        email: order.email().map(str::to_string),
        transitions: order.transitions().to_vec(),
        snapshots: recorder.as_ref().map(|r| r.records()).unwrap_or_default(),
        observers: order.observer_count(),
    };

    info!(order_id = %report.order_id, state = %report.final_state, "run complete");
    Ok(report)
}

/// Render a report for stdout.
pub fn render(report: &RunReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("serializing run report")
        }
        OutputFormat::Text => {
            let mut out = format!("{} {}\n", report.order_id, report.final_state);
            if let Some(email) = &report.email {
                out.push_str(&format!("email: {email}\n"));
            }
            for t in &report.transitions {
                out.push_str(&format!("{} {} -> {}\n", t.timestamp, t.from_state, t.to_state));
            }
            for (i, s) in report.snapshots.iter().enumerate() {
                let email = s.email.as_deref().unwrap_or("-");
                out.push_str(&format!("snapshot {}: {} {}\n", i + 1, s.state, email));
            }
            Ok(out)
        }
    }
}
