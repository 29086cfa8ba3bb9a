//! Console sink: alerts as a framed banner on stdout, routine messages
//! through `tracing`.

use std::io::{self, Write};

use super::{NotifyError, Notifier, Priority};
use crate::domain::{FeatureVector, TradeDecision};

const RULE_WIDTH: usize = 60;

/// Body of a trade alert: time, trade, confidence, market context, reasons.
pub fn alert_message(decision: &TradeDecision, features: &FeatureVector) -> String {
    let mut lines = vec![
        format!(
            "SPX 0-DTE ALERT @ {}",
            features.timestamp.format("%Y-%m-%d %H:%M:%S")
        ),
        format!("Trade Type     : {}", decision.trade_label()),
        format!("Confidence     : {:.2}", decision.confidence),
        format!("SPX Price      : {:.2}", features.price),
        format!("Expected Move  : {:.2}", features.expected_move),
        format!(
            "OTM Ratio      : {}",
            features
                .premium_ratio
                .map_or_else(|| "n/a".to_string(), |r| format!("{r:.2}"))
        ),
    ];
    if !decision.reasons.is_empty() {
        lines.push("Reasons:".into());
        lines.extend(decision.reasons.iter().map(|r| format!("  - {r}")));
    }
    if !decision.risk_flags.is_empty() {
        lines.push("Risk flags:".into());
        lines.extend(decision.risk_flags.iter().map(|r| format!("  - {r}")));
    }
    lines.join("\n")
}

pub struct ConsoleNotifier<W: Write + Send = io::Stdout> {
    out: W,
}

impl ConsoleNotifier<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write + Send> ConsoleNotifier<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Notifier for ConsoleNotifier<W> {
    fn notify(&mut self, priority: Priority, message: &str) -> Result<(), NotifyError> {
        match priority {
            Priority::Alert => {
                let rule = "=".repeat(RULE_WIDTH);
                writeln!(self.out, "\n{rule}\n{message}\n{rule}\n")
                    .and_then(|()| self.out.flush())
                    .map_err(|e| NotifyError::Transport(e.to_string()))
            }
            Priority::Log => {
                tracing::info!(target: "spxwatch::notify", "{message}");
                Ok(())
            }
        }
    }
}
