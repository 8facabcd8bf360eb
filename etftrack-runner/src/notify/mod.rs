//! Push notifications.
//!
//! The message is plain text built from the report context; delivery goes
//! through a `Notifier` so the pipeline can be tested without the network.

pub mod line;

pub use line::LineNotifier;

use thiserror::Error;

use crate::reporting::ReportContext;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("LINE channel access token or user ids not configured")]
    MissingCredentials,

    #[error("no recipients configured")]
    NoRecipients,

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("network error sending to {recipient}: {message}")]
    Network { recipient: String, message: String },

    #[error("push to {recipient} rejected with HTTP {status}: {body}")]
    Rejected {
        recipient: String,
        status: u16,
        body: String,
    },
}

/// Delivers a text message to every configured recipient.
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    /// Send `message`; returns the number of recipients reached.
    /// Stops at the first failed recipient.
    fn send(&self, message: &str) -> Result<usize, NotifyError>;
}

/// Text summary pushed for one ticker.
pub fn format_message(ctx: &ReportContext) -> String {
    let s = &ctx.snapshot;
    let mut message = format!(
        "📊 {} Analysis ({})\n\
Close: ${:.2}\n\
Signal: {}\n\n\
📈 Indicators:\n\
• KD: K={:.1}, D={:.1}\n\
• MACD: {:.3}\n\
• RSI: {:.1}\n",
        ctx.code,
        ctx.date,
        ctx.close,
        ctx.decision.label(),
        s.k,
        s.d,
        s.macd,
        s.rsi
    );
    if ctx.is_synthetic() {
        message.push_str("\n⚠ Synthetic sample data, not market prices.\n");
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::DataOrigin;
    use crate::reporting::context::tests::sample_context;

    #[test]
    fn message_layout() {
        let message = format_message(&sample_context());
        assert_eq!(
            message,
            "📊 0050 Analysis (2024-06-28)\n\
Close: $101.50\n\
Signal: Buy (KD oversold crossover)\n\n\
📈 Indicators:\n\
• KD: K=25.0, D=18.0\n\
• MACD: -0.123\n\
• RSI: 44.9\n"
        );
    }

    #[test]
    fn synthetic_message_is_flagged() {
        let mut ctx = sample_context();
        ctx.origin = DataOrigin::Synthetic;
        assert!(format_message(&ctx).contains("Synthetic sample data"));
    }
}
