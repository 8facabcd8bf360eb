//! HTML report generator.

use etftrack_core::signal::Signal;

use super::context::ReportContext;
use crate::chart::svg::escape;

pub(crate) const STYLE: &str = "\
body { font-family: sans-serif; max-width: 1240px; margin: 24px auto; color: #131722; }
h1 { margin-bottom: 4px; }
.sub { color: #787b86; margin-top: 0; }
table { border-collapse: collapse; margin: 12px 0; }
td, th { border: 1px solid #e0e3eb; padding: 6px 12px; text-align: right; }
th { background: #f0f3fa; text-align: left; }
.up { color: #F23645; }
.down { color: #089981; }
.signal { display: inline-block; padding: 8px 16px; border-radius: 6px; font-weight: bold; }
.signal.buy { background: #fde8ea; color: #F23645; }
.signal.sell { background: #e0f4f1; color: #089981; }
.signal.hold { background: #f0f3fa; color: #131722; }
.warning { background: #fff3cd; border: 1px solid #ffc107; padding: 8px 12px; }
img { max-width: 100%; border: 1px solid #e0e3eb; margin: 8px 0; }
";

pub struct HtmlReportGenerator;

impl HtmlReportGenerator {
    pub fn generate(&self, ctx: &ReportContext) -> String {
        let title = format!("{} {} Analysis ({})", escape(&ctx.code), escape(&ctx.name), ctx.date);
        let change_class = if ctx.change >= 0.0 { "up" } else { "down" };
        let signal_class = match ctx.decision.signal {
            Signal::Buy => "buy",
            Signal::Sell => "sell",
            Signal::Hold => "hold",
        };
        let snap = &ctx.snapshot;

        let mut report = format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{title}</title>\n<style>\n{STYLE}</style>\n</head>\n<body>\n\
<h1>{title}</h1>\n<p class=\"sub\">Data source: {}</p>\n",
            escape(&ctx.origin.to_string())
        );

        if ctx.is_synthetic() {
            report.push_str(
                "<p class=\"warning\">Synthetic sample data: these prices are generated, \
not market data. Do not trade on this report.</p>\n",
            );
        }

        report.push_str(&format!(
            "\n<h2>Signal</h2>\n<p><span class=\"signal {signal_class}\">{}</span></p>\n",
            escape(&ctx.decision.label())
        ));

        report.push_str(&format!(
            "\n<h2>Price</h2>\n<table>\n\
<tr><th>Close</th><td>{:.2}</td></tr>\n\
<tr><th>Change</th><td class=\"{change_class}\">{:+.2} ({:+.2}%)</td></tr>\n\
<tr><th>Volume</th><td>{}</td></tr>\n</table>\n",
            ctx.close, ctx.change, ctx.change_pct, ctx.volume
        ));

        report.push_str("\n<h2>Indicators</h2>\n<table>\n");
        for (name, value) in [
            ("K", format!("{:.1}", snap.k)),
            ("D", format!("{:.1}", snap.d)),
            ("MACD", format!("{:.3}", snap.macd)),
            ("MACD signal", format!("{:.3}", snap.macd_signal)),
            ("MACD histogram", format!("{:.3}", snap.macd_hist)),
            ("RSI", format!("{:.1}", snap.rsi)),
            ("MA short", format!("{:.2}", snap.ma_short)),
            ("MA long", format!("{:.2}", snap.ma_long)),
        ] {
            report.push_str(&format!("<tr><th>{name}</th><td>{value}</td></tr>\n"));
        }
        report.push_str("</table>\n");

        if let Some(charts) = &ctx.charts {
            report.push_str("\n<h2>Charts</h2>\n");
            for (alt, file) in [
                ("Technical analysis", &charts.technical),
                ("Signal summary", &charts.summary),
            ] {
                report.push_str(&format!(
                    "<img src=\"{}\" alt=\"{alt}\">\n",
                    escape(file)
                ));
            }
        }

        report.push_str(
            "\n<p class=\"sub\">Generated by etftrack. Technical signals are informational only.</p>\n\
</body>\n</html>\n",
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::DataOrigin;
    use crate::reporting::context::tests::sample_context;
    use crate::reporting::ChartLinks;

    #[test]
    fn report_shows_signal_and_indicators() {
        let html = HtmlReportGenerator.generate(&sample_context());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("0050 Yuanta Taiwan Top 50 Analysis (2024-06-28)"));
        assert!(html.contains("class=\"signal buy\">Buy (KD oversold crossover)</span>"));
        assert!(html.contains("<td>101.50</td>"));
        assert!(html.contains("+1.50 (+1.50%)"));
        assert!(html.contains("<tr><th>K</th><td>25.0</td></tr>"));
        assert!(html.contains("<tr><th>MACD</th><td>-0.123</td></tr>"));
        assert!(html.contains("Yahoo Finance (0050.TW)"));
        assert!(!html.contains("<img"));
        assert!(!html.contains("Synthetic sample data"));
    }

    #[test]
    fn charts_are_linked_relatively() {
        let mut ctx = sample_context();
        ctx.charts = Some(ChartLinks {
            technical: "0050_technical_2024-06-28.svg".into(),
            summary: "0050_summary_2024-06-28.svg".into(),
        });
        let html = HtmlReportGenerator.generate(&ctx);
        assert!(html.contains("<img src=\"0050_technical_2024-06-28.svg\""));
        assert!(html.contains("<img src=\"0050_summary_2024-06-28.svg\""));
    }

    #[test]
    fn synthetic_reports_are_flagged() {
        let mut ctx = sample_context();
        ctx.origin = DataOrigin::Synthetic;
        let html = HtmlReportGenerator.generate(&ctx);
        assert!(html.contains("class=\"warning\""));
        assert!(html.contains("synthetic sample data"));
    }

    #[test]
    fn names_are_escaped() {
        let mut ctx = sample_context();
        ctx.name = "A&B <ETF>".into();
        let html = HtmlReportGenerator.generate(&ctx);
        assert!(html.contains("A&amp;B &lt;ETF&gt;"));
        assert!(!html.contains("<ETF>"));
    }
}
