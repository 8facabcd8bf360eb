//! `index.html`: one row per ticker of the run, linking successful reports.

use chrono::NaiveDate;

use super::html::STYLE;
use crate::chart::svg::escape;

#[derive(Debug, Clone, PartialEq)]
pub enum IndexEntry {
    Report {
        code: String,
        name: String,
        close: f64,
        change_pct: f64,
        signal: String,
        /// Report file name, relative to the index.
        file: String,
        synthetic: bool,
    },
    Failed {
        code: String,
        stage: String,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexPage {
    pub date: NaiveDate,
    pub entries: Vec<IndexEntry>,
}

impl IndexPage {
    pub fn render(&self) -> String {
        let mut page = format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>ETF reports {date}</title>\n<style>\n{STYLE}</style>\n</head>\n<body>\n\
<h1>ETF reports</h1>\n<p class=\"sub\">{date}</p>\n<table>\n\
<tr><th>Code</th><th>Name</th><th>Close</th><th>Change</th><th>Signal</th></tr>\n",
            date = self.date
        );

        for entry in &self.entries {
            match entry {
                IndexEntry::Report {
                    code,
                    name,
                    close,
                    change_pct,
                    signal,
                    file,
                    synthetic,
                } => {
                    let class = if *change_pct >= 0.0 { "up" } else { "down" };
                    let tag = if *synthetic { " (synthetic)" } else { "" };
                    page.push_str(&format!(
                        "<tr><th><a href=\"{}\">{}</a></th><td>{}{tag}</td><td>{close:.2}</td>\
<td class=\"{class}\">{change_pct:+.2}%</td><td>{}</td></tr>\n",
                        escape(file),
                        escape(code),
                        escape(name),
                        escape(signal)
                    ));
                }
                IndexEntry::Failed { code, stage, error } => {
                    page.push_str(&format!(
                        "<tr><th>{}</th><td colspan=\"4\" class=\"warning\">failed at {}: {}</td></tr>\n",
                        escape(code),
                        escape(stage),
                        escape(error)
                    ));
                }
            }
        }

        page.push_str("</table>\n</body>\n</html>\n");
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_reports_and_failures() {
        let page = IndexPage {
            date: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
            entries: vec![
                IndexEntry::Report {
                    code: "0050".into(),
                    name: "Yuanta Taiwan Top 50".into(),
                    close: 101.5,
                    change_pct: -0.25,
                    signal: "Hold".into(),
                    file: "0050_2024-06-28.html".into(),
                    synthetic: true,
                },
                IndexEntry::Failed {
                    code: "006208".into(),
                    stage: "fetch".into(),
                    error: "no data <html>".into(),
                },
            ],
        };
        let html = page.render();
        assert!(html.contains("<a href=\"0050_2024-06-28.html\">0050</a>"));
        assert!(html.contains("Yuanta Taiwan Top 50 (synthetic)"));
        assert!(html.contains("class=\"down\">-0.25%"));
        assert!(html.contains("failed at fetch: no data &lt;html&gt;"));
        assert_eq!(html.matches("<tr>").count(), 3);
    }
}
