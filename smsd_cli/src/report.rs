//! Rendering of a [`BatchReport`] in the formats the CLI offers.

use std::io::Write;

use serde_json::json;
use smsd_common::Config;
use smsd_driver::BatchReport;

use crate::args::FormatArg;

/// Writes `report` to `out` in `format`.
pub fn render(
    report: &BatchReport,
    config: &Config,
    format: FormatArg,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        FormatArg::Text => render_text(report, out)?,
        FormatArg::Csv => render_csv(report, out)?,
        FormatArg::Json => render_json(report, config, out)?,
    }
    Ok(())
}

fn render_text(report: &BatchReport, out: &mut impl Write) -> std::io::Result<()> {
    for result in &report.results {
        match &result.outcome {
            Ok(fragments) => {
                for fragment in fragments {
                    writeln!(out, "Smile of substructure is : {fragment}")?;
                }
            }
            Err(e) => writeln!(out, "{}: {e}", e.kind())?,
        }
    }
    writeln!(out, "Done")
}

fn render_csv(report: &BatchReport, out: &mut impl Write) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["left", "right", "status", "fragment"])?;

    for result in &report.results {
        let left = result.left.to_string();
        let right = result.right.to_string();
        match &result.outcome {
            Ok(fragments) if fragments.is_empty() => {
                writer.write_record([left.as_str(), right.as_str(), "empty", ""])?;
            }
            Ok(fragments) => {
                for fragment in fragments {
                    writer.write_record([left.as_str(), right.as_str(), "ok", fragment.as_str()])?;
                }
            }
            Err(e) => {
                let kind = e.kind().to_string();
                let message = e.to_string();
                writer.write_record([
                    left.as_str(),
                    right.as_str(),
                    kind.as_str(),
                    message.as_str(),
                ])?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

fn render_json(
    report: &BatchReport,
    config: &Config,
    out: &mut impl Write,
) -> Result<(), serde_json::Error> {
    let results: Vec<_> = report
        .results
        .iter()
        .map(|r| match &r.outcome {
            Ok(fragments) => json!({
                "left": r.left,
                "right": r.right,
                "fragments": fragments,
            }),
            Err(e) => json!({
                "left": r.left,
                "right": r.right,
                "failure": e.kind(),
                "error": e.to_string(),
            }),
        })
        .collect();

    let document = json!({
        "config": config,
        "summary": report.summary,
        "results": results,
    });
    serde_json::to_writer_pretty(&mut *out, &document)?;
    writeln!(out).map_err(serde_json::Error::io)
}

#[cfg(test)]
mod tests {
    use smsd_driver::{PairError, PairResult};
    use smsd_subgraph::OracleError;

    use super::*;

    fn sample() -> BatchReport {
        BatchReport::new(vec![
            PairResult::fragments(0, 1, vec!["CCO".into()]),
            PairResult::fragments(0, 2, vec![]),
            PairResult::failed(PairError::Oracle {
                left: 1,
                right: 2,
                source: OracleError::search("boom"),
            }),
        ])
    }

    fn rendered(format: FormatArg) -> String {
        let mut out = Vec::new();
        render(&sample(), &Config::default(), format, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_text_format() {
        assert_eq!(
            rendered(FormatArg::Text),
            "Smile of substructure is : CCO\n\
             OracleFailure: pair (1, 2): search failed: boom\n\
             Done\n"
        );
    }

    #[test]
    fn test_csv_format() {
        assert_eq!(
            rendered(FormatArg::Csv),
            "left,right,status,fragment\n\
             0,1,ok,CCO\n\
             0,2,empty,\n\
             1,2,OracleFailure,\"pair (1, 2): search failed: boom\"\n"
        );
    }

    #[test]
    fn test_json_format() {
        let value: serde_json::Value = serde_json::from_str(&rendered(FormatArg::Json)).unwrap();
        assert_eq!(value["summary"]["submitted"], 3);
        assert_eq!(value["results"][0]["fragments"][0], "CCO");
        assert_eq!(value["results"][2]["failure"], "OracleFailure");
        assert_eq!(value["config"]["strip_hydrogens"], true);
    }
}
