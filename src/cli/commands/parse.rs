//! Parse command implementation
//!
//! Tokenizes and projects one message and prints the result as JSON. Useful
//! for checking which record keys a message produces.

use std::io::{self, Read};

use anyhow::Context;
use tracing::info;

use super::shared::setup_logging;
use crate::app::services::field_projector::FieldProjector;
use crate::app::services::hl7_parser::tokenize;
use crate::cli::args::ParseArgs;

pub fn run_parse(args: ParseArgs) -> anyhow::Result<()> {
    setup_logging(&args.logging);

    let raw = match args.input_path() {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read standard input")?;
            text
        }
    };

    let output = render(&raw, &args)?;
    println!("{}", output);
    Ok(())
}

/// Tokenize (and unless `--tokens`, project) a message into JSON text
pub fn render(raw: &str, args: &ParseArgs) -> anyhow::Result<String> {
    let message = tokenize(raw).context("Failed to tokenize message")?;

    let value = if args.tokens {
        serde_json::to_value(&message)?
    } else {
        let projector = FieldProjector::new(args.get_segments());
        let record = projector
            .project(&message)
            .context("Failed to project message")?;
        info!(keys = record.len(), "Projected message");
        serde_json::to_value(&record)?
    };

    let text = if args.compact {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{LoggingArgs, SegmentList};
    use std::str::FromStr;

    const MESSAGE: &str = "MSH|^~\\&|EPIC|EPICADT\rPID|1||42||Doe^Jane\rNK1||ROE";

    fn parse_args() -> ParseArgs {
        ParseArgs {
            input: None,
            segments: None,
            tokens: false,
            compact: true,
            logging: LoggingArgs::default(),
        }
    }

    #[test]
    fn test_render_projected_record() {
        let output = render(MESSAGE, &parse_args()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["PID_5_0"], "Doe");
        assert_eq!(value["MSH_3_0"], "EPIC");
        assert!(value.get("NK1_1_0").is_none());
    }

    #[test]
    fn test_render_with_segment_filter() {
        let mut args = parse_args();
        args.segments = Some(SegmentList::from_str("PID").unwrap());

        let output = render(MESSAGE, &args).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert!(value.get("MSH_3_0").is_none());
        assert_eq!(value["PID_5_1"], "Jane");
    }

    #[test]
    fn test_render_tokens() {
        let mut args = parse_args();
        args.tokens = true;

        let output = render(MESSAGE, &args).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["segments"][2]["name"], "NK1");
    }

    #[test]
    fn test_render_malformed() {
        let error = render("not hl7", &parse_args()).unwrap_err();
        assert!(format!("{:#}", error).contains("Failed to tokenize"));
    }
}
