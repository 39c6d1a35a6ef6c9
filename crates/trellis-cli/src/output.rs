//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::{Color, Colorize};
use serde_json::{json, Value as JsonValue};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use trellis_domain::UpdatedRelationshipResult;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a JSON result.
    ///
    /// Tables are drawn for lists of maps (one row each) and for maps (one
    /// row per key); anything else prints as JSON.
    pub fn format_json(&self, value: &JsonValue) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Quiet => Ok(value.to_string()),
            OutputFormat::Table => match value {
                JsonValue::Array(rows) if !rows.is_empty() && rows.iter().all(JsonValue::is_object) => {
                    Ok(self.rows_table(rows))
                }
                JsonValue::Object(map) if !map.is_empty() => {
                    let mut builder = Builder::default();
                    builder.push_record(["Key", "Value"]);
                    for (key, item) in map {
                        builder.push_record([key.as_str(), cell(item).as_str()]);
                    }
                    Ok(self.finish(builder))
                }
                _ => Ok(serde_json::to_string_pretty(value)?),
            },
        }
    }

    fn rows_table(&self, rows: &[JsonValue]) -> String {
        let mut columns: Vec<&str> = Vec::new();
        for key in rows.iter().filter_map(JsonValue::as_object).flat_map(|row| row.keys()) {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }

        let mut builder = Builder::default();
        builder.push_record(columns.iter().copied());
        for row in rows {
            let cells: Vec<String> = columns
                .iter()
                .map(|column| row.get(*column).map(cell).unwrap_or_default())
                .collect();
            builder.push_record(cells.iter().map(String::as_str));
        }
        self.finish(builder)
    }

    /// Format relationship refactoring results.
    pub fn format_updates(&self, results: &[UpdatedRelationshipResult]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let rows: Vec<JsonValue> = results.iter().map(update_json).collect();
                Ok(serde_json::to_string_pretty(&rows)?)
            }
            OutputFormat::Quiet => Ok(results
                .iter()
                .filter_map(|result| result.output())
                .map(|rel| rel.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if results.is_empty() {
                    return Ok(self.paint("No relationships updated.", Color::Yellow));
                }

                let mut builder = Builder::default();
                builder.push_record(["Input", "Output", "Type", "Error"]);
                for result in results {
                    let (output, rel_type) = match result.output() {
                        Some(rel) => (rel.id.to_string(), rel.rel_type.clone()),
                        None => (String::new(), String::new()),
                    };
                    let error = result
                        .error()
                        .map(|message| self.paint(message, Color::Red))
                        .unwrap_or_default();
                    let input = result.input().to_string();
                    builder.push_record([input.as_str(), output.as_str(), rel_type.as_str(), error.as_str()]);
                }
                Ok(self.finish(builder))
            }
        }
    }

    fn finish(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.paint(&format!("✓ {}", message), Color::Green)
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.paint(&format!("⚠ {}", message), Color::Yellow)
    }

    /// Colorize text if color is enabled.
    fn paint(&self, text: &str, color: Color) -> String {
        if self.color_enabled {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }
}

fn cell(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn update_json(result: &UpdatedRelationshipResult) -> JsonValue {
    let output = result.output().map(|rel| {
        json!({
            "id": rel.id.value(),
            "elementId": rel.element_id,
            "type": rel.rel_type,
            "start": rel.start.value(),
            "end": rel.end.value(),
        })
    });
    json!({
        "input": result.input().value(),
        "output": output,
        "error": result.error(),
    })
}
