//! Terminal rendering of a single detection run.

use errdetect_core::{DetectionResult, StateValue, Step, Technique};

/// Render the verdict header and, unless `quiet`, every step.
pub fn render(technique: &Technique, result: &DetectionResult, quiet: bool) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {} ===\n", technique.to_string().to_uppercase()));
    out.push_str(&format!("Original:    {}\n", result.original_data));
    out.push_str(&format!("Transmitted: {}\n", result.transmitted_data));
    out.push_str(&format!("Received:    {}\n", result.received_data));
    out.push('\n');

    if !quiet {
        for (index, step) in result.trace.iter().enumerate() {
            out.push_str(&render_step(index + 1, step));
        }
        out.push('\n');
    }

    let mark = if result.error_detected { "✗" } else { "✓" };
    out.push_str(&format!("{} {}\n", mark, result.explanation));
    out
}

fn render_step(number: usize, step: &Step) -> String {
    let mut line = format!("{:>3}. {}: {}\n", number, step.title, step.description);
    if !step.state.is_empty() {
        let fields: Vec<String> = step
            .state
            .iter()
            .map(|(key, value)| format!("{}={}", key, render_value(value)))
            .collect();
        line.push_str(&format!("     [{}]\n", fields.join(" ")));
    }
    line
}

fn render_value(value: &StateValue) -> String {
    match value {
        StateValue::Flag(flag) => flag.to_string(),
        StateValue::Number(number) => number.to_string(),
        StateValue::Text(text) => text.clone(),
    }
}

/// Pretty-printed JSON, same shape as the HTTP response.
pub fn render_json(result: &DetectionResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}
