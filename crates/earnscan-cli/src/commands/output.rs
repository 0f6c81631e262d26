//! Rendering of analysis reports as JSON, CSV or a text summary.

use console::{style, StyledObject};

use earnscan_core::{AnalysisReport, ConfidenceLevel, ManagementTone};

/// Output format for reports.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Columns of the CSV export.
pub const CSV_HEADER: [&str; 8] = [
    "filename",
    "document_type",
    "management_tone",
    "confidence_level",
    "revenue_guidance",
    "margin_guidance",
    "capex_guidance",
    "capacity_utilization",
];

pub fn format_report(report: &AnalysisReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => format_csv(std::slice::from_ref(report)),
        OutputFormat::Text => Ok(format_text(report)),
    }
}

/// One CSV row per report. Failed reports keep only their file name.
pub fn csv_row(report: &AnalysisReport) -> [String; 8] {
    match report.record() {
        Some(record) => [
            report.filename.clone(),
            record.document_type.to_string(),
            record.management_tone.to_string(),
            record.confidence_level.to_string(),
            record.forward_guidance.revenue.clone(),
            record.forward_guidance.margin.clone(),
            record.forward_guidance.capex.clone(),
            record.capacity_utilization.clone(),
        ],
        None => [
            report.filename.clone(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
        ],
    }
}

pub fn format_csv(reports: &[AnalysisReport]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;
    for report in reports {
        wtr.write_record(csv_row(report))?;
    }
    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn tone_style(tone: &ManagementTone) -> StyledObject<String> {
    let styled = style(tone.to_string());
    match tone {
        ManagementTone::Optimistic => styled.green(),
        ManagementTone::Cautious => styled.yellow(),
        ManagementTone::Pessimistic => styled.red(),
        _ => styled.dim(),
    }
}

fn confidence_style(level: &ConfidenceLevel) -> StyledObject<String> {
    let styled = style(level.to_string());
    match level {
        ConfidenceLevel::High => styled.green(),
        ConfidenceLevel::Medium => styled.yellow(),
        ConfidenceLevel::Low => styled.red(),
        ConfidenceLevel::Other(_) => styled.dim(),
    }
}

fn push_list(output: &mut String, title: &str, items: &[String]) {
    output.push_str(&format!("{}:\n", title));
    if items.is_empty() {
        output.push_str("  (none)\n");
    }
    for item in items {
        output.push_str(&format!("  - {}\n", item));
    }
    output.push('\n');
}

pub fn format_text(report: &AnalysisReport) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n\n", style(&report.filename).bold()));

    let record = match (report.record(), report.error()) {
        (Some(record), _) => record,
        (None, Some(error)) => {
            output.push_str(&format!(
                "{} {} ({})\n",
                style("Error processing file:").red(),
                error.detail,
                error.kind
            ));
            return output;
        }
        (None, None) => return output,
    };

    if record.is_unsupported() {
        output.push_str(&format!(
            "{}\n\n",
            style("⚠ Unsupported document - not an earnings transcript").yellow()
        ));
    }

    output.push_str(&format!("Document type:   {}\n", record.document_type));
    output.push_str(&format!(
        "Management tone: {}\n",
        tone_style(&record.management_tone)
    ));
    output.push_str(&format!(
        "Confidence:      {}\n",
        confidence_style(&record.confidence_level)
    ));
    output.push_str(&format!("Reasoning:       {}\n", record.confidence_reasoning));
    output.push('\n');

    push_list(&mut output, "Key positives", &record.key_positives);
    push_list(&mut output, "Key concerns", &record.key_concerns);

    let guidance = &record.forward_guidance;
    output.push_str("Forward guidance:\n");
    output.push_str(&format!("  Revenue: {}\n", guidance.revenue));
    output.push_str(&format!("  Margin:  {}\n", guidance.margin));
    output.push_str(&format!("  Capex:   {}\n", guidance.capex));
    output.push('\n');

    output.push_str(&format!(
        "Capacity utilization: {}\n\n",
        record.capacity_utilization
    ));

    push_list(&mut output, "Growth initiatives", &record.growth_initiatives);

    output
}
