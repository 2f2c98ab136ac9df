// Aggregation & Reporting Service
// Turns per-block classifications into the verdict, summary and certificate

use crate::models::{
    BlockReport, ChunkLabel, ClassificationResult, ScanOptions, ScanReport, ScanStatus, Verdict,
};
use thiserror::Error;
use uuid::Uuid;

/// Name printed in the certificate header.
pub const TOOL_NAME: &str = "EduCheck IA";

const CERTIFICATE_SEPARATOR: &str = "--------------------------";

/// A scan that produced zero blocks has nothing to aggregate; surfaced as
/// its own error instead of a division by zero.
#[derive(Error, Debug)]
#[error("document produced no text blocks to classify")]
pub struct EmptyDocumentError;

/// Aggregate the ordered block labels into the document verdict.
/// `ai_score` is the share of machine-generated blocks as a percentage;
/// `human_score` is its exact complement, so the two always sum to 100.
pub fn compute_verdict(
    results: &[ClassificationResult],
    review_threshold: f64,
) -> Result<Verdict, EmptyDocumentError> {
    if results.is_empty() {
        return Err(EmptyDocumentError);
    }

    let machine = results
        .iter()
        .filter(|r| r.label == ChunkLabel::MachineGenerated)
        .count();
    let ai_score = (machine as f64 / results.len() as f64) * 100.0;
    let human_score = 100.0 - ai_score;

    // The threshold itself already needs review: original iff strictly below.
    let status = if ai_score < review_threshold {
        ScanStatus::Original
    } else {
        ScanStatus::NeedsReview
    };

    Ok(Verdict {
        ai_score,
        human_score,
        status,
    })
}

/// Assemble the structured summary: verdict plus the per-block
/// (index, label, confidence) list in block order.
pub fn build_report(
    document_name: &str,
    results: &[ClassificationResult],
    options: &ScanOptions,
) -> Result<ScanReport, EmptyDocumentError> {
    let verdict = compute_verdict(results, options.review_threshold)?;

    let blocks = results
        .iter()
        .enumerate()
        .map(|(i, r)| BlockReport {
            index: i as i32,
            label: r.label,
            raw_label: r.raw_label.clone(),
            confidence: r.confidence,
        })
        .collect();

    Ok(ScanReport {
        request_id: Uuid::new_v4().to_string(),
        document: document_name.to_string(),
        human_score: verdict.human_score,
        ai_score: verdict.ai_score,
        status: verdict.status,
        blocks,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Render the downloadable plain-text certificate. The layout is part of
/// the external contract and is reproduced byte for byte: header, document
/// name, originality with one decimal, separator, then one line per block
/// with the provider's literal label and the confidence as a two-decimal
/// percentage. Every line is newline-terminated.
pub fn render_certificate(report: &ScanReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("AUDITORÍA {}\n", TOOL_NAME));
    out.push_str(&format!("Documento: {}\n", report.document));
    out.push_str(&format!("Originalidad: {:.1}%\n", report.human_score));
    out.push_str(CERTIFICATE_SEPARATOR);
    out.push('\n');
    for block in &report.blocks {
        out.push_str(&format!(
            "Bloque {}: {} ({:.2}%)\n",
            block.index + 1,
            block.raw_label,
            block.confidence * 100.0
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(confidence: f64) -> ClassificationResult {
        ClassificationResult {
            label: ChunkLabel::MachineGenerated,
            raw_label: "Fake".to_string(),
            confidence,
        }
    }

    fn human(confidence: f64) -> ClassificationResult {
        ClassificationResult {
            label: ChunkLabel::HumanAuthored,
            raw_label: "Real".to_string(),
            confidence,
        }
    }

    #[test]
    fn test_empty_results_are_a_distinct_error() {
        assert!(compute_verdict(&[], 25.0).is_err());
    }

    #[test]
    fn test_scores_sum_to_exactly_100() {
        let results = vec![machine(0.9), human(0.8), human(0.7)];
        let verdict = compute_verdict(&results, 25.0).unwrap();
        assert_eq!(verdict.ai_score + verdict.human_score, 100.0);
    }

    #[test]
    fn test_all_machine_blocks() {
        // 1200-char document: two blocks, both machine-generated.
        let results = vec![machine(0.99), machine(0.97)];
        let verdict = compute_verdict(&results, 25.0).unwrap();
        assert_eq!(verdict.ai_score, 100.0);
        assert_eq!(verdict.human_score, 0.0);
        assert_eq!(verdict.status, ScanStatus::NeedsReview);
    }

    #[test]
    fn test_single_human_block() {
        let results = vec![human(0.97)];
        let verdict = compute_verdict(&results, 25.0).unwrap();
        assert_eq!(verdict.ai_score, 0.0);
        assert_eq!(verdict.human_score, 100.0);
        assert_eq!(verdict.status, ScanStatus::Original);
    }

    #[test]
    fn test_threshold_boundary_needs_review() {
        // 1 of 4 machine blocks puts ai_score exactly on the threshold.
        let results = vec![machine(0.9), human(0.9), human(0.9), human(0.9)];
        let verdict = compute_verdict(&results, 25.0).unwrap();
        assert_eq!(verdict.ai_score, 25.0);
        assert_eq!(verdict.status, ScanStatus::NeedsReview);
    }

    #[test]
    fn test_just_below_threshold_is_original() {
        // 1 of 5 machine blocks: 20%.
        let results = vec![machine(0.9), human(0.9), human(0.9), human(0.9), human(0.9)];
        let verdict = compute_verdict(&results, 25.0).unwrap();
        assert_eq!(verdict.ai_score, 20.0);
        assert_eq!(verdict.status, ScanStatus::Original);
    }

    #[test]
    fn test_report_preserves_block_order() {
        let results = vec![machine(0.99), human(0.88), machine(0.77)];
        let report = build_report("tesis.docx", &results, &ScanOptions::default()).unwrap();
        assert_eq!(report.document, "tesis.docx");
        assert_eq!(report.blocks.len(), 3);
        let indices: Vec<i32> = report.blocks.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(report.blocks[1].raw_label, "Real");
    }

    #[test]
    fn test_certificate_matches_template_exactly() {
        let results = vec![human(0.97)];
        let report = build_report("essay.txt", &results, &ScanOptions::default()).unwrap();
        let certificate = render_certificate(&report);
        assert_eq!(
            certificate,
            "AUDITORÍA EduCheck IA\n\
             Documento: essay.txt\n\
             Originalidad: 100.0%\n\
             --------------------------\n\
             Bloque 1: Real (97.00%)\n"
        );
    }

    #[test]
    fn test_certificate_lists_every_block() {
        let results: Vec<ClassificationResult> =
            (0..15).map(|i| if i % 2 == 0 { machine(0.9) } else { human(0.9) }).collect();
        let report = build_report("paper.pdf", &results, &ScanOptions::default()).unwrap();
        let certificate = render_certificate(&report);
        assert_eq!(certificate.matches("Bloque ").count(), 15);
        assert!(certificate.contains("Bloque 15: "));
        assert!(certificate.ends_with('\n'));
    }

    #[test]
    fn test_certificate_confidence_two_decimals() {
        let results = vec![machine(0.9987)];
        let report = build_report("a.txt", &results, &ScanOptions::default()).unwrap();
        let certificate = render_certificate(&report);
        assert!(certificate.contains("Bloque 1: Fake (99.87%)"));
    }

    #[test]
    fn test_custom_threshold_is_respected() {
        // 50% machine with a lenient threshold of 60 stays original.
        let results = vec![machine(0.9), human(0.9)];
        let verdict = compute_verdict(&results, 60.0).unwrap();
        assert_eq!(verdict.ai_score, 50.0);
        assert_eq!(verdict.status, ScanStatus::Original);
    }
}
