use kte_core::model::ExtractionResult;
use kte_core::normalize::NormalizedText;

pub fn print_results(results: &[(String, ExtractionResult)]) {
    let multi = results.len() > 1;
    for (i, (source, result)) in results.iter().enumerate() {
        if multi {
            if i > 0 {
                println!();
            }
            println!("--- {source} ---\n");
        }
        println!("{}", format_result(result));
    }
}

pub fn format_result(result: &ExtractionResult) -> String {
    let summary = &result.metadata.summary;
    let mut lines = vec![
        "Keyword Extraction Results".to_string(),
        "=".repeat(50),
        String::new(),
        format!("Extraction Method: {}", result.extraction_method),
        format!("Timestamp: {}", result.timestamp.to_rfc3339()),
        format!("Total Keywords: {}", summary.total_keywords),
        format!(
            "Phrases: {}  Single Words: {}  From Headers: {}",
            summary.phrases_count, summary.single_words_count, summary.header_keywords_count
        ),
        String::new(),
        format!(
            "Processing Time: {:.2} seconds",
            result.metadata.processing_time
        ),
        String::new(),
        format!("Average Relevance Score: {:.3}", summary.average_relevance),
    ];
    if let (Some(max), Some(min)) = (summary.max_relevance, summary.min_relevance) {
        lines.push(format!("Relevance Range: {min:.3} - {max:.3}"));
    }
    lines.push(String::new());
    lines.push("Extracted Keywords:".to_string());
    lines.push("-".repeat(30));
    lines.extend(
        result
            .keywords
            .iter()
            .enumerate()
            .map(|(i, keyword)| format!("{:2}. {keyword}", i + 1)),
    );
    lines.join("\n")
}

pub fn print_headers(doc: &NormalizedText) {
    if doc.headers.is_empty() {
        println!("No headers detected.");
        return;
    }
    for header in &doc.headers {
        println!("  H{}  [{}]  {}", header.level, header.kind, header.text);
    }
}
