use anyhow::{bail, Context};
use educheck_lib::api::scan_document;
use educheck_lib::models::{ChunkLabel, Document, ScanOptions};
use educheck_lib::services::classifier::{shared_classifier, ClassifierClient};
use educheck_lib::services::extractor::mime_for_extension;
use educheck_lib::services::ConfigStore;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage:\n  cargo run --bin scan_doc -- <path.pdf|path.docx|path.txt> [--mime <type>] [--endpoint <url>] [--token <key>] [--chunk-size <n>] [--max-chunks <n>] [--cert <txt_path>] [--out <json_path>] [--no-color]\n\nNotes:\n  - The declared type is inferred from the extension; use --mime for anything else.\n  - The certificate is written to Certificado_<name>.txt unless --cert is given.\n  - EDUCHECK_CLASSIFIER_URL / EDUCHECK_API_TOKEN override the endpoint and token."
        );
        return Ok(());
    }

    educheck_lib::init_logging();

    let path = args[1].clone();
    let mime_override = parse_arg_value(&args, "--mime");
    let endpoint = parse_arg_value(&args, "--endpoint");
    let token = parse_arg_value(&args, "--token");
    let chunk_size: Option<usize> =
        parse_arg_value(&args, "--chunk-size").and_then(|s| s.parse().ok());
    let max_chunks: Option<usize> =
        parse_arg_value(&args, "--max-chunks").and_then(|s| s.parse().ok());
    let cert_path = parse_arg_value(&args, "--cert");
    let out_path = parse_arg_value(&args, "--out");
    let no_color = has_flag(&args, "--no-color");

    let bytes = std::fs::read(&path).with_context(|| format!("read file failed: {}", path))?;
    let display_name = std::path::Path::new(&path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.clone());

    let mime = match mime_override {
        Some(m) => m,
        None => {
            let ext = std::path::Path::new(&path)
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default();
            match mime_for_extension(&ext) {
                Some(m) => m.to_string(),
                None => bail!(
                    "cannot infer upload type from extension '{}'; pass --mime explicitly",
                    ext
                ),
            }
        }
    };

    // Config file defaults, overridden by CLI flags.
    let config = ConfigStore::default_config_dir()
        .map(|dir| ConfigStore::new(dir).load())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or_default();
    let mut options: ScanOptions = config.scan.clone();
    if let Some(n) = chunk_size {
        options.chunk_size_chars = n;
    }
    if let Some(n) = max_chunks {
        options.max_chunks = n;
    }

    let endpoint = endpoint.or(config.classifier.base_url.clone());
    let custom_classifier;
    let classifier: &ClassifierClient = match (endpoint, token) {
        (None, None) => shared_classifier(),
        (url, tok) => {
            let mut client = match url {
                Some(u) => ClassifierClient::with_base_url(u),
                None => ClassifierClient::new(),
            };
            if let Some(t) = tok {
                client = client.with_api_token(t);
            }
            custom_classifier = client;
            &custom_classifier
        }
    };

    let document = Document::new(display_name.clone(), mime, bytes);
    let outcome = scan_document(&document, &options, classifier)
        .await
        .with_context(|| format!("scan failed for {}", display_name))?;
    let report = &outcome.report;

    println!("Documento: {}", display_name);
    println!("Autoría Humana: {:.1}%", report.human_score);
    println!("Probabilidad IA: {:.1}%", report.ai_score);
    println!("Estado del Documento: {}", report.status.display_tag());
    println!();
    println!("Análisis de Segmentos");
    for block in &report.blocks {
        let color = match block.label {
            ChunkLabel::MachineGenerated => RED,
            ChunkLabel::HumanAuthored => GREEN,
        };
        let (color, reset) = if no_color { ("", "") } else { (color, RESET) };
        println!(
            "Bloque {}: {}{}{} ({:.1}%)",
            block.index + 1,
            color,
            block.raw_label,
            reset,
            block.confidence * 100.0
        );
    }

    let cert_path = cert_path.unwrap_or_else(|| format!("Certificado_{}.txt", display_name));
    std::fs::write(&cert_path, &outcome.certificate)
        .with_context(|| format!("write certificate failed: {}", cert_path))?;
    println!();
    println!("Certificado: {}", cert_path);

    if let Some(out_path) = out_path {
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&out_path, json)
            .with_context(|| format!("write report failed: {}", out_path))?;
        println!("Reporte JSON: {}", out_path);
    }

    Ok(())
}
