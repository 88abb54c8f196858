use docling_serve_http::{
    ConvertDocumentsRequestOptions, DoclingClient, InputFormat, OutputFormat,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: convert <file>"))?;

    let client = DoclingClient::from_env().map_err(anyhow::Error::msg)?;
    let health = client.health_check().await?;
    println!("service status: {}", health.status);

    let options = ConvertDocumentsRequestOptions::default()
        .from_formats([InputFormat::Pdf, InputFormat::Docx, InputFormat::Md])
        .to_formats([OutputFormat::Md]);
    let result = client.convert_file(&path, Some(options)).await?;

    println!(
        "{} converted in {:.2}s ({:?})",
        result.document.filename, result.processing_time, result.status
    );
    if let Some(markdown) = result.document.md_content {
        println!("{markdown}");
    }

    Ok(())
}
