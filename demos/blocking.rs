use docling_serve_http::{blocking::DoclingClient, ClientOptions};

fn main() -> anyhow::Result<()> {
    let url = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: blocking <document-url>"))?;

    let client = DoclingClient::from_env()
        .map_err(anyhow::Error::msg)?
        .with_options(ClientOptions {
            timeout_ms: 300_000,
            max_retries: 2,
            retry_delay_ms: 2_000,
        });

    let result = client.convert_url(url, None)?;
    println!("{:#?}", result.document);

    Ok(())
}
