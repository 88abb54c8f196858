use std::time::Duration;

use docling_serve_http::{
    ChunkDocumentsRequest, DoclingClient, HybridChunkerOptions, Source, TaskStatus,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://arxiv.org/pdf/2408.09869".to_owned());

    let client = DoclingClient::from_env().map_err(anyhow::Error::msg)?;
    let request = ChunkDocumentsRequest::new(
        [Source::http(url)],
        HybridChunkerOptions {
            semantic_threshold: 0.7,
            ..HybridChunkerOptions::default()
        },
    );

    let task = client.chunk_async(&request).await?;
    let status = client
        .wait_for_task(&task.task_id, Duration::from_secs(5), Duration::from_secs(600))
        .await?;
    if status.task_status != TaskStatus::Success {
        anyhow::bail!("chunking task ended as {:?}", status.task_status);
    }

    let result = client.chunk_task_result(&task.task_id).await?;
    for chunk in result.chunks {
        println!("[{}] {}", chunk.chunk_index, chunk.headings.join(" > "));
        println!("{}\n", chunk.text);
    }

    Ok(())
}
