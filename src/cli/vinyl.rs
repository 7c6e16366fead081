use std::path::PathBuf;

use crate::{error, success, vinyl as compositor};

/// Renders the vinyl composite of `input` and writes it as PNG to `output`.
pub async fn vinyl(input: PathBuf, output: PathBuf) {
    let bytes = match async_fs::read(&input).await {
        Ok(bytes) => bytes,
        Err(e) => error!("Cannot read {}: {}", input.display(), e),
    };

    let png = match tokio::task::spawn_blocking(move || compositor::render_png(&bytes)).await {
        Ok(Ok(png)) => png,
        Ok(Err(e)) => error!("Cannot render {}: {}", input.display(), e),
        Err(e) => error!("Rendering task failed: {}", e),
    };

    if let Err(e) = async_fs::write(&output, png).await {
        error!("Cannot write {}: {}", output.display(), e);
    }

    success!("Vinyl cover written to {}", output.display());
}
