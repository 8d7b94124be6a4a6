use crate::{AcceptedFile, ConvertCommand, ConvertUpdate};
use pdf_images::{
    ConversionSettings, ConvertError, Converter, LopdfBackend, ValidationRules, Validation,
    load_images, save_result, validate_files,
};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Async worker task that processes conversion commands and sends updates.
///
/// Commands are handled one at a time, in the order received.
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<ConvertCommand>,
    update_tx: mpsc::UnboundedSender<ConvertUpdate>,
) {
    while let Some(cmd) = command_rx.recv().await {
        process_command(cmd, &update_tx).await;
    }
    log::debug!("Command channel closed, worker exiting");
}

async fn process_command(cmd: ConvertCommand, update_tx: &mpsc::UnboundedSender<ConvertUpdate>) {
    match cmd {
        ConvertCommand::Validate { paths, rules } => {
            handle_validate(&paths, &rules, update_tx).await;
        }
        ConvertCommand::Convert {
            paths,
            settings,
            rules,
            output_dir,
        } => {
            if let Err(e) = handle_convert(&paths, &settings, &rules, &output_dir, update_tx).await
            {
                log::error!("Conversion failed: {}", e);
                send_error(update_tx, format!("Conversion failed: {}", e));
            }
        }
    }
}

async fn handle_validate(
    paths: &[PathBuf],
    rules: &ValidationRules,
    update_tx: &mpsc::UnboundedSender<ConvertUpdate>,
) {
    if let Err(e) = validate_paths(paths, rules, update_tx).await {
        send_error(update_tx, format!("Failed to load files: {}", e));
    }
}

async fn handle_convert(
    paths: &[PathBuf],
    settings: &ConversionSettings,
    rules: &ValidationRules,
    output_dir: &Path,
    update_tx: &mpsc::UnboundedSender<ConvertUpdate>,
) -> pdf_images::Result<()> {
    let validation = validate_paths(paths, rules, update_tx).await?;
    if validation.is_empty() {
        return Err(if paths.is_empty() {
            ConvertError::NoFiles
        } else {
            ConvertError::NoValidFiles
        });
    }

    let result = Converter::new(LopdfBackend)
        .convert(&validation.accepted, settings, |percent| {
            let _ = update_tx.send(ConvertUpdate::Progress { percent });
        })
        .await?;

    let path = save_result(&result, output_dir).await?;
    log::info!("Wrote {}", path.display());
    let _ = update_tx.send(ConvertUpdate::Complete {
        path,
        page_count: result.page_count,
    });

    Ok(())
}

/// Load and validate `paths`, reporting the outcome as a `Validated` update
async fn validate_paths(
    paths: &[PathBuf],
    rules: &ValidationRules,
    update_tx: &mpsc::UnboundedSender<ConvertUpdate>,
) -> pdf_images::Result<Validation> {
    let files = load_images(paths).await?;
    let validation = validate_files(&files, rules);

    let _ = update_tx.send(ConvertUpdate::Validated {
        accepted: validation
            .accepted
            .iter()
            .map(|f| AcceptedFile {
                name: f.name.clone(),
                size_bytes: f.size_bytes,
            })
            .collect(),
        warnings: validation.warnings.clone(),
    });

    Ok(validation)
}

fn send_error(update_tx: &mpsc::UnboundedSender<ConvertUpdate>, message: String) {
    let _ = update_tx.send(ConvertUpdate::Error { message });
}
