use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vocab_crop::cli::{Cli, Commands};
use vocab_crop::config::{ApiKey, Config, KeySource};
use vocab_crop::cropper::Cropper;
use vocab_crop::error::VocabCropError;
use vocab_crop::export::{self, ExportOptions};
use vocab_crop::orchestrator::{BatchOptions, BatchSession, EmptyResultPolicy, FileStatus};
use vocab_crop::progress::ConsoleProgress;
use vocab_crop::recognizer::{GeminiRecognizer, ImagePayload, Recognizer};
use vocab_crop::scanner;
use vocab_crop_common::DetectedItem;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectReport {
    file_name: String,
    items: Vec<DetectedItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "vocab_crop=debug,vocab_crop_common=debug"
    } else {
        "vocab_crop=error"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn default_stem() -> String {
    chrono::Local::now().format("vocab_%Y%m%d_%H%M%S").to_string()
}

fn scan_inputs(inputs: &[PathBuf], recursive: bool) -> anyhow::Result<Vec<scanner::ImageInfo>> {
    let images = scanner::collect_images(inputs, recursive)?;
    if images.is_empty() {
        let joined = inputs
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(VocabCropError::NoImagesFound(joined).into());
    }
    Ok(images)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load().context("設定ファイルの読み込みに失敗")?;

    match cli.command {
        Commands::Run {
            inputs,
            output,
            format,
            name,
            recursive,
            empty_as_completed,
            quality,
            lang,
            archive_folder,
        } => {
            println!("🃏 vocab-crop - 単語カード切り抜き\n");

            // 1. 画像スキャン
            println!("[1/3] 画像をスキャン中...");
            let images = scan_inputs(&inputs, recursive)?;
            let mut session = BatchSession::new();
            let added = session.add_images(&images)?;
            println!("✔ {}枚の画像をキューに追加\n", added);

            // 2. 認識・切り抜き（APIキーがなければここで中止）
            let recognizer = GeminiRecognizer::from_config(&config)?;
            println!("[2/3] AI認識・切り抜き中... (モデル: {})", recognizer.model());

            let options = BatchOptions {
                empty_policy: if empty_as_completed {
                    EmptyResultPolicy::Complete
                } else {
                    config.empty_result_policy
                },
                cropper: Cropper::new(quality.unwrap_or(config.jpeg_quality)),
            };
            let progress = ConsoleProgress::new();
            let summary = session.process_all(&recognizer, &options, &progress).await?;

            for file in session.files() {
                match file.status() {
                    FileStatus::Completed => {
                        println!("  ✔ {} ({}/{}件)", file.name(), file.cropped(), file.detected());
                    }
                    FileStatus::Error => {
                        println!("  ✖ {}: {}", file.name(), file.error().unwrap_or("不明なエラー"));
                    }
                    status => println!("  - {} ({})", file.name(), status.as_str()),
                }
            }
            println!(
                "✔ 認識完了: 完了 {} / エラー {} / スキップ {}件 / 結果 {}件\n",
                summary.completed,
                summary.failed,
                summary.skipped_items,
                session.results().len()
            );

            // 3. エクスポート（一部のファイルがエラーでも取得済みの結果は出力する）
            println!("[3/3] エクスポート中...");
            let output_dir = output.unwrap_or_else(|| PathBuf::from("."));
            let stem = name.unwrap_or_else(default_stem);
            let export_options = ExportOptions {
                header: lang.unwrap_or(config.header_language),
                archive_folder: archive_folder.or_else(|| config.archive_folder.clone()),
            };
            export::export_results(session.results(), format, &output_dir, &stem, &export_options)?;

            println!("\n✅ 完了");
        }

        Commands::Detect { inputs, output, recursive } => {
            println!("🔍 vocab-crop - 認識のみ\n");

            let images = scan_inputs(&inputs, recursive)?;
            let recognizer = GeminiRecognizer::from_config(&config)?;

            let mut reports = Vec::with_capacity(images.len());
            for image in &images {
                println!("- {} を認識中...", image.file_name);
                let data = std::fs::read(&image.path)
                    .with_context(|| format!("読み込みに失敗: {}", image.path.display()))?;
                let payload = ImagePayload {
                    file_name: &image.file_name,
                    mime: &image.mime,
                    data: &data,
                };
                let report = match recognizer.recognize(payload).await {
                    Ok(items) => {
                        println!("✔ {}件", items.len());
                        DetectReport { file_name: image.file_name.clone(), items, error: None }
                    }
                    Err(e) => {
                        println!("✖ {}", e);
                        DetectReport { file_name: image.file_name.clone(), items: Vec::new(), error: Some(e.to_string()) }
                    }
                };
                reports.push(report);
            }

            let json = serde_json::to_string_pretty(&reports)?;
            match output {
                Some(path) => {
                    write_output(&path, &json)?;
                    println!("\n✔ 結果を保存: {}", path.display());
                }
                None => println!("\n{}", json),
            }
        }

        Commands::Config { set_api_key, prompt_api_key, set_model, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if prompt_api_key {
                let key = dialoguer::Password::new()
                    .with_prompt("APIキー")
                    .interact()
                    .context("APIキーの入力に失敗")?;
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if let Some(model) = set_model {
                config.set_model(model)?;
                println!("✔ モデルを設定しました");
            }

            if show {
                let key_status = match config.resolve_api_key() {
                    ApiKey::Present { source: KeySource::Env(name), .. } => format!("設定済み（環境変数 {}）", name),
                    ApiKey::Present { source: KeySource::ConfigFile, .. } => "設定済み（設定ファイル）".to_string(),
                    ApiKey::Absent => "未設定".to_string(),
                };
                println!("設定:");
                println!("  パス: {}", Config::config_path()?.display());
                println!("  モデル: {}", config.model);
                println!("  APIベースURL: {}", config.api_base_url);
                println!("  JPEG品質: {}", config.jpeg_quality);
                println!("  0件時の扱い: {:?}", config.empty_result_policy);
                println!("  Excelヘッダー: {:?}", config.header_language);
                println!("  ZIPサブフォルダ: {}", config.archive_folder.as_deref().unwrap_or("なし"));
                println!("  APIキー: {}", key_status);
            }
        }
    }

    Ok(())
}

fn write_output(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content).with_context(|| format!("書き込みに失敗: {}", path.display()))?;
    Ok(())
}
