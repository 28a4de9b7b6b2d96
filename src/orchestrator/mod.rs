//! バッチオーケストレータ
//!
//! キュー上のファイルを1枚ずつ順番に処理する:
//! 認識API → カードごとの切り抜き → 結果リストへの追加。
//! 認識APIの呼び出しは常に高々1件。

mod accumulator;
mod queue;

pub use accumulator::{PendingResult, ResultAccumulator, ResultSender};
pub use queue::{content_id, FileStatus, QueuedFile};

use crate::cropper::{CropError, Cropper, SourceImage};
use crate::error::{VocabCropError, Result};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::recognizer::Recognizer;
use crate::scanner::{is_image_mime, ImageInfo};
use serde::{Deserialize, Serialize};
use vocab_crop_common::{DetectedItem, VocabResult};

/// 処理開始時の進捗
pub const PROGRESS_STARTED: u8 = 5;
/// 認識完了時の進捗
pub const PROGRESS_RECOGNIZED: u8 = 10;

/// 認識結果が0件だったときの扱い
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyResultPolicy {
    /// ファイルをエラーにする
    #[default]
    Error,
    /// 結果0件で完了にする
    Complete,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub empty_policy: EmptyResultPolicy,
    pub cropper: Cropper,
}

/// バッチ1回分の集計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// 今回処理したファイル数
    pub processed: usize,
    pub completed: usize,
    pub failed: usize,
    /// 切り抜きに失敗して除外したカード数
    pub skipped_items: usize,
    /// 今回追加された結果数
    pub new_results: usize,
}

/// カード1件の切り抜き結果
struct ItemOutcome {
    word: String,
    result: std::result::Result<vocab_crop_common::CroppedImage, CropError>,
}

/// カード処理後の進捗: 10 + (j+1)/N * 90（完了までは99止まり）
pub fn item_progress(index: usize, total: usize) -> u8 {
    if total == 0 {
        return PROGRESS_RECOGNIZED;
    }
    let span = usize::from(100 - PROGRESS_RECOGNIZED);
    let value = usize::from(PROGRESS_RECOGNIZED) + (index + 1) * span / total;
    value.min(99) as u8
}

/// セッション状態（キュー + 結果リスト）
#[derive(Default)]
pub struct BatchSession {
    files: Vec<QueuedFile>,
    results: Vec<VocabResult>,
}

impl BatchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[QueuedFile] {
        &self.files
    }

    /// 蓄積済みの結果（表示順）
    pub fn results(&self) -> &[VocabResult] {
        &self.results
    }

    /// ファイルをキューに追加
    ///
    /// 画像以外のMIMEタイプと、内容が同じファイルは追加しない。
    pub fn add_file(&mut self, name: impl Into<String>, mime: impl Into<String>, data: Vec<u8>) -> Option<&QueuedFile> {
        let name = name.into();
        let mime = mime.into();

        if !is_image_mime(&mime) {
            tracing::debug!(file = %name, mime = %mime, "画像以外のファイルを除外");
            return None;
        }

        let file = QueuedFile::new(name, mime, data);
        if let Some(existing) = self.files.iter().find(|f| f.id() == file.id()) {
            tracing::info!(file = file.name(), existing = existing.name(), "同じ内容のファイルがキューにあるためスキップ");
            return None;
        }

        self.files.push(file);
        self.files.last()
    }

    /// スキャン結果を読み込んでキューに追加（追加件数を返す）
    pub fn add_images(&mut self, images: &[ImageInfo]) -> Result<usize> {
        let mut added = 0;
        for image in images {
            let data = std::fs::read(&image.path)?;
            if self.add_file(image.file_name.clone(), image.mime.clone(), data).is_some() {
                added += 1;
            }
        }
        Ok(added)
    }

    /// キューからファイルを外す（処理中は不可）。他のファイルの順序は変わらない。
    pub fn remove_file(&mut self, id: &str) -> bool {
        match self.files.iter().position(|f| f.id() == id) {
            Some(pos) if self.files[pos].status() != FileStatus::Processing => {
                self.files.remove(pos);
                true
            }
            _ => false,
        }
    }

    /// エラーのファイルを未処理に戻す（戻した件数を返す）
    pub fn requeue_failed(&mut self) -> usize {
        let mut count = 0;
        for file in self.files.iter_mut().filter(|f| f.status() == FileStatus::Error) {
            file.requeue();
            count += 1;
        }
        count
    }

    /// キューと結果をすべて破棄
    pub fn reset(&mut self) {
        self.files.clear();
        self.results.clear();
    }

    /// 未処理のファイルをすべて処理
    ///
    /// completed / error のファイルは処理しないので、再実行しても認識APIは呼ばれない。
    /// ファイル単位の失敗はバッチを止めない。
    pub async fn process_all(
        &mut self,
        recognizer: &dyn Recognizer,
        options: &BatchOptions,
        sink: &dyn ProgressSink,
    ) -> Result<BatchSummary> {
        let pending: Vec<usize> = self
            .files
            .iter()
            .enumerate()
            .filter(|(_, f)| f.status() == FileStatus::Pending)
            .map(|(i, _)| i)
            .collect();

        if pending.is_empty() {
            tracing::debug!("未処理のファイルがありません");
            let summary = BatchSummary::default();
            sink.on_event(ProgressEvent::BatchFinished(summary.clone()));
            return Ok(summary);
        }

        let accumulator = ResultAccumulator::spawn(self.results.len());
        self.run_batch(pending, accumulator, recognizer, options, sink).await
    }

    /// `pending` のファイルを順に処理し、新しい結果を末尾に追加する
    ///
    /// 集計に失敗した場合はそのファイルをエラーにしてバッチを中断する。
    /// 既存の結果はセッションに残る。
    async fn run_batch(
        &mut self,
        pending: Vec<usize>,
        accumulator: ResultAccumulator,
        recognizer: &dyn Recognizer,
        options: &BatchOptions,
        sink: &dyn ProgressSink,
    ) -> Result<BatchSummary> {
        let sender = accumulator.sender();
        let mut summary = BatchSummary::default();
        let mut failure = None;

        for index in pending {
            let file = &mut self.files[index];
            match process_file(index, file, recognizer, options, &sender, sink).await {
                Ok(skipped) => summary.skipped_items += skipped,
                Err(e) => {
                    tracing::error!(file = file.name(), error = %e, "バッチ処理を中断");
                    fail_file(index, file, e.to_string(), sink);
                    failure = Some(e);
                }
            }

            summary.processed += 1;
            match file.status() {
                FileStatus::Completed => summary.completed += 1,
                FileStatus::Error => summary.failed += 1,
                status => tracing::warn!(file = file.name(), status = status.as_str(), "想定外の状態"),
            }

            if failure.is_some() {
                break;
            }
        }

        drop(sender);
        match accumulator.finish().await {
            Ok(new_results) => {
                summary.new_results = new_results.len();
                self.results.extend(new_results);
            }
            Err(e) => {
                tracing::error!(error = %e, "今回の結果を回収できませんでした");
                if failure.is_none() {
                    failure = Some(e);
                }
            }
        }

        tracing::info!(
            processed = summary.processed,
            completed = summary.completed,
            failed = summary.failed,
            skipped_items = summary.skipped_items,
            new_results = summary.new_results,
            "バッチ処理完了"
        );
        sink.on_event(ProgressEvent::BatchFinished(summary.clone()));

        match failure {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }
}

/// ファイル1枚を処理し、除外したカード数を返す
async fn process_file(
    index: usize,
    file: &mut QueuedFile,
    recognizer: &dyn Recognizer,
    options: &BatchOptions,
    sender: &ResultSender,
    sink: &dyn ProgressSink,
) -> Result<usize> {
    file.start(PROGRESS_STARTED);
    sink.on_event(ProgressEvent::FileStarted {
        index,
        name: file.name().to_string(),
        progress: file.progress(),
    });

    let items = match recognizer.recognize(file.payload()).await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(file = file.name(), error = %e, "認識失敗");
            fail_file(index, file, e.to_string(), sink);
            return Ok(0);
        }
    };

    file.set_detected(items.len());

    if items.is_empty() {
        match options.empty_policy {
            EmptyResultPolicy::Error => {
                fail_file(index, file, VocabCropError::NoContentDetected.to_string(), sink);
            }
            EmptyResultPolicy::Complete => {
                file.complete(0);
                sink.on_event(ProgressEvent::FileCompleted { index, detected: 0, cropped: 0 });
            }
        }
        return Ok(0);
    }

    file.advance(PROGRESS_RECOGNIZED);
    sink.on_event(ProgressEvent::FileProgress { index, progress: file.progress() });

    let outcomes = crop_items(index, file, items, &options.cropper, sink).await;

    let (succeeded, failed): (Vec<ItemOutcome>, Vec<ItemOutcome>) =
        outcomes.into_iter().partition(|o| o.result.is_ok());

    for outcome in &failed {
        if let Err(e) = &outcome.result {
            tracing::warn!(file = file.name(), word = %outcome.word, error = %e, "切り抜き失敗のためスキップ");
            sink.on_event(ProgressEvent::ItemSkipped {
                index,
                word: outcome.word.clone(),
                reason: e.to_string(),
            });
        }
    }

    let cropped = succeeded.len();
    for outcome in succeeded {
        if let Ok(image) = outcome.result {
            sender.append(PendingResult {
                word: outcome.word,
                source_file: file.name().to_string(),
                image,
            })?;
        }
    }

    file.complete(cropped);
    sink.on_event(ProgressEvent::FileCompleted {
        index,
        detected: file.detected(),
        cropped,
    });

    Ok(failed.len())
}

/// カードを順に切り抜く
///
/// ソース画像はこの関数のスコープでだけ保持する。デコード失敗時は全カードが
/// 同じ `Load` エラーになる。
async fn crop_items(
    index: usize,
    file: &mut QueuedFile,
    items: Vec<DetectedItem>,
    cropper: &Cropper,
    sink: &dyn ProgressSink,
) -> Vec<ItemOutcome> {
    let source = SourceImage::decode(file.data()).await;
    if let Err(e) = &source {
        tracing::warn!(file = file.name(), error = %e, "画像デコード失敗");
    }

    let total = items.len();
    let mut outcomes = Vec::with_capacity(total);

    for (j, item) in items.into_iter().enumerate() {
        let result = match &source {
            Ok(source) => cropper.crop(source, &item.box_2d).await,
            Err(e) => Err(e.clone()),
        };
        outcomes.push(ItemOutcome { word: item.word, result });

        file.advance(item_progress(j, total));
        sink.on_event(ProgressEvent::FileProgress { index, progress: file.progress() });
    }

    outcomes
}

fn fail_file(index: usize, file: &mut QueuedFile, message: String, sink: &dyn ProgressSink) {
    file.fail(message.clone());
    sink.on_event(ProgressEvent::FileFailed { index, message });
}
