//! 進捗通知
//!
//! オーケストレータは `ProgressEvent` を発行するだけで、表示方法は `ProgressSink` 側が決める。

use crate::orchestrator::BatchSummary;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// バッチ処理中のイベント
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// ファイルの処理開始（`index` はキュー上の位置）
    FileStarted { index: usize, name: String, progress: u8 },
    /// ファイル内の進捗（0〜100）
    FileProgress { index: usize, progress: u8 },
    /// 切り抜きに失敗したカード（結果には含めない）
    ItemSkipped { index: usize, word: String, reason: String },
    FileCompleted { index: usize, detected: usize, cropped: usize },
    FileFailed { index: usize, message: String },
    BatchFinished(BatchSummary),
}

pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}

/// 何も表示しない
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn on_event(&self, _event: ProgressEvent) {}
}

/// ファイルごとにプログレスバーを表示
#[derive(Default)]
pub struct ConsoleProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template("  {prefix:<24} [{bar:30.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ")
    }
}

impl ProgressSink for ConsoleProgress {
    fn on_event(&self, event: ProgressEvent) {
        let Ok(mut guard) = self.bar.lock() else {
            return;
        };

        match event {
            ProgressEvent::FileStarted { name, progress, .. } => {
                let bar = ProgressBar::new(100).with_style(Self::style()).with_prefix(name);
                bar.set_position(u64::from(progress));
                bar.set_message("認識中...");
                *guard = Some(bar);
            }
            ProgressEvent::FileProgress { progress, .. } => {
                if let Some(bar) = guard.as_ref() {
                    bar.set_position(u64::from(progress));
                    bar.set_message("切り抜き中...");
                }
            }
            ProgressEvent::ItemSkipped { word, reason, .. } => {
                if let Some(bar) = guard.as_ref() {
                    bar.println(format!("  ⚠ スキップ: {} ({})", word, reason));
                }
            }
            ProgressEvent::FileCompleted { detected, cropped, .. } => {
                if let Some(bar) = guard.take() {
                    bar.set_position(100);
                    bar.finish_with_message(format!("✔ {}/{}件", cropped, detected));
                }
            }
            ProgressEvent::FileFailed { message, .. } => {
                if let Some(bar) = guard.take() {
                    bar.abandon_with_message(format!("✖ {}", message));
                }
            }
            ProgressEvent::BatchFinished(_) => {
                if let Some(bar) = guard.take() {
                    bar.finish_and_clear();
                }
            }
        }
    }
}
