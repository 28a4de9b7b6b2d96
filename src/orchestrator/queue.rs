//! 処理キューのファイル

use crate::recognizer::ImagePayload;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// ファイルの処理状態
///
/// pending → processing → {completed | error}。completed と error は終端状態。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Pending => "pending",
            FileStatus::Processing => "processing",
            FileStatus::Completed => "completed",
            FileStatus::Error => "error",
        }
    }
}

/// キュー上のファイル
///
/// 状態と進捗はオーケストレータだけが更新する。
#[derive(Debug, Clone)]
pub struct QueuedFile {
    id: String,
    name: String,
    mime: String,
    data: Arc<[u8]>,
    status: FileStatus,
    progress: u8,
    error: Option<String>,
    detected: usize,
    cropped: usize,
}

/// 内容ハッシュ（SHA-256先頭8バイト）
pub fn content_id(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    hex::encode(&digest[..8])
}

impl QueuedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            id: content_id(&data),
            name: name.into(),
            mime: mime.into(),
            data: Arc::from(data),
            status: FileStatus::Pending,
            progress: 0,
            error: None,
            detected: 0,
            cropped: 0,
        }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn mime(&self) -> &str { &self.mime }
    pub fn status(&self) -> FileStatus { self.status }
    pub fn progress(&self) -> u8 { self.progress }
    pub fn error(&self) -> Option<&str> { self.error.as_deref() }
    /// 認識APIが返したカード数
    pub fn detected(&self) -> usize { self.detected }
    /// 切り抜きに成功したカード数
    pub fn cropped(&self) -> usize { self.cropped }

    pub(crate) fn data(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    pub(crate) fn payload(&self) -> ImagePayload<'_> {
        ImagePayload {
            file_name: &self.name,
            mime: &self.mime,
            data: &self.data,
        }
    }

    pub(super) fn start(&mut self, progress: u8) {
        self.status = FileStatus::Processing;
        self.progress = progress;
        self.error = None;
        self.detected = 0;
        self.cropped = 0;
    }

    /// 進捗を更新（減少はしない）
    pub(super) fn advance(&mut self, progress: u8) {
        self.progress = self.progress.max(progress.min(100));
    }

    pub(super) fn set_detected(&mut self, detected: usize) {
        self.detected = detected;
    }

    pub(super) fn complete(&mut self, cropped: usize) {
        self.status = FileStatus::Completed;
        self.progress = 100;
        self.cropped = cropped;
    }

    pub(super) fn fail(&mut self, message: impl Into<String>) {
        self.status = FileStatus::Error;
        self.error = Some(message.into());
    }

    pub(super) fn requeue(&mut self) {
        self.status = FileStatus::Pending;
        self.progress = 0;
        self.error = None;
        self.detected = 0;
        self.cropped = 0;
    }
}
