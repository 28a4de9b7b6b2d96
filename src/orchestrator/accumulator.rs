//! 結果アキュムレータ
//!
//! バッチ中に追加される結果は専用タスクだけが所有し、追加はチャネル経由のイベントで行う。
//! 連番はバッチ終了時に最終順で振る。既存の結果はセッション側に残る。

use crate::error::{VocabCropError, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use vocab_crop_common::{CroppedImage, VocabResult};

/// 連番確定前の結果
#[derive(Debug, Clone)]
pub struct PendingResult {
    pub word: String,
    pub source_file: String,
    pub image: CroppedImage,
}

pub struct ResultAccumulator {
    tx: mpsc::UnboundedSender<PendingResult>,
    handle: JoinHandle<Vec<VocabResult>>,
    /// 既存の結果数（新しい連番はこの次から）
    offset: usize,
}

/// 追加イベントの送信側
#[derive(Clone)]
pub struct ResultSender {
    tx: mpsc::UnboundedSender<PendingResult>,
}

impl ResultSender {
    pub fn append(&self, result: PendingResult) -> Result<()> {
        self.tx
            .send(result)
            .map_err(|_| VocabCropError::Accumulator("集計タスクが終了しています".into()))
    }
}

impl ResultAccumulator {
    /// 集計タスクを起動（`offset` は既存の結果数）
    pub fn spawn(offset: usize) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<PendingResult>();

        let handle = tokio::spawn(async move {
            let mut results = Vec::new();
            while let Some(pending) = rx.recv().await {
                results.push(VocabResult {
                    id: 0,
                    word: pending.word,
                    source_file: pending.source_file,
                    image: pending.image,
                });
            }
            results
        });

        Self { tx, handle, offset }
    }

    pub fn sender(&self) -> ResultSender {
        ResultSender { tx: self.tx.clone() }
    }

    /// 送信を締め切り、`offset + 1` から連番を振った新しい結果を返す
    ///
    /// 他の `ResultSender` がすべて破棄されるまで待つ。
    pub async fn finish(self) -> Result<Vec<VocabResult>> {
        drop(self.tx);
        let mut results = self
            .handle
            .await
            .map_err(|e| VocabCropError::Accumulator(e.to_string()))?;

        for (i, result) in results.iter_mut().enumerate() {
            result.id = self.offset + i + 1;
        }
        Ok(results)
    }

    /// 集計タスクを止め、受信側が閉じるまで待つ
    #[cfg(test)]
    pub(super) async fn abort(&self) {
        self.handle.abort();
        while !self.tx.is_closed() {
            tokio::task::yield_now().await;
        }
    }
}
