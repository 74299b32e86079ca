//! Reassembler と ByteStream を 1 つにまとめた受信ストリーム

use inorder_stream::{ByteStream, Reader, StreamConfig, StreamError, StreamStats, Writer};
use serde::Serialize;

use crate::reassembler::Reassembler;

/// 再組み立て済み受信ストリーム
///
/// [`Reassembler`] と出力先の [`ByteStream`] を所有する。
/// 書き込み側は `insert` だけを使い、アプリケーション側は `reader_mut()` 越しに
/// [`Reader`] のメソッドで読み出す。
///
/// ## スレッド安全性
///
/// 内部でロックは取らない。スレッドをまたぐ場合はこのペア全体を
/// 1 つの Mutex で保護すること。
pub struct ReassembledStream {
    reassembler: Reassembler,
    stream: ByteStream,
}

/// 受信ストリームの統計スナップショット
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReassemblyStats {
    #[serde(flatten)]
    pub stream: StreamStats,
    pub bytes_pending: u64,
    pub first_unassembled_index: u64,
    pub finished: bool,
}

impl ReassembledStream {
    /// # エラー
    /// - `capacity == 0` の場合 `StreamError::ZeroCapacity`
    pub fn new(capacity: u64) -> Result<Self, StreamError> {
        Self::with_config(&StreamConfig::new(capacity))
    }

    pub fn with_config(config: &StreamConfig) -> Result<Self, StreamError> {
        Ok(ReassembledStream {
            reassembler: Reassembler::new(),
            stream: ByteStream::with_config(config)?,
        })
    }

    /// バイト範囲を受け取る（[`Reassembler::insert`] を参照）
    pub fn insert(&mut self, first_index: u64, data: &[u8], is_last: bool) {
        self.reassembler
            .insert(first_index, data, is_last, &mut self.stream);
    }

    /// 上位レイヤーで異常を検出したときに呼ぶ
    pub fn set_error(&mut self) {
        self.stream.set_error();
    }

    /// 読み出し側のビュー
    pub fn reader(&self) -> &ByteStream {
        &self.stream
    }

    /// 読み出し側のビュー（pop / read 用）
    pub fn reader_mut(&mut self) -> &mut ByteStream {
        &mut self.stream
    }

    pub fn available_capacity(&self) -> u64 {
        self.stream.available_capacity()
    }

    pub fn bytes_pending(&self) -> u64 {
        self.reassembler.bytes_pending()
    }

    pub fn first_unassembled_index(&self) -> u64 {
        self.reassembler.first_unassembled_index()
    }

    pub fn stats(&self) -> ReassemblyStats {
        ReassemblyStats {
            stream: self.stream.stats(),
            bytes_pending: self.reassembler.bytes_pending(),
            first_unassembled_index: self.reassembler.first_unassembled_index(),
            finished: self.stream.is_finished(),
        }
    }
}
