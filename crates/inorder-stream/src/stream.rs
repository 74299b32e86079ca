//! バイトストリーム実装

use alloc::vec::Vec;
use core::cmp;

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::StreamConfig;
use crate::error::StreamError;

/// 書き込み側（producer）のロール
///
/// 再組み立て器や I/O 層はこのトレイト越しにストリームへ書き込む。
pub trait Writer {
    /// 残り容量に収まる先頭部分だけを書き込み、受け付けたバイト数を返す
    ///
    /// 入り切らなかった末尾は黙って破棄する（フロー制御であってエラーではない）。
    fn push(&mut self, data: &[u8]) -> u64;

    /// ストリームの終端を通知する（冪等）
    fn close(&mut self);

    /// ストリームを異常状態にする（冪等、バッファの中身は消さない）
    fn set_error(&mut self);

    fn is_closed(&self) -> bool;

    /// `capacity - bytes_buffered`
    fn available_capacity(&self) -> u64;

    /// これまでに受け付けた総バイト数
    fn bytes_pushed(&self) -> u64;
}

/// 読み出し側（consumer）のロール
pub trait Reader {
    /// バッファ中のバイト列をそのまま参照する（消費しない）
    fn peek(&self) -> &[u8];

    /// 先頭から `min(len, bytes_buffered)` バイトを取り除く
    fn pop(&mut self, len: u64);

    /// close 済みかつバッファが空
    fn is_finished(&self) -> bool;

    fn has_error(&self) -> bool;

    fn bytes_buffered(&self) -> u64;

    /// これまでに取り出した総バイト数
    fn bytes_popped(&self) -> u64;

    /// 最大 `max` バイトを取り出して返す（peek + pop）
    ///
    /// データがない場合は空の Vec を返す。
    fn read(&mut self, max: u64) -> Vec<u8> {
        let len = cmp::min(max, self.bytes_buffered()) as usize;
        let data = self.peek()[..len].to_vec();
        self.pop(len as u64);
        data
    }
}

/// 容量制限付きバイトストリーム
///
/// 単一の所有オブジェクトが [`Writer`] と [`Reader`] の両方を実装する。
/// 状態を複製せず、書き込み側と読み出し側で同じインスタンスを参照する。
///
/// ## 不変条件
/// - `bytes_buffered() <= capacity()`
/// - `bytes_pushed() - bytes_popped() == bytes_buffered()`
/// - `closed` / `error` は false → true にしか変化しない
pub struct ByteStream {
    /// 最大保持バイト数（構築後は不変）
    capacity: u64,
    /// バッファ本体。`buffer[head..]` が未読データ
    buffer: Vec<u8>,
    /// 読み出し済みの先頭位置。pop は head を進めるだけで、
    /// 未読部分が半分以下になったら push 時に詰め直す
    head: usize,
    closed: bool,
    error: bool,
    /// 受け付けた総バイト数（統計用 + 再組み立て器のインデックス管理用）
    total_pushed: u64,
    /// 取り出した総バイト数
    total_popped: u64,
}

/// ストリームの統計スナップショット
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    pub capacity: u64,
    pub buffered: u64,
    pub bytes_pushed: u64,
    pub bytes_popped: u64,
    pub closed: bool,
    pub error: bool,
}

impl ByteStream {
    /// 新しい ByteStream を生成する
    ///
    /// # エラー
    /// - `capacity == 0` の場合 `StreamError::ZeroCapacity`
    pub fn new(capacity: u64) -> Result<Self, StreamError> {
        Self::with_config(&StreamConfig::new(capacity))
    }

    /// 設定から ByteStream を生成する
    pub fn with_config(config: &StreamConfig) -> Result<Self, StreamError> {
        config.validate()?;
        Ok(ByteStream {
            capacity: config.capacity,
            buffer: Vec::new(),
            head: 0,
            closed: false,
            error: false,
            total_pushed: 0,
            total_popped: 0,
        })
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn stats(&self) -> StreamStats {
        StreamStats {
            capacity: self.capacity,
            buffered: self.bytes_buffered(),
            bytes_pushed: self.total_pushed,
            bytes_popped: self.total_popped,
            closed: self.closed,
            error: self.error,
        }
    }

    /// 読み出し済み領域を詰める
    fn compact(&mut self) {
        if self.head > 0 && self.head * 2 >= self.buffer.len() {
            self.buffer.drain(..self.head);
            self.head = 0;
        }
    }
}

impl Writer for ByteStream {
    fn push(&mut self, data: &[u8]) -> u64 {
        let accepted = cmp::min(data.len() as u64, self.available_capacity()) as usize;
        if accepted < data.len() {
            trace!(
                requested = data.len(),
                accepted,
                "push truncated to available capacity"
            );
        }
        if accepted == 0 {
            return 0;
        }

        self.compact();
        self.buffer.extend_from_slice(&data[..accepted]);
        self.total_pushed += accepted as u64;
        accepted as u64
    }

    fn close(&mut self) {
        if !self.closed {
            debug!(bytes_pushed = self.total_pushed, "stream closed");
        }
        self.closed = true;
    }

    fn set_error(&mut self) {
        if !self.error {
            debug!(
                bytes_pushed = self.total_pushed,
                bytes_popped = self.total_popped,
                "stream error flagged"
            );
        }
        self.error = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn available_capacity(&self) -> u64 {
        self.capacity - self.bytes_buffered()
    }

    fn bytes_pushed(&self) -> u64 {
        self.total_pushed
    }
}

impl Reader for ByteStream {
    fn peek(&self) -> &[u8] {
        &self.buffer[self.head..]
    }

    fn pop(&mut self, len: u64) {
        let len = cmp::min(len, self.bytes_buffered()) as usize;
        self.head += len;
        self.total_popped += len as u64;

        // 空になったら先頭に戻す（確保済みの領域は再利用する）
        if self.head == self.buffer.len() {
            self.buffer.clear();
            self.head = 0;
        }
    }

    fn is_finished(&self) -> bool {
        self.closed && self.bytes_buffered() == 0
    }

    fn has_error(&self) -> bool {
        self.error
    }

    fn bytes_buffered(&self) -> u64 {
        (self.buffer.len() - self.head) as u64
    }

    fn bytes_popped(&self) -> u64 {
        self.total_popped
    }
}
