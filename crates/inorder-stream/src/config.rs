//! ストリーム設定

use serde::{Deserialize, Serialize};

use crate::error::StreamError;

/// デフォルトのストリーム容量（バイト）
pub const DEFAULT_CAPACITY: u64 = 64 * 1024;

/// ストリームの設定
///
/// JSON 等から読み込む場合、省略されたフィールドはデフォルト値になる。
///
/// ```json
/// { "capacity": 65536 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// バッファに保持できる最大バイト数（1 以上）
    pub capacity: u64,
}

impl StreamConfig {
    pub fn new(capacity: u64) -> Self {
        StreamConfig { capacity }
    }

    /// 設定値を検証する
    ///
    /// # エラー
    /// - `capacity == 0` の場合 `StreamError::ZeroCapacity`
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.capacity == 0 {
            return Err(StreamError::ZeroCapacity);
        }
        Ok(())
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            capacity: DEFAULT_CAPACITY,
        }
    }
}
