//! inorder-stream エラー型

use alloc::string::String;

use thiserror::Error;

/// ストリーム構築時のエラー
///
/// 定常動作（push / pop / 再組み立て）はエラーを返さない。
/// 呼び出し側に見えるのは構築時の誤用のみ。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// 容量 0 のストリームは定義できない
    #[error("stream capacity must be greater than zero")]
    ZeroCapacity,
    /// 設定の読み込みに失敗（JSON の構文エラー等）
    #[error("invalid stream configuration: {0}")]
    InvalidConfig(String),
}
