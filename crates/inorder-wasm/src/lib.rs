//! # inorder-wasm
//!
//! wasm-bindgen エクスポート：JS ホスト（Node.js / ブラウザ）から呼び出す公開 API。
//!
//! ## 使用方法（TypeScript）
//!
//! ```typescript
//! import { StreamReceiver, init_panic_hook } from '../inorder-wasm-pkg/inorder_wasm';
//!
//! // パニック時のスタックトレースを有効化（開発時）
//! init_panic_hook();
//!
//! // 受信ストリーム初期化（容量 64KiB）
//! const rx = new StreamReceiver(65536);
//! // または JSON 設定から
//! const rx2 = StreamReceiver.fromConfigJson('{"capacity": 4096}');
//!
//! // フレーミング層が解析したセグメントを渡す
//! rx.insert(seg.index, seg.payload, seg.fin);
//! ack(rx.firstUnassembledIndex(), rx.availableCapacity());
//!
//! // アプリケーションへ渡す
//! const data = rx.read(16384);
//! if (rx.isFinished()) { onEnd(); }
//! ```

use wasm_bindgen::prelude::*;

use inorder_stream::{StreamConfig, StreamError};

pub mod receiver;

pub use receiver::StreamReceiver;

/// パニック時にブラウザコンソールにスタックトレースを出力する
///
/// 開発時に必ず呼び出すこと。本番ビルドでは feature flag で無効化可能。
#[wasm_bindgen]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// JSON 文字列から設定を読み込み、検証する
///
/// 省略されたフィールドはデフォルト値になる。
///
/// # エラー
/// - JSON として不正、またはフィールドの型が違う場合 `StreamError::InvalidConfig`
/// - `capacity == 0` の場合 `StreamError::ZeroCapacity`
pub fn parse_config(json: &str) -> Result<StreamConfig, StreamError> {
    let config: StreamConfig =
        serde_json::from_str(json).map_err(|e| StreamError::InvalidConfig(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
