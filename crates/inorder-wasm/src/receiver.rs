//! StreamReceiver wasm-bindgen エクスポート
//!
//! JS ホストから呼び出す受信ストリームの主エントリポイント。
//! 再組み立てとバイトストリームを統合する。

use js_sys::Uint8Array;
use tracing::{debug, trace};
use wasm_bindgen::prelude::*;

use inorder_reassembly::ReassembledStream;
use inorder_stream::{Reader, StreamConfig, StreamError};

use crate::parse_config;

/// 受信ストリーム
///
/// ```text
/// StreamReceiver
///   └── ReassembledStream (inorder-reassembly)
///         ├── Reassembler  - 順不同セグメントの再組み立て
///         └── ByteStream   (inorder-stream) - 容量制限付きバッファ
/// ```
///
/// ## インデックスの扱い
///
/// JS の number は 2^53 まで正確に表せるため、インデックスは f64 で受け渡す。
/// 負数・NaN・小数・2^53 超のインデックスを持つセグメントは破棄する。
///
/// ## スレッド安全性
///
/// WASM はシングルスレッドのため、JS からは単一スレッドで呼び出される前提。
#[wasm_bindgen]
pub struct StreamReceiver {
    inner: ReassembledStream,
}

#[wasm_bindgen]
impl StreamReceiver {
    /// 受信ストリームを初期化する
    ///
    /// # エラー
    /// - `capacity` が 0
    #[wasm_bindgen(constructor)]
    pub fn new(capacity: u32) -> Result<StreamReceiver, JsError> {
        Self::from_config(&StreamConfig::new(u64::from(capacity))).map_err(to_js_error)
    }

    /// JSON 設定から受信ストリームを初期化する
    ///
    /// # 例（TypeScript）
    /// ```typescript
    /// const rx = StreamReceiver.fromConfigJson('{"capacity": 4096}');
    /// ```
    #[wasm_bindgen(js_name = "fromConfigJson")]
    pub fn from_config_json(json: &str) -> Result<StreamReceiver, JsError> {
        let config = parse_config(json).map_err(to_js_error)?;
        Self::from_config(&config).map_err(to_js_error)
    }

    /// フレーミング層が解析したセグメントを渡す
    ///
    /// 古い・重複・容量外のデータは黙って切り詰められる。
    ///
    /// # 戻り値
    /// - `false`: `first_index` がインデックスとして不正で、セグメントを破棄した
    pub fn insert(&mut self, first_index: f64, data: &[u8], is_last: bool) -> bool {
        let Some(index) = index_from_f64(first_index) else {
            trace!(first_index, len = data.len(), "segment with invalid index discarded");
            return false;
        };
        self.inner.insert(index, data, is_last);
        true
    }

    /// 最大 `max` バイトを読み出す。データがない場合は長さ 0 の Uint8Array
    pub fn read(&mut self, max: u32) -> Uint8Array {
        let data = self.inner.reader_mut().read(u64::from(max));
        to_uint8_array(&data)
    }

    /// 読み出し可能なデータを消費せずにコピーして返す
    pub fn peek(&self) -> Uint8Array {
        to_uint8_array(self.inner.reader().peek())
    }

    /// 先頭から `len` バイトを捨てる（`peek` と組み合わせて使う）
    pub fn pop(&mut self, len: u32) {
        self.inner.reader_mut().pop(u64::from(len));
    }

    /// 受信ウィンドウの大きさ
    #[wasm_bindgen(js_name = "availableCapacity")]
    pub fn available_capacity(&self) -> f64 {
        self.inner.available_capacity() as f64
    }

    #[wasm_bindgen(js_name = "bytesPending")]
    pub fn bytes_pending(&self) -> f64 {
        self.inner.bytes_pending() as f64
    }

    /// ACK 番号として使うインデックス
    #[wasm_bindgen(js_name = "firstUnassembledIndex")]
    pub fn first_unassembled_index(&self) -> f64 {
        self.inner.first_unassembled_index() as f64
    }

    #[wasm_bindgen(js_name = "isFinished")]
    pub fn is_finished(&self) -> bool {
        self.inner.reader().is_finished()
    }

    #[wasm_bindgen(js_name = "hasError")]
    pub fn has_error(&self) -> bool {
        self.inner.reader().has_error()
    }

    /// 接続異常を記録する（RST 受信等）
    #[wasm_bindgen(js_name = "setError")]
    pub fn set_error(&mut self) {
        self.inner.set_error();
    }

    /// 統計を JSON 文字列で返す
    ///
    /// ```json
    /// {
    ///   "capacity": 65536,
    ///   "buffered": 1200,
    ///   "bytes_pushed": 40960,
    ///   "bytes_popped": 39760,
    ///   "closed": false,
    ///   "error": false,
    ///   "bytes_pending": 512,
    ///   "first_unassembled_index": 40960,
    ///   "finished": false
    /// }
    /// ```
    #[wasm_bindgen(js_name = "getStats")]
    pub fn get_stats(&self) -> Result<String, JsError> {
        self.stats_json()
            .map_err(|e| JsError::new(&format!("Stats serialization failed: {}", e)))
    }
}

impl StreamReceiver {
    /// 設定から受信ストリームを生成する（JS を介さない native 用）
    pub fn from_config(config: &StreamConfig) -> Result<Self, StreamError> {
        let inner = ReassembledStream::with_config(config)?;
        debug!(capacity = config.capacity, "stream receiver created");
        Ok(StreamReceiver { inner })
    }

    pub fn stats_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.inner.stats())
    }

    pub fn stream(&self) -> &ReassembledStream {
        &self.inner
    }
}

/// JS の number で正確に表せるインデックスの上限（2^53）
const MAX_SAFE_INDEX: f64 = 9_007_199_254_740_992.0;

/// 非負の整数で 2^53 以下の値だけをインデックスとして受け付ける
pub fn index_from_f64(value: f64) -> Option<u64> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= MAX_SAFE_INDEX {
        Some(value as u64)
    } else {
        None
    }
}

fn to_js_error(e: StreamError) -> JsError {
    JsError::new(&format!("Invalid stream configuration: {}", e))
}

fn to_uint8_array(data: &[u8]) -> Uint8Array {
    let arr = Uint8Array::new_with_length(data.len() as u32);
    arr.copy_from(data);
    arr
}
