//! # inorder-stream
//!
//! 容量制限付きのバイトストリーム（Bounded Byte Channel）。
//!
//! 信頼性のあるストリーム転送（TCP 等）の受信側で、再組み立て済みのバイト列を
//! アプリケーションに渡すためのバッファ。書き込み側（[`Writer`]）と
//! 読み出し側（[`Reader`]）の2つのロールを1つの [`ByteStream`] が実装する。
//!
//! ## フロー制御
//!
//! ```text
//! push(data) ──► [ buffered: len <= capacity ] ──► peek() / pop(n)
//!                 └─ 入り切らない末尾は黙って破棄（エラーではない）
//! ```
//!
//! 書き込み側は `available_capacity()` で残り容量を確認してから書き込む。
//! `push` は決してブロックせず、受け付けたバイト数を返す。
//!
//! ## スレッド安全性
//!
//! 単一 producer / 単一 consumer を前提とし、内部でロックは取らない。
//! スレッドをまたぐ場合は呼び出し側で Mutex 等により保護すること。

#![no_std]
extern crate alloc;

pub mod config;
pub mod error;
pub mod stream;

pub use config::{StreamConfig, DEFAULT_CAPACITY};
pub use error::StreamError;
pub use stream::{ByteStream, Reader, StreamStats, Writer};
