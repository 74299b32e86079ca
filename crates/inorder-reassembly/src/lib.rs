//! # inorder-reassembly
//!
//! 順不同で届くバイト範囲を再組み立てし、[`inorder_stream::ByteStream`] に
//! 順番通りに書き込むレイヤー。
//!
//! ## 受信パイプライン
//!
//! ```text
//!   (first_index, data, is_last)      ← 外部のフレーミング層が解析済み
//!        │ 順不同・重複・オーバーラップあり
//!        ▼
//!   Reassembler ── pending: 互いに重ならず隣接もしない run の集合
//!        │ 隙間が埋まった分だけ、順番通りに 1 回ずつ
//!        ▼
//!   ByteStream (Writer) ──► アプリケーション (Reader)
//! ```
//!
//! ## インデックスウィンドウ
//!
//! 受け付けるのは `[next_index, next_index + available_capacity)` の範囲のみ。
//! それより後ろのバイトは、隙間が埋まっても書き込めないので破棄する。
//! アプリケーションが pop して容量が空けば、ウィンドウは前に進む。

#![no_std]
extern crate alloc;

pub mod pipeline;
pub mod reassembler;

pub use pipeline::{ReassembledStream, ReassemblyStats};
pub use reassembler::Reassembler;
