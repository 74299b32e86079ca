//! 順不同バイト範囲の再組み立て
//!
//! 受け取った `(first_index, data, is_last)` を、隙間のない連続したバイト列として
//! [`Writer`] に書き込む。まだ書き込めない範囲は `pending` に保持し、
//! 重なる・隣接する範囲は常に 1 つの run にまとめる。

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::cmp;

use inorder_stream::Writer;
use tracing::trace;

/// 順不同で届くバイト範囲を再組み立てするクラス
///
/// ## 不変条件
/// - `pending` の run は互いに重ならず、隣接もしない
/// - すべての run の開始位置は `next_index` より大きい
/// - `pending_bytes` は `pending` に保持しているバイト数の合計
///
/// エラーは返さない。古い・重複・ウィンドウ外のデータは黙って切り詰めるか破棄する。
#[derive(Debug, Default)]
pub struct Reassembler {
    /// 次に書き込むべきバイトの絶対インデックス（ここより前はすべて書き込み済み）
    next_index: u64,
    /// ストリーム終端の絶対インデックス（最後のバイトの次）
    ///
    /// 容量不足で切り詰められずに is_last 付きの範囲を受け付けたときだけ確定する。
    final_index: Option<u64>,
    /// 書き込み待ちの run（開始インデックス → バイト列）
    pending: BTreeMap<u64, Vec<u8>>,
    pending_bytes: u64,
}

impl Reassembler {
    /// 空の Reassembler を生成する
    pub fn new() -> Self {
        Self::default()
    }

    /// バイト範囲を受け取る
    ///
    /// # 引数
    /// - `first_index`: `data` の先頭バイトの絶対インデックス
    /// - `data`: バイト列（重複・オーバーラップしていてもよい）
    /// - `is_last`: この範囲がストリームの終端を含む
    /// - `output`: 書き込み先ストリーム
    ///
    /// 同じインデックスのバイトは常に同じ値であることを呼び出し側が保証すること。
    /// オーバーラップした範囲は和集合として扱い、内容の比較はしない。
    pub fn insert<W: Writer + ?Sized>(
        &mut self,
        first_index: u64,
        data: &[u8],
        is_last: bool,
        output: &mut W,
    ) {
        let window_end = self.next_index.saturating_add(output.available_capacity());
        let data_end = first_index.saturating_add(data.len() as u64);

        // 隙間が埋まっても容量に入らない位置から始まる範囲は丸ごと捨てる
        if first_index >= window_end {
            trace!(first_index, window_end, len = data.len(), "fragment beyond window discarded");
            return;
        }

        // 書き込み済みの先頭部分を落とす
        let (start, mut data) = if first_index < self.next_index {
            // is_last 付きでも捨てる。終端は未書き込みのバイトを含む範囲でのみ確定する
            if data_end <= self.next_index {
                trace!(first_index, next_index = self.next_index, "stale fragment discarded");
                return;
            }
            (self.next_index, &data[(self.next_index - first_index) as usize..])
        } else {
            (first_index, data)
        };

        // ウィンドウを超える末尾を落とす。切り詰めた場合は終端を確定しない
        let end = start.saturating_add(data.len() as u64);
        if end > window_end {
            data = &data[..(window_end - start) as usize];
            trace!(start, end, window_end, "fragment truncated to window");
        } else if is_last && self.final_index.is_none() {
            trace!(final_index = end, "stream end learned");
            self.final_index = Some(end);
        }

        // 終端より後ろのバイトは存在しない
        if let Some(final_index) = self.final_index {
            let keep = cmp::min(data.len() as u64, final_index.saturating_sub(start));
            data = &data[..keep as usize];
        }

        if start == self.next_index {
            if !data.is_empty() {
                let (_, run) = self.absorb(start, data);
                self.deliver(&run, output);
            }
            if self.is_complete() && !output.is_closed() {
                output.close();
            }
        } else if !data.is_empty() {
            let (run_start, run) = self.absorb(start, data);
            self.pending_bytes += run.len() as u64;
            self.pending.insert(run_start, run);
        }
    }

    /// `pending` に保持しているバイト数（前方の隙間のためにまだ書き込めない分）
    pub fn bytes_pending(&self) -> u64 {
        self.pending_bytes
    }

    /// まだ書き込まれていない最初のバイトの絶対インデックス
    ///
    /// トランスポートの受信側が ACK 番号として使う値。
    pub fn first_unassembled_index(&self) -> u64 {
        self.next_index
    }

    /// ストリーム終端のインデックスが確定しているか
    pub fn has_final_index(&self) -> bool {
        self.final_index.is_some()
    }

    /// 終端まで書き込み済みか
    fn is_complete(&self) -> bool {
        self.pending.is_empty() && matches!(self.final_index, Some(end) if self.next_index >= end)
    }

    /// 連続した run をストリームに書き込み、`next_index` を進める
    fn deliver<W: Writer + ?Sized>(&mut self, run: &[u8], output: &mut W) {
        let accepted = output.push(run);
        if accepted < run.len() as u64 {
            // 他の書き込みでウィンドウが縮んだ場合のみ。受け付けられなかった分は再送を待つ
            trace!(
                next_index = self.next_index,
                len = run.len(),
                accepted,
                "run only partially accepted by stream"
            );
        }
        self.next_index += accepted;
    }

    /// `[start, start + data.len())` と重なる・隣接する run をすべて `pending` から
    /// 取り除き、1 つにまとめた run を返す
    ///
    /// 探索は直前の run 1 つと、後続の連続した run のみ（O(log n + k)）。
    fn absorb(&mut self, start: u64, data: &[u8]) -> (u64, Vec<u8>) {
        let end = start + data.len() as u64;

        // 直前の run（開始位置が start 以下で、終端が start に届いているもの）
        let prev = self
            .pending
            .range(..=start)
            .next_back()
            .map(|(&prev_start, bytes)| (prev_start, prev_start + bytes.len() as u64))
            .filter(|&(_, prev_end)| prev_end >= start);

        let (run_start, mut run) = match prev.and_then(|(s, e)| self.take(s).map(|b| (s, e, b))) {
            Some((prev_start, prev_end, mut bytes)) => {
                if end > prev_end {
                    bytes.extend_from_slice(&data[(prev_end - start) as usize..]);
                }
                (prev_start, bytes)
            }
            None => (start, data.to_vec()),
        };

        // 後続の run（開始位置が現在の終端以下のもの）を順に吸収する
        loop {
            let run_end = run_start + run.len() as u64;
            let Some(next_start) = self.pending.range(run_start..=run_end).next().map(|(&s, _)| s)
            else {
                break;
            };
            let Some(bytes) = self.take(next_start) else {
                break;
            };
            let next_end = next_start + bytes.len() as u64;
            if next_end > run_end {
                run.extend_from_slice(&bytes[(run_end - next_start) as usize..]);
            }
        }

        (run_start, run)
    }

    fn take(&mut self, start: u64) -> Option<Vec<u8>> {
        let bytes = self.pending.remove(&start)?;
        self.pending_bytes -= bytes.len() as u64;
        Some(bytes)
    }

    /// `pending` の run を `(開始位置, 長さ)` の昇順で列挙する（テスト・診断用）
    pub fn pending_runs(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.pending
            .iter()
            .map(|(&start, bytes)| (start, bytes.len() as u64))
    }
}
