//! 再組み立ての性質テスト
//!
//! 任意の順序・重複・オーバーラップで範囲を投入しても、
//! 元のバイト列が順番通りに 1 回ずつ届くことを proptest で確認する。

use inorder_reassembly::Reassembler;
use inorder_stream::{ByteStream, Reader, Writer};
use proptest::prelude::*;

// ==============================================================
// ヘルパー
// ==============================================================

/// 元データと、それを隙間なく覆う範囲 `(start, end)` の列（順不同）
fn covering_fragments() -> impl Strategy<Value = (Vec<u8>, Vec<(usize, usize)>)> {
    (1usize..200)
        .prop_flat_map(|n| {
            (
                proptest::collection::vec(any::<u8>(), n),
                proptest::collection::vec(0..n, 0..12),
                proptest::collection::vec((0..n, 1..=n), 0..12),
            )
        })
        .prop_flat_map(|(data, mut cuts, extra)| {
            let n = data.len();
            cuts.push(0);
            cuts.push(n);
            cuts.sort_unstable();
            cuts.dedup();

            let mut frags: Vec<(usize, usize)> = cuts.windows(2).map(|w| (w[0], w[1])).collect();
            // オーバーラップする余分な範囲
            frags.extend(extra.into_iter().map(|(s, len)| (s, (s + len).min(n))));

            (Just(data), Just(frags).prop_shuffle())
        })
}

fn insert_fragment(r: &mut Reassembler, out: &mut ByteStream, data: &[u8], (start, end): (usize, usize)) {
    r.insert(start as u64, &data[start..end], end == data.len(), out);
}

/// pending の run が互いに重ならず隣接もせず、すべて next_index より後ろにあること
fn assert_runs_minimal(r: &Reassembler) {
    let runs: Vec<(u64, u64)> = r.pending_runs().collect();
    for &(start, len) in &runs {
        assert!(len > 0);
        assert!(start > r.first_unassembled_index());
    }
    for pair in runs.windows(2) {
        let (a_start, a_len) = pair[0];
        let (b_start, _) = pair[1];
        assert!(a_start + a_len < b_start, "runs overlap or touch: {:?}", pair);
    }
    let total: u64 = runs.iter().map(|&(_, len)| len).sum();
    assert_eq!(total, r.bytes_pending());
}

// ==============================================================
// 性質
// ==============================================================

proptest! {
    #[test]
    fn capacity_never_exceeded(capacity in 1u64..64, ops in proptest::collection::vec((0usize..40, 0u64..40), 0..50)) {
        let mut s = ByteStream::new(capacity).unwrap();
        for (push_len, pop_len) in ops {
            let before = s.bytes_pushed();
            let accepted = s.push(&vec![7u8; push_len]);
            prop_assert_eq!(s.bytes_pushed() - before, accepted);
            prop_assert!(s.bytes_buffered() <= capacity);

            s.pop(pop_len);
            prop_assert!(s.bytes_buffered() <= capacity);
            prop_assert_eq!(s.bytes_pushed() - s.bytes_popped(), s.bytes_buffered());
        }
    }

    #[test]
    fn delivers_original_bytes_in_order((data, frags) in covering_fragments()) {
        let mut out = ByteStream::new(data.len() as u64).unwrap();
        let mut r = Reassembler::new();

        for &frag in &frags {
            insert_fragment(&mut r, &mut out, &data, frag);
            assert_runs_minimal(&r);
        }

        prop_assert_eq!(out.peek(), &data[..]);
        prop_assert_eq!(out.bytes_pushed(), data.len() as u64);
        prop_assert_eq!(r.bytes_pending(), 0);
        prop_assert!(out.is_closed());
    }

    #[test]
    fn duplicate_inserts_change_nothing((data, frags) in covering_fragments()) {
        let mut out = ByteStream::new(data.len() as u64).unwrap();
        let mut r = Reassembler::new();

        for &frag in &frags {
            insert_fragment(&mut r, &mut out, &data, frag);
            let pushed = out.bytes_pushed();
            let pending = r.bytes_pending();

            insert_fragment(&mut r, &mut out, &data, frag);
            prop_assert_eq!(out.bytes_pushed(), pushed);
            prop_assert_eq!(r.bytes_pending(), pending);
        }

        prop_assert_eq!(out.peek(), &data[..]);
    }

    #[test]
    fn small_capacity_with_retransmission(
        (data, frags) in covering_fragments(),
        capacity in 1u64..16,
        read_size in 1u64..8,
    ) {
        let mut out = ByteStream::new(capacity).unwrap();
        let mut r = Reassembler::new();
        let mut received = Vec::new();

        // 1 ラウンドで最低 1 バイトは進むので、データ長 + 1 ラウンドで必ず終わる
        for _ in 0..=data.len() {
            for &frag in &frags {
                insert_fragment(&mut r, &mut out, &data, frag);
                prop_assert!(out.bytes_buffered() <= capacity);
                assert_runs_minimal(&r);
                received.extend(out.read(read_size));
            }
            received.extend(out.read(u64::MAX));
            if out.is_finished() {
                break;
            }
        }

        prop_assert_eq!(&received[..], &data[..]);
        prop_assert!(out.is_finished());
    }

    #[test]
    fn never_closes_without_final_byte((data, frags) in covering_fragments()) {
        let mut out = ByteStream::new(data.len() as u64).unwrap();
        let mut r = Reassembler::new();

        for &(start, end) in frags.iter().filter(|&&(_, end)| end < data.len()) {
            insert_fragment(&mut r, &mut out, &data, (start, end));
            prop_assert!(!out.is_closed());
        }
        prop_assert!(!r.has_final_index());
    }

    #[test]
    fn fragment_beyond_window_is_ignored(
        (data, frags) in covering_fragments(),
        keep in 0usize..12,
        offset in 0u64..100,
        junk in proptest::collection::vec(any::<u8>(), 0..20),
        is_last in any::<bool>(),
    ) {
        let mut out = ByteStream::new(data.len() as u64).unwrap();
        let mut r = Reassembler::new();
        for &frag in frags.iter().take(keep) {
            insert_fragment(&mut r, &mut out, &data, frag);
        }

        let window_end = r.first_unassembled_index() + out.available_capacity();
        let runs_before: Vec<(u64, u64)> = r.pending_runs().collect();
        let stats_before = out.stats();
        let final_before = r.has_final_index();

        r.insert(window_end + offset, &junk, is_last, &mut out);

        prop_assert_eq!(r.pending_runs().collect::<Vec<_>>(), runs_before);
        prop_assert_eq!(out.stats(), stats_before);
        prop_assert_eq!(r.has_final_index(), final_before);
    }
}
