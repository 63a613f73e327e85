//! Exercises the Protobuf Fetcher's framing layer end-to-end: a real
//! `ChunkedEntry` stream, encoded to bytes by `ndgr-test-support`, decoded
//! back out regardless of how the byte stream is partitioned into chunks.

use ndgr_protocol::wire;
use ndgr_test_support::fixtures;
use ndgr_test_support::framing::encode_frames;
use prost::Message;

fn decode_all_at_once(bytes: &[u8]) -> Vec<wire::ChunkedEntry> {
    let mut reader = ndgr_protocol::FramedStreamReader::new();
    reader.append(bytes);
    let mut out = Vec::new();
    while let Some(frame) = reader.extract().unwrap() {
        out.push(wire::ChunkedEntry::decode(frame.as_slice()).unwrap());
    }
    out
}

fn decode_byte_by_byte(bytes: &[u8]) -> Vec<wire::ChunkedEntry> {
    let mut reader = ndgr_protocol::FramedStreamReader::new();
    let mut out = Vec::new();
    for byte in bytes {
        reader.append(std::slice::from_ref(byte));
        while let Some(frame) = reader.extract().unwrap() {
            out.push(wire::ChunkedEntry::decode(frame.as_slice()).unwrap());
        }
    }
    out
}

#[test]
fn mixed_entry_stream_survives_arbitrary_chunk_partitioning() {
    let entries = vec![
        fixtures::chunked_entry_segment("https://example.test/seg/1", 100, 200),
        fixtures::chunked_entry_next(200),
        fixtures::chunked_entry_backward("https://example.test/backward/1"),
    ];
    let bytes = encode_frames(&entries);

    let whole = decode_all_at_once(&bytes);
    let trickled = decode_byte_by_byte(&bytes);

    assert_eq!(whole, entries);
    assert_eq!(trickled, entries);
}

#[test]
fn arbitrary_split_points_produce_identical_frames() {
    let entries: Vec<wire::ChunkedEntry> = (0..20)
        .map(|i| fixtures::chunked_entry_segment(&format!("https://example.test/seg/{i}"), i, i + 1))
        .collect();
    let bytes = encode_frames(&entries);

    // Every odd split width should decode to the same sequence.
    for chunk_size in [1usize, 2, 3, 7, 13, 64, bytes.len()] {
        let mut reader = ndgr_protocol::FramedStreamReader::new();
        let mut decoded = Vec::new();
        for chunk in bytes.chunks(chunk_size.max(1)) {
            reader.append(chunk);
            while let Some(frame) = reader.extract().unwrap() {
                decoded.push(wire::ChunkedEntry::decode(frame.as_slice()).unwrap());
            }
        }
        assert_eq!(decoded, entries, "chunk_size={chunk_size}");
    }
}
