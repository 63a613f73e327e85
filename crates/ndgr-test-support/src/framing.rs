//! Encodes a sequence of protobuf messages into the length-prefixed wire
//! format the Framed-Stream Reader decodes, for use by mock HTTP servers.

use prost::Message;

/// Encode `messages` as a concatenation of `varint(len) || bytes` frames.
pub fn encode_frames<M: Message>(messages: &[M]) -> Vec<u8> {
    let mut out = Vec::new();
    for msg in messages {
        let len = msg.encoded_len();
        encode_varint(len as u64, &mut out);
        msg.encode(&mut out).expect("encode protobuf message");
    }
    out
}

fn encode_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
}
