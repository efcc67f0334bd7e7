//! Fuzz target: `FrameDecoder` + `RpcMessage::decode`
//!
//! Feeds arbitrary bytes into the streaming decoder in two uneven chunks
//! and decodes every frame it yields. Neither step may panic, and no
//! frame may exceed the configured limit.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use kbrpc::rpc::{FrameDecoder, RpcMessage};
use libfuzzer_sys::fuzz_target;

const MAX: usize = 4096;

fuzz_target!(|data: &[u8]| {
    let mut decoder = FrameDecoder::new(MAX);
    let split = data.first().map_or(0, |b| *b as usize % (data.len() + 1));

    for chunk in [&data[..split], &data[split..]] {
        decoder.feed(chunk);
        loop {
            match decoder.next_frame() {
                Ok(Some(frame)) => {
                    assert!(frame.len() <= MAX, "frame exceeds max_frame_size");
                    let _ = RpcMessage::decode(&frame);
                }
                Ok(None) | Err(_) => break,
            }
        }
    }

    // After a reset the decoder must accept bytes cleanly again.
    decoder.reset();
    decoder.feed(data);
    let _ = decoder.next_frame();
});
