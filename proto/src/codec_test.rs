use super::*;
use crate::{AudioChunk, AudioFormat, AudioStop, Describe, Eventable, Transcribe, Transcript};
use futures_util::{SinkExt, StreamExt};
use tokio_util::codec::{FramedRead, FramedWrite};

fn encode(event: Event) -> BytesMut {
    let mut buf = BytesMut::new();
    WyomingCodec::new().encode(event, &mut buf).unwrap();
    buf
}

#[test]
fn test_encode_event_without_data() {
    let buf = encode(Describe {}.to_event());
    assert_eq!(&buf[..], b"{\"type\":\"describe\",\"version\":\"1.5.4\"}\n");
}

#[test]
fn test_encode_writes_data_then_payload() {
    let chunk = AudioChunk::new(AudioFormat::new(16000, 2, 1), vec![1u8, 2, 3, 4]);
    let buf = encode(chunk.to_event());

    let newline = buf.iter().position(|b| *b == b'\n').unwrap();
    let header: Value = serde_json::from_slice(&buf[..newline]).unwrap();
    assert_eq!(header["type"], "audio-chunk");
    assert_eq!(header["payload_length"], 4);

    let data_length = header["data_length"].as_u64().unwrap() as usize;
    let data: Value = serde_json::from_slice(&buf[newline + 1..newline + 1 + data_length]).unwrap();
    assert_eq!(data["rate"], 16000);
    assert_eq!(data["width"], 2);
    assert_eq!(data["channels"], 1);
    assert_eq!(&buf[newline + 1 + data_length..], &[1, 2, 3, 4]);
}

#[test]
fn test_decode_waits_for_complete_event() {
    let full = encode(Transcript {
        text: "hello".to_string(),
        language: None,
    }
    .to_event());
    let mut codec = WyomingCodec::new();

    let mut partial = BytesMut::from(&full[..full.len() - 3]);
    assert!(codec.decode(&mut partial).unwrap().is_none());

    partial.extend_from_slice(&full[full.len() - 3..]);
    let event = codec.decode(&mut partial).unwrap().unwrap();
    let transcript = Transcript::from_event(&event).unwrap();
    assert_eq!(transcript.text, "hello");
    assert!(partial.is_empty());
}

#[test]
fn test_decode_inline_data_from_older_peers() {
    let mut buf = BytesMut::from(&b"{\"type\":\"transcribe\",\"data\":{\"language\":\"de\"}}\n"[..]);
    let event = WyomingCodec::new().decode(&mut buf).unwrap().unwrap();

    let transcribe = Transcribe::from_event(&event).unwrap();
    assert_eq!(transcribe.language.as_deref(), Some("de"));
}

#[test]
fn test_decode_separate_data_overrides_inline() {
    let body = b"{\"language\":\"fr\"}";
    let header = format!(
        "{{\"type\":\"transcribe\",\"data\":{{\"language\":\"de\",\"name\":\"base\"}},\"data_length\":{}}}\n",
        body.len()
    );
    let mut buf = BytesMut::from(header.as_bytes());
    buf.extend_from_slice(body);

    let event = WyomingCodec::new().decode(&mut buf).unwrap().unwrap();
    let transcribe = Transcribe::from_event(&event).unwrap();
    assert_eq!(transcribe.language.as_deref(), Some("fr"));
    assert_eq!(transcribe.name.as_deref(), Some("base"));
}

#[test]
fn test_decode_skips_blank_lines() {
    let mut buf = BytesMut::from(&b"\n\r\n{\"type\":\"audio-stop\"}\n"[..]);
    let event = WyomingCodec::new().decode(&mut buf).unwrap().unwrap();
    assert!(event.is::<AudioStop>());
}

#[test]
fn test_decode_unknown_type_is_preserved() {
    let mut buf = BytesMut::from(&b"{\"type\":\"run-pipeline\",\"data\":{\"x\":1}}\n"[..]);
    let event = WyomingCodec::new().decode(&mut buf).unwrap().unwrap();
    assert_eq!(event.event_type, "run-pipeline");
    assert_eq!(event.data["x"], 1);
}

#[test]
fn test_decode_rejects_long_header() {
    let mut codec = WyomingCodec::with_limits(16, MAX_BODY_LENGTH);
    let mut buf = BytesMut::from(&b"{\"type\":\"describe\",\"padding\":\"xxxxxxxx\"}"[..]);
    let err = codec.decode(&mut buf).unwrap_err();
    assert!(matches!(err, ProtocolError::LineTooLong { limit: 16 }));
}

#[test]
fn test_decode_rejects_oversized_payload() {
    let mut codec = WyomingCodec::with_limits(MAX_LINE_LENGTH, 8);
    let mut buf = BytesMut::from(&b"{\"type\":\"audio-chunk\",\"payload_length\":9}\n"[..]);
    let err = codec.decode(&mut buf).unwrap_err();
    assert!(matches!(err, ProtocolError::PayloadTooLarge { length: 9, limit: 8 }));
}

#[test]
fn test_decode_rejects_header_without_type() {
    let mut buf = BytesMut::from(&b"{\"data\":{}}\n"[..]);
    let err = WyomingCodec::new().decode(&mut buf).unwrap_err();
    assert!(matches!(err, ProtocolError::Json(_)));
}

#[tokio::test]
async fn test_framed_stream_carries_sequence_of_events() {
    let (client, server) = tokio::io::duplex(64);
    let format = AudioFormat::new(16000, 2, 1);

    let writer = tokio::spawn(async move {
        let mut sink = FramedWrite::new(client, WyomingCodec::new());
        sink.send(Transcribe::default().to_event()).await.unwrap();
        sink.send(AudioChunk::new(format, vec![7u8; 300]).to_event())
            .await
            .unwrap();
        sink.send(AudioStop::default().to_event()).await.unwrap();
    });

    let mut stream = FramedRead::new(server, WyomingCodec::new());
    let first = stream.next().await.unwrap().unwrap();
    let second = stream.next().await.unwrap().unwrap();
    let third = stream.next().await.unwrap().unwrap();
    writer.await.unwrap();

    assert!(first.is::<Transcribe>());
    let chunk = AudioChunk::from_event(&second).unwrap();
    assert_eq!(chunk.format, format);
    assert_eq!(chunk.audio.len(), 300);
    assert!(third.is::<AudioStop>());
    assert!(stream.next().await.is_none());
}
