use std::time::Duration;

use sinkships::transport::channel::{spawn_channel, ChannelEvent};
use sinkships::{InMemoryTransport, SessionConfig, Source, TcpTransport, Transport};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

async fn tcp_pair(config: &SessionConfig) -> (TcpTransport, TcpTransport) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (client, accepted) = tokio::join!(TcpTransport::connect(addr, config), listener.accept());
    let (stream, _) = accepted.unwrap();
    (TcpTransport::new(stream, config), client.unwrap())
}

#[tokio::test]
async fn in_memory_frames_arrive_in_order() {
    let (mut a, mut b) = InMemoryTransport::pair();
    a.send(b"one".to_vec()).await.unwrap();
    a.send(b"two".to_vec()).await.unwrap();
    b.send(b"back".to_vec()).await.unwrap();
    assert_eq!(b.recv().await.unwrap(), Some(b"one".to_vec()));
    assert_eq!(b.recv().await.unwrap(), Some(b"two".to_vec()));
    assert_eq!(a.recv().await.unwrap(), Some(b"back".to_vec()));
}

#[tokio::test]
async fn in_memory_close_is_seen_by_both_ends() {
    let (mut a, b) = InMemoryTransport::pair();
    drop(b);
    assert_eq!(a.recv().await.unwrap(), None);
    assert!(a.send(b"lost".to_vec()).await.is_err());
}

#[tokio::test]
async fn tcp_round_trip() {
    let config = SessionConfig::default();
    let (mut server, mut client) = tcp_pair(&config).await;
    client.send(br#"{"type":"ready","who":"join"}"#.to_vec()).await.unwrap();
    server.send(vec![7u8; 10_000]).await.unwrap();
    assert_eq!(
        server.recv().await.unwrap(),
        Some(br#"{"type":"ready","who":"join"}"#.to_vec())
    );
    assert_eq!(client.recv().await.unwrap(), Some(vec![7u8; 10_000]));
}

#[tokio::test]
async fn tcp_clean_close_reads_as_none() {
    let config = SessionConfig::default();
    let (mut server, client) = tcp_pair(&config).await;
    drop(client);
    assert_eq!(server.recv().await.unwrap(), None);
}

#[tokio::test]
async fn tcp_refuses_oversized_frames() {
    let config = SessionConfig::default().with_max_frame_size(16);
    let (mut server, mut client) = tcp_pair(&config).await;
    assert!(client.send(vec![0u8; 17]).await.is_err());
    assert!(client.send(Vec::new()).await.is_err());
    client.send(vec![1u8; 16]).await.unwrap();
    assert_eq!(server.recv().await.unwrap(), Some(vec![1u8; 16]));
}

#[tokio::test]
async fn tcp_rejects_oversized_length_prefix() {
    let config = SessionConfig::default().with_max_frame_size(64);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (raw, accepted) = tokio::join!(TcpStream::connect(addr), listener.accept());
    let mut raw = raw.unwrap();
    let mut server = TcpTransport::new(accepted.unwrap().0, &config);

    raw.write_all(&1_000_000u32.to_be_bytes()).await.unwrap();
    let err = server.recv().await.unwrap_err();
    assert!(err.to_string().contains("too large"), "{}", err);
}

#[tokio::test]
async fn tcp_reassembles_split_frames() {
    let config = SessionConfig::default();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (raw, accepted) = tokio::join!(TcpStream::connect(addr), listener.accept());
    let mut raw = raw.unwrap();
    raw.set_nodelay(true).unwrap();
    let mut server = TcpTransport::new(accepted.unwrap().0, &config);

    let reader = tokio::spawn(async move {
        let first = server.recv().await.unwrap();
        let second = server.recv().await.unwrap();
        (first, second)
    });
    raw.write_all(&[0, 0, 0, 5, b'h', b'e']).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    raw.write_all(&[b'l', b'l', b'o', 0, 0, 0, 2, b'o', b'k']).await.unwrap();

    let (first, second) = reader.await.unwrap();
    assert_eq!(first, Some(b"hello".to_vec()));
    assert_eq!(second, Some(b"ok".to_vec()));
}

#[tokio::test]
async fn tcp_truncated_frame_is_an_error() {
    let config = SessionConfig::default();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (raw, accepted) = tokio::join!(TcpStream::connect(addr), listener.accept());
    let mut raw = raw.unwrap();
    let mut server = TcpTransport::new(accepted.unwrap().0, &config);

    raw.write_all(&[0, 0, 0, 9, 1, 2]).await.unwrap();
    drop(raw);
    assert!(server.recv().await.is_err());
}

#[tokio::test]
async fn channel_forwards_frames_and_reports_close() {
    let (near, mut far) = InMemoryTransport::pair();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let handle = spawn_channel(Source::Peer, near, events_tx);

    far.send(b"ping".to_vec()).await.unwrap();
    assert_eq!(
        events.recv().await,
        Some(ChannelEvent::Frame(Source::Peer, b"ping".to_vec()))
    );

    handle.send(b"pong".to_vec()).unwrap();
    assert_eq!(far.recv().await.unwrap(), Some(b"pong".to_vec()));

    drop(far);
    assert_eq!(events.recv().await, Some(ChannelEvent::Closed(Source::Peer, None)));
    drop(handle);
}

#[tokio::test]
async fn channel_shutdown_flushes_queued_frames() {
    let (near, mut far) = InMemoryTransport::pair();
    let (events_tx, _events) = mpsc::unbounded_channel();
    let handle = spawn_channel(Source::Peer, near, events_tx);
    for i in 0..10u8 {
        handle.send(vec![i]).unwrap();
    }
    handle.shutdown(Duration::from_secs(1)).await;
    for i in 0..10u8 {
        assert_eq!(far.recv().await.unwrap(), Some(vec![i]));
    }
    assert_eq!(far.recv().await.unwrap(), None);
}
