use rand::{rngs::SmallRng, SeedableRng};
use sinkships::protocol::decode;
use sinkships::{
    AiPlayer, ChatOrigin, InMemoryTransport, Message, Phase, Session, SessionConfig, SessionNode,
    Side, TcpTransport, Transport,
};
use tokio::net::TcpListener;

fn ai_node(session: Session, seed: u64) -> SessionNode {
    SessionNode::new(
        session,
        Some(Box::new(AiPlayer::new())),
        SmallRng::seed_from_u64(seed),
        SessionConfig::default(),
    )
}

fn watcher() -> SessionNode {
    SessionNode::new(
        Session::spectator("watcher"),
        None,
        SmallRng::seed_from_u64(0),
        SessionConfig::default(),
    )
}

#[tokio::test(flavor = "multi_thread")]
async fn ai_match_with_spectator_over_memory() {
    for (seed1, seed2) in [(1, 2), (3, 4), (42, 7)] {
        let (host_end, join_end) = InMemoryTransport::pair();
        let (host_watch, watch_end) = InMemoryTransport::pair();

        let mut host = ai_node(Session::host("h"), seed1);
        host.connect_peer(host_end);
        assert!(host.attach_spectator(host_watch).is_some());
        let mut joiner = ai_node(Session::joiner("j"), seed2);
        joiner.connect_peer(join_end);
        let mut spectator = watcher();
        spectator.connect_peer(watch_end);

        let (a, b, c) = tokio::try_join!(host.run(), joiner.run(), spectator.run()).unwrap();
        let winner = a.expect("match has a winner");
        assert_eq!(b, Some(winner));
        assert_eq!(c, Some(winner));

        let loser = match winner {
            Side::Host => joiner.session(),
            Side::Joiner => host.session(),
        };
        assert!(loser.board().all_sunk());

        let watched = spectator.session();
        assert_eq!(watched.phase(), Phase::Finished);
        assert_eq!(watched.mirror(Side::Host).ships().len(), 5);
        assert_eq!(watched.mirror(Side::Joiner).ships().len(), 5);
        assert_eq!(
            watched.mirror(Side::Joiner).view().shots(),
            host.session().remote_view().shots()
        );
        assert_eq!(
            watched.mirror(Side::Host).view().shots(),
            joiner.session().remote_view().shots()
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn ai_match_over_tcp() {
    let config = SessionConfig::default();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (client, accepted) = tokio::join!(TcpTransport::connect(addr, &config), listener.accept());

    let mut host = ai_node(Session::host("h"), 10);
    host.connect_peer(TcpTransport::new(accepted.unwrap().0, &config));
    let mut joiner = ai_node(Session::joiner("j"), 11);
    joiner.connect_peer(client.unwrap());

    let (a, b) = tokio::try_join!(host.run(), joiner.run()).unwrap();
    assert!(a.is_some());
    assert_eq!(a, b);
}

#[tokio::test(flavor = "multi_thread")]
async fn spectator_attached_while_running_sees_the_end() {
    let (host_end, join_end) = InMemoryTransport::pair();
    let (host_watch, watch_end) = InMemoryTransport::pair();

    let mut host = ai_node(Session::host("h"), 5);
    host.connect_peer(host_end);
    host.spectator_attacher().attach(host_watch).unwrap();
    let mut joiner = ai_node(Session::joiner("j"), 6);
    joiner.connect_peer(join_end);
    let mut spectator = watcher();
    spectator.connect_peer(watch_end);

    let (a, _, c) = tokio::try_join!(host.run(), joiner.run(), spectator.run()).unwrap();
    assert_eq!(a, c);
}

#[tokio::test]
async fn peer_disconnect_before_the_end_is_an_error() {
    let (host_end, join_end) = InMemoryTransport::pair();
    drop(join_end);
    let mut host = ai_node(Session::host("h"), 1);
    host.connect_peer(host_end);
    let err = host.run().await.unwrap_err();
    assert!(err.to_string().contains("disconnected"), "{}", err);
}

#[tokio::test]
async fn run_without_peer_fails_fast() {
    let mut host = ai_node(Session::host("h"), 1);
    assert!(host.run().await.is_err());
}

#[tokio::test]
async fn only_hosts_take_spectators() {
    let (a, _b) = InMemoryTransport::pair();
    let mut joiner = ai_node(Session::joiner("j"), 1);
    assert!(joiner.attach_spectator(a).is_none());
}

#[tokio::test]
async fn spectator_chat_reaches_the_host_channel() {
    let (mut host_end, watch_end) = InMemoryTransport::pair();
    let mut spectator = watcher();
    spectator.connect_peer(watch_end);
    let chat = spectator.chat_input();
    chat.say("  good luck  ").unwrap();

    let host_side = async move {
        let frame = host_end.recv().await.unwrap().expect("chat frame");
        drop(host_end);
        decode(&frame).unwrap()
    };
    let (result, received) = tokio::join!(spectator.run(), host_side);

    assert_eq!(
        received,
        Message::Chat {
            from: ChatOrigin::Spectate,
            name: "watcher".to_string(),
            text: "good luck".to_string(),
        }
    );
    assert!(result.is_err());
    assert!(chat.say("anyone?").is_ok());
    drop(spectator);
    assert!(chat.say("anyone?").is_err());
}
