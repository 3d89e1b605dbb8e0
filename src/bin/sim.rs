use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;
use sinkships::{AiPlayer, InMemoryTransport, Session, SessionConfig, SessionNode, Side};

fn side_name(side: Option<Side>) -> Option<&'static str> {
    side.map(|s| match s {
        Side::Host => "host",
        Side::Joiner => "join",
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <seed1> <seed2>", args[0]);
        std::process::exit(1);
    }
    let seed1: u64 = args[1].parse()?;
    let seed2: u64 = args[2].parse()?;
    let config = SessionConfig::default();

    let (host_end, join_end) = InMemoryTransport::pair();
    let (host_watch, spectator_end) = InMemoryTransport::pair();

    let mut host = SessionNode::new(
        Session::host("host-ai"),
        Some(Box::new(AiPlayer::new())),
        SmallRng::seed_from_u64(seed1),
        config.clone(),
    );
    host.connect_peer(host_end);
    host.attach_spectator(host_watch);

    let mut joiner = SessionNode::new(
        Session::joiner("join-ai"),
        Some(Box::new(AiPlayer::new())),
        SmallRng::seed_from_u64(seed2),
        config.clone(),
    );
    joiner.connect_peer(join_end);

    let mut spectator = SessionNode::new(
        Session::spectator("observer"),
        None,
        SmallRng::seed_from_u64(0),
        config,
    );
    spectator.connect_peer(spectator_end);

    let (host_winner, join_winner, watched_winner) =
        tokio::try_join!(host.run(), joiner.run(), spectator.run())?;

    let host_shots = host.session().remote_view().shots().len();
    let join_shots = joiner.session().remote_view().shots().len();
    let watched = spectator.session();

    let result = json!({
        "host": {"shots": host_shots, "hits": host.session().remote_view().hits().len()},
        "join": {"shots": join_shots, "hits": joiner.session().remote_view().hits().len()},
        "winner": side_name(host_winner),
        "agreed": host_winner == join_winner && join_winner == watched_winner,
        "spectator": {
            "winner": side_name(watched_winner),
            "host_ships_revealed": watched.mirror(Side::Host).ships().len(),
            "join_ships_revealed": watched.mirror(Side::Joiner).ships().len(),
        },
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
