#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use sinkships::{
    init_logging, run_solo, ui, AiPlayer, CliPlayer, Player, Role, Session, SessionConfig,
    SessionNode, Side, TcpTransport,
};

#[cfg(feature = "std")]
use std::io::{self, BufRead};

#[cfg(feature = "std")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use tokio::net::TcpListener;
#[cfg(feature = "std")]
use tokio::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
#[cfg(feature = "std")]
enum PlayerType {
    Human,
    Ai,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Play against the built-in AI on this machine.
    Solo {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, default_value_t = 2000, help = "Pause before each AI reply")]
        ai_delay_ms: u64,
        #[arg(long, help = "Place each ship by hand instead of randomly")]
        manual: bool,
    },
    /// Host a match and wait for an opponent (and optional spectators).
    Host {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
        #[arg(long, help = "Accept spectators on this address")]
        spectator_bind: Option<String>,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, default_value = "Anonymous")]
        name: String,
        #[arg(long, help = "Place each ship by hand instead of randomly")]
        manual: bool,
    },
    /// Join a match hosted elsewhere.
    Join {
        #[arg(long, default_value = "127.0.0.1:8080")]
        connect: String,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, default_value = "Anonymous")]
        name: String,
        #[arg(long, help = "Place each ship by hand instead of randomly")]
        manual: bool,
    },
    /// Watch a match through the host's spectator port; typed lines are sent as chat.
    Spectate {
        #[arg(long, default_value = "127.0.0.1:8081")]
        connect: String,
        #[arg(long, default_value = "Anonymous")]
        name: String,
    },
}

#[cfg(feature = "std")]
fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => {
            println!("Using fixed seed: {} (game will be reproducible)", s);
            SmallRng::seed_from_u64(s)
        }
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

#[cfg(feature = "std")]
fn make_player(kind: PlayerType, manual: bool) -> Box<dyn Player> {
    match kind {
        PlayerType::Human => Box::new(CliPlayer::new(manual)),
        PlayerType::Ai => {
            println!("AI player selected.");
            Box::new(AiPlayer::new())
        }
    }
}

/// Session that prints every event line for `me`.
#[cfg(feature = "std")]
fn printing_session(role: Role, name: &str) -> Session {
    let me = role.side();
    Session::new(role, name).with_sink(move |event: &sinkships::SessionEvent| {
        if let Some(line) = ui::describe_event(event, me) {
            println!("{}", line);
        }
    })
}

#[cfg(feature = "std")]
fn report(result: anyhow::Result<Option<Side>>) {
    match result {
        Ok(Some(winner)) => println!("Game over, {:?} wins.", winner),
        Ok(None) => println!("Game over."),
        Err(e) => eprintln!("Game ended with an error: {}", e),
    }
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Solo {
            seed,
            ai_delay_ms,
            manual,
        } => {
            let config = SessionConfig::default().with_ai_delay(Duration::from_millis(ai_delay_ms));
            let mut rng = make_rng(seed);
            let mut session = Session::solo(&mut rng, config.display_name.clone())
                .map_err(|e| anyhow::anyhow!(e))?
                .with_sink(|event: &sinkships::SessionEvent| {
                    if let Some(line) = ui::describe_event(event, Some(Side::Host)) {
                        println!("{}", line);
                    }
                });
            let mut player = CliPlayer::new(manual);
            let winner = run_solo(&mut session, &mut player, &mut rng, &config).await?;
            println!("\nYour board:\n{}", ui::render_own_board(session.board()));
            print!("{}", ui::render_fleet_status(session.board()));
            if let Some(ai_board) = session.opponent_board() {
                println!("\nAI board:\n{}", ui::render_own_board(ai_board));
            }
            report(Ok(Some(winner)));
        }
        Commands::Host {
            bind,
            spectator_bind,
            player,
            seed,
            name,
            manual,
        } => {
            let config = SessionConfig::default().with_display_name(name);
            let listener = TcpListener::bind(&bind).await?;
            println!("Hosting at {}, waiting for an opponent...", bind);

            let mut node = SessionNode::new(
                printing_session(Role::Host, &config.display_name),
                Some(make_player(player, manual)),
                make_rng(seed),
                config.clone(),
            );
            if let Some(addr) = spectator_bind {
                let spectators = TcpListener::bind(&addr).await?;
                println!("Spectators may connect at {}", addr);
                let attacher = node.spectator_attacher();
                let spectator_config = config.clone();
                tokio::spawn(async move {
                    while let Ok((stream, peer)) = spectators.accept().await {
                        log::info!("spectator connected from {}", peer);
                        if attacher
                            .attach(TcpTransport::new(stream, &spectator_config))
                            .is_err()
                        {
                            break;
                        }
                    }
                });
            }

            let (stream, addr) = listener.accept().await?;
            println!("Opponent connected from {}", addr);
            stream.set_nodelay(true)?;
            node.connect_peer(TcpTransport::new(stream, &config));
            report(node.run().await);
        }
        Commands::Join {
            connect,
            player,
            seed,
            name,
            manual,
        } => {
            let config = SessionConfig::default().with_display_name(name);
            println!("Connecting to {}...", connect);
            let transport = TcpTransport::connect(&connect, &config).await?;
            println!("Connected successfully!");
            let mut node = SessionNode::new(
                printing_session(Role::Joiner, &config.display_name),
                Some(make_player(player, manual)),
                make_rng(seed),
                config.clone(),
            );
            node.connect_peer(transport);
            report(node.run().await);
        }
        Commands::Spectate { connect, name } => {
            let config = SessionConfig::default().with_display_name(name);
            println!("Connecting to {} as a spectator...", connect);
            let transport = TcpTransport::connect(&connect, &config).await?;
            let mut node = SessionNode::new(
                printing_session(Role::Spectator, &config.display_name),
                None,
                make_rng(None),
                config.clone(),
            );
            node.connect_peer(transport);
            let chat = node.chat_input();
            // Blocking stdin reader; the process exits without joining it.
            std::thread::spawn(move || {
                for line in io::stdin().lock().lines() {
                    let Ok(line) = line else { break };
                    if chat.say(line).is_err() {
                        break;
                    }
                }
            });
            let result = node.run().await;
            let session = node.session();
            for side in [Side::Host, Side::Joiner] {
                println!("\n{:?} board:\n{}", side, ui::render_mirror(session.mirror(side)));
            }
            report(result);
        }
    }
    Ok(())
}
