//! Interactive terminal client for Izakaya.
//!
//! Runs against the in-memory store seeded with the demo community, so
//! several instances in one process would see each other; a single
//! instance still exercises the full loop (action -> write -> broadcast
//! -> subscription -> state).

use std::sync::Arc;

use clap::Parser;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use izakaya_client::domain::{
    GameKind, GameStatus, IdentityProvider, RemoteStore, RoomId, UserId,
    tictactoe::{Mark, Match},
};
use izakaya_client::infrastructure::{InMemoryStore, StaticIdentity};
use izakaya_client::state::AppState;
use izakaya_client::{Client, demo};

#[derive(Debug, Parser)]
#[command(name = "izakaya-client", about = "Room-based chat with embedded games")]
struct Args {
    /// Demo user to sign in as (alice, bob, carol or dave)
    #[arg(long, default_value = "alice")]
    username: String,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "izakaya_client=info")]
    log_level: String,

    /// Room to select right after start
    #[arg(long)]
    room: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    izakaya_shared::logger::init(&args.log_level);

    let store = Arc::new(InMemoryStore::new());
    let usernames = demo::seed(store.as_ref()).await;
    if !usernames.contains(&args.username) {
        eprintln!(
            "unknown demo user '{}'; pick one of: {}",
            args.username,
            usernames.join(", ")
        );
        std::process::exit(1);
    }

    let user_id = UserId::new(args.username.clone())?;
    store.set_profile_online(&user_id, true).await?;
    let identity = Arc::new(StaticIdentity::signed_in(user_id));
    let mut auth_events = identity.auth_events();

    let mut client = Client::new(store, identity.clone());
    client.initialize().await?;

    if let Some(room) = &args.room
        && let Err(error) = select_room(&mut client, room).await
    {
        eprintln!("could not select room '{room}': {error}");
    }

    // Line input runs on its own thread; the async side consumes a channel.
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    std::thread::spawn(move || {
        let mut editor = match rustyline::DefaultEditor::new() {
            Ok(editor) => editor,
            Err(error) => {
                eprintln!("failed to start line editor: {error}");
                return;
            }
        };
        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    let _ = line_tx.send("/quit".to_string());
                    break;
                }
                Err(error) => {
                    eprintln!("input error: {error}");
                    break;
                }
            }
        }
    });

    println!("signed in as {}. /help for commands.", args.username);

    let mut console = Console::default();
    let mut observer = client.state().observe();
    console.render(&client.state().snapshot());

    loop {
        tokio::select! {
            // The session gates the chat surface: a sign-out ends the loop.
            changed = auth_events.changed() => {
                if changed.is_err() || auth_events.borrow().is_none() {
                    println!("session ended");
                    break;
                }
            }
            changed = observer.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Err(error) = client.sync_game().await {
                    tracing::warn!(%error, "game sync failed");
                }
                console.render(&client.state().snapshot());
            }
            line = line_rx.recv() => {
                let Some(line) = line else { break };
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                match handle_line(&mut client, &line).await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(error) => eprintln!("error: {error}"),
                }
            }
        }
    }

    client.logout().await;
    Ok(())
}

/// Prints messages of the selected room as they arrive.
#[derive(Default)]
struct Console {
    room: Option<RoomId>,
    printed: usize,
}

impl Console {
    fn render(&mut self, state: &AppState) {
        let Some(room) = &state.current_room else {
            return;
        };
        if self.room.as_ref() != Some(&room.id) {
            self.room = Some(room.id.clone());
            self.printed = 0;
            println!("--- {} ---", room.name);
        }
        let messages = state.room_messages(&room.id);
        for message in &messages[self.printed.min(messages.len())..] {
            let time = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(message.created_at.value())
                .map(|at| at.format("%H:%M").to_string())
                .unwrap_or_else(|| "--:--".to_string());
            if message.is_system {
                println!("  [{time}] * {}", message.content);
            } else {
                println!(
                    "  [{time}] <{}> {}",
                    state.username(&message.user_id),
                    message.content
                );
            }
        }
        self.printed = messages.len();
    }
}

async fn select_room(client: &mut Client, wanted: &str) -> Result<(), Box<dyn std::error::Error>> {
    let room_id = client.state().select(|state| {
        state
            .rooms
            .values()
            .find(|room| {
                room.name.as_str().eq_ignore_ascii_case(wanted) || room.id.as_str() == wanted
            })
            .map(|room| room.id.clone())
    });
    match room_id {
        Some(room_id) => {
            client.select_room(&room_id).await?;
            Ok(())
        }
        None => Err(format!("no visible room named '{wanted}'").into()),
    }
}

fn print_board(board: &Match) {
    for row in 0..3 {
        let cells: Vec<&str> = (0..3)
            .map(|col| match board.board().get(row, col) {
                Some(Mark::X) => "X",
                Some(Mark::O) => "O",
                None => ".",
            })
            .collect();
        println!("  {}", cells.join(" "));
    }
}

fn print_help() {
    println!("commands:");
    println!("  /rooms                list visible rooms");
    println!("  /join <room>          select a room (and join its member list)");
    println!("  /leave                leave the selected room");
    println!("  /create <name>        create a room and switch to it");
    println!("  /game <kind>          start a game (tic-tac-toe, hangman, ...)");
    println!("  /joingame             join the room's active game");
    println!("  /play <row> <col>     claim a cell (0-2)");
    println!("  /again                play again after the match is decided");
    println!("  /board                show the board");
    println!("  /endgame              end the active game");
    println!("  /who                  list room members and players");
    println!("  /quit                 sign out and exit");
    println!("anything else is sent as a chat message");
}

/// Returns false when the client should exit.
async fn handle_line(client: &mut Client, line: &str) -> Result<bool, Box<dyn std::error::Error>> {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "/help" => print_help(),
        "/quit" => return Ok(false),

        "/rooms" => {
            let rooms = client.state().select(|state| {
                let mut rooms: Vec<_> = state
                    .rooms
                    .values()
                    .map(|room| {
                        (
                            room.name.as_str().to_string(),
                            room.members.len(),
                            room.is_private,
                        )
                    })
                    .collect();
                rooms.sort();
                rooms
            });
            for (name, members, is_private) in rooms {
                let marker = if is_private { " (private)" } else { "" };
                println!("  {name}{marker} - {members} member(s)");
            }
        }

        "/join" => {
            select_room(client, rest).await?;
            let room_id = client
                .state()
                .select(|state| state.current_room.as_ref().map(|room| room.id.clone()));
            if let Some(room_id) = room_id {
                client.join_room(&room_id).await?;
            }
        }

        "/leave" => {
            let room_id = client
                .state()
                .select(|state| state.current_room.as_ref().map(|room| room.id.clone()));
            match room_id {
                Some(room_id) => client.leave_room(&room_id).await?,
                None => println!("no room selected"),
            }
        }

        "/create" => {
            if rest.is_empty() {
                println!("usage: /create <name>");
            } else {
                let room = client.create_room(rest.to_string(), None, false).await?;
                println!("created {}", room.name);
            }
        }

        "/game" => {
            let Some(kind) = GameKind::from_slug(rest) else {
                let slugs: Vec<_> = GameKind::ALL.iter().map(|k| k.slug()).collect();
                println!("unknown game '{rest}'; available: {}", slugs.join(", "));
                return Ok(true);
            };
            let game = client.start_game(kind).await?;
            if kind.has_rules() {
                println!("started {} (waiting for players)", game.name);
            } else {
                println!("started {} (no rule engine in this client yet)", game.name);
            }
        }

        "/joingame" => {
            let game = client.join_game().await?;
            if game.status == GameStatus::Active {
                println!("game on!");
            } else {
                println!("joined; waiting for more players");
            }
        }

        "/play" => {
            let coordinates: Vec<Option<usize>> =
                rest.split_whitespace().map(|p| p.parse().ok()).collect();
            match coordinates.as_slice() {
                [Some(row), Some(col)] => {
                    let result = client.play(*row, *col).await?;
                    if let Some(board) = client.board() {
                        print_board(board);
                    }
                    println!("{result:?}");
                }
                _ => println!("usage: /play <row> <col>"),
            }
        }

        "/again" => {
            client.play_again().await?;
            println!("rematch! X moves first");
        }

        "/board" => match client.board() {
            Some(board) => print_board(board),
            None => println!("no board yet"),
        },

        "/endgame" => {
            client.end_game().await?;
        }

        "/who" => {
            let listing = client.state().select(|state| {
                state.current_room.as_ref().map(|room| {
                    let members: Vec<String> = room
                        .members
                        .iter()
                        .map(|id| {
                            let online = state
                                .users
                                .get(id)
                                .map(|user| user.is_online)
                                .unwrap_or(false);
                            let marker = if online { "+" } else { "-" };
                            format!("{marker}{}", state.username(id))
                        })
                        .collect();
                    let players: Vec<String> = state
                        .active_game()
                        .map(|game| {
                            game.players
                                .iter()
                                .map(|id| state.username(id).to_string())
                                .collect()
                        })
                        .unwrap_or_default();
                    (members, players)
                })
            });
            match listing {
                Some((members, players)) => {
                    println!("members: {}", members.join(", "));
                    if !players.is_empty() {
                        println!("playing: {}", players.join(" vs "));
                    }
                }
                None => println!("no room selected"),
            }
        }

        _ if command.starts_with('/') => {
            println!("unknown command {command}; /help for commands");
        }

        _ => {
            client.send_message(line.to_string()).await?;
        }
    }

    Ok(true)
}
