//! Orchestrates one run: loads the board, drives the broker through
//! Init/Start/ProgressAll, polls Count, and reacts to keyboard commands.

use std::path::Path;
use std::time::Duration;

use gol_common::board::Board;
use gol_common::events::{emit_turn_diff, LoggingSink, RunPhase, VisualizationEvent, VisualizationSink};
use gol_common::image;
use gol_proto::broker_service_client::BrokerServiceClient;
use gol_proto::{BrokerInitRequest, BrokerStartRequest, Empty};
use rand::Rng;
use tonic::transport::{Channel, Endpoint};

use crate::cli::Cli;
use crate::error::ClientError;
use crate::keyboard::{self, Command};

fn load_or_generate_board(cli: &Cli) -> Result<Board, ClientError> {
    let path = Path::new(&cli.image_dir).join(image::input_filename(cli.height, cli.width));
    match image::read_pgm(&path) {
        Ok(board) => {
            tracing::info!(path = %path.display(), "loaded initial board");
            Ok(board)
        }
        Err(_) => {
            tracing::info!(
                path = %path.display(),
                "no input board found, generating random board"
            );
            Ok(random_board(cli.width, cli.height, cli.random_alive_fraction))
        }
    }
}

fn random_board(width: u32, height: u32, alive_fraction: f64) -> Board {
    let mut board = Board::new_dead(width, height);
    let mut rng = rand::thread_rng();
    for cell in board.cells.iter_mut() {
        if rng.gen_bool(alive_fraction) {
            *cell = gol_common::board::ALIVE;
        }
    }
    board
}

async fn dial_broker(address: &str) -> Result<BrokerServiceClient<Channel>, ClientError> {
    let endpoint = Endpoint::from_shared(format!("http://{address}")).map_err(|source| {
        ClientError::Dial {
            address: address.to_string(),
            source,
        }
    })?;
    let channel = endpoint
        .connect()
        .await
        .map_err(|source| ClientError::Dial {
            address: address.to_string(),
            source,
        })?;
    Ok(BrokerServiceClient::new(channel))
}

pub async fn run(cli: Cli) -> Result<(), ClientError> {
    cli.validate().map_err(ClientError::Configuration)?;

    let initial = load_or_generate_board(&cli)?;
    let mut broker = dial_broker(&cli.broker_address).await?;

    let mut sink: Box<dyn VisualizationSink> = Box::new(LoggingSink);
    // The initial load is itself an observed snapshot: diff it against an
    // all-dead board so every initially-alive cell gets its own
    // `CellFlipped`, matching the loader's behavior in the captured
    // original implementation.
    if !cli.no_vis {
        let dead = Board::new_dead(initial.width, initial.height);
        emit_turn_diff(sink.as_mut(), &dead, &initial, 0);
    }
    let mut last_snapshot = initial.clone();
    let mut current_turn = 0u32;

    broker
        .init(BrokerInitRequest {
            world: Some(initial.to_proto()),
            turns: cli.turns,
        })
        .await?;
    broker
        .start(BrokerStartRequest {
            worker_addresses: cli.worker_addresses.clone(),
        })
        .await?;
    tracing::info!(workers = cli.worker_addresses.len(), turns = cli.turns, "run started");

    let mut commands = keyboard::spawn_reader();
    let mut count_ticker = tokio::time::interval(Duration::from_millis(cli.count_interval_ms));

    let mut progress_client = broker.clone();
    let mut progress_handle = Box::pin(async move { progress_client.progress_all(Empty {}).await });

    loop {
        tokio::select! {
            result = &mut progress_handle => {
                result?;
                break;
            }
            _ = count_ticker.tick() => {
                let count = broker.count(Empty {}).await?.into_inner();
                current_turn = count.turn;
                sink.emit(VisualizationEvent::AliveCellsCount { turn: count.turn, count: count.count });
            }
            maybe_command = commands.recv() => {
                let Some(command) = maybe_command else { continue };
                match command {
                    Command::Save => {
                        let fetched = broker.fetch(Empty {}).await?.into_inner();
                        let board = Board::from_proto(fetched.board.expect("fetch always returns a board"))?;
                        let path = image::output_path(&cli.image_dir, board.height, board.width, fetched.turn);
                        image::write_pgm(&path, &board)?;
                        tracing::info!(path = %path.display(), turn = fetched.turn, "saved snapshot");
                        current_turn = fetched.turn;
                        if !cli.no_vis {
                            emit_turn_diff(sink.as_mut(), &last_snapshot, &board, fetched.turn);
                        }
                        last_snapshot = board;
                    }
                    Command::Pause => {
                        let response = broker.pause(Empty {}).await?.into_inner();
                        tracing::info!(message = %response.message, "pause toggled");
                    }
                    Command::Quit => {
                        broker.quit(Empty {}).await?;
                        sink.emit(VisualizationEvent::StateChange { turn: current_turn, phase: RunPhase::Quitting });
                        break;
                    }
                    Command::Kill => {
                        // Kill is best-effort: the broker process may exit
                        // before the response is sent, so a transport error
                        // here is expected, not a run failure.
                        let _ = broker.kill(Empty {}).await;
                        sink.emit(VisualizationEvent::StateChange { turn: current_turn, phase: RunPhase::Quitting });
                        break;
                    }
                }
            }
        }
    }

    // The broker may already be dead (a `Kill` command exits it immediately
    // after fanning the kill out), in which case we fall back to whatever
    // was last saved rather than treating this as a run failure.
    let (final_board, turn) = match broker.fetch(Empty {}).await {
        Ok(response) => {
            let response = response.into_inner();
            let board = Board::from_proto(response.board.expect("fetch always returns a board"))?;
            (board, response.turn)
        }
        Err(status) => {
            tracing::warn!(%status, "final fetch failed, broker likely already gone");
            (last_snapshot.clone(), current_turn)
        }
    };

    if !cli.no_vis && last_snapshot.width == final_board.width && last_snapshot.height == final_board.height {
        emit_turn_diff(sink.as_mut(), &last_snapshot, &final_board, turn);
    }
    let alive = final_board.alive_count();
    sink.emit(VisualizationEvent::FinalTurnComplete {
        turn,
        alive_cells: alive,
    });

    let out_path = image::output_path(&cli.image_dir, final_board.height, final_board.width, turn);
    image::write_pgm(&out_path, &final_board)?;
    tracing::info!(path = %out_path.display(), turn, alive, "final board written");

    Ok(())
}
