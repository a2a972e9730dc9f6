use crate::app::StatusBoard;
use crate::command::Command;
use crate::events::AppEvent;
use async_channel::Sender;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

pub const SOCKET_PATH: &str = "/tmp/marquee.sock";

#[derive(Debug, PartialEq)]
enum Reply {
    Forward(Command),
    Text(String),
    Nothing,
}

fn reply(line: &str, board: &StatusBoard) -> Reply {
    if line.trim().is_empty() {
        return Reply::Nothing;
    }
    match line.parse::<Command>() {
        Ok(Command::Status) => {
            let mut text: String = board
                .read()
                .iter()
                .map(|status| format!("{status}\n"))
                .collect();
            if text.is_empty() {
                text.push_str("no widgets\n");
            }
            Reply::Text(text)
        }
        Ok(command) => Reply::Forward(command),
        Err(e) => {
            log::warn!("Rejected command '{}': {}", line.trim(), e);
            Reply::Text(format!("error: {e}\n"))
        }
    }
}

pub async fn run_server(tx: Sender<AppEvent>, board: StatusBoard) {
    // Cleanup old socket if it exists
    if std::fs::metadata(SOCKET_PATH).is_ok() {
        let _ = std::fs::remove_file(SOCKET_PATH);
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let tx = tx.clone();
                let board = board.clone();
                tokio::spawn(async move {
                    let (reader, mut writer) = stream.split();
                    let mut lines = BufReader::new(reader).lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        match reply(&line, &board) {
                            Reply::Forward(command) => {
                                if tx.send(AppEvent::Command(command)).await.is_err() {
                                    break;
                                }
                            }
                            Reply::Text(text) => {
                                if let Err(e) = writer.write_all(text.as_bytes()).await {
                                    log::warn!("Failed to answer client: {}", e);
                                    break;
                                }
                            }
                            Reply::Nothing => {}
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}
