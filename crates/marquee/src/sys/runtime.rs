use crate::app::StatusBoard;
use crate::events::AppEvent;
use async_channel::Sender;

/// Spawns the socket server and the config watcher on the current runtime.
pub fn start_background_services(tx: Sender<AppEvent>, board: StatusBoard) {
    {
        let tx = tx.clone();
        tokio::spawn(async move {
            crate::sys::server::run_server(tx, board).await;
        });
    }

    {
        let tx = tx.clone();
        tokio::spawn(async move {
            crate::config::run_async_watcher(tx).await;
        });
    }
}
