//! # Mostrador Register Entry Point
//!
//! Spawned by the frontend shell; speaks JSON lines on stdin/stdout.
//! See [`mostrador_register::ipc`] for the protocol.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match mostrador_register::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("mostrador-register: {e}");
            ExitCode::FAILURE
        }
    }
}
