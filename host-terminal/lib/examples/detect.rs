//! Example: Detect the hosting terminal
//!
//! Run with: cargo run -p host-terminal --example detect

use host_terminal::terminal::{Detector, TerminalDescriptor};
use host_terminal::{EnvSnapshot, classify};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let guess = classify(&EnvSnapshot::from_process());

    println!("=== Environment Guess ===\n");
    println!("App ID:  {:?}", guess.app_id);
    println!("Generic: {}", guess.generic);
    println!("Safe:    {}", guess.safe);
    println!("SSH:     {}", guess.ssh);

    let descriptor = Detector::system()
        .detect(&|d: TerminalDescriptor| d)
        .await;

    println!("\n=== Detected Terminal ===\n");
    println!("App ID:   {:?}", descriptor.app_id);
    println!("App Name: {:?}", descriptor.app_name);
    println!("PID:      {:?}", descriptor.pid);
    println!("Source:   {:?}", descriptor.source);
}
