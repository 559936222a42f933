//! # Kasa POS Server
//!
//! Binary entry point. All logic lives in the library crate.

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    kasa_server::run().await
}
