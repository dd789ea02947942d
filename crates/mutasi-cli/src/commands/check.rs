//! AI backend check command

use anyhow::Result;
use mutasi_core::ai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use mutasi_core::{AIBackend, AIClient};

/// Report AI backend configuration and whether it responds
pub async fn cmd_check() -> Result<()> {
    println!("🔍 Checking AI backend...\n");

    let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "openai".to_string());
    println!("  AI_BACKEND: {}", backend);

    match std::env::var("OPENAI_BASE_URL") {
        Ok(url) => println!("  OPENAI_BASE_URL: {}", url),
        Err(_) => println!("  OPENAI_BASE_URL: not set (defaulting to {})", DEFAULT_BASE_URL),
    }
    match std::env::var("OPENAI_MODEL") {
        Ok(model) => println!("  OPENAI_MODEL: {}", model),
        Err(_) => println!("  OPENAI_MODEL: not set (defaulting to {})", DEFAULT_MODEL),
    }
    let key_set = std::env::var("OPENAI_API_KEY")
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false);
    println!(
        "  OPENAI_API_KEY: {}\n",
        if key_set { "set" } else { "not set" }
    );

    let Some(client) = AIClient::from_env() else {
        println!("❌ No AI backend configured");
        println!("\nTo enable extraction:");
        println!("  export OPENAI_API_KEY=sk-...");
        println!("  # or point at a compatible server");
        println!("  export OPENAI_BASE_URL=http://localhost:8000");
        return Ok(());
    };

    print!("Checking {} ({})... ", client.host(), client.model());
    if client.health_check().await {
        println!("✅ Connected");
    } else {
        println!("❌ Failed");
        println!("\n⚠️  Could not reach the chat-completion API at {}", client.host());
    }

    Ok(())
}
