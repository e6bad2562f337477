//! `nova history`: inspect and prune saved conversations.

use anyhow::Context;
use nova_core::message::SessionId;
use nova_core::store::HistoryStore;
use std::path::Path;

pub async fn list(config_path: Option<&Path>, limit: usize) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config)?;
    let summaries = store.list().await.context("Failed to list conversations")?;

    if summaries.is_empty() {
        println!("No saved conversations in {}", config.history.dir.display());
        return Ok(());
    }

    println!("📜 Recent conversations ({} total)", summaries.len());
    println!();
    for summary in summaries.iter().take(limit) {
        println!("  {}", summary.title);
        println!(
            "    {}  ·  {} messages  ·  updated {}",
            summary.session_id,
            summary.message_count,
            summary.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
    if summaries.len() > limit {
        println!();
        println!("  … {} more (use --limit)", summaries.len() - limit);
    }
    Ok(())
}

pub async fn show(config_path: Option<&Path>, session: &str) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config)?;
    let id = SessionId::from(session);

    let Some(record) = store.load(&id).await.context("Failed to load conversation")? else {
        anyhow::bail!("No conversation found with id {session}");
    };

    println!("📜 {}", record.title);
    println!(
        "   started {}  ·  updated {}",
        record.created_at.format("%Y-%m-%d %H:%M"),
        record.updated_at.format("%Y-%m-%d %H:%M")
    );
    println!();
    for turn in &record.messages {
        println!("{}:", turn.speaker());
        for line in turn.content.lines() {
            println!("  {line}");
        }
        println!();
    }
    Ok(())
}

pub async fn delete(config_path: Option<&Path>, session: &str) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config)?;

    if store
        .delete(&SessionId::from(session))
        .await
        .context("Failed to delete conversation")?
    {
        println!("🗑️  Deleted conversation {session}");
    } else {
        println!("No conversation found with id {session}");
    }
    Ok(())
}
