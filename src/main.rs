//! Chatbot operator console
//!
//! Interactive terminal console for the live-chat panel: lists active
//! conversations, takes and releases human control, relays operator
//! messages, and drives the agent test harness.

use anyhow::Result;
use chatbot_console::api::ApiClient;
use chatbot_console::config::Config;
use chatbot_console::harness::AgentHarness;
use chatbot_console::panel::{BackendSource, Listener, PanelController};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded: {:?}", config);

    let api = Arc::new(ApiClient::from_config(&config));
    let source = Arc::new(BackendSource::new(
        api.clone(),
        config.panel.conversation_limit,
        config.panel.message_limit,
    ));
    // The listener owns the refresh task; dropping it on any exit path
    // tears the subscription down
    let listener = Listener::spawn(source, Duration::from_secs(config.panel.poll_interval_secs));
    let mut updates = listener.subscribe();

    let mut controller = PanelController::new(api.clone());
    let mut harness = AgentHarness::new(api.clone(), config.panel.test_phone.clone());

    println!("Chatbot operator console — backend {}", api.base_url());
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_ok() {
                    controller.apply_snapshot(updates.borrow_and_update().clone());
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !run_command(line.trim(), &mut controller, &mut harness, &api).await {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    drop(listener);
    info!("Console shutdown complete");
    Ok(())
}

/// Execute one console command; returns false when the console should exit
async fn run_command(
    line: &str,
    controller: &mut PanelController,
    harness: &mut AgentHarness,
    api: &Arc<ApiClient>,
) -> bool {
    let (command, rest) = match line.split_once(' ') {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let outcome = match command {
        "" => Ok(()),
        "help" => {
            print_help();
            Ok(())
        }
        "list" => {
            print_conversations(controller);
            Ok(())
        }
        "pending" => {
            print_pending(controller);
            Ok(())
        }
        "open" => match controller.select(rest).await {
            Ok(status) => {
                println!(
                    "Opened {} (mode: {})",
                    rest,
                    if status.human_mode { "human" } else { "bot" }
                );
                print_messages(controller);
                Ok(())
            }
            Err(e) => Err(e),
        },
        "messages" => {
            print_messages(controller);
            Ok(())
        }
        "take" => {
            let phone = target_phone(controller, rest);
            match phone {
                Some(phone) => controller
                    .takeover(&phone)
                    .await
                    .map(|()| println!("Control taken: you can now reply manually.")),
                None => {
                    println!("Usage: take <phone> (or open a conversation first)");
                    Ok(())
                }
            }
        }
        "release" => {
            let phone = target_phone(controller, rest);
            match phone {
                Some(phone) => controller
                    .release(&phone)
                    .await
                    .map(|()| println!("Control released: the bot answers again.")),
                None => {
                    println!("Usage: release <phone> (or open a conversation first)");
                    Ok(())
                }
            }
        }
        "send" => {
            controller.set_draft(rest);
            controller.send().await.map(|()| println!("Sent."))
        }
        "attach" => {
            controller.attach(rest);
            println!("Staged attachment '{}' (relay is text-only, it will be dropped).", rest);
            Ok(())
        }
        "attend" => controller
            .attend(rest)
            .await
            .map(|()| println!("Attending {}.", rest)),
        "finalize" => {
            let phone = target_phone(controller, rest);
            match phone {
                Some(phone) => {
                    controller.finalize(&phone);
                    println!("Conversation {} finalized.", phone);
                }
                None => println!("Usage: finalize <phone> (or open a conversation first)"),
            }
            Ok(())
        }
        "agent" => match harness.send(rest).await {
            Ok(reply) => {
                let latency = reply
                    .latency_ms
                    .map(|ms| format!(" ({} ms)", ms))
                    .unwrap_or_default();
                println!("agent{}: {}", latency, reply.content);
                Ok(())
            }
            Err(e) => Err(e),
        },
        "reset" => {
            harness.clear();
            println!("Harness transcript cleared.");
            Ok(())
        }
        "health" => match api.agent_health().await {
            Ok(health) => {
                println!("Agent status: {} checks: {}", health.status, health.checks);
                Ok(())
            }
            Err(e) => Err(e),
        },
        "tools" => match api.agent_tools().await {
            Ok(tools) => {
                println!("{} tool(s) available:", tools.len());
                for tool in tools {
                    println!("  {}", tool);
                }
                Ok(())
            }
            Err(e) => Err(e),
        },
        "quit" | "exit" => return false,
        other => {
            println!("Unknown command '{}'. Type 'help'.", other);
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("error: {}", e);
    }
    true
}

/// Phone the command applies to: explicit argument or current selection
fn target_phone(controller: &PanelController, rest: &str) -> Option<String> {
    if !rest.is_empty() {
        Some(rest.to_string())
    } else {
        controller.view().selected().map(str::to_string)
    }
}

fn print_help() {
    println!("Commands:");
    println!("  list                 active conversations with unread counts");
    println!("  pending              conversations awaiting human attention");
    println!("  open <phone>         select a conversation and show its messages");
    println!("  messages             show the selected conversation's messages");
    println!("  take [phone]         assume human control");
    println!("  release [phone]      return control to the bot");
    println!("  send <text>          relay an operator message (requires control)");
    println!("  attach <name>        stage an attachment (dropped: relay is text-only)");
    println!("  attend <phone>       accept a pending request and take control");
    println!("  finalize [phone]     close a conversation");
    println!("  agent <text>         chat with the AI agent (test harness)");
    println!("  reset                clear the harness transcript");
    println!("  health               agent health probe");
    println!("  tools                list agent-callable tools");
    println!("  quit                 exit");
}

fn print_conversations(controller: &PanelController) {
    let conversations = controller.view().conversations();
    if conversations.is_empty() {
        println!("No active conversations.");
        return;
    }
    for conversation in conversations {
        let profile = controller.view().profile(&conversation.phone);
        let unread = controller.unread_count(&conversation.phone);
        let badge = if unread > 0 {
            format!(" [{} unread]", unread)
        } else {
            String::new()
        };
        let mode = if controller.mode(&conversation.phone).is_human() {
            "human"
        } else {
            "bot"
        };
        let last = controller
            .view()
            .last_message(&conversation.phone)
            .map(|m| m.preview().to_string())
            .unwrap_or_default();
        println!("  {} ({}){} — {}", profile.name, mode, badge, last);
    }
}

fn print_pending(controller: &PanelController) {
    let pending = controller.pending();
    if pending.is_empty() {
        println!("No pending requests.");
        return;
    }
    for request in pending {
        let age = request
            .requested_at
            .map(|at| format!(" (waiting {} min)", (Utc::now() - at).num_minutes()))
            .unwrap_or_default();
        println!("  {}{}", request.phone, age);
    }
}

fn print_messages(controller: &PanelController) {
    let messages = controller.selected_messages();
    if messages.is_empty() {
        println!("No messages.");
        return;
    }
    for message in messages {
        println!(
            "  [{}] {}: {}",
            message.timestamp.format("%H:%M"),
            message.origin.as_str(),
            message.preview()
        );
    }
}
