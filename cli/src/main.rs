//! blocknative CLI: watch mempool activity from the terminal.
//!
//! Usage:
//! ```bash
//! # Watch an address and print every event as a JSON line
//! blocknative watch-address --address 0xfa6de2697D59E88Ed7Fc4dFE5A33daC43565ea41
//!
//! # Follow a single transaction until 3 events have arrived
//! blocknative watch-tx --hash 0x5f1a... --count 3
//!
//! # Push a configuration for an address with an ABI file
//! blocknative configure --scope 0xfa6d... --abi-file pool.abi.json --watch-address
//! ```
//!
//! The API key comes from `--key` or `BLOCKNATIVE_DAPP_ID`.
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::env;
use std::io::Write;
use std::process;

use blocknative_core::{Config, EventFrame, Filter, Header, Message, Scope};
use blocknative_ws::{BlocknativeClient, ClientOptions, Connection};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "watch-address" => cmd_watch_address(&args[2..]).await,
        "watch-tx" => cmd_watch_tx(&args[2..]).await,
        "configure" => cmd_configure(&args[2..]).await,
        "version" | "--version" | "-V" => {
            println!("blocknative {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("blocknative {}", env!("CARGO_PKG_VERSION"));
    println!("Watch addresses and transactions over the Blocknative realtime API\n");
    println!("USAGE:");
    println!("    blocknative <COMMAND> [FLAGS]\n");
    println!("COMMANDS:");
    println!("    watch-address  Subscribe to an address and print events");
    println!("    watch-tx       Subscribe to a transaction hash and print events");
    println!("    configure      Push a watch configuration");
    println!("    version        Print version");
    println!("    help           Print this help\n");
    println!("CONNECTION FLAGS:");
    println!("    --key <KEY>        API key  [default: $BLOCKNATIVE_DAPP_ID]");
    println!("    --scheme <SCHEME>  ws or wss  [default: wss]");
    println!("    --host <HOST>      [default: api.blocknative.com]");
    println!("    --path <PATH>      [default: /v0]");
    println!("    --count <N>        Stop after N events  [default: unlimited]\n");
    println!("COMMAND FLAGS:");
    println!("    watch-address --address <ADDR>");
    println!("    watch-tx      --hash <HASH>");
    println!("    configure     --scope <global|ADDR> [--abi-file <PATH>] [--watch-address]");
    println!("                  [--filter <FIELD=EXPR>]...");
}

async fn cmd_watch_address(args: &[String]) -> Result<(), String> {
    let address = parse_flag(args, "--address").ok_or("--address is required")?;
    let mut client = open(args).await?;
    let msg = Message::subscribe_address(client.mainnet_header(), address.as_str());
    client.send_json(&msg).await.map_err(|e| e.to_string())?;
    tracing::info!(address = %address, "watching address");
    let result = print_events(&mut client, parse_count(args)?, &mut std::io::stdout()).await;
    let unwatch = Message::unsubscribe_address(client.mainnet_header(), address);
    leave(&mut client, Some(&unwatch)).await;
    result
}

async fn cmd_watch_tx(args: &[String]) -> Result<(), String> {
    let hash = parse_flag(args, "--hash").ok_or("--hash is required")?;
    let mut client = open(args).await?;
    let msg = Message::subscribe_transaction(client.mainnet_header(), hash.as_str());
    client.send_json(&msg).await.map_err(|e| e.to_string())?;
    tracing::info!(hash = %hash, "watching transaction");
    let result = print_events(&mut client, parse_count(args)?, &mut std::io::stdout()).await;
    let unwatch = Message::unsubscribe_transaction(client.mainnet_header(), hash);
    leave(&mut client, Some(&unwatch)).await;
    result
}

async fn cmd_configure(args: &[String]) -> Result<(), String> {
    let scope = parse_flag(args, "--scope").ok_or("--scope is required")?;
    let abi = match parse_flag(args, "--abi-file") {
        Some(path) => {
            let text = std::fs::read_to_string(&path).map_err(|e| format!("{path}: {e}"))?;
            let abi: Value = serde_json::from_str(&text).map_err(|e| format!("{path}: {e}"))?;
            Some(abi)
        }
        None => None,
    };
    let filters = parse_filters(args)?;
    let watch_address = args.iter().any(|a| a == "--watch-address");
    let config = Config::new(Scope::from(scope), watch_address, abi).with_filters(filters);

    let mut client = open(args).await?;
    let msg = Message::put_configuration(client.mainnet_header(), config);
    client.send_json(&msg).await.map_err(|e| e.to_string())?;
    let reply = client.receive_event().await.map_err(|e| e.to_string())?;
    leave(&mut client, None).await;

    if reply.is_error() {
        return Err(reply.reason.unwrap_or_else(|| "configuration rejected".into()));
    }
    println!("  Status:        {}", reply.status);
    println!("  Connection ID: {}", reply.connection_id);
    Ok(())
}

/// Connect and run the `initialize` handshake.
async fn open(args: &[String]) -> Result<BlocknativeClient, String> {
    let defaults = ClientOptions::default();
    let options = ClientOptions {
        scheme: parse_flag(args, "--scheme").unwrap_or(defaults.scheme),
        host: parse_flag(args, "--host").unwrap_or(defaults.host),
        path: parse_flag(args, "--path").unwrap_or(defaults.path),
        api_key: parse_flag(args, "--key"),
        print_connect_response: true,
    };
    let mut client = BlocknativeClient::connect(options)
        .await
        .map_err(|e| e.to_string())?;
    client
        .initialize(Header::mainnet(client.api_key()))
        .await
        .map_err(|e| e.to_string())?;
    Ok(client)
}

/// Send the optional unwatch message, then close. Failures are logged, not
/// returned: the command's own result is what the caller reports.
async fn leave<C: Connection>(conn: &mut C, unwatch: Option<&Message>) {
    if let Some(msg) = unwatch {
        if let Err(e) = conn.send_json(msg).await {
            tracing::warn!(error = %e, "unsubscribe failed");
        }
    }
    if let Err(e) = conn.close().await {
        tracing::warn!(error = %e, "close failed");
    }
}

/// Print events as JSON lines until `count` have arrived (or forever).
async fn print_events<C, W>(conn: &mut C, count: Option<usize>, out: &mut W) -> Result<(), String>
where
    C: Connection,
    W: Write,
{
    let mut seen = 0usize;
    while count.map_or(true, |n| seen < n) {
        let frame: EventFrame = conn.receive_event().await.map_err(|e| e.to_string())?;
        if frame.is_error() {
            tracing::warn!(reason = ?frame.reason, "service reported an error");
            continue;
        }
        if let Some(tx) = frame.transaction() {
            tracing::debug!(hash = %tx.hash, status = %tx.status, "event");
        }
        let line = serde_json::to_string(&frame).map_err(|e| e.to_string())?;
        writeln!(out, "{line}").map_err(|e| e.to_string())?;
        seen += 1;
    }
    Ok(())
}

fn parse_count(args: &[String]) -> Result<Option<usize>, String> {
    parse_flag(args, "--count")
        .map(|n| n.parse::<usize>().map_err(|e| format!("--count: {e}")))
        .transpose()
}

/// Every `--filter FIELD=EXPR`, in order.
fn parse_filters(args: &[String]) -> Result<Vec<Filter>, String> {
    args.iter()
        .enumerate()
        .filter(|(_, a)| *a == "--filter")
        .map(|(i, _)| -> Result<Filter, String> {
            let raw = args.get(i + 1).ok_or("--filter needs a value")?;
            let (field, expr) = raw
                .split_once('=')
                .ok_or_else(|| format!("--filter '{raw}': expected FIELD=EXPR"))?;
            let mut filter = Filter::new();
            filter.insert(field.to_string(), Value::String(expr.to_string()));
            Ok(filter)
        })
        .collect()
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use blocknative_ws::ClientError;
    use serde_json::json;
    use std::collections::VecDeque;

    /// Connection replaying canned frames, with switchable send/close failures.
    #[derive(Default)]
    struct Scripted {
        inbox: VecDeque<Value>,
        sent: Vec<Value>,
        fail_send: bool,
        fail_close: bool,
        close_calls: usize,
    }

    #[async_trait]
    impl Connection for Scripted {
        async fn send_value(&mut self, value: Value) -> Result<(), ClientError> {
            if self.fail_send {
                return Err(ClientError::WebSocket("broken pipe".into()));
            }
            self.sent.push(value);
            Ok(())
        }

        async fn receive_value(&mut self) -> Result<Value, ClientError> {
            self.inbox.pop_front().ok_or(ClientError::Closed)
        }

        async fn close(&mut self) -> Result<(), ClientError> {
            self.close_calls += 1;
            if self.fail_close {
                return Err(ClientError::WebSocket("reset by peer".into()));
            }
            Ok(())
        }

        fn api_key(&self) -> &str {
            "key"
        }
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flags_and_filters() {
        let a = args(&[
            "--scope", "global", "--filter", "status=pending", "--filter",
            "contractCall.methodName=transfer", "--count", "2",
        ]);
        assert_eq!(parse_flag(&a, "--scope").as_deref(), Some("global"));
        assert_eq!(parse_count(&a).unwrap(), Some(2));
        let filters = parse_filters(&a).unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0]["status"], "pending");
        assert_eq!(filters[1]["contractCall.methodName"], "transfer");
    }

    #[test]
    fn bad_filter_and_count() {
        assert!(parse_filters(&args(&["--filter", "novalue"])).is_err());
        assert!(parse_filters(&args(&["--filter"])).is_err());
        assert!(parse_count(&args(&["--count", "many"])).is_err());
        assert_eq!(parse_count(&args(&[])).unwrap(), None);
    }

    #[tokio::test]
    async fn leave_sends_unwatch_then_closes() {
        let mut conn = Scripted::default();
        let unwatch = Message::unsubscribe_address(conn.mainnet_header(), "0xabc");
        leave(&mut conn, Some(&unwatch)).await;
        assert_eq!(conn.sent.len(), 1);
        assert_eq!(conn.sent[0]["eventCode"], "unwatch");
        assert_eq!(conn.close_calls, 1);
    }

    #[tokio::test]
    async fn leave_still_closes_when_unwatch_fails() {
        let mut conn = Scripted {
            fail_send: true,
            fail_close: true,
            ..Default::default()
        };
        let unwatch = Message::unsubscribe_transaction(conn.mainnet_header(), "0x5f1a");
        leave(&mut conn, Some(&unwatch)).await;
        assert!(conn.sent.is_empty());
        assert_eq!(conn.close_calls, 1);
    }

    #[tokio::test]
    async fn print_events_writes_lines_and_skips_errors() {
        let mut conn = Scripted {
            inbox: VecDeque::from(vec![
                json!({"status": "error", "reason": "unknown address"}),
                json!({"status": "ok", "connectionId": "c1"}),
                json!({"status": "ok", "connectionId": "c2"}),
                json!({"status": "ok", "connectionId": "c3"}),
            ]),
            ..Default::default()
        };
        let mut out = Vec::new();
        print_events(&mut conn, Some(2), &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["connectionId"], "c1");
        assert_eq!(conn.inbox.len(), 1);
    }

    #[tokio::test]
    async fn print_events_reports_receive_failure() {
        let mut conn = Scripted::default();
        let mut out = Vec::new();
        let err = print_events(&mut conn, None, &mut out).await.unwrap_err();
        assert_eq!(err, ClientError::Closed.to_string());
        assert!(out.is_empty());
    }
}
