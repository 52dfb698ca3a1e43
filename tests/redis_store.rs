mod common;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use mailpulse::application::usecases::{OpenOutcome, RecordOpenUseCase};
use mailpulse::application::{AppError, KeyValueStore};
use mailpulse::domain::{ActivationPolicy, OpenRequest};
use mailpulse::infrastructure::redis_store::RedisStore;

use common::RecordingNotifier;

type Data = Arc<Mutex<HashMap<String, String>>>;

/// Just enough RESP2 for GET/SET; anything else (CLIENT SETINFO) gets +OK.
async fn serve_redis(listener: TcpListener, data: Data) {
    loop {
        let Ok((socket, _)) = listener.accept().await else {
            return;
        };
        tokio::spawn(handle(socket, data.clone()));
    }
}

async fn handle(socket: TcpStream, data: Data) {
    let (read, mut write) = socket.into_split();
    let mut lines = BufReader::new(read);

    loop {
        let mut line = String::new();
        if lines.read_line(&mut line).await.unwrap_or(0) == 0 {
            return;
        }
        let argc: usize = line.trim_end().trim_start_matches('*').parse().unwrap();

        let mut args = Vec::with_capacity(argc);
        for _ in 0..argc {
            let mut len = String::new();
            lines.read_line(&mut len).await.unwrap();
            let mut arg = String::new();
            lines.read_line(&mut arg).await.unwrap();
            args.push(arg.trim_end_matches("\r\n").to_string());
        }

        let reply = match args[0].to_ascii_uppercase().as_str() {
            "GET" => match data.lock().unwrap().get(&args[1]) {
                Some(v) => format!("${}\r\n{v}\r\n", v.len()),
                None => "$-1\r\n".to_string(),
            },
            "SET" => {
                data.lock().unwrap().insert(args[1].clone(), args[2].clone());
                "+OK\r\n".to_string()
            }
            _ => "+OK\r\n".to_string(),
        };
        write.write_all(reply.as_bytes()).await.unwrap();
    }
}

async fn free_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

#[tokio::test]
async fn stores_and_reads_back_records() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let data = Data::default();
    tokio::spawn(serve_redis(listener, data.clone()));

    let store = RedisStore::connect(&format!("redis://{addr}")).await.unwrap();
    assert!(store.is_connected());

    assert_eq!(store.get("email:a:b").await.unwrap(), None);
    store.set("email:a:b", "{\"count\":1}").await.unwrap();
    assert_eq!(
        store.get("email:a:b").await.unwrap().as_deref(),
        Some("{\"count\":1}")
    );
    assert_eq!(data.lock().unwrap()["email:a:b"], "{\"count\":1}");
}

#[tokio::test]
async fn redis_down_at_startup_is_retried_on_later_requests() {
    let addr = free_addr().await;
    let store = RedisStore::new(&format!("redis://{addr}")).unwrap();

    let err = store.get("email:a:b").await.unwrap_err();
    assert!(matches!(err, AppError::Storage(_)));
    assert!(store.set("email:a:b", "{}").await.is_err());
    assert!(!store.is_connected());

    // redis comes up after the service
    let listener = TcpListener::bind(addr).await.unwrap();
    tokio::spawn(serve_redis(listener, Data::default()));

    store.set("email:a:b", "{}").await.unwrap();
    assert_eq!(store.get("email:a:b").await.unwrap().as_deref(), Some("{}"));
    assert!(store.is_connected());
}

#[tokio::test]
async fn unreachable_redis_still_activates() {
    let addr = free_addr().await;
    let notifier = RecordingNotifier::new();
    let uc = RecordOpenUseCase {
        store: Arc::new(RedisStore::new(&format!("redis://{addr}")).unwrap()),
        notifier: Arc::new(notifier.clone()),
        policy: ActivationPolicy::default(),
    };
    let open = OpenRequest::new(
        Some("alice@example.com".into()),
        Some("Q3 report".into()),
        None,
    );
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 15, 0).unwrap();

    assert_eq!(uc.execute(&open, now).await, OpenOutcome::Activated);
    assert_eq!(notifier.sent().len(), 1);
}
