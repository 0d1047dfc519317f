//! Performance benchmarks for the ingestion and fan-out paths

use server::registry::ClientRegistry;
use shared::{LineParser, ParserTable, Tokens};
use std::time::Instant;
use tokio::sync::mpsc;

const HURT: &str = "L 10/18/2026 - 20:15:03: HW->player_hurt->1->3->-312.4,1022.9,64.0->0,90,0->2->4->-280.0,980.1,64.0->5,270,0->3->73,100->27,0->1->bob->";

/// Benchmarks tokenizing a long line
#[test]
fn benchmark_tokenizer() {
    let iterations = 100_000;
    // Command and version, then every field of the layout
    let per_line = 2 + ParserTable::standard()
        .lookup("player_hurt", "1")
        .unwrap()
        .iter()
        .map(|field| field.arity())
        .sum::<usize>();
    let start = Instant::now();

    let mut total = 0;
    for _ in 0..iterations {
        total += Tokens::new(HURT).unwrap().count();
    }

    let duration = start.elapsed();
    println!(
        "Tokenizer: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert_eq!(per_line, 14);
    assert_eq!(total, iterations * per_line);
    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks full parsing and serialization of the largest event layout
#[test]
fn benchmark_parse_and_serialize() {
    let parser = LineParser::default();
    let iterations = 20_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let event = parser.parse(HURT).unwrap();
        let _json = event.to_json().unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Parse + serialize: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 5 seconds
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks rejecting lines from other log sources
#[test]
fn benchmark_foreign_lines() {
    let parser = LineParser::default();
    let line = "L 10/18/2026 - 20:15:03: \"Bot<3><BOT><TERRORIST>\" purchased \"ak47\"";
    let iterations = 100_000;
    let start = Instant::now();

    for _ in 0..iterations {
        assert!(parser.parse(line).unwrap_err().is_foreign());
    }

    let duration = start.elapsed();
    println!("Foreign lines: {} iterations in {:?}", iterations, duration);

    assert!(duration.as_millis() < 2000);
}

/// Stress tests broadcasting to many clients
#[test]
fn stress_test_broadcast_fanout() {
    let clients = 100;
    let messages = 200;

    let mut registry = ClientRegistry::new();
    let mut receivers = Vec::new();
    for id in 0..clients {
        let (tx, rx) = mpsc::channel(messages);
        registry.add_client(id, "127.0.0.1:9".parse().unwrap(), tx);
        receivers.push(rx);
    }

    let payload = LineParser::default().parse(HURT).unwrap().to_json().unwrap();
    let start = Instant::now();

    for _ in 0..messages {
        let report = registry.broadcast(&payload);
        assert_eq!(report.delivered, clients as usize);
    }

    let duration = start.elapsed();
    println!(
        "Broadcast: {} clients × {} messages in {:?}",
        clients, messages, duration
    );

    let received = tokio_test::block_on(async {
        let mut count = 0;
        for rx in &mut receivers {
            for _ in 0..messages {
                let message = rx.recv().await.unwrap();
                assert_eq!(message, payload);
                count += 1;
            }
            assert!(rx.try_recv().is_err());
        }
        count
    });

    assert_eq!(received, clients as usize * messages);
    assert!(duration.as_millis() < 5000);
}
