use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use milsim_toolbox::mailbox::{MailError, Mailbox};
use tempfile::TempDir;

#[test]
fn control_characters_stay_on_one_line() {
    let dir = TempDir::new().unwrap();
    let mailbox = Mailbox::new(dir.path().join("mail.txt"), Duration::from_secs(90));
    let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    mailbox
        .submit("Deuce", "10.0.0.2", "line one\nline two\tend", now)
        .unwrap();
    let log = mailbox.read_log().unwrap();
    assert_eq!(log, vec!["1700000000.00: Deuce (10.0.0.2): line one\\nline two\\tend"]);
}

#[test]
fn missing_directory_is_created() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("logs").join("admin").join("mail.txt");
    let mailbox = Mailbox::new(&path, Duration::from_secs(90));
    assert!(mailbox.read_log().unwrap().is_empty());
    mailbox.submit("Deuce", "10.0.0.2", "hi", Utc::now()).unwrap();
    assert!(path.exists());
}

#[test]
fn zero_cooldown_allows_back_to_back_messages() {
    let dir = TempDir::new().unwrap();
    let mailbox = Mailbox::new(dir.path().join("mail.txt"), Duration::ZERO);
    let now = Utc::now();
    for i in 0..3 {
        mailbox.submit("Deuce", "10.0.0.2", &format!("msg {i}"), now).unwrap();
    }
    assert_eq!(mailbox.read_log().unwrap().len(), 3);
}

#[test]
fn rejected_messages_are_not_written() {
    let dir = TempDir::new().unwrap();
    let mailbox = Mailbox::new(dir.path().join("mail.txt"), Duration::from_secs(90));
    let now = Utc::now();
    assert!(matches!(mailbox.submit("Deuce", "10.0.0.2", "\t \n", now), Err(MailError::Empty)));
    mailbox.submit("Deuce", "10.0.0.2", "first", now).unwrap();
    match mailbox.submit("Deuce", "10.0.0.2", "second", now + chrono::Duration::seconds(45)) {
        Err(MailError::TooSoon { remaining }) => assert!((remaining - 45.0).abs() < 1e-6),
        other => panic!("expected cooldown, got {:?}", other),
    }
    assert_eq!(mailbox.read_log().unwrap().len(), 1);
}

#[test]
fn concurrent_writers_never_interleave() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mail.txt");
    // Two handles on one file, as two server processes would have
    let mailboxes = [
        Arc::new(Mailbox::new(&path, Duration::from_secs(90))),
        Arc::new(Mailbox::new(&path, Duration::from_secs(90))),
    ];
    let body = "x".repeat(4096);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let mailbox = Arc::clone(&mailboxes[i % 2]);
            let body = body.clone();
            thread::spawn(move || {
                mailbox
                    .submit(&format!("player{i}"), "10.0.0.9", &body, Utc::now())
                    .unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let log = mailboxes[0].read_log().unwrap();
    assert_eq!(log.len(), 16);
    for line in &log {
        let (_, rest) = line.split_once(": ").unwrap();
        assert!(rest.starts_with("player"));
        assert!(line.ends_with(&format!("(10.0.0.9): {}", body)));
    }
}
