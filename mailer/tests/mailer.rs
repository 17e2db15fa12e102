use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use mailer::{
    account::{registry::AccountRegistry, AccountDescriptor, AccountSetting},
    message::MessagePayload,
    sender::{self, Receipt, SendMessage},
    transport::{Command, SendmailConfig, Transport},
    Error, Mailer, MailerConfig, TransportConfig,
};

/// Sender counting attempts, always succeeding.
#[derive(Default)]
struct CountingSender {
    attempts: AtomicUsize,
}

#[async_trait]
impl SendMessage for CountingSender {
    async fn send_message(&self, _: &Transport, msg: &MessagePayload) -> sender::Result<Receipt> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Ok(Receipt::new(msg.to.len() + msg.cc.len() + msg.bcc.len()))
    }
}

struct Welcome {
    to: String,
    name: String,
}

fn welcome(args: &Welcome) -> mailer::message::Result<MessagePayload> {
    Ok(MessagePayload::new()
        .to(args.to.as_str())
        .bcc(("admin@localhost", "Admin"))
        .from(("theteam@localhost", "The Team"))
        .subject("Welcome!")
        .html_body(format!("<h1>Welcome, {}!</h1>", args.name))
        .text_body(format!("Welcome, {}!", args.name)))
}

fn args() -> Welcome {
    Welcome {
        to: "alice@localhost".into(),
        name: "Alice".into(),
    }
}

fn registry(fallback: bool) -> AccountRegistry {
    let native = AccountDescriptor::new(TransportConfig::Native);
    let config = MailerConfig::default()
        .with_default_fallback(fallback)
        .with_setting(AccountSetting::new("default", [native]));

    AccountRegistry::new(config)
}

#[test_log::test(tokio::test)]
async fn send_with_default_fallback() {
    let sender = Arc::new(CountingSender::default());
    let mailer = Mailer::new_with_sender(registry(true), sender.clone())
        .with_setting("x")
        .with_template("welcome", welcome);

    let receipt = mailer.send("welcome", &args()).await.unwrap();

    assert_eq!(receipt, Receipt::new(2));
    assert_eq!(sender.attempts.load(Ordering::SeqCst), 1);
}

#[test_log::test(tokio::test)]
async fn send_without_default_fallback() {
    let sender = Arc::new(CountingSender::default());
    let mailer = Mailer::new_with_sender(registry(false), sender.clone())
        .with_setting("y")
        .with_template("welcome", welcome);

    let err = mailer.send("welcome", &args()).await.unwrap_err();

    assert!(matches!(&err, Error::LocateAccountSettingError(name) if name == "y"));
    assert!(err.is_configuration_error());
    assert_eq!(sender.attempts.load(Ordering::SeqCst), 0);
}

#[test_log::test(tokio::test)]
async fn send_undefined_template() {
    let sender = Arc::new(CountingSender::default());
    let mailer: Mailer<Welcome, _> = Mailer::new_with_sender(registry(true), sender.clone());

    assert!(!mailer.has_template("welcome"));
    assert!(matches!(
        mailer.send("welcome", &args()).await,
        Err(Error::UndefinedTemplateError(name)) if name == "welcome"
    ));
    assert_eq!(sender.attempts.load(Ordering::SeqCst), 0);
}

#[test_log::test(tokio::test)]
async fn send_raw_payload() {
    let sender = Arc::new(CountingSender::default());
    let mailer: Mailer<(), _> = Mailer::new_with_sender(registry(true), sender.clone());

    let msg = welcome(&args()).unwrap();
    let receipt = mailer.send_message(&msg).await.unwrap();

    assert_eq!(receipt, Receipt::new(2));
    assert_eq!(mailer.setting(), "default");
}

#[cfg(unix)]
#[test_log::test(tokio::test)]
async fn send_through_sendmail_commands() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("message.eml");

    let failing = AccountDescriptor::new(SendmailConfig {
        command: Some(Command::new("cat > /dev/null; echo unavailable >&2; exit 75")),
    });
    let working = AccountDescriptor::new(SendmailConfig {
        command: Some(Command::new(format!("cat > {}", out.display()))),
    })
    .with_reply_to("support@localhost", "Support");

    let config = MailerConfig::default()
        .with_setting(AccountSetting::new("marketing", [failing, working]));
    let mailer = Mailer::new(AccountRegistry::new(config))
        .with_setting("marketing")
        .with_template("welcome", welcome);

    let receipt = mailer.send("welcome", &args()).await.unwrap();
    assert_eq!(receipt, Receipt::new(2));

    let raw = std::fs::read_to_string(&out).unwrap();
    assert!(raw.contains("Subject: Welcome!"));
    assert!(raw.contains("alice@localhost"));
    assert!(raw.contains("support@localhost"));
    assert!(raw.contains("Welcome, Alice!"));
}

#[cfg(unix)]
#[test_log::test(tokio::test)]
async fn send_through_failing_sendmail_commands() {
    let failing = |code: i32| {
        AccountDescriptor::new(SendmailConfig {
            command: Some(Command::new(format!("cat > /dev/null; exit {code}"))),
        })
    };

    let config = MailerConfig::default()
        .with_setting(AccountSetting::new("default", [failing(69), failing(75)]));
    let mailer = Mailer::new(AccountRegistry::new(config)).with_template("welcome", welcome);

    match mailer.send("welcome", &args()).await {
        Err(Error::DeliveryExhaustedError { attempts, source, .. }) => {
            assert_eq!(attempts, 2);
            assert_eq!(source.code(), 75);
        }
        res => panic!("unexpected result: {res:?}"),
    }
}

#[cfg(unix)]
#[test_log::test(tokio::test)]
async fn send_large_message_after_command_ignoring_input() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("message.eml");

    // exits before reading a message larger than the pipe buffer
    let failing = AccountDescriptor::new(SendmailConfig {
        command: Some(Command::new("exit 75")),
    });
    let working = AccountDescriptor::new(SendmailConfig {
        command: Some(Command::new(format!("cat > {}", out.display()))),
    });

    let config =
        MailerConfig::default().with_setting(AccountSetting::new("default", [failing, working]));
    let mailer = Mailer::new(AccountRegistry::new(config)).with_template(
        "report",
        |lines: &usize| -> mailer::message::Result<MessagePayload> {
            Ok(MessagePayload::new()
                .from("theteam@localhost")
                .to("alice@localhost")
                .subject("Report")
                .text_body("All systems operational.\n".repeat(*lines)))
        },
    );

    let receipt = mailer.send("report", &20_000).await.unwrap();
    assert_eq!(receipt, Receipt::new(1));

    let raw = std::fs::read_to_string(&out).unwrap();
    assert!(raw.contains("Subject: Report"));
}
