//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpConnection` を直接扱い、1 回の `send_batch` につき
//! 接続 → (STARTTLS) → 認証 → 全メッセージ送信 → QUIT を 1 本のセッションで行う。

use std::time::Duration;

use async_trait::async_trait;
use evalin_domain::notification::{EmailMessage, NotificationError};
use lettre::{
    message::{Mailbox, Message, header::ContentType},
    transport::smtp::{
        Error as SmtpError,
        authentication::{Credentials, DEFAULT_MECHANISMS},
        client::{AsyncSmtpConnection, TlsParameters},
        extension::ClientId,
    },
};

use super::{NotificationSender, SmtpRelay, SmtpSecurity};

/// 接続・各コマンドのタイムアウト
const SESSION_TIMEOUT: Duration = Duration::from_secs(60);

/// SMTP 通知送信
///
/// 状態を持たない。接続情報は呼び出しごとに [`SmtpRelay`] で受け取る。
#[derive(Debug, Clone, Default)]
pub struct SmtpNotificationSender;

impl SmtpNotificationSender {
    pub fn new() -> Self {
        Self
    }
}

/// セッションの TLS 構成
enum TlsSetup {
    /// 接続直後から TLS
    Implicit(TlsParameters),
    /// 平文で接続し EHLO の後に STARTTLS で昇格する
    StartTls(TlsParameters),
    /// TLS なし（ローカルのテスト用サーバー）
    #[cfg(test)]
    Plain,
}

impl TlsSetup {
    fn for_relay(relay: &SmtpRelay) -> Result<Self, NotificationError> {
        let parameters = TlsParameters::new(relay.host.clone())
            .map_err(|e| NotificationError::SendFailed(e.to_string()))?;

        Ok(match relay.security {
            SmtpSecurity::ImplicitTls => Self::Implicit(parameters),
            SmtpSecurity::StartTls => Self::StartTls(parameters),
        })
    }
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_batch(
        &self,
        relay: &SmtpRelay,
        messages: &[EmailMessage],
    ) -> Result<(), NotificationError> {
        // 接続前に全メッセージを組み立て、アドレス不正で途中送信にならないようにする
        let built = messages
            .iter()
            .map(build_message)
            .collect::<Result<Vec<_>, _>>()?;

        let tls = TlsSetup::for_relay(relay)?;
        let credentials = Credentials::new(
            relay.credentials.username.clone(),
            relay.credentials.password.clone(),
        );

        deliver(&relay.host, relay.port, tls, &credentials, &built).await
    }
}

/// 1 本のセッションで全メッセージを送る
///
/// 途中で失敗した場合は接続を破棄してエラーを返す。
async fn deliver(
    host: &str,
    port: u16,
    tls: TlsSetup,
    credentials: &Credentials,
    messages: &[Message],
) -> Result<(), NotificationError> {
    let hello_name = ClientId::default();
    let (wrapper, upgrade) = match tls {
        TlsSetup::Implicit(parameters) => (Some(parameters), None),
        TlsSetup::StartTls(parameters) => (None, Some(parameters)),
        #[cfg(test)]
        TlsSetup::Plain => (None, None),
    };

    let mut connection = AsyncSmtpConnection::connect_tokio1(
        (host, port),
        Some(SESSION_TIMEOUT),
        &hello_name,
        wrapper,
        None,
    )
    .await
    .map_err(send_failed)?;

    let result = run_session(&mut connection, &hello_name, upgrade, credentials, messages).await;

    match result {
        Ok(sent) => {
            if let Err(e) = connection.quit().await {
                // 全メッセージは受理済みなので失敗扱いにしない
                tracing::debug!(error = %e, "SMTP QUIT に失敗");
            }
            tracing::debug!(host, port, sent, "SMTP セッション終了");
            Ok(())
        }
        Err(e) => {
            connection.abort().await;
            Err(send_failed(e))
        }
    }
}

async fn run_session(
    connection: &mut AsyncSmtpConnection,
    hello_name: &ClientId,
    upgrade: Option<TlsParameters>,
    credentials: &Credentials,
    messages: &[Message],
) -> Result<usize, SmtpError> {
    if let Some(parameters) = upgrade {
        connection.starttls(parameters, hello_name).await?;
    }
    connection.auth(DEFAULT_MECHANISMS, credentials).await?;

    for message in messages {
        connection
            .send(message.envelope(), &message.formatted())
            .await?;
    }

    Ok(messages.len())
}

/// 送信失敗はトランスポートのメッセージをそのまま保持する
fn send_failed(error: SmtpError) -> NotificationError {
    NotificationError::SendFailed(error.to_string())
}

/// ドメインのメールメッセージを lettre のメッセージに変換する
fn build_message(email: &EmailMessage) -> Result<Message, NotificationError> {
    let mut builder = Message::builder()
        .from(parse_mailbox(&email.from)?)
        .subject(&email.subject);

    for to in &email.to {
        builder = builder.to(parse_mailbox(to)?);
    }

    builder
        .header(ContentType::TEXT_PLAIN)
        .body(email.text_body.clone())
        .map_err(|e| NotificationError::BuildFailed(e.to_string()))
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotificationError> {
    address
        .parse()
        .map_err(|e| NotificationError::InvalidAddress(format!("{address}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::{
        net::SocketAddr,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use pretty_assertions::assert_eq;
    use tokio::{
        io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
        net::{TcpListener, TcpStream},
    };

    use super::*;
    use crate::notification::SmtpCredentials;

    fn message(from: &str, to: &[&str]) -> EmailMessage {
        EmailMessage {
            from:      from.to_string(),
            to:        to.iter().map(|s| s.to_string()).collect(),
            subject:   "New Evalin Waitlist Signup".to_string(),
            text_body: "New waitlist signup!".to_string(),
        }
    }

    fn relay(host: &str, security: SmtpSecurity) -> SmtpRelay {
        SmtpRelay {
            host: host.to_string(),
            port: 587,
            security,
            credentials: SmtpCredentials {
                username: "mailer@example.com".to_string(),
                password: "s3cret".to_string(),
            },
        }
    }

    fn credentials() -> Credentials {
        Credentials::new("mailer@example.com".to_string(), "s3cret".to_string())
    }

    /// ローカル SMTP サーバーが受けたセッション数・AUTH 数・メッセージ数
    #[derive(Default)]
    struct SmtpCounters {
        sessions: AtomicUsize,
        logins:   AtomicUsize,
        messages: AtomicUsize,
    }

    impl SmtpCounters {
        fn snapshot(&self) -> (usize, usize, usize) {
            (
                self.sessions.load(Ordering::SeqCst),
                self.logins.load(Ordering::SeqCst),
                self.messages.load(Ordering::SeqCst),
            )
        }
    }

    /// AUTH PLAIN/LOGIN のみを広告する最小限の SMTP サーバーを起動する
    async fn spawn_smtp_server() -> (SocketAddr, Arc<SmtpCounters>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let counters = Arc::new(SmtpCounters::default());

        let shared = counters.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                shared.sessions.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(serve_session(stream, shared.clone()));
            }
        });

        (addr, counters)
    }

    async fn serve_session(stream: TcpStream, counters: Arc<SmtpCounters>) -> std::io::Result<()> {
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        writer.write_all(b"220 smtp.local ESMTP\r\n").await?;

        while let Some(line) = lines.next_line().await? {
            let command = line.to_ascii_uppercase();
            let reply: &[u8] = if command.starts_with("EHLO") {
                b"250-smtp.local\r\n250 AUTH PLAIN LOGIN\r\n"
            } else if command.starts_with("AUTH") {
                counters.logins.fetch_add(1, Ordering::SeqCst);
                b"235 2.7.0 Authentication successful\r\n"
            } else if command.starts_with("MAIL") || command.starts_with("RCPT") {
                b"250 2.1.0 OK\r\n"
            } else if command.starts_with("DATA") {
                writer.write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n").await?;
                while let Some(body) = lines.next_line().await? {
                    if body == "." {
                        break;
                    }
                }
                counters.messages.fetch_add(1, Ordering::SeqCst);
                b"250 2.0.0 queued\r\n"
            } else if command.starts_with("QUIT") {
                writer.write_all(b"221 2.0.0 Bye\r\n").await?;
                break;
            } else {
                b"502 5.5.2 Command not recognized\r\n"
            };
            writer.write_all(reply).await?;
        }

        Ok(())
    }

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SmtpNotificationSender>();
    }

    #[test]
    fn test_build_messageは複数宛先をtoヘッダーに含める() {
        let built = build_message(&message(
            "noreply@evalin.example.com",
            &["team@example.com", "ops@example.com"],
        ))
        .unwrap();

        let envelope = built.envelope();
        assert_eq!(envelope.to().len(), 2);
        let formatted = String::from_utf8(built.formatted()).unwrap();
        assert!(formatted.contains("Subject: New Evalin Waitlist Signup"));
        assert!(formatted.contains("text/plain"));
    }

    #[test]
    fn test_build_messageは不正な送信元でinvalid_addressを返す() {
        let result = build_message(&message("not-an-address", &["team@example.com"]));

        assert!(matches!(result, Err(NotificationError::InvalidAddress(_))));
    }

    #[test]
    fn test_セキュリティモードに応じてtls構成を選ぶ() {
        let implicit = TlsSetup::for_relay(&relay("smtp.gmail.com", SmtpSecurity::ImplicitTls));
        let starttls = TlsSetup::for_relay(&relay("smtp.gmail.com", SmtpSecurity::StartTls));

        assert!(matches!(
            implicit,
            Ok(TlsSetup::Implicit(ref p)) if p.domain() == "smtp.gmail.com"
        ));
        assert!(matches!(
            starttls,
            Ok(TlsSetup::StartTls(ref p)) if p.domain() == "smtp.gmail.com"
        ));
    }

    #[tokio::test]
    async fn test_send_batchは不正な宛先があれば接続前にエラーを返す() {
        let result = SmtpNotificationSender::new()
            .send_batch(
                &relay("127.0.0.1", SmtpSecurity::StartTls),
                &[message("noreply@example.com", &["broken"])],
            )
            .await;

        assert!(matches!(result, Err(NotificationError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_複数メッセージを1セッション1回の認証で送る() {
        let (addr, counters) = spawn_smtp_server().await;
        let messages = vec![
            build_message(&message("mailer@example.com", &["team@example.com"])).unwrap(),
            build_message(&message("mailer@example.com", &["new@example.com"])).unwrap(),
        ];

        let result = deliver(
            &addr.ip().to_string(),
            addr.port(),
            TlsSetup::Plain,
            &credentials(),
            &messages,
        )
        .await;

        assert!(result.is_ok(), "{result:?}");
        assert_eq!(counters.snapshot(), (1, 1, 2));
    }

    #[tokio::test]
    async fn test_starttls非対応のサーバーには認証せず失敗する() {
        let (addr, counters) = spawn_smtp_server().await;
        let messages =
            vec![build_message(&message("mailer@example.com", &["team@example.com"])).unwrap()];
        let tls = TlsSetup::StartTls(TlsParameters::new("localhost".to_string()).unwrap());

        let result = deliver(
            &addr.ip().to_string(),
            addr.port(),
            tls,
            &credentials(),
            &messages,
        )
        .await;

        let Err(NotificationError::SendFailed(detail)) = result else {
            panic!("SendFailed を期待: {result:?}");
        };
        assert!(detail.contains("STARTTLS"), "{detail}");
        assert_eq!(counters.snapshot(), (1, 0, 0));
    }

    #[tokio::test]
    async fn test_接続できなければsend_failedを返す() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = deliver(
            &addr.ip().to_string(),
            addr.port(),
            TlsSetup::Plain,
            &credentials(),
            &[],
        )
        .await;

        assert!(matches!(result, Err(NotificationError::SendFailed(_))));
    }
}
