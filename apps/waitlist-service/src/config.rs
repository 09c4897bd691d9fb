//! # Waitlist Service 設定
//!
//! 環境変数から Waitlist Service の設定を読み込む。
//!
//! 読み込みは起動時に 1 回だけ行い、以降は [`WaitlistConfig`] を値として
//! 各コンポーネントに渡す。パース処理はルックアップ関数を受け取る形にしており、
//! テストではプロセスの環境変数を書き換えずに検証できる。

use evalin_infra::notification::{SmtpCredentials, SmtpRelay, SmtpSecurity};
use regex::Regex;
use thiserror::Error;

/// 既定の CORS 許可オリジン（正規表現、前後アンカーは自動付与）
const DEFAULT_CORS_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:5173",
    "http://localhost:8080",
    r"https://.*\.web\.app",
    r"https://.*\.firebaseapp\.com",
];

const DEFAULT_DYNAMODB_ENDPOINT: &str = "http://localhost:18000";

/// 設定読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 数値として解釈できない
    #[error("{name} は有効な数値である必要があります: {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    /// CORS オリジンパターンが正規表現として不正
    #[error("CORS_ALLOWED_ORIGINS のパターンが不正です: {pattern:?}: {source}")]
    InvalidOriginPattern {
        pattern: String,
        #[source]
        source:  regex::Error,
    },
}

/// Waitlist Service サーバーの設定
#[derive(Debug, Clone)]
pub struct WaitlistConfig {
    /// バインドアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// DynamoDB エンドポイント（`None` で AWS デフォルトの解決に任せる）
    pub dynamodb_endpoint: Option<String>,
    /// ウェイトリストテーブル名
    pub waitlist_table: String,
    /// CORS 許可オリジン
    pub cors_allowed_origins: OriginAllowList,
    /// 通知送信バックエンド
    pub notification_backend: NotificationBackend,
    /// SMTP 設定
    pub smtp: SmtpConfig,
}

impl WaitlistConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意のルックアップ関数から設定を読み込む
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // CORS_ORIGINS は旧名。両方あれば CORS_ALLOWED_ORIGINS を優先する
        let cors_origins_raw =
            non_blank(lookup("CORS_ALLOWED_ORIGINS")).or_else(|| non_blank(lookup("CORS_ORIGINS")));
        let cors_allowed_origins = match cors_origins_raw {
            Some(raw) => OriginAllowList::new(split_list(&raw))?,
            None => OriginAllowList::new(DEFAULT_CORS_ALLOWED_ORIGINS.iter().copied())?,
        };

        // 空文字を明示的に設定した場合は AWS のデフォルトエンドポイントを使う
        let dynamodb_endpoint = match lookup("DYNAMODB_ENDPOINT") {
            Some(value) => non_blank(Some(value)),
            None => Some(DEFAULT_DYNAMODB_ENDPOINT.to_string()),
        };

        Ok(Self {
            host: non_blank(lookup("HOST")).unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_number("PORT", lookup("PORT"), 8080)?,
            dynamodb_endpoint,
            waitlist_table: non_blank(lookup("WAITLIST_TABLE"))
                .unwrap_or_else(|| "waitlist".to_string()),
            cors_allowed_origins,
            notification_backend: NotificationBackend::parse(lookup("NOTIFICATION_BACKEND")),
            smtp: SmtpConfig::from_lookup(&lookup)?,
        })
    }
}

/// 通知送信バックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationBackend {
    /// SMTP リレー経由で送信する
    #[default]
    Smtp,
    /// 送信せずログ出力のみ（ローカル開発用）
    Noop,
}

impl NotificationBackend {
    fn parse(value: Option<String>) -> Self {
        let Some(value) = non_blank(value) else {
            return Self::default();
        };
        match value.to_lowercase().as_str() {
            "smtp" => Self::Smtp,
            "noop" => Self::Noop,
            other => {
                tracing::warn!(
                    backend = other,
                    "未知の NOTIFICATION_BACKEND のため smtp を使用します"
                );
                Self::Smtp
            }
        }
    }
}

/// SMTP 通知の設定
///
/// 通知ユースケースはこの構造体だけを参照し、環境変数は読まない。
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host:              String,
    pub port:              u16,
    pub username:          Option<String>,
    pub password:          Option<String>,
    /// 送信元（未設定ならユーザー名）
    pub from_address:      Option<String>,
    /// 社内通知の宛先
    pub notify_to:         Vec<String>,
    /// 登録者へ確認メールを送るか
    pub send_confirmation: bool,
    /// 暗黙 TLS で接続するか（false なら STARTTLS）
    pub use_ssl:           bool,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host:              "smtp.gmail.com".to_string(),
            port:              587,
            username:          None,
            password:          None,
            from_address:      None,
            notify_to:         Vec::new(),
            send_confirmation: true,
            use_ssl:           false,
        }
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("from_address", &self.from_address)
            .field("notify_to", &self.notify_to)
            .field("send_confirmation", &self.send_confirmation)
            .field("use_ssl", &self.use_ssl)
            .finish()
    }
}

impl SmtpConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let port = parse_number("SMTP_PORT", lookup("SMTP_PORT"), defaults.port)?;

        Ok(Self {
            host: non_blank(lookup("SMTP_HOST")).unwrap_or(defaults.host),
            port,
            username: non_blank(lookup("SMTP_USER")),
            password: non_blank(lookup("SMTP_PASSWORD")),
            from_address: non_blank(lookup("SMTP_FROM")),
            notify_to: lookup("SMTP_NOTIFY_TO")
                .map(|raw| split_list(&raw).map(str::to_string).collect())
                .unwrap_or_default(),
            send_confirmation: parse_flag(lookup("SMTP_SEND_CONFIRMATION"), true),
            use_ssl: parse_flag(lookup("SMTP_USE_SSL"), port == 465),
        })
    }

    /// 接続情報を組み立てる
    ///
    /// ユーザー名とパスワードのどちらかが欠けていれば `None`。
    pub fn relay(&self) -> Option<SmtpRelay> {
        let (Some(username), Some(password)) = (&self.username, &self.password) else {
            return None;
        };

        Some(SmtpRelay {
            host:        self.host.clone(),
            port:        self.port,
            security:    if self.use_ssl {
                SmtpSecurity::ImplicitTls
            } else {
                SmtpSecurity::StartTls
            },
            credentials: SmtpCredentials {
                username: username.clone(),
                password: password.clone(),
            },
        })
    }

    /// 送信元アドレス（`SMTP_FROM` → ユーザー名の順）
    pub fn sender_address(&self) -> Option<&str> {
        self.from_address.as_deref().or(self.username.as_deref())
    }
}

/// CORS 許可オリジンの一覧
///
/// 各パターンは `^(?:...)$` でアンカーし、オリジン全体に一致した場合のみ許可する。
#[derive(Debug, Clone)]
pub struct OriginAllowList {
    patterns: Vec<Regex>,
}

impl OriginAllowList {
    pub fn new<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Result<Self, ConfigError> {
        let patterns = patterns
            .into_iter()
            .map(|pattern| {
                Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
                    ConfigError::InvalidOriginPattern {
                        pattern: pattern.to_string(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// オリジンが許可されているか
    pub fn allows(&self, origin: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(origin))
    }
}

impl Default for OriginAllowList {
    fn default() -> Self {
        Self::new(DEFAULT_CORS_ALLOWED_ORIGINS.iter().copied())
            .unwrap_or(Self { patterns: Vec::new() })
    }
}

/// 前後の空白を除き、空なら `None` にする
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// カンマ区切りの一覧を分割する（空要素は捨てる）
fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// 真偽値フラグ（`1` / `true` / `yes` / `y` / `on` が真）
fn parse_flag(value: Option<String>, default: bool) -> bool {
    match value {
        Some(v) => matches!(
            v.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "on"
        ),
        None => default,
    }
}

fn parse_number(name: &'static str, value: Option<String>, default: u16) -> Result<u16, ConfigError> {
    match non_blank(value) {
        Some(v) => v
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value: v }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_環境変数が空ならデフォルト値を使う() {
        let config = WaitlistConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.dynamodb_endpoint.as_deref(),
            Some("http://localhost:18000")
        );
        assert_eq!(config.waitlist_table, "waitlist");
        assert_eq!(config.notification_backend, NotificationBackend::Smtp);
        assert_eq!(config.smtp, SmtpConfig::default());
    }

    #[test]
    fn test_dynamodb_endpointを空にするとnoneになる() {
        let config =
            WaitlistConfig::from_lookup(lookup_from(&[("DYNAMODB_ENDPOINT", "")])).unwrap();

        assert_eq!(config.dynamodb_endpoint, None);
    }

    #[test]
    fn test_smtp設定を読み込む() {
        let config = WaitlistConfig::from_lookup(lookup_from(&[
            ("SMTP_HOST", " mail.example.com "),
            ("SMTP_PORT", "465"),
            ("SMTP_USER", "mailer@example.com"),
            ("SMTP_PASSWORD", "s3cret"),
            ("SMTP_NOTIFY_TO", "team@example.com, ,ops@example.com,"),
            ("SMTP_SEND_CONFIRMATION", "off"),
        ]))
        .unwrap();

        assert_eq!(
            config.smtp,
            SmtpConfig {
                host:              "mail.example.com".to_string(),
                port:              465,
                username:          Some("mailer@example.com".to_string()),
                password:          Some("s3cret".to_string()),
                from_address:      None,
                notify_to:         vec![
                    "team@example.com".to_string(),
                    "ops@example.com".to_string(),
                ],
                send_confirmation: false,
                use_ssl:           true,
            }
        );
    }

    #[test]
    fn test_smtp_use_sslはポート由来の既定値を上書きできる() {
        let config = WaitlistConfig::from_lookup(lookup_from(&[
            ("SMTP_PORT", "465"),
            ("SMTP_USE_SSL", "false"),
        ]))
        .unwrap();

        assert!(!config.smtp.use_ssl);
    }

    #[test]
    fn test_不正なポートはinvalid_numberを返す() {
        let result = WaitlistConfig::from_lookup(lookup_from(&[("SMTP_PORT", "smtp")]));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidNumber { name: "SMTP_PORT", .. })
        ));
    }

    #[rstest]
    #[case("1", true)]
    #[case("true", true)]
    #[case(" YES ", true)]
    #[case("y", true)]
    #[case("on", true)]
    #[case("0", false)]
    #[case("no", false)]
    #[case("", false)]
    fn test_parse_flagは既知の真値のみ真とする(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(parse_flag(Some(raw.to_string()), !expected), expected);
    }

    #[rstest]
    #[case(None, NotificationBackend::Smtp)]
    #[case(Some("noop"), NotificationBackend::Noop)]
    #[case(Some("SMTP"), NotificationBackend::Smtp)]
    #[case(Some("ses"), NotificationBackend::Smtp)]
    fn test_notification_backendの解釈(
        #[case] raw: Option<&str>,
        #[case] expected: NotificationBackend,
    ) {
        assert_eq!(NotificationBackend::parse(raw.map(String::from)), expected);
    }

    #[test]
    fn test_relayは認証情報が欠けているとnoneを返す() {
        let config = SmtpConfig {
            username: Some("mailer@example.com".to_string()),
            ..SmtpConfig::default()
        };

        assert_eq!(config.relay(), None);
    }

    #[test]
    fn test_relayはuse_sslに応じてセキュリティモードを選ぶ() {
        let config = SmtpConfig {
            username: Some("mailer@example.com".to_string()),
            password: Some("s3cret".to_string()),
            ..SmtpConfig::default()
        };

        let relay = config.relay().unwrap();

        assert_eq!(relay.security, SmtpSecurity::StartTls);
        assert_eq!(relay.port, 587);
        assert_eq!(relay.credentials.username, "mailer@example.com");
    }

    #[test]
    fn test_sender_addressはsmtp_fromを優先する() {
        let mut config = SmtpConfig {
            username: Some("mailer@example.com".to_string()),
            ..SmtpConfig::default()
        };
        assert_eq!(config.sender_address(), Some("mailer@example.com"));

        config.from_address = Some("noreply@example.com".to_string());
        assert_eq!(config.sender_address(), Some("noreply@example.com"));
    }

    #[test]
    fn test_debug出力はパスワードを伏せる() {
        let config = SmtpConfig {
            password: Some("s3cret".to_string()),
            ..SmtpConfig::default()
        };

        assert!(!format!("{config:?}").contains("s3cret"));
    }

    #[rstest]
    #[case("http://localhost:5173", true)]
    #[case("https://evalin.web.app", true)]
    #[case("https://evalin-staging.firebaseapp.com", true)]
    #[case("https://evil.example.com", false)]
    #[case("http://localhost:5173.evil.example.com", false)]
    #[case("https://evalin.web.app.evil.example.com", false)]
    fn test_既定のcors許可リストはオリジン全体で照合する(
        #[case] origin: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(OriginAllowList::default().allows(origin), expected);
    }

    #[test]
    fn test_cors_allowed_originsで許可リストを置き換える() {
        let config = WaitlistConfig::from_lookup(lookup_from(&[(
            "CORS_ALLOWED_ORIGINS",
            r"https://evalin\.example\.com, http://localhost:4000",
        )]))
        .unwrap();

        assert!(config.cors_allowed_origins.allows("https://evalin.example.com"));
        assert!(config.cors_allowed_origins.allows("http://localhost:4000"));
        assert!(!config.cors_allowed_origins.allows("http://localhost:3000"));
    }

    #[test]
    fn test_旧名のcors_originsも許可リストとして読み込む() {
        let config = WaitlistConfig::from_lookup(lookup_from(&[(
            "CORS_ORIGINS",
            r"https://evalin\.example\.com",
        )]))
        .unwrap();

        assert!(config.cors_allowed_origins.allows("https://evalin.example.com"));
        assert!(!config.cors_allowed_origins.allows("http://localhost:3000"));
    }

    #[test]
    fn test_cors_allowed_originsはcors_originsより優先される() {
        let config = WaitlistConfig::from_lookup(lookup_from(&[
            ("CORS_ALLOWED_ORIGINS", "http://localhost:4000"),
            ("CORS_ORIGINS", "http://localhost:5000"),
        ]))
        .unwrap();

        assert!(config.cors_allowed_origins.allows("http://localhost:4000"));
        assert!(!config.cors_allowed_origins.allows("http://localhost:5000"));
    }

    #[test]
    fn test_不正な正規表現はinvalid_origin_patternを返す() {
        let result = OriginAllowList::new(["https://(unclosed"]);

        assert!(matches!(
            result,
            Err(ConfigError::InvalidOriginPattern { .. })
        ));
    }
}
