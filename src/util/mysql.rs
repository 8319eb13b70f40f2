//! MySQL connection settings and `.my.cnf` defaults file parsing.

use std::path::{Path, PathBuf};

/// Default MySQL TCP port.
pub const DEFAULT_PORT: u16 = 3306;

/// Resolved connection settings for a single server.
#[derive(Debug, Clone, PartialEq)]
pub struct MysqlConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub socket: Option<String>,
}

impl MysqlConfig {
    /// `user@host:port`, used in log lines and error messages. Never includes the password.
    pub fn endpoint(&self) -> String {
        format!("{}@{}:{}", self.user, self.host, self.port)
    }

    /// Build an opts builder from config.
    pub fn to_opts(&self) -> mysql_async::OptsBuilder {
        let mut builder = mysql_async::OptsBuilder::default()
            .ip_or_hostname(&self.host)
            .tcp_port(self.port)
            .user(Some(&self.user));

        if let Some(ref pw) = self.password {
            builder = builder.pass(Some(pw));
        }
        if let Some(ref sock) = self.socket {
            builder = builder.socket(Some(sock));
        }

        builder
    }
}

/// Values found in the `[client]` section of a defaults file.
///
/// Every field is optional: command-line flags take precedence and anything
/// still missing afterwards is prompted for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientDefaults {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub socket: Option<String>,
}

/// Parse a MySQL defaults file (`.my.cnf` format) for `[client]` section credentials.
///
/// Returns `None` when the file cannot be read.
pub fn parse_defaults_file(path: &Path) -> Option<ClientDefaults> {
    let content = std::fs::read_to_string(path).ok()?;
    Some(parse_defaults(&content))
}

/// Parse the `[client]` section out of defaults file text.
pub fn parse_defaults(content: &str) -> ClientDefaults {
    let mut defaults = ClientDefaults::default();
    let mut in_client = false;

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_client = line.eq_ignore_ascii_case("[client]");
            continue;
        }
        if !in_client || line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim().to_lowercase();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            match key.as_str() {
                "host" => defaults.host = Some(value.to_string()),
                "port" => {
                    if let Ok(p) = value.parse() {
                        defaults.port = Some(p);
                    }
                }
                "user" => defaults.user = Some(value.to_string()),
                "password" => defaults.password = Some(value.to_string()),
                "socket" => defaults.socket = Some(value.to_string()),
                _ => {}
            }
        }
    }

    defaults
}

/// Find the default .my.cnf file.
pub fn find_defaults_file() -> Option<PathBuf> {
    // Check $HOME/.my.cnf
    if let Some(home) = std::env::var_os("HOME") {
        let path = Path::new(&home).join(".my.cnf");
        if path.exists() {
            return Some(path);
        }
    }
    let etc = Path::new("/etc/my.cnf");
    if etc.exists() {
        return Some(etc.to_path_buf());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_client_section_only() {
        let text = "\
[mysqld]
port = 3307
user = mysql

[client]
host = db1.internal
port = 3310
user = \"admin\"
password = 's3cr=t'
# comment
socket=/run/mysqld/mysqld.sock
";
        let d = parse_defaults(text);
        assert_eq!(d.host.as_deref(), Some("db1.internal"));
        assert_eq!(d.port, Some(3310));
        assert_eq!(d.user.as_deref(), Some("admin"));
        assert_eq!(d.password.as_deref(), Some("s3cr=t"));
        assert_eq!(d.socket.as_deref(), Some("/run/mysqld/mysqld.sock"));
    }

    #[test]
    fn test_parse_bad_port_ignored() {
        let d = parse_defaults("[client]\nport = abc\n");
        assert_eq!(d.port, None);
    }

    #[test]
    fn test_parse_no_client_section() {
        let d = parse_defaults("[mysqld]\nhost = x\n");
        assert_eq!(d, ClientDefaults::default());
    }

    #[test]
    fn test_endpoint_hides_password() {
        let cfg = MysqlConfig {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            user: "root".to_string(),
            password: Some("hunter2".to_string()),
            socket: None,
        };
        assert_eq!(cfg.endpoint(), "root@localhost:3306");
    }
}
