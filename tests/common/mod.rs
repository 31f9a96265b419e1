//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::net::{SocketAddr, TcpListener};
use std::path::{Path, PathBuf};
use std::time::Duration;

use issuance_frontend::config::{parse_config, FrontendConfig};
use tempfile::TempDir;

/// A generated certificate and its key. PEM is LF-only.
pub struct Generated {
    pub cert_pem: String,
    pub cert_der: Vec<u8>,
    pub key_pem: String,
}

pub fn generate(name: &str) -> Generated {
    let certified = rcgen::generate_simple_self_signed(vec![name.to_string()]).unwrap();
    Generated {
        cert_pem: normalize(&certified.cert.pem()),
        cert_der: certified.cert.der().to_vec(),
        key_pem: normalize(&certified.key_pair.serialize_pem()),
    }
}

fn normalize(pem: &str) -> String {
    format!("{}\n", pem.replace("\r\n", "\n").trim_end())
}

pub fn write(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// An address nothing is listening on right now.
pub fn free_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Working directory holding chain files and TLS material.
pub struct Workspace {
    pub dir: TempDir,
    pub leaf: Generated,
    pub root: Generated,
    pub alternate_root: Generated,
    pub server: Generated,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let ws = Self {
            leaf: generate("intermediate.issuer.example"),
            root: generate("root.issuer.example"),
            alternate_root: generate("alternate-root.issuer.example"),
            server: generate("localhost"),
            dir,
        };
        ws.write("intermediate.pem", &ws.leaf.cert_pem);
        ws.write("root.pem", &ws.root.cert_pem);
        ws.write("alternate-root.pem", &ws.alternate_root.cert_pem);
        ws.write("server.pem", &ws.server.cert_pem);
        ws.write("server.key", &ws.server.key_pem);
        ws
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        write(self.dir.path(), name, contents)
    }

    /// TOML for one issuer with a default and an alternate chain.
    pub fn chains_toml(&self, issuer: &str) -> String {
        format!(
            r#"
[chains.certificate_chains]
"{issuer}" = ['{}', '{}']

[chains.alternate_certificate_chains]
"{issuer}" = ['{}', '{}']
"#,
            self.path("intermediate.pem").display(),
            self.path("root.pem").display(),
            self.path("intermediate.pem").display(),
            self.path("alternate-root.pem").display(),
        )
    }

    /// Full config with plaintext on `address` and an optional TLS listener.
    pub fn config(&self, address: &str, tls_address: Option<&str>, stop_secs: u64) -> FrontendConfig {
        let tls = match tls_address {
            Some(tls) => format!(
                "tls_address = \"{tls}\"\nserver_certificate_path = '{}'\nserver_key_path = '{}'\n",
                self.path("server.pem").display(),
                self.path("server.key").display(),
            ),
            None => String::new(),
        };
        let toml = format!(
            "[listener]\naddress = \"{address}\"\nshutdown_stop_timeout_secs = {stop_secs}\n{tls}\n{}",
            self.chains_toml("http://issuer.example/int-a")
        );
        parse_config(&toml).unwrap()
    }
}

/// Poll until a TCP connect to `addr` is refused, or give up after `within`.
pub async fn wait_until_refused(addr: SocketAddr, within: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + within;
    loop {
        if tokio::net::TcpStream::connect(addr).await.is_err() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
