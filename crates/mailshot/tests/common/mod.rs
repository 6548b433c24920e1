//! Recording transport shared by the integration tests.
//!
//! Every operation appends one line to an event log instead of talking to a
//! server. A scripted prefix makes the matching operation fail with a 550.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use mailshot::{Authenticator, Dialer, TlsSettings, Transport};
use mailshot_smtp::{Result, ServerContext};

/// What the fake server advertises and rejects.
#[derive(Debug, Clone, Default)]
pub struct Script {
    /// Advertise STARTTLS.
    pub starttls: bool,
    /// Advertise AUTH.
    pub auth: bool,
    /// Challenges sent to the authenticator after it starts.
    pub challenges: Vec<&'static str>,
    /// Fail the first operation whose event starts with this text.
    pub reject: Option<String>,
}

impl Script {
    pub fn rejecting(mut self, prefix: impl Into<String>) -> Self {
        self.reject = Some(prefix.into());
        self
    }
}

/// Shared view of everything the fake saw.
#[derive(Debug, Clone, Default)]
pub struct Recording {
    events: Arc<Mutex<Vec<String>>>,
    message: Arc<Mutex<Vec<u8>>>,
}

impl Recording {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn verbs(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .map(|event| event.split(' ').next().unwrap_or_default().to_string())
            .collect()
    }

    pub fn count(&self, verb: &str) -> usize {
        self.verbs().iter().filter(|v| *v == verb).count()
    }

    pub fn message(&self) -> String {
        String::from_utf8_lossy(&self.message.lock().unwrap()).into_owned()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

/// Dialer handing out [`FakeTransport`]s that share one recording.
#[derive(Debug, Clone, Default)]
pub struct FakeDialer {
    pub script: Script,
    pub recording: Recording,
}

impl FakeDialer {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            recording: Recording::default(),
        }
    }
}

fn check(script: &Script, recording: &Recording, event: String) -> Result<()> {
    let rejected = script
        .reject
        .as_deref()
        .is_some_and(|prefix| event.starts_with(prefix));
    recording.push(event);
    if rejected {
        return Err(mailshot_smtp::Error::smtp_error(550, "rejected by script"));
    }
    Ok(())
}

impl Dialer for FakeDialer {
    type Transport = FakeTransport;

    async fn dial(&self, host: &str, port: u16) -> Result<FakeTransport> {
        check(&self.script, &self.recording, format!("DIAL {host}:{port}"))?;
        Ok(FakeTransport {
            script: self.script.clone(),
            recording: self.recording.clone(),
            host: host.to_string(),
            tls: false,
        })
    }
}

/// One fake session.
#[derive(Debug)]
pub struct FakeTransport {
    script: Script,
    recording: Recording,
    host: String,
    tls: bool,
}

impl FakeTransport {
    fn record(&self, event: impl Into<String>) -> Result<()> {
        check(&self.script, &self.recording, event.into())
    }
}

impl Drop for FakeTransport {
    fn drop(&mut self) {
        self.recording.push("RELEASE".to_string());
    }
}

impl Transport for FakeTransport {
    async fn hello(&mut self, local_name: &str) -> Result<()> {
        self.record(format!("HELLO {local_name}"))
    }

    fn extension(&self, keyword: &str) -> bool {
        match keyword.to_ascii_uppercase().as_str() {
            "STARTTLS" => self.script.starttls,
            "AUTH" => self.script.auth,
            _ => false,
        }
    }

    async fn start_tls(&mut self, tls: &TlsSettings) -> Result<()> {
        self.record(format!(
            "STARTTLS {} verify={}",
            tls.server_name(),
            !tls.skips_verification()
        ))?;
        self.tls = true;
        Ok(())
    }

    async fn auth(&mut self, auth: &mut dyn Authenticator) -> Result<()> {
        let server = ServerContext {
            name: &self.host,
            tls: self.tls,
        };
        let (mechanism, initial) = auth.start(&server)?;
        let mut event = format!("AUTH {}", mechanism.as_str());
        if let Some(initial) = initial {
            event.push(' ');
            event.push_str(&String::from_utf8_lossy(&initial));
        }
        self.record(event)?;

        for challenge in self.script.challenges.clone() {
            let answer = auth.next(challenge.as_bytes())?;
            self.record(format!("ANSWER {}", String::from_utf8_lossy(&answer)))?;
        }
        Ok(())
    }

    async fn mail(&mut self, from: &str) -> Result<()> {
        self.record(format!("MAIL {from}"))
    }

    async fn rcpt(&mut self, to: &str) -> Result<()> {
        self.record(format!("RCPT {to}"))
    }

    async fn data(&mut self) -> Result<()> {
        self.record("DATA")
    }

    async fn write_data(&mut self, message: &[u8]) -> Result<()> {
        self.record("WRITE")?;
        self.recording
            .message
            .lock()
            .unwrap()
            .extend_from_slice(message);
        Ok(())
    }

    async fn close_data(&mut self) -> Result<()> {
        self.record("CLOSE")
    }

    async fn quit(&mut self) -> Result<()> {
        self.record("QUIT")
    }
}
