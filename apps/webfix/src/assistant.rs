//! Chat assistant core.
//!
//! Keyword-matched quick replies first, then a pluggable `Responder` for
//! everything else. One message is in flight at a time: `submit` refuses
//! new input until the pending reply has been resolved. Delays are only
//! computed here; sleeping (if any) is the caller's business.

use crate::errors::Result;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_MAX_MESSAGES: usize = 50;

const GREETINGS: [&str; 3] = [
    "Hello! I'm the webfix assistant. What can I do for you?",
    "Hi there! Ask me anything about the dashboard.",
    "Welcome! Need a hand with something?",
];

const THANKS: [&str; 3] = [
    "You're welcome!",
    "Glad I could help.",
    "Any time. Let me know if there's anything else.",
];

const FAREWELLS: [&str; 3] = [
    "Goodbye! Come back any time.",
    "See you later!",
    "Bye! Have a good one.",
];

const STATUS: &str = "All services are up and responding normally.";
const VERSION: &str = concat!("webfix ", env!("CARGO_PKG_VERSION"));
const HELP: &str = "I can help with:\n\
    1. Checking service status\n\
    2. Walking you through image analysis\n\
    3. Finding your way around the console\n\
    4. General questions about the dashboard";
const IMAGE: &str = "Open the image analysis page to upload a picture or take one with your camera; \
    the analysis starts automatically.";
const CONSOLE: &str = "Use the \"Open console\" button to see statistics and service status.";

/// Sent when the remote responder fails.
pub const NETWORK_UNSTABLE: &str =
    "Network connection looks unstable; some features may be affected.";
/// How often a long-lived session should call `check_system_status`.
pub const SYSTEM_CHECK_INTERVAL: Duration = Duration::from_secs(30);
pub const APOLOGY: &str =
    "Sorry, I can't handle that request right now. Please try again later or ask something else.";

const MOCK_REPLIES: [&str; 8] = [
    "Thanks for asking. The console has more detail on that.",
    "Good question. Here are a few pointers to get you started...",
    "Understood. That feature is already available from the main screen.",
    "That touches one of the core features, so let me explain it step by step.",
    "From what you describe, the image analysis tool should get you there quickly.",
    "That comes up a lot. Here is the short version.",
    "Thanks for the feedback! It helps us improve.",
    "That's a technical one. I'll try to keep the answer simple.",
];

/// Remote side of the conversation.
pub trait Responder {
    fn respond(&mut self, message: &str, history: &[ChatMessage]) -> Result<String>;
}

/// Picks one of the canned replies.
pub struct MockResponder {
    rng: StdRng,
}

impl MockResponder {
    pub fn new(seed: Option<u64>) -> Self {
        MockResponder { rng: make_rng(seed) }
    }
}

impl Responder for MockResponder {
    fn respond(&mut self, _message: &str, _history: &[ChatMessage]) -> Result<String> {
        Ok(pick(&mut self.rng, &MOCK_REPLIES).to_string())
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

fn pick<'a>(rng: &mut StdRng, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    System,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Quick,
    Remote,
    Fallback,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplySource::Quick => "quick",
            ReplySource::Remote => "remote",
            ReplySource::Fallback => "fallback",
        }
    }
}

#[derive(Debug)]
enum PendingKind {
    Quick(String),
    Remote,
}

/// An accepted message waiting for its reply.
#[derive(Debug)]
pub struct Pending {
    message: String,
    kind: PendingKind,
    pub delay: Duration,
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub delay: Duration,
    pub source: ReplySource,
}

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub max_messages: usize,
    pub seed: Option<u64>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        AssistantConfig {
            max_messages: DEFAULT_MAX_MESSAGES,
            seed: None,
        }
    }
}

pub struct Assistant {
    config: AssistantConfig,
    responder: Box<dyn Responder>,
    history: Vec<ChatMessage>,
    busy: bool,
    rng: StdRng,
    session_id: String,
}

impl Assistant {
    pub fn new(config: AssistantConfig, responder: Box<dyn Responder>) -> Self {
        let mut rng = make_rng(config.seed);
        let session_id = new_session_id(&mut rng);
        Assistant {
            config,
            responder,
            history: Vec::new(),
            busy: false,
            rng,
            session_id,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn has_user_interacted(&self) -> bool {
        self.history.iter().any(|m| m.sender == Sender::User)
    }

    /// Accept a user message. `None` when it is blank or a reply is pending.
    pub fn submit(&mut self, text: &str) -> Option<Pending> {
        let message = text.trim();
        if message.is_empty() || self.busy {
            return None;
        }
        self.push(Sender::User, message);
        self.busy = true;
        let (kind, delay_ms) = match self.quick_response(message) {
            Some(reply) => (PendingKind::Quick(reply), self.rng.gen_range(500..1000)),
            None => (PendingKind::Remote, self.rng.gen_range(1000..2000)),
        };
        Some(Pending {
            message: message.to_string(),
            kind,
            delay: Duration::from_millis(delay_ms),
        })
    }

    /// Produce the reply for an accepted message and release the busy flag.
    pub fn resolve(&mut self, pending: Pending) -> Reply {
        let (text, source) = match pending.kind {
            PendingKind::Quick(text) => (text, ReplySource::Quick),
            PendingKind::Remote => match self.responder.respond(&pending.message, &self.history) {
                Ok(text) => (text, ReplySource::Remote),
                Err(e) => {
                    log::warn!("assistant responder failed: {}", e);
                    (APOLOGY.to_string(), ReplySource::Fallback)
                }
            },
        };
        self.push(Sender::System, &text);
        self.busy = false;
        Reply {
            text,
            delay: pending.delay,
            source,
        }
    }

    /// `submit` then `resolve`, without waiting.
    pub fn send(&mut self, text: &str) -> Option<Reply> {
        let pending = self.submit(text)?;
        Some(self.resolve(pending))
    }

    /// Greet and list what the assistant can do, unless the user already
    /// spoke. Returns whether anything was added.
    pub fn auto_greeting(&mut self) -> bool {
        if self.has_user_interacted() {
            return false;
        }
        let greeting = pick(&mut self.rng, &GREETINGS);
        self.push(Sender::System, greeting);
        self.push(Sender::System, HELP);
        true
    }

    /// Simulated health check: one draw in ten reports the network as
    /// unstable. The warning is only added while the chat is `visible`.
    pub fn check_system_status(&mut self, visible: bool) -> bool {
        let online = self.rng.gen::<f64>() > 0.1;
        if online || !visible {
            return false;
        }
        self.push(Sender::System, NETWORK_UNSTABLE);
        true
    }

    fn quick_response(&mut self, message: &str) -> Option<String> {
        let m = message.to_lowercase();
        let has = |keys: &[&str]| keys.iter().any(|k| m.contains(k));
        let text = if has(&["谢谢", "感谢", "thank"]) {
            pick(&mut self.rng, &THANKS)
        } else if has(&["你好", "嗨", "哈喽", "hi", "hello"]) {
            pick(&mut self.rng, &GREETINGS)
        } else if has(&["再见", "拜拜", "bye"]) {
            pick(&mut self.rng, &FAREWELLS)
        } else if has(&["状态", "运行", "status"]) {
            STATUS
        } else if has(&["版本", "version"]) {
            VERSION
        } else if has(&["帮助", "怎么", "how", "help"]) {
            HELP
        } else if has(&["图像", "图片", "photo", "image", "分析", "analyze"]) {
            IMAGE
        } else if has(&["控制台", "console", "dashboard"]) {
            CONSOLE
        } else {
            return None;
        };
        Some(text.to_string())
    }

    fn push(&mut self, sender: Sender, message: &str) {
        self.history.push(ChatMessage {
            sender,
            message: message.to_string(),
            timestamp: Utc::now(),
        });
        let max = self.config.max_messages;
        if self.history.len() > max {
            self.history.drain(..self.history.len() - max);
        }
    }
}

fn new_session_id(rng: &mut StdRng) -> String {
    const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("webfix-session-{}-{}", Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WebfixError;
    use regex::Regex;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Counting(Rc<Cell<usize>>);
    impl Responder for Counting {
        fn respond(&mut self, _m: &str, _h: &[ChatMessage]) -> Result<String> {
            self.0.set(self.0.get() + 1);
            Ok("remote answer".to_string())
        }
    }

    struct Broken;
    impl Responder for Broken {
        fn respond(&mut self, _m: &str, _h: &[ChatMessage]) -> Result<String> {
            Err(WebfixError::Responder("connection refused".into()))
        }
    }

    fn seeded(responder: Box<dyn Responder>) -> Assistant {
        Assistant::new(
            AssistantConfig {
                seed: Some(7),
                ..Default::default()
            },
            responder,
        )
    }

    #[test]
    fn test_greeting_is_quick_and_skips_responder() {
        let calls = Rc::new(Cell::new(0));
        let mut a = seeded(Box::new(Counting(calls.clone())));
        let reply = a.send("你好").unwrap();
        assert_eq!(reply.source, ReplySource::Quick);
        assert!(GREETINGS.contains(&reply.text.as_str()));
        assert!(reply.delay >= Duration::from_millis(500));
        assert!(reply.delay < Duration::from_millis(1000));
        assert_eq!(calls.get(), 0);
        assert_eq!(a.history().len(), 2);
        assert!(!a.is_busy());
    }

    #[test]
    fn test_quick_table_order() {
        let mut a = seeded(Box::new(MockResponder::new(Some(1))));
        // thanks wins over greeting
        let r = a.send("hello, thank you").unwrap();
        assert!(THANKS.contains(&r.text.as_str()));
        assert_eq!(a.send("what is the STATUS?").unwrap().text, STATUS);
        assert_eq!(a.send("版本").unwrap().text, VERSION);
        // "console" alone hits the last row
        assert_eq!(a.send("console").unwrap().text, CONSOLE);
    }

    #[test]
    fn test_unmatched_goes_remote_with_longer_delay() {
        let calls = Rc::new(Cell::new(0));
        let mut a = seeded(Box::new(Counting(calls.clone())));
        let reply = a.send("qwerty").unwrap();
        assert_eq!(reply.source, ReplySource::Remote);
        assert_eq!(reply.text, "remote answer");
        assert!(reply.delay >= Duration::from_millis(1000));
        assert!(reply.delay < Duration::from_millis(2000));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_mock_responder_uses_canned_replies() {
        let mut a = seeded(Box::new(MockResponder::new(Some(3))));
        let reply = a.send("zzz").unwrap();
        assert!(MOCK_REPLIES.contains(&reply.text.as_str()));
    }

    #[test]
    fn test_responder_error_falls_back_to_apology() {
        let mut a = seeded(Box::new(Broken));
        let reply = a.send("qwerty").unwrap();
        assert_eq!(reply.source, ReplySource::Fallback);
        assert_eq!(reply.text, APOLOGY);
        assert!(!a.is_busy());
        assert_eq!(a.history().last().unwrap().message, APOLOGY);
    }

    #[test]
    fn test_busy_and_blank_input_are_ignored() {
        let mut a = seeded(Box::new(MockResponder::new(None)));
        assert!(a.submit("   ").is_none());
        let pending = a.submit("qwerty").unwrap();
        assert!(a.is_busy());
        assert!(a.submit("another").is_none());
        assert_eq!(a.history().len(), 1);
        a.resolve(pending);
        assert!(a.submit("another").is_some());
    }

    #[test]
    fn test_history_keeps_newest_messages() {
        let mut a = Assistant::new(
            AssistantConfig {
                max_messages: 4,
                seed: Some(1),
            },
            Box::new(MockResponder::new(Some(1))),
        );
        for i in 0..5 {
            a.send(&format!("message {}", i)).unwrap();
        }
        assert_eq!(a.history().len(), 4);
        assert_eq!(a.history()[0].message, "message 3");
        assert_eq!(a.history()[0].sender, Sender::User);
    }

    #[test]
    fn test_auto_greeting_only_before_user_speaks() {
        let mut a = seeded(Box::new(MockResponder::new(None)));
        assert!(a.auto_greeting());
        assert_eq!(a.history().len(), 2);
        assert_eq!(a.history()[1].message, HELP);
        a.send("hi").unwrap();
        assert!(!a.auto_greeting());
        a.clear_history();
        assert!(!a.has_user_interacted());
    }

    #[test]
    fn test_session_id_format() {
        let a = seeded(Box::new(MockResponder::new(None)));
        let re = Regex::new(r"^webfix-session-\d+-[0-9a-z]{9}$").unwrap();
        assert!(re.is_match(a.session_id()));
    }

    #[test]
    fn test_system_check_sometimes_warns_while_visible() {
        let mut a = Assistant::new(
            AssistantConfig {
                seed: Some(7),
                max_messages: 1000,
            },
            Box::new(MockResponder::new(Some(7))),
        );
        let warned = (0..300).filter(|_| a.check_system_status(true)).count();
        assert!(warned > 0 && warned < 90, "warned {} times", warned);
        assert_eq!(a.history().len(), warned);
        assert!(a
            .history()
            .iter()
            .all(|m| m.sender == Sender::System && m.message == NETWORK_UNSTABLE));
        assert!(!a.has_user_interacted());
    }

    #[test]
    fn test_system_check_is_silent_when_hidden() {
        let mut a = seeded(Box::new(MockResponder::new(Some(7))));
        assert!((0..300).all(|_| !a.check_system_status(false)));
        assert!(a.history().is_empty());
    }
}
