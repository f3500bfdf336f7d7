pub const HEALTH_MESSAGE: &str = "✅ Interakt AI relay is running";

pub const INTERAKT_SIGNATURE_HEADER: &str = "x-interakt-signature";
pub const MAX_PAYLOAD_BYTES: usize = 1_048_576;

pub const REPLY_IGNORED_NO_TEXT: &str = "Ignored: no message text found in payload.";
pub const REPLY_IGNORED_MARKER_ONLY: &str = "Ignored: message only contained the routing marker.";
pub const REPLY_IGNORED_NO_MATCH: &str = "Ignored: message did not match the routing rules.";
pub const REPLY_MARKER_ACK: &str = "Test received ✅ How can I assist you today?";
pub const REPLY_GREETING: &str = "Hello! 👋 How can I help you?";
pub const REPLY_DEFAULT_ACK: &str = "Got it! Thanks for your message.";
pub const REPLY_COMPLETION_FALLBACK: &str =
    "Sorry, I couldn't prepare an answer right now. Please try again in a moment.";
pub const REPLY_INTERNAL_FAULT: &str =
    "Thanks, we received your message but something went wrong on our side.";

pub const GREETING_WORDS: [&str; 3] = ["hello", "hi", "hey"];

pub const ASSISTANT_SYSTEM_INSTRUCTION: &str =
    "You are a helpful customer support assistant. Keep answers short and clear.";
